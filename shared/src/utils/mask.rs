//! Masking helpers for log output
//!
//! Email addresses and subject identifiers are desensitized before they
//! reach the log pipeline.

/// Mask an email address, keeping the first character of the local part
/// and the full domain (`alice@example.com` -> `a***@example.com`)
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}

/// Mask a subject identifier, keeping only the last 4 characters
pub fn mask_subject(subject_id: &str) -> String {
    let count = subject_id.chars().count();
    if count <= 4 {
        "****".to_string()
    } else {
        let tail: String = subject_id.chars().skip(count - 4).collect();
        format!("***{}", tail)
    }
}
