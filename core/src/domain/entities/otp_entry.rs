//! OTP entry entity for the password-reset flow.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Length of a modular-crypt bcrypt hash (`$2b$NN$` + 22 salt + 31 hash chars)
const BCRYPT_HASH_LEN: usize = 60;

/// bcrypt's base64 alphabet
const BCRYPT_ALPHABET: &[u8] = b"./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// One live passcode per subject identity
///
/// The plaintext code is never part of the entity; only its bcrypt hash is
/// stored. `attempts` and `resend_count` only grow for the lifetime of an
/// entry and are reset by issuing a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpEntry {
    /// Destination address captured at issuance
    pub email: String,

    /// One-way hash of the numeric code
    pub code_hash: String,

    /// Timestamp when the entry was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp after which the entry is no longer readable
    pub expires_at: DateTime<Utc>,

    /// Number of verification attempts made against this entry
    pub attempts: u32,

    /// Timestamp of the most recent delivery (issuance or resend)
    pub last_sent_at: DateTime<Utc>,

    /// Number of resend deliveries since issuance
    pub resend_count: u32,
}

/// Result of decoding a stored value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEntry {
    /// Well-formed entry
    Valid(OtpEntry),
    /// Corrupt or legacy-format value, with the reason it was rejected
    Malformed(String),
}

impl OtpEntry {
    /// Creates a freshly issued entry
    ///
    /// # Arguments
    ///
    /// * `email` - Destination address for the code
    /// * `code_hash` - Hash of the generated code
    /// * `now` - Issuance timestamp
    /// * `ttl` - Validity window
    pub fn new(email: String, code_hash: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            email,
            code_hash,
            issued_at: now,
            expires_at: now + ttl,
            attempts: 0,
            last_sent_at: now,
            resend_count: 0,
        }
    }

    /// Checks whether the entry has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Time left until expiry, clamped at zero
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }

    /// Time left in the delivery cooldown, if it is still running
    pub fn cooldown_remaining_at(&self, now: DateTime<Utc>, cooldown: Duration) -> Option<Duration> {
        let elapsed = now - self.last_sent_at;
        if elapsed < cooldown {
            Some(cooldown - elapsed)
        } else {
            None
        }
    }

    /// Serializes the entry into its stored JSON form
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parses a stored value
    ///
    /// Anything that is not a well-formed entry is reported as
    /// [`DecodedEntry::Malformed`] so the caller can purge it.
    pub fn decode(raw: &[u8]) -> DecodedEntry {
        let entry: OtpEntry = match serde_json::from_slice(raw) {
            Ok(entry) => entry,
            Err(e) => return DecodedEntry::Malformed(format!("unparseable entry: {}", e)),
        };

        if !is_bcrypt_hash(&entry.code_hash) {
            return DecodedEntry::Malformed("code_hash is not a bcrypt hash".to_string());
        }
        if entry.expires_at < entry.issued_at {
            return DecodedEntry::Malformed("expires_at precedes issued_at".to_string());
        }

        DecodedEntry::Valid(entry)
    }
}

/// Check that a value has the exact shape bcrypt accepts for verification
///
/// Variant `2a`/`2b`/`2x`/`2y`, a two-digit cost in 4..=31, then 53 characters
/// of bcrypt base64 whose final characters carry no stray trailing bits.
pub fn is_bcrypt_hash(hash: &str) -> bool {
    let bytes = hash.as_bytes();
    if bytes.len() != BCRYPT_HASH_LEN
        || bytes[0] != b'$'
        || bytes[1] != b'2'
        || bytes[3] != b'$'
        || bytes[6] != b'$'
    {
        return false;
    }
    if !matches!(bytes[2], b'a' | b'b' | b'x' | b'y') {
        return false;
    }

    if !bytes[4].is_ascii_digit() || !bytes[5].is_ascii_digit() {
        return false;
    }
    let cost = (bytes[4] - b'0') * 10 + (bytes[5] - b'0');
    if !(4..=31).contains(&cost) {
        return false;
    }

    let mut positions = Vec::with_capacity(BCRYPT_HASH_LEN - 7);
    for b in &bytes[7..] {
        match BCRYPT_ALPHABET.iter().position(|a| a == b) {
            Some(position) => positions.push(position),
            None => return false,
        }
    }

    // 22 salt chars encode 16 bytes (4 spare bits), 31 hash chars encode 23 bytes (2 spare bits)
    positions[21] % 16 == 0 && positions[52] % 4 == 0
}
