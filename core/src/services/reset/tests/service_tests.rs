//! Unit tests for the password reset flow

use chrono::{Duration, TimeZone, Utc};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::errors::DomainError;
use crate::services::otp::tests::MockStore;
use crate::services::otp::{Clock, DeliveryCheck, ManualClock, OtpConfig, OtpLifecycleManager, VerifyFailure};
use crate::services::reset::{
    CodeRequestOutcome, PasswordResetService, ResetFlowConfig, ResetOutcome, DEFAULT_MAIL_SUBJECT,
};

use super::mocks::{MockDirectory, MockMailer, MockPasswords};

const SUBJECT: &str = "user-42";
const EMAIL: &str = "carol@example.com";

struct Harness {
    service: PasswordResetService<MockStore, MockDirectory, MockMailer, MockPasswords>,
    store: Arc<MockStore>,
    clock: Arc<ManualClock>,
    directory: Arc<MockDirectory>,
    mailer: Arc<MockMailer>,
    passwords: Arc<MockPasswords>,
}

fn setup_with(otp_config: OtpConfig, flow_config: ResetFlowConfig) -> Harness {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
    let store = Arc::new(MockStore::new(clock.clone()));
    let otp = OtpLifecycleManager::with_clock(store.clone(), otp_config, clock.clone()).unwrap();

    let directory = Arc::new(MockDirectory::with_user(SUBJECT, EMAIL));
    let mailer = Arc::new(MockMailer::new());
    let passwords = Arc::new(MockPasswords::new());

    let service = PasswordResetService::new(
        Arc::new(otp),
        directory.clone(),
        mailer.clone(),
        passwords.clone(),
        flow_config,
    );

    Harness { service, store, clock, directory, mailer, passwords }
}

fn setup() -> Harness {
    setup_with(OtpConfig::default().with_hash_cost(4), ResetFlowConfig::default())
}

fn wrong_code(code: &str) -> String {
    if code == "000000" { "111111".to_string() } else { "000000".to_string() }
}

#[tokio::test]
async fn test_request_code_unknown_subject() {
    let h = setup();

    let outcome = h.service.request_code("nobody").await.unwrap();

    assert_eq!(outcome, CodeRequestOutcome::UnknownSubject);
    assert_eq!(h.mailer.sent_count(), 0);
    assert!(!h.store.contains("otp:password_reset:nobody"));
}

#[tokio::test]
async fn test_request_code_sends_new_code() {
    let h = setup();

    let outcome = h.service.request_code(SUBJECT).await.unwrap();

    let expected_expiry = h.clock.now() + Duration::minutes(10);
    assert_eq!(outcome, CodeRequestOutcome::Sent { expires_at: expected_expiry });

    let mail = h.mailer.last();
    assert_eq!(mail.to, EMAIL);
    assert_eq!(mail.subject, DEFAULT_MAIL_SUBJECT);
    assert_eq!(mail.code().len(), 6);
    assert!(mail.body.contains("10 minutes"));
    assert!(h.service.otp().fetch(SUBJECT).await.unwrap().is_some());
}

#[tokio::test]
async fn test_request_code_within_cooldown_is_denied() {
    let h = setup();

    h.service.request_code(SUBJECT).await.unwrap();
    h.clock.advance(Duration::seconds(5));

    let outcome = h.service.request_code(SUBJECT).await.unwrap();

    assert_eq!(
        outcome,
        CodeRequestOutcome::Denied {
            check: DeliveryCheck::Cooldown { retry_after_ms: 25_000 }
        }
    );
    assert_eq!(h.mailer.sent_count(), 1);
}

#[tokio::test]
async fn test_resend_rotates_code_and_uses_captured_email() {
    let h = setup();

    h.service.request_code(SUBJECT).await.unwrap();
    let first_code = h.mailer.last().code();

    h.directory.set_email(SUBJECT, "carol.new@example.com");
    h.clock.advance(Duration::seconds(30));

    let outcome = h.service.request_code(SUBJECT).await.unwrap();
    assert_eq!(outcome, CodeRequestOutcome::Resent { resend_count: 1 });

    let mail = h.mailer.last();
    assert_eq!(mail.to, EMAIL);
    assert_eq!(h.mailer.sent_count(), 2);

    let entry = h.service.otp().fetch(SUBJECT).await.unwrap().unwrap();
    assert_eq!(entry.resend_count, 1);
    assert_eq!(entry.last_sent_at, h.clock.now());

    let second_code = mail.code();
    if first_code != second_code {
        let outcome = h.service.confirm_reset(SUBJECT, &first_code, "n3w-pass").await.unwrap();
        assert_eq!(outcome, ResetOutcome::Rejected(VerifyFailure::InvalidCode));
    }

    let outcome = h.service.confirm_reset(SUBJECT, &second_code, "n3w-pass").await.unwrap();
    assert_eq!(outcome, ResetOutcome::Completed);
}

#[tokio::test]
async fn test_resend_limit_is_enforced() {
    let mut otp_config = OtpConfig::default().with_hash_cost(4);
    otp_config.max_resends = 1;
    let h = setup_with(otp_config, ResetFlowConfig::default());

    h.service.request_code(SUBJECT).await.unwrap();
    h.clock.advance(Duration::seconds(30));
    assert_eq!(
        h.service.request_code(SUBJECT).await.unwrap(),
        CodeRequestOutcome::Resent { resend_count: 1 }
    );

    h.clock.advance(Duration::seconds(30));
    assert_eq!(
        h.service.request_code(SUBJECT).await.unwrap(),
        CodeRequestOutcome::Denied { check: DeliveryCheck::Limit }
    );
    assert_eq!(h.mailer.sent_count(), 2);
}

#[tokio::test]
async fn test_request_after_expiry_issues_fresh_entry() {
    let h = setup();

    h.service.request_code(SUBJECT).await.unwrap();
    h.clock.advance(Duration::seconds(601));

    let outcome = h.service.request_code(SUBJECT).await.unwrap();

    assert!(matches!(outcome, CodeRequestOutcome::Sent { .. }));
    let entry = h.service.otp().fetch(SUBJECT).await.unwrap().unwrap();
    assert_eq!(entry.resend_count, 0);
    assert_eq!(entry.issued_at, h.clock.now());
}

#[tokio::test]
async fn test_mail_failure_on_first_send_revokes_entry() {
    let h = setup();
    h.mailer.set_failing(true);

    let result = h.service.request_code(SUBJECT).await;

    assert!(matches!(result, Err(DomainError::Delivery { .. })));
    assert!(h.service.otp().fetch(SUBJECT).await.unwrap().is_none());

    // Nothing is throttled by the failed attempt
    h.mailer.set_failing(false);
    assert!(matches!(
        h.service.request_code(SUBJECT).await.unwrap(),
        CodeRequestOutcome::Sent { .. }
    ));
}

#[tokio::test]
async fn test_mail_failure_on_resend_keeps_delivered_code() {
    let h = setup();

    h.service.request_code(SUBJECT).await.unwrap();
    let delivered_code = h.mailer.last().code();
    let before = h.service.otp().fetch(SUBJECT).await.unwrap().unwrap();

    h.clock.advance(Duration::seconds(30));
    h.mailer.set_failing(true);

    let result = h.service.request_code(SUBJECT).await;
    assert!(matches!(result, Err(DomainError::Delivery { .. })));

    let entry = h.service.otp().fetch(SUBJECT).await.unwrap().unwrap();
    assert_eq!(entry.code_hash, before.code_hash);
    assert_eq!(entry.resend_count, 0);
    assert_eq!(entry.last_sent_at, entry.issued_at);

    let outcome = h.service.confirm_reset(SUBJECT, &delivered_code, "n3w-pass").await.unwrap();
    assert_eq!(outcome, ResetOutcome::Completed);
}

#[tokio::test]
async fn test_resend_succeeds_after_failed_attempt() {
    let h = setup();

    h.service.request_code(SUBJECT).await.unwrap();
    h.clock.advance(Duration::seconds(30));

    h.mailer.set_failing(true);
    assert!(h.service.request_code(SUBJECT).await.is_err());

    h.mailer.set_failing(false);
    let outcome = h.service.request_code(SUBJECT).await.unwrap();
    assert_eq!(outcome, CodeRequestOutcome::Resent { resend_count: 1 });

    let resent_code = h.mailer.last().code();
    let outcome = h.service.confirm_reset(SUBJECT, &resent_code, "n3w-pass").await.unwrap();
    assert_eq!(outcome, ResetOutcome::Completed);
}

#[tokio::test]
async fn test_confirm_reset_completes_and_consumes_code() {
    let h = setup();

    h.service.request_code(SUBJECT).await.unwrap();
    let code = h.mailer.last().code();

    let outcome = h.service.confirm_reset(SUBJECT, &code, "correct horse").await.unwrap();

    assert_eq!(outcome, ResetOutcome::Completed);
    assert_eq!(h.passwords.password_of(SUBJECT).as_deref(), Some("correct horse"));
    assert!(h.service.otp().fetch(SUBJECT).await.unwrap().is_none());

    let outcome = h.service.confirm_reset(SUBJECT, &code, "again").await.unwrap();
    assert_eq!(outcome, ResetOutcome::Rejected(VerifyFailure::Expired));
    assert_eq!(h.passwords.password_of(SUBJECT).as_deref(), Some("correct horse"));
}

#[tokio::test]
async fn test_confirm_reset_wrong_code() {
    let h = setup();

    h.service.request_code(SUBJECT).await.unwrap();
    let code = h.mailer.last().code();

    let outcome = h.service.confirm_reset(SUBJECT, &wrong_code(&code), "pw").await.unwrap();

    assert_eq!(outcome, ResetOutcome::Rejected(VerifyFailure::InvalidCode));
    assert!(h.passwords.password_of(SUBJECT).is_none());
    assert!(h.service.otp().fetch(SUBJECT).await.unwrap().is_some());
}

#[tokio::test]
async fn test_confirm_reset_password_failure_keeps_entry() {
    let h = setup();

    h.service.request_code(SUBJECT).await.unwrap();
    let code = h.mailer.last().code();
    h.passwords.set_failing(true);

    let result = h.service.confirm_reset(SUBJECT, &code, "pw").await;
    assert!(matches!(result, Err(DomainError::Directory { .. })));
    assert!(h.service.otp().fetch(SUBJECT).await.unwrap().is_some());

    h.passwords.set_failing(false);
    let outcome = h.service.confirm_reset(SUBJECT, &code, "pw").await.unwrap();
    assert!(outcome.is_completed());
}

#[tokio::test]
async fn test_cancel_revokes_code() {
    let h = setup();

    h.service.request_code(SUBJECT).await.unwrap();
    let code = h.mailer.last().code();

    h.service.cancel(SUBJECT).await.unwrap();
    h.service.cancel(SUBJECT).await.unwrap();

    let outcome = h.service.confirm_reset(SUBJECT, &code, "pw").await.unwrap();
    assert_eq!(outcome, ResetOutcome::Rejected(VerifyFailure::Expired));
}

#[tokio::test]
async fn test_directory_failure_propagates() {
    let h = setup();
    h.directory.should_fail.store(true, Ordering::SeqCst);

    let result = h.service.request_code(SUBJECT).await;

    assert!(matches!(result, Err(DomainError::Directory { .. })));
    assert_eq!(h.mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_custom_mail_subject() {
    let h = setup_with(
        OtpConfig::default().with_hash_cost(4).with_ttl_seconds(90),
        ResetFlowConfig::default().with_mail_subject("Reset your password"),
    );

    h.service.request_code(SUBJECT).await.unwrap();

    let mail = h.mailer.last();
    assert_eq!(mail.subject, "Reset your password");
    assert!(mail.body.contains("2 minutes"));
}

#[test]
fn test_outcomes_serialize_with_status_tag() {
    let denied = CodeRequestOutcome::Denied {
        check: DeliveryCheck::Cooldown { retry_after_ms: 1500 },
    };
    let json = serde_json::to_value(denied).unwrap();
    assert_eq!(json["status"], "denied");
    assert_eq!(json["check"]["reason"], "cooldown");
    assert_eq!(json["check"]["retry_after_ms"], 1500);

    let json = serde_json::to_value(ResetOutcome::Rejected(VerifyFailure::TooManyAttempts)).unwrap();
    assert_eq!(json["status"], "rejected");
    assert_eq!(json["reason"], "too_many_attempts");
}
