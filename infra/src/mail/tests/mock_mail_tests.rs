//! Unit tests for the mock mail service

use otp_core::errors::DomainError;
use otp_core::services::Mailer;
use otp_shared::config::MailConfig;

use crate::mail::{create_mail_service, MockMailService};
use crate::InfrastructureError;

#[tokio::test]
async fn test_mock_records_messages() {
    let mailer = MockMailService::with_options(false, false);

    mailer
        .send_mail("alice@example.com", "Your password reset code", "code 123456")
        .await
        .unwrap();

    assert_eq!(mailer.get_message_count(), 1);
    let message = mailer.last_message().unwrap();
    assert_eq!(message.to, "alice@example.com");
    assert_eq!(message.subject, "Your password reset code");
    assert_eq!(message.body, "code 123456");
    assert!(message.id.starts_with("mock_"));
}

#[tokio::test]
async fn test_mock_simulated_failure() {
    let mailer = MockMailService::with_options(false, true);

    let result = mailer.send_mail("alice@example.com", "s", "b").await;
    assert!(matches!(result, Err(DomainError::Delivery { .. })));
    assert_eq!(mailer.get_message_count(), 0);

    mailer.set_simulate_failure(false);
    mailer.send_mail("alice@example.com", "s", "b").await.unwrap();
    assert_eq!(mailer.sent_messages().len(), 1);

    mailer.reset();
    assert_eq!(mailer.get_message_count(), 0);
    assert!(mailer.last_message().is_none());
}

#[test]
fn test_create_mail_service_by_provider() {
    assert!(create_mail_service(&MailConfig::mock()).is_ok());

    // HTTP provider needs an endpoint
    let result = create_mail_service(&MailConfig::default());
    assert!(matches!(result, Err(InfrastructureError::Config(_))));

    let mut config = MailConfig::default();
    config.api_url = "https://mail.example.com/v1/send".to_string();
    assert!(create_mail_service(&config).is_ok());

    config.provider = "carrier-pigeon".to_string();
    assert!(matches!(create_mail_service(&config), Err(InfrastructureError::Config(_))));
}
