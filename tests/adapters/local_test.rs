//! Local adapter tests.

use std::time::Duration;

use bulkmail::providers::LocalMailer;
use bulkmail::testing::*;
use bulkmail::{Mailer, MailerConfig, MailerError, ProviderKind};

// ============================================================================
// Basic Delivery Tests
// ============================================================================

#[tokio::test]
async fn send_returns_ok() {
    let mailer = LocalMailer::new();

    let result = mailer
        .send("steve.rogers@example.com", "Hello, Avengers!", "Hello!")
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn captures_sent_emails() {
    let mailer = LocalMailer::new();

    mailer
        .send("steve.rogers@example.com", "Hello, Avengers!", "Hello!")
        .await
        .unwrap();

    assert_email_sent(&mailer);
    assert_email_to(&mailer, "Steve.Rogers@example.com");
    assert_email_subject(&mailer, "Hello, Avengers!");
    assert_email_subject_matches(&mailer, r"^Hello, \w+!$");
    assert_email_body_matches(&mailer, r"Hel+o");

    let email = get_last_email(&mailer);
    assert_eq!(email.to, "steve.rogers@example.com");
}

#[tokio::test]
async fn get_emails_to_filters_by_address() {
    let mailer = LocalMailer::new();
    mailer.send("a@example.com", "One", "B").await.unwrap();
    mailer.send("b@example.com", "Two", "B").await.unwrap();
    mailer.send("A@example.com", "Three", "B").await.unwrap();

    let to_a = get_emails_to(&mailer, "a@example.com");
    assert_eq!(to_a.len(), 2);
    assert_eq!(to_a[1].subject, "Three");

    let flushed = flush_emails(&mailer);
    assert_eq!(flushed.len(), 3);
    assert_no_emails_sent(&mailer);
}

// ============================================================================
// Failure Simulation
// ============================================================================

#[tokio::test]
async fn per_address_failure_overrides_global_setting() {
    let mailer = LocalMailer::new();
    mailer.set_failure("relay down");
    mailer.fail_for("vip@example.com", MailerError::NotConfigured);

    assert_eq!(
        mailer.send("vip@example.com", "S", "B").await,
        Err(MailerError::NotConfigured)
    );
    assert_eq!(
        mailer.send("other@example.com", "S", "B").await,
        Err(MailerError::Rejected("relay down".into()))
    );
    assert_no_emails_sent(&mailer);
    assert_eq!(mailer.attempt_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn per_address_delay() {
    let mailer = LocalMailer::new();
    mailer.delay_for("slow@example.com", Duration::from_secs(5));

    let started = tokio::time::Instant::now();
    mailer.send("fast@example.com", "S", "B").await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));

    mailer.send("slow@example.com", "S", "B").await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(5));
}

#[tokio::test]
async fn config_builds_local_mailer() {
    let mailer = MailerConfig::new(ProviderKind::Local).build().unwrap();
    assert_eq!(mailer.provider_name(), "local");
    assert!(mailer.validate_config().is_ok());

    // Accepts sends; the captures stay inside the trait object.
    assert!(mailer.send("a@example.com", "S", "B").await.is_ok());
}

#[test]
#[should_panic(expected = "Expected at least one email")]
fn assert_email_sent_fails_when_no_email_sent() {
    let mailer = LocalMailer::new();
    assert_email_sent(&mailer);
}

#[tokio::test]
#[should_panic(expected = "Expected 2 email(s) to be sent, but 1 were sent")]
async fn assert_email_count_reports_mismatch() {
    let mailer = LocalMailer::new();
    mailer.send("a@example.com", "S", "B").await.unwrap();
    assert_email_count(&mailer, 2);
}

#[tokio::test]
#[should_panic(expected = "Expected one send attempt per address")]
async fn assert_each_attempted_once_catches_repeats() {
    let mailer = LocalMailer::new();
    mailer.send("a@example.com", "S", "B").await.unwrap();
    mailer.send("A@example.com", "S", "B").await.unwrap();
    assert_each_attempted_once(&mailer);
}
