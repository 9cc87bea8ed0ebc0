//! Resend adapter tests.

use std::sync::Arc;

use bulkmail::providers::ResendMailer;
use bulkmail::{
    AccountId, Dispatcher, Mailer, MailerConfig, MailerError, MemoryStore, NewRecipient,
    SendOutcome,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn mailer(server: &MockServer) -> ResendMailer {
    ResendMailer::new("re_123456789")
        .from(("Business Bulk Email", "onboarding@resend.dev"))
        .base_url(server.uri())
}

fn success_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "049b9217-30b5-4f61-a8e3-4d2d12f9f5a7"
    }))
}

// ============================================================================
// Basic Delivery Tests
// ============================================================================

#[tokio::test]
async fn successful_delivery_returns_ok() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("Authorization", "Bearer re_123456789"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "from": "Business Bulk Email <onboarding@resend.dev>",
            "to": ["steve.rogers@example.com"],
            "subject": "Hello, Avengers!",
            "text": "Hello"
        })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let result = mailer(&server)
        .send("steve.rogers@example.com", "Hello, Avengers!", "Hello")
        .await;
    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn success_without_id_still_ok() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = mailer(&server).send("a@example.com", "S", "B").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn config_sender_and_endpoint_are_used() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("Authorization", "Bearer re_from_config"))
        .and(body_partial_json(json!({ "from": "Shop <news@shop.example>" })))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let config = MailerConfig::resend("re_from_config")
        .from(("Shop", "news@shop.example"))
        .base_url(server.uri());
    let mailer = config.build().unwrap();

    assert_eq!(mailer.provider_name(), "resend");
    assert!(mailer.send("a@example.com", "S", "B").await.is_ok());
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn provider_error_is_rejected_with_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "statusCode": 422,
            "message": "Invalid `to` field.",
            "name": "validation_error"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = mailer(&server).send("not-an-email", "S", "B").await;
    assert_eq!(
        result,
        Err(MailerError::Rejected(
            "Invalid `to` field. (resend, status 422)".into()
        ))
    );
}

#[tokio::test]
async fn unparseable_error_body_uses_status_reason() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .expect(1)
        .mount(&server)
        .await;

    let result = mailer(&server).send("a@example.com", "S", "B").await;
    assert_eq!(
        result,
        Err(MailerError::Rejected(
            "Internal Server Error (resend, status 500)".into()
        ))
    );
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    // Discard port: nothing listens, the connect is refused.
    let result = ResendMailer::new("re_123")
        .base_url("http://127.0.0.1:9")
        .send("a@example.com", "S", "B")
        .await;
    assert!(matches!(result, Err(MailerError::Transport(_))));
}

#[tokio::test]
async fn missing_api_key_never_calls_provider() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(success_response())
        .expect(0)
        .mount(&server)
        .await;

    let mailer = ResendMailer::unconfigured().base_url(server.uri());
    let result = mailer.send("a@example.com", "S", "B").await;
    assert_eq!(result, Err(MailerError::NotConfigured));
}

// ============================================================================
// Campaign over HTTP
// ============================================================================

#[tokio::test]
async fn campaign_with_one_rejected_recipient() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(body_partial_json(json!({ "to": ["loki@example.com"] })))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "statusCode": 403,
            "message": "Recipient is suppressed",
            "name": "validation_error"
        })))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(success_response())
        .expect(2)
        .with_priority(2)
        .mount(&server)
        .await;

    let account = AccountId::new("uid-odin");
    let store = MemoryStore::shared();
    for address in ["thor@example.com", "loki@example.com", "frigga@example.com"] {
        store
            .add_recipient(&account, NewRecipient::new(address))
            .unwrap();
    }

    let dispatcher = Dispatcher::new(Arc::new(mailer(&server)), store.clone(), store.clone());
    let result = dispatcher
        .dispatch(&account, "Family dinner", "Sunday at seven.")
        .await
        .unwrap();

    let report = result.report().unwrap();
    assert_eq!(report.success_count, 2);
    assert_eq!(report.failure_count, 1);
    assert_eq!(
        report.outcome_for("loki@example.com"),
        Some(&SendOutcome::failure(
            "Rejected by provider: Recipient is suppressed (resend, status 403)"
        ))
    );
    assert_eq!(store.campaigns(&account).len(), 1);
}

#[tokio::test]
async fn campaign_without_api_key_fails_closed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(success_response())
        .expect(0)
        .mount(&server)
        .await;

    let account = AccountId::new("uid-odin");
    let store = MemoryStore::shared();
    store
        .add_recipient(&account, NewRecipient::new("thor@example.com"))
        .unwrap();
    store
        .add_recipient(&account, NewRecipient::new("frigga@example.com"))
        .unwrap();

    let mailer = MailerConfig::default().base_url(server.uri()).build().unwrap();
    let dispatcher = Dispatcher::new(mailer, store.clone(), store.clone());
    let result = dispatcher.dispatch(&account, "Hi", "Body").await.unwrap();

    let report = result.report().unwrap();
    assert_eq!(report.success_count, 0);
    assert_eq!(report.failure_count, 2);
    assert_eq!(store.campaigns(&account).len(), 1);
}
