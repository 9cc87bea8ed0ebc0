//! Logger adapter tests.

use std::sync::Arc;

use bulkmail::providers::LoggerMailer;
use bulkmail::{
    AccountId, Dispatcher, Mailer, MailerConfig, MemoryStore, NewRecipient, ProviderKind,
};

#[tokio::test]
async fn send_returns_ok() {
    let mailer = LoggerMailer::new();
    let result = mailer
        .send("steve.rogers@example.com", "Hello, Avengers!", "Hello!")
        .await;
    assert!(result.is_ok());
}

#[test]
fn config_builds_logger_variants() {
    for kind in [ProviderKind::Logger, ProviderKind::LoggerFull] {
        let config = MailerConfig::new(kind);
        assert!(config.is_configured());
        assert_eq!(config.build().unwrap().provider_name(), "logger");
    }
}

#[tokio::test]
async fn campaign_through_logger_succeeds() {
    let account = AccountId::new("uid-staging");
    let store = MemoryStore::shared();
    store
        .add_recipient(&account, NewRecipient::new("qa@example.com").name("QA"))
        .unwrap();

    let dispatcher = Dispatcher::new(Arc::new(LoggerMailer::full()), store.clone(), store.clone());
    let result = dispatcher
        .dispatch(&account, "Dry run", "Nothing leaves the building.")
        .await
        .unwrap();

    let report = result.report().unwrap();
    assert!(report.is_complete_success());
    assert_eq!(dispatcher.mailer().provider_name(), "logger");
}
