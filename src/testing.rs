//! Testing utilities and assertion helpers.
//!
//! # Example
//!
//! ```rust,ignore
//! use bulkmail::providers::LocalMailer;
//! use bulkmail::testing::*;
//!
//! #[tokio::test]
//! async fn test_spring_sale() {
//!     let mailer = LocalMailer::new();
//!
//!     // ... dispatch a campaign ...
//!
//!     assert_email_count(&mailer, 3);
//!     assert_email_to(&mailer, "jane@example.com");
//!     assert_email_subject_matches(&mailer, r"^Spring sale");
//!     assert_each_attempted_once(&mailer);
//! }
//! ```

use regex::Regex;
use std::collections::HashMap;

use crate::campaign::{CampaignReport, CampaignResult};
use crate::providers::{LocalMailer, SentEmail};

// ============================================================================
// Helper Functions
// ============================================================================

/// Format a list of emails for error messages.
fn format_email_summary(emails: &[SentEmail]) -> String {
    if emails.is_empty() {
        return "  (no emails sent)".to_string();
    }

    emails
        .iter()
        .enumerate()
        .map(|(i, e)| format!("  {}. To: {}, Subject: \"{}\"", i + 1, e.to, e.subject))
        .collect::<Vec<_>>()
        .join("\n")
}

fn last_or_panic(mailer: &LocalMailer) -> SentEmail {
    mailer
        .last_email()
        .expect("Expected at least one email to be sent, but none were sent")
}

// ============================================================================
// Basic Assertions
// ============================================================================

/// Assert that at least one email was sent.
///
/// # Panics
///
/// Panics if no emails were sent.
pub fn assert_email_sent(mailer: &LocalMailer) {
    assert!(
        mailer.has_emails(),
        "Expected at least one email to be sent, but none were sent"
    );
}

/// Assert that no emails were sent.
///
/// # Panics
///
/// Panics if any email was sent.
pub fn assert_no_emails_sent(mailer: &LocalMailer) {
    let emails = mailer.emails();
    assert!(
        emails.is_empty(),
        "Expected no emails to be sent, but {} were sent.\n\nEmails sent:\n{}",
        emails.len(),
        format_email_summary(&emails)
    );
}

/// Assert that exactly N emails were sent.
///
/// # Panics
///
/// Panics if the count doesn't match.
pub fn assert_email_count(mailer: &LocalMailer, expected: usize) {
    let actual = mailer.email_count();
    assert!(
        actual == expected,
        "Expected {} email(s) to be sent, but {} were sent.\n\nEmails sent:\n{}",
        expected,
        actual,
        format_email_summary(&mailer.emails())
    );
}

/// Assert that an email was sent to a specific address.
///
/// # Panics
///
/// Panics if no email was sent to the address.
pub fn assert_email_to(mailer: &LocalMailer, address: &str) {
    assert!(
        mailer.sent_to(address),
        "Expected an email to be sent to '{}'.\n\nEmails sent:\n{}",
        address,
        format_email_summary(&mailer.emails())
    );
}

/// Assert that no email was sent to a specific address.
///
/// # Panics
///
/// Panics if an email was sent to the address.
pub fn assert_no_emails_to(mailer: &LocalMailer, address: &str) {
    let emails = mailer.emails();
    if let Some(found) = emails.iter().find(|e| e.to.eq_ignore_ascii_case(address)) {
        panic!(
            "Expected no email to be sent to '{}', but found one.\n\nMatching email:\n  Subject: \"{}\"\n\nAll emails:\n{}",
            address,
            found.subject,
            format_email_summary(&emails)
        );
    }
}

/// Assert that an email with the exact subject was sent.
///
/// # Panics
///
/// Panics if no email with the subject was found.
pub fn assert_email_subject(mailer: &LocalMailer, subject: &str) {
    assert!(
        mailer.sent_with_subject(subject),
        "Expected an email with subject '{}'.\n\nEmails sent:\n{}",
        subject,
        format_email_summary(&mailer.emails())
    );
}

/// Assert the last email body contains text.
///
/// # Panics
///
/// Panics if no email was sent or the body doesn't contain the text.
pub fn assert_email_body_contains(mailer: &LocalMailer, text: &str) {
    let email = last_or_panic(mailer);
    assert!(
        email.body.contains(text),
        "Expected email body to contain '{}', but it was:\n{}",
        text,
        email.body
    );
}

/// Assert `send` was called exactly once per distinct address.
///
/// Counts failed attempts too.
///
/// # Panics
///
/// Panics if any address was attempted more than once.
pub fn assert_each_attempted_once(mailer: &LocalMailer) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for address in mailer.attempts() {
        *counts.entry(address.to_ascii_lowercase()).or_default() += 1;
    }

    let mut repeated: Vec<_> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
    repeated.sort();
    assert!(
        repeated.is_empty(),
        "Expected one send attempt per address, but these were repeated: {:?}",
        repeated
    );
}

// ============================================================================
// Regex Matching
// ============================================================================

/// Assert the last email subject matches a regex pattern.
///
/// # Panics
///
/// Panics if no email was sent, the pattern is invalid, or it doesn't match.
pub fn assert_email_subject_matches(mailer: &LocalMailer, pattern: &str) {
    let email = last_or_panic(mailer);
    let re = Regex::new(pattern).expect("Invalid regex pattern");
    assert!(
        re.is_match(&email.subject),
        "Expected email subject to match /{}/, but got: \"{}\"",
        pattern,
        email.subject
    );
}

/// Assert the last email body matches a regex pattern.
///
/// # Panics
///
/// Panics if no email was sent, the pattern is invalid, or it doesn't match.
pub fn assert_email_body_matches(mailer: &LocalMailer, pattern: &str) {
    let email = last_or_panic(mailer);
    let re = Regex::new(pattern).expect("Invalid regex pattern");
    assert!(
        re.is_match(&email.body),
        "Expected email body to match /{}/, but got:\n{}",
        pattern,
        email.body
    );
}

// ============================================================================
// Accessors
// ============================================================================

/// Get the last email sent, or panic if none.
///
/// # Panics
///
/// Panics if no emails were sent.
pub fn get_last_email(mailer: &LocalMailer) -> SentEmail {
    last_or_panic(mailer)
}

/// Flush and return all emails from the mailer.
pub fn flush_emails(mailer: &LocalMailer) -> Vec<SentEmail> {
    mailer.flush()
}

/// Get all emails sent to a specific address.
pub fn get_emails_to(mailer: &LocalMailer, address: &str) -> Vec<SentEmail> {
    mailer.find_emails(|e| e.to.eq_ignore_ascii_case(address))
}

// ============================================================================
// Campaign Assertions
// ============================================================================

/// Assert a dispatch completed with the given counts and return its report.
///
/// # Panics
///
/// Panics on `NoRecipients` or mismatching counts.
pub fn assert_completed(
    result: &CampaignResult,
    success_count: usize,
    failure_count: usize,
) -> &CampaignReport {
    let report = match result {
        CampaignResult::Completed(report) => report,
        CampaignResult::NoRecipients => {
            panic!("Expected a completed campaign, but the account had no recipients")
        }
    };
    assert!(
        report.success_count == success_count && report.failure_count == failure_count,
        "Expected {} sent / {} failed, but got {} sent / {} failed.\n\nResults: {:?}",
        success_count,
        failure_count,
        report.success_count,
        report.failure_count,
        report.results
    );
    report
}
