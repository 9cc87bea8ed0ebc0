//! Email provider implementations.
//!
//! Each provider implements the [`Mailer`](crate::Mailer) trait.
//!
//! ## Available Providers
//!
//! | Provider | Feature Flag | Description |
//! |----------|-------------|-------------|
//! | [`ResendMailer`] | `resend` | Resend API |
//! | [`LocalMailer`] | `local` | In-memory capture for dev/testing |
//! | [`LoggerMailer`] | (none) | Logs emails without sending |

#[cfg(feature = "resend")]
mod resend;
#[cfg(feature = "resend")]
pub use resend::ResendMailer;

#[cfg(feature = "local")]
mod local;
#[cfg(feature = "local")]
pub use local::{LocalMailer, SentEmail};

mod logger;
pub use logger::LoggerMailer;
