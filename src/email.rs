// src/email.rs
use log::info;

use crate::domain::Errors;

/// Outbound mail. Every call site treats delivery as fire-and-forget: a
/// failure is logged by the caller and never unwinds the state change that
/// triggered the mail.
pub trait EmailSender: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), Errors>;
}

/// Default sender that writes the mail to the log instead of an SMTP relay.
pub struct LogMailer;

impl EmailSender for LogMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), Errors> {
        info!("email to {}: {} / {}", to, subject, body);
        Ok(())
    }
}
