//! Centralized error types for the alert dispatcher using thiserror.

use std::time::Duration;

use thiserror::Error;

use crate::transport::Stage;

/// Errors raised while validating command-line input, before any network activity.
#[derive(Error, Debug)]
pub enum UsageError {
    #[error("expected {expected} arguments, got {got}")]
    WrongArgumentCount { expected: usize, got: usize },
    #[error("malformed arguments: {0}")]
    Malformed(String),
    #[error("invalid SMTP port '{value}': {message}")]
    InvalidPort { value: String, message: String },
    #[error("{field} must not be empty")]
    EmptyAddress { field: &'static str },
}

/// Errors related to building the alert email.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// The argument boundary only rejects empty addresses. lettre still needs
    /// a parseable mailbox, so a bare local part such as `root` lands here
    /// while `root@localhost` is accepted.
    #[error("invalid {field} address '{value}': {message}")]
    InvalidAddress {
        field: &'static str,
        value: String,
        message: String,
    },
    #[error("template render failed: {0}")]
    Template(String),
    #[error("failed to build email: {0}")]
    Build(String),
}

/// Errors raised by the SMTP session lifecycle.
///
/// Timeouts are a specialization of transport failure; callers handle every
/// variant the same way and only the message text differs.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection to {server} failed: {message}")]
    Connect { server: String, message: String },
    #[error("TLS negotiation with {server} failed: {message}")]
    Tls { server: String, message: String },
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("send failed: {0}")]
    Send(String),
    #[error("{stage} timed out after {}s", .after.as_secs_f64())]
    Timeout { stage: Stage, after: Duration },
}

/// Any failure after argument validation; every variant ends the run with exit 1.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors related to the install-time usage report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server returned HTTP {0}")]
    Status(u16),
}
