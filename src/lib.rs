// src/lib.rs
//! HA-Lizard alert dispatcher - one email per supervisor event.

pub mod cli;
pub mod compose;
pub mod dispatch;
pub mod error;
pub mod hostname;
pub mod logging;
pub mod request;
pub mod secret;
pub mod template;
pub mod transport;
pub mod usage_report;

// Re-export commonly used types
pub use cli::{Cli, LogFormat};
pub use compose::{ComposedMessage, compose};
pub use dispatch::{echo_lines, send_alert};
pub use error::{AlertError, ComposeError, ReportError, TransportError, UsageError};
pub use request::{AlertRequest, SmtpCredentials, SmtpSettings};
pub use secret::SecretString;
pub use transport::{SecurityMode, Transport, TransportConfig};
pub use usage_report::UsageReporter;
