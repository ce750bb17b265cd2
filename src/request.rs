//! Alert request assembled from the command line.
//!
//! Values arrive as untyped strings. The SMTP port is parsed here so that a
//! bad port fails before any socket is opened; everything else is carried
//! through as opaque text.

use crate::cli::Cli;
use crate::error::UsageError;
use crate::secret::SecretString;

/// SMTP login, present only when both user and password were supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: SecretString,
}

impl SmtpCredentials {
    /// Build credentials from the raw user/pass arguments.
    ///
    /// Returns `None` unless both are non-empty; a lone user or lone password
    /// means the session runs unauthenticated.
    pub fn from_parts(username: &str, password: &str) -> Option<Self> {
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self {
            username: username.to_string(),
            password: SecretString::new(password.to_string()),
        })
    }
}

/// Where and how to reach the SMTP relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub credentials: Option<SmtpCredentials>,
}

impl SmtpSettings {
    /// `host:port` form used in logs and error messages.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }
}

/// Parse the SMTP port argument.
pub fn parse_port(value: &str) -> Result<u16, UsageError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|e| UsageError::InvalidPort {
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// One alert, exactly as the supervisor described it.
#[derive(Debug, Clone)]
pub struct AlertRequest {
    pub from_email: String,
    pub to_email: String,
    pub subject: String,
    pub timestamp: String,
    pub process_name: String,
    pub message_body: String,
    pub smtp: SmtpSettings,
}

impl TryFrom<Cli> for AlertRequest {
    type Error = UsageError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if cli.from_email.is_empty() {
            return Err(UsageError::EmptyAddress {
                field: "from_email",
            });
        }
        if cli.to_email.is_empty() {
            return Err(UsageError::EmptyAddress { field: "to_email" });
        }

        let port = parse_port(&cli.smtp_port)?;
        let credentials = SmtpCredentials::from_parts(&cli.smtp_user, &cli.smtp_pass);

        Ok(Self {
            from_email: cli.from_email,
            to_email: cli.to_email,
            subject: cli.subject,
            timestamp: cli.timestamp,
            process_name: cli.process_name,
            message_body: cli.message_body,
            smtp: SmtpSettings {
                server: cli.smtp_server,
                port,
                credentials,
            },
        })
    }
}
