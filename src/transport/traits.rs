//! Session abstraction for the SMTP transport.
//!
//! The transport drives the session lifecycle; these traits let tests inject
//! an in-memory session while production uses lettre's connection.

use std::time::Duration;

use async_trait::async_trait;

use super::SecurityMode;
use crate::compose::ComposedMessage;
use crate::error::TransportError;
use crate::request::SmtpCredentials;

/// Everything needed to open one SMTP session.
#[derive(Debug, Clone, Copy)]
pub struct ConnectRequest<'a> {
    pub server: &'a str,
    pub port: u16,
    pub mode: SecurityMode,
    /// Name announced in EHLO.
    pub client_id: &'a str,
    pub timeout: Duration,
}

impl ConnectRequest<'_> {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }
}

/// Opens SMTP sessions.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Connect, negotiate TLS when `mode` asks for it, and complete the greeting.
    async fn connect(
        &self,
        request: &ConnectRequest<'_>,
    ) -> Result<Box<dyn SmtpSession>, TransportError>;
}

/// An established SMTP session.
#[async_trait]
pub trait SmtpSession: Send {
    async fn authenticate(&mut self, credentials: &SmtpCredentials) -> Result<(), TransportError>;

    async fn send(&mut self, message: &ComposedMessage) -> Result<(), TransportError>;

    /// Release the session. Must not fail: a graceful `QUIT` that goes wrong
    /// falls back to dropping the socket.
    async fn close(&mut self);
}
