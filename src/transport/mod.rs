//! SMTP transport: one session per alert.
//!
//! The session moves through
//! `Unconnected -> Connected -> (Authenticated | Connected) -> Sent -> Closed`
//! and any state may jump to `Closed` on error. Once a connection exists it is
//! always closed before [`Transport::deliver`] returns.
//!
//! Every blocking stage (connect including DNS and greeting, authentication,
//! send, close) is bounded by the same [`TransportConfig::timeout`].

mod smtp;
mod traits;


use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

pub use smtp::{LettreConnector, LettreSession};
pub use traits::{ConnectRequest, SessionConnector, SmtpSession};

use crate::compose::ComposedMessage;
use crate::error::TransportError;
use crate::request::SmtpSettings;

/// Ceiling applied to every socket operation of a session.
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(2);

/// Port on which the session starts with TLS (SMTPS).
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// How the TCP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityMode {
    Plaintext,
    /// TLS handshake right after connect, before the SMTP greeting.
    ImplicitTls,
}

impl SecurityMode {
    /// Port 465 selects implicit TLS, anything else plaintext. There is no
    /// STARTTLS upgrade.
    pub fn for_port(port: u16) -> Self {
        if port == IMPLICIT_TLS_PORT {
            SecurityMode::ImplicitTls
        } else {
            SecurityMode::Plaintext
        }
    }
}

impl std::fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityMode::Plaintext => write!(f, "plaintext"),
            SecurityMode::ImplicitTls => write!(f, "implicit-tls"),
        }
    }
}

/// Blocking stage of a session, used to label timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Authenticate,
    Send,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Connect => "connect",
            Stage::Authenticate => "authenticate",
            Stage::Send => "send",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unconnected,
    Connected,
    Authenticated,
    Sent,
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Unconnected => "unconnected",
            SessionState::Connected => "connected",
            SessionState::Authenticated => "authenticated",
            SessionState::Sent => "sent",
            SessionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Transport settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Ceiling for each blocking stage.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SOCKET_TIMEOUT,
        }
    }
}

/// Delivers one composed alert over SMTP.
pub struct Transport {
    connector: Arc<dyn SessionConnector>,
    config: TransportConfig,
}

impl Transport {
    /// Transport backed by real SMTP connections.
    pub fn new(config: TransportConfig) -> Self {
        Self::with_connector(config, Arc::new(LettreConnector))
    }

    /// Transport with an injected connector.
    pub fn with_connector(config: TransportConfig, connector: Arc<dyn SessionConnector>) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Send `message` through `settings.server`, announcing `client_id` in EHLO.
    ///
    /// Takes ownership of the message: it lives only for this one session.
    pub async fn deliver(
        &self,
        settings: &SmtpSettings,
        client_id: &str,
        message: ComposedMessage,
    ) -> Result<(), TransportError> {
        let mode = SecurityMode::for_port(settings.port);
        let span = tracing::info_span!(
            "smtp_session",
            server = %settings.endpoint(),
            mode = %mode,
        );

        async move {
            let result = self.run_session(settings, mode, client_id, &message).await;
            match &result {
                Ok(()) => tracing::info!(to = %message.to(), "Alert email delivered"),
                Err(e) => tracing::error!(error = %e, "Alert email delivery failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_session(
        &self,
        settings: &SmtpSettings,
        mode: SecurityMode,
        client_id: &str,
        message: &ComposedMessage,
    ) -> Result<(), TransportError> {
        let mut state = SessionState::Unconnected;
        let request = ConnectRequest {
            server: &settings.server,
            port: settings.port,
            mode,
            client_id,
            timeout: self.config.timeout,
        };

        let connect = self.connector.connect(&request);
        let mut session = match self.bounded(Stage::Connect, connect).await {
            Ok(session) => session,
            Err(e) => {
                advance(&mut state, SessionState::Closed);
                return Err(e);
            }
        };
        advance(&mut state, SessionState::Connected);

        let outcome = self.exchange(session.as_mut(), settings, message, &mut state).await;

        // Teardown runs whatever the exchange returned.
        if tokio::time::timeout(self.config.timeout, session.close())
            .await
            .is_err()
        {
            tracing::warn!(
                after_secs = self.config.timeout.as_secs_f64(),
                "SMTP close timed out, dropping connection"
            );
        }
        drop(session);
        advance(&mut state, SessionState::Closed);

        outcome
    }

    async fn exchange(
        &self,
        session: &mut dyn SmtpSession,
        settings: &SmtpSettings,
        message: &ComposedMessage,
        state: &mut SessionState,
    ) -> Result<(), TransportError> {
        if let Some(credentials) = &settings.credentials {
            self.bounded(Stage::Authenticate, session.authenticate(credentials))
                .await?;
            advance(state, SessionState::Authenticated);
        } else {
            tracing::debug!("No SMTP credentials, sending unauthenticated");
        }

        self.bounded(Stage::Send, session.send(message)).await?;
        advance(state, SessionState::Sent);
        Ok(())
    }

    /// Run one stage under the session-wide ceiling.
    async fn bounded<T, F>(&self, stage: Stage, fut: F) -> Result<T, TransportError>
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        match tokio::time::timeout(self.config.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                stage,
                after: self.config.timeout,
            }),
        }
    }
}

fn advance(state: &mut SessionState, next: SessionState) {
    tracing::debug!(from = %state, to = %next, "SMTP session state");
    *state = next;
}
