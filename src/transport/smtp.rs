//! lettre-backed SMTP session.
//!
//! Uses `AsyncSmtpConnection` directly rather than `AsyncSmtpTransport` so the
//! session is opened and closed exactly once per alert, with no connection
//! pool keeping a socket alive after the send.

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use lettre::transport::smtp::Error as SmtpError;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{AsyncSmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;

use super::traits::{ConnectRequest, SessionConnector, SmtpSession};
use super::{SecurityMode, Stage};
use crate::compose::ComposedMessage;
use crate::error::TransportError;
use crate::request::SmtpCredentials;

/// Mechanisms offered for login, in preference order.
const AUTH_MECHANISMS: &[Mechanism] = &[Mechanism::Plain, Mechanism::Login];

/// Production connector opening real SMTP sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct LettreConnector;

#[async_trait]
impl SessionConnector for LettreConnector {
    async fn connect(
        &self,
        request: &ConnectRequest<'_>,
    ) -> Result<Box<dyn SmtpSession>, TransportError> {
        let endpoint = request.endpoint();

        let tls_parameters = match request.mode {
            SecurityMode::Plaintext => None,
            SecurityMode::ImplicitTls => Some(
                TlsParameters::new(request.server.to_string()).map_err(|e| {
                    TransportError::Tls {
                        server: endpoint.clone(),
                        message: e.to_string(),
                    }
                })?,
            ),
        };

        let hello_name = ClientId::Domain(request.client_id.to_string());
        let connection = AsyncSmtpConnection::connect_tokio1(
            (request.server, request.port),
            Some(request.timeout),
            &hello_name,
            tls_parameters,
            None,
        )
        .await
        .map_err(|e| connect_error(&endpoint, request, e))?;

        tracing::debug!(
            server = %endpoint,
            mode = %request.mode,
            "SMTP greeting completed"
        );

        Ok(Box::new(LettreSession {
            connection,
            endpoint,
            timeout: request.timeout,
        }))
    }
}

/// One live lettre connection.
pub struct LettreSession {
    connection: AsyncSmtpConnection,
    endpoint: String,
    timeout: Duration,
}

#[async_trait]
impl SmtpSession for LettreSession {
    async fn authenticate(&mut self, credentials: &SmtpCredentials) -> Result<(), TransportError> {
        let credentials = Credentials::new(
            credentials.username.clone(),
            credentials.password.expose().to_string(),
        );
        self.connection
            .auth(AUTH_MECHANISMS, &credentials)
            .await
            .map(|_| ())
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        stage: Stage::Authenticate,
                        after: self.timeout,
                    }
                } else {
                    TransportError::Auth(e.to_string())
                }
            })
    }

    async fn send(&mut self, message: &ComposedMessage) -> Result<(), TransportError> {
        let envelope = message.message().envelope();
        let response = self
            .connection
            .send(envelope, &message.formatted())
            .await
            .map_err(|e| send_error(self.timeout, e))?;

        tracing::debug!(
            server = %self.endpoint,
            code = %response.code(),
            "Message accepted by server"
        );
        Ok(())
    }

    async fn close(&mut self) {
        if self.connection.has_broken() {
            self.connection.abort().await;
            return;
        }
        if let Err(e) = self.connection.quit().await {
            tracing::debug!(server = %self.endpoint, error = %e, "QUIT failed, aborting connection");
            self.connection.abort().await;
        }
    }
}

fn connect_error(endpoint: &str, request: &ConnectRequest<'_>, e: SmtpError) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout {
            stage: Stage::Connect,
            after: request.timeout,
        }
    } else if e.is_tls() || failed_in_handshake(request.mode, &e) {
        TransportError::Tls {
            server: endpoint.to_string(),
            message: e.to_string(),
        }
    } else {
        TransportError::Connect {
            server: endpoint.to_string(),
            message: e.to_string(),
        }
    }
}

/// lettre reports a failed implicit-TLS handshake as a plain connection
/// error. Resolve, TCP connect and greeting I/O failures carry an
/// `io::Error` source; the handshake carries the TLS library's error.
fn failed_in_handshake(mode: SecurityMode, e: &SmtpError) -> bool {
    mode == SecurityMode::ImplicitTls
        && e.status().is_none()
        && !e.is_response()
        && !e.is_client()
        && !e
            .source()
            .is_some_and(|source| source.is::<std::io::Error>())
}

fn send_error(timeout: Duration, e: SmtpError) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout {
            stage: Stage::Send,
            after: timeout,
        }
    } else if is_auth_required(&e) {
        TransportError::Auth(e.to_string())
    } else {
        TransportError::Send(e.to_string())
    }
}

/// `530 Authentication required`: the relay wanted credentials we did not send.
fn is_auth_required(e: &SmtpError) -> bool {
    e.status().is_some_and(|code| code.to_string() == "530")
}
