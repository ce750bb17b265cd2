//! Alert message composer.
//!
//! Turns an [`AlertRequest`] plus the local hostname into a
//! `multipart/alternative` email: the raw body as `text/plain` and the branded
//! template as `text/html`. Composition is pure; the hostname is the only
//! input that comes from outside the request.

use lettre::message::{Mailbox, MultiPart};
use lettre::{Address, Message};

use crate::error::ComposeError;
use crate::request::AlertRequest;
use crate::template::{AlertSlots, AlertTemplate, html_line_breaks};

/// Display name used on the `From` header.
pub const PRODUCT_NAME: &str = "HA-Lizard";

/// A fully built alert email, ready to hand to the transport.
#[derive(Debug, Clone)]
pub struct ComposedMessage {
    subject: String,
    from: Mailbox,
    to: Mailbox,
    text_body: String,
    html_body: String,
    message: Message,
}

impl ComposedMessage {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn from(&self) -> &Mailbox {
        &self.from
    }

    pub fn to(&self) -> &Mailbox {
        &self.to
    }

    /// The `text/plain` part, identical to the supplied message body.
    pub fn text_body(&self) -> &str {
        &self.text_body
    }

    /// The `text/html` part.
    pub fn html_body(&self) -> &str {
        &self.html_body
    }

    /// The MIME message, including its single-sender/single-recipient envelope.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Wire form of the message as sent after `DATA`.
    pub fn formatted(&self) -> Vec<u8> {
        self.message.formatted()
    }
}

/// Build the alert email for `request`, stamped with `hostname`.
pub fn compose(request: &AlertRequest, hostname: &str) -> Result<ComposedMessage, ComposeError> {
    let from_address: Address =
        request
            .from_email
            .parse()
            .map_err(|e: lettre::address::AddressError| ComposeError::InvalidAddress {
                field: "from",
                value: request.from_email.clone(),
                message: e.to_string(),
            })?;
    let from = Mailbox::new(Some(PRODUCT_NAME.to_string()), from_address);

    let to: Mailbox =
        request
            .to_email
            .parse()
            .map_err(|e: lettre::address::AddressError| ComposeError::InvalidAddress {
                field: "to",
                value: request.to_email.clone(),
                message: e.to_string(),
            })?;

    let text_body = request.message_body.clone();
    let body_html = html_line_breaks(&request.message_body);
    let html_body = AlertTemplate::new()?.render(&AlertSlots {
        process_name: &request.process_name,
        hostname,
        timestamp: &request.timestamp,
        body: &body_html,
    })?;

    let message = Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(request.subject.as_str())
        .multipart(MultiPart::alternative_plain_html(
            text_body.clone(),
            html_body.clone(),
        ))
        .map_err(|e| ComposeError::Build(e.to_string()))?;

    tracing::debug!(
        subject = %request.subject,
        to = %to,
        text_len = text_body.len(),
        html_len = html_body.len(),
        "Alert email composed"
    );

    Ok(ComposedMessage {
        subject: request.subject.clone(),
        from,
        to,
        text_body,
        html_body,
        message,
    })
}
