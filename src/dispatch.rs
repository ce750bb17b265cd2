//! One alert, end to end: compose, then deliver.

use crate::compose::compose;
use crate::error::AlertError;
use crate::request::AlertRequest;
use crate::transport::Transport;

/// Lines echoed to stdout before sending; the supervisor redirects them to its log.
pub fn echo_lines(request: &AlertRequest, hostname: &str) -> Vec<String> {
    vec![
        format!("Sending email from: {}", request.from_email),
        format!("Sending email to: {}", request.to_email),
        format!("Email Alert Subject: {}", request.subject),
        format!("Email Alert Timestamp: {}", request.timestamp),
        format!("Email Alert Process: {}", request.process_name),
        format!("Email Alert Message Content: {}", request.message_body),
        format!("Email Alert Message Hostname: {}", hostname),
    ]
}

/// Compose the alert for `request` and send it with a single attempt.
///
/// `hostname` goes into the HTML body and is the EHLO identity of the session.
pub async fn send_alert(
    request: &AlertRequest,
    hostname: &str,
    transport: &Transport,
) -> Result<(), AlertError> {
    let message = compose(request, hostname)?;
    transport.deliver(&request.smtp, hostname, message).await?;
    Ok(())
}
