//! Install-time usage report.
//!
//! A single HTTP GET carrying the installed version as the `VERSION` query
//! parameter. Runs once from the installer and shares nothing with alerting.

use std::time::Duration;

use crate::error::ReportError;

/// Counting endpoint queried at install time.
pub const DEFAULT_REPORT_ENDPOINT: &str = "http://halizard.pulse-lists.com/count.php";

/// Request timeout for the report.
pub const REPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends the version report to a counting endpoint.
#[derive(Debug, Clone)]
pub struct UsageReporter {
    client: reqwest::Client,
    endpoint: String,
}

impl UsageReporter {
    /// Reporter with its own HTTP client bounded by `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReportError::Request(e.to_string()))?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Report `version`. Any non-2xx status is a failure.
    pub async fn report(&self, version: &str) -> Result<(), ReportError> {
        tracing::debug!(endpoint = %self.endpoint, version = %version, "Sending usage report");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("VERSION", version)])
            .send()
            .await
            .map_err(|e| ReportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Usage report rejected");
            return Err(ReportError::Status(status.as_u16()));
        }

        tracing::info!(version = %version, "Usage report sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_reporter(server: &MockServer) -> UsageReporter {
        UsageReporter::new(format!("{}/count.php", server.uri()), REPORT_TIMEOUT).unwrap()
    }

    #[test]
    fn default_endpoint_and_timeout() {
        let reporter = UsageReporter::new(DEFAULT_REPORT_ENDPOINT, REPORT_TIMEOUT).unwrap();
        assert_eq!(
            reporter.endpoint(),
            "http://halizard.pulse-lists.com/count.php"
        );
        assert_eq!(REPORT_TIMEOUT, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn report_sends_version_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/count.php"))
            .and(query_param("VERSION", "2.3.1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let result = make_reporter(&server).report("2.3.1").await;
        assert!(result.is_ok(), "report failed: {:?}", result.err());
    }

    #[tokio::test]
    async fn report_encodes_version_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/count.php"))
            .and(query_param("VERSION", "2.3 beta&x=1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        assert!(make_reporter(&server).report("2.3 beta&x=1").await.is_ok());
    }

    #[tokio::test]
    async fn report_fails_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/count.php"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = make_reporter(&server).report("2.3.1").await.unwrap_err();
        assert!(matches!(err, ReportError::Status(500)), "got {:?}", err);
    }

    #[tokio::test]
    async fn report_fails_on_not_found() {
        let server = MockServer::start().await;

        let err = make_reporter(&server).report("2.3.1").await.unwrap_err();
        assert!(matches!(err, ReportError::Status(404)), "got {:?}", err);
    }

    #[tokio::test]
    async fn report_fails_when_unreachable() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let reporter = UsageReporter::new(
            format!("http://127.0.0.1:{}/count.php", port),
            Duration::from_secs(2),
        )
        .unwrap();

        let err = reporter.report("2.3.1").await.unwrap_err();
        assert!(matches!(err, ReportError::Request(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn report_times_out_on_slow_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let reporter = UsageReporter::new(
            format!("{}/count.php", server.uri()),
            Duration::from_millis(200),
        )
        .unwrap();

        let err = reporter.report("2.3.1").await.unwrap_err();
        assert!(matches!(err, ReportError::Request(_)), "got {:?}", err);
    }
}
