//! HTTP client implementation using reqwest.
//!
//! This adapter implements the `StatusSource` and `RecordsGateway` ports.
//! It only moves JSON; payload validation stays in the application layer.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;
use tickwatch_application::ports::{RecordsGateway, StatusSource};
use tickwatch_application::{ApplicationError, ApplicationResult};
use tickwatch_domain::ClockConfig;

const USER_AGENT: &str = concat!("Tickwatch/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the time authority and the records service.
pub struct ReqwestApiClient {
    client: Client,
    server_url: String,
    records_url: String,
    request_timeout: Duration,
}

impl ReqwestApiClient {
    /// Creates a client for the URLs in `config`.
    ///
    /// Default configuration:
    /// - Connection timeout: `config.connect_timeout_secs`
    /// - Records request timeout: `config.request_timeout_secs`
    /// - Follow redirects: up to 10
    /// - User-Agent: "Tickwatch/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(config: &ClockConfig) -> ApplicationResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ApplicationError::Transport(e.to_string()))?;

        Ok(Self::with_client(client, config))
    }

    /// Creates a client around a custom reqwest client.
    #[must_use]
    pub fn with_client(client: Client, config: &ClockConfig) -> Self {
        Self {
            client,
            server_url: config.server_url.clone(),
            records_url: config.records_url.clone(),
            request_timeout: config.request_timeout(),
        }
    }

    fn endpoint(base: &str, path: &str) -> ApplicationResult<Url> {
        let raw = format!("{}{path}", base.trim_end_matches('/'));
        Url::parse(&raw).map_err(|e| ApplicationError::Transport(format!("invalid URL {raw}: {e}")))
    }

    /// URL of the baseline status endpoint.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the configured server URL is malformed.
    pub fn status_url(&self) -> ApplicationResult<Url> {
        Self::endpoint(&self.server_url, "/api/status")
    }

    async fn read_json(response: reqwest::Response) -> ApplicationResult<Value> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(Self::map_error)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            if status.is_success() {
                ApplicationError::Transport(format!("response body is not JSON: {e}"))
            } else {
                ApplicationError::Transport(format!("HTTP {status}"))
            }
        })
    }

    /// Maps reqwest errors to application errors.
    fn map_error(error: reqwest::Error) -> ApplicationError {
        if error.is_timeout() {
            return ApplicationError::Timeout;
        }

        let host = || {
            error
                .url()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string())
        };

        if error.is_connect() {
            return ApplicationError::Transport(format!("could not connect to {}: {error}", host()));
        }

        if error.is_redirect() {
            return ApplicationError::Transport("too many redirects (max 10)".to_string());
        }

        ApplicationError::Transport(error.to_string())
    }
}

impl StatusSource for ReqwestApiClient {
    fn fetch_status(&self) -> impl Future<Output = ApplicationResult<Value>> + Send {
        async move {
            let url = self.status_url()?;
            tracing::debug!(%url, "fetching baseline status");
            let response = self.client.get(url).send().await.map_err(Self::map_error)?;
            Self::read_json(response).await
        }
    }
}

impl RecordsGateway for ReqwestApiClient {
    fn post(
        &self,
        endpoint: &'static str,
        body: Value,
    ) -> impl Future<Output = ApplicationResult<Value>> + Send {
        async move {
            let url = Self::endpoint(&self.records_url, endpoint)?;
            tracing::debug!(%url, "posting records request");
            let response = self
                .client
                .post(url)
                .timeout(self.request_timeout)
                .json(&body)
                .send()
                .await
                .map_err(Self::map_error)?;
            Self::read_json(response).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP/1.1 response and returns the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn test_client_creation() {
        assert!(ReqwestApiClient::new(&ClockConfig::default()).is_ok());
    }

    #[test]
    fn status_url_tolerates_trailing_slash() {
        let client = ReqwestApiClient::new(&ClockConfig::new("http://example.com/clock/")).unwrap();
        assert_eq!(
            client.status_url().unwrap().as_str(),
            "http://example.com/clock/api/status"
        );
    }

    #[tokio::test]
    async fn fetch_status_returns_the_json_body() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"currentTick":"2024-01-01T00:00:00Z","currentCount":1}"#,
        )
        .await;
        let client = ReqwestApiClient::new(&ClockConfig::new(base)).unwrap();

        let body = client.fetch_status().await.unwrap();
        assert_eq!(body["currentCount"], 1);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/status HTTP/1.1"));
    }

    #[tokio::test]
    async fn non_json_error_page_is_a_transport_error() {
        let (base, _server) = serve_once("503 Service Unavailable", "<html>down</html>").await;
        let client = ReqwestApiClient::new(&ClockConfig::new(base)).unwrap();
        let err = client.fetch_status().await.unwrap_err();
        assert_eq!(err, ApplicationError::Transport("HTTP 503 Service Unavailable".into()));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = ReqwestApiClient::new(&ClockConfig::new(format!("http://{addr}"))).unwrap();
        assert!(client.fetch_status().await.unwrap_err().is_transport());
    }

    #[tokio::test]
    async fn post_sends_json_to_the_records_service() {
        let (base, server) = serve_once("200 OK", r#"{"studentID":5}"#).await;
        let config = ClockConfig::default().with_records_url(base);
        let client = ReqwestApiClient::new(&config).unwrap();

        let reply = client
            .post("/api/addStudent", json!({ "password": "pw", "studentName": "Ada" }))
            .await
            .unwrap();
        assert_eq!(reply, json!({ "studentID": 5 }));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/addStudent HTTP/1.1"));
        assert!(request.contains(r#""studentName":"Ada""#));
    }

    #[tokio::test]
    async fn silent_records_service_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
            drop(socket);
        });

        let mut config = ClockConfig::default().with_records_url(format!("http://{addr}"));
        config.request_timeout_secs = 1;
        let client = ReqwestApiClient::new(&config).unwrap();

        let err = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            client.post("/api/addStudent", json!({ "password": "pw" })),
        )
        .await
        .unwrap()
        .unwrap_err();
        assert_eq!(err, ApplicationError::Timeout);
        server.abort();
    }
}
