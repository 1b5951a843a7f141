use crate::error::{ApiError, Result};
use crate::ApiConfig;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;

/// Path prefix of the Command Center REST API.
pub const API_PREFIX: &str = "/commandcenter/api";

/// Longest error body kept in [`ApiError::HttpStatus`].
const MAX_ERROR_BODY: usize = 200;

/// Source of raw API documents.
///
/// `path` is relative to the API root and may carry a query string, e.g.
/// `/Job?completedJobLookupTime=3600`.
#[async_trait]
pub trait ApiSource: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<Value>;
}

/// reqwest-backed client for the CommServe API.
///
/// One GET per call, no retries.
pub struct CommvaultClient {
    base_url: String,
    token: String,
    client: Client,
}

impl CommvaultClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let server = config.server_url.trim();
        if server.is_empty() {
            return Err(ApiError::Config("server_url is empty".to_string()));
        }
        if config.accept_invalid_certs {
            tracing::warn!(
                server = %server,
                "TLS certificate verification is disabled for the CommServe API"
            );
        }

        let client = Client::builder()
            .use_rustls_tls()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: format!("{}{}", server.trim_end_matches('/'), API_PREFIX),
            token: config.api_token.clone(),
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ApiSource for CommvaultClient {
    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!(endpoint = %path, "GET");

        let transport = |source| ApiError::Transport {
            endpoint: path.to_string(),
            source,
        };

        let response = self
            .client
            .get(&url)
            .header("Authtoken", &self.token)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Json {
            endpoint: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config(server: &str) -> ApiConfig {
        ApiConfig {
            server_url: server.to_string(),
            api_token: "token-123".to_string(),
            ..Default::default()
        }
    }

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn rejects_empty_server_url() {
        let result = CommvaultClient::new(&config("  "));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn builds_urls_under_api_prefix() {
        let client = CommvaultClient::new(&config("https://cs.example.com/")).unwrap();
        assert_eq!(
            client.url("/V4/mediaAgent"),
            "https://cs.example.com/commandcenter/api/V4/mediaAgent"
        );
    }

    #[test]
    fn builds_with_certificate_checks_disabled() {
        let cfg = ApiConfig {
            accept_invalid_certs: true,
            ..config("https://cs.example.com")
        };
        assert!(CommvaultClient::new(&cfg).is_ok());
    }

    #[tokio::test]
    async fn sends_fixed_headers_and_parses_json() {
        let (server, handle) =
            serve_once("HTTP/1.1 200 OK", r#"{"expiryDate":"2030-01-01"}"#).await;
        let client = CommvaultClient::new(&config(&server)).unwrap();

        let value = client.get_json("/V4/License").await.unwrap();
        assert_eq!(value["expiryDate"], "2030-01-01");

        let request = handle.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /commandcenter/api/v4/license"));
        assert!(request.contains("authtoken: token-123"));
        assert!(request.contains("accept: application/json"));
        assert!(request.contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (server, _handle) = serve_once("HTTP/1.1 401 Unauthorized", r#"{"errorCode":5}"#).await;
        let client = CommvaultClient::new(&config(&server)).unwrap();

        let err = client.get_json("/Library").await.unwrap_err();
        match err {
            ApiError::HttpStatus { status, endpoint, .. } => {
                assert_eq!(status, 401);
                assert_eq!(endpoint, "/Library");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_json_is_an_error() {
        let (server, _handle) = serve_once("HTTP/1.1 200 OK", "<html>login</html>").await;
        let client = CommvaultClient::new(&config(&server)).unwrap();

        let err = client.get_json("/CommServ").await.unwrap_err();
        assert!(matches!(err, ApiError::Json { .. }));
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = CommvaultClient::new(&config(&format!("http://{addr}"))).unwrap();
        let err = client.get_json("/Client").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }
}
