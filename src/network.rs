use std::time::Duration;
use tokio::time::timeout;

use crate::config::Config;

/// HTTP client shared by every source extractor
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout_duration: Duration,
    user_agent: String,
    max_content_size: usize,
}

impl HttpClient {
    /// Create a client whose every request is bounded by `timeout_secs`.
    pub fn new(user_agent: String, timeout_secs: u64) -> Result<Self, FetchError> {
        Self::with_content_limit(user_agent, timeout_secs, Config::MAX_CONTENT_SIZE)
    }

    /// Create a client with a custom content size limit
    pub fn with_content_limit(
        user_agent: String,
        timeout_secs: u64,
        max_content_size: usize,
    ) -> Result<Self, FetchError> {
        let timeout_duration = Duration::from_secs(timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout_duration)
            .connect_timeout(timeout_duration.min(Duration::from_secs(Config::CONNECT_TIMEOUT_SECS)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            timeout_duration,
            user_agent,
            max_content_size,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_duration
    }

    /// Fetch a URL once. There are no retries: portals are polled every few
    /// hours and a failed read simply becomes a standing entry.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let response = timeout(
            self.timeout_duration,
            self.client
                .get(url)
                .header(
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header("Accept-Language", "en-US,en;q=0.5")
                .send(),
        )
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(Self::classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        if let Some(length) = response.content_length() {
            let length = usize::try_from(length).unwrap_or(usize::MAX);
            if length > self.max_content_size {
                return Err(FetchError::ContentTooLarge(length, self.max_content_size));
            }
        }

        let content = timeout(self.timeout_duration, response.text())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(|e| FetchError::BodyError(e.to_string()))?;

        if content.len() > self.max_content_size {
            return Err(FetchError::ContentTooLarge(
                content.len(),
                self.max_content_size,
            ));
        }

        Ok(FetchResult {
            content,
            status_code: status.as_u16(),
            content_type,
        })
    }

    fn classify_error(error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout;
        }

        let error_msg = format!("{:?}", error).to_lowercase();

        if error_msg.contains("connection refused") {
            return FetchError::ConnectionRefused;
        }
        if error_msg.contains("dns") || error_msg.contains("name resolution") {
            return FetchError::DnsError;
        }
        if error_msg.contains("certificate") || error_msg.contains("tls") {
            return FetchError::SslError;
        }

        FetchError::NetworkError(error.to_string())
    }
}

/// Result of a successful HTTP fetch
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub content: String,
    pub status_code: u16,
    pub content_type: Option<String>,
}

impl FetchResult {
    /// True unless the server said the body is something other than HTML.
    /// A missing content type is given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            }
            None => true,
        }
    }
}

/// Errors that can occur during HTTP fetching
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Connection refused - server not accepting connections")]
    ConnectionRefused,

    #[error("DNS resolution failed")]
    DnsError,

    #[error("SSL/TLS error - certificate or encryption issue")]
    SslError,

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Failed to read response body: {0}")]
    BodyError(String),

    #[error("Content too large: {0} bytes (max: {1} bytes)")]
    ContentTooLarge(usize, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let client = HttpClient::new("TestBot/1.0".to_string(), 5).unwrap();

        let result = client.fetch("not-a-url").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_port() {
        let client = HttpClient::new("TestBot/1.0".to_string(), 2).unwrap();

        // Port 1 on loopback is essentially never listening
        let result = client.fetch("http://127.0.0.1:1/").await;

        assert!(result.is_err());
    }

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new("TestBot/1.0".to_string(), 30).unwrap();
        assert_eq!(client.user_agent(), "TestBot/1.0");
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_is_html() {
        let mut result = FetchResult {
            content: String::new(),
            status_code: 200,
            content_type: Some("text/html; charset=utf-8".to_string()),
        };
        assert!(result.is_html());

        result.content_type = Some("application/pdf".to_string());
        assert!(!result.is_html());

        result.content_type = None;
        assert!(result.is_html());
    }
}
