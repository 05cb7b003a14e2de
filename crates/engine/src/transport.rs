//! Network transport behind the strategy executors.
//!
//! The `NetworkTransport` trait is the seam between strategies and the real
//! network; tests substitute a mock. The reqwest-backed implementation
//! enforces a timeout, a redirect limit and a body-size ceiling, but does
//! not translate HTTP error statuses into errors: any response the server
//! produced is a transport success. Only connection-level failures map to
//! `Error::Network`, which is what the fallback chain recovers from.
//!
//! Cancellation is cooperative: dropping the fetch future aborts the
//! in-flight request.

use std::time::Duration;

use async_trait::async_trait;
use waylay_core::{EngineConfig, Error};

use crate::request::EngineRequest;
use crate::response::{ResponseSource, ServedResponse};

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User agent string (default: "waylay/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: "waylay/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&EngineConfig> for TransportConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: 5,
        }
    }
}

/// The network seam used by every strategy executor.
#[async_trait]
pub trait NetworkTransport: Send + Sync {
    /// Perform the request, returning whatever response the origin
    /// produced. `Err` means the origin could not be reached at all.
    async fn fetch(&self, request: &EngineRequest) -> Result<ServedResponse, Error>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    http: reqwest::Client,
    config: TransportConfig,
}

impl HttpTransport {
    /// Create a new transport with the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl NetworkTransport for HttpTransport {
    async fn fetch(&self, request: &EngineRequest) -> Result<ServedResponse, Error> {
        let mut outbound = self.http.request(request.method.clone(), request.url.clone());
        for (name, value) in &request.headers {
            outbound = outbound.header(name, value);
        }

        let response = outbound
            .send()
            .await
            .map_err(|e| Error::Network(format!("network error: {e}")))?;

        let status = response.status().as_u16();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| (name.to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", body.len(), self.config.max_bytes)));
        }

        tracing::debug!(url = %request.url, status, bytes = body.len(), "fetched");

        Ok(ServedResponse { status, headers, body, source: ResponseSource::Network })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_config_default() {
        let config = TransportConfig::default();
        assert_eq!(config.user_agent, "waylay/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_transport_config_from_engine_config() {
        let engine_config = EngineConfig { user_agent: "shell/2.0".into(), max_bytes: 1024, timeout_ms: 5_000, ..Default::default() };
        let config = TransportConfig::from(&engine_config);
        assert_eq!(config.user_agent, "shell/2.0");
        assert_eq!(config.max_bytes, 1024);
        assert_eq!(config.timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn test_http_transport_new() {
        let transport = HttpTransport::new(TransportConfig::default());
        assert!(transport.is_ok());
    }
}
