//! HTTP/HTTPS Transmitter
//!
//! ## Overview
//!
//! Posts each payload as `application/json` to a single ingest endpoint
//! using the blocking `ureq` client. One request per send cycle, no
//! batching and no retries.
//!
//! ## Status Codes
//!
//! Any status the server sends back, 2xx or not, is returned as `Ok(code)`.
//! Only transport failures (DNS, TCP, TLS, timeout) become errors. The
//! publisher decides what a code means; this module only carries it.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use meterline_connectors::http::{HttpConfig, HttpTransmitter};
//! use meterline_connectors::Transmitter;
//!
//! let config = HttpConfig::new("https://ingest.example.com/api/telemetry")
//!     .api_key("X-Device-Key", "secret")
//!     .timeout_secs(10);
//! let mut http = HttpTransmitter::new(config)?;
//!
//! let status = http.transmit(r#"{"version":"1.2"}"#)?;
//! println!("server answered {status}");
//! # Ok::<(), meterline_connectors::ConnectorError>(())
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use crate::{ConnectorError, Transmitter};

/// HTTP configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Full URL payloads are posted to
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
    /// Authentication method
    pub auth: AuthMethod,
    /// Custom headers
    pub headers: BTreeMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

/// Authentication methods
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// No authentication
    None,
    /// Bearer token
    Bearer(String),
    /// API key in header
    ApiKey { header: String, value: String },
}

impl HttpConfig {
    /// Create new configuration for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(15),
            auth: AuthMethod::None,
            headers: BTreeMap::new(),
            user_agent: format!("Meterline/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set bearer token authentication
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthMethod::Bearer(token.into());
        self
    }

    /// Set API key authentication
    pub fn api_key(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth = AuthMethod::ApiKey {
            header: header.into(),
            value: value.into(),
        };
        self
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Transmitter posting payloads with the `ureq` client
pub struct HttpTransmitter {
    config: HttpConfig,
    agent: ureq::Agent,
}

impl core::fmt::Debug for HttpTransmitter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HttpTransmitter")
            .field("endpoint", &self.config.endpoint)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpTransmitter {
    /// Create new HTTP transmitter
    pub fn new(config: HttpConfig) -> Result<Self, ConnectorError> {
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(ConnectorError::Config(
                "Endpoint must start with http:// or https://".into(),
            ));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self { config, agent })
    }

    /// Configuration this transmitter was built with
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Build request with authentication and headers
    fn build_request(&self) -> ureq::Request {
        let mut request = self.agent.post(&self.config.endpoint);

        match &self.config.auth {
            AuthMethod::None => {}
            AuthMethod::Bearer(token) => {
                request = request.set("Authorization", &format!("Bearer {}", token));
            }
            AuthMethod::ApiKey { header, value } => {
                request = request.set(header, value);
            }
        }

        for (name, value) in &self.config.headers {
            request = request.set(name, value);
        }

        request
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
    }
}

impl Transmitter for HttpTransmitter {
    fn transmit(&mut self, payload: &str) -> Result<u16, ConnectorError> {
        match self.build_request().send_string(payload) {
            Ok(response) => Ok(response.status()),
            Err(ureq::Error::Status(code, _)) => Ok(code),
            Err(ureq::Error::Transport(e)) => {
                log::debug!("POST {} failed: {}", self.config.endpoint, e);
                Err(ConnectorError::Transport(e.to_string()))
            }
        }
    }
}
