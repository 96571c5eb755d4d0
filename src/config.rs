//! HTTP client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::tls::CertificatePolicy;

/// Configuration for a single external provider client.
///
/// Read-only after construction; build one per provider and hand it to
/// [`HttpClient::new`](crate::HttpClient::new).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the target server
    pub base_url: Url,

    /// Relative health check path on the target server (default is the root path)
    #[serde(default)]
    pub health_check_path: String,

    /// Request timeout
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Expected TLS certificate thumbprint, for accepting a certificate that
    /// would otherwise fail platform validation
    #[serde(default)]
    pub certificate_thumbprint: Option<String>,

    /// Accept any TLS certificate, valid or not
    #[serde(default)]
    pub ignore_certificate_errors: bool,

    /// What the per-call diagnostic log line captures
    #[serde(default)]
    pub logging_mode: LoggingMode,
}

impl ClientConfig {
    /// Create a config for the given base URL with defaults everywhere else
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            health_check_path: String::new(),
            timeout: default_timeout(),
            certificate_thumbprint: None,
            ignore_certificate_errors: false,
            logging_mode: LoggingMode::default(),
        }
    }

    /// Set the health check path
    pub fn with_health_check_path(mut self, path: impl Into<String>) -> Self {
        self.health_check_path = path.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pin the server certificate to the given thumbprint
    pub fn with_certificate_thumbprint(mut self, thumbprint: impl Into<String>) -> Self {
        self.certificate_thumbprint = Some(thumbprint.into());
        self
    }

    /// Accept any server certificate
    pub fn with_ignored_certificate_errors(mut self) -> Self {
        self.ignore_certificate_errors = true;
        self
    }

    /// Set the logging mode
    pub fn with_logging_mode(mut self, mode: LoggingMode) -> Self {
        self.logging_mode = mode;
        self
    }

    /// Derive the certificate validation policy for this config.
    ///
    /// `ignore_certificate_errors` wins over a pinned thumbprint; with neither
    /// set, platform validation applies.
    pub fn certificate_policy(&self) -> CertificatePolicy {
        if self.ignore_certificate_errors {
            CertificatePolicy::IgnoreErrors
        } else {
            match &self.certificate_thumbprint {
                Some(thumbprint) => CertificatePolicy::Pinned(thumbprint.clone()),
                None => CertificatePolicy::Default,
            }
        }
    }

    /// Absolute URL of the health check endpoint
    pub fn health_check_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(&self.health_check_path)
    }
}

/// What the logging decorator captures for each call.
///
/// The diagnostic line itself is always emitted; the mode only controls
/// whether request and response bodies appear in it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggingMode {
    /// Log neither request nor response body
    #[default]
    None,
    /// Log the outgoing request body only
    RequestBody,
    /// Log the received response body only
    ResponseBody,
    /// Log both bodies
    RequestAndResponseBody,
}

impl LoggingMode {
    /// Whether this mode captures the request body
    pub fn logs_request_body(self) -> bool {
        matches!(self, Self::RequestBody | Self::RequestAndResponseBody)
    }

    /// Whether this mode captures the response body
    pub fn logs_response_body(self) -> bool {
        matches!(self, Self::ResponseBody | Self::RequestAndResponseBody)
    }
}

// Default value functions for serde
fn default_timeout() -> Duration {
    Duration::from_secs(100)
}
