//! HTTP client construction and the transport seam

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{HttpError, Result};
use crate::logging::{LoggingMiddleware, LoggingOptions};
use crate::tls::{pinned_tls_config, CertificatePolicy};

/// A response with its body fully buffered in memory.
///
/// Buffering rather than streaming lets the failure path re-decode the same
/// body from the start.
#[derive(Debug, Clone)]
pub struct BufferedResponse {
    /// Final URL of the request
    pub url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// The complete response body
    pub body: Vec<u8>,
}

impl BufferedResponse {
    /// Read a reqwest response to completion
    pub async fn from_response(response: reqwest::Response) -> Result<Self> {
        let url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(Self {
            url,
            status,
            headers,
            body,
        })
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// The body as text, lossily decoded
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Canonical reason phrase for the status, when one exists
    pub fn reason(&self) -> Option<&'static str> {
        self.status.canonical_reason()
    }
}

/// The transport seam: issue one request, get back a buffered response.
///
/// Implemented by [`HttpClient`]; mock it in tests that should not touch the
/// network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request, buffering the full response body
    async fn execute(&self, request: reqwest::Request) -> Result<BufferedResponse>;
}

/// Configured client for one external provider.
///
/// Wraps a reqwest client built from [`ClientConfig`] (timeout, certificate
/// policy, redirects/proxy/cookies off) together with the logging decorator.
/// Safe for concurrent use; cloning is cheap.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
    logging: LoggingMiddleware,
}

impl HttpClient {
    /// Create a client with the default transport settings: no redirects, no
    /// proxy, no cookie persistence.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_builder(config, |builder| {
            builder
                .redirect(reqwest::redirect::Policy::none())
                .no_proxy()
        })
    }

    /// Create a client with caller-supplied transport settings.
    ///
    /// The callback replaces the defaults applied by [`HttpClient::new`];
    /// timeout and certificate policy from the config are applied either way.
    pub fn with_builder(
        config: ClientConfig,
        configure: impl FnOnce(reqwest::ClientBuilder) -> reqwest::ClientBuilder,
    ) -> Result<Self> {
        let mut builder = configure(reqwest::Client::builder().timeout(config.timeout));

        builder = match config.certificate_policy() {
            CertificatePolicy::Default => builder,
            CertificatePolicy::IgnoreErrors => builder.danger_accept_invalid_certs(true),
            policy @ CertificatePolicy::Pinned(_) => {
                // validator() is always Some for a pin
                let validator = policy
                    .validator()
                    .ok_or_else(|| HttpError::BuildError("missing pin validator".into()))?;
                builder.use_preconfigured_tls(pinned_tls_config(validator))
            }
        };

        let inner = builder
            .build()
            .map_err(|e| HttpError::BuildError(e.to_string()))?;

        let logging = LoggingMiddleware::new(LoggingOptions::from(config.logging_mode));

        Ok(Self {
            inner,
            config,
            logging,
        })
    }

    /// Get configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get underlying reqwest client (for advanced usage)
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Start a request for a path relative to the configured base URL.
    ///
    /// An absolute URL is used as-is.
    pub fn request(&self, method: Method, path_or_url: &str) -> Result<RequestBuilder> {
        let url = self
            .config
            .base_url
            .join(path_or_url)
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        debug!("HTTP {}: {}", method, url);
        Ok(self.inner.request(method, url))
    }

    /// Hit the configured health check path and return the status code
    pub async fn health_check(&self) -> Result<StatusCode> {
        let url = self
            .config
            .health_check_url()
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        let request = self
            .inner
            .get(url)
            .build()
            .map_err(HttpError::RequestFailed)?;
        let response = self.execute(request).await?;
        Ok(response.status)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn execute(&self, request: reqwest::Request) -> Result<BufferedResponse> {
        self.logging.execute(&self.inner, request).await
    }
}

/// Create a shared client (Arc-wrapped for cloning across tasks)
pub fn shared_client(config: ClientConfig) -> Result<Arc<dyn Transport>> {
    Ok(Arc::new(HttpClient::new(config)?))
}
