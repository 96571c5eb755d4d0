//! Minimal decoration layer over reqwest for calling external providers.
//!
//! Adds the three things every provider integration rewrites by hand: typed
//! success/error response decoding, a uniform failure signal for failed
//! calls, and request/response body logging. Everything transport-level
//! (connections, TLS, redirects, timeouts) stays with reqwest.
//!
//! ## Features
//!
//! - **Typed send-and-decode**: [`SendJson`] turns a response into the success
//!   type or a structured [`ProviderError`]
//! - **Error contract**: implement [`ProviderErrorModel`] on a provider's
//!   error payload to control the failure signal
//! - **Logging decorator**: one structured log line per call, bodies captured
//!   per [`LoggingMode`]
//! - **Certificate policy**: platform validation, thumbprint pinning, or
//!   accept-all, chosen from [`ClientConfig`]
//! - **Testing support**: mock the [`Transport`] seam, or point a real client
//!   at wiremock
//!
//! ## Example
//!
//! ```ignore
//! use minimal_http::{ClientConfig, HttpClient, Method, SendJson};
//!
//! let config = ClientConfig::new("https://provider.example.com".parse()?);
//! let client = HttpClient::new(config)?;
//!
//! let request = client.request(Method::GET, "v1/accounts/42")?.build()?;
//! let account: Account = client.send_json::<_, UpstreamError>(request).await?;
//! ```
//!
//! No retries, pooling tweaks, or circuit breaking live here by design;
//! failures propagate unmodified to the caller.

pub mod client;
pub mod config;
pub mod error;
pub mod helpers;
pub mod logging;
pub mod send;
pub mod tls;

pub use client::{shared_client, BufferedResponse, HttpClient, Transport};
pub use config::{ClientConfig, LoggingMode};
pub use error::{
    HttpError, ProviderError, ProviderErrorModel, Result, SendError, UNKNOWN_ERROR_CODE,
};
pub use helpers::{append_query, attach_json_body, build_query_url};
pub use logging::{LoggingMiddleware, LoggingOptions};
pub use send::SendJson;
pub use tls::{CertificatePolicy, ThumbprintValidator};

/// Re-export commonly used types
pub use reqwest::{header, Method, StatusCode};
