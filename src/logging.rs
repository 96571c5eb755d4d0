//! Per-call diagnostic logging decorator

use reqwest::{Request, StatusCode};
use tracing::info;
use url::Url;

use crate::client::BufferedResponse;
use crate::config::LoggingMode;
use crate::error::Result;

/// What the decorator captures, derived once from
/// [`LoggingMode`](crate::LoggingMode) at client construction.
#[derive(Debug, Clone, Copy)]
pub struct LoggingOptions {
    /// Capture the outgoing request body as text
    pub log_request_body: bool,
    /// Capture the received response body as text
    pub log_response_body: bool,
}

impl From<LoggingMode> for LoggingOptions {
    fn from(mode: LoggingMode) -> Self {
        Self {
            log_request_body: mode.logs_request_body(),
            log_response_body: mode.logs_response_body(),
        }
    }
}

/// Decorator around the reqwest transport that emits exactly one diagnostic
/// log line per call, whether the inner call succeeds, fails, or is cancelled.
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    options: LoggingOptions,
}

impl LoggingMiddleware {
    /// Create the decorator with the given capture options
    pub fn new(options: LoggingOptions) -> Self {
        Self { options }
    }

    /// Execute a request through the inner transport, buffering the response
    /// body.
    ///
    /// The log line fires through a drop guard, so it is emitted even when
    /// the inner transport errors out before a response exists, and when the
    /// returned future is dropped mid-flight.
    pub async fn execute(&self, client: &reqwest::Client, request: Request) -> Result<BufferedResponse> {
        let mut call_log = CallLog::started(request.url().clone(), self.capture_request_body(&request));

        let response = client.execute(request).await?;
        // the status is known once the head arrives, even if the body read
        // fails below
        call_log.record_status(response.status());

        let buffered = BufferedResponse::from_response(response).await?;
        if self.options.log_response_body {
            call_log.record_body(&buffered);
        }

        Ok(buffered)
    }

    fn capture_request_body(&self, request: &Request) -> String {
        if !self.options.log_request_body {
            return String::new();
        }
        request
            .body()
            .and_then(|body| body.as_bytes())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }
}

/// Pending log line for one call; emits on drop, which is the guaranteed
/// execution path.
struct CallLog {
    url: Url,
    request_body: String,
    status: Option<StatusCode>,
    reason: Option<&'static str>,
    response_body: String,
}

impl CallLog {
    fn started(url: Url, request_body: String) -> Self {
        Self {
            url,
            request_body,
            status: None,
            reason: None,
            response_body: String::new(),
        }
    }

    fn record_status(&mut self, status: StatusCode) {
        self.status = Some(status);
        self.reason = status.canonical_reason();
    }

    fn record_body(&mut self, response: &BufferedResponse) {
        self.response_body = response.body_text();
    }
}

impl Drop for CallLog {
    fn drop(&mut self) {
        info!(
            request_uri = %self.url,
            request_body = %self.request_body,
            status_code = self.status.map(|status| status.as_u16()),
            reason_phrase = self.reason,
            response_body = %self.response_body,
            "http call"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};

    /// One captured "http call" line
    #[derive(Debug, Default, Clone)]
    struct CapturedCall {
        message: Option<String>,
        status_code: Option<u64>,
        reason_phrase: Option<String>,
    }

    impl Visit for CapturedCall {
        fn record_u64(&mut self, field: &Field, value: u64) {
            if field.name() == "status_code" {
                self.status_code = Some(value);
            }
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "reason_phrase" {
                self.reason_phrase = Some(value.to_string());
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.message = Some(format!("{value:?}"));
            }
        }
    }

    /// Subscriber that records every event's fields for inspection
    struct CapturingSubscriber {
        events: Arc<Mutex<Vec<CapturedCall>>>,
    }

    impl tracing::Subscriber for CapturingSubscriber {
        fn enabled(&self, _metadata: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _span: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _span: &tracing::span::Id, _values: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _span: &tracing::span::Id, _follows: &tracing::span::Id) {}

        fn event(&self, event: &tracing::Event<'_>) {
            let mut call = CapturedCall::default();
            event.record(&mut call);
            self.events.lock().unwrap().push(call);
        }

        fn enter(&self, _span: &tracing::span::Id) {}

        fn exit(&self, _span: &tracing::span::Id) {}
    }

    fn capture_events() -> (Arc<Mutex<Vec<CapturedCall>>>, tracing::subscriber::DefaultGuard) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let guard = tracing::subscriber::set_default(CapturingSubscriber {
            events: events.clone(),
        });
        (events, guard)
    }

    fn call_lines(events: &Arc<Mutex<Vec<CapturedCall>>>) -> Vec<CapturedCall> {
        events
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.message.as_deref() == Some("http call"))
            .cloned()
            .collect()
    }

    fn middleware(log_request_body: bool) -> LoggingMiddleware {
        LoggingMiddleware::new(LoggingOptions {
            log_request_body,
            log_response_body: false,
        })
    }

    fn request_with_body(body: &'static str) -> Request {
        reqwest::Client::new()
            .post("https://provider.example.com/orders")
            .body(body)
            .build()
            .unwrap()
    }

    #[test]
    fn test_options_derived_from_mode() {
        let options = LoggingOptions::from(LoggingMode::RequestBody);
        assert!(options.log_request_body);
        assert!(!options.log_response_body);

        let options = LoggingOptions::from(LoggingMode::None);
        assert!(!options.log_request_body);
        assert!(!options.log_response_body);
    }

    #[test]
    fn test_request_body_captured_when_enabled() {
        let captured = middleware(true).capture_request_body(&request_with_body("{\"a\":1}"));
        assert_eq!(captured, "{\"a\":1}");
    }

    #[test]
    fn test_request_body_empty_when_disabled() {
        let captured = middleware(false).capture_request_body(&request_with_body("{\"a\":1}"));
        assert_eq!(captured, "");
    }

    #[test]
    fn test_request_body_empty_when_absent() {
        let request = reqwest::Client::new()
            .get("https://provider.example.com/orders")
            .build()
            .unwrap();
        let captured = middleware(true).capture_request_body(&request);
        assert_eq!(captured, "");
    }

    #[tokio::test]
    async fn test_single_log_line_when_inner_transport_errors() {
        let (events, _guard) = capture_events();

        // nothing listens on the discard port, so the call fails before any
        // response exists
        let client = reqwest::Client::new();
        let request = client.get("http://127.0.0.1:9/orders").build().unwrap();
        let result = middleware(false).execute(&client, request).await;
        assert!(result.is_err());

        let lines = call_lines(&events);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].status_code.is_none());
        assert!(lines[0].reason_phrase.is_none());
    }

    #[tokio::test]
    async fn test_status_logged_when_body_read_fails() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            // promise 100 body bytes, deliver 7, then hang up
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\npartial")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let (events, _guard) = capture_events();

        let client = reqwest::Client::new();
        let request = client
            .get(format!("http://{addr}/orders"))
            .build()
            .unwrap();
        let result = middleware(false).execute(&client, request).await;
        assert!(result.is_err());

        let lines = call_lines(&events);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].status_code, Some(200));
        assert_eq!(lines[0].reason_phrase.as_deref(), Some("OK"));
    }
}
