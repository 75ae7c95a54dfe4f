//! Webhook notification sink
//!
//! Sends each notification as an HTTP request to a remote endpoint. Supports:
//! - POST and PUT methods
//! - Custom headers
//! - Exponential backoff retry logic
//! - Configurable timeouts

use super::{Notification, Notifier, NotifyError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const EVENT_TYPE: &str = "notification.created";

/// Retry policy for webhook requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial backoff duration in milliseconds
    pub initial_backoff_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f32,
    /// Maximum backoff duration in milliseconds
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            backoff_multiplier: 2.0,
            max_backoff_ms: 10000,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (zero-based)
    pub(crate) fn backoff_duration(&self, attempt: u32) -> Duration {
        let backoff_ms =
            (self.initial_backoff_ms as f32 * self.backoff_multiplier.powi(attempt as i32)) as u64;
        Duration::from_millis(backoff_ms.min(self.max_backoff_ms))
    }
}

/// Notifier delivering notifications to a remote endpoint
///
/// # Example
///
/// ```no_run
/// use clubgroup::notify::WebhookNotifier;
///
/// let notifier = WebhookNotifier::new("http://app-server:8000/api/notifications")
///     .with_header("Authorization", "Bearer token123");
/// ```
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    /// The URL to POST/PUT notifications to
    pub url: String,
    /// HTTP method (POST or PUT)
    pub method: String,
    /// Custom headers to include in requests
    pub headers: HashMap<String, String>,
    /// Request timeout duration
    pub timeout: Duration,
    /// Retry policy for failed requests
    pub retry_policy: RetryPolicy,
}

impl WebhookNotifier {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            method: "POST".to_string(),
            headers: HashMap::new(),
            timeout: Duration::from_secs(10),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Set the HTTP method (POST or PUT)
    pub fn with_method<S: Into<String>>(mut self, method: S) -> Self {
        self.method = method.into();
        self
    }

    /// Add a custom header
    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Send the payload, retrying transient failures
    async fn send_with_retry(&self, payload: serde_json::Value) -> Result<(), NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| NotifyError::Delivery(format!("Failed to create HTTP client: {}", e)))?;

        let attempts = self.retry_policy.max_retries + 1;
        let mut attempt = 0;

        loop {
            match self.send_request(&client, &payload).await {
                Ok(()) => {
                    debug!(
                        "Webhook notification delivered (url: {}, attempts: {})",
                        self.url,
                        attempt + 1
                    );
                    return Ok(());
                }
                Err(e) if attempt < self.retry_policy.max_retries && is_retryable(&e) => {
                    let backoff = self.retry_policy.backoff_duration(attempt);
                    warn!(
                        "Webhook notification failed (attempt: {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        attempts,
                        backoff,
                        e
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        "Webhook notification failed after {} attempt(s) (url: {}): {}",
                        attempt + 1,
                        self.url,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Send a single request
    async fn send_request(
        &self,
        client: &reqwest::Client,
        payload: &serde_json::Value,
    ) -> Result<(), NotifyError> {
        let request_builder = match self.method.to_uppercase().as_str() {
            "PUT" => client.put(&self.url),
            _ => client.post(&self.url),
        };

        let mut request_builder = request_builder.json(payload);

        for (key, value) in &self.headers {
            request_builder = request_builder.header(key, value);
        }

        let response = request_builder
            .header("X-Webhook-Event", EVENT_TYPE)
            .header(
                "User-Agent",
                format!("Clubgroup-Webhook/{}", env!("CARGO_PKG_VERSION")),
            )
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(format!("HTTP request failed: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                status: response.status().as_u16(),
            })
        }
    }
}

/// Client errors other than throttling are not retried
fn is_retryable(error: &NotifyError) -> bool {
    match error {
        NotifyError::Rejected { status } => *status == 429 || *status >= 500,
        NotifyError::Delivery(_) => true,
        _ => false,
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn create(&self, notification: Notification) -> Result<(), NotifyError> {
        let data = serde_json::to_value(&notification)
            .map_err(|e| NotifyError::Serialization(e.to_string()))?;

        let payload = serde_json::json!({
            "event": EVENT_TYPE,
            "timestamp": Utc::now().to_rfc3339(),
            "data": data,
        });

        self.send_with_retry(payload).await
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `responses` one connection each, returning the raw requests seen
    async fn serve(responses: Vec<&'static str>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/notify", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for status_line in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut socket).await);
                let response = format!(
                    "{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    status_line
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
            requests
        });

        (url, handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buffer).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (key, value) = line.split_once(':')?;
                        key.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buffer.len() >= header_end + 4 + content_length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buffer).to_string()
    }

    fn fast_retries(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff_ms: 1,
            backoff_multiplier: 1.0,
            max_backoff_ms: 1,
        }
    }

    #[test]
    fn test_webhook_builder() {
        let notifier = WebhookNotifier::new("http://example.com/hook")
            .with_method("PUT")
            .with_header("Authorization", "Bearer token")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(notifier.url, "http://example.com/hook");
        assert_eq!(notifier.method, "PUT");
        assert_eq!(
            notifier.headers.get("Authorization"),
            Some(&"Bearer token".to_string())
        );
        assert_eq!(notifier.timeout, Duration::from_secs(30));
        assert_eq!(notifier.name(), "webhook");
    }

    #[test]
    fn test_retry_policy_backoff_calculation() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_duration(0).as_millis(), 100);
        assert_eq!(policy.backoff_duration(1).as_millis(), 200);
        assert_eq!(policy.backoff_duration(3).as_millis(), 800);
        // Capped at the maximum
        assert_eq!(policy.backoff_duration(10).as_millis(), 10000);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable(&NotifyError::Rejected { status: 503 }));
        assert!(is_retryable(&NotifyError::Rejected { status: 429 }));
        assert!(!is_retryable(&NotifyError::Rejected { status: 404 }));
        assert!(is_retryable(&NotifyError::Delivery("reset".to_string())));
    }

    #[tokio::test]
    async fn test_delivers_notification_payload() {
        let (url, server) = serve(vec!["HTTP/1.1 200 OK"]).await;
        let notifier = WebhookNotifier::new(url)
            .with_header("X-Club", "c1")
            .with_retry_policy(RetryPolicy::none());

        notifier
            .create(Notification::new("Your Group is created", "g1", "u1"))
            .await
            .unwrap();

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.starts_with("POST /notify"));
        assert!(request.to_lowercase().contains("x-club: c1"));
        assert!(request.contains("\"recipient\":\"u1\""));
        assert!(request.contains(EVENT_TYPE));
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_succeeds() {
        let (url, server) = serve(vec![
            "HTTP/1.1 503 Service Unavailable",
            "HTTP/1.1 200 OK",
        ])
        .await;
        let notifier = WebhookNotifier::new(url).with_retry_policy(fast_retries(2));

        notifier
            .create(Notification::new("c", "g1", "u1"))
            .await
            .unwrap();
        assert_eq!(server.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (url, server) = serve(vec!["HTTP/1.1 400 Bad Request"]).await;
        let notifier = WebhookNotifier::new(url).with_retry_policy(fast_retries(3));

        let err = notifier
            .create(Notification::new("c", "g1", "u1"))
            .await
            .unwrap_err();
        assert_eq!(err, NotifyError::Rejected { status: 400 });
        assert_eq!(server.await.unwrap().len(), 1);
    }
}
