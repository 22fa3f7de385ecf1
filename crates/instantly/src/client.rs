//! HTTP client for the Instantly v2 API
//!
//! Responses come back as JSON values; anything else is turned into an
//! [`ApiFailure`] for the core error mapper. The latest `x-ratelimit-*`
//! snapshot is kept on the client. Requests are never retried.

use std::error::Error as _;
use std::io;
use std::sync::Mutex;

use instantly_core::errors::{ApiFailure, TransportFailure};
use instantly_core::rate_limit::RateLimitInfo;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::config::InstantlyConfig;
use crate::prelude::*;

/// Authenticated client for the Instantly v2 API
#[derive(Debug)]
pub struct InstantlyClient {
    http: reqwest::Client,
    base_url: String,
    rate_limit: Mutex<Option<RateLimitInfo>>,
}

impl InstantlyClient {
    /// Create a client with bearer auth and the configured timeout
    pub fn new(config: &InstantlyConfig) -> Result<Self> {
        let api_key = config.api_key()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| eyre!("Invalid header value: {}", e))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limit: Mutex::new(None),
        })
    }

    pub async fn get(
        &self,
        path: &str,
        query: Vec<(&'static str, String)>,
    ) -> Result<Value, ApiFailure> {
        let request = self.http.get(self.url(path)).query(&query);
        self.send("GET", path, request).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, ApiFailure> {
        let request = self.http.post(self.url(path)).json(&body);
        self.send("POST", path, request).await
    }

    /// Quota reported by the most recent response
    pub fn rate_limit(&self) -> Option<RateLimitInfo> {
        self.rate_limit.lock().ok().and_then(|guard| *guard)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, ApiFailure> {
        log::debug!("{method} {path}");

        let response = request.send().await.map_err(|e| transport_failure(&e))?;
        self.record_rate_limit(response.headers());

        let status = response.status();
        let body = response.text().await.map_err(|e| transport_failure(&e))?;
        log::debug!("{method} {path} -> {status}");

        if !status.is_success() {
            return Err(upstream_failure(status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| ApiFailure::Upstream {
            status: status.as_u16(),
            message: format!("Failed to parse Instantly response: {e}"),
            details: None,
        })
    }

    fn record_rate_limit(&self, headers: &HeaderMap) {
        let pairs = headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str(), value)));

        let Some(info) = RateLimitInfo::from_headers(pairs) else {
            return;
        };

        if info.is_low() {
            log::warn!("Instantly rate limit running low: {info}");
        } else {
            log::debug!("Instantly rate limit: {info}");
        }

        if let Ok(mut guard) = self.rate_limit.lock() {
            *guard = Some(info);
        }
    }
}

fn transport_failure(err: &reqwest::Error) -> ApiFailure {
    let message = error_chain(err);
    let kind = classify_transport(err.is_timeout(), io_error_kind(err), &message);
    ApiFailure::Transport { kind, message }
}

/// Refused only when the socket said so; TLS and reset failures are `Other`
fn classify_transport(
    timed_out: bool,
    io_kind: Option<io::ErrorKind>,
    message: &str,
) -> TransportFailure {
    if timed_out || io_kind == Some(io::ErrorKind::TimedOut) {
        TransportFailure::Timeout
    } else if is_dns_failure(message) {
        TransportFailure::DnsFailure
    } else if io_kind == Some(io::ErrorKind::ConnectionRefused)
        || message.to_ascii_lowercase().contains("connection refused")
    {
        TransportFailure::ConnectionRefused
    } else {
        TransportFailure::Other
    }
}

/// Kind of the first `io::Error` in the source chain
fn io_error_kind(err: &reqwest::Error) -> Option<io::ErrorKind> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = cause.source();
    }
    None
}

/// The error and all of its sources, outermost first
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn is_dns_failure(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    ["dns error", "failed to lookup address", "name or service not known"]
        .iter()
        .any(|needle| message.contains(needle))
}

/// Pull message and details out of an error response body
fn upstream_failure(status: u16, body: &str) -> ApiFailure {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|json| {
            ["message", "error"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str))
        })
        .map(str::to_string)
        .or_else(|| {
            let text = body.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
        .unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or("Unknown error")
                .to_string()
        });

    let details = parsed.as_ref().and_then(|json| {
        ["details", "errors"]
            .iter()
            .find_map(|key| json.get(*key).filter(|value| !value.is_null()).cloned())
    });

    ApiFailure::Upstream {
        status,
        message,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upstream_failure_reads_json_body() {
        let failure = upstream_failure(
            422,
            r#"{"message":"Validation failed","details":{"email_list":"unknown account"}}"#,
        );
        assert_eq!(
            failure,
            ApiFailure::Upstream {
                status: 422,
                message: "Validation failed".to_string(),
                details: Some(json!({"email_list": "unknown account"})),
            }
        );
    }

    #[test]
    fn test_upstream_failure_falls_back_to_text() {
        let failure = upstream_failure(502, "Bad gateway from proxy");
        let ApiFailure::Upstream { message, details, .. } = failure else {
            panic!("expected upstream failure");
        };
        assert_eq!(message, "Bad gateway from proxy");
        assert_eq!(details, None);
    }

    #[test]
    fn test_upstream_failure_empty_body_uses_reason() {
        let ApiFailure::Upstream { message, .. } = upstream_failure(404, "") else {
            panic!("expected upstream failure");
        };
        assert_eq!(message, "Not Found");
    }

    #[test]
    fn test_dns_detection() {
        assert!(is_dns_failure(
            "error sending request: client error (Connect): dns error: failed to lookup address information"
        ));
        assert!(!is_dns_failure("connection refused"));
    }

    #[test]
    fn test_transport_classification() {
        assert_eq!(
            classify_transport(
                false,
                Some(io::ErrorKind::ConnectionRefused),
                "tcp connect error"
            ),
            TransportFailure::ConnectionRefused
        );
        assert_eq!(
            classify_transport(
                false,
                None,
                "error sending request: client error (Connect): Connection refused (os error 111)"
            ),
            TransportFailure::ConnectionRefused
        );
        assert_eq!(
            classify_transport(true, None, "operation timed out"),
            TransportFailure::Timeout
        );
        assert_eq!(
            classify_transport(false, Some(io::ErrorKind::TimedOut), "connect timeout"),
            TransportFailure::Timeout
        );
    }

    #[test]
    fn test_tls_and_reset_failures_are_not_refused() {
        assert_eq!(
            classify_transport(
                false,
                None,
                "error sending request: client error (Connect): invalid peer certificate: UnknownIssuer"
            ),
            TransportFailure::Other
        );
        assert_eq!(
            classify_transport(
                false,
                Some(io::ErrorKind::ConnectionReset),
                "connection reset by peer"
            ),
            TransportFailure::Other
        );
    }

    #[test]
    fn test_rate_limit_snapshot_is_recorded() {
        let config = InstantlyConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let client = InstantlyClient::new(&config).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("100"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("4"));
        client.record_rate_limit(&headers);

        let info = client.rate_limit().unwrap();
        assert_eq!(info.limit, 100);
        assert_eq!(info.remaining, 4);
        assert!(info.is_low());
    }

    #[test]
    fn test_client_requires_api_key() {
        assert!(InstantlyClient::new(&InstantlyConfig::default()).is_err());

        let config = InstantlyConfig {
            api_key: Some("secret".to_string()),
            base_url: "http://localhost:1/api/v2/".to_string(),
            ..Default::default()
        };
        let client = InstantlyClient::new(&config).unwrap();
        assert_eq!(client.url("/accounts"), "http://localhost:1/api/v2/accounts");
        assert_eq!(client.rate_limit(), None);
    }
}
