//! Error taxonomy and upstream error translation
//!
//! Every failure a tool call can produce ends up as a [`ToolError`]: a stable
//! [`ErrorKind`] plus a message written for the end user. Validation and build
//! failures convert directly; upstream and transport failures go through
//! [`map_error`] so the message can carry tool-specific remediation.

use serde::Serialize;

/// A single violated constraint, attributed to a field path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Malformed or out-of-range caller input, with every violation collected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid arguments for {tool}: {}", join_issues(.issues))]
pub struct ValidationError {
    pub tool: String,
    pub issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A campaign payload could not be assembled from the request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("Campaign name is required")]
    MissingName,

    #[error("Campaign needs a non-empty subject or body for its first sequence step")]
    EmptySequence,
}

/// Outward-facing error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidParams,
    InvalidRequest,
    InternalError,
}

impl ErrorKind {
    /// JSON-RPC 2.0 error code for this category
    pub fn json_rpc_code(self) -> i32 {
        match self {
            ErrorKind::InvalidParams => -32602,
            ErrorKind::InvalidRequest => -32600,
            ErrorKind::InternalError => -32603,
        }
    }
}

/// The one error type a tool invocation surfaces to its caller
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
    /// Structured context (field issues, upstream details) when available
    pub data: Option<serde_json::Value>,
}

impl ToolError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParams, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message)
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl From<ValidationError> for ToolError {
    fn from(err: ValidationError) -> Self {
        let data = serde_json::to_value(&err.issues).ok();
        ToolError {
            kind: ErrorKind::InvalidParams,
            message: err.to_string(),
            data,
        }
    }
}

impl From<BuildError> for ToolError {
    fn from(err: BuildError) -> Self {
        ToolError::invalid_params(err.to_string())
    }
}

/// Network-level failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    ConnectionRefused,
    DnsFailure,
    Timeout,
    Other,
}

/// Anything that can go wrong talking to the upstream API
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiFailure {
    /// The API answered with a non-success status
    #[error("Instantly API error [{status}]: {message}")]
    Upstream {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The request never got an HTTP answer
    #[error("Transport error ({kind:?}): {message}")]
    Transport {
        kind: TransportFailure,
        message: String,
    },

    /// Already translated; passed through unchanged
    #[error(transparent)]
    Categorized(ToolError),
}

impl From<ToolError> for ApiFailure {
    fn from(err: ToolError) -> Self {
        ApiFailure::Categorized(err)
    }
}

/// Translate an upstream failure into a categorized, tool-aware error
///
/// | Status | Kind |
/// |---|---|
/// | 400, 422 | `InvalidParams` |
/// | 401, 403, 404, 429 | `InvalidRequest` |
/// | 5xx and anything else | `InternalError` |
pub fn map_error(failure: ApiFailure, tool: &str) -> ToolError {
    match failure {
        ApiFailure::Categorized(err) => err,
        ApiFailure::Transport { kind, message } => map_transport_error(kind, &message),
        ApiFailure::Upstream {
            status,
            message,
            details,
        } => map_upstream_error(status, &message, details, tool),
    }
}

fn map_transport_error(kind: TransportFailure, message: &str) -> ToolError {
    let text = match kind {
        TransportFailure::ConnectionRefused => {
            format!("Could not connect to the Instantly API (connection refused): {message}")
        }
        TransportFailure::DnsFailure => {
            format!("Could not resolve the Instantly API host (DNS failure): {message}")
        }
        TransportFailure::Timeout => format!(
            "Request to the Instantly API timed out: {message}. Try again or raise the request timeout."
        ),
        TransportFailure::Other => format!("Network error reaching the Instantly API: {message}"),
    };

    ToolError::internal(text)
}

fn map_upstream_error(
    status: u16,
    message: &str,
    details: Option<serde_json::Value>,
    tool: &str,
) -> ToolError {
    match status {
        400 => {
            let mut text = format!("Bad request: {message}");
            if tool == "create_campaign" {
                text.push_str(
                    ". Call list_accounts first to fetch valid sender accounts, then use their \
                     email addresses in email_list.",
                );
            }
            ToolError::new(ErrorKind::InvalidParams, text)
        }
        401 => ToolError::new(
            ErrorKind::InvalidRequest,
            format!(
                "Authentication failed: {message}. Check that INSTANTLY_API_KEY (or --api-key) \
                 holds a valid API v2 key with the required scopes."
            ),
        ),
        403 => {
            let mut text = format!("Access forbidden: {message}.");
            if tool == "verify_email" {
                text.push_str(" Email verification requires a premium Instantly plan.");
            } else {
                text.push_str(" Check that your API key has permission for this operation.");
            }
            ToolError::new(ErrorKind::InvalidRequest, text)
        }
        404 => {
            let mut text = format!("Resource not found: {message}.");
            if tool == "list_leads" {
                text.push_str(" No leads exist yet; create one with create_lead first.");
            } else {
                text.push_str(" Check that the ID is correct.");
            }
            ToolError::new(ErrorKind::InvalidRequest, text)
        }
        422 => {
            let mut text = format!("Validation failed upstream: {message}");
            if let Some(details) = &details {
                text.push_str(&format!(". Details: {details}"));
            }
            let err = ToolError::new(ErrorKind::InvalidParams, text);
            match details {
                Some(details) => err.with_data(details),
                None => err,
            }
        }
        429 => ToolError::new(
            ErrorKind::InvalidRequest,
            format!(
                "Rate limit exceeded: {message}. Wait before retrying or reduce request frequency."
            ),
        ),
        500..=599 => ToolError::internal(format!(
            "Instantly API server error ({status}): {message}. This is usually temporary; retry shortly."
        )),
        _ => ToolError::internal(format!("Unexpected Instantly API error ({status}): {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: u16) -> ApiFailure {
        ApiFailure::Upstream {
            status,
            message: "upstream said no".to_string(),
            details: None,
        }
    }

    #[test]
    fn test_400_create_campaign_suggests_list_accounts() {
        let err = map_error(upstream(400), "create_campaign");
        assert_eq!(err.kind, ErrorKind::InvalidParams);
        assert!(err.message.contains("fetch valid sender accounts"));
        assert!(err.message.contains("list_accounts"));
    }

    #[test]
    fn test_400_other_tool_has_no_account_hint() {
        let err = map_error(upstream(400), "list_campaigns");
        assert_eq!(err.kind, ErrorKind::InvalidParams);
        assert!(!err.message.contains("list_accounts"));
    }

    #[test]
    fn test_401_is_invalid_request() {
        let err = map_error(upstream(401), "list_accounts");
        assert_eq!(err.kind, ErrorKind::InvalidRequest);
        assert!(err.message.contains("INSTANTLY_API_KEY"));
    }

    #[test]
    fn test_403_verify_email_mentions_premium_plan() {
        let err = map_error(upstream(403), "verify_email");
        assert_eq!(err.kind, ErrorKind::InvalidRequest);
        assert!(err.message.contains("premium"));

        let other = map_error(upstream(403), "get_campaign");
        assert!(!other.message.contains("premium"));
    }

    #[test]
    fn test_404_list_leads_suggests_create_lead() {
        let err = map_error(upstream(404), "list_leads");
        assert_eq!(err.kind, ErrorKind::InvalidRequest);
        assert!(err.message.contains("create_lead"));
    }

    #[test]
    fn test_422_includes_details() {
        let failure = ApiFailure::Upstream {
            status: 422,
            message: "invalid body".to_string(),
            details: Some(serde_json::json!({"field": "email_list"})),
        };
        let err = map_error(failure, "create_campaign");
        assert_eq!(err.kind, ErrorKind::InvalidParams);
        assert!(err.message.contains("email_list"));
        assert_eq!(err.data, Some(serde_json::json!({"field": "email_list"})));
    }

    #[test]
    fn test_429_is_invalid_request() {
        let err = map_error(upstream(429), "anything");
        assert_eq!(err.kind, ErrorKind::InvalidRequest);
        assert!(err.message.contains("Rate limit"));
    }

    #[test]
    fn test_5xx_is_internal_and_retryable() {
        for status in [500, 502, 503, 599] {
            let err = map_error(upstream(status), "list_accounts");
            assert_eq!(err.kind, ErrorKind::InternalError);
            assert!(err.message.contains("temporary"));
        }
    }

    #[test]
    fn test_unknown_status_is_internal() {
        let err = map_error(upstream(418), "list_accounts");
        assert_eq!(err.kind, ErrorKind::InternalError);
        assert!(err.message.contains("418"));
    }

    #[test]
    fn test_transport_failures_are_distinguished() {
        let refused = map_error(
            ApiFailure::Transport {
                kind: TransportFailure::ConnectionRefused,
                message: "tcp connect error".to_string(),
            },
            "list_accounts",
        );
        let dns = map_error(
            ApiFailure::Transport {
                kind: TransportFailure::DnsFailure,
                message: "no such host".to_string(),
            },
            "list_accounts",
        );
        let timeout = map_error(
            ApiFailure::Transport {
                kind: TransportFailure::Timeout,
                message: "after 30s".to_string(),
            },
            "list_accounts",
        );

        for err in [&refused, &dns, &timeout] {
            assert_eq!(err.kind, ErrorKind::InternalError);
        }
        assert!(refused.message.contains("connection refused"));
        assert!(dns.message.contains("DNS"));
        assert!(timeout.message.contains("timed out"));
    }

    #[test]
    fn test_categorized_errors_pass_through() {
        let original = ToolError::invalid_params("already mapped");
        let err = map_error(ApiFailure::Categorized(original.clone()), "create_campaign");
        assert_eq!(err, original);
    }

    #[test]
    fn test_validation_error_conversion_keeps_issues() {
        let err = ValidationError {
            tool: "create_campaign".to_string(),
            issues: vec![
                FieldIssue::new("name", "is required"),
                FieldIssue::new("email_list[0]", "must be a valid email address"),
            ],
        };
        let tool_err = ToolError::from(err);
        assert_eq!(tool_err.kind, ErrorKind::InvalidParams);
        assert_eq!(
            tool_err.message,
            "Invalid arguments for create_campaign: name: is required; email_list[0]: must be a valid email address"
        );
        assert_eq!(tool_err.data.unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_json_rpc_codes() {
        assert_eq!(ErrorKind::InvalidParams.json_rpc_code(), -32602);
        assert_eq!(ErrorKind::InvalidRequest.json_rpc_code(), -32600);
        assert_eq!(ErrorKind::InternalError.json_rpc_code(), -32603);
    }
}
