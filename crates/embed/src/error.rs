use thiserror::Error;

/// Errors surfaced by embedding providers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EmbedError {
    /// Configuration is inconsistent (e.g., missing API key for a remote
    /// provider, zero dimensions).
    #[error("invalid embed config: {0}")]
    InvalidConfig(String),
    /// The HTTP request never produced a response (connect failure, timeout,
    /// connection reset).
    #[error("embedding transport failure: {0}")]
    Transport(String),
    /// The provider answered with a non-success status.
    #[error("embedding provider error (HTTP {status}): {message}")]
    Provider { status: u16, message: String },
    /// The provider answered 2xx but the body did not contain usable
    /// embeddings.
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),
    /// The provider returned vectors of an unexpected dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl EmbedError {
    /// Whether a retry could plausibly succeed. Transport failures and
    /// throttling/server statuses are transient; everything else is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            EmbedError::Transport(_) => true,
            EmbedError::Provider { status, .. } => {
                matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_retryable() {
        assert!(EmbedError::Transport("connection reset".into()).is_retryable());
    }

    #[test]
    fn throttling_and_server_statuses_are_retryable() {
        for status in [408, 429, 500, 502, 503, 504] {
            let err = EmbedError::Provider {
                status,
                message: "busy".into(),
            };
            assert!(err.is_retryable(), "HTTP {status} should be retryable");
        }
    }

    #[test]
    fn client_errors_are_not_retryable() {
        for status in [400, 401, 403, 404, 422] {
            let err = EmbedError::Provider {
                status,
                message: "nope".into(),
            };
            assert!(!err.is_retryable(), "HTTP {status} should not be retryable");
        }
    }

    #[test]
    fn config_and_parse_errors_are_not_retryable() {
        assert!(!EmbedError::InvalidConfig("bad".into()).is_retryable());
        assert!(!EmbedError::MalformedResponse("bad".into()).is_retryable());
        assert!(!EmbedError::DimensionMismatch {
            expected: 1536,
            actual: 768
        }
        .is_retryable());
    }

    #[test]
    fn error_display_contains_context() {
        let err = EmbedError::Provider {
            status: 429,
            message: "rate limited".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));
    }
}
