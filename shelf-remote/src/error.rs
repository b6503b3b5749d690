use reqwest::StatusCode;
use shelf_core::ShelfError;

/// Errors raised by the HTTP adapters.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    Api(String),

    #[error("Catalog session expired, reconnect required")]
    SessionExpired,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    /// Build a status error from a non-success response body, trimmed to a
    /// readable length.
    pub(crate) fn status(status: StatusCode, body: &str) -> Self {
        Self::Status {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        }
    }
}

impl From<RemoteError> for ShelfError {
    fn from(err: RemoteError) -> Self {
        let msg = err.to_string();
        match err {
            RemoteError::Http(e) if e.is_decode() => ShelfError::InvalidArgument(msg),
            RemoteError::Http(_) => ShelfError::Unavailable(msg),
            RemoteError::Status { status, .. } => match status {
                401 | 403 => ShelfError::FailedPrecondition(msg),
                404 => ShelfError::NotFound(msg),
                400 | 422 => ShelfError::InvalidArgument(msg),
                429 | 500..=599 => ShelfError::Unavailable(msg),
                _ => ShelfError::Internal(msg),
            },
            RemoteError::Json(_) | RemoteError::Api(_) => ShelfError::InvalidArgument(msg),
            RemoteError::SessionExpired | RemoteError::Config(_) => {
                ShelfError::FailedPrecondition(msg)
            }
            RemoteError::Io(e) => ShelfError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(status: u16) -> ShelfError {
        RemoteError::Status {
            status,
            message: String::new(),
        }
        .into()
    }

    #[test]
    fn status_codes_map_to_kinds() {
        assert!(matches!(kind(401), ShelfError::FailedPrecondition(_)));
        assert!(matches!(kind(404), ShelfError::NotFound(_)));
        assert!(matches!(kind(400), ShelfError::InvalidArgument(_)));
        assert!(matches!(kind(429), ShelfError::Unavailable(_)));
        assert!(matches!(kind(503), ShelfError::Unavailable(_)));
        assert!(matches!(kind(418), ShelfError::Internal(_)));
    }

    #[test]
    fn malformed_payload_is_invalid_argument() {
        let json_err = serde_json::from_str::<u32>("{").unwrap_err();
        let err: ShelfError = RemoteError::from(json_err).into();
        assert!(matches!(err, ShelfError::InvalidArgument(_)));
    }

    #[test]
    fn expired_session_is_a_precondition() {
        let err: ShelfError = RemoteError::SessionExpired.into();
        assert!(matches!(err, ShelfError::FailedPrecondition(_)));
    }

    #[test]
    fn status_body_is_truncated() {
        let body = "x".repeat(500);
        let RemoteError::Status { status, message } =
            RemoteError::status(StatusCode::BAD_GATEWAY, &body)
        else {
            panic!("expected status error");
        };
        assert_eq!(status, 502);
        assert_eq!(message.len(), 200);
    }
}
