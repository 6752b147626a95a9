//! TfL client error types.

/// Longest body excerpt kept on an error for logging.
pub(crate) const BODY_EXCERPT_CHARS: usize = 500;

/// Why a single arrivals fetch failed.
///
/// Every variant is per-stop and per-cycle: the poller logs it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, TLS failure and similar.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The request did not complete within its time bound.
    #[error("request timed out")]
    Timeout,

    /// The API answered with something other than 200 OK.
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The body was not the expected JSON array of arrivals.
    #[error("malformed response: {message}")]
    Parse {
        message: String,
        body: Option<String>,
    },
}

impl FetchError {
    /// Short machine-friendly label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Timeout => "timeout",
            FetchError::HttpStatus { .. } => "http_status",
            FetchError::Parse { .. } => "parse",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Parse {
                message: err.to_string(),
                body: None,
            }
        } else {
            FetchError::Transport(err)
        }
    }
}

/// Keep at most [`BODY_EXCERPT_CHARS`] characters of a response body.
pub(crate) fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Timeout;
        assert_eq!(err.to_string(), "request timed out");

        let err = FetchError::HttpStatus {
            status: 503,
            body: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "HTTP status 503: Service Unavailable");

        let err = FetchError::Parse {
            message: "expected value at line 1 column 1".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("malformed response"));
        assert!(err.to_string().contains("expected value"));
    }

    #[test]
    fn kinds() {
        assert_eq!(FetchError::Timeout.kind(), "timeout");
        assert_eq!(
            FetchError::HttpStatus {
                status: 404,
                body: String::new()
            }
            .kind(),
            "http_status"
        );
        assert_eq!(
            FetchError::Parse {
                message: String::new(),
                body: None
            }
            .kind(),
            "parse"
        );
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        let body = "é".repeat(BODY_EXCERPT_CHARS + 10);
        let cut = excerpt(&body);
        assert_eq!(cut.chars().count(), BODY_EXCERPT_CHARS);
    }
}
