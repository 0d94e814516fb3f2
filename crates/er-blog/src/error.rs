use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("request cancelled")]
    Cancelled,
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    /// A request the server rejected as malformed. Re-sending it cannot succeed.
    pub fn is_bad_request(&self) -> bool {
        match self {
            FetchError::Http { status, .. } => *status == 400,
            FetchError::Transport(message) => message.contains("400"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_detection() {
        let http = FetchError::Http {
            status: 400,
            message: "rest_invalid_param".into(),
        };
        assert!(http.is_bad_request());
        assert!(FetchError::Transport("HTTP 400 Bad Request".into()).is_bad_request());
        assert!(
            !FetchError::Http {
                status: 503,
                message: String::new()
            }
            .is_bad_request()
        );
        assert!(!FetchError::Cancelled.is_bad_request());
        assert!(FetchError::Cancelled.is_cancelled());
    }
}
