//! Unified client error type.
//!
//! Every operation in this crate returns `Result<T, ClientError>`.  Transport
//! failures keep the underlying [`reqwest::Error`] so callers can distinguish
//! timeouts from connection refusals; non-2xx replies carry the server's own
//! error message when it sent one.

use thiserror::Error;

/// All errors that can occur talking to the docchat backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure: DNS, connect, TLS, timeout.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body was not the JSON shape the contract promises.
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Local filesystem trouble (session id store, attachment reads).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// True when the failure was the request deadline expiring.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_timeouts_count_as_timeouts() {
        // A gateway timeout is a server answer, not a client deadline.
        let api = ClientError::Api {
            status: 504,
            message: "gateway timeout".to_owned(),
        };
        assert!(!api.is_timeout());

        let io = ClientError::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "fs"));
        assert!(!io.is_timeout());
    }
}
