use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, DNS, timeout).
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status returned by the API.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected envelope.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether a failed request is worth retrying from scratch.
    ///
    /// Connection errors, timeouts and 5xx responses are transient upstream
    /// conditions; 4xx responses and decode failures are not going to get
    /// better on a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            ClientError::Api { status, .. } => *status >= 500,
            ClientError::Decode(_) => false,
        }
    }
}
