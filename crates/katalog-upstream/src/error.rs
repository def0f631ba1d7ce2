use thiserror::Error;

/// Errors returned by the upstream catalog client.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Login answered 2xx but carried no token.
    #[error("upstream login did not return a token")]
    LoginRejected,

    #[error("invalid upstream base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl UpstreamError {
    /// `true` when upstream answered but refused the credentials, as opposed
    /// to a transport or protocol failure.
    #[must_use]
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, UpstreamError::LoginRejected)
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Http(e) if e.is_timeout())
    }
}
