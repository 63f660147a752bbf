use thiserror::Error;

// ---------------------------------------------------------------------------
// Request / channel error taxonomy
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure before any response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 401. The session-invalidated side effect has already run by the
    /// time the caller sees this.
    #[error("Unauthorized")]
    Unauthorized,

    /// HTTP 403. An `accessDenied` event has already been emitted locally.
    #[error("Forbidden")]
    Forbidden,

    /// Any other non-2xx response.
    #[error("HTTP error: {status}")]
    Http { status: u16 },

    /// A live-channel frame that could not be parsed. Logged and dropped by
    /// the channel itself; never surfaces to callers.
    #[error("Malformed channel message: {0}")]
    MalformedMessage(String),

    /// A 2xx response whose body was not the JSON the caller expected.
    #[error("Invalid JSON in response body: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden => Some(403),
            ApiError::Http { status } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
