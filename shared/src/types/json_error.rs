use serde::{Deserialize, Serialize};

/// Error body the backend attaches to non-2xx JSON responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

impl ApiErrorBody {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
