// shared/src/types/update.rs
// Live-channel and polling payloads - minimal, no external dependencies

use serde::{Deserialize, Serialize};

/// One state-change pushed by the backend, either over the live channel or
/// inside a polled [`UpdateBatch`]. `kind` selects the local event the
/// client republishes it as; unrecognized kinds are dropped.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelUpdate {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ChannelUpdate {
    pub fn new(kind: &str, data: serde_json::Value) -> Self {
        Self {
            kind: kind.to_string(),
            data,
        }
    }
}

/// `GET /api/updates/` response — the polling source.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateBatch {
    #[serde(default)]
    pub changes: Vec<ChannelUpdate>,
}

/// Outbound `subscribe` message sent once per live-channel connection when
/// a session exists.
#[derive(Clone, Debug, Serialize)]
pub struct SubscribeMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub email: String,
    pub role: String,
}

impl SubscribeMessage {
    pub fn new(email: String, role: String) -> Self {
        Self {
            kind: "subscribe",
            email,
            role,
        }
    }
}

#[derive(Clone, Debug)]
pub enum ChannelError {
    MalformedFrame(String),
    SendFailed(String),
    Closed,
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelError::MalformedFrame(msg) => write!(f, "Malformed channel frame: {}", msg),
            ChannelError::SendFailed(msg) => write!(f, "Failed to push message: {}", msg),
            ChannelError::Closed => write!(f, "Live channel closed"),
        }
    }
}

impl std::error::Error for ChannelError {}

pub type ChannelResult<T> = Result<T, ChannelError>;
