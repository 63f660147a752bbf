//! Test doubles shared by the integration tests: a scripted transport and
//! a config factory with delays short enough for test runs.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;

use client::{HttpTransport, TransportError, TransportResponse};
use shared::types::client_config::{
    ApiConfig, ChannelConfig, ClientConfig, PollConfig, SessionConfig,
};

// ---------------------------------------------------------------------------
// Scripted transport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[derive(Clone)]
pub enum Scripted {
    Respond { status: u16, body: Value },
    Fail(String),
}

/// Replays a scripted sequence of outcomes, then falls back to a fixed
/// outcome once the script is exhausted. Records every request it sees.
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Mutex<Scripted>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Scripted::Respond {
                status: 200,
                body: Value::Null,
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Queue one scripted outcome (consumed in order).
    pub fn push(&self, outcome: Scripted) {
        self.script.lock().unwrap().push_back(outcome);
    }

    pub fn respond_once(&self, status: u16, body: Value) {
        self.push(Scripted::Respond { status, body });
    }

    pub fn fail_once(&self, message: &str) {
        self.push(Scripted::Fail(message.to_string()));
    }

    /// Outcome used once the script is exhausted.
    pub fn set_fallback(&self, outcome: Scripted) {
        *self.fallback.lock().unwrap() = outcome;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, req: Request<Bytes>) -> Result<TransportResponse, TransportError> {
        let (parts, body) = req.into_parts();
        self.requests.lock().unwrap().push(RecordedRequest {
            method: parts.method.to_string(),
            uri: parts.uri.to_string(),
            headers: parts.headers,
            body: body.to_vec(),
        });

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.lock().unwrap().clone());

        match outcome {
            Scripted::Respond { status, body } => {
                let status = StatusCode::from_u16(status).unwrap();
                let bytes = if body.is_null() {
                    Bytes::new()
                } else {
                    Bytes::from(serde_json::to_vec(&body).unwrap())
                };
                Ok(TransportResponse::new(status, bytes))
            }
            Scripted::Fail(message) => Err(TransportError::Connect(message)),
        }
    }
}

// ---------------------------------------------------------------------------
// Config factory
// ---------------------------------------------------------------------------

/// Config with millisecond-scale delays so tests stay fast. Tests tweak
/// individual fields as needed.
pub fn test_config() -> ClientConfig {
    ClientConfig {
        api: ApiConfig {
            base_url: "http://backend.test".into(),
            login_path: "/login".into(),
            dashboard_marker: "dashboard".into(),
            redirect_delay_ms: 20,
            retry_backoff_ms: 1,
        },
        channel: ChannelConfig {
            url: None,
            reconnect_delay_ms: 100,
        },
        poll: PollConfig {
            interval_ms: 25,
            updates_path: "/api/updates/".into(),
        },
        session: SessionConfig::default(),
    }
}

pub fn sample_session() -> shared::types::SessionData {
    shared::types::SessionData {
        token: "tok-abc".into(),
        role: shared::types::Role::Resident,
        email: "ana@example.com".into(),
        name: Some("Ana".into()),
        invitation_code: None,
    }
}
