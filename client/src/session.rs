use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use http::HeaderMap;
use http::header::SET_COOKIE;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use shared::types::session::{
    AUTH_TOKEN, INVITATION_CODE, Role, SESSION_KEYS, SessionData, USER_EMAIL, USER_NAME, USER_ROLE,
};

/// Cookie the backend's anti-forgery token lives in. Its value is read
/// fresh on every mutating request and echoed as the `X-CSRFToken` header.
pub const CSRF_COOKIE: &str = "csrftoken";

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Process-wide persisted key-value area holding the active session.
///
/// Writes replace or remove every session key under a single write lock, so
/// a concurrent reader never observes a partially-written or
/// partially-cleared session. With a backing file configured, every
/// mutation writes through (best-effort; a failed write is logged, the
/// in-memory state stays authoritative).
pub struct SessionStore {
    entries: RwLock<HashMap<String, String>>,
    file: Option<PathBuf>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            file: None,
        }
    }

    /// Load from `path` if it exists; subsequent mutations write through.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);
        if !entries.is_empty() {
            info!("Restored session from {}", path.display());
        }
        Self {
            entries: RwLock::new(entries),
            file: Some(path),
        }
    }

    fn load(path: &PathBuf) -> HashMap<String, String> {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Session file {} is corrupt, starting empty: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let Some(path) = &self.file else { return };
        let payload = match serde_json::to_string(entries) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to serialize session: {}", e);
                return;
            }
        };
        if let Err(e) = fs::write(path, payload) {
            warn!("Failed to write session file {}: {}", path.display(), e);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.get(AUTH_TOKEN)
    }

    /// A session exists only when both the token and the role are present.
    pub fn is_authenticated(&self) -> bool {
        let entries = self.entries.read();
        entries.contains_key(AUTH_TOKEN) && entries.contains_key(USER_ROLE)
    }

    /// Write a full session. All keys land under one write lock; optional
    /// keys without a value are removed rather than left stale.
    pub fn store(&self, data: &SessionData) {
        let mut entries = self.entries.write();
        entries.insert(AUTH_TOKEN.to_string(), data.token.clone());
        entries.insert(USER_ROLE.to_string(), data.role.as_str().to_string());
        entries.insert(USER_EMAIL.to_string(), data.email.clone());
        match &data.name {
            Some(name) => entries.insert(USER_NAME.to_string(), name.clone()),
            None => entries.remove(USER_NAME),
        };
        match &data.invitation_code {
            Some(code) => entries.insert(INVITATION_CODE.to_string(), code.clone()),
            None => entries.remove(INVITATION_CODE),
        };
        self.persist(&entries);
        debug!("Session stored ({})", data);
    }

    /// Remove every session key. Atomic from a reader's perspective.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        for key in SESSION_KEYS {
            entries.remove(key);
        }
        self.persist(&entries);
        info!("Session cleared");
    }

    /// The full session, when one exists and its role parses.
    pub fn snapshot(&self) -> Option<SessionData> {
        let entries = self.entries.read();
        let token = entries.get(AUTH_TOKEN)?.clone();
        let role: Role = entries.get(USER_ROLE)?.parse().ok()?;
        let email = entries.get(USER_EMAIL).cloned().unwrap_or_default();
        Some(SessionData {
            token,
            role,
            email,
            name: entries.get(USER_NAME).cloned(),
            invitation_code: entries.get(INVITATION_CODE).cloned(),
        })
    }
}

// ---------------------------------------------------------------------------
// CookieJar
// ---------------------------------------------------------------------------

/// Minimal cookie storage standing in for the browser jar: every request
/// attaches its contents (`credentials: include` semantics) and absorbs
/// `Set-Cookie` response headers. Attributes past the first `name=value`
/// pair are ignored — this jar never crosses origins.
#[derive(Default)]
pub struct CookieJar {
    cookies: RwLock<HashMap<String, String>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies.read().get(name).cloned()
    }

    pub fn set(&self, name: &str, value: &str) {
        self.cookies
            .write()
            .insert(name.to_string(), value.to_string());
    }

    /// Value for an outgoing `Cookie` header, or `None` when the jar is
    /// empty.
    pub fn header_value(&self) -> Option<String> {
        let cookies = self.cookies.read();
        if cookies.is_empty() {
            return None;
        }
        let mut pairs: Vec<String> = cookies.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        // Stable order keeps request logs diffable.
        pairs.sort();
        Some(pairs.join("; "))
    }

    /// Fold every `Set-Cookie` header of a response into the jar.
    pub fn absorb(&self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or("").trim();
            if let Some((name, value)) = pair.split_once('=') {
                if !name.is_empty() {
                    debug!("Cookie absorbed: {}", name);
                    self.cookies
                        .write()
                        .insert(name.to_string(), value.to_string());
                }
            }
        }
    }
}
