use serde::{Deserialize, Serialize};

use crate::types::session::Role;

// ---------------------------------------------------------------------------
// Login wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The user object carried inside a successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub token: String,
    pub role: Role,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub invitation_code: Option<String>,
}

/// `POST /api/login/` response envelope.
///
/// The backend answers 200 with `success: false` for bad credentials, so
/// `user` must stay optional rather than the envelope being an enum.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub user: Option<UserInfo>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LoginResponse {
    /// The session payload, when login succeeded and the backend actually
    /// attached a user object.
    pub fn user(&self) -> Option<&UserInfo> {
        if self.success { self.user.as_ref() } else { None }
    }
}
