use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Persisted session keys
//
// The session store is a flat string key-value area; these are the only
// keys it ever holds. Absence of AUTH_TOKEN or USER_ROLE means "no session".
// ---------------------------------------------------------------------------

pub const AUTH_TOKEN: &str = "authToken";
pub const USER_ROLE: &str = "userRole";
pub const USER_EMAIL: &str = "userEmail";
pub const USER_NAME: &str = "userName";
pub const INVITATION_CODE: &str = "invitationCode";

/// Every key the session store may hold, in storage order. `clear()` walks
/// this list under a single write lock.
pub const SESSION_KEYS: [&str; 5] =
    [AUTH_TOKEN, USER_ROLE, USER_EMAIL, USER_NAME, INVITATION_CODE];

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The role a logged-in user acts under. Determines which dashboard the
/// backend routes the user to; the client only carries it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Resident,
    Guard,
    Technician,
    Visitor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Resident => "resident",
            Role::Guard => "guard",
            Role::Technician => "technician",
            Role::Visitor => "visitor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(pub String);

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "resident" => Ok(Role::Resident),
            "guard" => Ok(Role::Guard),
            "technician" => Ok(Role::Technician),
            "visitor" => Ok(Role::Visitor),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Session data
// ---------------------------------------------------------------------------

/// A fully-populated session as written to the store after a successful
/// login. `name` and `invitation_code` are optional — visitors register
/// with a code, staff accounts usually have neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub role: Role,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub invitation_code: Option<String>,
}

impl fmt::Display for SessionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Token deliberately omitted from log output.
        write!(f, "role={}, email={}", self.role, self.email)
    }
}
