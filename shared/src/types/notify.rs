use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Change-notification domains
// ---------------------------------------------------------------------------

/// Domains the backend accepts fire-and-forget change notifications for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyDomain {
    Maintenance,
    Financial,
    Access,
    Resident,
    Communication,
}

impl NotifyDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::Financial => "financial",
            Self::Access => "access",
            Self::Resident => "resident",
            Self::Communication => "communication",
        }
    }

    /// REST endpoint the notification is POSTed to.
    pub fn notify_path(&self) -> &'static str {
        match self {
            Self::Maintenance => "/api/notify/maintenance/",
            Self::Financial => "/api/notify/financial/",
            Self::Access => "/api/notify/access/",
            Self::Resident => "/api/notify/resident/",
            Self::Communication => "/api/notify/communication/",
        }
    }

    /// The `type` tag used when the same notification is pushed onto the
    /// live channel. Matches the inbound update kinds, so peers receive it
    /// through the regular dispatch table.
    pub fn update_kind(&self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance_update",
            Self::Financial => "financial_update",
            Self::Access => "access_update",
            Self::Resident => "resident_update",
            Self::Communication => "communication_update",
        }
    }
}

impl fmt::Display for NotifyDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

/// Body of `POST /api/notify/<domain>/`.
#[derive(Debug, Serialize)]
pub struct NotifyRequest {
    pub action: String,
    pub data: serde_json::Value,
}
