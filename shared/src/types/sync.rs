use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Bulk sync payloads
//
// Each domain has one `GET /api/<domain>/.../sync/` pull. The sync helpers
// never fail: on any error they hand back the degraded shape (empty items +
// error string) so rendering code needs no error handling of its own.
// ---------------------------------------------------------------------------

const DEGRADED_ERROR: &str = "connection error";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaintenanceSync {
    #[serde(default)]
    pub tickets: Vec<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialSync {
    #[serde(default)]
    pub records: Vec<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessSync {
    #[serde(default)]
    pub logs: Vec<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResidentSync {
    #[serde(default)]
    pub residents: Vec<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunicationSync {
    #[serde(default)]
    pub communications: Vec<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

macro_rules! degraded_ctor {
    ($ty:ident) => {
        impl $ty {
            /// Empty items plus the fixed degradation marker.
            pub fn degraded() -> Self {
                Self {
                    error: Some(DEGRADED_ERROR.to_string()),
                    ..Self::default()
                }
            }

            pub fn is_degraded(&self) -> bool {
                self.error.is_some()
            }
        }
    };
}

degraded_ctor!(MaintenanceSync);
degraded_ctor!(FinancialSync);
degraded_ctor!(AccessSync);
degraded_ctor!(ResidentSync);
degraded_ctor!(CommunicationSync);
