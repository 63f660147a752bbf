use serde::de::DeserializeOwned;
use tracing::warn;

use shared::types::sync::{
    AccessSync, CommunicationSync, FinancialSync, MaintenanceSync, ResidentSync,
};

use crate::request::ApiClient;

// ---------------------------------------------------------------------------
// Bulk sync pulls
//
// One pull per domain. These never fail: any error degrades to an empty
// payload carrying an error marker, so rendering code consumes the result
// without its own error handling.
// ---------------------------------------------------------------------------

impl ApiClient {
    pub async fn sync_maintenance(&self) -> MaintenanceSync {
        self.fetch_sync("/api/maintenance/tickets/sync/", MaintenanceSync::degraded)
            .await
    }

    pub async fn sync_financial(&self) -> FinancialSync {
        self.fetch_sync("/api/financial/records/sync/", FinancialSync::degraded)
            .await
    }

    pub async fn sync_access(&self) -> AccessSync {
        self.fetch_sync("/api/access/logs/sync/", AccessSync::degraded)
            .await
    }

    pub async fn sync_residents(&self) -> ResidentSync {
        self.fetch_sync("/api/residents/sync/", ResidentSync::degraded)
            .await
    }

    pub async fn sync_communications(&self) -> CommunicationSync {
        self.fetch_sync("/api/communications/sync/", CommunicationSync::degraded)
            .await
    }

    async fn fetch_sync<T: DeserializeOwned>(&self, endpoint: &str, degraded: fn() -> T) -> T {
        match self.get(endpoint).await {
            Ok(value) => match serde_json::from_value(value) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Sync payload from {} malformed: {}", endpoint, e);
                    degraded()
                }
            },
            Err(e) => {
                warn!("Sync pull from {} failed: {}", endpoint, e);
                degraded()
            }
        }
    }

    /// Liveness probe: true exactly when `GET /api/health/` answers in the
    /// success range.
    pub async fn check_health(&self) -> bool {
        self.get("/api/health/").await.is_ok()
    }
}
