use serde_json::{Value, json};
use tracing::warn;

use shared::types::notify::NotifyDomain;

use crate::request::ApiClient;

// ---------------------------------------------------------------------------
// Change notifications
//
// Fire-and-forget side channels: peers hear about the change immediately
// over the socket, the server records it over REST. Neither leg may fail
// the caller.
// ---------------------------------------------------------------------------

impl ApiClient {
    /// Announce a domain change. Unconditionally and independently:
    /// (a) best-effort push onto the live channel, dropped silently when the
    /// channel is not open, and (b) POST to the domain's notify endpoint,
    /// with failures logged and swallowed.
    pub async fn notify_change(&self, domain: NotifyDomain, action: &str, data: Value) {
        self.push_live(json!({
            "type": domain.update_kind(),
            "action": action,
            "data": data.clone(),
        }));

        let body = json!({ "action": action, "data": data });
        if let Err(e) = self.post(domain.notify_path(), body).await {
            warn!("Change notification for {} failed: {}", domain, e);
        }
    }

    pub async fn notify_maintenance_change(&self, action: &str, data: Value) {
        self.notify_change(NotifyDomain::Maintenance, action, data)
            .await;
    }

    pub async fn notify_financial_change(&self, action: &str, data: Value) {
        self.notify_change(NotifyDomain::Financial, action, data)
            .await;
    }

    pub async fn notify_access_change(&self, action: &str, data: Value) {
        self.notify_change(NotifyDomain::Access, action, data).await;
    }

    pub async fn notify_resident_change(&self, action: &str, data: Value) {
        self.notify_change(NotifyDomain::Resident, action, data)
            .await;
    }

    pub async fn notify_communication_change(&self, action: &str, data: Value) {
        self.notify_change(NotifyDomain::Communication, action, data)
            .await;
    }
}
