use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use shared::types::client_config::ApiConfig;
use shared::types::update::ChannelUpdate;

use crate::events::{EventBus, SESSION_EXPIRED, route_update};
use crate::navigate::Navigator;
use crate::session::SessionStore;

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Routes server-pushed changes to local subscribers and owns the
/// session-invalidated side effect. The live channel, the polling loop and
/// the HTTP 401 path all funnel through one instance, so every delivery
/// path uses the same type→event table and the same invalidation rules.
#[derive(Clone)]
pub struct Dispatcher {
    bus: Arc<EventBus>,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    dashboard_marker: String,
    login_path: String,
    redirect_delay: Duration,
}

impl Dispatcher {
    pub fn new(
        bus: Arc<EventBus>,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        api: &ApiConfig,
    ) -> Self {
        Self {
            bus,
            session,
            navigator,
            dashboard_marker: api.dashboard_marker.clone(),
            login_path: api.login_path.clone(),
            redirect_delay: api.redirect_delay(),
        }
    }

    /// Republish one server-side change locally. Unrecognized kinds are
    /// logged and dropped; `session_expired` short-circuits into the
    /// invalidation side effect.
    pub fn dispatch(&self, update: &ChannelUpdate) {
        if update.kind == SESSION_EXPIRED {
            warn!("Server reports session expired");
            self.invalidate_session();
            return;
        }
        match route_update(&update.kind) {
            Some(event) => self.bus.emit(event, &update.data),
            None => debug!("Dropping update with unrecognized type '{}'", update.kind),
        }
    }

    /// Side effect shared by HTTP 401 and `session_expired`: on an
    /// authenticated view, clear the whole session and schedule a redirect
    /// to the login view after a short delay. On public pages that merely
    /// probed an endpoint, do nothing — redirecting there would loop.
    pub fn invalidate_session(&self) {
        let path = self.navigator.current_path();
        if !path.contains(&self.dashboard_marker) {
            debug!(
                "Unauthorized on public view '{}', leaving session untouched",
                path
            );
            return;
        }

        warn!(
            "Session invalidated on '{}', clearing and redirecting to {}",
            path, self.login_path
        );
        self.session.clear();

        let navigator = self.navigator.clone();
        let login_path = self.login_path.clone();
        let delay = self.redirect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(&login_path);
        });
    }
}
