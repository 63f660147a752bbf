use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

use shared::types::update::UpdateBatch;

use crate::request::ApiClient;

// ---------------------------------------------------------------------------
// Polling fallback
//
// Redundant with the live channel on purpose: even with the socket down,
// state changes still propagate at coarser latency. Both paths dispatch
// through the same type→event table, so delivery is at-least-once — a
// change may arrive twice, and handlers are expected to be idempotent.
// ---------------------------------------------------------------------------

pub struct PollHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Spawn the updates poll. Each tick is skipped while no session exists;
/// errors are logged and the loop keeps going. Holds only a weak client
/// reference, so an abandoned client ends the loop on the next tick.
pub(crate) fn spawn_poller(client: &Arc<ApiClient>) -> PollHandle {
    let weak: Weak<ApiClient> = Arc::downgrade(client);
    let period = client.config().poll.interval();
    let updates_path = client.config().poll.updates_path.clone();
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => return,
                _ = ticker.tick() => {}
            }

            let Some(client) = weak.upgrade() else { return };

            if !client.session().is_authenticated() {
                debug!("No session, skipping update poll");
                continue;
            }

            match client.get(&updates_path).await {
                Ok(value) => match serde_json::from_value::<UpdateBatch>(value) {
                    Ok(batch) => {
                        if !batch.changes.is_empty() {
                            debug!("Poll returned {} change(s)", batch.changes.len());
                        }
                        for change in &batch.changes {
                            client.dispatcher().dispatch(change);
                        }
                    }
                    Err(e) => warn!("Malformed updates payload: {}", e),
                },
                Err(e) => debug!("Update poll failed: {}", e),
            }
        }
    });

    PollHandle { shutdown, task }
}
