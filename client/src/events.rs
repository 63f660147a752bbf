use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, error};

// ---------------------------------------------------------------------------
// Local event names
// ---------------------------------------------------------------------------

/// Events the client republishes locally. Names are part of the public
/// contract with view-layer subscribers.
pub mod event {
    pub const MAINTENANCE_UPDATED: &str = "maintenanceUpdated";
    pub const FINANCIAL_UPDATED: &str = "financialUpdated";
    pub const ACCESS_UPDATED: &str = "accessUpdated";
    pub const COMMUNICATION_UPDATED: &str = "communicationUpdated";
    pub const RESIDENT_UPDATED: &str = "residentUpdated";
    pub const TICKET_ASSIGNED: &str = "ticketAssigned";
    pub const PAYMENT_RECEIVED: &str = "paymentReceived";
    pub const PERMISSION_CREATED: &str = "permissionCreated";
    pub const ACCESS_DENIED: &str = "accessDenied";

    pub const ALL: [&str; 9] = [
        MAINTENANCE_UPDATED,
        FINANCIAL_UPDATED,
        ACCESS_UPDATED,
        COMMUNICATION_UPDATED,
        RESIDENT_UPDATED,
        TICKET_ASSIGNED,
        PAYMENT_RECEIVED,
        PERMISSION_CREATED,
        ACCESS_DENIED,
    ];
}

/// Inbound update kind that invalidates the session instead of mapping to
/// a local event.
pub const SESSION_EXPIRED: &str = "session_expired";

/// Fixed lookup from server-side update kinds to local event names. Both
/// the live channel and the polling loop dispatch through this table;
/// anything it does not recognize is dropped.
pub fn route_update(kind: &str) -> Option<&'static str> {
    match kind {
        "maintenance_update" => Some(event::MAINTENANCE_UPDATED),
        "financial_update" => Some(event::FINANCIAL_UPDATED),
        "access_update" => Some(event::ACCESS_UPDATED),
        "communication_update" => Some(event::COMMUNICATION_UPDATED),
        "resident_update" => Some(event::RESIDENT_UPDATED),
        "ticket_assigned" => Some(event::TICKET_ASSIGNED),
        "payment_received" => Some(event::PAYMENT_RECEIVED),
        "permission_created" => Some(event::PERMISSION_CREATED),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// A subscriber callback. Identity is the `Arc` allocation itself:
/// [`EventBus::off`] removes by pointer equality, so keep the `Arc` you
/// registered if you intend to unsubscribe later.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Synchronous event fan-out: event name → ordered subscriber list.
///
/// Dispatch happens on the calling thread, in registration order. Each
/// callback runs isolated — a panicking subscriber is logged and the rest
/// still receive the event.
#[derive(Default)]
pub struct EventBus {
    handlers: Mutex<HashMap<String, Vec<Handler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber for `event`.
    pub fn on(&self, event: &str, handler: Handler) {
        self.handlers
            .lock()
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    /// Remove `handler` from `event` by reference identity. No-op when the
    /// event is unknown or the handler was never registered.
    pub fn off(&self, event: &str, handler: &Handler) {
        let mut handlers = self.handlers.lock();
        let emptied = match handlers.get_mut(event) {
            Some(list) => {
                list.retain(|h| !Arc::ptr_eq(h, handler));
                list.is_empty()
            }
            None => false,
        };
        if emptied {
            handlers.remove(event);
        }
    }

    /// Invoke every current subscriber of `event` with `data`, in
    /// registration order.
    pub fn emit(&self, event: &str, data: &Value) {
        // Snapshot under the lock, dispatch outside it — a callback may
        // re-enter on()/off().
        let snapshot: Vec<Handler> = match self.handlers.lock().get(event) {
            Some(list) => list.clone(),
            None => return,
        };
        debug!("Emitting '{}' to {} subscriber(s)", event, snapshot.len());
        for handler in snapshot {
            if catch_unwind(AssertUnwindSafe(|| handler(data))).is_err() {
                error!("Subscriber for '{}' panicked, continuing dispatch", event);
            }
        }
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.handlers.lock().get(event).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;

    fn recorder() -> (Arc<StdMutex<Vec<String>>>, impl Fn(&str) -> Handler) {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let log_for_make = log.clone();
        let make = move |tag: &str| -> Handler {
            let log = log_for_make.clone();
            let tag = tag.to_string();
            Arc::new(move |data: &Value| {
                log.lock().unwrap().push(format!("{}:{}", tag, data));
            })
        };
        (log, make)
    }

    #[test]
    fn emit_invokes_in_registration_order() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.on("ping", make("a"));
        bus.on("ping", make("b"));
        bus.on("ping", make("c"));
        bus.emit("ping", &json!(1));
        assert_eq!(*log.lock().unwrap(), vec!["a:1", "b:1", "c:1"]);
    }

    #[test]
    fn emit_passes_payload_exactly_once_per_subscriber() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.on("tick", make("x"));
        bus.emit("tick", &json!({"n": 7}));
        bus.emit("other", &json!(0));
        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(log.lock().unwrap()[0], "x:{\"n\":7}");
    }

    #[test]
    fn off_removes_only_that_handler() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let a = make("a");
        let b = make("b");
        bus.on("evt", a.clone());
        bus.on("evt", b.clone());
        bus.off("evt", &a);
        bus.emit("evt", &json!(null));
        assert_eq!(*log.lock().unwrap(), vec!["b:null"]);
    }

    #[test]
    fn off_is_noop_for_unknown_event_or_handler() {
        let bus = EventBus::new();
        let (_, make) = recorder();
        let orphan = make("z");
        bus.off("missing", &orphan);
        bus.on("evt", make("a"));
        bus.off("evt", &orphan);
        assert_eq!(bus.subscriber_count("evt"), 1);
    }

    #[test]
    fn identical_closures_are_distinct_identities() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let first = make("same");
        let second = make("same");
        bus.on("evt", first.clone());
        bus.on("evt", second);
        bus.off("evt", &first);
        bus.emit("evt", &json!(1));
        // The second registration survives even though the code is identical.
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn panicking_subscriber_does_not_block_the_rest() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.on("evt", make("first"));
        bus.on("evt", Arc::new(|_: &Value| panic!("subscriber bug")));
        bus.on("evt", make("last"));
        bus.emit("evt", &json!(2));
        assert_eq!(*log.lock().unwrap(), vec!["first:2", "last:2"]);
    }

    #[test]
    fn route_update_covers_every_known_kind() {
        let cases = [
            ("maintenance_update", event::MAINTENANCE_UPDATED),
            ("financial_update", event::FINANCIAL_UPDATED),
            ("access_update", event::ACCESS_UPDATED),
            ("communication_update", event::COMMUNICATION_UPDATED),
            ("resident_update", event::RESIDENT_UPDATED),
            ("ticket_assigned", event::TICKET_ASSIGNED),
            ("payment_received", event::PAYMENT_RECEIVED),
            ("permission_created", event::PERMISSION_CREATED),
        ];
        for (kind, expected) in cases {
            assert_eq!(route_update(kind), Some(expected));
        }
    }

    #[test]
    fn route_update_drops_unknown_kinds() {
        assert_eq!(route_update("weather_update"), None);
        assert_eq!(route_update(""), None);
        // session_expired is a side effect, not a routed event.
        assert_eq!(route_update(SESSION_EXPIRED), None);
    }
}
