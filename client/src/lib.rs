//! Async client for the building-management backend.
//!
//! One [`ApiClient`] instance centralizes every outgoing HTTP call (auth
//! and CSRF headers, error classification, retry), keeps a best-effort
//! live-update channel open next to a session-gated polling fallback, and
//! republishes server-pushed changes to local subscribers through a small
//! synchronous event bus.
//!
//! Construct it at the application's composition point with an explicit
//! transport and navigator, start the background work, and close it on
//! teardown:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use client::{ApiClient, HyperTransport, MemoryNavigator, event};
//!
//! # async fn compose(config: shared::types::ClientConfig) {
//! let client = ApiClient::new(
//!     config,
//!     Arc::new(HyperTransport::new()),
//!     Arc::new(MemoryNavigator::new("/dashboard")),
//! );
//! client.events().on(event::PAYMENT_RECEIVED, Arc::new(|data| {
//!     println!("payment: {}", data);
//! }));
//! client.start_live_channel();
//! client.start_polling();
//! // ...
//! client.close().await;
//! # }
//! ```

pub mod dispatch;
pub mod error;
pub mod events;
pub mod live;
pub mod navigate;
pub mod notify;
pub mod poll;
pub mod request;
pub mod session;
pub mod sync;
pub mod transport;

pub use error::{ApiError, ApiResult};
pub use events::{EventBus, Handler, event, route_update};
pub use live::{ChannelState, LiveChannel};
pub use navigate::{MemoryNavigator, Navigator};
pub use request::{ApiClient, RequestOptions};
pub use session::{CSRF_COOKIE, CookieJar, SessionStore};
pub use transport::{HttpTransport, HyperTransport, TransportError, TransportResponse};
