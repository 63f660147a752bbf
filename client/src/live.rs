use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use tungstenite::Message;

use shared::types::update::{ChannelUpdate, SubscribeMessage};

use crate::dispatch::Dispatcher;
use crate::error::ApiError;
use crate::session::SessionStore;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ---------------------------------------------------------------------------
// Channel state
//
//   CLOSED --connect/reconnect--> CONNECTING --open--> OPEN --close--> CLOSED
//
// No terminal state: the loop runs for the lifetime of the client and only
// an explicit shutdown ends it.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Closed,
    Connecting,
    Open,
}

struct SharedState(AtomicU8);

impl SharedState {
    fn new() -> Self {
        Self(AtomicU8::new(ChannelState::Closed as u8))
    }

    fn set(&self, state: ChannelState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    fn get(&self) -> ChannelState {
        match self.0.load(Ordering::SeqCst) {
            x if x == ChannelState::Connecting as u8 => ChannelState::Connecting,
            x if x == ChannelState::Open as u8 => ChannelState::Open,
            _ => ChannelState::Closed,
        }
    }
}

// ---------------------------------------------------------------------------
// LiveChannel
// ---------------------------------------------------------------------------

/// Best-effort live-update connection.
///
/// Reconnects after a fixed delay on every close, without backoff and
/// without an attempt ceiling — polling covers the gaps, so persistence
/// beats cleverness here. Outbound pushes are dropped silently unless the
/// connection is currently open.
pub struct LiveChannel {
    outbound: mpsc::UnboundedSender<Value>,
    state: Arc<SharedState>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl LiveChannel {
    pub fn spawn(
        url: String,
        reconnect_delay: Duration,
        session: Arc<SessionStore>,
        dispatcher: Dispatcher,
    ) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let state = Arc::new(SharedState::new());

        let task = tokio::spawn(run_channel(
            url,
            reconnect_delay,
            session,
            dispatcher,
            outbound_rx,
            shutdown_rx,
            state.clone(),
        ));

        Self {
            outbound,
            state,
            shutdown,
            task,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state.get()
    }

    /// Best-effort push. Messages sent while the channel is not open are
    /// dropped, not queued — the polling fallback carries the state.
    pub fn push(&self, message: Value) {
        if self.state.get() != ChannelState::Open {
            debug!("Live channel not open, dropping outbound message");
            return;
        }
        if self.outbound.send(message).is_err() {
            debug!("Live channel task gone, dropping outbound message");
        }
    }

    /// Stop the reconnect loop and close the socket.
    pub async fn close(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

// ---------------------------------------------------------------------------
// Connection loop
// ---------------------------------------------------------------------------

async fn run_channel(
    url: String,
    reconnect_delay: Duration,
    session: Arc<SessionStore>,
    dispatcher: Dispatcher,
    mut outbound: mpsc::UnboundedReceiver<Value>,
    mut shutdown: watch::Receiver<bool>,
    state: Arc<SharedState>,
) {
    loop {
        state.set(ChannelState::Connecting);
        debug!("Connecting live channel to {}", url);

        tokio::select! {
            // A dropped handle counts as shutdown too.
            _ = shutdown.changed() => {
                state.set(ChannelState::Closed);
                return;
            }
            result = connect_async(url.as_str()) => match result {
                Ok((ws, _)) => {
                    info!("Live channel connected");
                    state.set(ChannelState::Open);
                    let finished = run_connection(
                        ws,
                        &session,
                        &dispatcher,
                        &mut outbound,
                        &mut shutdown,
                    )
                    .await;
                    state.set(ChannelState::Closed);
                    if finished == ConnectionEnd::Shutdown {
                        return;
                    }
                }
                Err(e) => {
                    state.set(ChannelState::Closed);
                    warn!("Live channel connect failed: {}", e);
                }
            }
        }

        debug!("Live channel reconnecting in {:?}", reconnect_delay);
        tokio::select! {
            _ = shutdown.changed() => return,
            _ = sleep(reconnect_delay) => {}
        }
    }
}

#[derive(PartialEq, Eq)]
enum ConnectionEnd {
    /// Connection dropped; the loop schedules a reconnect.
    Lost,
    /// Explicit teardown; the loop exits.
    Shutdown,
}

async fn run_connection(
    ws: WsStream,
    session: &SessionStore,
    dispatcher: &Dispatcher,
    outbound: &mut mpsc::UnboundedReceiver<Value>,
    shutdown: &mut watch::Receiver<bool>,
) -> ConnectionEnd {
    let (mut sink, mut stream) = ws.split();

    // Identify ourselves once per connection, when a session exists.
    if let Some(current) = session.snapshot() {
        let subscribe = SubscribeMessage::new(current.email.clone(), current.role.to_string());
        match serde_json::to_string(&subscribe) {
            Ok(text) => {
                if let Err(e) = sink.send(Message::Text(text)).await {
                    warn!("Failed to send subscribe message: {}", e);
                    return ConnectionEnd::Lost;
                }
                debug!("Subscribed to live updates as {}", current.email);
            }
            Err(e) => warn!("Failed to encode subscribe message: {}", e),
        }
    }

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                let _ = sink.send(Message::Close(None)).await;
                return ConnectionEnd::Shutdown;
            }
            message = outbound.recv() => match message {
                Some(value) => {
                    if let Err(e) = sink.send(Message::Text(value.to_string())).await {
                        warn!("Live channel push failed: {}", e);
                        return ConnectionEnd::Lost;
                    }
                }
                // All handles dropped; treat like teardown.
                None => return ConnectionEnd::Shutdown,
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_frame(&text, dispatcher),
                Some(Ok(Message::Close(_))) => {
                    info!("Live channel closed by server");
                    return ConnectionEnd::Lost;
                }
                // Ping/pong are answered by the transport; binary frames
                // are not part of the protocol.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Live channel transport error: {}", e);
                    return ConnectionEnd::Lost;
                }
                None => {
                    info!("Live channel stream ended");
                    return ConnectionEnd::Lost;
                }
            }
        }
    }
}

/// Parse one inbound text frame. Kept separate from [`handle_frame`] so the
/// failure mode stays testable.
pub(crate) fn parse_frame(text: &str) -> Result<ChannelUpdate, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::MalformedMessage(e.to_string()))
}

/// Malformed payloads are logged and ignored; the connection stays open.
fn handle_frame(text: &str, dispatcher: &Dispatcher) {
    match parse_frame(text) {
        Ok(update) => dispatcher.dispatch(&update),
        Err(e) => warn!("{}", e),
    }
}
