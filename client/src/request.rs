use std::sync::Arc;

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use shared::types::client_config::ClientConfig;
use shared::types::json_error::ApiErrorBody;
use shared::types::login::{LoginRequest, LoginResponse};
use shared::types::session::SessionData;

use crate::dispatch::Dispatcher;
use crate::error::{ApiError, ApiResult};
use crate::events::{EventBus, event};
use crate::live::LiveChannel;
use crate::navigate::Navigator;
use crate::poll::PollHandle;
use crate::session::{CSRF_COOKIE, CookieJar, SessionStore};
use crate::transport::HttpTransport;

const CSRF_HEADER: &str = "x-csrftoken";
const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to perform this action";

// ---------------------------------------------------------------------------
// Request options
// ---------------------------------------------------------------------------

/// Per-call options. Caller-supplied headers take precedence over the
/// client's defaults when they collide.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_body(method: Method, body: Value) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Centralizes every outgoing call to the building-management backend:
/// auth/CSRF header injection, error classification, the live-update
/// channel with its polling fallback, and the local event bus.
///
/// Construct one instance at the application's composition point and pass
/// it to whatever needs it; call [`ApiClient::close`] on teardown.
pub struct ApiClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    navigator: Arc<dyn Navigator>,
    session: Arc<SessionStore>,
    cookies: Arc<CookieJar>,
    bus: Arc<EventBus>,
    dispatcher: Dispatcher,
    live: Mutex<Option<LiveChannel>>,
    poller: Mutex<Option<PollHandle>>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        let session = Arc::new(match &config.session.file {
            Some(path) => SessionStore::with_file(path),
            None => SessionStore::in_memory(),
        });
        let cookies = Arc::new(CookieJar::new());
        let bus = Arc::new(EventBus::new());
        let dispatcher = Dispatcher::new(
            bus.clone(),
            session.clone(),
            navigator.clone(),
            &config.api,
        );

        Arc::new(Self {
            config,
            transport,
            navigator,
            session,
            cookies,
            bus,
            dispatcher,
            live: Mutex::new(None),
            poller: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // -----------------------------------------------------------------------
    // Request execution
    // -----------------------------------------------------------------------

    /// Execute one call against a relative endpoint path, classify the
    /// outcome, and hand back the parsed JSON body.
    pub async fn request(&self, endpoint: &str, opts: RequestOptions) -> ApiResult<Value> {
        let url = self.config.api.endpoint_url(endpoint);

        let body = match &opts.body {
            Some(value) => Bytes::from(serde_json::to_vec(value)?),
            None => Bytes::new(),
        };

        let mut req = Request::builder()
            .method(opts.method.clone())
            .uri(url.as_str())
            .body(body)
            .map_err(|e| ApiError::Network(format!("invalid request for {}: {}", url, e)))?;
        *req.headers_mut() = self.build_headers(&opts.headers);

        let resp = self.transport.execute(req).await.map_err(|e| {
            warn!("Request to {} failed without a response: {}", endpoint, e);
            ApiError::Network(e.to_string())
        })?;

        // Cookies travel both ways on every call.
        self.cookies.absorb(&resp.headers);

        if resp.status.is_success() {
            if resp.body.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_slice(&resp.body)?);
        }

        Err(self.classify_failure(endpoint, resp.status, &resp.body))
    }

    pub async fn get(&self, endpoint: &str) -> ApiResult<Value> {
        self.request(endpoint, RequestOptions::new(Method::GET)).await
    }

    /// GET with a query string built from `params`.
    pub async fn get_with_params(&self, endpoint: &str, params: &[(&str, &str)]) -> ApiResult<Value> {
        if params.is_empty() {
            return self.get(endpoint).await;
        }
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (key, value) in params {
            query.append_pair(key, value);
        }
        let sep = if endpoint.contains('?') { '&' } else { '?' };
        self.get(&format!("{}{}{}", endpoint, sep, query.finish())).await
    }

    pub async fn post(&self, endpoint: &str, body: Value) -> ApiResult<Value> {
        self.request(endpoint, RequestOptions::with_body(Method::POST, body))
            .await
    }

    pub async fn put(&self, endpoint: &str, body: Value) -> ApiResult<Value> {
        self.request(endpoint, RequestOptions::with_body(Method::PUT, body))
            .await
    }

    pub async fn patch(&self, endpoint: &str, body: Value) -> ApiResult<Value> {
        self.request(endpoint, RequestOptions::with_body(Method::PATCH, body))
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResult<Value> {
        self.request(endpoint, RequestOptions::new(Method::DELETE))
            .await
    }

    /// Re-issue the same request up to `max_retries` times, sleeping
    /// `attempt × retry_backoff` between attempts. The last error wins once
    /// attempts are exhausted.
    pub async fn retry_request(
        &self,
        endpoint: &str,
        opts: RequestOptions,
        max_retries: u32,
    ) -> ApiResult<Value> {
        let attempts = max_retries.max(1);
        let mut last_err = None;

        for attempt in 1..=attempts {
            match self.request(endpoint, opts.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        "Request to {} failed (attempt {}/{}): {}",
                        endpoint, attempt, attempts, e
                    );
                    last_err = Some(e);
                    if attempt < attempts {
                        sleep(self.config.api.retry_backoff() * attempt).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ApiError::Network("no attempts made".into())))
    }

    /// Default headers first, then caller overrides on top.
    fn build_headers(&self, caller: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Anti-forgery token, read fresh from the jar on every call.
        if let Some(csrf) = self.cookies.get(CSRF_COOKIE) {
            match HeaderValue::from_str(&csrf) {
                Ok(value) => {
                    headers.insert(HeaderName::from_static(CSRF_HEADER), value);
                }
                Err(_) => warn!("CSRF cookie holds a non-header-safe value, skipping"),
            }
        }

        if let Some(token) = self.session.token() {
            if let Ok(value) = HeaderValue::from_str(&format!("Token {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        if let Some(cookie) = self.cookies.header_value() {
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                headers.insert(COOKIE, value);
            }
        }

        for (name, value) in caller {
            headers.insert(name.clone(), value.clone());
        }

        headers
    }

    fn classify_failure(&self, endpoint: &str, status: StatusCode, body: &[u8]) -> ApiError {
        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Unauthorized response from {}", endpoint);
                self.dispatcher.invalidate_session();
                ApiError::Unauthorized
            }
            StatusCode::FORBIDDEN => {
                warn!("Forbidden response from {}", endpoint);
                self.bus.emit(
                    event::ACCESS_DENIED,
                    &json!({ "message": PERMISSION_DENIED_MESSAGE }),
                );
                ApiError::Forbidden
            }
            other => {
                if let Ok(parsed) = serde_json::from_slice::<ApiErrorBody>(body) {
                    if !parsed.message.is_empty() {
                        debug!("Backend error from {}: {}", endpoint, parsed.message);
                    }
                }
                ApiError::Http {
                    status: other.as_u16(),
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Authenticate against the backend; on success the session keys are
    /// stored before this returns.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = serde_json::to_value(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let value = self.post("/api/login/", body).await?;
        let response: LoginResponse = serde_json::from_value(value)?;

        if let Some(user) = response.user() {
            self.session.store(&SessionData {
                token: user.token.clone(),
                role: user.role,
                email: user.email.clone(),
                name: user.name.clone(),
                invitation_code: user.invitation_code.clone(),
            });
            info!("Logged in as {} ({})", user.email, user.role);
        }

        Ok(response)
    }

    /// Drop the session and return to the login view. Every session key is
    /// gone before the navigation happens.
    pub fn logout(&self) {
        self.session.clear();
        self.navigator.navigate(&self.config.api.login_path);
    }

    // -----------------------------------------------------------------------
    // Background tasks
    // -----------------------------------------------------------------------

    /// Open the live channel. When no usable endpoint can be derived the
    /// channel stays disabled and polling remains the only update source —
    /// deliberately not an error.
    pub fn start_live_channel(&self) {
        let mut guard = self.live.lock();
        if guard.is_some() {
            debug!("Live channel already running");
            return;
        }
        match self.config.websocket_url() {
            Some(url) => {
                *guard = Some(LiveChannel::spawn(
                    url,
                    self.config.channel.reconnect_delay(),
                    self.session.clone(),
                    self.dispatcher.clone(),
                ));
            }
            None => debug!("Live channel disabled: no usable endpoint, polling only"),
        }
    }

    /// Start the periodic updates poll. Runs until [`ApiClient::close`];
    /// each tick is skipped while no session exists.
    pub fn start_polling(self: &Arc<Self>) {
        let mut guard = self.poller.lock();
        if guard.is_some() {
            debug!("Polling already running");
            return;
        }
        *guard = Some(crate::poll::spawn_poller(self));
    }

    /// Push a message onto the live channel if it is open; silently does
    /// nothing otherwise.
    pub fn push_live(&self, message: Value) {
        match self.live.lock().as_ref() {
            Some(channel) => channel.push(message),
            None => debug!("Live channel not running, dropping outbound message"),
        }
    }

    /// Tear down background work: stops the polling loop and closes the
    /// live channel. Idempotent.
    pub async fn close(&self) {
        let poller = self.poller.lock().take();
        if let Some(poller) = poller {
            poller.stop().await;
        }
        let live = self.live.lock().take();
        if let Some(live) = live {
            live.close().await;
        }
        info!("API client closed");
    }
}
