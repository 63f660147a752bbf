use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;
use tracing::debug;

// ---------------------------------------------------------------------------
// Transport seam
//
// Every call site goes through this trait — there is no ambient or patched
// HTTP function anywhere. Tests substitute a scripted implementation.
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// A fully-buffered HTTP response as the request core consumes it.
#[derive(Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: Bytes) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }
}

/// One round-trip: a buffered request in, a buffered response out. An
/// `Err` means no HTTP response exists at all (DNS, refused connection,
/// reset mid-body); any response with a status code is an `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, req: Request<Bytes>) -> Result<TransportResponse, TransportError>;
}

// ---------------------------------------------------------------------------
// Production transport
// ---------------------------------------------------------------------------

/// hyper-backed transport. HTTP/1.1 over TCP; TLS termination belongs to
/// the local reverse proxy in the deployments this client targets.
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for HyperTransport {
    async fn execute(&self, req: Request<Bytes>) -> Result<TransportResponse, TransportError> {
        let (parts, body) = req.into_parts();
        debug!("{} {}", parts.method, parts.uri);
        let req = Request::from_parts(parts, Full::new(body));

        let resp: http::Response<hyper::body::Incoming> = self
            .client
            .request(req)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let (parts, body) = resp.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?
            .to_bytes();

        Ok(TransportResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}
