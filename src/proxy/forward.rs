//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build the upstream URI from the base URL plus the inbound path and query
//! - Read POST/PUT bodies, send every other method without one
//! - Execute one attempt on the shared client, bounded by a timeout
//! - Record session cookies and rebuild the client response
//!
//! # Design Decisions
//! - hyper never follows redirects; 3xx responses reach the client as-is
//! - No retries: a single forwarding attempt per inbound request
//! - The response body is buffered so the timeout covers the whole exchange

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::{ProxyConfig, TimeoutConfig};
use crate::http::response::plain_text;
use crate::proxy::cookies::CookieJar;
use crate::proxy::headers::{client_headers, outbound_headers, set_cookie_directives, ForwardingContext};

/// Errors that can occur while forwarding a request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The configured upstream base is unusable.
    #[error("invalid upstream `{0}`")]
    InvalidUpstream(String),

    /// The composed upstream URI does not parse.
    #[error("invalid upstream URI `{0}`")]
    InvalidUri(String),

    /// TCP connect or DNS failure.
    #[error("connection to upstream failed: {0}")]
    Connect(String),

    /// Any other failure while exchanging with the upstream.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// The whole exchange exceeded the configured bound.
    #[error("upstream did not respond within {0} seconds")]
    Timeout(u64),

    /// The client's body declared more bytes than allowed.
    #[error("request body of {size} bytes exceeds limit of {limit} bytes")]
    BodyTooLarge { size: u64, limit: usize },

    /// Reading the client's body failed.
    #[error("failed to read request body: {0}")]
    BodyRead(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        plain_text(status, self.to_string())
    }
}

/// The emulated upstream session: one client, one cookie jar, one base URL.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    base: String,
    authority: String,
    jar: Arc<CookieJar>,
    timeout: Duration,
    max_body_bytes: usize,
}

impl Forwarder {
    /// Create a forwarder sharing `jar` across every request it handles.
    pub fn new(proxy: &ProxyConfig, timeouts: &TimeoutConfig, jar: Arc<CookieJar>) -> Result<Self, ProxyError> {
        let url = Url::parse(&proxy.upstream)
            .map_err(|_| ProxyError::InvalidUpstream(proxy.upstream.clone()))?;
        let host = url
            .host_str()
            .ok_or_else(|| ProxyError::InvalidUpstream(proxy.upstream.clone()))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            base: proxy.upstream.trim_end_matches('/').to_string(),
            authority,
            jar,
            timeout: Duration::from_secs(proxy_timeout_secs(timeouts)),
            max_body_bytes: proxy.max_body_bytes,
        })
    }

    /// `Host` value sent upstream.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Upstream URI for an inbound path-and-query.
    pub fn upstream_uri(&self, path_and_query: &str) -> Result<Uri, ProxyError> {
        let target = format!("{}{}", self.base, path_and_query);
        target.parse().map_err(|_| ProxyError::InvalidUri(target))
    }

    /// Forward one request and convert every failure into a response.
    pub async fn forward(&self, request: Request<Body>, client_ip: IpAddr) -> Response {
        match self.try_forward(request, client_ip).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Proxy error");
                e.into_response()
            }
        }
    }

    /// Forward one request to the upstream.
    pub async fn try_forward(&self, request: Request<Body>, client_ip: IpAddr) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();
        let original_uri = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());
        let uri = self.upstream_uri(&original_uri)?;

        tracing::debug!(method = %parts.method, target = %uri, "Forwarding request");

        let body = self.read_body(&parts.method, &parts.headers, body).await?;

        let ctx = ForwardingContext {
            upstream_authority: &self.authority,
            client_ip,
            original_uri: &original_uri,
        };
        let headers = outbound_headers(&parts.headers, &ctx, &self.jar);

        let mut outbound = Request::new(body);
        *outbound.method_mut() = parts.method.clone();
        *outbound.uri_mut() = uri;
        *outbound.headers_mut() = headers;

        let secs = self.timeout.as_secs();
        tokio::time::timeout(self.timeout, self.exchange(outbound))
            .await
            .map_err(|_| ProxyError::Timeout(secs))?
    }

    /// Only POST and PUT with a positive Content-Length carry a body upstream.
    async fn read_body(&self, method: &Method, headers: &header::HeaderMap, body: Body) -> Result<Body, ProxyError> {
        if method != Method::POST && method != Method::PUT {
            return Ok(Body::empty());
        }

        let declared = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);
        if declared == 0 {
            return Ok(Body::empty());
        }
        if declared > self.max_body_bytes as u64 {
            return Err(ProxyError::BodyTooLarge {
                size: declared,
                limit: self.max_body_bytes,
            });
        }

        let bytes = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| ProxyError::BodyRead(e.to_string()))?;
        tracing::debug!(bytes = bytes.len(), "Request body read");
        Ok(Body::from(bytes))
    }

    async fn exchange(&self, outbound: Request<Body>) -> Result<Response, ProxyError> {
        let upstream = self.client.request(outbound).await.map_err(|e| {
            if e.is_connect() {
                ProxyError::Connect(error_chain(&e))
            } else {
                ProxyError::Upstream(error_chain(&e))
            }
        })?;

        let (parts, body) = upstream.into_parts();
        let bytes = axum::body::to_bytes(Body::new(body), usize::MAX)
            .await
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let directives = set_cookie_directives(&parts.headers);
        for directive in &directives {
            self.jar.store(directive);
        }

        tracing::debug!(
            status = %parts.status,
            set_cookies = directives.len(),
            jar_size = self.jar.len(),
            bytes = bytes.len(),
            "Upstream responded"
        );

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = parts.status;
        *response.headers_mut() = client_headers(&parts.headers, &directives);
        Ok(response)
    }
}

fn proxy_timeout_secs(timeouts: &TimeoutConfig) -> u64 {
    timeouts.upstream_secs.max(1)
}

/// hyper-util wraps the useful message in its source chain.
fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
