//! Header rewriting in both directions.
//!
//! # Responsibilities
//! - Build the outbound header set: inbound minus Host/Content-Length, plus
//!   X-Real-IP, X-Forwarded-For/Host/Proto and X-Original-URI
//! - Merge session cookies into the outbound `Cookie` header
//! - Build the client-facing header set: one `Set-Cookie` per directive,
//!   minus headers the local server regenerates
//!
//! # Design Decisions
//! - X-Forwarded-* are overwritten, never appended
//! - Host and Content-Length are always recomputed, never copied

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use std::net::IpAddr;

use crate::proxy::cookies::{split_set_cookie, CookieJar};

pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_ORIGINAL_URI: HeaderName = HeaderName::from_static("x-original-uri");

/// Request headers never copied upstream.
const REQUEST_DENY_LIST: [HeaderName; 2] = [header::HOST, header::CONTENT_LENGTH];

/// Response headers never copied back; the local server writes its own.
const RESPONSE_DENY_LIST: [HeaderName; 3] = [header::SERVER, header::DATE, header::TRANSFER_ENCODING];

/// Per-request facts the outbound headers are derived from.
#[derive(Debug, Clone, Copy)]
pub struct ForwardingContext<'a> {
    /// Authority of the upstream base URL, sent as `Host`.
    pub upstream_authority: &'a str,
    /// Address of the connecting client.
    pub client_ip: IpAddr,
    /// Path and query exactly as received.
    pub original_uri: &'a str,
}

/// Build the outbound header set for one forwarded request.
pub fn outbound_headers(inbound: &HeaderMap, ctx: &ForwardingContext<'_>, jar: &CookieJar) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 6);

    for (name, value) in inbound {
        if REQUEST_DENY_LIST.contains(name) || name == header::COOKIE {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    let client_ip = ctx.client_ip.to_string();
    let original_host = inbound
        .get(header::HOST)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(""));

    insert_str(&mut headers, header::HOST, ctx.upstream_authority);
    insert_str(&mut headers, X_REAL_IP, &client_ip);
    insert_str(&mut headers, X_FORWARDED_FOR, &client_ip);
    headers.insert(X_FORWARDED_HOST, original_host);
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    insert_str(&mut headers, X_ORIGINAL_URI, ctx.original_uri);

    let inbound_cookies: Vec<&[u8]> = inbound
        .get_all(header::COOKIE)
        .iter()
        .map(HeaderValue::as_bytes)
        .collect();

    if let Some(cookie) = jar.cookie_header(&inbound_cookies) {
        match HeaderValue::from_bytes(&cookie) {
            Ok(value) => {
                headers.insert(header::COOKIE, value);
            }
            Err(_) => tracing::warn!("Dropping Cookie header with invalid bytes"),
        }
    }

    headers
}

fn insert_str(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        }
        Err(_) => tracing::warn!(header = %name, "Dropping header with invalid value"),
    }
}

/// Every `Set-Cookie` directive of an upstream response, with folded values split.
pub fn set_cookie_directives(upstream: &HeaderMap) -> Vec<String> {
    upstream
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(split_set_cookie)
        .collect()
}

/// Client-facing headers: one `Set-Cookie` per directive, then everything
/// else the upstream sent except the deny list.
pub fn client_headers(upstream: &HeaderMap, directives: &[String]) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len() + directives.len());

    for directive in directives {
        if let Ok(value) = HeaderValue::from_str(directive) {
            headers.append(header::SET_COOKIE, value);
        }
    }

    // Values that are not visible ASCII cannot be split; pass them through whole.
    for value in upstream.get_all(header::SET_COOKIE) {
        if value.to_str().is_err() {
            headers.append(header::SET_COOKIE, value.clone());
        }
    }

    for (name, value) in upstream {
        if name == header::SET_COOKIE || RESPONSE_DENY_LIST.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers
}
