//! Upstream session cookies.
//!
//! # Responsibilities
//! - Split folded `Set-Cookie` values back into individual directives
//! - Keep the single upstream session's cookies for the process lifetime
//! - Merge those cookies into every outbound `Cookie` header
//!
//! # Known Limitation
//! Folding is undone heuristically: a value with more than one `=` and more
//! than one `;` is split on `", "`. A directive whose own text contains
//! `", "` (an `Expires` date, a quoted value) is mis-split; every fragment
//! containing `=` is still emitted, so nothing is silently dropped.

use std::sync::Mutex;

/// Reconstruct individual directives from one possibly folded `Set-Cookie` value.
pub fn split_set_cookie(folded: &str) -> Vec<String> {
    let folded_many = folded.matches('=').count() > 1 && folded.matches(';').count() > 1;
    if !folded_many {
        return vec![folded.to_string()];
    }

    folded
        .split(", ")
        .filter(|part| part.contains('='))
        .map(str::to_string)
        .collect()
}

/// `name=value` of a directive, and whether its attributes delete it.
fn parse_directive(directive: &str) -> Option<(&str, &str, bool)> {
    let mut parts = directive.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let expired = parts.any(|attr| {
        attr.split_once('=').is_some_and(|(key, v)| {
            key.trim().eq_ignore_ascii_case("max-age")
                && v.trim().parse::<i64>().is_ok_and(|age| age <= 0)
        })
    });
    Some((name, value.trim(), expired))
}

/// Cookie names a client `Cookie` value carries.
///
/// Non-UTF-8 bytes are read lossily; this only affects name matching, never
/// what is forwarded. Pairs without `=` have no name.
fn inbound_names(value: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(value)
        .split(';')
        .filter_map(|pair| {
            let (name, _) = pair.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Process-wide cookie store for the one emulated upstream session.
///
/// Cookies are kept in first-set order, replaced by name, and removed by
/// `Max-Age=0`. There is no per-client separation and no eviction.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: Mutex<Vec<(String, String)>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one `Set-Cookie` directive.
    pub fn store(&self, directive: &str) {
        let Some((name, value, expired)) = parse_directive(directive) else {
            tracing::debug!(directive = %directive, "Ignoring unparseable Set-Cookie");
            return;
        };

        let mut cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        let existing = cookies.iter().position(|(n, _)| n == name);
        match (existing, expired) {
            (Some(i), true) => {
                cookies.remove(i);
            }
            (None, true) => {}
            (Some(i), false) => cookies[i].1 = value.to_string(),
            (None, false) => cookies.push((name.to_string(), value.to_string())),
        }
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        let cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        cookies.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone())
    }

    pub fn len(&self) -> usize {
        self.cookies.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `Cookie` header value for an outbound request.
    ///
    /// The client's own values are kept byte-for-byte, in order, and win on
    /// name conflicts; jar cookies whose names they lack are appended.
    pub fn cookie_header(&self, inbound: &[&[u8]]) -> Option<Vec<u8>> {
        let mut header: Vec<u8> = Vec::new();
        let mut names: Vec<String> = Vec::new();

        for value in inbound.iter().filter(|v| !v.is_empty()) {
            if !header.is_empty() {
                header.extend_from_slice(b"; ");
            }
            header.extend_from_slice(value);
            names.extend(inbound_names(value));
        }

        let cookies = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        for (name, value) in cookies.iter() {
            if names.contains(name) {
                continue;
            }
            if !header.is_empty() {
                header.extend_from_slice(b"; ");
            }
            header.extend_from_slice(format!("{name}={value}").as_bytes());
        }

        (!header.is_empty()).then_some(header)
    }
}
