//! Cookie jar abstraction and a simple in-memory implementation.
//!
//! A **cookie jar** is the document's ambient cookie storage: a single string
//! that reads as `name=value` pairs joined by `"; "` and that accepts one
//! `Set-Cookie`-style directive per write. The [`CookieStore`](crate::cookies::CookieStore)
//! only ever talks to the jar through the [`CookieJar`] trait, so it can be
//! driven by a real browser binding or by [`DocumentCookieJar`].
//!
//! [`DocumentCookieJar`] emulates `document.cookie` **in memory only**:
//! - a directive replaces the cookie with the same name, path and domain;
//! - a directive whose `expires` lies in the past deletes that cookie;
//! - a read lists every cookie that has not expired, in insertion order.
//!
//! ## Notes & limitations
//! - Attributes handled: `expires` (RFC 1123), `path`, `domain` (leading dot
//!   stripped), `secure`. Anything else is ignored.
//! - Reads are not filtered by path or domain; the jar models a single document.
//! - This module is **not** internally synchronized. Use it via a
//!   [`CookieJarHandle`].

use crate::cookies::expires::parse_expires;
use crate::cookies::{CookieJarHandle, JarCookie};
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;

const DEFAULT_DOCUMENT_PATH: &str = "/";

/// Raw access to a document's cookie storage.
pub trait CookieJar: Send + Sync {
    /// Returns every visible cookie as `name=value` pairs joined by `"; "`.
    fn read(&self) -> String;

    /// Applies a single `name=value; attr; ...` directive.
    ///
    /// Writes never fail; a directive the jar cannot use is dropped.
    fn write(&mut self, directive: &str);
}

/// In-memory stand-in for `document.cookie`.
#[derive(Debug, Clone)]
pub struct DocumentCookieJar {
    /// Cookies in insertion order.
    entries: Vec<JarCookie>,

    /// Path applied to directives without a `path` attribute.
    document_path: String,
}

impl DocumentCookieJar {
    /// Creates an empty jar for a document at `/`.
    pub fn new() -> Self {
        Self::with_document_path(DEFAULT_DOCUMENT_PATH)
    }

    /// Creates an empty jar whose directives default to `path`.
    pub fn with_document_path(path: impl Into<String>) -> Self {
        DocumentCookieJar {
            entries: Vec::new(),
            document_path: path.into(),
        }
    }

    /// Wraps the jar into a shareable [`CookieJarHandle`].
    pub fn into_handle(self) -> CookieJarHandle {
        Arc::new(RwLock::new(self))
    }

    /// Cookies that have not expired at `now`.
    pub fn live_cookies(&self, now: OffsetDateTime) -> impl Iterator<Item = &JarCookie> {
        self.entries.iter().filter(move |c| !c.is_expired(now))
    }

    /// Same as [`CookieJar::read`], evaluated at `now`.
    pub fn read_at(&self, now: OffsetDateTime) -> String {
        self.live_cookies(now)
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Same as [`CookieJar::write`], evaluated at `now`.
    pub fn write_at(&mut self, directive: &str, now: OffsetDateTime) {
        let Some(cookie) = self.parse_directive(directive) else {
            log::debug!("Ignoring cookie directive without a name: {directive:?}");
            return;
        };

        self.entries.retain(|c| !c.is_expired(now));

        if cookie.is_expired(now) {
            log::debug!("Expiring cookie {}", cookie.name);
            self.entries.retain(|c| !c.same_entry(&cookie));
            return;
        }

        // Replace existing cookie with same name, path and domain
        if let Some(existing) = self.entries.iter_mut().find(|c| c.same_entry(&cookie)) {
            *existing = cookie;
        } else {
            log::debug!("Storing cookie {}", cookie.name);
            self.entries.push(cookie);
        }
    }

    fn parse_directive(&self, directive: &str) -> Option<JarCookie> {
        let mut parts = directive.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = JarCookie {
            name: name.to_string(),
            value: value.trim().to_string(),
            path: self.document_path.clone(),
            domain: None,
            secure: false,
            expires: None,
        };

        for part in parts.map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((k, v)) => {
                    let v = v.trim();
                    match k.trim().to_ascii_lowercase().as_str() {
                        "expires" => cookie.expires = parse_expires(v),
                        "path" if v.starts_with('/') => cookie.path = v.to_string(),
                        "domain" => {
                            let domain = v.trim_start_matches('.').to_ascii_lowercase();
                            cookie.domain = (!domain.is_empty()).then_some(domain);
                        }
                        _ => {}
                    }
                }
                None => {
                    if part.eq_ignore_ascii_case("secure") {
                        cookie.secure = true;
                    }
                }
            }
        }

        Some(cookie)
    }
}

impl Default for DocumentCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar for DocumentCookieJar {
    fn read(&self) -> String {
        self.read_at(OffsetDateTime::now_utc())
    }

    fn write(&mut self, directive: &str) {
        self.write_at(directive, OffsetDateTime::now_utc());
    }
}

impl From<DocumentCookieJar> for CookieJarHandle {
    fn from(jar: DocumentCookieJar) -> Self {
        jar.into_handle()
    }
}
