//! Cookie core types.
//!
//! This module defines the **type-erased jar handle** shared by the
//! [`CookieStore`](crate::cookies::CookieStore) and whoever owns the document,
//! and the [`JarCookie`] record a [`DocumentCookieJar`](crate::cookies::DocumentCookieJar)
//! keeps per cookie.
//!
//! # Concurrency model
//! - [`CookieJarHandle`] is `Arc<RwLock<dyn CookieJar + Send + Sync>>`.
//!   - Reads of the jar string take a **read lock**, directive writes take a
//!     **write lock**. Every lock is held for a single call only.
//!
//! ```ignore
//! let jar: CookieJarHandle = DocumentCookieJar::new().into_handle();
//! let raw = jar.read().unwrap().read();
//! jar.write().unwrap().write("theme=dark;path=/");
//! ```

use crate::cookies::CookieJar;
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;

/// A handle to a cookie jar trait.
///
/// This is a reference-counted, read/write-locked pointer to a type-erased
/// [`CookieJar`].
pub type CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>;

/// A cookie as held by an in-memory jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JarCookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Value exactly as written in the directive (still percent-encoded).
    pub value: String,

    /// Path scoping, always set (the jar fills in its document path).
    pub path: String,

    /// Domain scoping (host-only if `None`).
    pub domain: Option<String>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// Expiration instant. Session cookies have `None`.
    pub expires: Option<OffsetDateTime>,
}

impl JarCookie {
    /// Whether this cookie has expired at `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    /// Two cookies are the same jar entry when name, path and domain match.
    pub fn same_entry(&self, other: &JarCookie) -> bool {
        self.name == other.name && self.path == other.path && self.domain == other.domain
    }
}
