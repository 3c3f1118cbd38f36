//! Cookie defaults.
//!
//! `CookieDefaults` holds the values a [`CookieStore`](crate::cookies::CookieStore)
//! falls back to for every field a caller leaves out. It provides the built-in
//! values via [`Default`], a fluent [`CookieDefaults::builder()`] and a loose
//! JSON merge for configuration objects.
//!
//! # Examples
//!
//! ```rust
//! use cookie_manager::config::CookieDefaults;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let defaults = CookieDefaults::builder()
//!     .path("/app")
//!     .lifetime("14d")
//!     .secure(true)
//!     .build()?;
//! assert_eq!(defaults.path, "/app");
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `name`: cookie name (default: empty).
//! - `value`: cookie value, used verbatim (default: empty).
//! - `lifetime`: lifetime expression (default: `"0"`, a session cookie).
//! - `path`: `path=` attribute, omitted when empty (default: `/`).
//! - `domain`: `domain=` attribute, omitted when empty (default: empty).
//! - `secure`: emit the `secure` flag (default: `false`).
//!
//! # Errors
//!
//! The default lifetime must resolve on its own. `"text"`, `"3x"` or an unset
//! lifetime are rejected with [`CookieError::InvalidArgument`].

use crate::cookies::{lifetime, CookieParams, Lifetime};
use crate::errors::{CookieError, Result};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_LIFETIME: &str = "0";
pub const DEFAULT_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieDefaults {
    pub name: String,
    pub value: String,
    pub lifetime: Lifetime,
    pub path: String,
    pub domain: String,
    pub secure: bool,
}

impl Default for CookieDefaults {
    fn default() -> Self {
        Self {
            name: String::new(),
            value: String::new(),
            lifetime: Lifetime::from(DEFAULT_LIFETIME),
            path: DEFAULT_PATH.to_string(),
            domain: String::new(),
            secure: false,
        }
    }
}

impl CookieDefaults {
    pub fn builder() -> CookieDefaultsBuilder {
        CookieDefaultsBuilder::default()
    }

    /// Built-in defaults overridden by a configuration object.
    ///
    /// `None` yields the built-in defaults. Only the recognised keys are
    /// applied, everything else is ignored.
    pub fn from_config(config: Option<&Value>) -> Result<Self> {
        let mut builder = CookieDefaults::builder();
        if let Some(config) = config {
            builder = builder.merge(&CookieParams::from_value(config));
        }
        builder.build()
    }

    /// The default lifetime in milliseconds.
    pub fn lifetime_millis(&self) -> Result<u64> {
        lifetime::resolve(&self.lifetime).ok_or_else(|| {
            CookieError::InvalidArgument(format!(
                "default cookie lifetime {} does not resolve to a duration",
                self.lifetime
            ))
        })
    }
}

/// Builder for [`CookieDefaults`], mirroring `CookieParams`.
#[derive(Debug, Clone, Default)]
pub struct CookieDefaultsBuilder {
    inner: CookieDefaults,
}

impl CookieDefaultsBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut CookieDefaults)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn name<S: Into<String>>(self, name: S) -> Self { self.map(|c| c.name = name.into()) }
    pub fn value<S: Into<String>>(self, value: S) -> Self { self.map(|c| c.value = value.into()) }
    pub fn lifetime<L: Into<Lifetime>>(self, lifetime: L) -> Self { self.map(|c| c.lifetime = lifetime.into()) }
    pub fn path<S: Into<String>>(self, path: S) -> Self { self.map(|c| c.path = path.into()) }
    pub fn domain<S: Into<String>>(self, domain: S) -> Self { self.map(|c| c.domain = domain.into()) }
    pub fn secure(self, secure: bool) -> Self { self.map(|c| c.secure = secure) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut CookieDefaults)) -> Self { self.map(f) }

    /// Overrides every field that is set in `params`.
    pub fn merge(self, params: &CookieParams) -> Self {
        self.map(|c| {
            if let Some(name) = &params.name {
                c.name = name.clone();
            }
            if let Some(value) = &params.value {
                c.value = value.clone();
            }
            if let Some(lifetime) = &params.lifetime {
                c.lifetime = lifetime.clone();
            }
            if let Some(path) = &params.path {
                c.path = path.clone();
            }
            if let Some(domain) = &params.domain {
                c.domain = domain.clone();
            }
            if let Some(secure) = params.secure {
                c.secure = secure;
            }
        })
    }

    /// Validate and build the final defaults.
    pub fn build(self) -> Result<CookieDefaults> {
        self.inner.lifetime_millis()?;
        Ok(self.inner)
    }
}
