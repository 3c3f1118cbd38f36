//! The cookie store.
//!
//! A [`CookieStore`] reads, writes and expires cookies in a document's
//! [`CookieJar`](crate::cookies::CookieJar), filling in every field a caller
//! leaves out from its [`CookieDefaults`].
//!
//! ## Example
//! ```rust
//! use cookie_manager::cookies::{CookieParams, CookieStore, DocumentCookieJar};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = CookieStore::new(DocumentCookieJar::new().into_handle());
//! store.add(&CookieParams::named("theme").value("dark & light").lifetime("30d"))?;
//! assert_eq!(store.get_cookie("theme").as_deref(), Some("dark & light"));
//!
//! store.remove("theme", None)?;
//! assert_eq!(store.get_cookie("theme"), None);
//! # Ok(()) }
//! ```
//!
//! ## Limitations
//! - [`CookieStore::remove`] never sends a `domain=` segment, so a cookie that
//!   was stored for a non-default domain cannot be expired through it.
//! - Nothing is cached: every lookup re-reads the jar.

use std::collections::HashMap;
use std::sync::PoisonError;

use serde_json::Value;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

use crate::config::CookieDefaults;
use crate::cookies::encoding::{decode_value, encode_value};
use crate::cookies::expires::format_expires;
use crate::cookies::lifetime;
use crate::cookies::{CookieJarHandle, CookieParams, Lifetime};
use crate::errors::{CookieError, Result};

pub struct CookieStore {
    /// Values used for every field a caller leaves out.
    defaults: CookieDefaults,
    /// `defaults.lifetime`, resolved once at construction.
    default_lifetime: u64,
    /// The document's cookie storage.
    jar: CookieJarHandle,
}

impl CookieStore {
    /// Creates a store with the built-in defaults.
    pub fn new(jar: CookieJarHandle) -> Self {
        let defaults = CookieDefaults::default();
        let default_lifetime = defaults.lifetime_millis().unwrap_or(0);
        Self {
            defaults,
            default_lifetime,
            jar,
        }
    }

    /// Creates a store with the given defaults.
    ///
    /// # Errors
    /// [`CookieError::InvalidArgument`] if the default lifetime does not resolve.
    pub fn with_defaults(jar: CookieJarHandle, defaults: CookieDefaults) -> Result<Self> {
        let default_lifetime = defaults.lifetime_millis()?;
        Ok(Self {
            defaults,
            default_lifetime,
            jar,
        })
    }

    /// Creates a store from an optional, loosely-typed configuration object.
    ///
    /// See [`CookieDefaults::from_config`].
    pub fn from_config(jar: CookieJarHandle, config: Option<&Value>) -> Result<Self> {
        Self::with_defaults(jar, CookieDefaults::from_config(config)?)
    }

    pub fn defaults(&self) -> &CookieDefaults {
        &self.defaults
    }

    pub fn jar(&self) -> &CookieJarHandle {
        &self.jar
    }

    /// Returns every cookie in the jar, values percent-decoded.
    ///
    /// When a name occurs more than once the last occurrence wins.
    pub fn get_cookies(&self) -> HashMap<String, String> {
        let raw = self.jar.read().unwrap_or_else(PoisonError::into_inner).read();

        raw.split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
                (name.trim().to_string(), decode_value(value).into_owned())
            })
            .collect()
    }

    /// Returns the decoded value of the cookie called `name`, if present.
    pub fn get_cookie(&self, name: &str) -> Option<String> {
        self.get_cookies().remove(name)
    }

    /// Stores a cookie.
    ///
    /// # Errors
    /// [`CookieError::InvalidArgument`] if `params.name` is missing or empty.
    /// The jar is left untouched in that case.
    pub fn add(&self, params: &CookieParams) -> Result<()> {
        if params.name.as_deref().map_or(true, str::is_empty) {
            return Err(CookieError::InvalidArgument("Cookie name is required".into()));
        }

        let directive = self.build_cookie_string(params);
        log::debug!("New cookie: {directive}");
        self.write(&directive);

        Ok(())
    }

    /// Expires the cookie called `name`, optionally scoped to `path`.
    ///
    /// # Errors
    /// [`CookieError::InvalidArgument`] if `name` is empty.
    pub fn remove(&self, name: &str, path: Option<&str>) -> Result<()> {
        self.remove_at(name, path, OffsetDateTime::now_utc())
    }

    /// Same as [`CookieStore::remove`], expiring one second before `now`.
    ///
    /// The directive carries `name=`, a past `expires=` and `path=` when one is
    /// given. No `domain=` segment is ever sent.
    pub fn remove_at(&self, name: &str, path: Option<&str>, now: OffsetDateTime) -> Result<()> {
        if name.is_empty() {
            return Err(CookieError::InvalidArgument("Cookie name is required".into()));
        }

        let expires = now - Duration::seconds(1);
        let mut segments = vec![format!("{name}="), format!("expires={}", format_expires(expires))];
        if let Some(path) = path {
            segments.push(format!("path={path}"));
        }

        let directive = segments.join(";");
        log::debug!("Removing cookie: {directive}");
        self.write(&directive);

        Ok(())
    }

    /// Serializes `params` into a jar directive, expiring relative to now.
    pub fn build_cookie_string(&self, params: &CookieParams) -> String {
        self.build_cookie_string_at(params, OffsetDateTime::now_utc())
    }

    /// Serializes `params` into a jar directive, expiring relative to `now`.
    ///
    /// Segments, in order, each only when its condition holds:
    /// `name=value`, `expires=` (lifetime > 0), `path=` (non-empty),
    /// `domain=` (non-empty), `secure` (secure is `true`).
    pub fn build_cookie_string_at(&self, params: &CookieParams, now: OffsetDateTime) -> String {
        let d = &self.defaults;

        let name = params.name.as_deref().unwrap_or(&d.name);
        let value = params.value.as_deref().map_or_else(|| d.value.clone(), encode_value);
        let lifetime = params
            .lifetime
            .as_ref()
            .map_or(self.default_lifetime, |l| self.parse_lifetime(l));
        let path = params.path.as_deref().unwrap_or(&d.path);
        let domain = params.domain.as_deref().unwrap_or(&d.domain);
        let secure = params.secure.unwrap_or(d.secure);

        let mut segments = vec![format!("{name}={value}")];

        if lifetime > 0 {
            segments.push(format!("expires={}", format_expires(expiry(now, lifetime))));
        }

        if !path.is_empty() {
            segments.push(format!("path={path}"));
        }

        if !domain.is_empty() {
            segments.push(format!("domain={domain}"));
        }

        if secure {
            segments.push("secure".to_string());
        }

        segments.join(";")
    }

    /// Resolves `lifetime` to milliseconds, falling back to the default lifetime.
    pub fn parse_lifetime(&self, lifetime: &Lifetime) -> u64 {
        lifetime::resolve(lifetime).unwrap_or(self.default_lifetime)
    }

    fn write(&self, directive: &str) {
        self.jar
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .write(directive);
    }
}

/// `now + lifetime` milliseconds, capped at the latest representable instant.
fn expiry(now: OffsetDateTime, lifetime: u64) -> OffsetDateTime {
    i64::try_from(lifetime)
        .ok()
        .and_then(|ms| now.checked_add(Duration::milliseconds(ms)))
        .unwrap_or_else(|| PrimitiveDateTime::MAX.assume_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::{spot_flag, CookieJar, DocumentCookieJar};
    use serde_json::json;
    use std::sync::{Arc, RwLock};
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-06-01 12:00:00 UTC);
    const DAY: u64 = 24 * 60 * 60 * 1000;

    fn store() -> CookieStore {
        CookieStore::new(DocumentCookieJar::new().into_handle())
    }

    /// Jar that serves a fixed raw string and records every directive.
    struct RawJar {
        raw: String,
        written: Vec<String>,
    }

    impl CookieJar for RawJar {
        fn read(&self) -> String {
            self.raw.clone()
        }

        fn write(&mut self, directive: &str) {
            self.written.push(directive.to_string());
        }
    }

    fn raw_store(raw: &str) -> (CookieStore, Arc<RwLock<RawJar>>) {
        let jar = Arc::new(RwLock::new(RawJar {
            raw: raw.to_string(),
            written: Vec::new(),
        }));
        let handle: CookieJarHandle = jar.clone();
        (CookieStore::new(handle), jar)
    }

    fn store_with(config: Value) -> CookieStore {
        CookieStore::from_config(DocumentCookieJar::new().into_handle(), Some(&config)).unwrap()
    }

    #[test]
    fn construction_merges_known_keys() {
        let plain = store();
        let configured = store_with(json!({ "path": "/test-path", "secure": true, "lifetime": "14d", "bogus": 1 }));

        assert_eq!(plain.defaults().lifetime, Lifetime::from("0"));
        assert_ne!(plain.defaults().lifetime, configured.defaults().lifetime);
        assert!(configured.defaults().secure);
        assert_eq!(configured.defaults().path, "/test-path");
    }

    #[test]
    fn construction_ignores_non_object_config() {
        let jar = DocumentCookieJar::new().into_handle();
        let s = CookieStore::from_config(jar, Some(&json!("path=/x"))).unwrap();
        assert_eq!(s.defaults(), &CookieDefaults::default());
        assert_eq!(s.build_cookie_string_at(&CookieParams::named("k"), NOW), "k=;path=/");
    }

    #[test]
    fn construction_rejects_unresolvable_default_lifetime() {
        let jar = DocumentCookieJar::new().into_handle();
        assert!(CookieStore::from_config(jar, Some(&json!({ "lifetime": "forever" }))).is_err());
    }

    #[test]
    fn parse_lifetime_uses_units_numbers_and_default() {
        let s = store();
        let default = s.parse_lifetime(&s.defaults().lifetime);

        assert_eq!(s.parse_lifetime(&Lifetime::from("30m")), 30 * 60 * 1000);
        assert_eq!(s.parse_lifetime(&Lifetime::Unset), default);
        assert_eq!(s.parse_lifetime(&Lifetime::Millis(15 * 60 * 1000)), 15 * 60 * 1000);
        assert_eq!(s.parse_lifetime(&Lifetime::from("text")), default);
        assert_eq!(s.parse_lifetime(&Lifetime::from("10000")), 10000);
    }

    #[test]
    fn parse_lifetime_falls_back_to_configured_default() {
        let s = store_with(json!({ "lifetime": "2d" }));
        assert_eq!(s.parse_lifetime(&Lifetime::Unset), 2 * DAY);
        assert_eq!(s.parse_lifetime(&Lifetime::from("garbage")), 2 * DAY);
        assert_eq!(s.parse_lifetime(&Lifetime::from("3D")), 2 * DAY);
        assert_eq!(s.parse_lifetime(&Lifetime::Other("{}".into())), 2 * DAY);
        assert_eq!(s.parse_lifetime(&Lifetime::from("1h")), 60 * 60 * 1000);
        assert!(spot_flag("3d") && !spot_flag("3D"));
    }

    #[test]
    fn empty_jar_has_no_cookies() {
        let s = store();
        assert!(s.get_cookies().is_empty());
        assert_eq!(s.get_cookie("missing"), None);
    }

    #[test]
    fn get_cookies_parses_the_raw_jar_string() {
        let s = store();
        {
            let mut jar = s.jar().write().unwrap();
            jar.write("a=1");
            jar.write("b=x%20y");
            jar.write("c=k=v");
            jar.write("d=");
        }

        let cookies = s.get_cookies();
        assert_eq!(cookies.len(), 4);
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "x y");
        assert_eq!(cookies["c"], "k=v");
        assert_eq!(cookies["d"], "");
    }

    #[test]
    fn get_cookies_tolerates_untidy_jar_strings() {
        let (s, _) = raw_store(" a=1;; ; b=x%20y ;c;d=%E0%A4%A");

        let mut cookies: Vec<_> = s.get_cookies().into_iter().collect();
        cookies.sort();
        let expected = [("a", "1"), ("b", "x y"), ("c", ""), ("d", "%E0%A4%A")];
        assert_eq!(cookies.len(), expected.len());
        for ((name, value), (want_name, want_value)) in cookies.iter().zip(expected) {
            assert_eq!(name, want_name);
            assert_eq!(value, want_value);
        }
    }

    #[test]
    fn get_cookies_of_blank_jar_is_empty() {
        let (s, _) = raw_store("  ;  ");
        assert!(s.get_cookies().is_empty());
        assert_eq!(s.get_cookie(""), None);
    }

    #[test]
    fn remove_writes_an_expired_directive() {
        let (s, jar) = raw_store("");
        s.remove_at("k", None, NOW).unwrap();
        s.remove_at("k", Some("/abc"), NOW).unwrap();

        let guard = jar.read().unwrap();
        let written = &guard.written;
        assert_eq!(
            written,
            &[
                "k=;expires=Sun, 01 Jun 2025 11:59:59 GMT".to_string(),
                "k=;expires=Sun, 01 Jun 2025 11:59:59 GMT;path=/abc".to_string(),
            ]
        );
    }

    #[test]
    fn remove_never_sends_a_domain() {
        let (_, jar) = raw_store("");
        let handle: CookieJarHandle = jar.clone();
        let s = CookieStore::from_config(handle, Some(&json!({ "domain": "example.com" }))).unwrap();

        s.remove_at("k", Some("/"), NOW).unwrap();
        let guard = jar.read().unwrap();
        let written = &guard.written;
        assert_eq!(written.len(), 1);
        assert!(!written[0].contains("domain="));
    }

    #[test]
    fn rejected_calls_write_nothing() {
        let (s, jar) = raw_store("");
        assert!(s.remove_at("", Some("/"), NOW).is_err());
        assert!(s.add(&CookieParams::new().value("v")).is_err());
        assert!(jar.read().unwrap().written.is_empty());
    }

    #[test]
    fn duplicate_names_last_one_wins() {
        let s = store();
        s.add(&CookieParams::named("k").value("root")).unwrap();
        s.add(&CookieParams::named("k").value("nested").path("/abc")).unwrap();
        assert_eq!(s.get_cookie("k").as_deref(), Some("nested"));
    }

    #[test]
    fn add_requires_a_name() {
        let s = store();
        assert!(matches!(s.add(&CookieParams::new()), Err(CookieError::InvalidArgument(_))));
        assert!(matches!(s.add(&CookieParams::named("")), Err(CookieError::InvalidArgument(_))));
        assert_eq!(s.jar().read().unwrap().read(), "");
    }

    #[test]
    fn add_round_trips_special_characters() {
        let s = store();
        s.add(&CookieParams::named("two").value("value &^%(nm")).unwrap();
        s.add(&CookieParams::named("k").value("v & special")).unwrap();

        assert_eq!(s.get_cookie("two").as_deref(), Some("value &^%(nm"));
        assert_eq!(s.get_cookie("k").as_deref(), Some("v & special"));
        assert_eq!(s.get_cookie("nonexisting cookie"), None);
    }

    #[test]
    fn stored_falsy_values_are_distinct_from_absent() {
        let s = store();
        s.add(&CookieParams::named("empty").value("")).unwrap();
        s.add(&CookieParams::named("flag").value("false")).unwrap();

        assert_eq!(s.get_cookie("empty").as_deref(), Some(""));
        assert_eq!(s.get_cookie("flag").as_deref(), Some("false"));
        assert_eq!(s.get_cookie("absent"), None);
    }

    #[test]
    fn remove_expires_the_cookie() {
        let s = store();
        s.add(&CookieParams::named("test1").value("test1 value")).unwrap();
        s.add(&CookieParams::named("test2").value("test2 value").path("/abc")).unwrap();

        assert!(s.remove("", None).is_err());

        s.remove("test1", None).unwrap();
        assert_eq!(s.get_cookie("test1"), None);

        // a path-scoped cookie needs its path
        s.remove("test2", None).unwrap();
        assert_eq!(s.get_cookie("test2").as_deref(), Some("test2 value"));
        s.remove("test2", Some("/abc")).unwrap();
        assert_eq!(s.get_cookie("test2"), None);
    }

    #[test]
    fn remove_of_unknown_cookie_succeeds() {
        assert!(store().remove("never-set", Some("/")).is_ok());
    }

    #[test]
    fn build_always_returns_a_directive() {
        let s = store();
        assert_eq!(s.build_cookie_string_at(&CookieParams::new(), NOW), "=;path=/");
        assert_eq!(s.build_cookie_string_at(&CookieParams::new().value("aa"), NOW), "=aa;path=/");

        let from_defaults = CookieParams {
            name: Some(s.defaults().name.clone()),
            value: Some(s.defaults().value.clone()),
            lifetime: Some(s.defaults().lifetime.clone()),
            path: Some(s.defaults().path.clone()),
            domain: Some(s.defaults().domain.clone()),
            secure: Some(s.defaults().secure),
        };
        assert_eq!(s.build_cookie_string_at(&from_defaults, NOW), "=;path=/");
    }

    #[test]
    fn build_orders_segments() {
        let s = store();
        let params = CookieParams::named("k")
            .value("a b")
            .lifetime("1d")
            .path("/p")
            .domain("example.com")
            .secure(true);

        assert_eq!(
            s.build_cookie_string_at(&params, NOW),
            "k=a%20b;expires=Mon, 02 Jun 2025 12:00:00 GMT;path=/p;domain=example.com;secure"
        );
    }

    #[test]
    fn build_omits_empty_and_false_segments() {
        let s = store();
        let params = CookieParams::named("k").value("v").lifetime(0i64).path("").domain("").secure(false);
        assert_eq!(s.build_cookie_string_at(&params, NOW), "k=v");
    }

    #[test]
    fn build_falls_back_to_defaults() {
        let s = store_with(json!({
            "value": "raw value",
            "lifetime": "1h",
            "domain": "example.org",
            "secure": true,
        }));

        // default values are used verbatim, not encoded
        assert_eq!(
            s.build_cookie_string_at(&CookieParams::named("k"), NOW),
            "k=raw value;expires=Sun, 01 Jun 2025 13:00:00 GMT;path=/;domain=example.org;secure"
        );
        assert_eq!(
            s.build_cookie_string_at(&CookieParams::named("k").value("x").lifetime("nope").secure(false), NOW),
            "k=x;expires=Sun, 01 Jun 2025 13:00:00 GMT;path=/;domain=example.org"
        );
    }

    #[test]
    fn non_boolean_secure_is_not_secure() {
        let s = store_with(json!({ "secure": "true" }));
        assert!(!s.defaults().secure);
        assert!(!s.build_cookie_string_at(&CookieParams::named("k"), NOW).ends_with("secure"));
    }

    #[test]
    fn huge_lifetimes_are_capped() {
        let s = store();
        let directive = s.build_cookie_string_at(&CookieParams::named("k").lifetime("999999999999M"), NOW);
        assert_eq!(directive, "k=;expires=Fri, 31 Dec 9999 23:59:59 GMT;path=/");
    }
}
