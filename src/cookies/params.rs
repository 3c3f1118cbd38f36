//! Per-call cookie parameters.
//!
//! [`CookieParams`] is a partial [`CookieDefaults`](crate::config::CookieDefaults):
//! every field left at `None` is taken from the store's defaults. The same type
//! doubles as the construction-time configuration object.

use crate::cookies::Lifetime;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieParams {
    pub name: Option<String>,
    pub value: Option<String>,
    pub lifetime: Option<Lifetime>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: Option<bool>,
}

impl CookieParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters for the cookie called `name`.
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self::new().name(name)
    }

    #[inline]
    fn map(mut self, f: impl FnOnce(&mut CookieParams)) -> Self {
        f(&mut self);
        self
    }

    pub fn name<S: Into<String>>(self, name: S) -> Self { self.map(|p| p.name = Some(name.into())) }
    pub fn value<S: Into<String>>(self, value: S) -> Self { self.map(|p| p.value = Some(value.into())) }
    pub fn lifetime<L: Into<Lifetime>>(self, lifetime: L) -> Self { self.map(|p| p.lifetime = Some(lifetime.into())) }
    pub fn path<S: Into<String>>(self, path: S) -> Self { self.map(|p| p.path = Some(path.into())) }
    pub fn domain<S: Into<String>>(self, domain: S) -> Self { self.map(|p| p.domain = Some(domain.into())) }
    pub fn secure(self, secure: bool) -> Self { self.map(|p| p.secure = Some(secure)) }

    /// Reads parameters from a loosely-typed JSON object.
    ///
    /// Unknown keys are ignored. `null` leaves a field unset. Strings, numbers
    /// and booleans are accepted for the text fields; `secure` is only `true`
    /// for a JSON `true`, any other shape counts as `false`. A value that is not
    /// an object carries no recognised keys and yields empty parameters.
    pub fn from_value(value: &Value) -> Self {
        match value.as_object() {
            Some(object) => Self::from_object(object),
            None => {
                log::warn!("Ignoring cookie options {value}: expected an object");
                Self::new()
            }
        }
    }

    fn from_object(object: &Map<String, Value>) -> Self {
        let mut params = CookieParams::new();

        for (key, value) in object.iter().filter(|(_, v)| !v.is_null()) {
            match key.as_str() {
                "name" => params.name = text_field(key, value),
                "value" => params.value = text_field(key, value),
                "path" => params.path = text_field(key, value),
                "domain" => params.domain = text_field(key, value),
                "lifetime" => params.lifetime = Some(Lifetime::from(value)),
                "secure" => {
                    if !value.is_boolean() {
                        log::warn!("Cookie option secure={value} is not a boolean, treating it as false");
                    }
                    params.secure = Some(value.as_bool().unwrap_or(false));
                }
                _ => log::debug!("Ignoring unknown cookie option {key:?}"),
            }
        }

        params
    }
}

fn text_field(key: &str, value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => {
            log::warn!("Ignoring cookie option {key}={other}: expected a string");
            None
        }
    }
}
