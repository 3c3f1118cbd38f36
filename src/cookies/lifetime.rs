//! Cookie lifetimes.
//!
//! A lifetime is either a raw millisecond count (`15000`, `"15000"`) or an
//! integer followed by a single unit flag:
//!
//! | flag | unit    | milliseconds      |
//! |------|---------|-------------------|
//! | `s`  | seconds | 1 000             |
//! | `m`  | minutes | 60 000            |
//! | `h`  | hours   | 3 600 000         |
//! | `d`  | days    | 86 400 000        |
//! | `M`  | months  | 2 592 000 000     |
//!
//! Flags are case-sensitive and a month is always 30 days.
//!
//! [`resolve`] classifies a [`Lifetime`] with an ordered list of rules. It
//! returns `None` whenever the input must fall back to the configured default
//! lifetime; the caller owns that default so resolution never recurses.
//!
//! ## Known inconsistency
//! [`spot_flag`] looks for a flag character *anywhere* in the string, while the
//! unit is read from the *trailing* character only. Inputs such as `"d30"` or
//! `"3dx"` therefore spot a flag, fail the unit lookup and resolve to the
//! default lifetime.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Unit suffix of a lifetime expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifetimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Months,
}

impl LifetimeUnit {
    /// Every recognised flag character, in unit order.
    pub const FLAGS: [char; 5] = ['s', 'm', 'h', 'd', 'M'];

    pub fn from_flag(flag: char) -> Option<Self> {
        match flag {
            's' => Some(LifetimeUnit::Seconds),
            'm' => Some(LifetimeUnit::Minutes),
            'h' => Some(LifetimeUnit::Hours),
            'd' => Some(LifetimeUnit::Days),
            'M' => Some(LifetimeUnit::Months),
            _ => None,
        }
    }

    pub fn flag(self) -> char {
        match self {
            LifetimeUnit::Seconds => 's',
            LifetimeUnit::Minutes => 'm',
            LifetimeUnit::Hours => 'h',
            LifetimeUnit::Days => 'd',
            LifetimeUnit::Months => 'M',
        }
    }

    /// Size of one unit in milliseconds.
    pub fn millis(self) -> u64 {
        const SECOND: u64 = 1000;
        match self {
            LifetimeUnit::Seconds => SECOND,
            LifetimeUnit::Minutes => 60 * SECOND,
            LifetimeUnit::Hours => 60 * 60 * SECOND,
            LifetimeUnit::Days => 24 * 60 * 60 * SECOND,
            LifetimeUnit::Months => 30 * 24 * 60 * 60 * SECOND,
        }
    }
}

/// A requested cookie lifetime, as handed in by a caller or a configuration object.
///
/// Configuration is loosely typed, so every JSON shape maps onto a variant:
/// `null` is [`Lifetime::Unset`], numbers become [`Lifetime::Millis`] (fractions
/// truncated), strings become [`Lifetime::Text`] and anything else is kept as
/// [`Lifetime::Other`] so it can be reported before falling back to the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "Value")]
pub enum Lifetime {
    Unset,
    Millis(i64),
    Text(String),
    Other(String),
}

impl Default for Lifetime {
    fn default() -> Self {
        Lifetime::Unset
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Unset => f.write_str("<unset>"),
            Lifetime::Millis(ms) => write!(f, "{ms}"),
            Lifetime::Text(s) | Lifetime::Other(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Lifetime {
    fn from(s: &str) -> Self {
        Lifetime::Text(s.to_string())
    }
}

impl From<String> for Lifetime {
    fn from(s: String) -> Self {
        Lifetime::Text(s)
    }
}

impl From<i64> for Lifetime {
    fn from(ms: i64) -> Self {
        Lifetime::Millis(ms)
    }
}

impl From<u64> for Lifetime {
    fn from(ms: u64) -> Self {
        Lifetime::Millis(i64::try_from(ms).unwrap_or(i64::MAX))
    }
}

impl From<Value> for Lifetime {
    fn from(value: Value) -> Self {
        Lifetime::from(&value)
    }
}

impl From<&Value> for Lifetime {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Lifetime::Unset,
            Value::String(s) => Lifetime::Text(s.clone()),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(ms), _) => Lifetime::Millis(ms),
                (None, Some(ms)) if ms.is_finite() => Lifetime::Millis(ms.trunc() as i64),
                _ => Lifetime::Other(n.to_string()),
            },
            other => Lifetime::Other(other.to_string()),
        }
    }
}

impl From<Lifetime> for Value {
    fn from(lifetime: Lifetime) -> Self {
        match lifetime {
            Lifetime::Unset => Value::Null,
            Lifetime::Millis(ms) => Value::from(ms),
            Lifetime::Text(s) | Lifetime::Other(s) => Value::String(s),
        }
    }
}

/// Returns `true` if any unit flag occurs anywhere in `lifetime`.
pub fn spot_flag(lifetime: &str) -> bool {
    lifetime.contains(&LifetimeUnit::FLAGS[..])
}

/// Resolves `lifetime` to milliseconds, or `None` when the default lifetime applies.
///
/// Negative counts clamp to zero, products saturate at `u64::MAX`.
pub fn resolve(lifetime: &Lifetime) -> Option<u64> {
    let text = match lifetime {
        Lifetime::Unset => return None,
        Lifetime::Millis(ms) => return Some(clamp(*ms)),
        Lifetime::Other(raw) => {
            log::warn!("Unexpected cookie lifetime {raw}, using the default lifetime");
            return None;
        }
        Lifetime::Text(text) => text,
    };

    if text.trim().is_empty() {
        return None;
    }

    // A numeric string without an integer prefix (`"Infinity"`) counts as zero.
    if is_numeric(text) && !spot_flag(text) {
        return Some(parse_int(text).map_or(0, clamp));
    }

    // Without a flag the trailing character can never name a unit, so the only
    // remaining outcome is the default.
    if !spot_flag(text) {
        return None;
    }

    let text = text.trim();
    let mut chars = text.chars();
    let flag = chars.next_back()?;
    let unit = LifetimeUnit::from_flag(flag)?;
    let magnitude = parse_int(chars.as_str())?;

    Some(clamp(magnitude).saturating_mul(unit.millis()))
}

fn clamp(ms: i64) -> u64 {
    u64::try_from(ms).unwrap_or(0)
}

/// Integer prefix of `s`: leading whitespace, an optional sign, then decimal digits.
fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: Vec<i64> = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| i64::from(b - b'0'))
        .collect();
    if digits.is_empty() {
        return None;
    }

    let value = digits
        .into_iter()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(d));
    Some(if negative { -value } else { value })
}

/// Whether the whole (trimmed) string reads as a number: a decimal such as
/// `"15"`, `"-2"`, `"1.5"` or `"1e3"`, an unsigned `0x`/`0o`/`0b` literal, or
/// `"Infinity"`.
fn is_numeric(s: &str) -> bool {
    let s = s.trim();

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    }

    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    if s == "Infinity" {
        return true;
    }

    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }
    if !all_digits(int_part) || !all_digits(frac_part) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && all_digits(exp)
        }
    }
}
