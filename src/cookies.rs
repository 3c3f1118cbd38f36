//! Cookies: [`CookieStore`], [`CookieJar`] and lifetimes.

mod cookie_jar;
mod cookies;
mod encoding;
mod expires;
pub mod lifetime;
mod params;
mod store;

pub use cookies::CookieJarHandle;
pub use cookies::JarCookie;

pub use cookie_jar::CookieJar;
pub use cookie_jar::DocumentCookieJar;

pub use expires::{format_expires, parse_expires};
pub use lifetime::{spot_flag, Lifetime, LifetimeUnit};
pub use params::CookieParams;
pub use store::CookieStore;
