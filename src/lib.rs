pub mod config;
pub mod cookies;
pub mod errors;

pub use config::CookieDefaults;
pub use cookies::{CookieJar, CookieJarHandle, CookieParams, CookieStore, DocumentCookieJar, Lifetime};
pub use errors::{CookieError, Result};
