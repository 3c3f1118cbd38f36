#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, CookieError>;
