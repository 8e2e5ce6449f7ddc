//! Errors surfaced by the parts of the crate that report failures to the
//! caller.
//!
//! Collection operations never return errors: failures end up in the logs
//! and in the [`Notifier`]. Only the local storage layer and client
//! construction propagate a [`TrackerError`].
//!
//!  [`Notifier`]: crate::toast::Notifier
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid base_url: {0}")]
    InvalidUrl(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(f64),
}
