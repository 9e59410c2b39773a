pub mod assemble;
pub mod catalog;
pub mod cloud;
pub mod config;
pub mod genres;
pub mod poster;
pub mod provider;
pub mod rating_poster;
pub mod store;
pub mod tmdb;

#[cfg(test)]
mod fakes;

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("not found")]
    NotFound,
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("invalid item {id}: {reason}")]
    InvalidItem { id: i64, reason: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Build a reqwest client whose every request is bounded by `timeout`.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, MetadataError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MetadataError::Client(e.to_string()))
}
