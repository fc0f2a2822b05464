//! Outbound HTTP integrations: translation and location lookup.
//!
//! Each call is a single attempt with the configured timeout. Callers degrade to
//! local fallbacks instead of retrying.

pub mod geolocation;
pub mod handlers;
pub mod translation;

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

pub use geolocation::{detect_location, Coordinates, HttpLocationProvider, LocationProvider};
pub use translation::{translate, LibreTranslateClient, TranslationOutcome, Translator};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Unexpected upstream response: {0}")]
    Parse(String),

    #[error("Location could not be determined")]
    LocationUnavailable,
}

/// Shared client for every outbound call.
pub fn http_client(timeout: Duration) -> Result<Client, ServiceError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("cv-builder/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Maps a non-success status into `ServiceError::Upstream`, keeping the body as the message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ServiceError::Upstream {
        status: status.as_u16(),
        message,
    })
}
