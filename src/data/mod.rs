//! Remote reference data: municipality names and state boundaries.
//!
//! Both sources are optional enrichments. Callers treat every error from this
//! module as a reason to degrade, not to abort.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::AppError;

pub mod municipios;
pub mod states;

pub use municipios::*;
pub use states::*;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking HTTP client shared by the reference-data fetchers.
pub fn http_client() -> Result<Client, AppError> {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("mortinfra/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))
}

/// GET `url` and return the body as text.
pub fn fetch_text(client: &Client, url: &str) -> Result<String, AppError> {
    let resp = client
        .get(url)
        .send()
        .map_err(|e| AppError::runtime(format!("Request to {url} failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::runtime(format!(
            "Request to {url} failed with status {}.",
            resp.status()
        )));
    }

    resp.text()
        .map_err(|e| AppError::runtime(format!("Failed to read response from {url}: {e}")))
}
