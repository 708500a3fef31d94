//! Symfony version metadata passthrough
//!
//! The main endpoint embeds the version support matrix published at
//! flex.symfony.com so the installer learns about maintained branches
//! in the same request. The payload is copied into `index.json` as-is.

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde_json::Value;

use crate::error::{Error, Result};

/// Source of the version support matrix.
pub const VERSIONS_URL: &str = "https://flex.symfony.com/versions.json";

/// Download `versions.json` and return it unmodified.
pub fn fetch_versions() -> Result<Value> {
    let client = Client::new();
    let response = client
        .get(VERSIONS_URL)
        .header(USER_AGENT, "flex-endpoint")
        .send()?;

    if !response.status().is_success() {
        return Err(Error::Versions(format!(
            "{} returned {}",
            VERSIONS_URL,
            response.status()
        )));
    }

    Ok(response.json()?)
}
