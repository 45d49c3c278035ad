use std::time::Duration;

use tracing::warn;

use super::{ApiError, ApiResult};

pub trait LinkShortener: Send + Sync {
    fn shorten(&self, url: &str) -> ApiResult<String>;
}

/// is.gd's plain-text endpoint.
pub struct IsGd {
    client: reqwest::blocking::Client,
}

impl IsGd {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|err| {
                warn!(%err, "falling back to default HTTP client for is.gd");
                reqwest::blocking::Client::new()
            });
        Self { client }
    }
}

impl Default for IsGd {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkShortener for IsGd {
    fn shorten(&self, url: &str) -> ApiResult<String> {
        let response = self
            .client
            .get("https://is.gd/create.php")
            .query(&[("format", "simple"), ("url", url)])
            .send()
            .map_err(|err| ApiError::transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| ApiError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::new(status.as_u16(), body.trim()));
        }
        Ok(body.trim().to_string())
    }
}
