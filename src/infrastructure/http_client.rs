//! HTTP client for catalog requests
//!
//! Thin wrapper over `reqwest` that applies the timeout and user agent from
//! configuration and reports every failure as a typed `FetchError`. Retry
//! and pacing live one layer up.

use std::time::Duration;

use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde_json::Value;

use crate::domain::FetchError;
use crate::infrastructure::config::HarvestConfig;

/// HTTP client configuration
#[derive(Debug, Clone, serde::Serialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let harvest = HarvestConfig::default();
        Self::from_harvest_config(&harvest)
    }
}

impl HttpClientConfig {
    pub fn from_harvest_config(config: &HarvestConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout_seconds: config.request_timeout_seconds,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(|e| FetchError::InvalidRequest {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    /// GET `url` with query parameters and decode the JSON body.
    /// Any non-2xx status is a failure.
    pub async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        tracing::debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify_transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(status.as_u16(), url));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| classify_body_error(url, status, &e))?;

        tracing::debug!("Successfully fetched: {} ({})", url, status);
        Ok(body)
    }

    /// Get the configuration
    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

fn classify_transport_error(url: &str, error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_builder() {
        FetchError::InvalidRequest {
            message: error.to_string(),
        }
    } else {
        FetchError::connection(url, error.to_string())
    }
}

fn classify_body_error(url: &str, status: StatusCode, error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::decode(url, format!("{error} (status {status})"))
    }
}
