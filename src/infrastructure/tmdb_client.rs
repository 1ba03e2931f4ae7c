//! Movie catalog client
//!
//! Implements the two collaborator traits against the discovery and keyword
//! endpoints of the remote catalog.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{CatalogPage, CatalogQuery, CatalogSource, FetchError, ItemId, KeywordSource};
use crate::infrastructure::config::{HarvestConfig, tmdb};
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig};

pub struct TmdbClient {
    http: HttpClient,
    config: HarvestConfig,
}

impl TmdbClient {
    pub fn new(config: HarvestConfig) -> Result<Self, FetchError> {
        if config.api_key.trim().is_empty() {
            tracing::warn!("⚠️ No API key configured; catalog requests will be rejected");
        }
        let http = HttpClient::new(HttpClientConfig::from_harvest_config(&config))?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Query parameters for one discovery page.
    pub fn discover_params(&self, query: &CatalogQuery, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            (tmdb::params::API_KEY, self.config.api_key.clone()),
            (tmdb::params::WITH_GENRES, query.genre_id.to_string()),
            (tmdb::params::PAGE, page.to_string()),
            (tmdb::params::SORT_BY, self.config.sort_by.clone()),
            (tmdb::params::LANGUAGE, self.config.language.clone()),
        ];
        if let Some(start) = query.partition.start_year {
            params.push((tmdb::params::RELEASE_DATE_GTE, format!("{start}-01-01")));
        }
        if let Some(end) = query.partition.end_year {
            params.push((tmdb::params::RELEASE_DATE_LTE, format!("{end}-12-31")));
        }
        params
    }
}

#[async_trait]
impl CatalogSource for TmdbClient {
    async fn fetch_page(&self, query: &CatalogQuery, page: u32) -> Result<CatalogPage, FetchError> {
        let url = self.endpoint(tmdb::DISCOVER_PATH);
        let params = self.discover_params(query, page);
        let body = self.http.get_json(&url, &params).await?;
        Ok(CatalogPage::from_value(&body))
    }
}

#[async_trait]
impl KeywordSource for TmdbClient {
    async fn fetch_keywords(&self, id: &ItemId) -> Result<Vec<String>, FetchError> {
        let url = self.endpoint(&tmdb::keywords_path(&id.to_string()));
        let params = [(tmdb::params::API_KEY, self.config.api_key.clone())];
        let body = self.http.get_json(&url, &params).await?;
        Ok(parse_keywords(&body))
    }
}

/// `{ keywords: [{ name }, ...] }` → lower-cased names; a missing field is
/// an empty list.
pub fn parse_keywords(body: &Value) -> Vec<String> {
    body.get("keywords")
        .and_then(Value::as_array)
        .map(|keywords| {
            keywords
                .iter()
                .filter_map(|k| k.get("name").and_then(Value::as_str))
                .map(str::to_lowercase)
                .collect()
        })
        .unwrap_or_default()
}
