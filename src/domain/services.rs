//! Remote collaborator interfaces
//!
//! The pipeline only sees these two capabilities; the concrete HTTP client
//! lives in the infrastructure layer and tests plug in scripted fakes.

use async_trait::async_trait;

use crate::domain::catalog::{CatalogPage, CatalogQuery, ItemId};
use crate::domain::errors::FetchError;

/// Paginated catalog query ("fetch page")
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page (1-based) of the given query
    async fn fetch_page(&self, query: &CatalogQuery, page: u32) -> Result<CatalogPage, FetchError>;
}

/// Per-item keyword lookup
#[async_trait]
pub trait KeywordSource: Send + Sync {
    /// Keyword names attached to an item, lower-cased
    async fn fetch_keywords(&self, id: &ItemId) -> Result<Vec<String>, FetchError>;
}
