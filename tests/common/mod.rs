//! Scripted in-memory collaborators shared by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use cine_harvest_lib::domain::{
    CatalogItem, CatalogPage, CatalogQuery, CatalogSource, FetchError, ItemId, KeywordSource,
};
use cine_harvest_lib::infrastructure::AppConfig;

type PageScript = dyn Fn(&CatalogQuery, u32, u32) -> Result<CatalogPage, FetchError> + Send + Sync;

/// Catalog whose responses come from a closure of
/// `(query, page, attempt)`, where `attempt` counts calls for that
/// partition and page starting at 1.
pub struct ScriptedCatalog {
    script: Box<PageScript>,
    attempts: Mutex<HashMap<(String, u32), u32>>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedCatalog {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&CatalogQuery, u32, u32) -> Result<CatalogPage, FetchError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            attempts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every page of every partition holds `per_page` fresh items
    pub fn uniform(per_page: usize, total_pages: u32) -> Self {
        Self::new(move |query, page, _| {
            let items = (0..per_page)
                .map(|i| {
                    let id = i64::from(page) * 1000 + i as i64;
                    let mut item = movie(id, 10.0, "2001-01-01");
                    item.title = format!("{} #{}", query.partition.label, id);
                    item
                })
                .collect();
            Ok(CatalogPage { items, total_pages })
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogSource for ScriptedCatalog {
    async fn fetch_page(&self, query: &CatalogQuery, page: u32) -> Result<CatalogPage, FetchError> {
        let label = query.partition.label.clone();
        self.calls.lock().unwrap().push((label.clone(), page));
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let counter = attempts.entry((label, page)).or_insert(0);
            *counter += 1;
            *counter
        };
        (self.script)(query, page, attempt)
    }
}

/// Keyword lookups from a fixed table; unknown ids have no keywords
#[derive(Default)]
pub struct KeywordTable {
    table: HashMap<ItemId, Vec<String>>,
    calls: Mutex<usize>,
}

impl KeywordTable {
    pub fn with(mut self, id: i64, keywords: &[&str]) -> Self {
        self.table.insert(
            ItemId::Number(id),
            keywords.iter().map(|k| (*k).to_string()).collect(),
        );
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl KeywordSource for KeywordTable {
    async fn fetch_keywords(&self, id: &ItemId) -> Result<Vec<String>, FetchError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.table.get(id).cloned().unwrap_or_default())
    }
}

/// An item that passes the default filter for genre 27
pub fn movie(id: i64, popularity: f64, release_date: &str) -> CatalogItem {
    let mut item = CatalogItem::new(id, format!("Movie {id}"));
    item.release_date = Some(release_date.to_string());
    item.vote_average = Some(6.5);
    item.vote_count = Some(120);
    item.popularity = Some(popularity);
    item.genre_ids = vec![27];
    item
}

pub fn page(items: Vec<CatalogItem>, total_pages: u32) -> CatalogPage {
    CatalogPage { items, total_pages }
}

/// Default config with all pauses removed and output under `data_dir`
pub fn fast_config(data_dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.harvest.request_delay_ms = 0;
    config.harvest.retry_delay_ms = 0;
    config.subgenres.keyword_delay_ms = 0;
    config.output.data_dir = data_dir.to_path_buf();
    config
}
