//! End-to-end dataset pipelines against scripted collaborators
mod common;

use std::sync::Arc;

use cine_harvest_lib::application::RunReport;
use cine_harvest_lib::domain::CatalogItem;
use cine_harvest_lib::infrastructure::config::{CategoryConfig, DecadeConfig};
use cine_harvest_lib::infrastructure::{AppConfig, CacheLoad, CacheStore, FileBlobStore};
use cine_harvest_lib::{Command, run_with};

use common::{KeywordTable, ScriptedCatalog, fast_config, movie, page};

const DECADE_HEADER: &str = "id,title,original_title,original_language,release_date,year,vote_average,vote_count,popularity,genre_ids,decade";

fn two_decades(config: &mut AppConfig) {
    config.decades = vec![
        DecadeConfig { label: "1990-1999".into(), start_year: 1990, end_year: 1999 },
        DecadeConfig { label: "2000-2009".into(), start_year: 2000, end_year: 2009 },
    ];
}

fn slasher_and_gore(config: &mut AppConfig) {
    config.subgenres.categories = vec![
        CategoryConfig { name: "slasher".into(), keywords: vec!["slasher".into()] },
        CategoryConfig { name: "gore".into(), keywords: vec!["gore".into()] },
    ];
}

async fn run(
    config: &AppConfig,
    command: Command,
    catalog: Arc<ScriptedCatalog>,
    keywords: Arc<KeywordTable>,
) -> Vec<RunReport> {
    run_with(config, command, Some((catalog, keywords))).await.unwrap()
}

fn file_cache(config: &AppConfig) -> CacheStore<FileBlobStore> {
    CacheStore::with_key(
        FileBlobStore::new(&config.output.data_dir),
        config.output.cache_file.clone(),
    )
}

#[tokio::test]
async fn decade_dataset_is_filtered_labelled_and_deduplicated() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    two_decades(&mut config);

    let catalog = Arc::new(ScriptedCatalog::new(|query, _, _| {
        let items = if query.partition.label == "1990-1999" {
            let mut unpopular = movie(2, 1.0, "1996-05-05");
            unpopular.title = "Rejected".into();
            vec![movie(1, 20.0, "1996-12-20"), unpopular, movie(42, 9.0, "1999-12-31")]
        } else {
            vec![movie(42, 9.0, "1999-12-31"), movie(3, 15.0, "2004-10-29")]
        };
        Ok(page(items, 1))
    }));

    let reports = run(&config, Command::Decades, catalog, Arc::new(KeywordTable::default())).await;

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.partitions, 2);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.rows_written, 3);
    assert!(report.limit_reached.is_empty());

    let csv = std::fs::read_to_string(config.decade_dataset_path()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], DECADE_HEADER);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "1,Movie 1,,,1996-12-20,1996,6.5,120,20.0,27,1990-1999");
    assert!(lines[2].starts_with("42,Movie 42,"));
    assert!(lines[2].ends_with(",1990-1999"));
    assert!(lines[3].ends_with(",2000-2009"));
    assert!(!csv.contains("Rejected"));
}

#[tokio::test]
async fn capped_partitions_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    two_decades(&mut config);
    config.harvest.max_pages = 2;

    let catalog = Arc::new(ScriptedCatalog::uniform(1, 10));
    let reports = run(&config, Command::Decades, Arc::clone(&catalog), Arc::new(KeywordTable::default())).await;

    assert_eq!(catalog.call_count(), 4);
    assert_eq!(reports[0].limit_reached, vec!["1990-1999".to_string(), "2000-2009".to_string()]);
}

fn subgenre_catalog() -> ScriptedCatalog {
    ScriptedCatalog::new(|_, _, _| {
        let mut one = movie(1, 50.0, "2000-03-03");
        one.title = "One".into();
        let mut two = movie(2, 80.0, "2001-04-04");
        two.title = "Two".into();
        let mut three = movie(3, 10.0, "2002-05-05");
        three.title = "Three".into();
        Ok(page(vec![one, two, three], 1))
    })
}

fn subgenre_keywords() -> KeywordTable {
    KeywordTable::default()
        .with(1, &["Slasher"])
        .with(2, &["slasher", "gore"])
        .with(3, &["ghost"])
}

const SUBGENRE_CSV: &str = "category,title,popularity,year\n\
slasher,Two,80.0,2001\n\
slasher,One,50.0,2000\n\
gore,Two,80.0,2001\n";

#[tokio::test]
async fn subgenre_cold_run_enriches_ranks_and_caches() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    slasher_and_gore(&mut config);

    let catalog = Arc::new(subgenre_catalog());
    let keywords = Arc::new(subgenre_keywords());
    let reports = run(&config, Command::Subgenres, Arc::clone(&catalog), Arc::clone(&keywords)).await;

    let report = &reports[0];
    assert!(!report.cache_hit);
    assert_eq!(report.rows_written, 3);
    assert_eq!(catalog.call_count(), 1);
    assert_eq!(keywords.call_count(), 3);

    let csv = std::fs::read_to_string(config.subgenre_dataset_path()).unwrap();
    assert_eq!(csv, SUBGENRE_CSV);

    let cached = file_cache(&config).load().await.into_dataset().unwrap();
    let ids: Vec<String> = cached.iter().map(|item| item.id.to_string()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(cached[0].keywords, vec!["slasher"]);
}

#[tokio::test]
async fn warm_run_uses_cache_without_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    slasher_and_gore(&mut config);

    let mut cached = movie(7, 33.0, "1978-10-25");
    cached.title = "Cached".into();
    cached.keywords = vec!["slasher".into()];
    file_cache(&config).save(&[cached]).await.unwrap();

    let catalog = Arc::new(subgenre_catalog());
    let keywords = Arc::new(subgenre_keywords());
    let reports = run(&config, Command::Subgenres, Arc::clone(&catalog), Arc::clone(&keywords)).await;

    assert!(reports[0].cache_hit);
    assert_eq!(catalog.call_count(), 0);
    assert_eq!(keywords.call_count(), 0);
    let csv = std::fs::read_to_string(config.subgenre_dataset_path()).unwrap();
    assert_eq!(csv, "category,title,popularity,year\nslasher,Cached,33.0,1978\n");
}

#[tokio::test]
async fn corrupted_cache_falls_back_to_cold_harvest() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    slasher_and_gore(&mut config);
    std::fs::write(config.cache_path(), b"{ definitely not a dataset").unwrap();

    let catalog = Arc::new(subgenre_catalog());
    let reports = run(&config, Command::Subgenres, Arc::clone(&catalog), Arc::new(subgenre_keywords())).await;

    assert!(!reports[0].cache_hit);
    assert_eq!(catalog.call_count(), 1);
    assert_eq!(std::fs::read_to_string(config.subgenre_dataset_path()).unwrap(), SUBGENRE_CSV);
    // rewritten with the fresh harvest
    assert!(matches!(file_cache(&config).load().await, CacheLoad::Hit(items) if items.len() == 3));
}

#[tokio::test]
async fn invalidate_cache_forces_next_run_cold() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    slasher_and_gore(&mut config);
    file_cache(&config).save(&[movie(9, 1.0, "2010-01-01")]).await.unwrap();

    let reports = run_with::<ScriptedCatalog, KeywordTable>(&config, Command::InvalidateCache, None)
        .await
        .unwrap();
    assert!(reports.is_empty());
    assert_eq!(file_cache(&config).load().await, CacheLoad::Absent);
}

#[tokio::test]
async fn all_runs_both_pipelines_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    two_decades(&mut config);
    slasher_and_gore(&mut config);

    let reports = run(&config, Command::All, Arc::new(subgenre_catalog()), Arc::new(subgenre_keywords())).await;

    let pipelines: Vec<&str> = reports.iter().map(|r| r.pipeline.as_str()).collect();
    assert_eq!(pipelines, vec!["decades", "subgenres"]);
    assert!(config.decade_dataset_path().exists());
    assert!(config.subgenre_dataset_path().exists());
}

#[tokio::test]
async fn filter_can_be_disabled_for_subgenres() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    slasher_and_gore(&mut config);
    config.subgenres.apply_filter = false;

    let catalog = Arc::new(ScriptedCatalog::new(|_, _, _| {
        // no votes at all: rejected by the default filter
        let mut obscure = CatalogItem::new(5, "Obscure");
        obscure.popularity = Some(0.5);
        obscure.release_date = Some("1985".into());
        Ok(page(vec![obscure], 1))
    }));
    let keywords = Arc::new(KeywordTable::default().with(5, &["gore"]));
    run(&config, Command::Subgenres, catalog, keywords).await;

    let csv = std::fs::read_to_string(config.subgenre_dataset_path()).unwrap();
    assert_eq!(csv, "category,title,popularity,year\ngore,Obscure,0.5,1985\n");
}

#[tokio::test]
async fn outage_does_not_pin_an_empty_cache() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    slasher_and_gore(&mut config);

    let down = Arc::new(ScriptedCatalog::new(|_, _, _| {
        Err(cine_harvest_lib::domain::FetchError::status(503, "discover"))
    }));
    let first = run(&config, Command::Subgenres, Arc::clone(&down), Arc::new(subgenre_keywords())).await;
    assert_eq!(first[0].rows_written, 0);
    assert_eq!(file_cache(&config).load().await, CacheLoad::Absent);

    let healthy = Arc::new(subgenre_catalog());
    let second = run(&config, Command::Subgenres, Arc::clone(&healthy), Arc::new(subgenre_keywords())).await;
    assert!(!second[0].cache_hit);
    assert_eq!(healthy.call_count(), 1);
    assert_eq!(second[0].rows_written, 3);
    assert_eq!(std::fs::read_to_string(config.subgenre_dataset_path()).unwrap(), SUBGENRE_CSV);
}

#[tokio::test]
async fn empty_cached_collection_is_treated_as_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    slasher_and_gore(&mut config);
    file_cache(&config).save(&[]).await.unwrap();

    let catalog = Arc::new(subgenre_catalog());
    let reports = run(&config, Command::Subgenres, Arc::clone(&catalog), Arc::new(subgenre_keywords())).await;

    assert!(!reports[0].cache_hit);
    assert_eq!(catalog.call_count(), 1);
    assert!(matches!(file_cache(&config).load().await, CacheLoad::Hit(items) if items.len() == 3));
}
