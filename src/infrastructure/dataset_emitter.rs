//! Tabular dataset output
//!
//! Rows are written as CSV with a header line, fully replacing any previous
//! file at the same path. The header comes from the row type, so an empty
//! dataset still produces a file with the expected columns.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tracing::info;

/// A row type with a fixed column set
pub trait TabularRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

#[derive(Debug, Clone, Default)]
pub struct DatasetEmitter;

impl DatasetEmitter {
    pub const fn new() -> Self {
        Self
    }

    /// Write `rows` to `path`, returning the number of data rows written.
    ///
    /// The CSV writer rejects records whose length differs from the header,
    /// which is the only validation performed.
    pub fn write_rows<R: TabularRow>(&self, path: &Path, rows: &[R]) -> Result<usize> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("Failed to open dataset file {}", path.display()))?;

        writer
            .write_record(R::COLUMNS)
            .context("Failed to write dataset header")?;
        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("Failed to write dataset row to {}", path.display()))?;
        }
        writer.flush().context("Failed to flush dataset file")?;

        info!("📁 Dataset written: {} ({} rows)", path.display(), rows.len());
        Ok(rows.len())
    }

    /// `write_rows` on the blocking pool, for use from async pipelines.
    pub async fn emit<R>(&self, path: PathBuf, rows: Vec<R>) -> Result<usize>
    where
        R: TabularRow + Send + 'static,
    {
        let emitter = self.clone();
        tokio::task::spawn_blocking(move || emitter.write_rows(&path, &rows))
            .await
            .map_err(|e| anyhow!("Dataset writer task failed: {}", e))?
    }
}
