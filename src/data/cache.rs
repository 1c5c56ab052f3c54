use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::error::ExplorerError;

use super::loader::{self, WorksheetSource};
use super::model::FinanceData;

// ---------------------------------------------------------------------------
// Memoized load handle
// ---------------------------------------------------------------------------

/// Owns the source and the result of the last successful load.
///
/// The cached data lives until [`LoadCache::invalidate`] (the Refresh button)
/// or process exit.
pub struct LoadCache {
    source: Box<dyn WorksheetSource>,
    loaded: Option<Arc<FinanceData>>,
    loaded_at: Option<DateTime<Local>>,
    loads: usize,
}

impl LoadCache {
    pub fn new(source: Box<dyn WorksheetSource>) -> Self {
        LoadCache {
            source,
            loaded: None,
            loaded_at: None,
            loads: 0,
        }
    }

    /// Return the cached data, loading it first if needed.
    pub fn get(&mut self) -> Result<Arc<FinanceData>, ExplorerError> {
        if let Some(data) = &self.loaded {
            return Ok(Arc::clone(data));
        }
        let data = Arc::new(loader::load(self.source.as_ref())?);
        self.loads += 1;
        self.loaded = Some(Arc::clone(&data));
        self.loaded_at = Some(Local::now());
        log::info!(
            "Loaded {} expenditures, {} savings rows, {} historical rows",
            data.expenditures.len(),
            data.savings.len(),
            data.historical.len()
        );
        Ok(data)
    }

    pub fn invalidate(&mut self) {
        self.loaded = None;
        self.loaded_at = None;
    }

    /// Drop the cached data and load again.
    pub fn refresh(&mut self) -> Result<Arc<FinanceData>, ExplorerError> {
        self.invalidate();
        self.get()
    }

    /// Point the cache at a different source. Cached data is dropped.
    pub fn replace_source(&mut self, source: Box<dyn WorksheetSource>) {
        self.source = source;
        self.invalidate();
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Local>> {
        self.loaded_at
    }

    /// Number of successful loads so far.
    pub fn load_count(&self) -> usize {
        self.loads
    }
}
