use std::sync::Arc;

use crate::dashboard::{build_panels, Panel};
use crate::data::aggregate::historical_categories;
use crate::data::cache::LoadCache;
use crate::data::loader::WorksheetSource;
use crate::data::model::FinanceData;
use crate::data::selection::CategorySelection;
use crate::error::ExplorerError;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Memoized load; only Refresh re-fetches.
    pub cache: LoadCache,

    /// Data of the last successful load, `None` after a failed refresh.
    pub data: Option<Arc<FinanceData>>,

    /// Historical_Spending category multiselect.
    pub selection: CategorySelection,

    /// Charts for the current data + selection.
    pub panels: Vec<Panel>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Height of each chart in points.
    pub chart_height: f32,
}

impl AppState {
    /// Build the state from a cache whose first load must succeed.
    pub fn new(mut cache: LoadCache, chart_height: f32) -> Result<Self, ExplorerError> {
        let data = cache.get()?;
        let mut state = AppState {
            cache,
            data: None,
            selection: CategorySelection::default(),
            panels: Vec::new(),
            status_message: None,
            chart_height,
        };
        state.set_data(data);
        Ok(state)
    }

    /// Ingest freshly loaded data, keep still-valid selections and rebuild.
    fn set_data(&mut self, data: Arc<FinanceData>) {
        self.selection
            .rebase(historical_categories(&data.historical));
        self.data = Some(data);
        self.status_message = None;
        self.rebuild_panels();
    }

    /// Recompute every chart from the current data and selection.
    pub fn rebuild_panels(&mut self) {
        self.panels = match &self.data {
            Some(data) => build_panels(data, &self.selection),
            None => Vec::new(),
        };
    }

    /// Drop the cache and load again. On failure nothing is charted until a
    /// later refresh succeeds.
    pub fn refresh(&mut self) {
        match self.cache.refresh() {
            Ok(data) => self.set_data(data),
            Err(e) => self.fail(e),
        }
    }

    /// Switch to another source (e.g. a CSV folder picked in the UI).
    pub fn switch_source(&mut self, source: Box<dyn WorksheetSource>) {
        log::info!("Switching source to {}", source.describe());
        self.cache.replace_source(source);
        self.refresh();
    }

    fn fail(&mut self, err: ExplorerError) {
        log::warn!("Reload failed: {err}");
        self.data = None;
        self.panels.clear();
        self.status_message = Some(format!("Error: {err}"));
    }

    pub fn toggle_category(&mut self, category: &str) {
        self.selection.toggle(category);
        self.rebuild_panels();
    }

    pub fn select_all(&mut self) {
        self.selection.select_all();
        self.rebuild_panels();
    }

    pub fn select_none(&mut self) {
        self.selection.select_none();
        self.rebuild_panels();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::model::{Workbook, Worksheet};
    use crate::data::schema::tests::sample_workbook;
    use crate::error::DataSourceError;

    /// Succeeds while `healthy` is set.
    struct SwitchableSource {
        healthy: Rc<Cell<bool>>,
    }

    impl WorksheetSource for SwitchableSource {
        fn describe(&self) -> String {
            "switchable".into()
        }

        fn fetch(&self, _: &[Worksheet]) -> Result<Workbook, DataSourceError> {
            if self.healthy.get() {
                Ok(sample_workbook())
            } else {
                Err(DataSourceError::Authentication("expired".into()))
            }
        }
    }

    fn state() -> (AppState, Rc<Cell<bool>>) {
        let healthy = Rc::new(Cell::new(true));
        let cache = LoadCache::new(Box::new(SwitchableSource {
            healthy: Rc::clone(&healthy),
        }));
        (AppState::new(cache, 300.0).unwrap(), healthy)
    }

    #[test]
    fn initial_load_builds_all_panels() {
        let (state, _) = state();
        assert_eq!(state.panels.len(), 9);
        assert_eq!(state.selection.available(), ["Food", "Rent"]);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn initial_failure_is_fatal() {
        let healthy = Rc::new(Cell::new(false));
        let cache = LoadCache::new(Box::new(SwitchableSource { healthy }));
        assert!(AppState::new(cache, 300.0).is_err());
    }

    #[test]
    fn selection_changes_rebuild_historical_panel() {
        let (mut state, _) = state();
        assert!(state.panels[0].data.is_err());
        state.toggle_category("Food");
        assert!(state.panels[0].data.is_ok());
        assert_eq!(state.panels[0].title, "Historical  Food");
        state.select_none();
        assert!(state.panels[0].data.is_err());
        state.select_all();
        assert_eq!(state.panels[0].title, "Historical  Food, Rent");
    }

    #[test]
    fn failed_refresh_clears_charts_and_recovers() {
        let (mut state, healthy) = state();
        state.toggle_category("Rent");

        healthy.set(false);
        state.refresh();
        assert!(state.panels.is_empty());
        assert!(state.data.is_none());
        assert_eq!(
            state.status_message.as_deref(),
            Some("Error: authentication failed: expired")
        );

        healthy.set(true);
        state.refresh();
        assert_eq!(state.panels.len(), 9);
        assert!(state.status_message.is_none());
        assert_eq!(state.selection.selected(), ["Rent"]);
    }
}
