use std::path::Path;

use chrono::{Local, NaiveDate};

use crate::chart::{build_chart, Chart, ChartMode};
use crate::config::DashboardConfig;
use crate::data::cache::LoadCache;
use crate::data::coerce::{coerce_column, processed_dataset, NumericView};
use crate::data::export;
use crate::data::loader::Upload;
use crate::data::model::Dataset;
use crate::data::stats::{summarize, ColumnSummary};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Memo of the last file load.
    cache: LoadCache,

    /// Current dataset (empty until something is loaded).
    pub dataset: Dataset,

    /// Whether `dataset` is the built-in demo.
    pub showing_demo: bool,

    /// Selected X / Y columns.
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,

    pub chart_mode: ChartMode,

    /// Numeric view of the Y column (derived).
    pub numeric_y: Option<NumericView>,

    /// Mean of the Y column, when it has numbers.
    pub average: Option<f64>,

    /// Why the average could not be computed.
    pub coerce_warning: Option<String>,

    /// Chart for the current selection (derived).
    pub chart: Option<Chart>,

    /// Why the chart could not be built.
    pub chart_error: Option<String>,

    /// Per-column summary statistics (derived).
    pub summary: Vec<ColumnSummary>,

    /// Load error shown as a banner.
    pub error: Option<String>,

    /// Status line message (exports etc.).
    pub status_message: Option<String>,

    /// Date the current dataset was loaded.
    pub refreshed_on: NaiveDate,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let show_demo = config.show_demo_on_start;
        let mut state = Self {
            config,
            cache: LoadCache::default(),
            dataset: Dataset::default(),
            showing_demo: false,
            x_axis: None,
            y_axis: None,
            chart_mode: ChartMode::default(),
            numeric_y: None,
            average: None,
            coerce_warning: None,
            chart: None,
            chart_error: None,
            summary: Vec::new(),
            error: None,
            status_message: None,
            refreshed_on: Local::now().date_naive(),
        };
        if show_demo {
            state.show_demo();
        }
        state
    }

    /// Replace the dataset with the built-in demo.
    pub fn show_demo(&mut self) {
        log::info!("No file loaded, showing demo dataset");
        self.error = None;
        self.set_dataset(Dataset::demo(), true);
    }

    /// Ingest an upload. On failure the error is kept for the banner and the
    /// dataset becomes empty.
    pub fn ingest(&mut self, upload: &Upload) {
        let options = self.config.loader_options();
        let result = self.cache.load(upload, &options);
        let dataset = match result {
            Ok(dataset) => {
                self.error = None;
                dataset.clone()
            }
            Err(e) => {
                log::error!("Failed to load '{}': {e}", upload.name);
                self.error = Some(format!(
                    "An error occurred while loading the file: {e}"
                ));
                Dataset::empty(&upload.name)
            }
        };
        log::debug!("Loader has run {} times", self.cache.parses());
        self.set_dataset(dataset, false);
    }

    /// Read `path` and ingest it.
    pub fn open_path(&mut self, path: &Path) {
        match Upload::from_path(path) {
            Ok(upload) => self.ingest(&upload),
            Err(e) => {
                log::error!("Failed to read {}: {e}", path.display());
                self.error = Some(format!(
                    "An error occurred while loading the file: {e}"
                ));
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default()
                    .to_string();
                self.set_dataset(Dataset::empty(name), false);
            }
        }
    }

    fn set_dataset(&mut self, dataset: Dataset, demo: bool) {
        let first = dataset.columns().first().map(|c| c.name.clone());
        self.x_axis = first.clone();
        self.y_axis = first;
        self.summary = summarize(&dataset);
        self.dataset = dataset;
        self.showing_demo = demo;
        self.status_message = None;
        self.refreshed_on = Local::now().date_naive();
        self.recompute();
    }

    pub fn set_x_axis(&mut self, column: String) {
        self.x_axis = Some(column);
        self.recompute();
    }

    pub fn set_y_axis(&mut self, column: String) {
        self.y_axis = Some(column);
        self.recompute();
    }

    pub fn set_chart_mode(&mut self, mode: ChartMode) {
        self.chart_mode = mode;
        self.recompute();
    }

    /// Whether there is anything to show besides the welcome screen.
    pub fn has_data(&self) -> bool {
        !self.dataset.is_empty()
    }

    /// Rebuild the numeric view, average and chart from the selections.
    pub fn recompute(&mut self) {
        self.numeric_y = None;
        self.average = None;
        self.coerce_warning = None;
        self.chart = None;
        self.chart_error = None;

        if !self.has_data() {
            return;
        }
        let (Some(x), Some(y)) = (self.x_axis.clone(), self.y_axis.clone()) else {
            return;
        };

        match coerce_column(&self.dataset, &y).and_then(|view| {
            let avg = view.average();
            self.numeric_y = Some(view);
            avg
        }) {
            Ok(avg) => self.average = Some(avg),
            Err(e) => {
                log::warn!("Unable to calculate average: {e}");
                self.coerce_warning = Some(format!("Unable to calculate average: {e}"));
            }
        }

        match build_chart(&self.dataset, &x, &y, self.chart_mode) {
            Ok(chart) => self.chart = Some(chart),
            Err(e) => {
                log::warn!("Unable to build chart: {e}");
                self.chart_error = Some(e.to_string());
            }
        }
    }

    /// The dataset as exported: the Y column replaced by its numeric form.
    pub fn processed_dataset(&self) -> Dataset {
        match &self.numeric_y {
            Some(view) => processed_dataset(&self.dataset, view),
            None => self.dataset.clone(),
        }
    }

    pub fn export_file_name(&self) -> String {
        export::export_file_name(&self.dataset)
    }

    /// Write the processed dataset to `path`, reporting in the status line.
    pub fn save_csv(&mut self, path: &Path) {
        match export::write_csv(&self.processed_dataset(), path) {
            Ok(()) => {
                self.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;
    use crate::data::model::CellValue;
    use pretty_assertions::assert_eq;

    fn empty_state() -> AppState {
        AppState::new(DashboardConfig {
            show_demo_on_start: false,
            ..DashboardConfig::default()
        })
    }

    #[test]
    fn test_starts_with_demo_and_first_column_selected() {
        let state = AppState::default();
        assert!(state.showing_demo);
        assert!(state.has_data());
        assert_eq!(state.x_axis.as_deref(), Some("Date"));
        assert_eq!(state.y_axis.as_deref(), Some("Date"));
        // Dates are not numeric: no average, only a warning.
        assert_eq!(state.average, None);
        assert!(state.coerce_warning.is_some());
        assert!(state.chart.is_some());
    }

    #[test]
    fn test_can_start_empty() {
        let state = empty_state();
        assert!(!state.has_data());
        assert!(state.chart.is_none());
        assert!(state.summary.is_empty());
    }

    #[test]
    fn test_selecting_sales_gives_average_and_line_chart() {
        let mut state = AppState::default();
        state.set_y_axis("Sales".to_string());
        assert_eq!(state.average, Some(218.5));
        assert_eq!(state.coerce_warning, None);

        let chart = state.chart.as_ref().unwrap();
        assert_eq!(chart.title, "Line Chart: Sales vs Date");
        let ChartKind::Line(points) = &chart.kind else {
            panic!("expected a line chart");
        };
        assert_eq!(points.len(), 10);
    }

    #[test]
    fn test_pie_of_category_after_selecting_it_as_y() {
        let mut state = AppState::default();
        state.set_y_axis("Category".to_string());
        state.set_chart_mode(ChartMode::Pie);

        // Coercing Category must not wipe the categories the pie counts.
        let ChartKind::Pie(slices) = &state.chart.as_ref().unwrap().kind else {
            panic!("expected a pie chart");
        };
        let counts: Vec<usize> = slices.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![4, 3, 3]);
        assert_eq!(state.dataset, Dataset::demo());
    }

    #[test]
    fn test_failed_upload_shows_error_and_empty_dataset() {
        let mut state = AppState::default();
        state.ingest(&Upload::new("broken.xlsx", "garbage"));
        assert!(state
            .error
            .as_deref()
            .unwrap()
            .starts_with("An error occurred while loading the file"));
        assert!(!state.has_data());
        assert!(!state.showing_demo);
        assert!(state.chart.is_none());
    }

    #[test]
    fn test_successful_upload_clears_error() {
        let mut state = empty_state();
        state.ingest(&Upload::new("broken.xlsx", "garbage"));
        assert!(state.error.is_some());

        state.ingest(&Upload::new("prices.csv", "item,price\napple,1.5\npear,2\n"));
        assert_eq!(state.error, None);
        assert_eq!(state.dataset.title(), "Prices");
        assert_eq!(state.x_axis.as_deref(), Some("item"));

        state.set_y_axis("price".to_string());
        assert_eq!(state.average, Some(1.75));
    }

    #[test]
    fn test_unsupported_upload_is_empty_without_error() {
        let mut state = AppState::default();
        state.ingest(&Upload::new("notes.txt", "hello"));
        assert_eq!(state.error, None);
        assert!(!state.has_data());
    }

    #[test]
    fn test_unknown_axis_reports_chart_error() {
        let mut state = AppState::default();
        state.set_x_axis("Missing".to_string());
        assert!(state.chart.is_none());
        assert_eq!(state.chart_error.as_deref(), Some("unknown column 'Missing'"));
    }

    #[test]
    fn test_export_uses_processed_y_column() {
        let mut state = AppState::default();
        state.set_y_axis("Category".to_string());
        assert_eq!(state.export_file_name(), "Demo Data.csv");

        let processed = state.processed_dataset();
        assert_eq!(
            processed.column("Category").unwrap().values,
            vec![CellValue::Null; 10]
        );
        let bytes = export::to_csv_bytes(&processed).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().nth(1), Some("2023-01-01,120,"));
    }

    #[test]
    fn test_open_path_and_save_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("team_scores.csv");
        std::fs::write(&input, "team,score\nred,3\nblue,5\n").unwrap();

        let mut state = empty_state();
        state.open_path(&input);
        assert_eq!(state.dataset.n_rows(), 2);
        assert_eq!(state.dataset.title(), "Team Scores");

        let output = dir.path().join(state.export_file_name());
        state.save_csv(&output);
        assert!(state.status_message.as_deref().unwrap().starts_with("Saved"));
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("\u{feff}team,score\n"));

        state.open_path(&dir.path().join("gone.csv"));
        assert!(state.error.is_some());
        assert!(!state.has_data());
    }
}
