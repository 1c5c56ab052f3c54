use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::data::loader::{CsvDirectorySource, WorksheetSource};
use crate::data::sheets::GoogleSheetsSource;

/// Environment variable naming the settings file.
pub const CONFIG_PATH_VAR: &str = "FINANCE_EXPLORER_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "finance-explorer.toml";
const ENV_PREFIX: &str = "FINANCE_EXPLORER";

// ---------------------------------------------------------------------------
// Settings, resolved once at startup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub source: SourceSettings,
    #[serde(default)]
    pub window: WindowSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSettings {
    GoogleSheets {
        credentials_path: PathBuf,
        spreadsheet_id: String,
    },
    CsvDirectory {
        directory: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f32,
    pub height: f32,
    pub chart_height: f32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        WindowSettings {
            width: 1200.0,
            height: 800.0,
            chart_height: 420.0,
        }
    }
}

impl Settings {
    /// Settings file (optional) overlaid with `FINANCE_EXPLORER_*` variables.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        let config = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("reading settings from '{path}' and the environment"))?;
        Self::from_config(config)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()
            .context("parsing settings")?;
        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self> {
        config.try_deserialize().context(
            "invalid settings: set [source] kind = \"google_sheets\" (with credentials_path \
             and spreadsheet_id) or kind = \"csv_directory\" (with directory)",
        )
    }
}

impl SourceSettings {
    pub fn into_source(self) -> Box<dyn WorksheetSource> {
        match self {
            SourceSettings::GoogleSheets {
                credentials_path,
                spreadsheet_id,
            } => Box::new(GoogleSheetsSource::new(credentials_path, spreadsheet_id)),
            SourceSettings::CsvDirectory { directory } => {
                Box::new(CsvDirectorySource::new(directory))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn google_sheets_settings() {
        let settings = Settings::from_toml(
            r#"
            [source]
            kind = "google_sheets"
            credentials_path = "/keys/finances.json"
            spreadsheet_id = "1AbC"

            [window]
            chart_height = 300.0
            "#,
        )
        .unwrap();
        assert_eq!(
            settings.source,
            SourceSettings::GoogleSheets {
                credentials_path: PathBuf::from("/keys/finances.json"),
                spreadsheet_id: "1AbC".into(),
            }
        );
        assert_eq!(settings.window.chart_height, 300.0);
        assert_eq!(settings.window.width, 1200.0);
    }

    #[test]
    fn csv_directory_settings_default_window() {
        let settings = Settings::from_toml(
            r#"
            [source]
            kind = "csv_directory"
            directory = "sample_data"
            "#,
        )
        .unwrap();
        assert_eq!(settings.window, WindowSettings::default());
        let source = settings.source.into_source();
        assert_eq!(source.describe(), "CSV folder sample_data");
    }

    #[test]
    fn missing_source_is_rejected() {
        let err = Settings::from_toml("[window]\nwidth = 10.0\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid settings"));
    }

    #[test]
    fn incomplete_google_settings_are_rejected() {
        assert!(Settings::from_toml(
            r#"
            [source]
            kind = "google_sheets"
            spreadsheet_id = "1AbC"
            "#,
        )
        .is_err());
    }
}
