use std::path::PathBuf;

use google_sheets4::api::Scope;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use google_sheets4::{hyper, hyper_rustls, Sheets};
use serde_json::Value as JsonValue;

use crate::error::DataSourceError;

use super::loader::WorksheetSource;
use super::model::{Workbook, Worksheet, WorksheetTable};

type Connector = hyper_rustls::HttpsConnector<hyper::client::HttpConnector>;

// ---------------------------------------------------------------------------
// Google Sheets source (service-account authentication)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GoogleSheetsSource {
    /// Service account key (JSON) downloaded from the cloud console.
    pub credentials_path: PathBuf,
    pub spreadsheet_id: String,
}

impl GoogleSheetsSource {
    pub fn new(credentials_path: impl Into<PathBuf>, spreadsheet_id: impl Into<String>) -> Self {
        GoogleSheetsSource {
            credentials_path: credentials_path.into(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    async fn hub(&self) -> Result<Sheets<Connector>, DataSourceError> {
        // Read the key before touching the network stack.
        let key = oauth2::read_service_account_key(&self.credentials_path)
            .await
            .map_err(|source| DataSourceError::Credentials {
                path: self.credentials_path.clone(),
                source,
            })?;
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(DataSourceError::Tls)?
            .https_only()
            .enable_http1()
            .build();
        let client = hyper::Client::builder().build(connector);
        let auth = authenticator(key, client.clone()).await?;
        Ok(Sheets::new(client, auth))
    }

    async fn fetch_async(&self, worksheets: &[Worksheet]) -> Result<Workbook, DataSourceError> {
        let hub = self.hub().await?;

        let (_, spreadsheet) = hub
            .spreadsheets()
            .get(&self.spreadsheet_id)
            .add_scope(Scope::SpreadsheetReadonly)
            .doit()
            .await
            .map_err(|e| DataSourceError::Fetch {
                worksheet: "<spreadsheet metadata>".to_string(),
                message: e.to_string(),
            })?;
        let titles: Vec<String> = spreadsheet
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| s.properties.and_then(|p| p.title))
            .collect();

        let mut workbook = Workbook::new();
        for &sheet in worksheets {
            let title = sheet.title();
            if !titles.iter().any(|t| t == title) {
                return Err(DataSourceError::MissingWorksheet {
                    worksheet: title.to_string(),
                    available: titles,
                });
            }

            log::debug!("Fetching worksheet '{title}'");
            let (_, range) = hub
                .spreadsheets()
                .values_get(&self.spreadsheet_id, &a1_sheet_range(title))
                .add_scope(Scope::SpreadsheetReadonly)
                .doit()
                .await
                .map_err(|e| DataSourceError::Fetch {
                    worksheet: title.to_string(),
                    message: e.to_string(),
                })?;

            let raw: Vec<Vec<String>> = range
                .values
                .unwrap_or_default()
                .into_iter()
                .map(|row| row.iter().map(cell_text).collect())
                .collect();
            let table = WorksheetTable::from_rows(title, raw).ok_or_else(|| {
                DataSourceError::EmptyWorksheet {
                    worksheet: title.to_string(),
                }
            })?;
            workbook.insert(title.to_string(), table);
        }
        Ok(workbook)
    }
}

impl WorksheetSource for GoogleSheetsSource {
    fn describe(&self) -> String {
        format!("Google Sheets {}", self.spreadsheet_id)
    }

    /// Blocks the calling thread until every worksheet has been fetched.
    fn fetch(&self, worksheets: &[Worksheet]) -> Result<Workbook, DataSourceError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(DataSourceError::Runtime)?;
        runtime.block_on(self.fetch_async(worksheets))
    }
}

async fn authenticator(
    key: oauth2::ServiceAccountKey,
    client: hyper::Client<Connector>,
) -> Result<Authenticator<Connector>, DataSourceError> {
    oauth2::ServiceAccountAuthenticator::with_client(key, client)
        .build()
        .await
        .map_err(|e| DataSourceError::Authentication(e.to_string()))
}

/// A1 range covering a whole worksheet. Titles are always quoted so names
/// with spaces (`Savings Totals`) work.
fn a1_sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Render a JSON cell the way the spreadsheet displays it.
fn cell_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        JsonValue::Bool(true) => "TRUE".to_string(),
        JsonValue::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}
