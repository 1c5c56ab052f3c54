use std::path::{Path, PathBuf};

use crate::error::{DataSourceError, ExplorerError};

use super::model::{FinanceData, Workbook, Worksheet, WorksheetTable};
use super::schema;

// ---------------------------------------------------------------------------
// Source abstraction
// ---------------------------------------------------------------------------

/// Somewhere worksheets can be fetched from.
pub trait WorksheetSource {
    /// Human-readable description shown in the top bar.
    fn describe(&self) -> String;

    /// Fetch the named worksheets. Every name must be present in the result.
    fn fetch(&self, worksheets: &[Worksheet]) -> Result<Workbook, DataSourceError>;
}

/// Fetch all required worksheets from `source` and validate them.
pub fn load(source: &dyn WorksheetSource) -> Result<FinanceData, ExplorerError> {
    log::info!("Loading worksheets from {}", source.describe());
    let workbook = source.fetch(&Worksheet::ALL)?;
    for table in workbook.values() {
        log::info!(
            "Worksheet '{}': {} rows, columns {:?}",
            table.name,
            table.len(),
            table.headers
        );
    }
    schema::into_finance_data(workbook)
}

// ---------------------------------------------------------------------------
// CSV directory source
// ---------------------------------------------------------------------------

/// A directory holding one `<worksheet title>.csv` per worksheet, e.g.
/// `Savings Totals.csv`. The first CSV row is the header.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    pub directory: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        CsvDirectorySource {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, sheet: Worksheet) -> PathBuf {
        self.directory.join(format!("{}.csv", sheet.title()))
    }

    fn available(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.directory) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|x| x.to_str()) == Some("csv"))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        names
    }
}

impl WorksheetSource for CsvDirectorySource {
    fn describe(&self) -> String {
        format!("CSV folder {}", self.directory.display())
    }

    fn fetch(&self, worksheets: &[Worksheet]) -> Result<Workbook, DataSourceError> {
        let mut workbook = Workbook::new();
        for &sheet in worksheets {
            let path = self.path_for(sheet);
            if !path.is_file() {
                return Err(DataSourceError::MissingWorksheet {
                    worksheet: sheet.title().to_string(),
                    available: self.available(),
                });
            }
            log::debug!("Reading {}", path.display());
            let raw = read_csv_rows(&path)?;
            let table = WorksheetTable::from_rows(sheet.title(), raw).ok_or_else(|| {
                DataSourceError::EmptyWorksheet {
                    worksheet: sheet.title().to_string(),
                }
            })?;
            workbook.insert(sheet.title().to_string(), table);
        }
        Ok(workbook)
    }
}

/// Read every record (header included) as raw strings.
fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>, DataSourceError> {
    let csv_err = |source: csv::Error| DataSourceError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .map_err(csv_err)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn write_sample(dir: &Path) {
        fs::write(
            dir.join("Historical_Spending.csv"),
            "Date,Food,Rent\nJan 2022,100.50,900\nFeb 2022,80,900\n",
        )
        .unwrap();
        fs::write(
            dir.join("Savings Totals.csv"),
            "Date,401k,Roth IRA,GESPP,Vangaurd,HSA,CD,Total\n\
             1/1/2022,0,0,0,0,0,0,0\n\
             2/1/2022,100,50,25,25,1000,500,1700\n",
        )
        .unwrap();
        fs::write(
            dir.join("Expenditures.csv"),
            "Timestamp,Amount,Categories,Vendor,Description\n\
             1/5/2022 10:00:00,10.00,Food,A,\"Lunch, with friends\"\n\
             2022-06-01,5.00,Food,B\n",
        )
        .unwrap();
    }

    #[test]
    fn loads_csv_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(dir.path());

        let data = load(&CsvDirectorySource::new(dir.path())).unwrap();
        assert_eq!(data.historical.headers, vec!["Date", "Food", "Rent"]);
        assert_eq!(data.savings[1].sum(), dec!(200));
        assert_eq!(data.expenditures.len(), 2);
        assert_eq!(data.expenditures[0].description, "Lunch, with friends");
        // short row padded: empty description
        assert_eq!(data.expenditures[1].description, "");
    }

    #[test]
    fn missing_csv_lists_what_is_there() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(dir.path());
        fs::remove_file(dir.path().join("Expenditures.csv")).unwrap();

        let err = CsvDirectorySource::new(dir.path())
            .fetch(&Worksheet::ALL)
            .unwrap_err();
        match err {
            DataSourceError::MissingWorksheet {
                worksheet,
                available,
            } => {
                assert_eq!(worksheet, "Expenditures");
                assert_eq!(available, vec!["Historical_Spending", "Savings Totals"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_csv_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(dir.path());
        fs::write(dir.path().join("Savings Totals.csv"), "").unwrap();

        let err = CsvDirectorySource::new(dir.path())
            .fetch(&Worksheet::ALL)
            .unwrap_err();
        assert!(matches!(err, DataSourceError::EmptyWorksheet { .. }));
    }

    #[test]
    fn bad_cells_fail_the_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(dir.path());
        fs::write(
            dir.path().join("Expenditures.csv"),
            "Timestamp,Amount,Categories,Vendor,Description\n2022-01-05,oops,Food,A,x\n",
        )
        .unwrap();

        let err = load(&CsvDirectorySource::new(dir.path())).unwrap_err();
        assert!(matches!(err, ExplorerError::Format(_)));
        assert!(err.to_string().contains("row 2, column 'Amount'"));
    }
}
