use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Data source failures (auth / network / missing worksheet)
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("could not read service account key at '{}': {source}", .path.display())]
    Credentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("could not load the system TLS root certificates: {0}")]
    Tls(#[source] std::io::Error),

    #[error("could not start the network runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("fetching worksheet '{worksheet}' failed: {message}")]
    Fetch { worksheet: String, message: String },

    #[error("worksheet '{worksheet}' not found (available: {})", .available.join(", "))]
    MissingWorksheet {
        worksheet: String,
        available: Vec<String>,
    },

    #[error("worksheet '{worksheet}' has no header row")]
    EmptyWorksheet { worksheet: String },

    #[error("reading '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

// ---------------------------------------------------------------------------
// Data format failures (schema + coercion), reported all at once
// ---------------------------------------------------------------------------

/// What a cell was expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Text,
    Decimal,
    Timestamp,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::Text => write!(f, "text"),
            CellKind::Decimal => write!(f, "a decimal number"),
            CellKind::Timestamp => write!(f, "a date"),
        }
    }
}

/// A single problem found while validating a worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatIssue {
    MissingColumn {
        column: String,
    },
    /// `row` is the spreadsheet row number (the header is row 1).
    InvalidCell {
        column: String,
        row: usize,
        value: String,
        expected: CellKind,
    },
    /// Running total of `columns` leaves the decimal range at `row`.
    SumOverflow {
        columns: String,
        row: usize,
    },
}

impl fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatIssue::MissingColumn { column } => write!(f, "missing column '{column}'"),
            FormatIssue::InvalidCell {
                column,
                row,
                value,
                expected,
            } => write!(f, "row {row}, column '{column}': '{value}' is not {expected}"),
            FormatIssue::SumOverflow { columns, row } => {
                write!(f, "row {row}: total of {columns} is too large to add up")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct DataFormatError {
    pub worksheet: String,
    pub issues: Vec<FormatIssue>,
}

impl fmt::Display for DataFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "worksheet '{}' has {} problem(s): ",
            self.worksheet,
            self.issues.len()
        )?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// User selection failures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no categories selected")]
    Empty,
    #[error("unknown category column '{0}'")]
    UnknownColumn(String),
}

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error(transparent)]
    Source(#[from] DataSourceError),
    #[error(transparent)]
    Format(#[from] DataFormatError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
}
