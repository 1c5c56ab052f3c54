use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Worksheet – the fixed vocabulary of source tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Worksheet {
    HistoricalSpending,
    SavingsTotals,
    Expenditures,
}

impl Worksheet {
    pub const ALL: [Worksheet; 3] = [
        Worksheet::HistoricalSpending,
        Worksheet::SavingsTotals,
        Worksheet::Expenditures,
    ];

    /// Title of the tab in the source spreadsheet.
    pub fn title(self) -> &'static str {
        match self {
            Worksheet::HistoricalSpending => "Historical_Spending",
            Worksheet::SavingsTotals => "Savings Totals",
            Worksheet::Expenditures => "Expenditures",
        }
    }
}

impl fmt::Display for Worksheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// WorksheetTable – raw string cells as fetched
// ---------------------------------------------------------------------------

/// One worksheet: a header row plus string cells aligned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct WorksheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl WorksheetTable {
    /// Build a table from raw rows where the first row is the header.
    /// Returns `None` when there is no header row at all.
    ///
    /// Data rows are padded (or truncated) to the header width, since
    /// spreadsheet APIs drop trailing empty cells.
    pub fn from_rows(name: impl Into<String>, mut raw: Vec<Vec<String>>) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let headers = raw.remove(0);
        let width = headers.len();
        let rows = raw
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Some(WorksheetTable {
            name: name.into(),
            headers,
            rows,
        })
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Iterate over one column's cells, in row order.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[idx].as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// All fetched worksheets keyed by title.
pub type Workbook = BTreeMap<String, WorksheetTable>;

// ---------------------------------------------------------------------------
// Typed records
// ---------------------------------------------------------------------------

/// One row of the Expenditures worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Expenditure {
    pub timestamp: NaiveDateTime,
    pub amount: Decimal,
    pub category: String,
    pub vendor: String,
    pub description: String,
    pub year: i32,
    pub month: u32,
}

impl Expenditure {
    pub fn new(
        timestamp: NaiveDateTime,
        amount: Decimal,
        category: impl Into<String>,
        vendor: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Expenditure {
            timestamp,
            amount,
            category: category.into(),
            vendor: vendor.into(),
            description: description.into(),
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }
}

/// One row of the Savings Totals worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsRow {
    pub date: String,
    pub k401: Decimal,
    pub roth_ira: Decimal,
    pub gespp: Decimal,
    pub vanguard: Decimal,
    pub hsa: Decimal,
    pub cd: Decimal,
    pub total: Decimal,
}

impl SavingsRow {
    /// 401k + Roth IRA + GESPP + Vanguard. HSA and CD are not part of it.
    pub fn sum(&self) -> Decimal {
        self.k401 + self.roth_ira + self.gespp + self.vanguard
    }
}

/// The validated contents of one load.
#[derive(Debug, Clone)]
pub struct FinanceData {
    /// Kept untyped: its category columns are chosen at runtime.
    pub historical: WorksheetTable,
    pub savings: Vec<SavingsRow>,
    pub expenditures: Vec<Expenditure>,
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Parse a cell as a decimal. Accepts surrounding whitespace and
/// scientific notation; an empty cell is not a number.
pub fn parse_decimal(cell: &str) -> Option<Decimal> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

// `%y` layouts come first: `%Y` would read "1/5/22" as the year 22.
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%m/%d/%y", "%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Earliest year accepted from a four-digit-year layout.
const MIN_YEAR: i32 = 1000;

/// Parse a timestamp cell in any of the layouts spreadsheets commonly emit.
/// Years before `MIN_YEAR` are treated as unparseable.
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let s = cell.trim();
    let parsed = if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        Some(dt.naive_local())
    } else {
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    };
    parsed.filter(|dt| dt.year() >= MIN_YEAR)
}
