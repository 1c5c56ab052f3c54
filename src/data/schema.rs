use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::error::{CellKind, DataFormatError, DataSourceError, ExplorerError, FormatIssue};

use super::model::{
    parse_decimal, parse_timestamp, Expenditure, FinanceData, SavingsRow, Workbook, Worksheet,
    WorksheetTable,
};

// ---------------------------------------------------------------------------
// Column names, spelled exactly as in the source spreadsheet
// ---------------------------------------------------------------------------

pub const DATE: &str = "Date";
pub const TIMESTAMP: &str = "Timestamp";
pub const AMOUNT: &str = "Amount";
pub const CATEGORIES: &str = "Categories";
pub const VENDOR: &str = "Vendor";
pub const DESCRIPTION: &str = "Description";
pub const K401: &str = "401k";
pub const ROTH_IRA: &str = "Roth IRA";
pub const GESPP: &str = "GESPP";
pub const VANGUARD: &str = "Vangaurd";
pub const HSA: &str = "HSA";
pub const CD: &str = "CD";
pub const TOTAL: &str = "Total";

/// Savings account columns in chart order.
pub const SAVINGS_ACCOUNTS: [&str; 6] = [K401, ROTH_IRA, GESPP, VANGUARD, HSA, CD];

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: CellKind,
}

const fn col(name: &'static str, kind: CellKind) -> ColumnSpec {
    ColumnSpec { name, kind }
}

/// The columns each worksheet must carry.
pub fn schema(sheet: Worksheet) -> &'static [ColumnSpec] {
    const HISTORICAL: &[ColumnSpec] = &[col(DATE, CellKind::Text)];
    const SAVINGS: &[ColumnSpec] = &[
        col(DATE, CellKind::Text),
        col(K401, CellKind::Decimal),
        col(ROTH_IRA, CellKind::Decimal),
        col(GESPP, CellKind::Decimal),
        col(VANGUARD, CellKind::Decimal),
        col(HSA, CellKind::Decimal),
        col(CD, CellKind::Decimal),
        col(TOTAL, CellKind::Decimal),
    ];
    const EXPENDITURES: &[ColumnSpec] = &[
        col(TIMESTAMP, CellKind::Timestamp),
        col(AMOUNT, CellKind::Decimal),
        col(CATEGORIES, CellKind::Text),
        col(VENDOR, CellKind::Text),
        col(DESCRIPTION, CellKind::Text),
    ];
    match sheet {
        Worksheet::HistoricalSpending => HISTORICAL,
        Worksheet::SavingsTotals => SAVINGS,
        Worksheet::Expenditures => EXPENDITURES,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check one table against its schema, collecting every missing column and
/// every cell that fails to coerce.
pub fn validate(sheet: Worksheet, table: &WorksheetTable) -> Result<(), DataFormatError> {
    let mut issues = Vec::new();

    for spec in schema(sheet) {
        let Some(idx) = table.column_index(spec.name) else {
            issues.push(FormatIssue::MissingColumn {
                column: spec.name.to_string(),
            });
            continue;
        };
        issues.extend(invalid_cells(table, idx, spec.kind));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(DataFormatError {
            worksheet: table.name.clone(),
            issues,
        })
    }
}

/// Cells of one column that do not coerce to `kind`.
pub fn invalid_cells(
    table: &WorksheetTable,
    idx: usize,
    kind: CellKind,
) -> impl Iterator<Item = FormatIssue> + '_ {
    let column = &table.headers[idx];
    table
        .column(idx)
        .enumerate()
        .filter(move |(_, cell)| match kind {
            CellKind::Text => false,
            CellKind::Decimal => parse_decimal(cell).is_none(),
            CellKind::Timestamp => parse_timestamp(cell).is_none(),
        })
        .map(move |(i, cell)| FormatIssue::InvalidCell {
            column: column.clone(),
            row: spreadsheet_row(i),
            value: cell.to_string(),
            expected: kind,
        })
}

/// Spreadsheet row number of a data row index (header is row 1).
pub fn spreadsheet_row(index: usize) -> usize {
    index + 2
}

/// Validate every required worksheet and convert the workbook into typed data.
pub fn into_finance_data(mut workbook: Workbook) -> Result<FinanceData, ExplorerError> {
    let mut take = |sheet: Worksheet| -> Result<WorksheetTable, ExplorerError> {
        let table = workbook
            .remove(sheet.title())
            .ok_or_else(|| DataSourceError::MissingWorksheet {
                worksheet: sheet.title().to_string(),
                available: workbook.keys().cloned().collect(),
            })?;
        validate(sheet, &table)?;
        Ok(table)
    };

    let historical = take(Worksheet::HistoricalSpending)?;
    let savings = take(Worksheet::SavingsTotals)?;
    let expenditures = take(Worksheet::Expenditures)?;

    // Aggregates sum subsets of these cells; bounding the absolute totals
    // here keeps every later addition inside the decimal range.
    check_sum_fits(&savings, &SAVINGS_ACCOUNTS[..4], SumScope::PerRow)?;
    check_sum_fits(&expenditures, &[AMOUNT], SumScope::AcrossRows)?;

    Ok(FinanceData {
        historical,
        savings: savings_rows(&savings),
        expenditures: expenditure_records(&expenditures),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SumScope {
    PerRow,
    AcrossRows,
}

/// Fails at the first row where the running sum of absolute values of
/// `columns` no longer fits in a `Decimal`.
fn check_sum_fits(
    table: &WorksheetTable,
    columns: &[&str],
    scope: SumScope,
) -> Result<(), DataFormatError> {
    let indices: Vec<usize> = columns
        .iter()
        .filter_map(|c| table.column_index(c))
        .collect();

    let mut total = Decimal::ZERO;
    for (i, row) in table.rows.iter().enumerate() {
        if scope == SumScope::PerRow {
            total = Decimal::ZERO;
        }
        for &idx in &indices {
            let value = parse_decimal(&row[idx]).unwrap_or_default().abs();
            total = total.checked_add(value).ok_or_else(|| DataFormatError {
                worksheet: table.name.clone(),
                issues: vec![FormatIssue::SumOverflow {
                    columns: columns.join(" + "),
                    row: spreadsheet_row(i),
                }],
            })?;
        }
    }
    Ok(())
}

// Both converters run after `validate`, so columns exist and cells coerce.

fn decimal_at(table: &WorksheetTable, row: &[String], column: &str) -> Decimal {
    table
        .column_index(column)
        .and_then(|i| parse_decimal(&row[i]))
        .unwrap_or_default()
}

fn text_at(table: &WorksheetTable, row: &[String], column: &str) -> String {
    table
        .column_index(column)
        .map(|i| row[i].clone())
        .unwrap_or_default()
}

fn timestamp_at(table: &WorksheetTable, row: &[String], column: &str) -> NaiveDateTime {
    table
        .column_index(column)
        .and_then(|i| parse_timestamp(&row[i]))
        .unwrap_or_default()
}

fn savings_rows(table: &WorksheetTable) -> Vec<SavingsRow> {
    table
        .rows
        .iter()
        .map(|row| SavingsRow {
            date: text_at(table, row, DATE),
            k401: decimal_at(table, row, K401),
            roth_ira: decimal_at(table, row, ROTH_IRA),
            gespp: decimal_at(table, row, GESPP),
            vanguard: decimal_at(table, row, VANGUARD),
            hsa: decimal_at(table, row, HSA),
            cd: decimal_at(table, row, CD),
            total: decimal_at(table, row, TOTAL),
        })
        .collect()
}

fn expenditure_records(table: &WorksheetTable) -> Vec<Expenditure> {
    table
        .rows
        .iter()
        .map(|row| {
            Expenditure::new(
                timestamp_at(table, row, TIMESTAMP),
                decimal_at(table, row, AMOUNT),
                text_at(table, row, CATEGORIES),
                text_at(table, row, VENDOR),
                text_at(table, row, DESCRIPTION),
            )
        })
        .collect()
}
