//! Derived aggregates behind each chart.
//!
//! Every function here is pure over already-validated data and is recomputed
//! on each render request. Loading bounds the absolute totals of Amount and
//! of the savings accounts, so the sums here cannot leave the decimal range.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::error::{CellKind, DataFormatError, ExplorerError, SelectionError};

use super::model::{Expenditure, SavingsRow, WorksheetTable};
use super::schema::{self, DATE, SAVINGS_ACCOUNTS};

/// Category label excluded from the monthly-average view (and only there).
pub const SENTINEL_CATEGORY: &str = "xxx";

/// How many entries the vendor and purchase rankings keep.
pub const TOP_N: usize = 20;

// ---------------------------------------------------------------------------
// Series over worksheet rows
// ---------------------------------------------------------------------------

/// One named numeric series. `points` are `(row index, value)` so a dropped
/// row keeps the remaining x positions aligned with the Date labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(usize, Decimal)>,
}

/// Several series sharing one row axis labelled by `x_labels[row]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSet {
    pub x_labels: Vec<String>,
    pub series: Vec<Series>,
}

/// Project Historical_Spending onto the chosen columns (in the caller's
/// order) and coerce every selected cell to a decimal.
///
/// All non-numeric cells of all selected columns are reported together.
pub fn historical_selection(
    table: &WorksheetTable,
    columns: &[String],
) -> Result<SeriesSet, ExplorerError> {
    if columns.is_empty() {
        return Err(SelectionError::Empty.into());
    }

    let mut indices = Vec::with_capacity(columns.len());
    for column in columns {
        let idx = table
            .column_index(column)
            .ok_or_else(|| SelectionError::UnknownColumn(column.clone()))?;
        indices.push(idx);
    }

    let issues: Vec<_> = indices
        .iter()
        .flat_map(|&idx| schema::invalid_cells(table, idx, CellKind::Decimal))
        .collect();
    if !issues.is_empty() {
        return Err(DataFormatError {
            worksheet: table.name.clone(),
            issues,
        }
        .into());
    }

    let series = columns
        .iter()
        .zip(&indices)
        .map(|(name, &idx)| Series {
            name: name.clone(),
            points: table
                .column(idx)
                .enumerate()
                .filter_map(|(row, cell)| super::model::parse_decimal(cell).map(|v| (row, v)))
                .collect(),
        })
        .collect();

    let x_labels = match table.column_index(DATE) {
        Some(idx) => table.column(idx).map(str::to_string).collect(),
        None => (1..=table.len()).map(|i| i.to_string()).collect(),
    };

    Ok(SeriesSet { x_labels, series })
}

/// Category choices offered for Historical_Spending: every column except
/// `Date`, sorted lexicographically.
pub fn historical_categories(table: &WorksheetTable) -> Vec<String> {
    let mut choices: Vec<String> = table
        .headers
        .iter()
        .filter(|h| h.as_str() != DATE)
        .cloned()
        .collect();
    choices.sort();
    choices.dedup();
    choices
}

/// The six account series plus `sum`, with the first (opening) row dropped.
pub fn savings_breakdown(rows: &[SavingsRow]) -> SeriesSet {
    let accounts: [fn(&SavingsRow) -> Decimal; 6] = [
        |r| r.k401,
        |r| r.roth_ira,
        |r| r.gespp,
        |r| r.vanguard,
        |r| r.hsa,
        |r| r.cd,
    ];

    let kept = || rows.iter().enumerate().skip(1);

    let mut series: Vec<Series> = SAVINGS_ACCOUNTS
        .iter()
        .zip(accounts)
        .map(|(name, value)| Series {
            name: name.to_string(),
            points: kept().map(|(i, r)| (i, value(r))).collect(),
        })
        .collect();
    series.push(Series {
        name: "sum".to_string(),
        points: kept().map(|(i, r)| (i, r.sum())).collect(),
    });

    SeriesSet {
        x_labels: rows.iter().map(|r| r.date.clone()).collect(),
        series,
    }
}

/// The `Total` column as a plain time series.
pub fn total_savings(rows: &[SavingsRow]) -> SeriesSet {
    SeriesSet {
        x_labels: rows.iter().map(|r| r.date.clone()).collect(),
        series: vec![Series {
            name: schema::TOTAL.to_string(),
            points: rows.iter().enumerate().map(|(i, r)| (i, r.total)).collect(),
        }],
    }
}

// ---------------------------------------------------------------------------
// Group-by over expenditures
// ---------------------------------------------------------------------------

/// Sum of Amount per calendar year, ascending by year.
pub fn yearly_totals(records: &[Expenditure]) -> Vec<(i32, Decimal)> {
    let mut totals: BTreeMap<i32, Decimal> = BTreeMap::new();
    for r in records {
        *totals.entry(r.year).or_default() += r.amount;
    }
    totals.into_iter().collect()
}

/// Sum of Amount per category, largest first.
pub fn category_totals(records: &[Expenditure]) -> Vec<(String, Decimal)> {
    ranked_sums(records, |r| &r.category)
}

/// The `TOP_N` vendors by total spend.
pub fn top_vendors(records: &[Expenditure]) -> Vec<(String, Decimal)> {
    let mut ranked = ranked_sums(records, |r| &r.vendor);
    ranked.truncate(TOP_N);
    ranked
}

/// The `TOP_N` purchase descriptions by total spend.
pub fn top_descriptions(records: &[Expenditure]) -> Vec<(String, Decimal)> {
    let mut ranked = ranked_sums(records, |r| &r.description);
    ranked.truncate(TOP_N);
    ranked
}

/// Sum Amount per key, sorted descending. Groups start in order of first
/// appearance and the sort is stable, so ties keep that order.
fn ranked_sums<F>(records: &[Expenditure], key: F) -> Vec<(String, Decimal)>
where
    F: Fn(&Expenditure) -> &String,
{
    let mut groups: Vec<(String, Decimal)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for r in records {
        let k = key(r);
        match positions.get(k.as_str()) {
            Some(&pos) => groups[pos].1 += r.amount,
            None => {
                positions.insert(k.as_str(), groups.len());
                groups.push((k.clone(), r.amount));
            }
        }
    }

    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
}

/// One row of a flattened two-key group-by, e.g. (Food, 2022, 15.00).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedRow<K> {
    pub category: String,
    pub key: K,
    pub value: Decimal,
}

/// Sum of Amount per (category, year), ordered by category then year.
pub fn category_year_totals(records: &[Expenditure]) -> Vec<GroupedRow<i32>> {
    let mut sums: BTreeMap<(String, i32), Decimal> = BTreeMap::new();
    for r in records {
        *sums.entry((r.category.clone(), r.year)).or_default() += r.amount;
    }
    sums.into_iter()
        .map(|((category, key), value)| GroupedRow {
            category,
            key,
            value,
        })
        .collect()
}

/// Mean Amount per (category, month), ordered by category then month.
/// Records in the sentinel category are left out.
pub fn category_month_averages(records: &[Expenditure]) -> Vec<GroupedRow<u32>> {
    let mut acc: BTreeMap<(String, u32), (Decimal, u32)> = BTreeMap::new();
    for r in records.iter().filter(|r| r.category != SENTINEL_CATEGORY) {
        let entry = acc.entry((r.category.clone(), r.month)).or_default();
        entry.0 += r.amount;
        entry.1 += 1;
    }
    acc.into_iter()
        .map(|((category, key), (sum, count))| GroupedRow {
            category,
            key,
            value: sum / Decimal::from(count),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::data::model::parse_timestamp;
    use crate::data::schema::tests::table;

    fn exp(ts: &str, amount: Decimal, category: &str, vendor: &str) -> Expenditure {
        Expenditure::new(
            parse_timestamp(ts).unwrap(),
            amount,
            category,
            vendor,
            format!("{vendor} purchase"),
        )
    }

    fn worked_example() -> Vec<Expenditure> {
        vec![
            exp("2022-01-05", dec!(10.00), "Food", "A"),
            exp("2022-06-01", dec!(5.00), "Food", "B"),
            exp("2023-02-01", dec!(20.00), "Rent", "C"),
        ]
    }

    fn savings(values: [Decimal; 7]) -> SavingsRow {
        SavingsRow {
            date: "d".into(),
            k401: values[0],
            roth_ira: values[1],
            gespp: values[2],
            vanguard: values[3],
            hsa: values[4],
            cd: values[5],
            total: values[6],
        }
    }

    #[test]
    fn yearly_and_category_totals_worked_example() {
        let records = worked_example();
        assert_eq!(
            yearly_totals(&records),
            vec![(2022, dec!(15.00)), (2023, dec!(20.00))]
        );
        assert_eq!(
            category_totals(&records),
            vec![("Rent".to_string(), dec!(20.00)), ("Food".to_string(), dec!(15.00))]
        );
    }

    #[test]
    fn yearly_and_category_totals_agree() {
        let mut records = worked_example();
        records.push(exp("2021-12-31", dec!(7.25), "Travel", "D"));
        records.push(exp("2023-03-03", dec!(-2.50), "Food", "A"));
        records.push(exp("2024-08-08", dec!(99.99), "xxx", "E"));

        let by_year: Decimal = yearly_totals(&records).iter().map(|(_, v)| *v).sum();
        let by_category: Decimal = category_totals(&records).iter().map(|(_, v)| *v).sum();
        let total: Decimal = records.iter().map(|r| r.amount).sum();
        assert_eq!(by_year, total);
        assert_eq!(by_category, total);
    }

    #[test]
    fn ties_keep_first_appearance_order() {
        let records = vec![
            exp("2022-01-01", dec!(5), "Zoo", "Z"),
            exp("2022-01-02", dec!(9), "Big", "B"),
            exp("2022-01-03", dec!(5), "Apple", "A"),
        ];
        let names: Vec<String> = category_totals(&records).into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["Big", "Zoo", "Apple"]);
    }

    #[test]
    fn top_vendors_is_bounded_and_descending() {
        let records: Vec<Expenditure> = (0..30)
            .map(|i| {
                exp(
                    "2022-03-01",
                    Decimal::from(i % 7),
                    "Misc",
                    &format!("vendor-{i}"),
                )
            })
            .collect();
        let top = top_vendors(&records);
        assert_eq!(top.len(), TOP_N);
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));

        let few = top_vendors(&worked_example());
        assert_eq!(few.len(), 3);
        assert_eq!(few[0], ("C".to_string(), dec!(20.00)));
    }

    #[test]
    fn top_descriptions_is_bounded_and_descending() {
        let records: Vec<Expenditure> = (0..30)
            .map(|i| exp("2022-03-01", Decimal::from(i % 7), "Misc", &format!("item-{i}")))
            .collect();
        let top = top_descriptions(&records);
        assert_eq!(top.len(), TOP_N);
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(top[0], ("item-6 purchase".to_string(), dec!(6)));
    }

    #[test]
    fn vendor_ties_keep_first_appearance_order() {
        let records = vec![
            exp("2022-01-01", dec!(3), "Food", "Kiosk"),
            exp("2022-01-02", dec!(8), "Rent", "Landlord"),
            exp("2022-01-03", dec!(1), "Food", "Bakery"),
            exp("2022-01-04", dec!(2), "Food", "Bakery"),
            exp("2022-01-05", dec!(3), "Fun", "Arcade"),
        ];
        assert_eq!(
            top_vendors(&records),
            vec![
                ("Landlord".to_string(), dec!(8)),
                ("Kiosk".to_string(), dec!(3)),
                ("Bakery".to_string(), dec!(3)),
                ("Arcade".to_string(), dec!(3)),
            ]
        );
    }

    #[test]
    fn top_descriptions_sum_repeated_purchases() {
        let mut records = worked_example();
        records.push(exp("2023-05-01", dec!(1.00), "Food", "B"));
        let top = top_descriptions(&records);
        assert_eq!(
            top,
            vec![
                ("C purchase".to_string(), dec!(20.00)),
                ("A purchase".to_string(), dec!(10.00)),
                ("B purchase".to_string(), dec!(6.00)),
            ]
        );
    }

    #[test]
    fn category_year_totals_flatten_in_key_order() {
        let mut records = worked_example();
        records.push(exp("2023-04-01", dec!(3.00), "Food", "A"));
        let rows = category_year_totals(&records);
        let flat: Vec<(&str, i32, Decimal)> = rows
            .iter()
            .map(|r| (r.category.as_str(), r.key, r.value))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("Food", 2022, dec!(15.00)),
                ("Food", 2023, dec!(3.00)),
                ("Rent", 2023, dec!(20.00)),
            ]
        );
    }

    #[test]
    fn monthly_averages_exclude_sentinel() {
        let records = vec![
            exp("2022-01-05", dec!(10), "Food", "A"),
            exp("2023-01-20", dec!(20), "Food", "B"),
            exp("2022-01-07", dec!(500), "xxx", "X"),
            exp("2022-02-07", dec!(4), "Fun", "F"),
        ];
        let rows = category_month_averages(&records);
        assert!(rows.iter().all(|r| r.category != SENTINEL_CATEGORY));
        assert_eq!(
            rows,
            vec![
                GroupedRow {
                    category: "Food".into(),
                    key: 1,
                    value: dec!(15)
                },
                GroupedRow {
                    category: "Fun".into(),
                    key: 2,
                    value: dec!(4)
                },
            ]
        );
    }

    #[test]
    fn sentinel_is_kept_everywhere_else() {
        let records = vec![exp("2022-01-07", dec!(500), "xxx", "X")];
        assert_eq!(category_totals(&records)[0].0, "xxx");
        assert_eq!(category_year_totals(&records)[0].category, "xxx");
    }

    #[test]
    fn savings_sum_is_the_four_account_formula() {
        let rows = vec![
            savings([dec!(1); 7]),
            savings([
                dec!(100),
                dec!(50),
                dec!(25),
                dec!(25),
                dec!(1000),
                dec!(500),
                dec!(1700),
            ]),
            savings([
                dec!(100),
                dec!(50),
                dec!(25),
                dec!(25),
                dec!(0),
                dec!(0),
                dec!(200),
            ]),
        ];
        let set = savings_breakdown(&rows);
        let names: Vec<&str> = set.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["401k", "Roth IRA", "GESPP", "Vangaurd", "HSA", "CD", "sum"]
        );
        let sum = &set.series[6];
        // first row dropped, later rows keep their original index
        assert_eq!(sum.points, vec![(1, dec!(200)), (2, dec!(200))]);
        assert_eq!(set.x_labels.len(), 3);
    }

    #[test]
    fn total_savings_keeps_every_row() {
        let rows = vec![savings([dec!(0); 7]), savings([dec!(3); 7])];
        let set = total_savings(&rows);
        assert_eq!(set.series.len(), 1);
        assert_eq!(set.series[0].points, vec![(0, dec!(0)), (1, dec!(3))]);
    }

    #[test]
    fn historical_selection_projects_and_coerces() {
        let t = table(
            "Historical_Spending",
            &[
                &["Date", "Rent", "Food", "Notes"],
                &["Jan", "900", "100.50", "n/a"],
                &["Feb", "950", "80", "n/a"],
            ],
        );
        let set = historical_selection(&t, &["Food".to_string(), "Rent".to_string()]).unwrap();
        assert_eq!(set.x_labels, vec!["Jan", "Feb"]);
        assert_eq!(set.series[0].name, "Food");
        assert_eq!(set.series[0].points, vec![(0, dec!(100.50)), (1, dec!(80))]);
        assert_eq!(set.series[1].points, vec![(0, dec!(900)), (1, dec!(950))]);

        assert_eq!(
            historical_categories(&t),
            vec!["Food", "Notes", "Rent"]
        );
    }

    #[test]
    fn historical_selection_errors() {
        let t = table(
            "Historical_Spending",
            &[&["Date", "Food", "Notes"], &["Jan", "1", "n/a"], &["Feb", "2", ""]],
        );
        assert!(matches!(
            historical_selection(&t, &[]),
            Err(ExplorerError::Selection(SelectionError::Empty))
        ));
        assert!(matches!(
            historical_selection(&t, &["Gas".to_string()]),
            Err(ExplorerError::Selection(SelectionError::UnknownColumn(_)))
        ));
        match historical_selection(&t, &["Notes".to_string()]) {
            Err(ExplorerError::Format(err)) => {
                assert_eq!(err.worksheet, "Historical_Spending");
                assert_eq!(err.issues.len(), 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
