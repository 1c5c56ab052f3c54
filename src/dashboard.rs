use std::collections::BTreeSet;
use std::fmt::Display;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::data::aggregate::{self, GroupedRow, SeriesSet};
use crate::data::model::FinanceData;
use crate::data::selection::CategorySelection;
use crate::error::ExplorerError;

// ---------------------------------------------------------------------------
// Chart data, ready for the plot widgets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    /// `[x, y]` where x is the row index into `LineChart::x_labels`.
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub x_labels: Vec<String>,
    pub series: Vec<LineSeries>,
}

/// One bar per label.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// One cluster per category, one bar per hue key inside each cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBarChart {
    pub categories: Vec<String>,
    pub hue_title: &'static str,
    pub hues: Vec<String>,
    /// `(category index, hue index, value)`.
    pub bars: Vec<(usize, usize, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Lines(LineChart),
    Bars(BarChart),
    GroupedBars(GroupedBarChart),
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Panel {
    pub id: &'static str,
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub data: Result<ChartData, ExplorerError>,
}

impl Panel {
    fn new(
        id: &'static str,
        title: impl Into<String>,
        x_label: &'static str,
        y_label: &'static str,
        data: Result<ChartData, ExplorerError>,
    ) -> Self {
        Panel {
            id,
            title: title.into(),
            x_label,
            y_label,
            data,
        }
    }
}

/// Build every panel, in display order, for one render request.
pub fn build_panels(data: &FinanceData, selection: &CategorySelection) -> Vec<Panel> {
    let records = &data.expenditures;
    log::debug!(
        "Rebuilding panels for {} expenditures, categories {:?}",
        records.len(),
        selection.selected()
    );

    vec![
        Panel::new(
            "historical_spending",
            format!("Historical  {}", selection.selected().join(", ")),
            "",
            "",
            aggregate::historical_selection(&data.historical, selection.selected()).map(lines),
        ),
        Panel::new(
            "historical_savings",
            "Historical  Savings",
            "",
            "",
            Ok(lines(aggregate::savings_breakdown(&data.savings))),
        ),
        Panel::new(
            "total_savings",
            "Total Savings",
            "time",
            "$",
            Ok(lines(aggregate::total_savings(&data.savings))),
        ),
        Panel::new(
            "yearly_spending",
            "Yearly Spending",
            "year",
            "$",
            Ok(bars(aggregate::yearly_totals(records))),
        ),
        Panel::new(
            "spending_by_category",
            "Yearly Spending By Category",
            "Category",
            "$",
            Ok(bars(aggregate::category_totals(records))),
        ),
        Panel::new(
            "category_by_year",
            "Spending by Category and Year",
            "Category",
            "$",
            Ok(grouped(aggregate::category_year_totals(records), "year")),
        ),
        Panel::new(
            "category_by_month",
            "Average Monthly Spending by Category",
            "Category",
            "$",
            Ok(grouped(aggregate::category_month_averages(records), "month")),
        ),
        Panel::new(
            "top_vendors",
            "Total Cost by Vendor",
            "Vendor",
            "$",
            Ok(bars(aggregate::top_vendors(records))),
        ),
        Panel::new(
            "top_purchases",
            "Most Expensive Purchases",
            "Purchase",
            "$",
            Ok(bars(aggregate::top_descriptions(records))),
        ),
    ]
}

// ---------------------------------------------------------------------------
// Aggregate → chart conversions
// ---------------------------------------------------------------------------

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

fn lines(set: SeriesSet) -> ChartData {
    ChartData::Lines(LineChart {
        x_labels: set.x_labels,
        series: set
            .series
            .into_iter()
            .map(|s| LineSeries {
                name: s.name,
                points: s
                    .points
                    .into_iter()
                    .map(|(x, y)| [x as f64, to_f64(y)])
                    .collect(),
            })
            .collect(),
    })
}

fn bars<K: Display>(entries: Vec<(K, Decimal)>) -> ChartData {
    let (labels, values) = entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), to_f64(v)))
        .unzip();
    ChartData::Bars(BarChart { labels, values })
}

fn grouped<K: Ord + Display + Copy>(rows: Vec<GroupedRow<K>>, hue_title: &'static str) -> ChartData {
    // Rows arrive ordered by category, so dedup keeps them sorted.
    let mut categories: Vec<String> = rows.iter().map(|r| r.category.clone()).collect();
    categories.dedup();
    let hue_keys: Vec<K> = rows
        .iter()
        .map(|r| r.key)
        .collect::<BTreeSet<K>>()
        .into_iter()
        .collect();

    let bars = rows
        .iter()
        .filter_map(|r| {
            let c = categories.iter().position(|c| *c == r.category)?;
            let h = hue_keys.iter().position(|k| *k == r.key)?;
            Some((c, h, to_f64(r.value)))
        })
        .collect();

    ChartData::GroupedBars(GroupedBarChart {
        categories,
        hue_title,
        hues: hue_keys.iter().map(|k| k.to_string()).collect(),
        bars,
    })
}
