use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints};

use crate::color::{SeriesColors, BAR_COLOR};
use crate::dashboard::{self, ChartData, GroupedBarChart, LineChart, Panel};
use crate::error::{ExplorerError, SelectionError};
use crate::state::AppState;

/// Total width of a cluster of grouped bars, in x units.
const CLUSTER_WIDTH: f64 = 0.8;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render every panel, top to bottom, in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.panels.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data to chart. Fix the source and press Refresh.");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for panel in &state.panels {
                ui.heading(RichText::new(&panel.title).size(24.0));
                match &panel.data {
                    Ok(data) => chart(ui, panel, data, state.chart_height),
                    Err(ExplorerError::Selection(SelectionError::Empty)) => {
                        ui.label("Select one or more categories on the left.");
                    }
                    Err(e) => {
                        ui.label(RichText::new(format!("Error: {e}")).color(Color32::RED));
                    }
                }
                ui.add_space(16.0);
                ui.separator();
            }
        });
}

fn chart(ui: &mut Ui, panel: &Panel, data: &ChartData, height: f32) {
    match data {
        ChartData::Lines(lines) => line_chart(ui, panel, lines, height),
        ChartData::Bars(bars) => bar_chart(ui, panel, bars, height),
        ChartData::GroupedBars(grouped) => grouped_bar_chart(ui, panel, grouped, height),
    }
}

fn base_plot(panel: &Panel, height: f32) -> Plot {
    Plot::new(panel.id)
        .height(height)
        .legend(Legend::default())
        .x_axis_label(panel.x_label)
        .y_axis_label(panel.y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
        // The page scrolls; the plots don't.
        .allow_scroll(false)
}

// ---------------------------------------------------------------------------
// Line charts (row index on x, labelled by the Date column)
// ---------------------------------------------------------------------------

fn line_chart(ui: &mut Ui, panel: &Panel, chart: &LineChart, height: f32) {
    let colors = SeriesColors::new(chart.series.iter().map(|s| s.name.as_str()));
    let axis_labels = chart.x_labels.clone();
    let hover_labels = chart.x_labels.clone();

    base_plot(panel, height)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&axis_labels, mark.value)
        })
        .label_formatter(move |name: &str, point: &PlotPoint| {
            let x = category_label(&hover_labels, point.x.round());
            if name.is_empty() {
                format!("{x}\n{:.2}", point.y)
            } else {
                format!("{name}\n{x}\n{:.2}", point.y)
            }
        })
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let points: PlotPoints = series.points.iter().copied().collect();
                plot_ui.line(
                    Line::new(points)
                        .name(&series.name)
                        .color(colors.color_for(&series.name))
                        .width(1.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Bar charts (categorical x axis)
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, panel: &Panel, chart: &dashboard::BarChart, height: f32) {
    let labels = chart.labels.clone();
    let bars: Vec<Bar> = chart
        .labels
        .iter()
        .zip(&chart.values)
        .enumerate()
        .map(|(i, (label, &value))| Bar::new(i as f64, value).width(0.6).name(label))
        .collect();

    base_plot(panel, height)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name(panel.y_label));
        });
}

/// One cluster per category; within it, one bar per hue key, side by side.
fn grouped_bar_chart(ui: &mut Ui, panel: &Panel, chart: &GroupedBarChart, height: f32) {
    let labels = chart.categories.clone();
    let colors = SeriesColors::new(chart.hues.iter().map(String::as_str));
    let n_hues = chart.hues.len().max(1);
    let bar_width = CLUSTER_WIDTH / n_hues as f64;

    let charts: Vec<BarChart> = chart
        .hues
        .iter()
        .enumerate()
        .map(|(h, hue)| {
            let bars = chart
                .bars
                .iter()
                .filter(|(_, bar_hue, _)| *bar_hue == h)
                .map(|&(c, _, value)| {
                    Bar::new(bar_offset(c, h, n_hues), value)
                        .width(bar_width)
                        .name(format!("{} / {} {hue}", chart.categories[c], chart.hue_title))
                })
                .collect();
            BarChart::new(bars)
                .color(colors.color_for(hue))
                .name(format!("{} {hue}", chart.hue_title))
        })
        .collect();

    base_plot(panel, height)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            for c in charts {
                plot_ui.bar_chart(c);
            }
        });
}

/// Centre of the `hue`-th bar inside the cluster for `category`.
fn bar_offset(category: usize, hue: usize, n_hues: usize) -> f64 {
    let width = CLUSTER_WIDTH / n_hues as f64;
    category as f64 - CLUSTER_WIDTH / 2.0 + width * (hue as f64 + 0.5)
}

/// Axis label for a grid mark: only whole positions that map to a label.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn labels_only_on_whole_positions() {
        let labels = vec!["Food".to_string(), "Rent".to_string()];
        assert_eq!(category_label(&labels, 0.0), "Food");
        assert_eq!(category_label(&labels, 1.0), "Rent");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn clustered_bars_stay_inside_their_cluster() {
        let expected = [1.7, 1.9, 2.1, 2.3];
        for (h, want) in expected.iter().enumerate() {
            assert!((bar_offset(2, h, 4) - want).abs() < 1e-9);
        }
        assert!(bar_offset(0, 0, 1).abs() < 1e-9);
    }
}
