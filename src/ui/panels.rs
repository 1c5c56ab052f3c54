use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::CsvDirectorySource;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – category multiselect
// ---------------------------------------------------------------------------

/// Render the left category panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Category");
    ui.separator();

    if state.data.is_none() {
        ui.label("No data loaded.");
        return;
    }

    let n_selected = state.selection.selected().len();
    let n_total = state.selection.available().len();
    ui.label(format!("{n_selected}/{n_total} selected"));

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });
    ui.separator();

    // Clone so the state can be mutated inside the loop.
    let available = state.selection.available().to_vec();
    let mut toggled: Option<String> = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for category in &available {
                let mut checked = state.selection.is_selected(category);
                if ui.checkbox(&mut checked, category.as_str()).changed() {
                    toggled = Some(category.clone());
                }
            }
        });

    if let Some(category) = toggled {
        state.toggle_category(&category);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        if ui.button("Refresh").clicked() {
            state.refresh();
        }

        ui.separator();
        ui.label(state.cache.describe());

        if let Some(data) = &state.data {
            ui.separator();
            ui.label(format!(
                "{} expenditures, {} savings rows",
                data.expenditures.len(),
                data.savings.len()
            ));
        }

        if let Some(at) = state.cache.loaded_at() {
            ui.separator();
            ui.label(format!(
                "loaded {} (load #{})",
                at.format("%Y-%m-%d %H:%M:%S"),
                state.cache.load_count()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

/// Let the user point the dashboard at a folder of worksheet CSV exports.
pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open folder with Historical_Spending.csv, Savings Totals.csv, Expenditures.csv")
        .pick_folder();

    if let Some(path) = folder {
        state.switch_source(Box::new(CsvDirectorySource::new(path)));
    }
}
