use std::path::Path;

use anyhow::Context;
use eframe::egui::{self, Color32, ComboBox, RichText, Slider, Ui};

use crate::data::export;
use crate::data::filter::JournalFilter;
use crate::data::model::PaperSet;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone the Arc so we can mutate state inside the widget closures.
    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };
    let Some((data_min, data_max)) = dataset.year_range() else {
        ui.label("Dataset has no rows.");
        return;
    };

    ui.strong("Year range");
    let mut year_min = state.selection.year_min;
    let mut year_max = state.selection.year_max;
    let min_changed = ui
        .add(Slider::new(&mut year_min, data_min..=data_max).text("from"))
        .changed();
    let max_changed = ui
        .add(Slider::new(&mut year_max, data_min..=data_max).text("to"))
        .changed();
    if min_changed || max_changed {
        state.set_year_range(year_min, year_max);
    }

    ui.separator();

    ui.strong("Journal");
    let current = state.selection.journal.label().to_string();
    ComboBox::from_id_salt("journal_filter")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            let all_selected = state.selection.journal == JournalFilter::All;
            if ui.selectable_label(all_selected, "All").clicked() {
                state.set_journal(JournalFilter::All);
            }
            for journal in &dataset.journals {
                let selected =
                    matches!(&state.selection.journal, JournalFilter::Only(j) if j == journal);
                if ui.selectable_label(selected, journal).clicked() {
                    state.set_journal(JournalFilter::Only(journal.clone()));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export CSV…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(set) = &state.dataset {
            ui.label(format!(
                "{} papers loaded, {} matching",
                set.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open paper metadata")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_from_path(&path);
    }
}

fn export_dialog(state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export filtered papers")
        .set_file_name(export::export_filename(&state.selection))
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match write_export(&dataset, &state.visible_indices, &path) {
            Ok(()) => {
                log::info!(
                    "exported {} papers to {}",
                    state.visible_indices.len(),
                    path.display()
                );
                state.status_message = None;
            }
            Err(e) => {
                log::error!("export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn write_export(set: &PaperSet, indices: &[usize], path: &Path) -> anyhow::Result<()> {
    let file =
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    export::write_csv(set, indices, file).context("writing CSV")?;
    Ok(())
}
