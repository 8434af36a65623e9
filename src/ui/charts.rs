use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};
use egui_extras::{Column, TableBuilder};

use crate::data::export::EXPORT_COLUMNS;
use crate::data::model::PaperSet;
use crate::state::AppState;

/// How many of the top title words the chart shows.
const WORD_CHART_LIMIT: usize = 20;

/// How many filtered rows the sample table shows.
const SAMPLE_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Central dashboard
// ---------------------------------------------------------------------------

/// Render the central dashboard: summary metrics, charts, and sample table.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a metadata file to explore papers  (File → Open…)");
        });
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            summary_row(ui, state);
            ui.separator();

            if state.visible_indices.is_empty() {
                ui.label("No papers match the current filters.");
                return;
            }

            ui.heading("Publications by year");
            year_chart(ui, state);
            ui.separator();

            ui.heading("Top journals");
            journal_ranking(ui, state);

            if !state.aggregates.source_distribution.is_empty() {
                ui.separator();
                ui.heading("Papers by source");
                ranking_chart(
                    ui,
                    "source_chart",
                    "Papers",
                    &state.aggregates.source_distribution,
                    |_| Color32::LIGHT_BLUE,
                );
            }

            if !state.aggregates.word_counts.is_empty() {
                ui.separator();
                ui.heading("Frequent title words");
                let words: Vec<(String, usize)> = state
                    .aggregates
                    .word_counts
                    .iter()
                    .take(WORD_CHART_LIMIT)
                    .cloned()
                    .collect();
                ranking_chart(ui, "word_chart", "Occurrences", &words, |_| {
                    Color32::LIGHT_GREEN
                });
            }

            ui.separator();
            ui.heading("Sample papers");
            sample_table(ui, dataset, &state.visible_indices);
        });
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

fn summary_row(ui: &mut Ui, state: &AppState) {
    let agg = &state.aggregates;
    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Total papers", &agg.total.to_string());
        metric(ui, "Unique journals", &agg.unique_journals.to_string());
        metric(
            ui,
            "Year range",
            &format!("{} – {}", state.selection.year_min, state.selection.year_max),
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.strong(RichText::new(value).size(20.0));
    });
    ui.add_space(24.0);
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Line chart of papers per year over the requested range.
fn year_chart(ui: &mut Ui, state: &AppState) {
    let points: PlotPoints = state
        .aggregates
        .year_histogram
        .iter()
        .map(|&(year, count)| [year as f64, count as f64])
        .collect();

    Plot::new("year_chart")
        .height(220.0)
        .x_axis_label("Year")
        .y_axis_label("Papers")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("papers").width(2.0));
        });
}

fn journal_ranking(ui: &mut Ui, state: &AppState) {
    let color_map = state.color_map.clone();
    ranking_chart(
        ui,
        "journal_chart",
        "Papers",
        &state.aggregates.top_journals,
        move |journal| color_map.color_for(journal),
    );
}

/// Horizontal bar chart of `(label, count)` entries, best-ranked on top.
fn ranking_chart(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    entries: &[(String, usize)],
    color_for: impl Fn(&str) -> Color32,
) {
    let n = entries.len();
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(rank, (label, count))| {
            Bar::new((n - 1 - rank) as f64, *count as f64)
                .name(label)
                .fill(color_for(label.as_str()))
        })
        .collect();

    // Axis labels indexed by bar position (rank order reversed).
    let labels: Vec<String> = entries.iter().rev().map(|(l, _)| l.clone()).collect();

    Plot::new(id.to_string())
        .height(28.0 * n as f32 + 40.0)
        .x_axis_label(x_label.to_string())
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .y_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 0.01 || idx < 0.0 {
                return String::new();
            }
            labels
                .get(idx as usize)
                .cloned()
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Sample table
// ---------------------------------------------------------------------------

/// First rows of the filtered view, same columns as the CSV export.
fn sample_table(ui: &mut Ui, dataset: &PaperSet, visible: &[usize]) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::remainder().at_least(240.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(48.0))
        .column(Column::auto().at_least(90.0))
        .header(20.0, |mut header| {
            for name in EXPORT_COLUMNS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|mut body| {
            for &i in visible.iter().take(SAMPLE_ROWS) {
                let paper = &dataset.papers[i];
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&paper.title);
                    });
                    row.col(|ui| {
                        ui.label(&paper.journal);
                    });
                    row.col(|ui| {
                        ui.label(paper.year.to_string());
                    });
                    row.col(|ui| {
                        ui.label(paper.publish_time.format("%Y-%m-%d").to_string());
                    });
                });
            }
        });
}
