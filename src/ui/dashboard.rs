use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Dataset;
use crate::data::stats::ColumnSummary;
use crate::state::AppState;
use crate::ui::{panels, plot};

const ROW_HEIGHT: f32 = 20.0;
const TABLE_HEIGHT: f32 = 300.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the main dashboard area, or the welcome screen when nothing is loaded.
pub fn main_panel(ui: &mut Ui, state: &mut AppState) {
    if !state.has_data() {
        welcome(ui);
        return;
    }

    ui.heading(format!("{} Dashboard", state.dataset.title()));
    ui.separator();

    ui.heading("Dataset Overview");
    ui.label(
        RichText::new(format!(
            "Last refreshed on: {}",
            state.refreshed_on.format("%d %B %Y")
        ))
        .italics(),
    );
    ui.add_space(4.0);
    preview_table(ui, &state.dataset, state.config.preview_rows);

    ui.add_space(12.0);
    ui.heading("Summary Statistics");
    summary_grid(ui, &state.summary);

    ui.add_space(12.0);
    ui.heading("Graph Visualizations");
    ui.separator();
    match (&state.chart, &state.chart_error) {
        (Some(chart), _) => plot::chart_plot(ui, chart),
        (None, Some(e)) => {
            ui.colored_label(Color32::RED, format!("Unable to draw chart: {e}"));
        }
        (None, None) => {}
    }

    ui.add_space(12.0);
    if ui.button("Download Processed Dataset").clicked() {
        panels::save_file_dialog(state);
    }

    ui.add_space(16.0);
    ui.separator();
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new("Interactive Data Dashboard · built with egui").small().weak());
    });
}

fn welcome(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.heading("Interactive Data Dashboard");
        ui.add_space(8.0);
        ui.label("Welcome! Explore a dataset with tables, summary statistics and charts.");
        ui.add_space(8.0);
        ui.label(RichText::new("Upload a dataset from the sidebar to get started").strong());
        ui.label("Use CSV or Excel formats");
    });
}

/// First `limit` rows of the dataset.
fn preview_table(ui: &mut Ui, dataset: &Dataset, limit: usize) {
    let columns = dataset.columns();
    let n_rows = dataset.n_rows().min(limit);

    if n_rows < dataset.n_rows() {
        ui.label(
            RichText::new(format!("Showing the first {n_rows} of {} rows", dataset.n_rows()))
                .weak(),
        );
    }

    egui::ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(TableColumn::auto().at_least(40.0))
                .columns(TableColumn::auto().at_least(80.0).clip(true), columns.len())
                .min_scrolled_height(0.0)
                .max_scroll_height(TABLE_HEIGHT)
                .header(ROW_HEIGHT, |mut header| {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                    for column in columns {
                        header.col(|ui| {
                            ui.strong(column.name.as_str());
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, n_rows, |mut row| {
                        let index = row.index();
                        row.col(|ui| {
                            ui.label(RichText::new(index.to_string()).weak());
                        });
                        for column in columns {
                            row.col(|ui| {
                                let cell = &column.values[index];
                                if cell.is_null() {
                                    ui.label(RichText::new(cell.to_string()).weak());
                                } else {
                                    ui.label(cell.to_string());
                                }
                            });
                        }
                    });
                });
        });
}

fn summary_grid(ui: &mut Ui, summary: &[ColumnSummary]) {
    egui::ScrollArea::horizontal()
        .id_salt("summary_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("summary_grid")
                .striped(true)
                .num_columns(9)
                .spacing([16.0, 4.0])
                .show(ui, |ui: &mut Ui| {
                    for title in [
                        "column", "type", "count", "nulls", "unique", "mean", "std", "min", "max",
                    ] {
                        ui.strong(title);
                    }
                    ui.end_row();

                    for s in summary {
                        ui.label(s.name.as_str());
                        ui.label(s.kind.to_string());
                        ui.label(s.non_null.to_string());
                        ui.label(s.nulls.to_string());
                        ui.label(s.distinct.to_string());
                        match &s.numeric {
                            Some(n) => {
                                ui.label(format!("{:.2}", n.mean));
                                ui.label(n.std.map_or("-".to_string(), |v| format!("{v:.2}")));
                                ui.label(format!("{:.2}", n.min));
                                ui.label(format!("{:.2}", n.max));
                            }
                            None => {
                                for _ in 0..4 {
                                    ui.label("-");
                                }
                            }
                        }
                        ui.end_row();
                    }
                });
        });
}
