use eframe::egui::{self, Color32, RichText, Ui};

use crate::chart::ChartMode;
use crate::data::loader::{CSV_EXTENSIONS, JSON_EXTENSIONS, PARQUET_EXTENSIONS, SPREADSHEET_EXTENSIONS};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – upload and graph options
// ---------------------------------------------------------------------------

/// Render the left sidebar.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Upload Your Dataset");
    ui.separator();

    ui.label("Upload your CSV or Excel file here:");
    if ui.button("Browse files…").clicked() {
        open_file_dialog(state);
    }
    if state.showing_demo {
        ui.label(RichText::new("No file uploaded, showing a demo dataset.").italics());
    } else if state.has_data() {
        ui.label(RichText::new(state.dataset.source_name()).monospace());
    }

    if !state.has_data() {
        return;
    }

    ui.add_space(8.0);
    ui.heading("Graph Options");
    ui.separator();

    let columns = state.dataset.column_names();

    ui.strong("Select X-axis");
    if let Some(col) = column_picker(ui, "x_axis", state.x_axis.as_deref(), &columns) {
        state.set_x_axis(col);
    }

    ui.strong("Select Y-axis");
    if let Some(col) = column_picker(ui, "y_axis", state.y_axis.as_deref(), &columns) {
        state.set_y_axis(col);
    }

    ui.strong("Choose Graph Type");
    let mut picked_mode = None;
    egui::ComboBox::from_id_salt("chart_mode")
        .selected_text(state.chart_mode.label())
        .show_ui(ui, |ui: &mut Ui| {
            for mode in ChartMode::ALL {
                if ui
                    .selectable_label(state.chart_mode == mode, mode.label())
                    .clicked()
                {
                    picked_mode = Some(mode);
                }
            }
        });
    if let Some(mode) = picked_mode {
        state.set_chart_mode(mode);
    }

    ui.separator();
    match (&state.y_axis, state.average) {
        (Some(y), Some(avg)) => {
            ui.label(RichText::new(format!("Average {y}: {avg:.2}")).strong());
            if let Some(view) = &state.numeric_y {
                ui.label(
                    RichText::new(format!(
                        "{} of {} rows numeric",
                        view.valid_count(),
                        state.dataset.n_rows()
                    ))
                    .weak(),
                );
            }
        }
        _ => {
            if let Some(warning) = &state.coerce_warning {
                ui.colored_label(Color32::from_rgb(230, 160, 0), format!("⚠ {warning}"));
            }
        }
    }
}

/// Combo box over the column names. Returns the newly picked column.
fn column_picker(ui: &mut Ui, id: &str, current: Option<&str>, columns: &[String]) -> Option<String> {
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.unwrap_or_default())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for col in columns {
                if ui
                    .selectable_label(current == Some(col.as_str()), col)
                    .clicked()
                {
                    picked = Some(col.clone());
                }
            }
        });
    picked
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
            if ui
                .add_enabled(state.has_data(), egui::Button::new("Download CSV…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Show demo data").clicked() {
                state.show_demo();
                ui.close_menu();
            }
        });

        ui.separator();

        if state.has_data() {
            ui.label(format!(
                "{} rows × {} columns",
                state.dataset.n_rows(),
                state.dataset.n_cols()
            ));
        }

        if let Some(msg) = &state.error {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        } else if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(msg);
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let mut supported: Vec<&str> = Vec::new();
    supported.extend_from_slice(CSV_EXTENSIONS);
    supported.extend_from_slice(SPREADSHEET_EXTENSIONS);
    supported.extend_from_slice(PARQUET_EXTENSIONS);
    supported.extend_from_slice(JSON_EXTENSIONS);

    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("Supported files", supported.as_slice())
        .add_filter("CSV", CSV_EXTENSIONS)
        .add_filter("Excel", SPREADSHEET_EXTENSIONS)
        .add_filter("Parquet", PARQUET_EXTENSIONS)
        .add_filter("JSON", JSON_EXTENSIONS)
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download processed dataset")
        .set_file_name(state.export_file_name())
        .add_filter("CSV", CSV_EXTENSIONS)
        .save_file();

    if let Some(path) = file {
        state.save_csv(&path);
    }
}
