use std::path::Path;

use anyhow::{Context, Result};

use super::loader::UTF8_BOM;
use super::model::{format_float, CellValue, Dataset, DATETIME_FORMAT, DATE_FORMAT};

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Serialize a dataset as UTF-8 CSV: byte-order mark, header row, no index
/// column. The mark lets the loader (and spreadsheet apps) tell the file is
/// UTF-8 whatever encoding they would otherwise assume.
pub fn to_csv_bytes(dataset: &Dataset) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(dataset.columns().iter().map(|c| c.name.as_str()))?;

    for row in 0..dataset.n_rows() {
        writer.write_record(
            dataset
                .columns()
                .iter()
                .map(|c| csv_field(&c.values[row])),
        )?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// `Demo Data.csv` for `demo_data.csv`.
pub fn export_file_name(dataset: &Dataset) -> String {
    format!("{}.csv", dataset.title())
}

/// Write the CSV export to `path`.
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(dataset).context("serializing CSV")?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "Exported {} rows to {}",
        dataset.n_rows(),
        path.display()
    );
    Ok(())
}

fn csv_field(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        CellValue::Float(v) => format_float(*v),
        CellValue::Date(d) => d.format(DATE_FORMAT).to_string(),
        CellValue::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        other => other.to_string(),
    }
}
