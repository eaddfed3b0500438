use super::model::{CellValue, Column, Dataset};
use crate::error::CoerceError;

// ---------------------------------------------------------------------------
// NumericView – a column reinterpreted as numbers
// ---------------------------------------------------------------------------

/// Best-effort numeric reading of one column. Kept next to the dataset
/// instead of being written into it, so selecting a column twice never
/// changes what the user loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericView {
    pub column: String,
    /// One entry per row; `None` where the cell is not a number.
    pub values: Vec<Option<f64>>,
}

impl NumericView {
    /// Number of rows that produced a number.
    pub fn valid_count(&self) -> usize {
        self.values.iter().flatten().count()
    }

    /// Arithmetic mean of the non-null values.
    pub fn mean(&self) -> Option<f64> {
        let (sum, n) = self
            .values
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    /// Mean, or an error when there is nothing to average.
    pub fn average(&self) -> Result<f64, CoerceError> {
        self.mean()
            .ok_or_else(|| CoerceError::NoNumericValues(self.column.clone()))
    }
}

/// Numeric reading of a single cell.
///
/// Numbers pass through, booleans count as 1/0, strings are parsed after
/// trimming; NaN, dates and anything unparseable give `None`.
pub fn to_numeric(cell: &CellValue) -> Option<f64> {
    let v = match cell {
        CellValue::Integer(i) => *i as f64,
        CellValue::Float(f) => *f,
        CellValue::Bool(b) => f64::from(u8::from(*b)),
        CellValue::String(s) => s.trim().parse::<f64>().ok()?,
        CellValue::Date(_) | CellValue::DateTime(_) | CellValue::Null => return None,
    };
    (!v.is_nan()).then_some(v)
}

pub fn numeric_values(column: &Column) -> Vec<Option<f64>> {
    column.values.iter().map(to_numeric).collect()
}

/// Coerce the named column of `dataset` to numbers.
pub fn coerce_column(dataset: &Dataset, column: &str) -> Result<NumericView, CoerceError> {
    let col = dataset
        .column(column)
        .ok_or_else(|| CoerceError::UnknownColumn(column.to_string()))?;
    Ok(NumericView {
        column: column.to_string(),
        values: numeric_values(col),
    })
}

/// The dataset with the view's column replaced by its numeric form:
/// integer cells stay integers, other numbers become floats and the rest
/// become null. Re-coercing the result yields the same view.
pub fn processed_dataset(dataset: &Dataset, view: &NumericView) -> Dataset {
    let Some(original) = dataset.column(&view.column) else {
        return dataset.clone();
    };
    let cells = original
        .values
        .iter()
        .zip(&view.values)
        .map(|(cell, value)| match (cell, value) {
            (_, None) => CellValue::Null,
            (CellValue::Integer(i), Some(_)) => CellValue::Integer(*i),
            (_, Some(v)) => CellValue::Float(*v),
        })
        .collect();
    dataset
        .with_column_values(&view.column, cells)
        .unwrap_or_else(|| dataset.clone())
}
