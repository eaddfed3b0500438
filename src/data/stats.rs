use std::collections::HashSet;

use super::coerce::numeric_values;
use super::model::{Column, ColumnKind, Dataset};

/// Describe-style numbers for a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    pub non_null: usize,
    pub nulls: usize,
    pub distinct: usize,
    pub numeric: Option<NumericSummary>,
}

/// One summary per column, in column order.
pub fn summarize(dataset: &Dataset) -> Vec<ColumnSummary> {
    dataset.columns().iter().map(summarize_column).collect()
}

pub fn summarize_column(column: &Column) -> ColumnSummary {
    let kind = column.kind();
    let nulls = column.values.iter().filter(|v| v.is_null()).count();
    let distinct = column
        .values
        .iter()
        .filter(|v| !v.is_null())
        .collect::<HashSet<_>>()
        .len();

    let numeric = if kind.is_numeric() {
        let values: Vec<f64> = numeric_values(column).into_iter().flatten().collect();
        numeric_summary(&values)
    } else {
        None
    };

    ColumnSummary {
        name: column.name.clone(),
        kind,
        non_null: column.len() - nulls,
        nulls,
        distinct,
        numeric,
    }
}

fn numeric_summary(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.len() > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    });
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(NumericSummary {
        mean,
        std,
        min,
        max,
    })
}
