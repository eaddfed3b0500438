use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, Timelike};

use crate::data::coerce::numeric_values;
use crate::data::model::{CellValue, Column, Dataset};
use crate::error::ChartError;

// ---------------------------------------------------------------------------
// Chart mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    Line,
    Bar,
    Histogram,
    Pie,
}

impl ChartMode {
    pub const ALL: [ChartMode; 4] = [
        ChartMode::Line,
        ChartMode::Bar,
        ChartMode::Histogram,
        ChartMode::Pie,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartMode::Line => "Line Chart",
            ChartMode::Bar => "Bar Chart",
            ChartMode::Histogram => "Histogram",
            ChartMode::Pie => "Pie Chart",
        }
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Chart description
// ---------------------------------------------------------------------------

/// One (x, y) pair. `y` is `None` where the Y cell is not numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub x: CellValue,
    pub y: Option<f64>,
}

/// Equal-width bin over `[start, end)`; the last bin also holds `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Histogram {
    Numeric(Vec<NumericBin>),
    /// Count per distinct value, in order of first appearance.
    Categorical(Vec<(CellValue, usize)>),
}

impl Histogram {
    pub fn total(&self) -> usize {
        match self {
            Histogram::Numeric(bins) => bins.iter().map(|b| b.count).sum(),
            Histogram::Categorical(counts) => counts.iter().map(|(_, c)| c).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub value: CellValue,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    Line(Vec<SeriesPoint>),
    Bar(Vec<SeriesPoint>),
    Histogram(Histogram),
    Pie(Vec<PieSlice>),
}

/// Everything needed to draw a chart, independent of the plotting backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Build the chart for the selected mode and axes.
///
/// * Line – every row, in row order
/// * Bar – Y summed per distinct X, X in first-appearance order
/// * Histogram – distribution of X (Y is ignored)
/// * Pie – value counts of Y's original cells
pub fn build_chart(
    dataset: &Dataset,
    x: &str,
    y: &str,
    mode: ChartMode,
) -> Result<Chart, ChartError> {
    let column = |name: &str| {
        dataset
            .column(name)
            .ok_or_else(|| ChartError::UnknownColumn(name.to_string()))
    };

    let chart = match mode {
        ChartMode::Line => Chart {
            title: format!("Line Chart: {y} vs {x}"),
            x_label: x.to_string(),
            y_label: y.to_string(),
            kind: ChartKind::Line(series(column(x)?, column(y)?)),
        },
        ChartMode::Bar => Chart {
            title: format!("Bar Chart: {y} vs {x}"),
            x_label: x.to_string(),
            y_label: y.to_string(),
            kind: ChartKind::Bar(summed_by_x(series(column(x)?, column(y)?))),
        },
        ChartMode::Histogram => Chart {
            title: format!("Histogram: {x}"),
            x_label: x.to_string(),
            y_label: "count".to_string(),
            kind: ChartKind::Histogram(histogram(column(x)?)),
        },
        ChartMode::Pie => Chart {
            title: format!("Pie Chart: Distribution of {y}"),
            x_label: String::new(),
            y_label: String::new(),
            kind: ChartKind::Pie(
                column(y)?
                    .value_counts()
                    .into_iter()
                    .map(|(value, count)| PieSlice { value, count })
                    .collect(),
            ),
        },
    };
    Ok(chart)
}

fn series(x: &Column, y: &Column) -> Vec<SeriesPoint> {
    x.values
        .iter()
        .zip(numeric_values(y))
        .map(|(x, y)| SeriesPoint { x: x.clone(), y })
        .collect()
}

/// Sum Y per distinct X, dropping rows with a null X or non-numeric Y.
fn summed_by_x(points: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    let mut index: HashMap<CellValue, usize> = HashMap::new();
    let mut out: Vec<SeriesPoint> = Vec::new();
    for point in points {
        let (Some(y), false) = (point.y, point.x.is_null()) else {
            continue;
        };
        match index.get(&point.x) {
            Some(&idx) => {
                if let Some(sum) = out[idx].y.as_mut() {
                    *sum += y;
                }
            }
            None => {
                index.insert(point.x.clone(), out.len());
                out.push(SeriesPoint { x: point.x, y: Some(y) });
            }
        }
    }
    out
}

fn histogram(column: &Column) -> Histogram {
    if column.kind().is_numeric() {
        let values: Vec<f64> = column.values.iter().filter_map(CellValue::as_f64).collect();
        return Histogram::Numeric(numeric_bins(&values));
    }

    let mut index: HashMap<&CellValue, usize> = HashMap::new();
    let mut counts: Vec<(CellValue, usize)> = Vec::new();
    for value in column.values.iter().filter(|v| !v.is_null()) {
        match index.get(value) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value.clone(), 1));
            }
        }
    }
    Histogram::Categorical(counts)
}

/// Equal-width bins, count chosen by Sturges' rule.
fn numeric_bins(values: &[f64]) -> Vec<NumericBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return vec![NumericBin {
            start: min - 0.5,
            end: max + 0.5,
            count: finite.len(),
        }];
    }

    let n_bins = (finite.len() as f64).log2().ceil() as usize + 1;
    let width = (max - min) / n_bins as f64;
    let mut bins: Vec<NumericBin> = (0..n_bins)
        .map(|i| NumericBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();
    for v in finite {
        let idx = (((v - min) / width).floor() as usize).min(n_bins - 1);
        bins[idx].count += 1;
    }
    bins
}

// ---------------------------------------------------------------------------
// X axis placement
// ---------------------------------------------------------------------------

/// How X values were mapped onto the plot's numeric axis.
#[derive(Debug, Clone, PartialEq)]
pub enum XScale {
    Numeric,
    /// Days since 0001-01-01 (fractional for datetimes).
    Days,
    /// Index into the category labels.
    Categories(Vec<String>),
}

impl XScale {
    /// Tick label for an axis position.
    pub fn tick_label(&self, position: f64) -> String {
        match self {
            XScale::Numeric => format!("{position}"),
            XScale::Days => NaiveDate::from_num_days_from_ce_opt(position.floor() as i32)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            XScale::Categories(labels) => {
                let rounded = position.round();
                if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
                    return String::new();
                }
                labels.get(rounded as usize).cloned().unwrap_or_default()
            }
        }
    }
}

/// Place X values on a numeric axis: numbers as-is, dates as day numbers,
/// anything else as category indices in order of first appearance.
/// Null X values get no position.
pub fn x_positions(xs: &[&CellValue]) -> (Vec<Option<f64>>, XScale) {
    let present = || xs.iter().filter(|v| !v.is_null());

    if present().all(|v| v.as_f64().is_some()) {
        return (xs.iter().map(|v| v.as_f64()).collect(), XScale::Numeric);
    }

    if present().all(|v| matches!(v, CellValue::Date(_) | CellValue::DateTime(_))) {
        let positions = xs
            .iter()
            .map(|v| match v {
                CellValue::Date(d) => Some(d.num_days_from_ce() as f64),
                CellValue::DateTime(dt) => Some(
                    dt.date().num_days_from_ce() as f64
                        + dt.time().num_seconds_from_midnight() as f64 / 86_400.0,
                ),
                _ => None,
            })
            .collect();
        return (positions, XScale::Days);
    }

    let mut labels: Vec<String> = Vec::new();
    let mut index: HashMap<&CellValue, usize> = HashMap::new();
    let positions = xs
        .iter()
        .map(|v| {
            if v.is_null() {
                return None;
            }
            let idx = *index.entry(*v).or_insert_with(|| {
                labels.push(v.to_string());
                labels.len() - 1
            });
            Some(idx as f64)
        })
        .collect();
    (positions, XScale::Categories(labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    #[test]
    fn test_line_chart_has_one_ordered_point_per_row() {
        let ds = Dataset::demo();
        let chart = build_chart(&ds, "Date", "Sales", ChartMode::Line).unwrap();
        assert_eq!(chart.title, "Line Chart: Sales vs Date");

        let ChartKind::Line(points) = chart.kind else {
            panic!("expected a line chart");
        };
        assert_eq!(points.len(), 10);
        let ys: Vec<f64> = points.iter().map(|p| p.y.unwrap()).collect();
        assert_eq!(
            ys,
            vec![120.0, 135.0, 160.0, 190.0, 210.0, 230.0, 250.0, 270.0, 300.0, 320.0]
        );
        assert_eq!(
            points[0].x,
            CellValue::Date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
        );
        assert_eq!(
            points[9].x,
            CellValue::Date(NaiveDate::from_ymd_opt(2023, 1, 10).unwrap())
        );
    }

    #[test]
    fn test_pie_counts_match_value_counts() {
        let ds = Dataset::demo();
        let chart = build_chart(&ds, "Date", "Category", ChartMode::Pie).unwrap();
        assert_eq!(chart.title, "Pie Chart: Distribution of Category");

        let ChartKind::Pie(slices) = chart.kind else {
            panic!("expected a pie chart");
        };
        assert_eq!(
            slices,
            vec![
                PieSlice { value: text("A"), count: 4 },
                PieSlice { value: text("B"), count: 3 },
                PieSlice { value: text("C"), count: 3 },
            ]
        );
        assert_eq!(slices.iter().map(|s| s.count).sum::<usize>(), 10);
    }

    #[test]
    fn test_bar_chart_sums_per_category() {
        let ds = Dataset::demo();
        let chart = build_chart(&ds, "Category", "Sales", ChartMode::Bar).unwrap();
        assert_eq!(chart.title, "Bar Chart: Sales vs Category");

        let ChartKind::Bar(bars) = chart.kind else {
            panic!("expected a bar chart");
        };
        assert_eq!(
            bars,
            vec![
                SeriesPoint { x: text("A"), y: Some(120.0 + 135.0 + 190.0 + 320.0) },
                SeriesPoint { x: text("B"), y: Some(160.0 + 210.0 + 230.0) },
                SeriesPoint { x: text("C"), y: Some(250.0 + 270.0 + 300.0) },
            ]
        );
    }

    #[test]
    fn test_histogram_of_numeric_column_bins_every_value() {
        let ds = Dataset::demo();
        let chart = build_chart(&ds, "Sales", "Sales", ChartMode::Histogram).unwrap();
        assert_eq!(chart.title, "Histogram: Sales");

        let ChartKind::Histogram(Histogram::Numeric(bins)) = &chart.kind else {
            panic!("expected numeric bins");
        };
        // Sturges: ceil(log2(10)) + 1
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0].start, 120.0);
        assert_eq!(bins[4].end, 320.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 10);
        // 320 lands in the last bin, not past it
        assert!(bins[4].count >= 1);
    }

    #[test]
    fn test_histogram_of_text_column_counts_categories() {
        let ds = Dataset::demo();
        let chart = build_chart(&ds, "Category", "Sales", ChartMode::Histogram).unwrap();
        let ChartKind::Histogram(hist) = chart.kind else {
            panic!("expected a histogram");
        };
        assert_eq!(hist.total(), 10);
        assert_eq!(
            hist,
            Histogram::Categorical(vec![(text("A"), 4), (text("B"), 3), (text("C"), 3)])
        );
    }

    #[test]
    fn test_constant_column_gets_a_single_bin() {
        let bins = numeric_bins(&[5.0, 5.0, 5.0]);
        assert_eq!(
            bins,
            vec![NumericBin { start: 4.5, end: 5.5, count: 3 }]
        );
        assert!(numeric_bins(&[]).is_empty());
    }

    #[test]
    fn test_unknown_axis_is_an_error() {
        let ds = Dataset::demo();
        assert_eq!(
            build_chart(&ds, "Nope", "Sales", ChartMode::Line).unwrap_err(),
            ChartError::UnknownColumn("Nope".to_string())
        );
        assert_eq!(
            build_chart(&ds, "Date", "Nope", ChartMode::Pie).unwrap_err(),
            ChartError::UnknownColumn("Nope".to_string())
        );
    }

    #[test]
    fn test_chart_build_leaves_dataset_untouched() {
        let ds = Dataset::demo();
        let before = ds.clone();
        for mode in ChartMode::ALL {
            build_chart(&ds, "Date", "Category", mode).unwrap();
        }
        assert_eq!(ds, before);
    }

    #[test]
    fn test_x_positions_for_each_scale() {
        let a = text("a");
        let b = text("b");
        let (pos, scale) = x_positions(&[&a, &b, &CellValue::Null, &a]);
        assert_eq!(pos, vec![Some(0.0), Some(1.0), None, Some(0.0)]);
        assert_eq!(
            scale,
            XScale::Categories(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(scale.tick_label(1.0), "b");
        assert_eq!(scale.tick_label(0.5), "");

        let (pos, scale) = x_positions(&[&CellValue::Integer(3), &CellValue::Float(1.5)]);
        assert_eq!(pos, vec![Some(3.0), Some(1.5)]);
        assert_eq!(scale, XScale::Numeric);

        let day = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let date = CellValue::Date(day);
        let (pos, scale) = x_positions(&[&date]);
        assert_eq!(scale, XScale::Days);
        assert_eq!(scale.tick_label(pos[0].unwrap()), "2023-01-02");
    }

    #[test]
    fn test_mode_labels() {
        let labels: Vec<&str> = ChartMode::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["Line Chart", "Bar Chart", "Histogram", "Pie Chart"]);
    }
}
