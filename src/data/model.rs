use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Ordered and hashable so values can be grouped and counted.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

// -- Manual Eq/Ord so equality agrees with the total order on floats --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
                DateTime(_) => 6,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::DateTime(dt) => dt.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{}", format_float(*v)),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Integral floats keep one decimal (or an exponent, once they are too large
/// for that) so they read back as floats.
pub fn format_float(v: f64) -> String {
    if !v.is_finite() || v.fract() != 0.0 {
        format!("{v}")
    } else if v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v:e}")
    }
}

impl CellValue {
    /// Interpret the value as an `f64` if it is stored as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    fn kind(&self) -> Option<ColumnKind> {
        match self {
            CellValue::String(_) => Some(ColumnKind::Text),
            CellValue::Integer(_) => Some(ColumnKind::Integer),
            CellValue::Float(_) => Some(ColumnKind::Float),
            CellValue::Bool(_) => Some(ColumnKind::Bool),
            CellValue::Date(_) => Some(ColumnKind::Date),
            CellValue::DateTime(_) => Some(ColumnKind::DateTime),
            CellValue::Null => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// The inferred type of a column, derived from its non-null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Date,
    DateTime,
    Text,
    Mixed,
    Empty,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Bool => "bool",
            ColumnKind::Date => "date",
            ColumnKind::DateTime => "datetime",
            ColumnKind::Text => "text",
            ColumnKind::Mixed => "mixed",
            ColumnKind::Empty => "empty",
        };
        f.write_str(name)
    }
}

/// One named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Inferred kind. Integers mixed with floats widen to `Float`.
    pub fn kind(&self) -> ColumnKind {
        let kinds: HashSet<ColumnKind> = self.values.iter().filter_map(CellValue::kind).collect();
        match kinds.len() {
            0 => ColumnKind::Empty,
            1 => kinds.into_iter().next().unwrap_or(ColumnKind::Empty),
            2 if kinds.contains(&ColumnKind::Integer) && kinds.contains(&ColumnKind::Float) => {
                ColumnKind::Float
            }
            _ => ColumnKind::Mixed,
        }
    }

    /// Count of each non-null value, most frequent first.
    /// Ties keep the order in which the values first appear.
    pub fn value_counts(&self) -> Vec<(CellValue, usize)> {
        let mut counts: HashMap<&CellValue, (usize, usize)> = HashMap::new();
        for (idx, value) in self.values.iter().enumerate() {
            if value.is_null() {
                continue;
            }
            counts.entry(value).or_insert((0, idx)).0 += 1;
        }
        let mut out: Vec<(&CellValue, (usize, usize))> = counts.into_iter().collect();
        out.sort_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)));
        out.into_iter()
            .map(|(value, (count, _))| (value.clone(), count))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An ordered set of uniquely named, equally long columns plus the name of
/// the file it came from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    source_name: String,
    columns: Vec<Column>,
}

impl Dataset {
    /// Build a dataset, renaming duplicate or blank column names and
    /// rejecting columns whose lengths disagree.
    pub fn new(source_name: impl Into<String>, columns: Vec<Column>) -> Result<Self, LoadError> {
        let names = unique_column_names(columns.iter().map(|c| c.name.as_str()));
        let expected = columns.first().map(Column::len).unwrap_or(0);

        let mut renamed = Vec::with_capacity(columns.len());
        for (mut column, name) in columns.into_iter().zip(names) {
            if column.len() != expected {
                return Err(LoadError::RaggedColumns {
                    column: name,
                    expected,
                    found: column.len(),
                });
            }
            column.name = name;
            renamed.push(column);
        }

        Ok(Self {
            source_name: source_name.into(),
            columns: renamed,
        })
    }

    /// A dataset with no columns, remembering where it came from.
    pub fn empty(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            columns: Vec::new(),
        }
    }

    /// Built-in sample shown before anything is uploaded.
    pub fn demo() -> Self {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
        let dates = start
            .iter_days()
            .take(10)
            .map(CellValue::Date)
            .collect();
        let sales = [120, 135, 160, 190, 210, 230, 250, 270, 300, 320]
            .into_iter()
            .map(CellValue::Integer)
            .collect();
        let categories = ["A", "A", "B", "A", "B", "B", "C", "C", "C", "A"]
            .into_iter()
            .map(|c| CellValue::String(c.to_string()))
            .collect();

        Self {
            source_name: "demo_data.csv".to_string(),
            columns: vec![
                Column::new("Date", dates),
                Column::new("Sales", sales),
                Column::new("Category", categories),
            ],
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Human-readable title derived from the source file name.
    pub fn title(&self) -> String {
        title_from_file_name(&self.source_name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Empty when there is nothing to show: no columns or no rows.
    pub fn is_empty(&self) -> bool {
        self.n_cols() == 0 || self.n_rows() == 0
    }

    /// Copy of the dataset with one column's cells swapped out.
    /// Returns `None` for an unknown column or a length mismatch.
    pub fn with_column_values(&self, name: &str, values: Vec<CellValue>) -> Option<Dataset> {
        if values.len() != self.n_rows() {
            return None;
        }
        let idx = self.columns.iter().position(|c| c.name == name)?;
        let mut out = self.clone();
        out.columns[idx].values = values;
        Some(out)
    }
}

/// Pandas-style header normalisation: blank names become `Unnamed: <i>`,
/// repeats get a `.1`, `.2`, … suffix.
fn unique_column_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let raw: Vec<String> = names
        .enumerate()
        .map(|(i, n)| {
            if n.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                n.to_string()
            }
        })
        .collect();

    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for name in raw {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while taken.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// `sales_report_2023.csv` → `Sales Report 2023`.
///
/// Takes the text before the first dot, turns underscores into spaces and
/// title-cases every run of letters.
pub fn title_from_file_name(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or("").replace('_', " ");
    let mut out = String::with_capacity(stem.len());
    let mut prev_is_letter = false;
    for ch in stem.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    if out.trim().is_empty() {
        "Dataset".to_string()
    } else {
        out
    }
}
