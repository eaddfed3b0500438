use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int16Type,
    Int32Type, Int64Type, Int8Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use bytes::Bytes;
use calamine::{Data, DataType as _, Reader};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, Dataset};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Upload – what the user handed us
// ---------------------------------------------------------------------------

/// A picked file: its name (used for format dispatch and the title) and its
/// raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk into an upload named after the file.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(name, bytes))
    }
}

// ---------------------------------------------------------------------------
// Loader options
// ---------------------------------------------------------------------------

/// Text encoding assumed for CSV input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvEncoding {
    /// Windows-1252, the WHATWG reading of `latin1`. Never fails; every byte
    /// maps to a char. Bytes 0x80-0x9F are the Windows printable characters
    /// (0x80 is `€`), not the ISO-8859-1 C1 controls.
    #[default]
    Latin1,
    /// UTF-8, invalid sequences replaced with U+FFFD.
    Utf8,
    /// UTF-8 when the whole file is valid UTF-8, Latin-1 otherwise.
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LoaderOptions {
    pub csv_encoding: CsvEncoding,
}

// ---------------------------------------------------------------------------
// Format dispatch
// ---------------------------------------------------------------------------

pub const CSV_EXTENSIONS: &[&str] = &["csv"];
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
pub const PARQUET_EXTENSIONS: &[&str] = &["parquet", "pq"];
pub const JSON_EXTENSIONS: &[&str] = &["json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
    Parquet,
    Json,
}

impl FileFormat {
    /// Pick a reader from the file name suffix (case-insensitive).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let ext = ext.as_str();

        if CSV_EXTENSIONS.contains(&ext) {
            Some(FileFormat::Csv)
        } else if SPREADSHEET_EXTENSIONS.contains(&ext) {
            Some(FileFormat::Spreadsheet)
        } else if PARQUET_EXTENSIONS.contains(&ext) {
            Some(FileFormat::Parquet)
        } else if JSON_EXTENSIONS.contains(&ext) {
            Some(FileFormat::Json)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse an upload into a dataset. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row + records; malformed rows are skipped
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, first row is the header
/// * `.parquet` – flat columns (strings, numbers, booleans, dates, timestamps)
/// * `.json` – `[{ "col": value, ... }, ...]`
///
/// Any other extension yields an empty dataset, not an error.
pub fn load_upload(upload: &Upload, options: &LoaderOptions) -> Result<Dataset, LoadError> {
    let Some(format) = FileFormat::from_file_name(&upload.name) else {
        log::warn!("Unsupported file type '{}', nothing loaded", upload.name);
        return Ok(Dataset::empty(&upload.name));
    };

    let dataset = match format {
        FileFormat::Csv => load_csv(&upload.name, &upload.bytes, options.csv_encoding)?,
        FileFormat::Spreadsheet => load_spreadsheet(&upload.name, &upload.bytes)?,
        FileFormat::Parquet => load_parquet(&upload.name, &upload.bytes)?,
        FileFormat::Json => load_json(&upload.name, &upload.bytes)?,
    };

    log::info!(
        "Loaded '{}': {} rows x {} columns {:?}",
        upload.name,
        dataset.n_rows(),
        dataset.n_cols(),
        dataset.column_names()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

pub(crate) const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// CSV layout: header row with column names, one record per line.
///
/// Records with more fields than the header (or that the reader rejects) are
/// dropped with a warning; short records are padded with nulls.
fn load_csv(name: &str, bytes: &[u8], encoding: CsvEncoding) -> Result<Dataset, LoadError> {
    let text = decode_text(bytes, encoding);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(|h| h.to_string()).collect(),
        None => return Err(LoadError::NoColumns),
    };
    let width = headers.len();

    let mut rows: Vec<csv::StringRecord> = Vec::new();
    let mut skipped = 0usize;
    for result in records {
        match result {
            Ok(record) if record.len() > width => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                log::warn!(
                    "{name}: skipping line {line}, expected {width} fields, saw {}",
                    record.len()
                );
                skipped += 1;
            }
            Ok(record) => rows.push(record),
            Err(e) => {
                log::warn!("{name}: skipping malformed record: {e}");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        log::warn!("{name}: {skipped} malformed rows skipped");
    }

    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let values = infer_column(rows.iter().map(|r| r.get(idx)));
            Column::new(header, values)
        })
        .collect();

    Dataset::new(name, columns)
}

/// Decode CSV bytes. A byte-order mark wins over the configured encoding, so
/// our own UTF-8 exports read back unchanged.
fn decode_text(bytes: &[u8], encoding: CsvEncoding) -> Cow<'_, str> {
    match encoding {
        CsvEncoding::Latin1 => WINDOWS_1252.decode(bytes).0,
        CsvEncoding::Utf8 => UTF_8.decode(bytes).0,
        CsvEncoding::Auto => {
            let (fallback, _) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
            if fallback == UTF_8 && std::str::from_utf8(bytes).is_err() {
                WINDOWS_1252.decode(bytes).0
            } else {
                fallback.decode(bytes).0
            }
        }
    }
}

// -- Type inference for text cells --

/// Tokens read as missing values, as Pandas does by default.
const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

pub(crate) fn is_null_token(s: &str) -> bool {
    NULL_TOKENS.contains(&s)
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Infer one type for a whole column of raw text cells.
///
/// Tries, in order: integer, float, bool, date, datetime. The first type that
/// every non-null cell satisfies wins; otherwise the cells stay strings.
/// Missing cells (`None`) and null tokens become `Null`. Text cells keep
/// their surrounding whitespace; typed cells are parsed trimmed.
pub(crate) fn infer_column<'a>(raw: impl Iterator<Item = Option<&'a str>>) -> Vec<CellValue> {
    let cells: Vec<Option<&str>> = raw
        .map(|c| c.filter(|s| !is_null_token(s.trim())))
        .collect();

    fn all<T>(cells: &[Option<&str>], parse: impl Fn(&str) -> Option<T>) -> Option<Vec<Option<T>>> {
        cells
            .iter()
            .map(|c| match *c {
                Some(s) => parse(s).map(Some),
                None => Some(None),
            })
            .collect()
    }

    fn wrap<T>(parsed: Vec<Option<T>>, f: impl Fn(T) -> CellValue) -> Vec<CellValue> {
        parsed
            .into_iter()
            .map(|v| v.map(&f).unwrap_or(CellValue::Null))
            .collect()
    }

    if let Some(ints) = all(&cells, |s| s.trim().parse::<i64>().ok()) {
        return wrap(ints, CellValue::Integer);
    }
    if let Some(floats) = all(&cells, |s| s.trim().parse::<f64>().ok()) {
        return wrap(floats, |v| {
            if v.is_nan() {
                CellValue::Null
            } else {
                CellValue::Float(v)
            }
        });
    }
    if let Some(bools) = all(&cells, |s| parse_bool(s.trim())) {
        return wrap(bools, CellValue::Bool);
    }
    if let Some(dates) = all(&cells, |s| parse_date(s.trim())) {
        return wrap(dates, CellValue::Date);
    }
    if let Some(datetimes) = all(&cells, |s| parse_datetime(s.trim())) {
        return wrap(datetimes, CellValue::DateTime);
    }
    wrap(all(&cells, |s| Some(s.to_string())).unwrap_or_default(), CellValue::String)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet of any workbook format calamine detects.
///
/// Columns are counted from column A, so blank leading columns survive as
/// `Unnamed: <i>` columns of nulls. Fully blank rows are skipped and the first
/// remaining row is the header.
fn load_spreadsheet(name: &str, bytes: &[u8]) -> Result<Dataset, LoadError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;

    let (Some((first_row, _)), Some((last_row, last_col))) = (range.start(), range.end()) else {
        return Err(LoadError::NoColumns);
    };
    // `get_value` takes absolute (row, col) positions.
    let cell = |row: u32, col: u32| range.get_value((row, col));
    let is_blank = |row: u32| (0..=last_col).all(|col| matches!(cell(row, col), None | Some(Data::Empty)));

    let mut rows = (first_row..=last_row).filter(|&row| !is_blank(row));
    let Some(header_row) = rows.next() else {
        return Err(LoadError::NoColumns);
    };
    let headers: Vec<String> = (0..=last_col)
        .map(|col| cell(header_row, col).map(header_text).unwrap_or_default())
        .collect();

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col, out) in (0..=last_col).zip(columns.iter_mut()) {
            out.push(cell(row, col).map(spreadsheet_cell).unwrap_or(CellValue::Null));
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(header, values)| Column::new(header, values))
        .collect();
    Dataset::new(name, columns)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => float_cell(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if is_null_token(s.trim()) => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) if dt.time() == NaiveTime::MIN => CellValue::Date(dt.date()),
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::Null,
        },
        Data::DurationIso(s) => CellValue::String(s.clone()),
    }
}

/// Workbooks store every number as a float; whole numbers read as integers.
fn float_cell(v: f64) -> CellValue {
    if v.is_nan() {
        CellValue::Null
    } else if v.fract() == 0.0 && v.abs() < 9.0e15 {
        CellValue::Integer(v as i64)
    } else {
        CellValue::Float(v)
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`); nested columns
/// are rendered as text.
fn load_parquet(name: &str, bytes: &[u8]) -> Result<Dataset, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];
    for batch_result in reader {
        let batch = batch_result?;
        for (col, out) in batch.columns().iter().zip(columns.iter_mut()) {
            for row in 0..batch.num_rows() {
                out.push(arrow_cell(col, row)?);
            }
        }
    }

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Dataset::new(name, columns)
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> Result<CellValue, LoadError> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Int8 => integer_at::<Int8Type>(col, row),
        DataType::Int16 => integer_at::<Int16Type>(col, row),
        DataType::Int32 => integer_at::<Int32Type>(col, row),
        DataType::Int64 => integer_at::<Int64Type>(col, row),
        DataType::UInt8 => integer_at::<UInt8Type>(col, row),
        DataType::UInt16 => integer_at::<UInt16Type>(col, row),
        DataType::UInt32 => integer_at::<UInt32Type>(col, row),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v)
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Float(v as f64))
        }
        DataType::Float32 => float_value(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => float_value(col.as_primitive::<Float64Type>().value(row)),
        DataType::Date32 => date_cell(col.as_primitive::<Date32Type>().value_as_date(row)),
        DataType::Date64 => date_cell(col.as_primitive::<Date64Type>().value_as_date(row)),
        DataType::Timestamp(unit, _) => {
            let dt = match unit {
                TimeUnit::Second => col.as_primitive::<TimestampSecondType>().value_as_datetime(row),
                TimeUnit::Millisecond => col
                    .as_primitive::<TimestampMillisecondType>()
                    .value_as_datetime(row),
                TimeUnit::Microsecond => col
                    .as_primitive::<TimestampMicrosecondType>()
                    .value_as_datetime(row),
                TimeUnit::Nanosecond => col
                    .as_primitive::<TimestampNanosecondType>()
                    .value_as_datetime(row),
            };
            dt.map(CellValue::DateTime).unwrap_or(CellValue::Null)
        }
        _ => {
            let formatter = ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default())?;
            CellValue::String(formatter.value(row).to_string())
        }
    };
    Ok(cell)
}

fn integer_at<T>(col: &ArrayRef, row: usize) -> CellValue
where
    T: ArrowPrimitiveType,
    T::Native: Into<i64>,
{
    CellValue::Integer(col.as_primitive::<T>().value(row).into())
}

fn float_value(v: f64) -> CellValue {
    if v.is_nan() {
        CellValue::Null
    } else {
        CellValue::Float(v)
    }
}

fn date_cell(date: Option<NaiveDate>) -> CellValue {
    date.map(CellValue::Date).unwrap_or(CellValue::Null)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Date": "2023-01-01", "Sales": 120, "Category": "A" },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen key order; keys missing from a record are null.
fn load_json(name: &str, bytes: &[u8]) -> Result<Dataset, LoadError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::JsonShape("expected top-level JSON array".to_string()))?;

    let mut names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<CellValue>> = Vec::new();

    for (row, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::JsonShape(format!("row {row} is not a JSON object")))?;

        for (key, val) in obj {
            let idx = match names.iter().position(|n| n == key) {
                Some(idx) => idx,
                None => {
                    names.push(key.clone());
                    columns.push(vec![CellValue::Null; row]);
                    names.len() - 1
                }
            };
            if let Some(out) = columns.get_mut(idx) {
                out.push(json_cell(val));
            }
        }

        // Pad columns this record did not mention.
        for out in &mut columns {
            if out.len() < row + 1 {
                out.push(CellValue::Null);
            }
        }
    }

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Dataset::new(name, columns)
}

fn json_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnKind;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn load(name: &str, bytes: &[u8]) -> Result<Dataset, LoadError> {
        load_upload(&Upload::new(name, bytes), &LoaderOptions::default())
    }

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    #[test]
    fn test_well_formed_csv_matches_input_shape() {
        let csv = "Date,Sales,Category\n\
                   2023-01-01,120,A\n\
                   2023-01-02,135,A\n\
                   2023-01-03,160,B\n";
        let ds = load("sales.csv", csv.as_bytes()).unwrap();
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.n_cols(), 3);
        assert_eq!(ds.column_names(), vec!["Date", "Sales", "Category"]);
        assert_eq!(ds.column("Date").unwrap().kind(), ColumnKind::Date);
        assert_eq!(
            ds.column("Sales").unwrap().values,
            vec![
                CellValue::Integer(120),
                CellValue::Integer(135),
                CellValue::Integer(160)
            ]
        );
        assert_eq!(ds.title(), "Sales");
    }

    #[test]
    fn test_csv_row_with_too_many_fields_is_dropped() {
        let csv = "a,b\n1,2\n3,4,5\n6,7\n";
        let ds = load("bad.csv", csv.as_bytes()).unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(
            ds.column("a").unwrap().values,
            vec![CellValue::Integer(1), CellValue::Integer(6)]
        );
    }

    #[test]
    fn test_csv_short_row_is_padded_with_null() {
        let csv = "a,b\n1,2\n3\n";
        let ds = load("short.csv", csv.as_bytes()).unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(
            ds.column("b").unwrap().values,
            vec![CellValue::Integer(2), CellValue::Null]
        );
    }

    #[test]
    fn test_csv_is_decoded_as_latin1() {
        // "Café" with é as the single Latin-1 byte 0xE9
        let bytes = b"name,n\nCaf\xe9,1\n";
        let ds = load("latin.csv", bytes).unwrap();
        assert_eq!(ds.column("name").unwrap().values, vec![text("Café")]);
    }

    #[test]
    fn test_csv_auto_encoding_prefers_utf8() {
        let bytes = "name\nCafé\n".as_bytes();
        let options = LoaderOptions {
            csv_encoding: CsvEncoding::Auto,
        };
        let ds = load_upload(&Upload::new("u.csv", bytes), &options).unwrap();
        assert_eq!(ds.column("name").unwrap().values, vec![text("Café")]);
    }

    #[test]
    fn test_csv_utf8_bom_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"x,y\n1,2\n");
        let ds = load("bom.csv", &bytes).unwrap();
        assert_eq!(ds.column_names(), vec!["x", "y"]);
    }

    #[test]
    fn test_csv_bom_overrides_latin1_default() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("city\nZürich\n".as_bytes());
        let ds = load("bom.csv", &bytes).unwrap();
        assert_eq!(ds.column_names(), vec!["city"]);
        assert_eq!(ds.column("city").unwrap().values, vec![text("Zürich")]);
    }

    #[test]
    fn test_latin1_reads_windows_1252_high_bytes() {
        let ds = load("euro.csv", b"price\n\x80 5\n").unwrap();
        assert_eq!(ds.column("price").unwrap().values, vec![text("€ 5")]);
    }

    #[test]
    fn test_empty_csv_is_an_error() {
        let err = load("empty.csv", b"").unwrap_err();
        assert!(matches!(err, LoadError::NoColumns));
    }

    #[test]
    fn test_header_only_csv_is_empty_dataset() {
        let ds = load("header.csv", b"a,b\n").unwrap();
        assert_eq!(ds.n_cols(), 2);
        assert!(ds.is_empty());
    }

    #[test]
    fn test_unsupported_extension_is_empty_without_error() {
        let ds = load("notes.txt", b"a,b\n1,2\n").unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.n_cols(), 0);
        assert_eq!(ds.source_name(), "notes.txt");
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert_eq!(FileFormat::from_file_name("DATA.CSV"), Some(FileFormat::Csv));
        assert_eq!(
            FileFormat::from_file_name("book.XLSX"),
            Some(FileFormat::Spreadsheet)
        );
        assert_eq!(FileFormat::from_file_name("csv"), None);
    }

    #[test]
    fn test_infer_column_types() {
        let floats = infer_column(["1", "2.5", "NaN", ""].into_iter().map(Some));
        assert_eq!(
            floats,
            vec![
                CellValue::Float(1.0),
                CellValue::Float(2.5),
                CellValue::Null,
                CellValue::Null
            ]
        );

        let bools = infer_column(["True", "false", "TRUE"].into_iter().map(Some));
        assert_eq!(
            bools,
            vec![
                CellValue::Bool(true),
                CellValue::Bool(false),
                CellValue::Bool(true)
            ]
        );

        let datetimes = infer_column(["2023-01-01 10:30:00", "2023-01-02T08:00:00"].into_iter().map(Some));
        assert!(matches!(datetimes[0], CellValue::DateTime(_)));
        assert!(matches!(datetimes[1], CellValue::DateTime(_)));

        let mixed = infer_column(["12", "twelve", "NA"].into_iter().map(Some));
        assert_eq!(mixed, vec![text("12"), text("twelve"), CellValue::Null]);

        let missing = infer_column([Some("3"), None].into_iter());
        assert_eq!(missing, vec![CellValue::Integer(3), CellValue::Null]);
    }

    #[test]
    fn test_load_xlsx_first_sheet() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Region").unwrap();
        sheet.write_string(0, 1, "Revenue").unwrap();
        sheet.write_string(1, 0, "North").unwrap();
        sheet.write_number(1, 1, 1200.0).unwrap();
        sheet.write_string(2, 0, "South").unwrap();
        sheet.write_number(2, 1, 950.5).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let ds = load("regional_sales.xlsx", &bytes).unwrap();
        assert_eq!(ds.column_names(), vec!["Region", "Revenue"]);
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(
            ds.column("Region").unwrap().values,
            vec![text("North"), text("South")]
        );
        assert_eq!(
            ds.column("Revenue").unwrap().values,
            vec![CellValue::Integer(1200), CellValue::Float(950.5)]
        );
        assert_eq!(ds.title(), "Regional Sales");
    }

    #[test]
    fn test_xlsx_table_away_from_a1_keeps_leading_columns() {
        // Header at B3, a blank row between the two records.
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 1, "Region").unwrap();
        sheet.write_string(2, 2, "Revenue").unwrap();
        sheet.write_string(3, 1, "North").unwrap();
        sheet.write_number(3, 2, 10.0).unwrap();
        sheet.write_string(5, 1, "South").unwrap();
        sheet.write_number(5, 2, 20.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let ds = load("offset.xlsx", &bytes).unwrap();
        assert_eq!(ds.column_names(), vec!["Unnamed: 0", "Region", "Revenue"]);
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(
            ds.column("Unnamed: 0").unwrap().values,
            vec![CellValue::Null, CellValue::Null]
        );
        assert_eq!(
            ds.column("Revenue").unwrap().values,
            vec![CellValue::Integer(10), CellValue::Integer(20)]
        );
    }

    #[test]
    fn test_corrupt_xlsx_is_an_error() {
        let err = load("broken.xlsx", b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, LoadError::Spreadsheet(_)));
    }

    #[test]
    fn test_load_parquet_flat_columns() {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("score", DataType::Float64, true),
            Field::new("label", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3])),
                Arc::new(Float64Array::from(vec![Some(0.5), None, Some(2.0)])),
                Arc::new(StringArray::from(vec![Some("x"), Some("y"), None])),
            ],
        )
        .unwrap();

        let mut buffer = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buffer, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load("scores.parquet", &buffer).unwrap();
        assert_eq!(ds.column_names(), vec!["id", "score", "label"]);
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(
            ds.column("score").unwrap().values,
            vec![CellValue::Float(0.5), CellValue::Null, CellValue::Float(2.0)]
        );
        assert_eq!(
            ds.column("label").unwrap().values,
            vec![text("x"), text("y"), CellValue::Null]
        );
    }

    #[test]
    fn test_load_json_records() {
        let json = r#"[
            {"city": "Oslo", "temp": 4.5},
            {"city": "Rome", "temp": 18, "rain": true},
            {"temp": null}
        ]"#;
        let ds = load("weather.json", json.as_bytes()).unwrap();
        assert_eq!(ds.column_names(), vec!["city", "temp", "rain"]);
        assert_eq!(
            ds.column("city").unwrap().values,
            vec![text("Oslo"), text("Rome"), CellValue::Null]
        );
        assert_eq!(
            ds.column("rain").unwrap().values,
            vec![CellValue::Null, CellValue::Bool(true), CellValue::Null]
        );
    }

    #[test]
    fn test_json_must_be_an_array_of_objects() {
        assert!(matches!(
            load("bad.json", br#"{"a": 1}"#).unwrap_err(),
            LoadError::JsonShape(_)
        ));
        assert!(matches!(
            load("bad.json", b"[1, 2]").unwrap_err(),
            LoadError::JsonShape(_)
        ));
        assert!(matches!(
            load("bad.json", b"[{").unwrap_err(),
            LoadError::Json(_)
        ));
    }

    #[test]
    fn test_upload_from_path_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monthly_totals.csv");
        std::fs::write(&path, "month,total\nJan,10\nFeb,12\n").unwrap();

        let upload = Upload::from_path(&path).unwrap();
        assert_eq!(upload.name, "monthly_totals.csv");
        let ds = load_upload(&upload, &LoaderOptions::default()).unwrap();
        assert_eq!(ds.source_name(), "monthly_totals.csv");
        assert_eq!(ds.n_rows(), 2);

        let missing = Upload::from_path(&dir.path().join("missing.csv"));
        assert!(matches!(missing.unwrap_err(), LoadError::Io { .. }));
    }
}
