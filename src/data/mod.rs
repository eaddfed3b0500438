/// Data layer: core types, loading, coercion, statistics and export.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse upload → Dataset   (memoized by `cache`)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  named columns of CellValue
///   └──────────┘
///        │
///        ├──▶ coerce   column → NumericView (mean)
///        ├──▶ stats    per-column summary
///        └──▶ export   processed dataset → CSV bytes
/// ```

pub mod cache;
pub mod coerce;
pub mod export;
pub mod loader;
pub mod model;
pub mod stats;
