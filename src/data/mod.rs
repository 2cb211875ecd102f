/// Data layer: the source series and how it is read from disk.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → TimeSeries
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ TimeSeries  │  validated timestamps + values
///   └────────────┘
/// ```

pub mod loader;
pub mod model;
