/// Merge layer: put every scored view back on the source time index.
///
/// ```text
///   ScoredView (warmup k, n − k rows)
///        │  align: k leading empty rows, then rows in order
///        ▼
///   AlignedColumnSet (n rows) ──┐
///   AlignedColumnSet (n rows) ──┼──► ResultTable ──► writer (.csv / .parquet)
///   AlignedColumnSet (n rows) ──┘
/// ```

pub mod align;
pub mod table;
pub mod writer;

pub use align::{AlignedColumnSet, ColumnRef, align};
pub use table::ResultTable;
pub use writer::write_table;
