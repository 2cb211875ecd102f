//! Multi-view anomaly detection for a univariate time series.
//!
//! The series is scored under several feature representations (raw values,
//! first differences, rolling means, rolling windows with differences), each
//! with its own isolation forest, and the per-view results are merged back
//! onto the series' own time index.
//!
//! ```text
//!  TimeSeries + window list
//!        │
//!        ▼
//!   views::build_view      one FeatureView per ViewKind (warmup-trimmed)
//!        │
//!        ▼
//!   scoring::score_view    fresh AnomalyScorer per view
//!        │
//!        ▼
//!   merge::align           pad warmup rows, keep row order
//!        │
//!        ▼
//!   ResultTable + AnomalyOverlay per view
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod merge;
pub mod overlay;
pub mod pipeline;
pub mod scoring;
pub mod views;

pub use config::{Contamination, ForestConfig, PipelineConfig};
pub use data::model::TimeSeries;
pub use error::{PipelineError, Result};
pub use merge::ResultTable;
pub use overlay::AnomalyOverlay;
pub use pipeline::{DetectionReport, detect, detect_values, detect_with};
pub use scoring::{AnomalyLabel, AnomalyScorer, IsolationForest};
pub use views::{ViewId, ViewKind};
