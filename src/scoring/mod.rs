/// Scoring layer: the anomaly model seam and the per-view driver.
///
/// ```text
///   FeatureView ──► score_view(view, fresh scorer) ──► ScoredView
///                        │
///                        └── AnomalyScorer (IsolationForest by default)
/// ```

pub mod forest;
pub mod matrix;
pub mod scorer;
pub mod view_scorer;

pub use forest::IsolationForest;
pub use matrix::{FeatureMatrix, ScorerError};
pub use scorer::{AnomalyLabel, AnomalyScorer};
pub use view_scorer::{ScoredView, score_view};
