use std::fmt;

use serde::{Deserialize, Serialize};

use super::matrix::{FeatureMatrix, ScorerError};

/// Binary outcome for one scored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyLabel {
    Anomalous,
    Normal,
}

impl AnomalyLabel {
    /// Conventional encoding: −1 anomalous, 1 normal.
    pub fn as_i8(self) -> i8 {
        match self {
            AnomalyLabel::Anomalous => -1,
            AnomalyLabel::Normal => 1,
        }
    }

    pub fn is_anomalous(self) -> bool {
        self == AnomalyLabel::Anomalous
    }
}

impl fmt::Display for AnomalyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyLabel::Anomalous => f.write_str("anomalous"),
            AnomalyLabel::Normal => f.write_str("normal"),
        }
    }
}

/// A trainable anomaly model over a 2-D feature matrix.
///
/// Scores follow the decision-function convention: lower is more anomalous,
/// negative means the row is labelled [`AnomalyLabel::Anomalous`].
pub trait AnomalyScorer: Send {
    /// Fit the model to `matrix`, replacing any earlier fit.
    fn fit(&mut self, matrix: &FeatureMatrix) -> Result<(), ScorerError>;

    /// Continuous score per row.
    fn score(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ScorerError>;

    /// Label per row.
    fn predict(&self, matrix: &FeatureMatrix) -> Result<Vec<AnomalyLabel>, ScorerError> {
        Ok(self
            .score(matrix)?
            .into_iter()
            .map(|s| {
                if s < 0.0 {
                    AnomalyLabel::Anomalous
                } else {
                    AnomalyLabel::Normal
                }
            })
            .collect())
    }

    fn is_fitted(&self) -> bool;
}
