use crate::error::{PipelineError, Result};
use crate::views::{FeatureView, ViewId, ViewKind};

use super::scorer::{AnomalyLabel, AnomalyScorer};

/// Per-row scoring output of one view, still warmup-trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredView {
    pub id: ViewId,
    pub warmup: usize,
    pub scores: Vec<f64>,
    pub labels: Vec<AnomalyLabel>,
    /// Feature value shown for each row.
    pub display: Vec<f64>,
}

impl ScoredView {
    pub fn kind(&self) -> ViewKind {
        self.id.kind
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn anomaly_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_anomalous()).count()
    }
}

/// Fit `scorer` to the view's matrix and score that same matrix in-sample.
///
/// The scorer is consumed: every view gets a fresh, exclusively owned model.
pub fn score_view<S: AnomalyScorer>(view: &FeatureView, mut scorer: S) -> Result<ScoredView> {
    let kind = view.kind();
    let wrap = |source| PipelineError::Scoring { view: kind, source };

    scorer.fit(&view.matrix).map_err(wrap)?;
    let scores = scorer.score(&view.matrix).map_err(wrap)?;
    let labels = scorer.predict(&view.matrix).map_err(wrap)?;

    if scores.len() != view.n_rows() || labels.len() != view.n_rows() {
        return Err(PipelineError::Misaligned {
            view: kind,
            expected: view.warmup + view.n_rows(),
            got: view.warmup + scores.len().min(labels.len()),
        });
    }

    let scored = ScoredView {
        id: view.id,
        warmup: view.warmup,
        scores,
        labels,
        display: view.display.clone(),
    };

    let flagged = scored.anomaly_count();
    log::debug!(
        "{} view: warmup {}, {} rows scored, {flagged} anomalous",
        view.id,
        view.warmup,
        scored.len()
    );
    if flagged == 0 || flagged == scored.len() {
        log::warn!(
            "{} view labelled every row {}",
            view.id,
            if flagged == 0 { "normal" } else { "anomalous" }
        );
    }
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use crate::scoring::{FeatureMatrix, IsolationForest, ScorerError};
    use crate::views::build_view;

    /// Scorer that rejects everything, standing in for a picky external model.
    struct Refusing;

    impl AnomalyScorer for Refusing {
        fn fit(&mut self, _matrix: &FeatureMatrix) -> std::result::Result<(), ScorerError> {
            Err(ScorerError::InvalidParameter {
                name: "matrix".into(),
                reason: "refused".into(),
            })
        }

        fn score(&self, _matrix: &FeatureMatrix) -> std::result::Result<Vec<f64>, ScorerError> {
            Err(ScorerError::NotFitted)
        }

        fn is_fitted(&self) -> bool {
            false
        }
    }

    const SPIKE: [f64; 6] = [10.0, 10.0, 10.0, 50.0, 10.0, 10.0];

    #[test]
    fn keeps_row_order_and_warmup() {
        let view = build_view(&SPIKE, ViewId::new(ViewKind::Window(2))).unwrap();
        let scored = score_view(&view, IsolationForest::new(ForestConfig::default(), 42)).unwrap();
        assert_eq!(scored.warmup, 1);
        assert_eq!(scored.len(), 5);
        assert_eq!(scored.display, vec![10.0, 10.0, 30.0, 30.0, 10.0]);
        // Rows 2 and 3 carry the same mean and must score identically.
        assert_eq!(scored.scores[2], scored.scores[3]);
        assert!(scored.scores[2] < scored.scores[0]);
        assert!(scored.labels[2].is_anomalous());
    }

    #[test]
    fn scorer_rejection_names_the_view() {
        let view = build_view(&SPIKE, ViewId::new(ViewKind::Delta)).unwrap();
        let err = score_view(&view, Refusing).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Scoring {
                view: ViewKind::Delta,
                ..
            }
        ));
    }
}
