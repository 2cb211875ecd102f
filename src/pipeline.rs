use chrono::NaiveDateTime;
use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::data::model::TimeSeries;
use crate::error::Result;
use crate::merge::{AlignedColumnSet, ResultTable, align};
use crate::overlay::{AnomalyOverlay, build_overlays};
use crate::scoring::{AnomalyScorer, IsolationForest, score_view};
use crate::views::builder::{build_view, check_length, plan_views, validate_windows};
use crate::views::ViewId;

// ---------------------------------------------------------------------------
// Detection entry points
// ---------------------------------------------------------------------------

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct DetectionReport {
    pub table: ResultTable,
    /// One rendering description per view, in table order.
    pub overlays: Vec<AnomalyOverlay>,
}

/// Validate raw inputs and run [`detect`].
pub fn detect_values(
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
    windows: &[usize],
    config: &PipelineConfig,
) -> Result<DetectionReport> {
    let series = TimeSeries::new(timestamps, values)?;
    detect(&series, windows, config)
}

/// Score `series` under every view with a fresh seeded isolation forest per view.
pub fn detect(
    series: &TimeSeries,
    windows: &[usize],
    config: &PipelineConfig,
) -> Result<DetectionReport> {
    let seed = config.seed;
    detect_with(series, windows, config, || {
        IsolationForest::new(config.forest.clone(), seed)
    })
}

/// Run the full build → score → align → merge pipeline.
///
/// `make_scorer` is called once per view; no scorer is shared. Either every
/// view lands in the table or the first failing view (in view order) is
/// returned.
pub fn detect_with<S, F>(
    series: &TimeSeries,
    windows: &[usize],
    config: &PipelineConfig,
    make_scorer: F,
) -> Result<DetectionReport>
where
    S: AnomalyScorer,
    F: Fn() -> S + Sync,
{
    config.validate()?;
    validate_windows(windows)?;
    check_length(series.len(), windows)?;

    let ids = plan_views(windows);
    log::info!(
        "scoring {} views over {} rows (windows {:?})",
        ids.len(),
        series.len(),
        windows
    );

    let values = series.values();
    let n = series.len();
    let run_view = |id: &ViewId| -> Result<AlignedColumnSet> {
        let view = build_view(values, *id)?;
        let scored = score_view(&view, make_scorer())?;
        align(&scored, n)
    };

    let groups: Vec<AlignedColumnSet> = if config.parallel {
        let outcomes: Vec<Result<AlignedColumnSet>> = ids.par_iter().map(run_view).collect();
        outcomes.into_iter().collect::<Result<_>>()?
    } else {
        ids.iter().map(run_view).collect::<Result<_>>()?
    };

    let overlays = build_overlays(
        series,
        &groups,
        config.x_label.as_deref(),
        config.y_label.as_deref(),
    );
    let table = ResultTable::new(series.timestamps().to_vec(), config.keep_time_of_day, groups)?;

    Ok(DetectionReport { table, overlays })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    use crate::error::PipelineError;
    use crate::scoring::{FeatureMatrix, ScorerError};
    use crate::views::ViewKind;

    fn days(n: usize) -> Vec<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2022, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    /// Rejects two-column matrices, accepts the rest.
    struct RejectsWide;

    impl AnomalyScorer for RejectsWide {
        fn fit(&mut self, matrix: &FeatureMatrix) -> std::result::Result<(), ScorerError> {
            if matrix.n_cols() > 1 {
                return Err(ScorerError::Dimension {
                    expected: 1,
                    got: matrix.n_cols(),
                });
            }
            Ok(())
        }

        fn score(&self, matrix: &FeatureMatrix) -> std::result::Result<Vec<f64>, ScorerError> {
            Ok(vec![1.0; matrix.n_rows()])
        }

        fn is_fitted(&self) -> bool {
            true
        }
    }

    #[test]
    fn failing_view_aborts_the_run() {
        let series = TimeSeries::new(days(5), vec![1.0, 2.0, 3.0, 2.0, 1.0]).unwrap();
        for parallel in [false, true] {
            let config = PipelineConfig {
                parallel,
                ..PipelineConfig::default()
            };
            let err = detect_with(&series, &[2], &config, || RejectsWide).unwrap_err();
            assert!(
                matches!(err, PipelineError::Scoring { view: ViewKind::Delta, .. }),
                "parallel={parallel}: {err}"
            );
        }
    }

    #[test]
    fn validation_happens_before_any_scoring() {
        let series = TimeSeries::new(days(3), vec![1.0, 2.0, 3.0]).unwrap();
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let err = detect_with(&series, &[3], &PipelineConfig::default(), || {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            RejectsWide
        })
        .unwrap_err();
        assert_eq!(err.view(), Some(ViewKind::Window(3)));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn raw_inputs_are_validated() {
        let err = detect_values(days(2), vec![1.0, 2.0, 3.0], &[], &PipelineConfig::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }));
    }
}
