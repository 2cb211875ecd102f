use crate::error::{PipelineError, Result};
use crate::scoring::FeatureMatrix;

use super::kind::{ViewId, ViewKind};

// ---------------------------------------------------------------------------
// FeatureView – one warmup-trimmed feature matrix
// ---------------------------------------------------------------------------

/// A feature matrix derived from the source series.
///
/// Row `i` of `matrix` (and of `display`) corresponds to source row
/// `warmup + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureView {
    pub id: ViewId,
    pub warmup: usize,
    pub matrix: FeatureMatrix,
    /// Per-row feature value reported alongside the score.
    pub display: Vec<f64>,
}

impl FeatureView {
    pub fn kind(&self) -> ViewKind {
        self.id.kind
    }

    pub fn n_rows(&self) -> usize {
        self.matrix.n_rows()
    }
}

/// `values[i] - values[i - 1]` for `i` in `1..n`.
pub fn first_difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Trailing mean over `window` rows, only where the window is full.
///
/// Entry `i` covers source rows `i..i + window`, so it belongs to source row
/// `i + window - 1`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// The ordered list of views a window list asks for:
/// Raw, Delta, Window(w₁..wk), WindowDelta(w₁..wk).
pub fn plan_views(windows: &[usize]) -> Vec<ViewId> {
    let mut ids = vec![ViewId::new(ViewKind::Raw), ViewId::new(ViewKind::Delta)];
    ids.extend(windowed_ids(windows, ViewKind::Window));
    ids.extend(windowed_ids(windows, ViewKind::WindowDelta));
    ids
}

fn windowed_ids<'a>(
    windows: &'a [usize],
    make: impl Fn(usize) -> ViewKind + 'a,
) -> impl Iterator<Item = ViewId> + 'a {
    windows.iter().enumerate().map(move |(i, &w)| ViewId {
        kind: make(w),
        occurrence: windows[..i].iter().filter(|&&prev| prev == w).count(),
    })
}

/// Reject window lists that cannot describe a view.
pub fn validate_windows(windows: &[usize]) -> Result<()> {
    match windows.iter().position(|&w| w == 0) {
        Some(i) => Err(PipelineError::validation(format!(
            "window sizes must be positive, entry {i} is 0"
        ))),
        None => Ok(()),
    }
}

/// Check the series is long enough for every requested view.
pub fn check_length(n: usize, windows: &[usize]) -> Result<()> {
    if n < 2 {
        return Err(PipelineError::InsufficientLength {
            view: ViewKind::Delta,
            required: 1,
            got: n,
        });
    }
    if let Some(&w) = windows.iter().find(|&&w| n <= w) {
        return Err(PipelineError::InsufficientLength {
            view: ViewKind::Window(w),
            required: w,
            got: n,
        });
    }
    Ok(())
}

/// Check `n` rows are enough to build one view of `kind`.
pub fn check_view_length(n: usize, kind: ViewKind) -> Result<()> {
    let required = match kind {
        ViewKind::Raw => 0,
        ViewKind::Delta => 1,
        ViewKind::Window(w) => w,
        ViewKind::WindowDelta(w) => w.max(1),
    };
    if n <= required {
        return Err(PipelineError::InsufficientLength {
            view: kind,
            required,
            got: n,
        });
    }
    Ok(())
}

/// Build a single view of `values`.
pub fn build_view(values: &[f64], id: ViewId) -> Result<FeatureView> {
    let kind = id.kind;
    if matches!(kind, ViewKind::Window(0) | ViewKind::WindowDelta(0)) {
        return Err(PipelineError::validation("window size must be positive"));
    }
    check_view_length(values.len(), kind)?;
    let (columns, display) = match kind {
        ViewKind::Raw => (vec![values.to_vec()], values.to_vec()),
        ViewKind::Delta | ViewKind::WindowDelta(_) => {
            let delta = first_difference(values);
            let level = values[kind.warmup()..].to_vec();
            (vec![delta.clone(), level], delta)
        }
        ViewKind::Window(w) => {
            let means = rolling_mean(values, w);
            (vec![means.clone()], means)
        }
    };

    let matrix = FeatureMatrix::from_columns(&columns)
        .map_err(|source| PipelineError::Scoring { view: kind, source })?;
    let warmup = kind.warmup();
    if warmup + matrix.n_rows() != values.len() {
        return Err(PipelineError::Misaligned {
            view: kind,
            expected: values.len(),
            got: warmup + matrix.n_rows(),
        });
    }

    Ok(FeatureView {
        id,
        warmup,
        matrix,
        display,
    })
}

/// Derive every feature view for `values`.
///
/// Produces `2 + 2 * windows.len()` views in [`plan_views`] order.
pub fn build_views(values: &[f64], windows: &[usize]) -> Result<Vec<FeatureView>> {
    validate_windows(windows)?;
    check_length(values.len(), windows)?;

    plan_views(windows)
        .into_iter()
        .map(|id| build_view(values, id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPIKE: [f64; 6] = [10.0, 10.0, 10.0, 50.0, 10.0, 10.0];

    #[test]
    fn differences_and_means() {
        assert_eq!(first_difference(&SPIKE), vec![0.0, 0.0, 40.0, -40.0, 0.0]);
        assert_eq!(rolling_mean(&SPIKE, 2), vec![10.0, 10.0, 30.0, 30.0, 10.0]);
        assert_eq!(rolling_mean(&SPIKE, 1), SPIKE.to_vec());
        assert_eq!(rolling_mean(&[1.0, 2.0, 3.0], 3), vec![2.0]);
    }

    #[test]
    fn builds_views_in_order_with_warmups() {
        let views = build_views(&SPIKE, &[2, 3]).unwrap();
        let kinds: Vec<ViewKind> = views.iter().map(FeatureView::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViewKind::Raw,
                ViewKind::Delta,
                ViewKind::Window(2),
                ViewKind::Window(3),
                ViewKind::WindowDelta(2),
                ViewKind::WindowDelta(3),
            ]
        );
        let warmups: Vec<usize> = views.iter().map(|v| v.warmup).collect();
        assert_eq!(warmups, vec![0, 1, 1, 2, 1, 1]);
        for v in &views {
            assert_eq!(v.warmup + v.n_rows(), SPIKE.len());
        }
    }

    #[test]
    fn delta_rows_pair_difference_with_level() {
        let view = build_view(&SPIKE, ViewId::new(ViewKind::Delta)).unwrap();
        assert_eq!(view.matrix.n_cols(), 2);
        // Row 2 of the view is source row 3: the spike.
        assert_eq!(view.matrix.row(2), &[40.0, 50.0]);
        assert_eq!(view.display, vec![0.0, 0.0, 40.0, -40.0, 0.0]);
    }

    #[test]
    fn window_delta_reuses_plain_difference_features() {
        let delta = build_view(&SPIKE, ViewId::new(ViewKind::Delta)).unwrap();
        let wd = build_view(&SPIKE, ViewId::new(ViewKind::WindowDelta(3))).unwrap();
        assert_eq!(delta.matrix, wd.matrix);
        assert_eq!(wd.warmup, 1);
    }

    #[test]
    fn empty_window_list_yields_raw_and_delta() {
        let views = build_views(&SPIKE, &[]).unwrap();
        assert_eq!(views.len(), 2);
    }

    #[test]
    fn repeated_windows_are_kept() {
        let ids = plan_views(&[2, 2]);
        assert_eq!(ids.len(), 6);
        assert_eq!(ids[3].prefix(), "window2_2");
        assert_eq!(ids[5].prefix(), "windowDelta2_2");
    }

    #[test]
    fn window_not_shorter_than_series_is_rejected() {
        let err = build_views(&SPIKE, &[2, 6]).unwrap_err();
        match err {
            PipelineError::InsufficientLength { view, required, got } => {
                assert_eq!(view, ViewKind::Window(6));
                assert_eq!((required, got), (6, 6));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn single_row_series_cannot_be_differenced() {
        let err = build_views(&[1.0], &[]).unwrap_err();
        assert_eq!(err.view(), Some(ViewKind::Delta));
    }

    #[test]
    fn short_input_to_a_single_view_is_insufficient_length() {
        let cases = [
            (Vec::new(), ViewKind::Raw, 0),
            (Vec::new(), ViewKind::Delta, 1),
            (vec![1.0], ViewKind::Delta, 1),
            (vec![1.0], ViewKind::WindowDelta(1), 1),
            (vec![1.0, 2.0], ViewKind::Window(3), 3),
            (vec![1.0, 2.0], ViewKind::WindowDelta(2), 2),
        ];
        for (values, kind, expected) in cases {
            match build_view(&values, ViewId::new(kind)) {
                Err(PipelineError::InsufficientLength { view, required, got }) => {
                    assert_eq!(view, kind);
                    assert_eq!((required, got), (expected, values.len()));
                }
                other => panic!("{kind} on {} rows: {other:?}", values.len()),
            }
        }
        assert!(build_view(&[1.0], ViewId::new(ViewKind::Raw)).is_ok());
        assert!(build_view(&[1.0, 2.0], ViewId::new(ViewKind::Window(1))).is_ok());
    }

    #[test]
    fn zero_window_is_a_validation_error() {
        assert!(matches!(
            build_view(&SPIKE, ViewId::new(ViewKind::Window(0))),
            Err(PipelineError::Validation { .. })
        ));
        assert!(matches!(
            build_views(&SPIKE, &[2, 0]),
            Err(PipelineError::Validation { .. })
        ));
    }
}
