use crate::error::{PipelineError, Result};
use crate::scoring::{AnomalyLabel, ScoredView};
use crate::views::{ColumnRole, ViewId};

// ---------------------------------------------------------------------------
// AlignedColumnSet – one view's columns on the full source index
// ---------------------------------------------------------------------------

/// Borrowed view of one result column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnRef<'a> {
    Float(&'a [Option<f64>]),
    Label(&'a [Option<AnomalyLabel>]),
}

impl ColumnRef<'_> {
    pub fn len(&self) -> usize {
        match self {
            ColumnRef::Float(v) => v.len(),
            ColumnRef::Label(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether row `i` holds a value.
    pub fn is_defined(&self, i: usize) -> bool {
        match self {
            ColumnRef::Float(v) => v[i].is_some(),
            ColumnRef::Label(v) => v[i].is_some(),
        }
    }
}

/// A scored view padded back to the length of the source series.
///
/// Rows `0..warmup` are `None`; row `warmup + i` holds row `i` of the
/// scored view.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedColumnSet {
    pub id: ViewId,
    pub warmup: usize,
    pub scores: Vec<Option<f64>>,
    pub labels: Vec<Option<AnomalyLabel>>,
    pub display: Vec<Option<f64>>,
}

impl AlignedColumnSet {
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn column(&self, role: ColumnRole) -> ColumnRef<'_> {
        match role {
            ColumnRole::Scores => ColumnRef::Float(&self.scores),
            ColumnRole::Anomaly => ColumnRef::Label(&self.labels),
            ColumnRole::Incidents => ColumnRef::Float(&self.display),
        }
    }

    /// `(name, column)` pairs in output order.
    pub fn columns(&self) -> impl Iterator<Item = (String, ColumnRef<'_>)> + '_ {
        ColumnRole::ALL
            .into_iter()
            .map(|role| (self.id.column_name(role), self.column(role)))
    }

    /// Source rows whose label is anomalous.
    pub fn anomalous_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_some_and(AnomalyLabel::is_anomalous))
            .map(|(i, _)| i)
    }
}

fn pad<T: Copy>(warmup: usize, rows: &[T]) -> Vec<Option<T>> {
    std::iter::repeat(None)
        .take(warmup)
        .chain(rows.iter().copied().map(Some))
        .collect()
}

/// Right-shift `scored` onto a source index of `n` rows.
///
/// Depends only on this view's own warmup.
pub fn align(scored: &ScoredView, n: usize) -> Result<AlignedColumnSet> {
    let rows = scored.len();
    if scored.warmup + rows != n || scored.labels.len() != rows || scored.display.len() != rows {
        return Err(PipelineError::Misaligned {
            view: scored.kind(),
            expected: n,
            got: scored.warmup + rows,
        });
    }

    Ok(AlignedColumnSet {
        id: scored.id,
        warmup: scored.warmup,
        scores: pad(scored.warmup, &scored.scores),
        labels: pad(scored.warmup, &scored.labels),
        display: pad(scored.warmup, &scored.display),
    })
}
