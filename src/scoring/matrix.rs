use thiserror::Error;

/// Reasons a scorer refuses its input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScorerError {
    #[error("feature matrix has no rows")]
    Empty,

    #[error("feature column {column} has {got} rows, expected {expected}")]
    Ragged {
        column: usize,
        expected: usize,
        got: usize,
    },

    #[error("feature value at row {row}, column {column} is not finite")]
    NonFinite { row: usize, column: usize },

    #[error("matrix has {got} feature columns, scorer was fitted on {expected}")]
    Dimension { expected: usize, got: usize },

    #[error("scorer not fitted: call fit() before score()")]
    NotFitted,

    #[error("invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },
}

// ---------------------------------------------------------------------------
// FeatureMatrix – dense row-major (m, f) matrix
// ---------------------------------------------------------------------------

/// Dense, row-major feature matrix fed to an [`AnomalyScorer`](super::AnomalyScorer).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    values: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl FeatureMatrix {
    /// Build from equally long feature columns.
    ///
    /// Every value must be finite; undefined features never reach a scorer.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self, ScorerError> {
        let n_rows = columns.first().map(Vec::len).unwrap_or(0);
        if n_rows == 0 {
            return Err(ScorerError::Empty);
        }
        for (column, values) in columns.iter().enumerate() {
            if values.len() != n_rows {
                return Err(ScorerError::Ragged {
                    column,
                    expected: n_rows,
                    got: values.len(),
                });
            }
            if let Some(row) = values.iter().position(|v| !v.is_finite()) {
                return Err(ScorerError::NonFinite { row, column });
            }
        }

        let n_cols = columns.len();
        let mut values = Vec::with_capacity(n_rows * n_cols);
        for row in 0..n_rows {
            values.extend(columns.iter().map(|c| c[row]));
        }
        Ok(FeatureMatrix {
            values,
            n_rows,
            n_cols,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n_cols..(i + 1) * self.n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.n_cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_rows_in_source_order() {
        let m = FeatureMatrix::from_columns(&[vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]])
            .unwrap();
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.n_cols(), 2);
        assert_eq!(m.row(1), &[2.0, 20.0]);
        assert_eq!(m.rows().count(), 3);
    }

    #[test]
    fn rejects_empty_ragged_and_nan() {
        assert_eq!(FeatureMatrix::from_columns(&[]), Err(ScorerError::Empty));
        assert_eq!(
            FeatureMatrix::from_columns(&[vec![1.0, 2.0], vec![1.0]]),
            Err(ScorerError::Ragged {
                column: 1,
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            FeatureMatrix::from_columns(&[vec![1.0, f64::NAN]]),
            Err(ScorerError::NonFinite { row: 1, column: 0 })
        );
    }
}
