use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::config::{Contamination, ForestConfig};

use super::matrix::{FeatureMatrix, ScorerError};
use super::scorer::AnomalyScorer;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Offset applied to the raw score under [`Contamination::Auto`].
const AUTO_OFFSET: f64 = -0.5;

/// Average path length of an unsuccessful BST search over `n` points.
///
/// Used both to normalise tree depths and to credit leaves that still hold
/// more than one row.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

// ---------------------------------------------------------------------------
// Isolation tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow(matrix: &FeatureMatrix, rows: Vec<usize>, height_limit: usize, rng: &mut StdRng) -> Self {
        let mut tree = IsolationTree { nodes: Vec::new() };
        tree.grow_node(matrix, rows, 0, height_limit, rng);
        tree
    }

    fn grow_node(
        &mut self,
        matrix: &FeatureMatrix,
        rows: Vec<usize>,
        depth: usize,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: rows.len() });
        if depth >= height_limit || rows.len() <= 1 {
            return id;
        }

        // Only features that still vary inside this node can isolate anything.
        let candidates: Vec<(usize, f64, f64)> = (0..matrix.n_cols())
            .filter_map(|feature| {
                let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                    let v = matrix.row(r)[feature];
                    (lo.min(v), hi.max(v))
                });
                (hi > lo).then_some((feature, lo, hi))
            })
            .collect();
        if candidates.is_empty() {
            return id;
        }

        let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
        let threshold = if (hi - lo).is_finite() {
            rng.gen_range(lo..hi)
        } else {
            lo / 2.0 + hi / 2.0
        };
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| matrix.row(r)[feature] <= threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return id;
        }

        let left = self.grow_node(matrix, left_rows, depth + 1, height_limit, rng);
        let right = self.grow_node(matrix, right_rows, depth + 1, height_limit, rng);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    fn path_length(&self, row: &[f64]) -> f64 {
        let mut node = 0;
        let mut depth = 0usize;
        loop {
            match self.nodes[node] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[feature] <= threshold { left } else { right };
                    depth += 1;
                }
                Node::Leaf { size } => return depth as f64 + average_path_length(size),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Isolation forest
// ---------------------------------------------------------------------------

/// Ensemble of isolation trees.
///
/// Rows that are isolated after few random splits get short average paths
/// and therefore low (negative) decision scores.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    config: ForestConfig,
    seed: u64,
    trees: Vec<IsolationTree>,
    n_features: usize,
    sample_size: usize,
    offset: f64,
}

impl IsolationForest {
    pub fn new(config: ForestConfig, seed: u64) -> Self {
        IsolationForest {
            config,
            seed,
            trees: Vec::new(),
            n_features: 0,
            sample_size: 0,
            offset: AUTO_OFFSET,
        }
    }

    /// Raw isolation score in (0, 1]; higher is more anomalous.
    fn raw_scores(&self, matrix: &FeatureMatrix) -> Vec<f64> {
        let normaliser = average_path_length(self.sample_size);
        matrix
            .rows()
            .map(|row| {
                if normaliser == 0.0 {
                    return 0.5;
                }
                let mean_path = self.trees.iter().map(|t| t.path_length(row)).sum::<f64>()
                    / self.trees.len() as f64;
                2f64.powf(-mean_path / normaliser)
            })
            .collect()
    }

    fn check_input(&self, matrix: &FeatureMatrix) -> Result<(), ScorerError> {
        if !self.is_fitted() {
            return Err(ScorerError::NotFitted);
        }
        if matrix.n_cols() != self.n_features {
            return Err(ScorerError::Dimension {
                expected: self.n_features,
                got: matrix.n_cols(),
            });
        }
        Ok(())
    }
}

impl AnomalyScorer for IsolationForest {
    fn fit(&mut self, matrix: &FeatureMatrix) -> Result<(), ScorerError> {
        if self.config.n_trees == 0 {
            return Err(ScorerError::InvalidParameter {
                name: "n_trees".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.config.max_samples == 0 {
            return Err(ScorerError::InvalidParameter {
                name: "max_samples".into(),
                reason: "must be at least 1".into(),
            });
        }
        let n = matrix.n_rows();
        if n == 0 {
            return Err(ScorerError::Empty);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let sample_size = self.config.max_samples.min(n);
        let height_limit = (sample_size as f64).log2().ceil() as usize;

        self.trees = (0..self.config.n_trees)
            .map(|_| {
                let rows = index::sample(&mut rng, n, sample_size).into_vec();
                IsolationTree::grow(matrix, rows, height_limit, &mut rng)
            })
            .collect();
        self.n_features = matrix.n_cols();
        self.sample_size = sample_size;

        self.offset = match self.config.contamination {
            Contamination::Auto => AUTO_OFFSET,
            Contamination::Fraction(f) => {
                let mut negated: Vec<f64> = self.raw_scores(matrix).into_iter().map(|s| -s).collect();
                negated.sort_by(f64::total_cmp);
                percentile(&negated, f)
            }
        };
        log::trace!(
            "fitted {} trees on {n} rows (sample {sample_size}, offset {:.4})",
            self.trees.len(),
            self.offset
        );
        Ok(())
    }

    fn score(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, ScorerError> {
        self.check_input(matrix)?;
        Ok(self
            .raw_scores(matrix)
            .into_iter()
            .map(|s| -s - self.offset)
            .collect())
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

/// Linear-interpolated quantile `q` of an ascending slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
