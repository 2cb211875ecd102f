use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Forest parameters
// ---------------------------------------------------------------------------

/// How the decision threshold of the forest is placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Contamination {
    /// Fixed offset of −0.5 on the raw isolation score.
    #[default]
    Auto,
    /// Expected share of anomalies; the offset is that quantile of the
    /// in-sample scores.
    Fraction(f64),
}

/// Isolation forest parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// Upper bound on rows drawn per tree.
    pub max_samples: usize,
    pub contamination: Contamination,
}

impl Default for ForestConfig {
    fn default() -> Self {
        ForestConfig {
            n_trees: 100,
            max_samples: 256,
            contamination: Contamination::Auto,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// Settings for one detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Seed shared by every per-view scorer.
    pub seed: u64,
    pub forest: ForestConfig,
    /// Emit full timestamps instead of calendar dates.
    pub keep_time_of_day: bool,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Score views on the rayon pool.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            seed: 42,
            forest: ForestConfig::default(),
            keep_time_of_day: false,
            x_label: None,
            y_label: None,
            parallel: false,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: PipelineConfig =
            serde_json::from_str(&text).context("parsing config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.forest.n_trees == 0 {
            return Err(PipelineError::validation("forest.n_trees must be at least 1"));
        }
        if self.forest.max_samples == 0 {
            return Err(PipelineError::validation(
                "forest.max_samples must be at least 1",
            ));
        }
        if let Contamination::Fraction(f) = self.forest.contamination {
            if !(f > 0.0 && f <= 0.5) {
                return Err(PipelineError::validation(format!(
                    "forest.contamination must be in (0, 0.5], got {f}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_a_plain_isolation_forest() {
        let config = PipelineConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.forest.n_trees, 100);
        assert_eq!(config.forest.max_samples, 256);
        assert_eq!(config.forest.contamination, Contamination::Auto);
        assert!(!config.keep_time_of_day);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{ "seed": 7, "forest": { "contamination": { "fraction": 0.1 } }, "keep_time_of_day": true }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.forest.n_trees, 100);
        assert_eq!(config.forest.contamination, Contamination::Fraction(0.1));
        assert!(config.keep_time_of_day);
    }

    #[test]
    fn rejects_degenerate_forests() {
        let mut config = PipelineConfig::default();
        config.forest.n_trees = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.forest.contamination = Contamination::Fraction(0.75);
        assert!(config.validate().is_err());
    }
}
