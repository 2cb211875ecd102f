use chrono::NaiveDateTime;

use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// TimeSeries – the caller's (timestamp, value) pairs
// ---------------------------------------------------------------------------

/// A validated univariate series on a strictly increasing time index.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Pair `timestamps` with `values`.
    ///
    /// Fails when the two differ in length, when the series is empty, when a
    /// value is not finite, or when the timestamps are not strictly increasing.
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(PipelineError::validation("series must contain at least one value"));
        }
        if timestamps.len() != values.len() {
            return Err(PipelineError::validation(format!(
                "timestamps has {} entries but series has {}",
                timestamps.len(),
                values.len()
            )));
        }
        if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(PipelineError::validation(format!(
                "value at row {i} is not finite: {v}"
            )));
        }
        if let Some(i) = timestamps.windows(2).position(|w| w[0] >= w[1]) {
            return Err(PipelineError::validation(format!(
                "timestamps must be strictly increasing: row {} ({}) is not after row {} ({})",
                i + 1,
                timestamps[i + 1],
                i,
                timestamps[i]
            )));
        }
        Ok(TimeSeries { timestamps, values })
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed series; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn days(n: usize) -> Vec<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2022, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    #[test]
    fn accepts_matching_increasing_series() {
        let ts = TimeSeries::new(days(3), vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ts.len(), 3);
        assert_eq!(ts.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn rejects_empty_series() {
        assert!(matches!(
            TimeSeries::new(Vec::new(), Vec::new()),
            Err(PipelineError::Validation { .. })
        ));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = TimeSeries::new(days(2), vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(err.to_string().contains("timestamps has 2 entries"));
    }

    #[test]
    fn rejects_non_finite_values() {
        let err = TimeSeries::new(days(3), vec![1.0, f64::NAN, 3.0]).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn rejects_unordered_timestamps() {
        let mut ts = days(3);
        ts.swap(1, 2);
        assert!(TimeSeries::new(ts, vec![1.0, 2.0, 3.0]).is_err());

        let dup = vec![days(1)[0]; 2];
        assert!(TimeSeries::new(dup, vec![1.0, 2.0]).is_err());
    }
}
