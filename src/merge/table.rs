use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int8Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;

use crate::error::{PipelineError, Result};
use crate::views::ViewId;

use super::align::{AlignedColumnSet, ColumnRef};

/// Name of the timestamp column leading every rendered table.
pub const DATE_COLUMN: &str = "Date";

// ---------------------------------------------------------------------------
// ResultTable – every view's columns on one time index
// ---------------------------------------------------------------------------

/// The merged detection output.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    timestamps: Vec<NaiveDateTime>,
    keep_time_of_day: bool,
    groups: Vec<AlignedColumnSet>,
}

impl ResultTable {
    /// Concatenate aligned column sets along the column axis.
    ///
    /// Every set must span exactly `timestamps.len()` rows and column
    /// prefixes must be unique.
    pub fn new(
        timestamps: Vec<NaiveDateTime>,
        keep_time_of_day: bool,
        groups: Vec<AlignedColumnSet>,
    ) -> Result<Self> {
        let n = timestamps.len();
        if let Some(bad) = groups.iter().find(|g| g.len() != n) {
            return Err(PipelineError::Misaligned {
                view: bad.id.kind,
                expected: n,
                got: bad.len(),
            });
        }
        let mut seen = BTreeSet::new();
        if let Some(dup) = groups.iter().find(|g| !seen.insert(g.id.prefix())) {
            return Err(PipelineError::validation(format!(
                "duplicate column group '{}'",
                dup.id
            )));
        }
        Ok(ResultTable {
            timestamps,
            keep_time_of_day,
            groups,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.timestamps.len()
    }

    /// Data columns, excluding the timestamp index.
    pub fn n_columns(&self) -> usize {
        self.groups.iter().map(|g| g.columns().count()).sum()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn groups(&self) -> &[AlignedColumnSet] {
        &self.groups
    }

    pub fn group(&self, id: ViewId) -> Option<&AlignedColumnSet> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|g| g.columns().map(|(name, _)| name))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<ColumnRef<'_>> {
        self.groups
            .iter()
            .flat_map(|g| g.columns())
            .find_map(|(n, col)| (n == name).then_some(col))
    }

    /// The index rendered as text: calendar dates unless time of day is kept.
    pub fn timestamp_labels(&self) -> Vec<String> {
        let fmt = if self.keep_time_of_day {
            "%Y-%m-%d %H:%M:%S"
        } else {
            "%Y-%m-%d"
        };
        self.timestamps
            .iter()
            .map(|t| t.format(fmt).to_string())
            .collect()
    }

    /// Render as an Arrow batch: `Date` first, then each view's columns.
    ///
    /// Undefined warmup rows become nulls; labels are Int8 (−1 / 1).
    pub fn to_record_batch(&self) -> std::result::Result<RecordBatch, ArrowError> {
        let mut fields = vec![Field::new(DATE_COLUMN, DataType::Utf8, false)];
        let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from(self.timestamp_labels()))];

        for (name, col) in self.groups.iter().flat_map(|g| g.columns()) {
            match col {
                ColumnRef::Float(values) => {
                    fields.push(Field::new(name, DataType::Float64, true));
                    arrays.push(Arc::new(Float64Array::from(values.to_vec())));
                }
                ColumnRef::Label(labels) => {
                    fields.push(Field::new(name, DataType::Int8, true));
                    let encoded: Vec<Option<i8>> =
                        labels.iter().map(|l| l.map(|l| l.as_i8())).collect();
                    arrays.push(Arc::new(Int8Array::from(encoded)));
                }
            }
        }

        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
    }
}
