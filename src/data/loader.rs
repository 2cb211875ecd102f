use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type, TimeUnit,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::TimeSeries;

/// Column holding the time index.
pub const TIMESTAMP_COLUMN: &str = "timestamp";
/// Column holding the observed values.
pub const VALUE_COLUMN: &str = "value";

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a time series from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – a `timestamp` column (string, date or timestamp) and a numeric `value` column
/// * `.json`    – `[{ "timestamp": "2022-02-01", "value": 12 }, ...]`
/// * `.csv`     – header row with `timestamp` and `value` columns
pub fn load_series(path: &Path) -> Result<TimeSeries> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (timestamps, values) = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    log::info!("loaded {} rows from {}", values.len(), path.display());

    TimeSeries::new(timestamps, values).with_context(|| format!("validating {}", path.display()))
}

/// Parse a timestamp cell.
///
/// Accepts RFC 3339 (offset converted to UTC), `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` and bare dates (midnight).
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    bail!("'{s}' is not a recognised timestamp")
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records', date_format='iso')`):
///
/// ```json
/// [
///   { "timestamp": "2022-02-01", "value": 12 },
///   { "timestamp": "2022-02-02", "value": 15 }
/// ]
/// ```
fn load_json(path: &Path) -> Result<(Vec<NaiveDateTime>, Vec<f64>)> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut timestamps = Vec::with_capacity(records.len());
    let mut values = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let ts = obj
            .get(TIMESTAMP_COLUMN)
            .and_then(|v| v.as_str())
            .with_context(|| format!("Row {i}: missing or invalid '{TIMESTAMP_COLUMN}'"))?;
        let value = obj
            .get(VALUE_COLUMN)
            .and_then(|v| v.as_f64())
            .with_context(|| format!("Row {i}: missing or invalid '{VALUE_COLUMN}'"))?;

        timestamps.push(parse_timestamp(ts).with_context(|| format!("Row {i}"))?);
        values.push(value);
    }

    Ok((timestamps, values))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row naming at least `timestamp` and `value`.
/// Other columns are ignored.
fn load_csv(path: &Path) -> Result<(Vec<NaiveDateTime>, Vec<f64>)> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let ts_idx = headers
        .iter()
        .position(|h| h == TIMESTAMP_COLUMN)
        .with_context(|| format!("CSV missing '{TIMESTAMP_COLUMN}' column"))?;
    let value_idx = headers
        .iter()
        .position(|h| h == VALUE_COLUMN)
        .with_context(|| format!("CSV missing '{VALUE_COLUMN}' column"))?;

    let mut timestamps = Vec::new();
    let mut values = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let ts = record.get(ts_idx).unwrap_or("");
        let raw = record.get(value_idx).unwrap_or("").trim();

        timestamps.push(parse_timestamp(ts).with_context(|| format!("CSV row {row_no}"))?);
        values.push(
            raw.parse::<f64>()
                .with_context(|| format!("CSV row {row_no}: '{raw}' is not a number"))?,
        );
    }

    Ok((timestamps, values))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one series.
///
/// Expected schema:
/// - `timestamp`: Utf8, Date32 or Timestamp(any unit)
/// - `value`: Float64, Float32, Int64 or Int32
///
/// Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<(Vec<NaiveDateTime>, Vec<f64>)> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut timestamps = Vec::new();
    let mut values = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let ts_idx = schema
            .index_of(TIMESTAMP_COLUMN)
            .map_err(|_| anyhow!("Parquet file missing '{TIMESTAMP_COLUMN}' column"))?;
        let value_idx = schema
            .index_of(VALUE_COLUMN)
            .map_err(|_| anyhow!("Parquet file missing '{VALUE_COLUMN}' column"))?;

        timestamps.extend(extract_timestamps(batch.column(ts_idx))?);
        values.extend(extract_values(batch.column(value_idx))?);
    }

    Ok((timestamps, values))
}

// -- Parquet / Arrow helpers --

fn extract_timestamps(col: &Arc<dyn Array>) -> Result<Vec<NaiveDateTime>> {
    if col.null_count() > 0 {
        bail!("null value in '{TIMESTAMP_COLUMN}' column");
    }

    let out_of_range = || anyhow!("timestamp out of range");
    match col.data_type() {
        DataType::Utf8 => col
            .as_string::<i32>()
            .iter()
            .flatten()
            .map(parse_timestamp)
            .collect(),
        DataType::LargeUtf8 => col
            .as_string::<i64>()
            .iter()
            .flatten()
            .map(parse_timestamp)
            .collect(),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .values()
            .iter()
            .map(|&days| {
                NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .ok_or_else(out_of_range)
            })
            .collect(),
        DataType::Timestamp(unit, _) => {
            let converted: Vec<Option<NaiveDateTime>> = match unit {
                TimeUnit::Second => col
                    .as_primitive::<TimestampSecondType>()
                    .values()
                    .iter()
                    .map(|&s| DateTime::from_timestamp(s, 0).map(|d| d.naive_utc()))
                    .collect(),
                TimeUnit::Millisecond => col
                    .as_primitive::<TimestampMillisecondType>()
                    .values()
                    .iter()
                    .map(|&ms| DateTime::from_timestamp_millis(ms).map(|d| d.naive_utc()))
                    .collect(),
                TimeUnit::Microsecond => col
                    .as_primitive::<TimestampMicrosecondType>()
                    .values()
                    .iter()
                    .map(|&us| DateTime::from_timestamp_micros(us).map(|d| d.naive_utc()))
                    .collect(),
                TimeUnit::Nanosecond => col
                    .as_primitive::<TimestampNanosecondType>()
                    .values()
                    .iter()
                    .map(|&ns| Some(DateTime::from_timestamp_nanos(ns).naive_utc()))
                    .collect(),
            };
            converted
                .into_iter()
                .map(|t| t.ok_or_else(out_of_range))
                .collect()
        }
        other => bail!("Expected string, date or timestamp column, got {other:?}"),
    }
}

fn extract_values(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    if col.null_count() > 0 {
        bail!("null value in '{VALUE_COLUMN}' column");
    }

    let values = match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().values().to_vec(),
        DataType::Float32 => col
            .as_primitive::<Float32Type>()
            .values()
            .iter()
            .map(|&v| v as f64)
            .collect(),
        DataType::Int64 => col
            .as_primitive::<Int64Type>()
            .values()
            .iter()
            .map(|&v| v as f64)
            .collect(),
        DataType::Int32 => col
            .as_primitive::<Int32Type>()
            .values()
            .iter()
            .map(|&v| v as f64)
            .collect(),
        other => bail!("Expected numeric '{VALUE_COLUMN}' column, got {other:?}"),
    };
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Date32Array, Int64Array};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_supported_timestamp_shapes() {
        let midnight = NaiveDate::from_ymd_opt(2022, 2, 22)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2022-02-22").unwrap(), midnight);
        assert_eq!(parse_timestamp("2022-02-22 00:00:00").unwrap(), midnight);
        assert_eq!(parse_timestamp("2022-02-22T01:00:00+01:00").unwrap(), midnight);
        assert!(parse_timestamp("22/02/2022").is_err());
    }

    #[test]
    fn loads_csv_series() {
        let file = write_temp(
            ".csv",
            "timestamp,value,note\n2022-02-01,10,a\n2022-02-02,12.5,b\n2022-02-03,9,c\n",
        );
        let series = load_series(file.path()).unwrap();
        assert_eq!(series.values(), &[10.0, 12.5, 9.0]);
        assert_eq!(series.timestamps()[2].to_string(), "2022-02-03 00:00:00");
    }

    #[test]
    fn csv_without_value_column_fails() {
        let file = write_temp(".csv", "timestamp,count\n2022-02-01,10\n");
        let err = load_series(file.path()).unwrap_err();
        assert!(err.to_string().contains("missing 'value'"));
    }

    #[test]
    fn loads_json_records() {
        let file = write_temp(
            ".json",
            r#"[{"timestamp":"2022-02-01 08:00:00","value":3},{"timestamp":"2022-02-01 09:00:00","value":4}]"#,
        );
        let series = load_series(file.path()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.values(), &[3.0, 4.0]);
    }

    #[test]
    fn rejects_unordered_file_rows() {
        let file = write_temp(".csv", "timestamp,value\n2022-02-02,1\n2022-02-01,2\n");
        assert!(load_series(file.path()).is_err());
    }

    #[test]
    fn loads_parquet_with_date_column() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(TIMESTAMP_COLUMN, DataType::Date32, false),
            Field::new(VALUE_COLUMN, DataType::Int64, false),
        ]));
        // 2022-02-01 is day 19024 since the epoch.
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Date32Array::from(vec![19024, 19025, 19026])),
                Arc::new(Int64Array::from(vec![5, 6, 40])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let series = load_series(file.path()).unwrap();
        assert_eq!(series.values(), &[5.0, 6.0, 40.0]);
        assert_eq!(series.timestamps()[0].date().to_string(), "2022-02-01");
    }

    #[test]
    fn unsupported_extension_fails() {
        let file = write_temp(".xlsx", "");
        let err = load_series(file.path()).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
