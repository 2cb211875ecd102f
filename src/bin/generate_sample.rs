use std::sync::Arc;

use arrow::array::{Date32Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DAYS: i64 = 365;

/// Days with an injected incident burst, and how many extra incidents.
const SPIKES: [(i64, i64); 4] = [(45, 60), (120, 85), (121, 40), (300, 70)];

/// Daily incident count: weekday baseline, slow trend, Poisson-ish noise.
fn daily_incidents(day: NaiveDate, index: i64, rng: &mut StdRng) -> i64 {
    let weekday_load = match day.weekday().num_days_from_monday() {
        5 | 6 => 12.0,
        _ => 20.0,
    };
    let trend = index as f64 * 0.01;
    let noise: f64 = (0..4).map(|_| rng.gen_range(-2.0..2.0)).sum();
    let extra = SPIKES
        .iter()
        .find(|(d, _)| *d == index)
        .map(|(_, n)| *n)
        .unwrap_or(0);
    ((weekday_load + trend + noise).round() as i64).max(0) + extra
}

fn main() {
    let mut rng = StdRng::seed_from_u64(42);
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).expect("valid start date");
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch");

    let dates: Vec<NaiveDate> = (0..DAYS).map(|i| start + Duration::days(i)).collect();
    let counts: Vec<i64> = dates
        .iter()
        .enumerate()
        .map(|(i, &d)| daily_incidents(d, i as i64, &mut rng))
        .collect();

    // Parquet with a Date32 index
    let schema = Arc::new(Schema::new(vec![
        Field::new("timestamp", DataType::Date32, false),
        Field::new("value", DataType::Int64, false),
    ]));
    let days_since_epoch: Vec<i32> = dates
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Date32Array::from(days_since_epoch)),
            Arc::new(Int64Array::from(counts.clone())),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "sample_incidents.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // Same series as CSV
    let csv_path = "sample_incidents.csv";
    let mut csv_writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV");
    csv_writer
        .write_record(["timestamp", "value"])
        .expect("Failed to write header");
    for (date, count) in dates.iter().zip(&counts) {
        csv_writer
            .write_record([date.to_string(), count.to_string()])
            .expect("Failed to write row");
    }
    csv_writer.flush().expect("Failed to flush CSV");

    println!(
        "Wrote {DAYS} days ({} injected spikes) to {parquet_path} and {csv_path}",
        SPIKES.len()
    );
}
