use std::path::Path;

use anyhow::{Context, Result, bail};
use parquet::arrow::ArrowWriter;

use super::align::ColumnRef;
use super::table::{DATE_COLUMN, ResultTable};

/// Write `table` to disk.  Dispatch by extension.
///
/// * `.csv`     – header row, empty cells for undefined warmup rows
/// * `.parquet` – the table's Arrow batch, nulls for undefined rows
pub fn write_table(path: &Path, table: &ResultTable) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_csv(path, table),
        "parquet" | "pq" => write_parquet(path, table),
        other => bail!("Unsupported output extension: .{other}"),
    }?;
    log::info!(
        "wrote {} rows x {} columns to {}",
        table.n_rows(),
        table.n_columns(),
        path.display()
    );
    Ok(())
}

fn write_csv(path: &Path, table: &ResultTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    write_csv_to(&mut writer, table)?;
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Serialise `table` as CSV into any writer.
pub fn write_csv_to<W: std::io::Write>(writer: &mut csv::Writer<W>, table: &ResultTable) -> Result<()> {
    let mut header = vec![DATE_COLUMN.to_string()];
    header.extend(table.column_names());
    writer.write_record(&header).context("writing CSV header")?;

    let columns: Vec<ColumnRef<'_>> = table
        .groups()
        .iter()
        .flat_map(|g| g.columns().map(|(_, col)| col))
        .collect();

    for (row, label) in table.timestamp_labels().into_iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(label);
        record.extend(columns.iter().map(|col| cell(col, row)));
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    Ok(())
}

fn cell(col: &ColumnRef<'_>, row: usize) -> String {
    match col {
        ColumnRef::Float(values) => values[row].map(|v| v.to_string()).unwrap_or_default(),
        ColumnRef::Label(labels) => labels[row]
            .map(|l| l.as_i8().to_string())
            .unwrap_or_default(),
    }
}

fn write_parquet(path: &Path, table: &ResultTable) -> Result<()> {
    let batch = table.to_record_batch().context("building record batch")?;
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
