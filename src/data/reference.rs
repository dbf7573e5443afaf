use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, BooleanArray, Float32Array, Float64Array};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::ContinuumReference;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a continuum reference table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – `wavelength` (Float64) and `is_continuum` (Boolean) columns
/// * `.json`    – `[{ "wavelength": 15100.2, "is_continuum": true }, ...]`
/// * `.csv`     – header row with `wavelength` and `is_continuum` columns
pub fn load_reference(path: &Path) -> Result<ContinuumReference> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ReferenceRow {
    wavelength: f64,
    is_continuum: bool,
}

fn load_json(path: &Path) -> Result<ContinuumReference> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<ReferenceRow> = serde_json::from_str(&text).context("parsing JSON")?;

    let wavelength = rows.iter().map(|r| r.wavelength).collect();
    let is_continuum = rows.iter().map(|r| r.is_continuum).collect();
    ContinuumReference::new(wavelength, is_continuum).context("validating reference table")
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<ContinuumReference> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let w_idx = headers
        .iter()
        .position(|h| h == "wavelength")
        .context("CSV missing 'wavelength' column")?;
    let c_idx = headers
        .iter()
        .position(|h| h == "is_continuum")
        .context("CSV missing 'is_continuum' column")?;

    let mut wavelength = Vec::new();
    let mut is_continuum = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let w: f64 = record
            .get(w_idx)
            .unwrap_or("")
            .trim()
            .parse()
            .with_context(|| format!("Row {row_no}: 'wavelength' is not a number"))?;
        let flag = match record.get(c_idx).unwrap_or("").trim() {
            "true" | "1" => true,
            "false" | "0" => false,
            other => bail!("Row {row_no}: 'is_continuum' value '{other}' is not a boolean"),
        };

        wavelength.push(w);
        is_continuum.push(flag);
    }

    ContinuumReference::new(wavelength, is_continuum).context("validating reference table")
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet continuum reference table.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); the `wavelength` column may be
/// Float64 or Float32.
fn load_parquet(path: &Path) -> Result<ContinuumReference> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut wavelength = Vec::new();
    let mut is_continuum = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let w_idx = schema
            .index_of("wavelength")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'wavelength' column"))?;
        let c_idx = schema
            .index_of("is_continuum")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'is_continuum' column"))?;

        // null cells are rejected rather than mapped to placeholder values;
        // a NaN wavelength would otherwise slip past the order validation
        let w_col = batch.column(w_idx);
        if let Some(arr) = w_col.as_any().downcast_ref::<Float64Array>() {
            for (row, v) in arr.iter().enumerate() {
                wavelength
                    .push(v.with_context(|| format!("null 'wavelength' value at row {row}"))?);
            }
        } else if let Some(arr) = w_col.as_any().downcast_ref::<Float32Array>() {
            for (row, v) in arr.iter().enumerate() {
                let v =
                    v.with_context(|| format!("null 'wavelength' value at row {row}"))?;
                wavelength.push(v as f64);
            }
        } else {
            bail!(
                "'wavelength' column is {:?}, expected Float64 or Float32",
                w_col.data_type()
            );
        }

        let c_col = batch.column(c_idx);
        let flags = c_col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .with_context(|| {
                format!(
                    "'is_continuum' column is {:?}, expected Boolean",
                    c_col.data_type()
                )
            })?;
        for (row, v) in flags.iter().enumerate() {
            is_continuum
                .push(v.with_context(|| format!("null 'is_continuum' value at row {row}"))?);
        }
    }

    ContinuumReference::new(wavelength, is_continuum).context("validating reference table")
}
