//! CSV adapters: the group loader and the result writer.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use flexnms_core::{BBox, ImageGroup};
use log::{info, warn};
use serde::Deserialize;

/// One data row of a detection CSV. Columns are matched by header name, so
/// column order is irrelevant and extra columns are ignored.
#[derive(Debug, Deserialize)]
struct DetectionRow {
    image_filename: String,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    confidence: f64,
}

const REQUIRED_COLUMNS: [&str; 6] = ["image_filename", "x0", "y0", "x1", "y1", "confidence"];

const OUTPUT_HEADER: [&str; 7] = ["image_filename", "x0", "y0", "x1", "y1", "label", "confidence"];

/// Read every input CSV and merge the rows into per-image groups, keyed in
/// ascending image order so repeated runs produce identical output.
///
/// A missing required header column is fatal for the whole run; a malformed
/// data row is skipped with a warning.
pub fn load_groups(inputs: &[PathBuf]) -> Result<Vec<ImageGroup>> {
    let mut map: BTreeMap<String, Vec<BBox>> = BTreeMap::new();
    let mut total = 0usize;

    for path in inputs {
        info!("loading {}", path.display());
        total += load_file(path, &mut map)
            .with_context(|| format!("failed to load {}", path.display()))?;
    }
    info!("loaded {} boxes across {} images", total, map.len());

    Ok(map
        .into_iter()
        .map(|(image, boxes)| ImageGroup { image, boxes })
        .collect())
}

fn load_file(path: &Path, map: &mut BTreeMap<String, Vec<BBox>>) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            bail!("missing required column '{}'", required);
        }
    }

    let mut loaded = 0usize;
    for (index, row) in reader.deserialize::<DetectionRow>().enumerate() {
        match row {
            Ok(row) => {
                map.entry(row.image_filename).or_default().push(BBox::new(
                    row.x0,
                    row.y0,
                    row.x1,
                    row.y1,
                    row.confidence,
                ));
                loaded += 1;
            }
            // The data line number: +1 for the header, +1 for 1-based.
            Err(err) => warn!("skipping malformed row at line {}: {}", index + 2, err),
        }
    }
    Ok(loaded)
}

/// Formatting and filtering options for the result writer.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Class tag written for every surviving box.
    pub label: String,
    /// Decimal places for box coordinates.
    pub coord_precision: usize,
    /// Decimal places for confidence.
    pub confidence_precision: usize,
    /// Survivors below this confidence are dropped before serialization.
    pub min_confidence: f64,
}

/// Open the output stream: a file when a path is given, stdout otherwise.
pub fn create_output_writer(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("failed to create output file {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    })
}

/// Serialize every surviving box, one row per box, groups in key order.
/// Returns the number of rows written.
pub fn write_results<W: Write>(
    writer: W,
    groups: &[ImageGroup],
    opts: &OutputOptions,
) -> Result<usize> {
    let mut out = csv::WriterBuilder::new().from_writer(writer);
    out.write_record(OUTPUT_HEADER)?;

    let mut written = 0usize;
    for group in groups {
        for b in group.survivors(opts.min_confidence) {
            let x0 = format!("{:.*}", opts.coord_precision, b.x0);
            let y0 = format!("{:.*}", opts.coord_precision, b.y0);
            let x1 = format!("{:.*}", opts.coord_precision, b.x1);
            let y1 = format!("{:.*}", opts.coord_precision, b.y1);
            let confidence = format!("{:.*}", opts.confidence_precision, b.confidence);
            out.write_record([
                group.image.as_str(),
                x0.as_str(),
                y0.as_str(),
                x1.as_str(),
                y1.as_str(),
                opts.label.as_str(),
                confidence.as_str(),
            ])?;
            written += 1;
        }
    }
    out.flush()?;
    Ok(written)
}
