//! Flexible-NMS CLI: collapse ensembled detection CSVs into per-image
//! consensus boxes.

mod io;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use flexnms_core::{FlexibleNms, NmsConfig};
use log::info;

#[derive(Parser)]
#[command(
    name = "flexnms",
    about = "Merge and rescore overlapping detections from ensembled inference runs",
    version
)]
struct Cli {
    /// Detection CSVs, one per inference pass
    #[arg(value_name = "CSV", required = true)]
    inputs: Vec<PathBuf>,

    /// Output CSV path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overlap above which boxes are fused into one and the weaker dropped
    #[arg(long, default_value_t = 0.75)]
    merge_threshold: f64,

    /// Overlap above which non-fused boxes get a soft confidence penalty
    #[arg(long, default_value_t = 0.3)]
    suppress_threshold: f64,

    /// Weighting sharpness for geometry fusion
    #[arg(long, default_value_t = 4.0)]
    merge_exponent: f64,

    /// Softness of the confidence penalty
    #[arg(long, default_value_t = 2.0)]
    decay_sigma: f64,

    /// Expected detector passes per image [default: number of inputs]
    #[arg(long)]
    ensemble_size: Option<usize>,

    /// Drop surviving boxes below this confidence
    #[arg(long, default_value_t = 0.0)]
    min_confidence: f64,

    /// Class label written for every surviving box
    #[arg(long, default_value = "car")]
    label: String,

    /// Decimal places for output coordinates
    #[arg(long, default_value_t = 1)]
    coord_precision: usize,

    /// Decimal places for output confidence
    #[arg(long, default_value_t = 3)]
    confidence_precision: usize,
}

fn main() {
    env_logger::init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = NmsConfig {
        merge_threshold: cli.merge_threshold,
        suppress_threshold: cli.suppress_threshold,
        merge_exponent: cli.merge_exponent,
        decay_sigma: cli.decay_sigma,
        // One contribution is expected per input file unless overridden.
        ensemble_size: cli.ensemble_size.unwrap_or(cli.inputs.len()),
    };
    let engine = FlexibleNms::new(config)?;

    let mut groups = io::load_groups(&cli.inputs)?;
    engine.process_groups(&mut groups);

    let opts = io::OutputOptions {
        label: cli.label,
        coord_precision: cli.coord_precision,
        confidence_precision: cli.confidence_precision,
        min_confidence: cli.min_confidence,
    };
    let out = io::create_output_writer(cli.output.as_deref())?;
    let written = io::write_results(out, &groups, &opts)?;
    info!("wrote {} boxes", written);

    Ok(())
}
