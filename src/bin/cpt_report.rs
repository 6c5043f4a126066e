//! CPT Report
//!
//! Reads a BRO XML CPT file, runs the standard cleaning pipeline and prints
//! a sounding summary.
//!
//! Usage:
//!   cargo run --bin cpt-report -- data/cpt/bro_xml/CPT000000003688_IMBRO_A.xml
//!   cargo run --bin cpt-report -- sounding.xml --json

use anyhow::{Context, Result};
use clap::Parser;
use geosonde::cpt::BroXmlReader;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cpt-report")]
#[command(about = "Summarize a BRO XML CPT sounding after cleaning")]
#[command(version)]
struct CliArgs {
    /// Path to the BRO XML CPT file
    file: PathBuf,

    /// Emit the summary as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Samples averaged for the pre-drill surface value
    #[arg(long, default_value_t = 3)]
    predrill_average_points: usize,
}

#[derive(Serialize)]
struct Summary {
    name: String,
    quality_class: String,
    cpt_type: String,
    local_reference_level: f64,
    predrilled_z: f64,
    samples: usize,
    depth_min: f64,
    depth_max: f64,
    reference_min: f64,
    reference_max: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut cpt = BroXmlReader::read(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    info!(name = %cpt.name, rows = cpt.len(), "sounding loaded");

    // Standard cleaning pipeline
    cpt.drop_nan_values();
    cpt.drop_duplicate_depth_values();
    cpt.perform_pre_drill_interpretation(args.predrill_average_points);
    cpt.correct_for_negatives();
    cpt.parse_nap_to_depth();

    let (depth_min, depth_max) = min_max(&cpt.depth);
    let (reference_min, reference_max) = min_max(&cpt.depth_to_reference);
    let summary = Summary {
        name: cpt.name.clone(),
        quality_class: cpt.quality_class.clone(),
        cpt_type: cpt.cpt_type.clone(),
        local_reference_level: cpt.local_reference_level,
        predrilled_z: cpt.predrilled_z,
        samples: cpt.len(),
        depth_min,
        depth_max,
        reference_min,
        reference_max,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("CPT sounding      {}", summary.name);
        println!("  quality class   {}", summary.quality_class);
        println!("  cone type       {}", summary.cpt_type);
        println!("  reference level {:.2} m NAP", summary.local_reference_level);
        println!("  pre-drilled     {:.2} m", summary.predrilled_z);
        println!("  samples         {}", summary.samples);
        println!(
            "  depth           {:.2} .. {:.2} m",
            summary.depth_min, summary.depth_max
        );
        println!(
            "  vs reference    {:.2} .. {:.2} m NAP",
            summary.reference_max, summary.reference_min
        );
    }
    Ok(())
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::NAN, f64::NAN), |(lo, hi), &v| {
        (
            if lo.is_nan() || v < lo { v } else { lo },
            if hi.is_nan() || v > hi { v } else { hi },
        )
    })
}
