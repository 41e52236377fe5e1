// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Triggered RMS filter CLI
//!
//! Runs batches of readings through the filter. Input is JSON Lines: each
//! line is one batch, either an array of readings or a single reading
//! object. Each output batch is written to stdout as one JSON line.
//!
//! # Usage
//!
//! ```bash
//! # Zero-crossing trigger on Spindle/angle, readings from stdin
//! rms-trigger --trigger-asset Spindle --trigger-datapoint angle < readings.jsonl
//!
//! # Using configuration file
//! rms-trigger --config rms.toml --input readings.jsonl
//!
//! # Generate an example configuration
//! rms-trigger gen-config --output rms.toml
//! ```

use clap::{Parser, Subcommand};
use rms_trigger::{FilterConfig, FilterStatsSnapshot, Reading, RmsFilter, TriggerEdge, TriggerType};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Triggered RMS filter
#[derive(Parser, Debug)]
#[command(name = "rms-trigger")]
#[command(about = "Triggered RMS and peak-to-peak filter for sensor readings")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input file with one JSON batch per line ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Asset whose datapoint triggers emission
    #[arg(long)]
    trigger_asset: Option<String>,

    /// Datapoint that triggers emission
    #[arg(long)]
    trigger_datapoint: Option<String>,

    /// Trigger type ("zero crossing", "peak", "rapid edge")
    #[arg(long)]
    trigger_type: Option<String>,

    /// Trigger edge ("rising", "falling")
    #[arg(long)]
    trigger_edge: Option<String>,

    /// Output asset name template (%a = source asset)
    #[arg(long)]
    asset_name: Option<String>,

    /// Include peak-to-peak datapoints
    #[arg(long)]
    peak: bool,

    /// Forward raw readings alongside RMS output
    #[arg(long)]
    raw_data: bool,

    /// Asset filter regular expression
    #[arg(short = 'm', long = "match")]
    asset_filter: Option<String>,

    /// Attach sample numbers under this datapoint name
    #[arg(long)]
    sample_name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "rms.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// One input line.
#[derive(Deserialize)]
#[serde(untagged)]
enum Batch {
    Many(Vec<Reading>),
    One(Reading),
}

impl Batch {
    fn into_readings(self) -> Vec<Reading> {
        match self {
            Self::Many(readings) => readings,
            Self::One(reading) => vec![reading],
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr, stdout carries the output batches
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(cmd) = args.command {
        return match cmd {
            Commands::GenConfig { output } => cmd_gen_config(output),
            Commands::Validate { config } => cmd_validate(config),
        };
    }

    let config = build_config(&args)?;
    let mut filter = RmsFilter::new(config)?;

    let input: Box<dyn BufRead> = if args.input == "-" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        Box::new(BufReader::new(std::fs::File::open(&args.input)?))
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut bad_lines = 0u64;

    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let batch: Batch = match serde_json::from_str(&line) {
            Ok(batch) => batch,
            Err(e) => {
                bad_lines += 1;
                tracing::warn!("Skipping line {}: {}", lineno + 1, e);
                continue;
            }
        };

        let output = filter.process(batch.into_readings());
        serde_json::to_writer(&mut out, &output)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    let stats = filter.stats().snapshot();
    print_stats(&stats, bad_lines);

    Ok(())
}

fn build_config(args: &Args) -> Result<FilterConfig, Box<dyn std::error::Error>> {
    let mut config = match args.config {
        Some(ref path) => FilterConfig::from_file(path)?,
        None => FilterConfig::default(),
    };

    if let Some(ref asset) = args.trigger_asset {
        config.trigger_asset = asset.clone();
    }
    if let Some(ref datapoint) = args.trigger_datapoint {
        config.trigger_datapoint = datapoint.clone();
    }
    if let Some(ref t) = args.trigger_type {
        config.trigger_type = TriggerType::parse(t);
    }
    if let Some(ref e) = args.trigger_edge {
        config.trigger_edge = TriggerEdge::parse(e);
    }
    if let Some(ref name) = args.asset_name {
        config.asset_name = name.clone();
    }
    if args.peak {
        config.peak = true;
    }
    if args.raw_data {
        config.raw_data = true;
    }
    if let Some(ref pattern) = args.asset_filter {
        config.asset_filter = pattern.clone();
    }
    if let Some(ref name) = args.sample_name {
        config.add_sample_no = true;
        config.sample_name = name.clone();
    }

    if config.trigger_asset.is_empty() || config.trigger_datapoint.is_empty() {
        tracing::warn!("No trigger configured; RMS readings will never be emitted");
    }

    config.validate()?;
    Ok(config)
}

fn cmd_gen_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = FilterConfig::default()
        .trigger("Spindle", "angle")
        .trigger_type(TriggerType::ZeroCrossing)
        .trigger_edge(TriggerEdge::Rising)
        .asset_name("%a RMS")
        .peak(true)
        .asset_filter("Spindle|Motor.*")
        .sample_numbering("partNo");

    let toml_str = toml::to_string_pretty(&config)?;

    let content = format!(
        r#"# RMS Filter Configuration
# Generated by rms-trigger gen-config
#
# triggerType: "zero crossing", "peak" or "rapid edge"
# triggerEdge: "rising" or "falling"
# assetName:   output asset template, %a is the source asset name

{}
"#,
        toml_str
    );

    std::fs::write(&output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    match FilterConfig::from_file(&config_path) {
        Ok(config) => {
            println!("Configuration valid!");
            println!();
            println!(
                "Trigger: {}/{} ({}, {})",
                config.trigger_asset,
                config.trigger_datapoint,
                config.trigger_type,
                config.trigger_edge
            );
            println!("Output:  {}", config.asset_name);
            println!("Match:   {}", config.asset_filter);
            println!(
                "Options: peak={} rawData={} sampleNo={}",
                config.peak,
                config.raw_data,
                if config.add_sample_no {
                    config.sample_name.as_str()
                } else {
                    "off"
                }
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_stats(stats: &FilterStatsSnapshot, bad_lines: u64) {
    eprintln!("--- RMS Filter Statistics ---");
    eprintln!(
        "  {} batches, {} readings in ({:.1}/s), {} passed through, {} skipped lines",
        stats.batches,
        stats.readings_in,
        stats.readings_per_second(),
        stats.passed_through,
        bad_lines
    );
    eprintln!(
        "  {} accumulated ({} samples), {} raw forwarded, {} consumed",
        stats.accumulated, stats.samples, stats.raw_forwarded, stats.raw_discarded
    );
    eprintln!(
        "  {} triggers ({:.1} samples/trigger), {} RMS readings emitted",
        stats.triggers,
        stats.samples_per_trigger(),
        stats.emitted
    );
}
