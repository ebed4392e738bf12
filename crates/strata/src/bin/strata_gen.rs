//! # STRATA World Generator
//!
//! Runs a pipeline file and logs what it produced.
//!
//! ## Usage
//!
//! ```bash
//! strata_gen data/worlds/small.toml --seed 1234
//! RUST_LOG=debug strata_gen data/worlds/small.toml
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use strata::{ConfigError, FailureKind, PipelineConfig, PipelineEvent};
use tracing_subscriber::EnvFilter;

struct Args {
    config: PathBuf,
    seed: Option<u64>,
}

fn usage() {
    println!("Usage: strata_gen <config.toml> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -s, --seed <SEED>   Override the seed from the file");
    println!("  -h, --help          Show this help");
}

/// `Ok(None)` means help was printed.
fn parse_args() -> Result<Option<Args>, String> {
    let mut args = std::env::args().skip(1);
    let mut config = None;
    let mut seed = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" | "-s" => {
                let value = args.next().ok_or("--seed needs a value")?;
                seed = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid seed: {value}"))?,
                );
            }
            "--help" | "-h" => {
                usage();
                return Ok(None);
            }
            other if other.starts_with('-') => return Err(format!("unknown option: {other}")),
            path => {
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("more than one config file given".to_string());
                }
            }
        }
    }

    let config = config.ok_or("missing config file")?;
    Ok(Some(Args { config, seed }))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load(args: &Args) -> Result<PipelineConfig, ConfigError> {
    let mut config = PipelineConfig::from_path(&args.config)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            usage();
            return ExitCode::from(2);
        }
    };
    init_logging();

    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %args.config.display(), "{e}");
            return ExitCode::FAILURE;
        }
    };
    let mut pipeline = match config.build_pipeline() {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut world = config.world();
    let mut ctx = config.context();
    let report = pipeline.run_observed(&mut world, &mut ctx, |event| {
        if let PipelineEvent::StageFinished {
            index,
            name,
            elapsed,
            ..
        } = event
        {
            tracing::info!(index, stage = %name, ms = elapsed.as_secs_f64() * 1000.0, "timing");
        }
    });

    if let Some(failure) = &report.failed_stage {
        match &failure.kind {
            FailureKind::Reported => tracing::error!(
                index = failure.index,
                stage = %failure.name,
                "stage could not complete"
            ),
            FailureKind::Error(e) => tracing::error!(
                index = failure.index,
                stage = %failure.name,
                "stage failed: {e}"
            ),
        }
        return ExitCode::FAILURE;
    }

    tracing::info!(
        seed = config.seed,
        width = world.width(),
        height = world.height(),
        stages = report.completed.len(),
        chests = world.chests().len(),
        solid_ratio = world.solid_ratio(),
        total_ms = report.elapsed.as_secs_f64() * 1000.0,
        "world generated"
    );
    ExitCode::SUCCESS
}
