//! QuotaGate CLI entry point.
//!
//! Builds the metrics pipeline, replays one burst of observations through
//! gated recorders and flushes before exit.

use std::process::ExitCode;

use clap::Parser;
use quotagate_core::{MetricsConfig, QuotaConfig, init_metrics};

use quotagate::burst::{BurstPlan, run_burst};
use quotagate::cli::BurstArgs;

// ─────────────────────────────────────────────────────────────────────────────
// CLI Definitions
// ─────────────────────────────────────────────────────────────────────────────

/// QuotaGate: cap metric observations forwarded to a quota-limited backend.
#[derive(Parser)]
#[command(name = "quotagate", version)]
struct Cli {
    #[command(flatten)]
    burst: BurstArgs,
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.burst.verbose);

    match run(&cli.burst) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "burst failed");
            eprintln!("quotagate: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &BurstArgs) -> Result<(), quotagate_core::TelemetryError> {
    let quota = args.quota_config(QuotaConfig::from_env());
    let metrics = args.metrics_config(MetricsConfig::from_env());

    let guard = init_metrics(&metrics)?;
    let gated = guard.gated_meter(&quota);

    let plan = BurstPlan {
        instrument: args.instrument.clone(),
        records: args.records,
        threads: args.threads,
    };
    let status = run_burst(&gated, &plan);

    if status.dropped > 0 {
        tracing::warn!(
            dropped = status.dropped,
            ceiling = status.ceiling,
            "Record quota exhausted; excess observations were not exported"
        );
    }

    guard.shutdown()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracing Init
// ─────────────────────────────────────────────────────────────────────────────

/// Initialise tracing subscriber with stderr output.
///
/// When `verbose` is true, sets filter to `debug`. Otherwise, respects
/// `RUST_LOG` environment variable (defaulting to `info`).
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
