//! Command-line entry point for the deadlock concurrency laboratory.
//!
//! Dispatches to one of the four scenario runners in `dlab_scenarios`, or to
//! the discrete-time simulator in `dlab_sim`. This crate is the one external
//! collaborator surface: argument parsing, metrics file emission, and log
//! formatting live here, not in the core engines.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dlab_metrics::{write_metrics, MetricRecord, MetricsFormat};
use dlab_scenarios::ScenarioConfig;
use dlab_sim::{demo_scenario, random_scenario, SimMode, Simulator};

#[derive(Parser)]
#[command(name = "dlab", about = "A pedagogical concurrency laboratory for resource-acquisition deadlocks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scenario 1: provoke a circular-wait deadlock with alternating acquisition order.
    Deadlock(ScenarioArgs),
    /// Scenario 2: prevent deadlock with a total order on resource acquisition.
    Ordered(ScenarioArgs),
    /// Scenario 3: break circular wait with bounded waiting and randomised backoff.
    Retry(ScenarioArgs),
    /// Scenario 4: admit requests only when the post-grant state is safe (Banker's algorithm).
    Banker(ScenarioArgs),
    /// Run all four scenarios back to back, in order.
    All(ScenarioArgs),
    /// Step-wise discrete-time simulation of a toy process/resource world.
    Simulate(SimulateArgs),
}

#[derive(Args, Clone)]
struct ScenarioArgs {
    /// Number of competing workers (processes).
    #[arg(long, default_value_t = 3)]
    workers: usize,

    /// Number of resource classes.
    #[arg(long, default_value_t = 2)]
    resources: usize,

    /// Units per resource class (meaningful only for the Banker scenario).
    #[arg(long, default_value_t = 1)]
    resource_units: u32,

    /// Seconds a worker holds its resources while "working".
    #[arg(long, default_value_t = 0.2)]
    hold_time: f64,

    /// Deadlock scenario's whole-worker watchdog timeout, in seconds.
    #[arg(long, default_value_t = 1.0)]
    timeout: f64,

    /// Retry worker's per-attempt acquisition timeout, in seconds.
    #[arg(long, default_value_t = 0.1)]
    try_timeout: f64,

    /// Emit per-worker start/finish progress lines.
    #[arg(long)]
    progress: bool,

    /// Path to write the aggregated metric records to.
    #[arg(long)]
    metrics_out: Option<PathBuf>,

    /// On-disk format for --metrics-out.
    #[arg(long, default_value = "json")]
    metrics_format: String,
}

impl ScenarioArgs {
    fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("--workers must be at least 1");
        }
        if self.resources == 0 {
            bail!("--resources must be at least 1");
        }
        if self.resource_units == 0 {
            bail!("--resource-units must be at least 1");
        }
        for (name, value) in [
            ("--hold-time", self.hold_time),
            ("--timeout", self.timeout),
            ("--try-timeout", self.try_timeout),
        ] {
            if !(value > 0.0) {
                bail!("{name} must be a positive number of seconds, got {value}");
            }
        }
        Ok(())
    }

    fn to_config(&self) -> ScenarioConfig {
        ScenarioConfig {
            workers: self.workers,
            resources: self.resources,
            resource_units: self.resource_units,
            hold_time: Duration::from_secs_f64(self.hold_time),
            timeout: Duration::from_secs_f64(self.timeout),
            try_timeout: Duration::from_secs_f64(self.try_timeout),
        }
    }
}

#[derive(Args, Clone)]
struct SimulateArgs {
    /// Scheduling policy for picking the next requested resource.
    #[arg(long, default_value = "naive")]
    mode: String,

    /// Maximum number of ticks before the loop gives up.
    #[arg(long, default_value_t = 50)]
    max_steps: u64,

    /// Load the canonical P1:[R1,R2], P2:[R2,R1], P3:[R1] demo scenario.
    #[arg(long)]
    demo: bool,

    /// Number of processes (ignored with --demo).
    #[arg(long, default_value_t = 5)]
    processes: usize,

    /// Number of resources (ignored with --demo).
    #[arg(long, default_value_t = 5)]
    resources: usize,

    /// PRNG seed for the random scenario generator (ignored with --demo).
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// `--progress` controls whether each worker's per-step `tracing::info!` lines
/// surface. Absent an explicit `RUST_LOG`, the default stays at `warn` so a
/// plain run only shows the scenario's own `println!` summary.
fn init_tracing(command: &Commands) {
    let progress = matches!(
        command,
        Commands::Deadlock(a) | Commands::Ordered(a) | Commands::Retry(a) | Commands::Banker(a) | Commands::All(a)
            if a.progress
    );
    let default_directive = if progress { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.command);

    match cli.command {
        Commands::Deadlock(args) => run_scenario(&args, dlab_scenarios::deadlock::run),
        Commands::Ordered(args) => run_scenario(&args, dlab_scenarios::ordered::run),
        Commands::Retry(args) => run_scenario(&args, dlab_scenarios::retry::run),
        Commands::Banker(args) => run_scenario(&args, dlab_scenarios::banker::run),
        Commands::All(args) => run_all(&args),
        Commands::Simulate(args) => run_simulate(&args),
    }
}

fn run_scenario(args: &ScenarioArgs, runner: fn(&ScenarioConfig) -> dlab_scenarios::ScenarioOutcome) -> Result<()> {
    args.validate()?;
    let outcome = runner(&args.to_config());
    emit_metrics(args, &outcome.records)
}

fn run_all(args: &ScenarioArgs) -> Result<()> {
    args.validate()?;
    let outcomes = dlab_scenarios::run_all(&args.to_config());
    let records: Vec<MetricRecord> = outcomes.into_iter().flat_map(|o| o.records).collect();
    emit_metrics(args, &records)
}

fn emit_metrics(args: &ScenarioArgs, records: &[MetricRecord]) -> Result<()> {
    let Some(path) = &args.metrics_out else {
        return Ok(());
    };
    let format: MetricsFormat = args
        .metrics_format
        .parse()
        .map_err(anyhow::Error::msg)
        .context("invalid --metrics-format")?;
    write_metrics(path, format, records)
        .with_context(|| format!("failed to write metrics to {}", path.display()))?;
    println!("wrote {} metric record(s) to {}", records.len(), path.display());
    Ok(())
}

fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let mode: SimMode = args.mode.parse().map_err(anyhow::Error::msg).context("invalid --mode")?;
    if args.max_steps == 0 {
        bail!("--max-steps must be at least 1");
    }

    let (processes, resources) = if args.demo {
        demo_scenario()
    } else {
        if args.processes == 0 {
            bail!("--processes must be at least 1");
        }
        if args.resources == 0 {
            bail!("--resources must be at least 1");
        }
        random_scenario(args.processes, args.resources, args.seed)
    };

    let simulator = Simulator::new(processes, resources, mode, args.max_steps);
    let outcome = simulator.run();

    if outcome.deadlock_found {
        println!(
            "simulation halted at t={} with a deadlock among: {}",
            outcome.deadlock_step.unwrap_or_default(),
            outcome.cycle.join(" -> ")
        );
    } else {
        println!("simulation ran {} step(s) without detecting a deadlock", outcome.steps_run);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_args_reject_zero_workers() {
        let args = ScenarioArgs {
            workers: 0,
            resources: 1,
            resource_units: 1,
            hold_time: 0.1,
            timeout: 0.1,
            try_timeout: 0.1,
            progress: false,
            metrics_out: None,
            metrics_format: "json".into(),
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn scenario_args_reject_non_positive_durations() {
        let mut args = ScenarioArgs {
            workers: 1,
            resources: 1,
            resource_units: 1,
            hold_time: 0.0,
            timeout: 0.1,
            try_timeout: 0.1,
            progress: false,
            metrics_out: None,
            metrics_format: "json".into(),
        };
        assert!(args.validate().is_err());
        args.hold_time = 0.1;
        assert!(args.validate().is_ok());
    }
}
