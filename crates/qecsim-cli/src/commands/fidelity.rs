//! Fidelity command implementation.
//!
//! `qecsim fidelity -n 8 --data-process recovery [--format json] [--output FILE]`

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use qecsim_analysis::{
    DataProcess, ErrorRate, ExportConfig, FidelityConfig, FidelityRun, Report,
    fidelity_from_scratch, get_error_rate, to_json,
};
use qecsim_code::SnapshotType;
use qecsim_ir::PauliString;

use super::common::{OutputFormat, emit_json, format_us, gate_times};

/// Arguments of `qecsim fidelity`.
#[derive(Debug, Args)]
pub struct FidelityArgs {
    /// Number of stabilizer cycles
    #[arg(short = 'n', long, default_value = "8")]
    pub n_cycles: usize,

    /// Number of shots
    #[arg(short, long, default_value = "2048")]
    pub shots: u32,

    /// Relaxation time T1 in ns
    #[arg(long, default_value = "40000")]
    pub t1: f64,

    /// Dephasing time T2 in ns
    #[arg(long, default_value = "60000")]
    pub t2: f64,

    /// Syndrome use (recovery, post_select, empty_circuit, none)
    #[arg(short, long, default_value = "recovery")]
    pub data_process: DataProcess,

    /// Snapshot type (dm, exp)
    #[arg(long, default_value = "dm")]
    pub snapshot_type: SnapshotType,

    /// Observable of expectation snapshots
    #[arg(long, default_value = "ZZZZZ")]
    pub pauli: PauliString,

    /// Keep ancillas unreset after measurement
    #[arg(long)]
    pub no_reset: bool,

    /// Disable relaxation in idle gaps
    #[arg(long)]
    pub no_idle_noise: bool,

    /// Initialize the logical state instead of running the encoder
    #[arg(long)]
    pub no_encoding: bool,

    /// Polar angle of the logical state
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub theta: f64,

    /// Azimuthal angle of the logical state
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub phi: f64,

    /// Gate time override NAME=NS (repeatable)
    #[arg(short, long = "gate-time")]
    pub gate_times: Vec<String>,

    /// Simulation method (density_matrix, trajectory)
    #[arg(short, long, default_value = "density_matrix")]
    pub method: String,

    /// Seed for sampled outcomes
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output file for the JSON report (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<String>,
}

impl FidelityArgs {
    fn config(&self) -> anyhow::Result<FidelityConfig> {
        Ok(FidelityConfig {
            n_cycles: self.n_cycles,
            shots: self.shots,
            gate_times: gate_times(&self.gate_times)?,
            t1: self.t1,
            t2: self.t2,
            reset: !self.no_reset,
            data_process: self.data_process,
            idle_noise: !self.no_idle_noise,
            snapshot_type: self.snapshot_type,
            encoding: !self.no_encoding,
            theta: self.theta,
            phi: self.phi,
            pauli: self.pauli.clone(),
            simulator_type: self.method.clone(),
            seed: self.seed,
        })
    }
}

#[derive(Serialize)]
struct FidelityReport {
    config: FidelityConfig,
    run: FidelityRun,
    error_rate: Option<ErrorRate>,
}

/// Execute the fidelity command.
pub fn execute(args: &FidelityArgs) -> anyhow::Result<()> {
    let config = args.config()?;
    info!(
        n_cycles = config.n_cycles,
        data_process = %config.data_process,
        t1 = config.t1,
        t2 = config.t2,
        "Running fidelity experiment"
    );
    let run = fidelity_from_scratch(&config)?;
    let error_rate = match config.snapshot_type {
        SnapshotType::Dm => get_error_rate(&run.fidelities, run.times.as_ref()).ok(),
        SnapshotType::Exp => None,
    };

    if args.format == OutputFormat::Json || args.output.is_some() {
        let report = Report::new(
            "fidelity",
            FidelityReport {
                config,
                run,
                error_rate,
            },
        );
        let json = to_json(&report, &ExportConfig::default())?;
        return emit_json(&json, args.output.as_deref());
    }

    let value_name = match config.snapshot_type {
        SnapshotType::Dm => "Fidelity",
        SnapshotType::Exp => "Expectation",
    };
    println!(
        "\n{} {} cycles, {} ({})",
        style("✓").green().bold(),
        config.n_cycles,
        config.data_process,
        config.snapshot_type
    );
    println!();
    println!("  {:>5}  {:>10}  {:>12}  {:>10}", "Cycle", "Time (µs)", value_name, "Shots");
    for (cycle, value) in run.fidelities.iter().enumerate() {
        let time = run
            .times
            .as_ref()
            .and_then(|t| t.snapshots.get(cycle))
            .map_or_else(|| "-".to_string(), |(_, t)| format_us(*t));
        let shots = run
            .select_counts
            .as_ref()
            .and_then(|c| c.get(cycle))
            .map_or_else(|| "-".to_string(), |c| format!("{c:.0}"));
        println!("  {cycle:>5}  {time:>10}  {value:>12.6}  {shots:>10}");
    }

    if let Some(rate) = error_rate {
        let unit = if run.times.is_some() { "µs" } else { "cycle" };
        println!();
        println!(
            "  Error rate:  {:.4e} per {} (fit error {:.2e})",
            -rate.theta[1],
            unit,
            rate.mse
        );
    }
    Ok(())
}
