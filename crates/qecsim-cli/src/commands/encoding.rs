//! Encoding command implementation.
//!
//! `qecsim encoding --theta 1.2 --phi 0.3`

use clap::Args;
use console::style;
use serde::Serialize;

use qecsim_analysis::{ExportConfig, Report, encoding_fidelity, to_json};
use qecsim_code::SnapshotType;
use qecsim_ir::PauliString;

use super::common::{OutputFormat, emit_json, gate_times};

/// Arguments of `qecsim encoding`.
#[derive(Debug, Args)]
pub struct EncodingArgs {
    /// Number of shots
    #[arg(short, long, default_value = "2048")]
    pub shots: u32,

    /// Relaxation time T1 in ns
    #[arg(long, default_value = "40000")]
    pub t1: f64,

    /// Dephasing time T2 in ns
    #[arg(long, default_value = "60000")]
    pub t2: f64,

    /// Disable relaxation in idle gaps
    #[arg(long)]
    pub no_idle_noise: bool,

    /// Polar angle of the input state
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub theta: f64,

    /// Azimuthal angle of the input state
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub phi: f64,

    /// Snapshot type (dm, exp)
    #[arg(long, default_value = "dm")]
    pub snapshot_type: SnapshotType,

    /// Observable of expectation snapshots
    #[arg(long, default_value = "ZZZZZ")]
    pub pauli: PauliString,

    /// Gate time override NAME=NS (repeatable)
    #[arg(short, long = "gate-time")]
    pub gate_times: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct EncodingReport {
    theta: f64,
    phi: f64,
    t1: f64,
    t2: f64,
    snapshot_type: SnapshotType,
    value: f64,
}

/// Execute the encoding command.
pub fn execute(args: &EncodingArgs) -> anyhow::Result<()> {
    let value = encoding_fidelity(
        args.shots,
        &gate_times(&args.gate_times)?,
        args.t1,
        args.t2,
        !args.no_idle_noise,
        args.theta,
        args.phi,
        args.snapshot_type,
        &args.pauli,
    )?;

    match args.format {
        OutputFormat::Json => {
            let report = Report::new(
                "encoding",
                EncodingReport {
                    theta: args.theta,
                    phi: args.phi,
                    t1: args.t1,
                    t2: args.t2,
                    snapshot_type: args.snapshot_type,
                    value,
                },
            );
            emit_json(&to_json(&report, &ExportConfig::default())?, None)
        }
        OutputFormat::Table => {
            let label = match args.snapshot_type {
                SnapshotType::Dm => "Encoding fidelity".to_string(),
                SnapshotType::Exp => format!("<{}> after encoding", args.pauli),
            };
            println!("{} {}: {:.6}", style("✓").green().bold(), label, value);
            Ok(())
        }
    }
}
