//! Idle comparison command implementation.
//!
//! `qecsim idle --t-max 100000 --points 11`

use clap::Args;
use serde::Serialize;

use qecsim_analysis::{
    ExportConfig, IdleCurves, Report, idle_encoded_curves, idle_single_qubit_curves,
    single_qubit_z, time_grid, to_json,
};
use qecsim_code::logical_z;

use super::common::{OutputFormat, emit_json, format_us};

/// Arguments of `qecsim idle`.
#[derive(Debug, Args)]
pub struct IdleArgs {
    /// Last sample time in ns
    #[arg(long, default_value = "100000")]
    pub t_max: f64,

    /// Number of evenly spaced samples
    #[arg(short, long, default_value = "11")]
    pub points: usize,

    /// Relaxation time T1 in ns
    #[arg(long, default_value = "40000")]
    pub t1: f64,

    /// Dephasing time T2 in ns
    #[arg(long, default_value = "60000")]
    pub t2: f64,

    /// Polar angle of the prepared state
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub theta: f64,

    /// Azimuthal angle of the prepared state
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub phi: f64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output file for the JSON report (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Serialize)]
struct IdleReport {
    t1: f64,
    t2: f64,
    theta: f64,
    phi: f64,
    single_qubit: IdleCurves,
    encoded: IdleCurves,
}

/// Execute the idle command.
pub fn execute(args: &IdleArgs) -> anyhow::Result<()> {
    if args.points == 0 {
        anyhow::bail!("--points must be at least 1");
    }
    let times = time_grid(0.0, args.t_max, args.points);
    let single = idle_single_qubit_curves(
        &times,
        args.t1,
        args.t2,
        args.theta,
        args.phi,
        &single_qubit_z(),
    )?;
    let encoded = idle_encoded_curves(&times, args.t1, args.t2, args.theta, args.phi, &logical_z())?;

    if args.format == OutputFormat::Json || args.output.is_some() {
        let report = Report::new(
            "idle",
            IdleReport {
                t1: args.t1,
                t2: args.t2,
                theta: args.theta,
                phi: args.phi,
                single_qubit: single,
                encoded,
            },
        );
        let json = to_json(&report, &ExportConfig::default())?;
        return emit_json(&json, args.output.as_deref());
    }

    println!(
        "  {:>10}  {:>9}  {:>9}  {:>9}  {:>9}",
        "Time (µs)", "F_qubit", "F_code", "F_L", "P_L"
    );
    let logical = encoded.logical_fidelity.unwrap_or_default();
    let p_l = encoded.code_space_probability.unwrap_or_default();
    for (i, &t) in times.iter().enumerate() {
        println!(
            "  {:>10}  {:>9.5}  {:>9.5}  {:>9.5}  {:>9.5}",
            format_us(t),
            single.fidelity[i],
            encoded.fidelity[i],
            logical.get(i).copied().unwrap_or(f64::NAN),
            p_l.get(i).copied().unwrap_or(f64::NAN),
        );
    }
    Ok(())
}
