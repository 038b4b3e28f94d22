//! Sweep command implementation.
//!
//! `qecsim sweep --config sweep.yaml [--output FILE]` or inline axes such as
//! `qecsim sweep --t1 40000,50000 --t2 60000 --mode single_qubit`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::info;

use qecsim_analysis::{
    SweepMode, SweepOptions, SweepParameters, SweepResult, get_array_indexes,
    sweep_parameter_space,
};
use qecsim_sim::GateTimes;

use super::common::format_us;

/// Arguments of `qecsim sweep`.
#[derive(Debug, Args)]
pub struct SweepArgs {
    /// YAML file with parameter axes and options
    #[arg(short, long)]
    pub config: Option<String>,

    /// T1 values in ns, comma separated
    #[arg(long, value_delimiter = ',')]
    pub t1: Option<Vec<f64>>,

    /// T2 values in ns, comma separated
    #[arg(long, value_delimiter = ',')]
    pub t2: Option<Vec<f64>>,

    /// Single-qubit gate times in ns, comma separated
    #[arg(long, value_delimiter = ',')]
    pub single_qubit_gate: Option<Vec<f64>>,

    /// Two-qubit gate times in ns, comma separated
    #[arg(long, value_delimiter = ',')]
    pub two_qubit_gate: Option<Vec<f64>>,

    /// Measurement times in ns, comma separated
    #[arg(long, value_delimiter = ',')]
    pub measure: Option<Vec<f64>>,

    /// Feedback times in ns, comma separated
    #[arg(long, value_delimiter = ',')]
    pub feedback: Option<Vec<f64>>,

    /// Scale all standard gate times by each factor instead of listing them
    #[arg(long, value_delimiter = ',')]
    pub scale: Option<Vec<f64>>,

    /// Number of stabilizer cycles
    #[arg(short = 'n', long)]
    pub n_cycles: Option<usize>,

    /// Number of shots
    #[arg(short, long)]
    pub shots: Option<u32>,

    /// Experiment per point (full, single_qubit, perfect_stab)
    #[arg(short, long)]
    pub mode: Option<SweepMode>,

    /// Polar angle of the prepared state
    #[arg(long, allow_negative_numbers = true)]
    pub theta: Option<f64>,

    /// Azimuthal angle of the prepared state
    #[arg(long, allow_negative_numbers = true)]
    pub phi: Option<f64>,

    /// Output file for the JSON result
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Contents of a sweep YAML file.
///
/// Axes and options sit side by side at the top level; `scale` replaces the
/// four gate-time axes with scaled standard times.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SweepFile {
    /// Swept axes.
    #[serde(flatten)]
    pub parameters: SweepParameters,
    /// Shared settings.
    #[serde(flatten)]
    pub options: SweepOptions,
    /// Gate-time scalings.
    pub scale: Option<Vec<f64>>,
}

impl SweepFile {
    /// Parse a sweep file.
    pub fn from_yaml(source: &str) -> Result<Self> {
        serde_yaml_ng::from_str(source).context("Invalid sweep configuration")
    }

    fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("File not found: {path}");
        }
        let source =
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
        Self::from_yaml(&source)
    }
}

impl SweepArgs {
    /// Parameters and options from the config file, overridden by flags.
    pub fn resolve(&self) -> Result<(SweepParameters, SweepOptions)> {
        let file = match &self.config {
            Some(path) => SweepFile::load(path)?,
            None => SweepFile::default(),
        };
        let mut parameters = file.parameters;
        let mut options = file.options;

        if let Some(scale) = self.scale.as_ref().or(file.scale.as_ref()) {
            parameters = SweepParameters::from_scalings(
                parameters.t1,
                parameters.t2,
                &GateTimes::wacqt(),
                scale,
            );
        }
        let axes = [
            (&self.t1, &mut parameters.t1),
            (&self.t2, &mut parameters.t2),
            (&self.single_qubit_gate, &mut parameters.single_qubit_gate),
            (&self.two_qubit_gate, &mut parameters.two_qubit_gate),
            (&self.measure, &mut parameters.measure),
            (&self.feedback, &mut parameters.feedback),
        ];
        for (flag, axis) in axes {
            if let Some(values) = flag {
                axis.clone_from(values);
            }
        }

        if let Some(n) = self.n_cycles {
            options.n_cycles = n;
        }
        if let Some(shots) = self.shots {
            options.shots = shots;
        }
        if let Some(mode) = self.mode {
            options.mode = mode;
        }
        if let Some(theta) = self.theta {
            options.theta = theta;
        }
        if let Some(phi) = self.phi {
            options.phi = phi;
        }
        if let Some(output) = &self.output {
            options.save = Some(PathBuf::from(output));
        }
        Ok((parameters, options))
    }
}

fn print_summary(result: &SweepResult) {
    let shape = result.lifetimes.shape().to_vec();
    println!();
    println!(
        "  {:>9} {:>9} {:>7} {:>7} {:>7} {:>7}  {:>12}  {:>10}",
        "T1 (µs)", "T2 (µs)", "1q", "2q", "meas", "fb", "T_L (µs)", "σ (µs)"
    );
    for flat in 0..result.lifetimes.len() {
        let index = get_array_indexes(flat, &shape);
        let point = result.parameters.point(&index);
        let lifetime = result.lifetimes[index.as_slice()];
        let sigma = result.variances[index.as_slice()].sqrt();
        let fitted = if point.t2 > 2.0 * point.t1 {
            format!("{:>12}  {:>10}", "skipped", "-")
        } else {
            format!("{:>12}  {:>10}", format_us(lifetime), format_us(sigma))
        };
        println!(
            "  {:>9} {:>9} {:>7} {:>7} {:>7} {:>7}  {}",
            format_us(point.t1),
            format_us(point.t2),
            point.single_qubit_gate,
            point.two_qubit_gate,
            point.measure,
            point.feedback,
            fitted
        );
    }
}

/// Execute the sweep command.
pub fn execute(args: &SweepArgs) -> Result<()> {
    let (parameters, options) = args.resolve()?;
    let total = parameters.len();
    info!(points = total, mode = %options.mode, "Starting parameter sweep");

    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let result = sweep_parameter_space(&parameters, &options, |step| {
        progress.set_position(step.done as u64);
        progress.set_message(format!(
            "T1={} µs T2={} µs",
            format_us(step.point.t1),
            format_us(step.point.t2)
        ));
    });
    progress.finish_and_clear();
    let result = result?;

    println!(
        "{} Swept {} points ({} skipped), mode {}",
        style("✓").green().bold(),
        total,
        result.skipped,
        options.mode
    );
    print_summary(&result);
    if let Some(path) = &options.save {
        eprintln!(
            "{} Result written to {}",
            style("OK").green().bold(),
            path.display()
        );
    }
    Ok(())
}
