//! Shared helpers for CLI commands.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use console::style;

use qecsim_sim::GateTimes;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// JSON report.
    Json,
}

/// Parse one `name=ns` gate time override.
pub fn parse_gate_time(entry: &str) -> Result<(String, f64)> {
    let (name, value) = entry
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected NAME=NS for a gate time, got '{entry}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration in gate time '{entry}'"))?;
    Ok((name.trim().to_string(), value))
}

/// Standard gate times with `entries` merged on top.
pub fn gate_times(entries: &[String]) -> Result<GateTimes> {
    let custom = entries
        .iter()
        .map(|e| parse_gate_time(e))
        .collect::<Result<BTreeMap<_, _>>>()?;
    Ok(GateTimes::wacqt().get_gate_times(&custom))
}

/// Print `json` to stdout, or write it to `output`.
pub fn emit_json(json: &str, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(Path::new(path), json)
                .with_context(|| format!("Failed to write {path}"))?;
            eprintln!("{} Report written to {}", style("OK").green().bold(), path);
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Nanoseconds as microseconds with two decimals.
pub fn format_us(ns: f64) -> String {
    format!("{:.2}", ns * 1e-3)
}
