//! JSON output of experiment results.
//!
//! Every result is wrapped in a [`Report`] carrying a schema version and
//! an RFC 3339 creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::Path;

use crate::error::{AnalysisError, AnalysisResult};

/// Schema version of exported reports.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Whether to pretty-print JSON output.
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// A result with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report<T> {
    /// Report schema version.
    pub schema_version: String,
    /// Which experiment produced `data`, e.g. `fidelity`.
    pub kind: String,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Crate version that produced the report.
    pub generator: String,
    /// The result itself.
    pub data: T,
}

impl<T> Report<T> {
    /// Wrap `data` produced by experiment `kind`, stamped now.
    pub fn new(kind: impl Into<String>, data: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            kind: kind.into(),
            created_at: Utc::now(),
            generator: format!("qecsim {}", env!("CARGO_PKG_VERSION")),
            data,
        }
    }
}

/// Serialize `value` to a JSON string.
pub fn to_json<T: Serialize + ?Sized>(value: &T, config: &ExportConfig) -> AnalysisResult<String> {
    if config.pretty {
        serde_json::to_string_pretty(value).map_err(AnalysisError::from)
    } else {
        serde_json::to_string(value).map_err(AnalysisError::from)
    }
}

/// Serialize `value` to a JSON file.
pub fn to_file<T: Serialize + ?Sized>(
    value: &T,
    path: &Path,
    config: &ExportConfig,
) -> AnalysisResult<()> {
    let json = to_json(value, config)?;
    std::fs::write(path, json)
        .map_err(|e| AnalysisError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

/// Read a JSON file written by [`to_file`].
pub fn from_file<T: DeserializeOwned>(path: &Path) -> AnalysisResult<T> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| AnalysisError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&json)?)
}
