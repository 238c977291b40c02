use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory where CSV files and the report are written.
    pub out_dir: PathBuf,
    /// Row count applied to entities without an explicit count.
    pub default_rows: u64,
    /// Seed for reproducible value synthesis.
    pub seed: u64,
    /// Infer one-to-one/one-to-many key distribution from row counts.
    pub auto_cardinality: bool,
    /// Drop relationship edges that would close a dependency cycle.
    pub prevent_cycles: bool,
    /// Write generation_report.json next to the CSV files.
    pub write_report: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            default_rows: 10,
            seed: 42,
            auto_cardinality: true,
            prevent_cycles: true,
            write_report: true,
        }
    }
}

/// Per-entity row counts keyed by entity external identifier.
///
/// An empty map means the uniform default applies everywhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowCounts {
    #[serde(default)]
    pub counts: BTreeMap<String, u64>,
}

impl RowCounts {
    pub fn uniform() -> Self {
        Self::default()
    }

    pub fn set(&mut self, external_id: &str, rows: u64) {
        self.counts.insert(external_id.to_string(), rows);
    }

    pub fn rows_for(&self, external_id: &str, default_rows: u64) -> u64 {
        self.counts.get(external_id).copied().unwrap_or(default_rows)
    }
}

/// Summary of one generated entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityReport {
    pub entity: String,
    pub external_id: String,
    pub rows_requested: u64,
    pub rows_generated: u64,
    pub file: String,
}

/// Structured generation issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub entities: Vec<EntityReport>,
    pub total_rows: u64,
    pub files_written: u64,
    pub warnings_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<GenerationIssue>,
    pub duration_ms: u64,
    pub bytes_written: u64,
}

impl GenerationReport {
    pub fn new(run_id: String) -> Self {
        Self {
            run_id,
            entities: Vec::new(),
            total_rows: 0,
            files_written: 0,
            warnings_by_code: BTreeMap::new(),
            warnings: Vec::new(),
            duration_ms: 0,
            bytes_written: 0,
        }
    }

    pub fn record_warning(&mut self, issue: GenerationIssue) {
        *self.warnings_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.warnings.push(issue);
    }
}
