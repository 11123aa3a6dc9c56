//! Shared data models: project tree nodes, scan occurrences, and the
//! aggregated report handed to the output sink.

pub mod project;

pub use project::{ProjectKind, ProjectRef};

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One instance of the target setting carrying the offending value.
pub struct Occurrence {
    /// Text value of the setting element as found in the file.
    pub value: String,
    /// `Include` attribute of the parent item, when present.
    pub include: Option<String>,
}

impl Occurrence {
    /// Resource this setting applies to, falling back to the raw value.
    pub fn resource(&self) -> &str {
        match self.include.as_deref() {
            Some(inc) if !inc.is_empty() => inc,
            _ => &self.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Offending occurrences found in one concrete project.
pub struct ScanResult {
    pub project: ProjectRef,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A project with at least one offending resource.
pub struct ReportEntry {
    pub project: String,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Ordered check report; projects appear in enumeration order.
pub struct Report {
    pub projects: Vec<ReportEntry>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Total number of offending resources across all projects.
    pub fn resource_count(&self) -> usize {
        self.projects.iter().map(|p| p.resources.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FixStatus {
    Updated,
    Unchanged,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Result of correcting one project's descriptor.
pub struct FixOutcome {
    pub project: String,
    pub path: PathBuf,
    pub status: FixStatus,
    pub error: Option<String>,
}
