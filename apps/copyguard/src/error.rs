//! Error types for project scanning and correction.
//!
//! Every `ProjectError` is scoped to a single project: the project is
//! skipped (check) or left untouched (fix) and the run continues.

use crate::models::ProjectRef;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("path is not absolute: '{}'", path.display())]
    PathUnresolved { path: PathBuf },

    #[error("descriptor not found or unreadable: '{}'", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("project is directory-based and has no descriptor file: '{}'", path.display())]
    NotAFile { path: PathBuf },

    #[error("unsupported project kind: '{}'", path.display())]
    UnsupportedProjectKind { path: PathBuf },

    #[error("descriptor is not valid {encoding}: '{}'", path.display())]
    Undecodable {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("failed to parse '{}': {reason}", path.display())]
    ParseFailure { path: PathBuf, reason: String },

    #[error("failed to write '{}'", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProjectError {
    /// Short machine-friendly kind label used in logs and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            ProjectError::PathUnresolved { .. } => "path-unresolved",
            ProjectError::NotFound { .. } => "not-found",
            ProjectError::NotAFile { .. } => "not-a-file",
            ProjectError::UnsupportedProjectKind { .. } => "unsupported-project-kind",
            ProjectError::Undecodable { .. } => "undecodable",
            ProjectError::ParseFailure { .. } => "parse-failure",
            ProjectError::WriteFailure { .. } => "write-failure",
        }
    }
}

#[derive(Debug)]
/// A project that was skipped, with the reason.
pub struct ProjectFailure {
    pub project: ProjectRef,
    pub error: ProjectError,
}

/// Errors raised while building a tree provider (before any project runs).
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("failed to read solution '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("project root is not accessible: '{}'", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid project pattern '{pattern}'")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

pub type Result<T, E = ProjectError> = std::result::Result<T, E>;
