//! Glob-based provider used when no solution file is configured.

use super::TreeProvider;
use crate::error::TreeError;
use crate::models::ProjectRef;
use glob::{glob, Pattern};
use std::fs;
use std::path::{Path, PathBuf};

/// Default pattern: any MSBuild-style project file below the root.
pub const DEFAULT_PATTERN: &str = "**/*.*proj";

#[derive(Debug, Clone)]
/// Flat tree of every project file matched under a root directory.
pub struct DirectoryTree {
    projects: Vec<ProjectRef>,
}

impl DirectoryTree {
    /// Match `patterns` (relative to `root`) and collect the results sorted by path.
    pub fn scan(root: &Path, patterns: &[String]) -> Result<Self, TreeError> {
        let root = fs::canonicalize(root).map_err(|source| TreeError::Root {
            path: root.to_path_buf(),
            source,
        })?;
        // The root is literal text; only the user patterns may glob.
        let base = Pattern::escape(&root.to_string_lossy());
        let mut paths: Vec<PathBuf> = Vec::new();
        for pat in patterns {
            let pattern = format!("{}/{}", base.trim_end_matches('/'), pat);
            let entries = glob(&pattern).map_err(|source| TreeError::Glob {
                pattern: pat.clone(),
                source,
            })?;
            for entry in entries {
                match entry {
                    Ok(p) if p.is_file() => paths.push(p),
                    Ok(_) => {}
                    Err(e) => tracing::debug!(error = %e, "unreadable path while globbing"),
                }
            }
        }
        paths.sort();
        paths.dedup();
        Ok(Self {
            projects: paths.iter().map(|p| ProjectRef::from_path(p)).collect(),
        })
    }
}

impl TreeProvider for DirectoryTree {
    fn roots(&self) -> Vec<ProjectRef> {
        self.projects.clone()
    }

    fn children(&self, _group: &ProjectRef) -> Vec<ProjectRef> {
        Vec::new()
    }
}
