//! Project tree nodes as exposed by a tree provider.

use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Closed set of node kinds a provider can report.
pub enum ProjectKind {
    /// A project backed by its own descriptor file.
    Concrete,
    /// A grouping node (solution folder); children come from the provider.
    Group,
    /// A project kind without a loadable descriptor (e.g. web sites).
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A node of the project tree. Built fresh on every enumeration.
pub struct ProjectRef {
    /// Provider-unique identity, used to guard against revisiting groups.
    pub id: String,
    pub name: String,
    /// Descriptor location; empty while the project is not loaded.
    pub path: PathBuf,
    pub kind: ProjectKind,
}

impl ProjectRef {
    /// A concrete project identified by its descriptor path.
    pub fn concrete(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: path.to_string_lossy().to_string(),
            name: name.into(),
            path,
            kind: ProjectKind::Concrete,
        }
    }

    pub fn group(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: PathBuf::new(),
            kind: ProjectKind::Group,
        }
    }

    pub fn unsupported(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ProjectKind::Unsupported,
            ..Self::concrete(name, path)
        }
    }

    /// Replace the identity (providers with their own ids, e.g. GUIDs).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Concrete project named after the descriptor's file stem.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self::concrete(name, path)
    }

    pub fn has_path(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }
}
