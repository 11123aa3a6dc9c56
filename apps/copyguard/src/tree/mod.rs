//! Project tree providers and the depth-first enumerator.
//!
//! Providers are not assumed to be safe for concurrent access, so every
//! call goes through a `Coordinator`, which serialises access behind a lock.

pub mod directory;
pub mod solution;

pub use directory::DirectoryTree;
pub use solution::SolutionTree;

use crate::models::{ProjectKind, ProjectRef};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

/// Read-only view of a project tree.
pub trait TreeProvider {
    /// Top-level nodes in their native order.
    fn roots(&self) -> Vec<ProjectRef>;
    /// Children of a grouping node in their native order.
    fn children(&self, group: &ProjectRef) -> Vec<ProjectRef>;
}

impl<T: TreeProvider + ?Sized> TreeProvider for Box<T> {
    fn roots(&self) -> Vec<ProjectRef> {
        (**self).roots()
    }

    fn children(&self, group: &ProjectRef) -> Vec<ProjectRef> {
        (**self).children(group)
    }
}

/// Flatten the tree into concrete projects with a path, depth-first.
///
/// Unsupported nodes and projects without a path (not loaded yet) are
/// dropped silently. A group seen twice in one walk is not descended into
/// again, so a provider that reports a cycle cannot loop forever.
pub fn enumerate<P: TreeProvider + ?Sized>(provider: &P) -> Vec<ProjectRef> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    walk(provider, provider.roots(), &mut visited, &mut out);
    out
}

fn walk<P: TreeProvider + ?Sized>(
    provider: &P,
    nodes: Vec<ProjectRef>,
    visited: &mut HashSet<String>,
    out: &mut Vec<ProjectRef>,
) {
    for node in nodes {
        match node.kind {
            ProjectKind::Unsupported => {
                tracing::debug!(project = %node.name, "skipping unsupported project kind");
            }
            ProjectKind::Group => {
                if !visited.insert(node.id.clone()) {
                    tracing::warn!(
                        group = %node.name,
                        "group already visited; not descending again"
                    );
                    continue;
                }
                let children = provider.children(&node);
                walk(provider, children, visited, out);
            }
            ProjectKind::Concrete => {
                if node.has_path() {
                    out.push(node);
                } else {
                    tracing::debug!(project = %node.name, "project not loaded; skipping");
                }
            }
        }
    }
}

/// Owner of the tree provider. All provider calls are made through `with`.
pub struct Coordinator {
    provider: Mutex<Box<dyn TreeProvider + Send>>,
}

impl Coordinator {
    pub fn new(provider: impl TreeProvider + Send + 'static) -> Self {
        Self {
            provider: Mutex::new(Box::new(provider)),
        }
    }

    /// Run `f` with exclusive access to the provider.
    pub fn with<R>(&self, f: impl FnOnce(&dyn TreeProvider) -> R) -> R {
        let guard = self.provider.lock().unwrap_or_else(PoisonError::into_inner);
        f(guard.as_ref())
    }

    pub fn enumerate(&self) -> Vec<ProjectRef> {
        self.with(|p| enumerate(p))
    }
}

#[derive(Debug, Default, Clone)]
/// In-memory tree built programmatically.
///
/// Children are keyed by the parent's `id`; links are not validated, so a
/// group may (mis)list one of its ancestors.
pub struct StaticTree {
    roots: Vec<ProjectRef>,
    children: HashMap<String, Vec<ProjectRef>>,
}

impl StaticTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, node: ProjectRef) -> Self {
        self.roots.push(node);
        self
    }

    pub fn child(mut self, parent_id: &str, node: ProjectRef) -> Self {
        self.children
            .entry(parent_id.to_string())
            .or_default()
            .push(node);
        self
    }

    pub(crate) fn push_root(&mut self, node: ProjectRef) {
        self.roots.push(node);
    }

    pub(crate) fn push_child(&mut self, parent_id: &str, node: ProjectRef) {
        self.children
            .entry(parent_id.to_string())
            .or_default()
            .push(node);
    }
}

impl TreeProvider for StaticTree {
    fn roots(&self) -> Vec<ProjectRef> {
        self.roots.clone()
    }

    fn children(&self, group: &ProjectRef) -> Vec<ProjectRef> {
        self.children.get(&group.id).cloned().unwrap_or_default()
    }
}
