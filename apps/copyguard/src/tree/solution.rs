//! Visual Studio solution (`.sln`) tree provider.

use super::{StaticTree, TreeProvider};
use crate::error::TreeError;
use crate::models::ProjectRef;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Project type GUID of a solution folder.
pub const SOLUTION_FOLDER_KIND: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";
/// Project type GUID of a web site project (directory-based, no descriptor).
pub const WEB_SITE_KIND: &str = "E24C65DC-7377-472B-9ABA-BC803B73C61A";

const PROJECT_LINE: &str = r#"(?m)^\s*Project\("\{([0-9A-Fa-f-]+)\}"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)"\s*,\s*"\{([0-9A-Fa-f-]+)\}""#;
const NESTED_SECTION: &str =
    r"(?s)GlobalSection\(NestedProjects\)[^\r\n]*(.*?)EndGlobalSection";
const NESTED_LINE: &str = r"(?m)^\s*\{([0-9A-Fa-f-]+)\}\s*=\s*\{([0-9A-Fa-f-]+)\}";

#[derive(Debug, Clone)]
/// Tree read from a solution file, with paths resolved against its directory.
pub struct SolutionTree {
    path: PathBuf,
    tree: StaticTree,
}

impl SolutionTree {
    pub fn open(path: &Path) -> Result<Self, TreeError> {
        let read_err = |source| TreeError::Read {
            path: path.to_path_buf(),
            source,
        };
        let text = fs::read_to_string(path).map_err(read_err)?;
        let abs = fs::canonicalize(path).map_err(read_err)?;
        let base = abs.parent().unwrap_or_else(|| Path::new("/")).to_path_buf();
        let mut tree = Self::parse(&text, &base);
        tree.path = abs;
        Ok(tree)
    }

    /// Parse solution text. Project paths are joined onto `base_dir`.
    pub fn parse(text: &str, base_dir: &Path) -> Self {
        let mut nodes: Vec<(String, ProjectRef)> = Vec::new();
        if let Ok(re) = Regex::new(PROJECT_LINE) {
            for cap in re.captures_iter(text) {
                let kind = cap[1].to_ascii_uppercase();
                let guid = cap[4].to_ascii_uppercase();
                nodes.push((guid.clone(), make_node(&kind, &cap[2], &cap[3], &guid, base_dir)));
            }
        }

        let parents = nested_projects(text);
        let known: std::collections::HashSet<&str> =
            nodes.iter().map(|(g, _)| g.as_str()).collect();

        let mut tree = StaticTree::new();
        for (guid, node) in &nodes {
            match parents.get(guid) {
                Some(parent) if known.contains(parent.as_str()) => {
                    tree.push_child(parent, node.clone())
                }
                _ => tree.push_root(node.clone()),
            }
        }
        Self {
            path: PathBuf::new(),
            tree,
        }
    }

    /// Absolute location of the solution file (empty when parsed from text).
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn make_node(kind: &str, name: &str, rel: &str, guid: &str, base_dir: &Path) -> ProjectRef {
    match kind {
        SOLUTION_FOLDER_KIND => ProjectRef::group(guid, name),
        WEB_SITE_KIND => ProjectRef::unsupported(name, rel).with_id(guid),
        _ => {
            let path = if rel.trim().is_empty() {
                PathBuf::new()
            } else {
                base_dir.join(rel.replace('\\', "/"))
            };
            ProjectRef::concrete(name, path).with_id(guid)
        }
    }
}

/// Map of child GUID to parent GUID from the `NestedProjects` section.
fn nested_projects(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let (Ok(section), Ok(line)) = (Regex::new(NESTED_SECTION), Regex::new(NESTED_LINE)) else {
        return map;
    };
    for sec in section.captures_iter(text) {
        for cap in line.captures_iter(&sec[1]) {
            map.insert(cap[1].to_ascii_uppercase(), cap[2].to_ascii_uppercase());
        }
    }
    map
}

impl TreeProvider for SolutionTree {
    fn roots(&self) -> Vec<ProjectRef> {
        self.tree.roots()
    }

    fn children(&self, group: &ProjectRef) -> Vec<ProjectRef> {
        self.tree.children(group)
    }
}
