//! Configuration discovery and effective settings resolution.
//!
//! Copyguard reads `copyguard.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config. Defaults:
//! - `solution`: none (projects are globbed instead)
//! - `patterns`: `["**/*.*proj"]`
//! - `element`: `CopyToOutputDirectory`
//! - `offending`: `Always`
//! - `accepted`: `PreserveNewest`
//! - `output`: `human`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::orchestrator::{Settings, DEFAULT_ACCEPTED, DEFAULT_ELEMENT, DEFAULT_OFFENDING};
use crate::tree::directory::DEFAULT_PATTERN;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 3] = ["copyguard.toml", "copyguard.yaml", "copyguard.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `copyguard.toml|yaml`.
pub struct CopyguardConfig {
    pub solution: Option<String>,
    pub patterns: Option<Vec<String>>,
    pub element: Option<String>,
    pub offending: Option<String>,
    pub accepted: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    /// Solution file, already joined onto `repo_root`.
    pub solution: Option<PathBuf>,
    pub patterns: Vec<String>,
    pub element: String,
    pub offending: String,
    pub accepted: String,
    pub output: String,
    /// Whether a config file was found and parsed.
    pub config_loaded: bool,
}

impl Effective {
    pub fn settings(&self) -> Settings {
        Settings::new(&self.element, &self.offending, &self.accepted)
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Missing,
    Loaded(CopyguardConfig),
    /// A config file exists but could not be read or parsed.
    Invalid { path: PathBuf, reason: String },
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `copyguard.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `CopyguardConfig` from `copyguard.toml` or `copyguard.yaml|yml`.
pub fn load_config(root: &Path) -> LoadOutcome {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let text = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                return LoadOutcome::Invalid {
                    path,
                    reason: e.to_string(),
                }
            }
        };
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<CopyguardConfig>(&text).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<CopyguardConfig>(&text).map_err(|e| e.to_string())
        };
        return match parsed {
            Ok(cfg) => LoadOutcome::Loaded(cfg),
            Err(reason) => LoadOutcome::Invalid { path, reason },
        };
    }
    LoadOutcome::Missing
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_solution: Option<&str>,
    cli_output: Option<&str>,
) -> (Effective, LoadOutcome) {
    let start = absolute(Path::new(cli_repo_root.unwrap_or(".")));
    let repo_root = detect_repo_root(&start);
    let outcome = load_config(&repo_root);
    let (cfg, config_loaded) = match &outcome {
        LoadOutcome::Loaded(c) => (c.clone(), true),
        _ => (CopyguardConfig::default(), false),
    };

    let solution = cli_solution
        .map(str::to_string)
        .or(cfg.solution)
        .map(|s| repo_root.join(s));
    let patterns = cfg
        .patterns
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| vec![DEFAULT_PATTERN.to_string()]);
    let output = cli_output
        .map(str::to_string)
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let eff = Effective {
        solution,
        patterns,
        element: cfg.element.unwrap_or_else(|| DEFAULT_ELEMENT.to_string()),
        offending: cfg.offending.unwrap_or_else(|| DEFAULT_OFFENDING.to_string()),
        accepted: cfg.accepted.unwrap_or_else(|| DEFAULT_ACCEPTED.to_string()),
        output,
        config_loaded,
        repo_root,
    };
    (eff, outcome)
}

/// Make `p` absolute against the current directory; descriptors are only
/// loaded from rooted paths.
pub fn absolute(p: &Path) -> PathBuf {
    if p.is_absolute() {
        return p.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => {
            let joined = cwd.join(p);
            fs::canonicalize(&joined).unwrap_or(joined)
        }
        Err(_) => p.to_path_buf(),
    }
}
