//! Copyguard core library.
//!
//! Audits a tree of MSBuild project files for items whose
//! `CopyToOutputDirectory` is `Always`, reports them grouped by project, and
//! rewrites them in place without touching the rest of each file.
//!
//! High-level modules:
//! - `tree`: Project tree providers (solution, directory, in-memory) and the enumerator.
//! - `descriptor`: Loading project files with BOM-based encoding detection.
//! - `scan`: Locating offending settings in a descriptor.
//! - `correct`: Literal marker substitution and encoding-preserving write-back.
//! - `report`: Aggregation into a report and line rendering.
//! - `orchestrator`: Check/fix passes and event dispatch.
//! - `events`: Tree events, subscriptions and the host lifecycle.
//! - `output`: Report sinks and JSON composition.
//! - `config`: Discovery and effective configuration resolution.
//! - `cli`: CLI argument parsing (binary uses this).
pub mod cli;
pub mod config;
pub mod correct;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod report;
pub mod scan;
pub mod tree;
pub mod utils;
