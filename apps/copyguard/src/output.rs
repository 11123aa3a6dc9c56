//! Output sinks for check reports and fix runs.
//!
//! Supports `human` (default) and `json` outputs. Human output goes through
//! a `ReportSink`; every block of lines is written under one lock so
//! concurrent triggers never interleave.

use crate::error::ProjectFailure;
use crate::models::{FixOutcome, FixStatus, Report};
use crate::report::{self, LineRole, ReportLine};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for report lines.
pub trait ReportSink: Send {
    fn write_line(&mut self, line: &ReportLine);
    /// Bring the output to the user's attention.
    fn activate(&mut self);
}

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Writes lines to stdout, colouring them by role.
pub struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    pub fn new(output: &str) -> Self {
        Self {
            color: use_colors(output),
        }
    }

    fn paint(&self, line: &ReportLine) -> String {
        let text = line.text.as_str();
        if !self.color {
            return text.to_string();
        }
        match line.role {
            LineRole::Header => text.yellow().bold().to_string(),
            LineRole::Resource => match text.strip_prefix("- ") {
                Some(rest) => format!("{} {}", "-".cyan(), rest),
                None => text.to_string(),
            },
            LineRole::Updated => text.green().to_string(),
            LineRole::Unchanged => text.bright_black().to_string(),
            LineRole::Failed => text.red().to_string(),
            LineRole::Summary => text.bold().to_string(),
            LineRole::Note | LineRole::Blank | LineRole::Project => text.to_string(),
        }
    }
}

impl ReportSink for ConsoleSink {
    fn write_line(&mut self, line: &ReportLine) {
        println!("{}", self.paint(line));
    }

    fn activate(&mut self) {}
}

#[derive(Clone, Default)]
/// Records lines in memory; clones share the same buffer.
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
    activations: Arc<Mutex<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn activations(&self) -> usize {
        *self
            .activations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReportSink for MemorySink {
    fn write_line(&mut self, line: &ReportLine) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.text.clone());
    }

    fn activate(&mut self) {
        *self
            .activations
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
    }
}

/// Single logical writer around any sink.
pub struct SharedSink {
    inner: Mutex<Box<dyn ReportSink>>,
}

impl SharedSink {
    pub fn new(sink: impl ReportSink + 'static) -> Self {
        Self {
            inner: Mutex::new(Box::new(sink)),
        }
    }

    /// Write all `lines` without interruption, then optionally activate.
    pub fn write_block(&self, lines: &[ReportLine], activate: bool) {
        if lines.is_empty() {
            return;
        }
        let mut sink = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        for line in lines {
            sink.write_line(line);
        }
        if activate {
            sink.activate();
        }
    }

    /// Write a check report; an empty report writes nothing.
    pub fn write_report(&self, report: &Report) {
        self.write_block(&report::render_lines(report), true);
    }
}

/// Compose check JSON object (pure) for testing/snapshot purposes.
pub fn compose_check_json(report: &Report, failures: &[ProjectFailure]) -> JsonVal {
    let skipped: Vec<_> = failures
        .iter()
        .map(|f| {
            json!({
                "project": f.project.name,
                "path": f.project.path,
                "kind": f.error.kind(),
                "message": f.error.to_string(),
            })
        })
        .collect();
    json!({
        "projects": report.projects,
        "skipped": skipped,
        "summary": {
            "projects": report.projects.len(),
            "files": report.resource_count(),
        }
    })
}

/// Compose fix JSON object (pure) for testing/snapshot purposes.
pub fn compose_fix_json(outcomes: &[FixOutcome]) -> JsonVal {
    let count = |s: FixStatus| outcomes.iter().filter(|o| o.status == s).count();
    json!({
        "results": outcomes,
        "summary": {
            "updated": count(FixStatus::Updated),
            "unchanged": count(FixStatus::Unchanged),
            "failed": count(FixStatus::Failed),
            "total": outcomes.len(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectError;
    use crate::models::{ProjectRef, ReportEntry};

    fn sample() -> Report {
        Report {
            projects: vec![ReportEntry {
                project: "App".into(),
                resources: vec!["logo.png".into()],
            }],
        }
    }

    #[test]
    fn test_shared_sink_writes_report_and_activates() {
        let mem = MemorySink::new();
        let shared = SharedSink::new(mem.clone());
        shared.write_report(&sample());
        let lines = mem.lines();
        assert_eq!(lines[3], "App");
        assert_eq!(lines[4], "- logo.png");
        assert_eq!(mem.activations(), 1);
    }

    #[test]
    fn test_empty_report_does_not_activate() {
        let mem = MemorySink::new();
        SharedSink::new(mem.clone()).write_report(&Report::default());
        assert!(mem.lines().is_empty());
        assert_eq!(mem.activations(), 0);
    }

    #[test]
    fn test_concurrent_blocks_do_not_interleave() {
        let mem = MemorySink::new();
        let shared = Arc::new(SharedSink::new(mem.clone()));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let s = Arc::clone(&shared);
                std::thread::spawn(move || {
                    let block: Vec<ReportLine> = (0..50)
                        .map(|j| ReportLine::new(LineRole::Resource, format!("{i}:{j}")))
                        .collect();
                    s.write_block(&block, false);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let lines = mem.lines();
        assert_eq!(lines.len(), 200);
        for chunk in lines.chunks(50) {
            let owner = chunk[0].split(':').next().unwrap();
            assert!(chunk.iter().all(|l| l.starts_with(&format!("{owner}:"))));
        }
    }

    #[test]
    fn test_paint_follows_role_not_text() {
        let sink = ConsoleSink { color: true };
        let project = ReportLine::new(LineRole::Project, "Updated Tools");
        assert_eq!(sink.paint(&project), "Updated Tools");
        let updated = ReportLine::new(LineRole::Updated, "Updated 'A.csproj'.");
        assert_ne!(sink.paint(&updated), "Updated 'A.csproj'.");
        assert!(sink.paint(&updated).contains("Updated 'A.csproj'."));
    }

    #[test]
    fn test_paint_without_color_is_plain() {
        let sink = ConsoleSink::new("json");
        let header = ReportLine::new(LineRole::Header, report::HEADER);
        assert_eq!(sink.paint(&header), report::HEADER);
    }

    #[test]
    fn test_compose_check_json_shape() {
        let failures = vec![ProjectFailure {
            project: ProjectRef::concrete("Bad", "/b/Bad.csproj"),
            error: ProjectError::ParseFailure {
                path: "/b/Bad.csproj".into(),
                reason: "x".into(),
            },
        }];
        let out = compose_check_json(&sample(), &failures);
        assert_eq!(out["projects"][0]["project"], "App");
        assert_eq!(out["projects"][0]["resources"][0], "logo.png");
        assert_eq!(out["skipped"][0]["kind"], "parse-failure");
        assert_eq!(out["summary"]["files"], 1);
    }

    #[test]
    fn test_compose_fix_json_counts() {
        let outcomes = vec![
            FixOutcome {
                project: "A".into(),
                path: "/a/A.csproj".into(),
                status: FixStatus::Updated,
                error: None,
            },
            FixOutcome {
                project: "B".into(),
                path: "/b/B.csproj".into(),
                status: FixStatus::Unchanged,
                error: None,
            },
        ];
        let out = compose_fix_json(&outcomes);
        assert_eq!(out["summary"]["updated"], 1);
        assert_eq!(out["summary"]["unchanged"], 1);
        assert_eq!(out["results"][0]["status"], "updated");
    }
}
