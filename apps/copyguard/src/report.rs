//! Report aggregation and line rendering.
//!
//! Line grouping is part of the observable contract: header, explanation,
//! blank, then one block per project (name, `- resource` lines, blank), then
//! a closing summary line. An empty report renders no lines.

use crate::models::{FixOutcome, FixStatus, Report, ReportEntry, ScanResult};
use std::path::Path;

pub const HEADER: &str = "Files found with 'Copy to Output Directory' set to 'Copy always':";
pub const EXPLANATION: &str =
    "These files are copied on every build even when unchanged; 'Copy if newer' avoids that.";
const RESOURCE_MARKER: &str = "- ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What a rendered line stands for; sinks style lines by role.
pub enum LineRole {
    Header,
    Note,
    Blank,
    Project,
    Resource,
    Summary,
    Updated,
    Unchanged,
    Failed,
}

impl From<FixStatus> for LineRole {
    fn from(status: FixStatus) -> Self {
        match status {
            FixStatus::Updated => LineRole::Updated,
            FixStatus::Unchanged => LineRole::Unchanged,
            FixStatus::Failed => LineRole::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub role: LineRole,
    pub text: String,
}

impl ReportLine {
    pub fn new(role: LineRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn blank() -> Self {
        Self::new(LineRole::Blank, "")
    }
}

/// Plain text of `lines`, in order.
pub fn texts(lines: &[ReportLine]) -> Vec<String> {
    lines.iter().map(|l| l.text.clone()).collect()
}

/// Drop projects without occurrences, keeping input order.
pub fn aggregate(results: impl IntoIterator<Item = ScanResult>) -> Report {
    let projects = results
        .into_iter()
        .filter(|r| !r.occurrences.is_empty())
        .map(|r| ReportEntry {
            project: r.project.name,
            resources: r
                .occurrences
                .iter()
                .map(|o| o.resource().to_string())
                .collect(),
        })
        .collect();
    Report { projects }
}

pub fn render_lines(report: &Report) -> Vec<ReportLine> {
    if report.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![
        ReportLine::new(LineRole::Header, HEADER),
        ReportLine::new(LineRole::Note, EXPLANATION),
        ReportLine::blank(),
    ];
    for entry in &report.projects {
        lines.push(ReportLine::new(LineRole::Project, entry.project.as_str()));
        for res in &entry.resources {
            lines.push(ReportLine::new(
                LineRole::Resource,
                format!("{RESOURCE_MARKER}{res}"),
            ));
        }
        lines.push(ReportLine::blank());
    }
    lines.push(ReportLine::new(LineRole::Summary, summary_line(report)));
    lines
}

pub fn summary_line(report: &Report) -> String {
    format!(
        "{} file(s) in {} project(s) are copied on every build.",
        report.resource_count(),
        report.projects.len()
    )
}

/// Render one fix outcome line, showing `path` as given.
pub fn fix_line(path: &Path, status: FixStatus, error: Option<&str>) -> String {
    let p = path.display();
    match status {
        FixStatus::Updated => format!("Updated '{p}'."),
        FixStatus::Unchanged => format!("No changes made to '{p}'."),
        FixStatus::Failed => format!(
            "Could not update '{p}': {}",
            error.unwrap_or("unknown error")
        ),
    }
}

/// Per-outcome lines followed by the closing tally.
pub fn render_fix_lines(outcomes: &[FixOutcome], base: Option<&Path>) -> Vec<ReportLine> {
    let mut lines: Vec<ReportLine> = outcomes
        .iter()
        .map(|o| {
            let shown = base
                .and_then(|b| pathdiff::diff_paths(&o.path, b))
                .unwrap_or_else(|| o.path.clone());
            ReportLine::new(o.status.into(), fix_line(&shown, o.status, o.error.as_deref()))
        })
        .collect();
    let count = |s: FixStatus| outcomes.iter().filter(|o| o.status == s).count();
    lines.push(ReportLine::new(
        LineRole::Summary,
        fix_summary_line(
            count(FixStatus::Updated),
            count(FixStatus::Unchanged),
            count(FixStatus::Failed),
        ),
    ));
    lines
}

pub fn fix_summary_line(updated: usize, unchanged: usize, failed: usize) -> String {
    format!("Fix complete: {updated} updated, {unchanged} unchanged, {failed} failed.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Occurrence, ProjectRef};

    fn result(name: &str, includes: &[Option<&str>]) -> ScanResult {
        ScanResult {
            project: ProjectRef::concrete(name, format!("/x/{name}.csproj")),
            occurrences: includes
                .iter()
                .map(|i| Occurrence {
                    value: "Always".into(),
                    include: i.map(str::to_string),
                })
                .collect(),
        }
    }

    #[test]
    fn test_aggregate_filters_empty_and_keeps_order() {
        let report = aggregate(vec![
            result("B", &[Some("b.txt")]),
            result("Empty", &[]),
            result("A", &[Some("a1.png"), None]),
        ]);
        let names: Vec<_> = report.projects.iter().map(|p| p.project.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(report.projects[1].resources, vec!["a1.png", "Always"]);
        assert_eq!(report.resource_count(), 3);
    }

    #[test]
    fn test_render_groups_lines_per_project() {
        let report = aggregate(vec![
            result("App", &[Some("logo.png"), Some("data.json")]),
            result("Lib", &[Some("x.dll")]),
        ]);
        let lines = render_lines(&report);
        assert_eq!(lines[0].role, LineRole::Header);
        assert_eq!(lines[3].role, LineRole::Project);
        assert_eq!(lines[4].role, LineRole::Resource);
        assert_eq!(lines[10].role, LineRole::Summary);
        assert_eq!(
            texts(&lines),
            vec![
                HEADER.to_string(),
                EXPLANATION.to_string(),
                String::new(),
                "App".into(),
                "- logo.png".into(),
                "- data.json".into(),
                String::new(),
                "Lib".into(),
                "- x.dll".into(),
                String::new(),
                "3 file(s) in 2 project(s) are copied on every build.".into(),
            ]
        );
    }

    #[test]
    fn test_empty_report_renders_nothing() {
        assert!(render_lines(&Report::default()).is_empty());
    }

    #[test]
    fn test_fix_lines() {
        let p = Path::new("/r/App.csproj");
        assert_eq!(fix_line(p, FixStatus::Updated, None), "Updated '/r/App.csproj'.");
        assert_eq!(
            fix_line(p, FixStatus::Unchanged, None),
            "No changes made to '/r/App.csproj'."
        );
        assert_eq!(
            fix_line(p, FixStatus::Failed, Some("boom")),
            "Could not update '/r/App.csproj': boom"
        );
    }

    #[test]
    fn test_render_fix_lines_relative_to_base() {
        let outcomes = vec![
            FixOutcome {
                project: "App".into(),
                path: "/r/src/App.csproj".into(),
                status: FixStatus::Updated,
                error: None,
            },
            FixOutcome {
                project: "Lib".into(),
                path: "/r/Lib.csproj".into(),
                status: FixStatus::Failed,
                error: Some("denied".into()),
            },
        ];
        let lines = render_fix_lines(&outcomes, Some(Path::new("/r")));
        let roles: Vec<_> = lines.iter().map(|l| l.role).collect();
        assert_eq!(
            roles,
            vec![LineRole::Updated, LineRole::Failed, LineRole::Summary]
        );
        assert_eq!(
            texts(&lines),
            vec![
                "Updated 'src/App.csproj'.".to_string(),
                "Could not update 'Lib.csproj': denied".to_string(),
                "Fix complete: 1 updated, 0 unchanged, 1 failed.".to_string(),
            ]
        );
    }
}
