//! Check and fix passes over the project tree.
//!
//! The project list is captured through the `Coordinator`; descriptor I/O
//! then runs on the worker pool. Projects are processed one after another
//! so report order follows enumeration order. No state survives between
//! invocations.

use crate::correct::{self, Markers};
use crate::descriptor;
use crate::error::{ProjectError, ProjectFailure};
use crate::events::TreeEvent;
use crate::models::{
    FixOutcome, FixStatus, Occurrence, ProjectKind, ProjectRef, Report, ScanResult,
};
use crate::output::SharedSink;
use crate::report;
use crate::scan::{self, Target};
use crate::tree::Coordinator;
use std::path::PathBuf;

pub const DEFAULT_ELEMENT: &str = "CopyToOutputDirectory";
pub const DEFAULT_OFFENDING: &str = "Always";
pub const DEFAULT_ACCEPTED: &str = "PreserveNewest";

#[derive(Debug, Clone)]
/// What to look for and what to replace it with.
pub struct Settings {
    pub target: Target,
    pub markers: Markers,
}

impl Settings {
    pub fn new(element: &str, offending: &str, accepted: &str) -> Self {
        Self {
            target: Target::new(element, offending),
            markers: Markers::for_element(element, offending, accepted),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_ELEMENT, DEFAULT_OFFENDING, DEFAULT_ACCEPTED)
    }
}

#[derive(Debug, Default)]
/// Outcome of one check pass: the report plus every skipped project.
pub struct CheckRun {
    pub report: Report,
    pub failures: Vec<ProjectFailure>,
}

pub struct Orchestrator {
    tree: Coordinator,
    settings: Settings,
    sink: SharedSink,
    workers: rayon::ThreadPool,
    display_base: Option<PathBuf>,
}

impl Orchestrator {
    pub fn new(
        tree: Coordinator,
        settings: Settings,
        sink: SharedSink,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .thread_name(|i| format!("copyguard-worker-{i}"))
            .build()?;
        Ok(Self {
            tree,
            settings,
            sink,
            workers,
            display_base: None,
        })
    }

    /// Show fix paths relative to `base` when possible.
    pub fn with_display_base(mut self, base: PathBuf) -> Self {
        self.display_base = Some(base);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Check every project in the tree.
    pub fn check(&self) -> CheckRun {
        let projects = self.tree.enumerate();
        self.check_projects(&projects)
    }

    /// Check an explicit project set, e.g. one freshly loaded project.
    pub fn check_projects(&self, projects: &[ProjectRef]) -> CheckRun {
        self.workers.install(|| {
            let mut results = Vec::new();
            let mut failures = Vec::new();
            for project in projects.iter().filter(|p| is_scannable(p)) {
                match scan_project(project, &self.settings.target) {
                    Ok(occurrences) => {
                        tracing::debug!(
                            project = %project.name,
                            found = occurrences.len(),
                            "scanned project"
                        );
                        results.push(ScanResult {
                            project: project.clone(),
                            occurrences,
                        });
                    }
                    Err(error) => {
                        tracing::warn!(project = %project.name, error = %error, "skipping project");
                        failures.push(ProjectFailure {
                            project: project.clone(),
                            error,
                        });
                    }
                }
            }
            CheckRun {
                report: report::aggregate(results),
                failures,
            }
        })
    }

    /// Correct every project in the tree, one outcome per project.
    pub fn fix(&self) -> Vec<FixOutcome> {
        let projects = self.tree.enumerate();
        self.fix_projects(&projects)
    }

    /// Correct an explicit project set, e.g. one selected project.
    pub fn fix_projects(&self, projects: &[ProjectRef]) -> Vec<FixOutcome> {
        self.workers.install(|| {
            projects
                .iter()
                .filter(|p| is_scannable(p))
                .map(|p| self.fix_project(p))
                .collect()
        })
    }

    fn fix_project(&self, project: &ProjectRef) -> FixOutcome {
        let (status, error) = match correct::correct_file(&project.path, &self.settings.markers) {
            Ok(true) => {
                tracing::info!(
                    project = %project.name,
                    path = %project.path.display(),
                    "updated descriptor"
                );
                (FixStatus::Updated, None)
            }
            Ok(false) => (FixStatus::Unchanged, None),
            Err(e) => {
                tracing::warn!(project = %project.name, error = %e, "could not update descriptor");
                (FixStatus::Failed, Some(e.to_string()))
            }
        };
        FixOutcome {
            project: project.name.clone(),
            path: project.path.clone(),
            status,
            error,
        }
    }

    /// Run the check an event calls for: the whole tree or one project.
    pub fn check_for(&self, event: &TreeEvent) -> CheckRun {
        match event {
            TreeEvent::TreeOpened => self.check(),
            TreeEvent::ProjectLoaded(project) => self.check_projects(std::slice::from_ref(project)),
        }
    }

    /// `check_for`, then write the report to the sink.
    pub fn dispatch(&self, event: &TreeEvent) -> CheckRun {
        let run = self.check_for(event);
        self.sink.write_report(&run.report);
        run
    }

    /// Fix the whole tree and write per-project lines to the sink.
    pub fn fix_and_report(&self) -> Vec<FixOutcome> {
        let outcomes = self.fix();
        self.write_fix_report(&outcomes);
        outcomes
    }

    /// Write per-project fix lines and the closing tally to the sink.
    pub fn write_fix_report(&self, outcomes: &[FixOutcome]) {
        let lines = report::render_fix_lines(outcomes, self.display_base.as_deref());
        self.sink.write_block(&lines, false);
    }
}

fn is_scannable(project: &ProjectRef) -> bool {
    project.kind == ProjectKind::Concrete && project.has_path()
}

fn scan_project(
    project: &ProjectRef,
    target: &Target,
) -> Result<Vec<Occurrence>, ProjectError> {
    let d = descriptor::load(&project.path)?;
    scan::scan(&d, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use crate::tree::StaticTree;
    use std::fs;
    use tempfile::tempdir;

    const ALWAYS: &str = r#"<Project><ItemGroup><Content Include="logo.png"><CopyToOutputDirectory>Always</CopyToOutputDirectory></Content></ItemGroup></Project>"#;

    fn orchestrator(tree: StaticTree, sink: MemorySink) -> Orchestrator {
        Orchestrator::new(
            Coordinator::new(tree),
            Settings::default(),
            SharedSink::new(sink),
        )
        .unwrap()
    }

    #[test]
    fn test_default_settings_markers() {
        let s = Settings::default();
        assert_eq!(s.target.element, "CopyToOutputDirectory");
        assert_eq!(
            s.markers.accepted,
            "<CopyToOutputDirectory>PreserveNewest</CopyToOutputDirectory>"
        );
    }

    #[test]
    fn test_check_collects_report_and_failures() {
        let tmp = tempdir().unwrap();
        let good = tmp.path().join("Good.csproj");
        let bad = tmp.path().join("Bad.csproj");
        fs::write(&good, ALWAYS).unwrap();
        fs::write(&bad, "<Project><Broken></Project>").unwrap();
        let tree = StaticTree::new()
            .root(ProjectRef::concrete("Bad", &bad))
            .root(ProjectRef::concrete("Good", &good));
        let run = orchestrator(tree, MemorySink::new()).check();
        assert_eq!(run.report.projects.len(), 1);
        assert_eq!(run.report.projects[0].project, "Good");
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].error.kind(), "parse-failure");
    }

    #[test]
    fn test_dispatch_project_loaded_writes_one_project_report() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("App.csproj");
        fs::write(&p, ALWAYS).unwrap();
        let sink = MemorySink::new();
        let orch = orchestrator(StaticTree::new(), sink.clone());
        let run = orch.dispatch(&TreeEvent::ProjectLoaded(ProjectRef::concrete("App", &p)));
        assert_eq!(run.report.resource_count(), 1);
        assert!(sink.lines().contains(&"- logo.png".to_string()));
        assert_eq!(sink.activations(), 1);
    }

    #[test]
    fn test_dispatch_unloaded_project_is_silent() {
        let sink = MemorySink::new();
        let orch = orchestrator(StaticTree::new(), sink.clone());
        let run = orch.dispatch(&TreeEvent::ProjectLoaded(ProjectRef::concrete("Later", "")));
        assert!(run.report.is_empty());
        assert!(run.failures.is_empty());
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_fix_projects_touches_only_the_selection() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("A.csproj");
        let b = tmp.path().join("B.csproj");
        fs::write(&a, ALWAYS).unwrap();
        fs::write(&b, ALWAYS).unwrap();
        let tree = StaticTree::new()
            .root(ProjectRef::concrete("A", &a))
            .root(ProjectRef::concrete("B", &b));
        let sink = MemorySink::new();
        let orch = orchestrator(tree, sink.clone()).with_display_base(tmp.path().to_path_buf());
        let outcomes = orch.fix_projects(&[ProjectRef::from_path(&b)]);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].project, "B");
        assert_eq!(outcomes[0].status, FixStatus::Updated);
        assert!(fs::read_to_string(&b).unwrap().contains("PreserveNewest"));
        assert_eq!(fs::read_to_string(&a).unwrap(), ALWAYS);
        assert!(sink.lines().is_empty());

        orch.write_fix_report(&outcomes);
        assert_eq!(sink.lines()[0], "Updated 'B.csproj'.");
    }

    #[test]
    fn test_fix_projects_skips_unloaded_selection() {
        let orch = orchestrator(StaticTree::new(), MemorySink::new());
        assert!(orch.fix_projects(&[ProjectRef::concrete("Later", "")]).is_empty());
    }

    #[test]
    fn test_fix_and_report_lines() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("A.csproj");
        let b = tmp.path().join("B.csproj");
        fs::write(&a, ALWAYS).unwrap();
        fs::write(&b, "<Project />").unwrap();
        let tree = StaticTree::new()
            .root(ProjectRef::concrete("A", &a))
            .root(ProjectRef::concrete("B", &b))
            .root(ProjectRef::concrete("Gone", tmp.path().join("Gone.csproj")));
        let sink = MemorySink::new();
        let orch = orchestrator(tree, sink.clone()).with_display_base(tmp.path().to_path_buf());
        let outcomes = orch.fix_and_report();
        let statuses: Vec<_> = outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![FixStatus::Updated, FixStatus::Unchanged, FixStatus::Failed]
        );
        let lines = sink.lines();
        assert_eq!(lines[0], "Updated 'A.csproj'.");
        assert_eq!(lines[1], "No changes made to 'B.csproj'.");
        assert!(lines[2].starts_with("Could not update 'Gone.csproj'"));
        assert_eq!(lines[3], "Fix complete: 1 updated, 1 unchanged, 1 failed.");
        assert!(fs::read_to_string(&a).unwrap().contains("PreserveNewest"));
    }
}
