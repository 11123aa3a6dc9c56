//! Copyguard CLI binary entry point.
//! Resolves configuration, builds the project tree, and runs check or fix.

use clap::Parser;
use copyguard::cli::{Cli, Commands, Common};
use copyguard::config::{self, Effective, LoadOutcome};
use copyguard::events::TreeEvent;
use copyguard::models::{FixStatus, ProjectRef};
use copyguard::orchestrator::Orchestrator;
use copyguard::output::{self, ConsoleSink, SharedSink};
use copyguard::tree::{Coordinator, DirectoryTree, SolutionTree};
use copyguard::utils;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("COPYGUARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Resolve config and build the orchestrator, exiting with 2 on start-up errors.
fn prepare(common: &Common) -> (Effective, Orchestrator) {
    let (eff, outcome) = config::resolve_effective(
        common.repo_root.as_deref(),
        common.solution.as_deref(),
        common.output.as_deref(),
    );
    if eff.output != "json" {
        match &outcome {
            LoadOutcome::Missing => eprintln!(
                "{} No copyguard.toml found; using defaults.",
                utils::note_prefix()
            ),
            LoadOutcome::Invalid { path, reason } => eprintln!(
                "{} Ignoring invalid config {}: {}",
                utils::note_prefix(),
                path.display(),
                reason
            ),
            LoadOutcome::Loaded(_) => {}
        }
    }

    let coordinator = match &eff.solution {
        Some(sln) => SolutionTree::open(sln).map(|tree| {
            tracing::debug!(solution = %tree.path().display(), "reading solution");
            Coordinator::new(tree)
        }),
        None => {
            if eff.output != "json" {
                eprintln!(
                    "{} No solution configured; scanning {} for [{}]",
                    utils::info_prefix(),
                    eff.repo_root.display(),
                    eff.patterns.join(", ")
                );
            }
            DirectoryTree::scan(&eff.repo_root, &eff.patterns).map(Coordinator::new)
        }
    };
    let coordinator = match coordinator {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            std::process::exit(2);
        }
    };

    let sink = SharedSink::new(ConsoleSink::new(&eff.output));
    match Orchestrator::new(coordinator, eff.settings(), sink) {
        Ok(orch) => {
            let settings = orch.settings();
            tracing::debug!(
                repo_root = %eff.repo_root.display(),
                config_loaded = eff.config_loaded,
                element = %settings.target.element,
                offending = %settings.target.offending,
                "resolved settings"
            );
            let base = eff.repo_root.clone();
            (eff, orch.with_display_base(base))
        }
        Err(e) => {
            eprintln!("{} failed to start worker pool: {}", utils::error_prefix(), e);
            std::process::exit(2);
        }
    }
}

/// Project named on the command line, resolved against the current directory.
fn selected_project(p: &str) -> ProjectRef {
    ProjectRef::from_path(&config::absolute(Path::new(p)))
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            std::process::exit(2);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Check { common, project } => {
            init_tracing(common.verbose);
            let (eff, orch) = prepare(&common);
            let event = match project {
                Some(p) => TreeEvent::ProjectLoaded(selected_project(&p)),
                None => TreeEvent::TreeOpened,
            };
            let run = if eff.output == "json" {
                let run = orch.check_for(&event);
                print_json(&output::compose_check_json(&run.report, &run.failures));
                run
            } else {
                orch.dispatch(&event)
            };
            if !run.report.is_empty() {
                std::process::exit(1);
            }
        }
        Commands::Fix { common, project } => {
            init_tracing(common.verbose);
            let (eff, orch) = prepare(&common);
            let outcomes = match project {
                Some(p) => orch.fix_projects(&[selected_project(&p)]),
                None => orch.fix(),
            };
            if eff.output == "json" {
                print_json(&output::compose_fix_json(&outcomes));
            } else {
                orch.write_fix_report(&outcomes);
            }
            if outcomes.iter().any(|o| o.status == FixStatus::Failed) {
                std::process::exit(1);
            }
        }
    }
}
