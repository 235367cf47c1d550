//! Main sync command

use crate::decide::{AlwaysAnswer, DecisionProvider, Interactive};
use crate::executor::{write_error_report, CopyFailure, FailedAction, FileOps, LocalFs};
use crate::scanner::{ProgressCallback, SnapshotBuilder};
use crate::store;
use crate::sync::{sync_trees, SyncStats};
use crate::types::{DirsyncError, TreeSnapshot};
use crate::ui::{style, ProgressReporter};
use crate::Config;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Outcome of one sync run
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub stats: SyncStats,
    pub failures: Vec<CopyFailure>,
    /// Set when an error report was written
    pub error_report: Option<PathBuf>,
}

/// Run the sync operation on the terminal
pub fn run(config: &Config) -> Result<SyncSummary, DirsyncError> {
    let reporter = Arc::new(ProgressReporter::new());
    let summary = if config.assume_yes {
        execute(config, &mut AlwaysAnswer(true), &LocalFs, reporter)?
    } else {
        execute(config, &mut Interactive::new(), &LocalFs, reporter)?
    };

    println!("{}", format_summary(&summary));
    if !summary.failures.is_empty() {
        println!("{}", format_error_summary(&summary.failures));
    }
    Ok(summary)
}

/// Load policy, walk every root, sync, then persist policy and errors
///
/// # Errors
/// Anything that goes wrong before the engine starts aborts the run with
/// nothing written. Individual copy failures do not abort; they end up in
/// the summary and the error report.
pub fn execute(
    config: &Config,
    decider: &mut dyn DecisionProvider,
    ops: &dyn FileOps,
    reporter: Arc<ProgressReporter>,
) -> Result<SyncSummary, DirsyncError> {
    if config.force {
        return Err(DirsyncError::Unsupported(
            "--force (overwriting entries that differ between roots)".to_string(),
        ));
    }

    let configs = store::load(&config.roots)?;
    let store::MergedPolicy {
        identities,
        mut policies,
    } = store::merge(&config.roots, &configs)?;

    let builder = SnapshotBuilder::new();
    let mut trees: Vec<TreeSnapshot> = Vec::with_capacity(config.roots.len());
    let mut used: Vec<HashSet<String>> = Vec::with_capacity(config.roots.len());
    for (root, identity) in config.roots.iter().zip(&identities) {
        let label = root.display().to_string();
        reporter.start_scan(&label);
        let on_progress: ProgressCallback = {
            let reporter = Arc::clone(&reporter);
            let label = label.clone();
            Box::new(move |folders: u64, files: u64| reporter.update_scan(&label, folders, files))
        };

        let exclude = policies
            .get(identity)
            .map(|policy| policy.exclude_from_sync.clone())
            .unwrap_or_default();
        let built = builder.build_root(root, *identity, &exclude, Some(&on_progress))?;
        reporter.finish_scan(
            &label,
            built.snapshot.total_folders(),
            built.snapshot.total_files(),
        );
        trees.push(built.snapshot);
        used.push(built.used_patterns);
    }
    reporter.finish();

    store::prune(&mut policies, &identities, &used)?;

    let mut failures = Vec::new();
    let stats = sync_trees(&mut trees, &mut policies, decider, ops, &mut failures)?;
    info!(
        copied = stats.files_copied,
        created = stats.folders_created,
        failed = stats.failures,
        "sync finished"
    );

    store::save(&config.roots, &identities, &policies, Utc::now())?;

    let error_report = if failures.is_empty() {
        None
    } else {
        write_error_report(&config.error_report, &failures)?;
        Some(config.error_report.clone())
    };

    Ok(SyncSummary {
        stats,
        failures,
        error_report,
    })
}

fn format_summary(summary: &SyncSummary) -> String {
    let stats = &summary.stats;
    if !stats.changed_anything() && summary.failures.is_empty() {
        return if stats.prompts == 0 {
            style::success("Everything is already in sync.")
        } else {
            style::success("Nothing copied; your choices were saved.")
        };
    }

    let line = format!(
        "Sync complete: {} copied, {} created, {} failed",
        plural(stats.files_copied, "file"),
        plural(stats.folders_created, "folder"),
        stats.failures
    );
    if summary.failures.is_empty() {
        style::success(&line)
    } else {
        style::warn(&line)
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn action_label(action: FailedAction) -> &'static str {
    match action {
        FailedAction::CopyFile => "Copy file",
        FailedAction::CreateFolder => "Create folder",
    }
}

fn format_error_summary(failures: &[CopyFailure]) -> String {
    let mut groups: BTreeMap<&'static str, Vec<&CopyFailure>> = BTreeMap::new();
    for failure in failures {
        groups
            .entry(action_label(failure.action))
            .or_default()
            .push(failure);
    }

    let mut lines = Vec::new();
    lines.push("Error summary:".to_string());
    for (kind, items) in groups {
        lines.push(format!("  {} ({}):", kind, items.len()));
        for failure in items.iter().take(3) {
            lines.push(format!("    - {}", failure.error));
            lines.push(format!("      From: {}", failure.source.display()));
            lines.push(format!("      To:   {}", failure.destination.display()));
        }
        if items.len() > 3 {
            lines.push(format!("    ... and {} more", items.len() - 3));
        }
    }
    lines.push(style::dim(&format!(
        "Full list written to {}",
        crate::executor::ERROR_REPORT_FILE_NAME
    )));

    lines.join("\n")
}
