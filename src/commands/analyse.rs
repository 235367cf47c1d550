//! Read-only comparison command

use crate::diff::{analyse, extension_counts, DiffReport, EntryKind, LevelDiff};
use crate::scanner::SnapshotBuilder;
use crate::store;
use crate::types::DirsyncError;
use crate::ui::{style, ProgressReporter};
use crate::AnalyseConfig;
use std::fs;

/// Missing-file lists longer than this are summarised per extension
const LIST_LIMIT: usize = 15;

/// Compare the roots and print or export the report
pub fn run(config: &AnalyseConfig) -> Result<DiffReport, DirsyncError> {
    let report = build_report(config, &ProgressReporter::new())?;

    match &config.output {
        Some(path) => {
            fs::write(path, serde_json::to_string_pretty(&report)?)?;
            println!(
                "{}",
                style::success(&format!("Report written to {}", path.display()))
            );
        }
        None => println!("{}", format_report(&report)),
    }
    Ok(report)
}

/// Walk every root (honouring its stored exclude patterns) and compare
///
/// Nothing is written: roots without a config are simply walked unfiltered.
pub fn build_report(
    config: &AnalyseConfig,
    reporter: &ProgressReporter,
) -> Result<DiffReport, DirsyncError> {
    let configs = store::load(&config.roots)?;
    let merged = store::merge(&config.roots, &configs)?;
    let builder = SnapshotBuilder::new().with_max_depth(config.max_depth);

    let mut trees = Vec::with_capacity(config.roots.len());
    for (root, identity) in config.roots.iter().zip(&merged.identities) {
        let label = root.display().to_string();
        reporter.start_scan(&label);
        let exclude = merged
            .policies
            .get(identity)
            .map(|policy| policy.exclude_from_sync.clone())
            .unwrap_or_default();
        let built = builder.build_root(root, *identity, &exclude, None)?;
        reporter.finish_scan(
            &label,
            built.snapshot.total_folders(),
            built.snapshot.total_files(),
        );
        trees.push(built.snapshot);
    }
    reporter.finish();

    Ok(analyse(&trees))
}

/// Human-readable rendering of a report
pub fn format_report(report: &DiffReport) -> String {
    let mut lines = Vec::new();
    lines.push(style::header("Roots:"));
    for (idx, root) in report.roots.iter().enumerate() {
        lines.push(format!("  {} {}", style::root_label(idx), root.display()));
    }

    if report.root_names_differ {
        lines.push(style::warn("Root folder names differ"));
    }

    if report.is_empty() {
        lines.push(style::success("No differences found"));
        return lines.join("\n");
    }

    for level in &report.levels {
        lines.push(String::new());
        let path = if level.path.is_empty() { "." } else { level.path.as_str() };
        lines.push(style::header(&format!("{}:", path)));
        for idx in 0..report.roots.len() {
            format_missing(&mut lines, level, idx);
        }
    }

    lines.push(String::new());
    lines.push(style::dim(&format!(
        "{} differing entries in {} folders",
        report.total_entries(),
        report.levels.len()
    )));
    lines.join("\n")
}

fn format_missing(lines: &mut Vec<String>, level: &LevelDiff, idx: usize) {
    let files: Vec<&str> = level
        .missing_from(idx, EntryKind::File)
        .map(|e| e.name.as_str())
        .collect();
    if !files.is_empty() {
        lines.push(format!("  Files missing from {}:", style::root_label(idx)));
        if files.len() > LIST_LIMIT {
            for (ext, count) in extension_counts(files.iter().copied()) {
                let ext = if ext.is_empty() { "(no extension)" } else { ext.as_str() };
                lines.push(format!("   {:>6} × {}", count, ext));
            }
        } else {
            lines.extend(files.iter().map(|name| format!("   - {}", name)));
        }
    }

    let folders: Vec<&str> = level
        .missing_from(idx, EntryKind::Folder)
        .map(|e| e.name.as_str())
        .collect();
    if !folders.is_empty() {
        lines.push(format!("  Folders missing from {}:", style::root_label(idx)));
        lines.extend(folders.iter().map(|name| format!("   - {}/", name)));
    }
}
