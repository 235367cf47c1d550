//! Progress reporting

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while root directories are walked
///
/// Draws to stderr and stays hidden when stderr is not a terminal.
pub struct ProgressReporter {
    scan_bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let scan_bar = ProgressBar::new_spinner();
        scan_bar.enable_steady_tick(Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            scan_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        Self { scan_bar }
    }

    /// Reporter that never draws, for tests and non-interactive callers
    pub fn hidden() -> Self {
        Self {
            scan_bar: ProgressBar::hidden(),
        }
    }

    /// Mark start of scanning one root.
    pub fn start_scan(&self, label: &str) {
        self.scan_bar.set_message(format!("Scanning {}...", label));
    }

    /// Update scanning counters.
    pub fn update_scan(&self, label: &str, folders: u64, files: u64) {
        self.scan_bar.set_message(format!(
            "Scanning {}... {} folders | {} files",
            label, folders, files
        ));
    }

    /// Print the per-root result above the spinner.
    pub fn finish_scan(&self, label: &str, folders: usize, files: usize) {
        self.scan_bar
            .println(format!("Scanned {}: {} folders | {} files", label, folders, files));
    }

    /// Remove the spinner before questions are asked.
    pub fn finish(&self) {
        self.scan_bar.finish_and_clear();
    }

    #[cfg(test)]
    fn message(&self) -> String {
        self.scan_bar.message()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if !self.scan_bar.is_finished() {
            self.scan_bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_scan_sets_counters() {
        let reporter = ProgressReporter::hidden();
        reporter.start_scan("/data/photos");
        reporter.update_scan("/data/photos", 3, 2048);

        let msg = reporter.message();
        assert!(msg.contains("/data/photos"));
        assert!(msg.contains("3 folders"));
        assert!(msg.contains("2048 files"));
    }

    #[test]
    fn test_scan_methods_execute_without_panicking() {
        let reporter = ProgressReporter::new();
        reporter.start_scan("a");
        reporter.update_scan("a", 1, 2);
        reporter.finish_scan("a", 1, 2);
        reporter.finish();
    }
}
