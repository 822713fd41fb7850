use std::sync::Arc;

use crate::analysis::analyze_in_background;
use crate::rename_engine::{self, RenameStatus, execute_renames, plan_renames};

use super::app::App;
use super::models::{FileStatus, ProcessingStats, ProcessingStatus};

impl App {
    /// Rename the target files with their current records.
    pub async fn process_files(&mut self) {
        if self.store.is_processing() {
            return;
        }
        let targets = self.target_ids();
        if targets.is_empty() {
            self.set_status_message("No files to rename");
            return;
        }

        self.processing_progress = 0.0;
        let plan = plan_renames(&mut self.store, &targets);
        let report = execute_renames(&mut self.store, plan).await;

        self.stats = ProcessingStats {
            total: report.results.len(),
            ..ProcessingStats::default()
        };
        for result in &report.results {
            let status = match &result.status {
                RenameStatus::Renamed => {
                    self.stats.successful += 1;
                    FileStatus {
                        status: ProcessingStatus::Success,
                        error_message: None,
                    }
                }
                RenameStatus::Skipped => {
                    self.stats.skipped += 1;
                    FileStatus {
                        status: ProcessingStatus::Skipped,
                        error_message: None,
                    }
                }
                RenameStatus::Failed(message) => {
                    self.stats.failed += 1;
                    FileStatus {
                        status: ProcessingStatus::Error,
                        error_message: Some(message.clone()),
                    }
                }
            };
            self.stats.processed += 1;
            self.statuses.insert(result.planned.file_id, status);
        }

        self.undo_operations = report.undo;
        self.processing_progress = 1.0;
        self.finished = true;
        self.set_status_message(format!(
            "{} renamed, {} unchanged, {} failed",
            self.stats.successful, self.stats.skipped, self.stats.failed
        ));
    }

    pub async fn undo_renames(&mut self) {
        if self.undo_operations.is_empty() {
            self.set_status_message("Nothing to undo");
            return;
        }
        self.set_status_message("Undoing renames...");

        let operations = std::mem::take(&mut self.undo_operations);
        let report = rename_engine::undo_renames(&mut self.store, &operations).await;

        for op in &operations {
            self.statuses.insert(op.file_id, FileStatus::pending());
        }
        for (id, message) in &report.failures {
            self.statuses.insert(
                *id,
                FileStatus {
                    status: ProcessingStatus::Error,
                    error_message: Some(message.clone()),
                },
            );
        }

        self.finished = false;
        self.processing_progress = 0.0;
        self.stats = ProcessingStats {
            total: self.store.total_files(),
            ..ProcessingStats::default()
        };

        if report.failures.is_empty() {
            self.set_status_message(format!("Restored {} file(s)", report.restored));
        } else {
            self.set_status_message(format!(
                "Restored {}, {} could not be restored",
                report.restored,
                report.failures.len()
            ));
        }
    }

    /// Probe the highlighted file and merge what it reports into the form.
    pub async fn analyze_highlighted(&mut self) {
        let Some(file) = self.highlighted().cloned() else {
            self.set_status_message("No file to analyze");
            return;
        };
        let (id, name) = (file.id, file.name.clone());
        match analyze_in_background(Arc::clone(&self.probe), file).await {
            Ok(fill) => {
                self.form.merge_metadata(&fill.canonical);
                self.analysis = Some((id, fill.summary));
                self.set_status_message(format!("Analyzed {name}"));
            }
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "analysis failed");
                self.set_status_message(format!("Analysis failed: {e}"));
            }
        }
    }
}
