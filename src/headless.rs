//! Non-interactive driver: apply the command-line form to every file, print
//! the composed names and optionally rename.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;

use crate::analysis::{analyze_files, analyze_first};
use crate::cli::Args;
use crate::config::RenamerConfig;
use crate::fs_ops::{is_video_file, stat_paths};
use crate::probe::{AnalysisSummary, MediaProbe};
use crate::record::RenameRecord;
use crate::rename_engine::{PlanStatus, RenameStatus, execute_renames, plan_renames};
use crate::store::{BatchStore, FileId};

/// Returns `Ok(true)` when every file was handled without error.
pub async fn run<W: Write>(
    args: &Args,
    config: &RenamerConfig,
    probe: Arc<dyn MediaProbe>,
    out: &mut W,
) -> Result<bool> {
    let mut store = BatchStore::with_default_resolution(config.default_resolution.clone());

    let mut raw_entries = Vec::new();
    for raw in stat_paths(args.files.iter().cloned()).await {
        if raw.is_directory {
            writeln!(out, "Skipping directory: {}", raw.path.display())?;
            continue;
        }
        if !is_video_file(&raw.path) {
            tracing::warn!(path = %raw.path.display(), "not a known video extension");
        }
        raw_entries.push(raw);
    }
    store.add_files(raw_entries);

    if store.total_files() == 0 {
        writeln!(out, "No files provided to rename.")?;
        return Ok(false);
    }

    let mut form = RenameRecord::new(FileId::new(), config.default_resolution.clone(), 1);
    if args.analyze_all {
        let results = analyze_files(probe, store.files()).await;
        for (index, (id, result)) in results.iter().enumerate() {
            let name = store.file(*id).map(|f| f.name.as_str()).unwrap_or_default();
            match result {
                Ok(fill) => {
                    write_summary(out, name, &fill.summary)?;
                    if index == 0 {
                        form.merge_metadata(&fill.canonical);
                    }
                }
                Err(e) => writeln!(out, "Analysis of {name} failed: {e}")?,
            }
        }
    } else if args.analyze {
        match analyze_first(probe, store.files()).await {
            Ok(fill) => {
                write_summary(out, &store.files()[0].name, &fill.summary)?;
                form.merge_metadata(&fill.canonical);
            }
            Err(e) => writeln!(out, "Analysis failed: {e}")?,
        }
    }
    for field in args.form_fields(config) {
        form.apply(field);
    }
    store.update_all_files_rename_data(form.form_fields());

    let ids: Vec<FileId> = store.files().iter().map(|f| f.id).collect();
    let plan = plan_renames(&mut store, &ids);

    writeln!(out, "Processing {} file(s)...", plan.len())?;
    let mut all_valid = true;
    for item in &plan {
        match &item.status {
            PlanStatus::Ready => writeln!(out, "{} -> {}", item.original_name, item.new_name)?,
            PlanStatus::Unchanged => writeln!(out, "{} (unchanged)", item.original_name)?,
            PlanStatus::Invalid(errors) => {
                all_valid = false;
                writeln!(out, "{}: {}", item.original_name, errors.join("; "))?;
            }
        }
    }

    if !args.apply {
        return Ok(all_valid);
    }

    let report = execute_renames(&mut store, plan).await;
    for result in &report.results {
        if let RenameStatus::Failed(message) = &result.status {
            writeln!(out, "Error renaming '{}': {}", result.planned.original_name, message)?;
        }
    }
    writeln!(
        out,
        "Summary: {} renamed, {} unchanged, {} failed",
        report.renamed(),
        report.skipped(),
        report.failed()
    )?;

    Ok(report.failed() == 0)
}

fn write_summary<W: Write>(out: &mut W, name: &str, summary: &AnalysisSummary) -> std::io::Result<()> {
    writeln!(
        out,
        "Analyzed {}: {} / {} / {}",
        name, summary.resolution, summary.video_format, summary.duration
    )
}
