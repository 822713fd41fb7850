use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::fs_ops;
use crate::record::RenameRecord;
use crate::store::{BatchStore, FileId};
use crate::validation::validate;

/// Group segment used when neither an encoder nor a subtitle group is set.
pub const PERSONAL_COLLECTION: &str = "个人收集";

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("filename sanitizer regex is valid"));

fn present(value: &str) -> Option<&str> {
    (!value.trim().is_empty()).then_some(value)
}

/// Build the bracketed filename for `record`. `episode_index` is the file's
/// zero-based position in the current batch and is added to the start
/// episode. `extension` may be given with or without its leading dot.
pub fn compose_filename(record: &RenameRecord, extension: &str, episode_index: u32) -> String {
    let mut name = String::new();
    let mut segment = |value: &str| {
        name.push('[');
        name.push_str(value);
        name.push(']');
    };

    match (present(&record.encoder_group), present(&record.subtitle_group)) {
        (Some(encoder), Some(subtitle)) if encoder != subtitle => {
            segment(&format!("{encoder}&&{subtitle}"))
        }
        (Some(group), _) | (None, Some(group)) => segment(group),
        (None, None) => segment(PERSONAL_COLLECTION),
    }

    if let Some(work_name) = present(&record.work_name) {
        segment(work_name);
    }
    if let Some(alias) = present(&record.work_alias) {
        segment(alias);
    }
    // Year 0 cannot be represented; it reads as "no year".
    if let Some(year) = record.work_year.filter(|y| *y != 0) {
        segment(&year.to_string());
    }
    if let Some(resolution) = present(&record.resolution) {
        segment(resolution);
    }

    if !record.is_movie {
        let season = record.season.filter(|s| *s != 0);
        let start = record.start_episode.filter(|e| *e != 0);
        if let (Some(season), Some(start)) = (season, start) {
            let episode = start.saturating_add(episode_index);
            segment(&format!("S{season:02}E{episode:02}"));
        }
    }

    if let Some(video) = present(&record.video_format) {
        segment(video);
    }
    if let Some(audio) = present(&record.audio_format) {
        segment(audio);
    }
    if let Some(source) = present(&record.source) {
        segment(source);
    }

    if !extension.is_empty() {
        if !extension.starts_with('.') {
            name.push('.');
        }
        name.push_str(extension);
    }

    tracing::debug!(file_id = %record.file_id, %name, "composed filename");
    name
}

impl RenameRecord {
    /// Compose the filename and remember it in `composed_name`.
    pub fn compose(&mut self, extension: &str, episode_index: u32) -> String {
        let name = compose_filename(self, extension, episode_index);
        self.composed_name = Some(name.clone());
        name
    }
}

/// Extension of `file_name` including its dot, in its original case.
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) => &file_name[dot..],
        None => "",
    }
}

pub fn sanitize_filename(filename: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(filename, "_").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PlanStatus {
    Ready,
    Unchanged,
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedRename {
    pub file_id: FileId,
    pub original_path: PathBuf,
    pub original_name: String,
    /// Name written to disk, with path-hostile characters replaced. Empty
    /// when the record failed validation.
    pub new_name: String,
    pub target_path: PathBuf,
    pub status: PlanStatus,
}

/// Compose target names for `ids`, in the given order. The episode index of
/// each file is its position in `ids`. Ids without a file are skipped.
pub fn plan_renames(store: &mut BatchStore, ids: &[FileId]) -> Vec<PlannedRename> {
    let mut plan = Vec::with_capacity(ids.len());

    for &id in ids {
        let Some(file) = store.file(id) else {
            tracing::warn!(file_id = %id, "no such file, skipping");
            continue;
        };
        let original_path = file.path.clone();
        let original_name = file.name.clone();
        let episode_index = plan.len() as u32;

        let Some(record) = store.record_mut(id) else {
            continue;
        };

        let report = validate(record);
        if !report.is_valid {
            plan.push(PlannedRename {
                file_id: id,
                target_path: original_path.clone(),
                original_path,
                original_name,
                new_name: String::new(),
                status: PlanStatus::Invalid(report.errors),
            });
            continue;
        }

        let composed = record.compose(file_extension(&original_name), episode_index);
        let new_name = sanitize_filename(&composed);
        let target_path = original_path
            .parent()
            .map(|dir| dir.join(&new_name))
            .unwrap_or_else(|| PathBuf::from(&new_name));
        let status = if new_name == original_name || target_path == original_path {
            PlanStatus::Unchanged
        } else {
            PlanStatus::Ready
        };

        plan.push(PlannedRename {
            file_id: id,
            original_path,
            original_name,
            new_name,
            target_path,
            status,
        });
    }

    plan
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RenameStatus {
    Renamed,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameResult {
    pub planned: PlannedRename,
    pub status: RenameStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndoOperation {
    pub file_id: FileId,
    pub original_path: PathBuf,
    pub renamed_path: PathBuf,
    pub original_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    pub results: Vec<RenameResult>,
    pub undo: Vec<UndoOperation>,
}

impl RenameReport {
    pub fn renamed(&self) -> usize {
        self.count(|s| matches!(s, RenameStatus::Renamed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, RenameStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, RenameStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&RenameStatus) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.status)).count()
    }
}

/// Run a plan one file at a time. A failed rename leaves the store as it
/// was; a successful one resynchronizes the entry with its new name.
pub async fn execute_renames(store: &mut BatchStore, plan: Vec<PlannedRename>) -> RenameReport {
    store.set_processing(true);
    let mut report = RenameReport::default();

    for planned in plan {
        let status = execute_one(store, &planned, &mut report.undo).await;
        report.results.push(RenameResult { planned, status });
    }

    store.set_processing(false);
    tracing::info!(
        renamed = report.renamed(),
        skipped = report.skipped(),
        failed = report.failed(),
        "rename batch finished"
    );
    report
}

async fn execute_one(
    store: &mut BatchStore,
    planned: &PlannedRename,
    undo: &mut Vec<UndoOperation>,
) -> RenameStatus {
    match &planned.status {
        PlanStatus::Unchanged => RenameStatus::Skipped,
        PlanStatus::Invalid(errors) => RenameStatus::Failed(errors.join("; ")),
        PlanStatus::Ready => {
            match fs_ops::rename_file(&planned.original_path, &planned.target_path).await {
                Ok(()) => {
                    let final_name = planned
                        .target_path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| planned.new_name.clone());
                    store.update_file_info(planned.file_id, final_name.clone(), planned.target_path.clone());
                    undo.push(UndoOperation {
                        file_id: planned.file_id,
                        original_path: planned.original_path.clone(),
                        renamed_path: planned.target_path.clone(),
                        original_name: planned.original_name.clone(),
                        new_name: final_name,
                    });
                    RenameStatus::Renamed
                }
                Err(e) => {
                    tracing::warn!(file = %planned.original_path.display(), error = %e, "rename failed");
                    RenameStatus::Failed(e.to_string())
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoReport {
    pub restored: usize,
    pub failures: Vec<(FileId, String)>,
}

/// Reverse successful renames, newest first.
pub async fn undo_renames(store: &mut BatchStore, operations: &[UndoOperation]) -> UndoReport {
    let mut report = UndoReport::default();

    for op in operations.iter().rev() {
        match fs_ops::rename_file(&op.renamed_path, &op.original_path).await {
            Ok(()) => {
                store.update_file_info(op.file_id, op.original_name.clone(), op.original_path.clone());
                report.restored += 1;
            }
            Err(e) => {
                tracing::warn!(file = %op.renamed_path.display(), error = %e, "failed to undo rename");
                report.failures.push((op.file_id, e.to_string()));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RenameRecord {
        let mut record = RenameRecord::new(FileId::new(), "1080p", 1);
        record.work_name = "Example".to_string();
        record
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Test: File/Name"), "Test_ File_Name");
        assert_eq!(sanitize_filename("[Group][Work].mkv"), "[Group][Work].mkv");
    }

    #[test]
    fn extension_keeps_dot_and_case() {
        assert_eq!(file_extension("Show.EP01.MKV"), ".MKV");
        assert_eq!(file_extension("noext"), "");
    }

    #[test]
    fn whitespace_fields_are_absent() {
        let mut r = record();
        r.work_alias = "   ".to_string();
        r.source = "\t".to_string();
        r.encoder_group = " ".to_string();
        assert_eq!(compose_filename(&r, "mkv", 0), "[个人收集][Example][1080p][S01E01].mkv");
    }

    #[test]
    fn compose_caches_result() {
        let mut r = record();
        let name = r.compose(".mp4", 2);
        assert_eq!(name, "[个人收集][Example][1080p][S01E03].mp4");
        assert_eq!(r.composed_name.as_deref(), Some(name.as_str()));
    }
}
