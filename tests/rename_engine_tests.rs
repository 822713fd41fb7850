// Integration tests for filename composition and the rename pipeline

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::tempdir;
use video_rename::fs_ops::stat_paths;
use video_rename::rename_engine::{
    PERSONAL_COLLECTION, PlanStatus, RenameStatus, execute_renames, plan_renames, sanitize_filename,
    undo_renames,
};
use video_rename::{BatchStore, FileId, RenameField, RenameRecord, compose_filename};

fn record(encoder: &str, subtitle: &str, work: &str) -> RenameRecord {
    let mut record = RenameRecord::new(FileId::new(), "1080p", 1);
    record.encoder_group = encoder.to_string();
    record.subtitle_group = subtitle.to_string();
    record.work_name = work.to_string();
    record
}

#[test]
fn test_sanitize_filename() {
    assert_eq!(sanitize_filename("Test: File/Name"), "Test_ File_Name");
    assert_eq!(sanitize_filename("Normal_File.Name"), "Normal_File.Name");
}

#[test]
fn test_basic_episode_name() {
    let record = record("VCB-Studio", "", "Example");
    assert_eq!(
        compose_filename(&record, ".mp4", 0),
        "[VCB-Studio][Example][1080p][S01E01].mp4"
    );
}

#[test]
fn test_movie_has_no_episode_segment() {
    let mut record = record("VCB-Studio", "", "Example");
    record.is_movie = true;
    record.work_year = Some(2019);
    assert_eq!(
        compose_filename(&record, ".mkv", 3),
        "[VCB-Studio][Example][2019][1080p].mkv"
    );
}

#[test]
fn test_group_combinations() {
    let both = record("Enc", "Sub", "Show");
    assert_eq!(compose_filename(&both, ".mkv", 0), "[Enc&&Sub][Show][1080p][S01E01].mkv");

    let same = record("Team", "Team", "Show");
    assert_eq!(compose_filename(&same, ".mkv", 0), "[Team][Show][1080p][S01E01].mkv");

    let subtitle_only = record("", "Sub", "Show");
    assert_eq!(compose_filename(&subtitle_only, ".mkv", 0), "[Sub][Show][1080p][S01E01].mkv");

    let neither = record("  ", "", "Show");
    assert_eq!(
        compose_filename(&neither, ".mkv", 0),
        format!("[{PERSONAL_COLLECTION}][Show][1080p][S01E01].mkv")
    );
}

#[test]
fn test_full_segment_order() {
    let mut record = record("Enc", "", "Show");
    record.work_alias = "Alias".to_string();
    record.work_year = Some(2021);
    record.season = Some(2);
    record.start_episode = Some(5);
    record.video_format = "HEVC 10-bit".to_string();
    record.audio_format = "FLAC".to_string();
    record.source = "BDRip".to_string();

    assert_eq!(
        compose_filename(&record, "mkv", 2),
        "[Enc][Show][Alias][2021][1080p][S02E07][HEVC 10-bit][FLAC][BDRip].mkv"
    );
}

#[test]
fn test_extension_with_or_without_dot() {
    let record = record("Enc", "", "Show");
    assert_eq!(compose_filename(&record, "mp4", 0), compose_filename(&record, ".mp4", 0));
    assert_eq!(compose_filename(&record, "", 0), "[Enc][Show][1080p][S01E01]");
}

#[test]
fn test_large_numbers_widen() {
    let mut record = record("Enc", "", "Show");
    record.season = Some(100);
    record.start_episode = Some(99);
    assert_eq!(compose_filename(&record, ".mkv", 1), "[Enc][Show][1080p][S100E100].mkv");
}

#[test]
fn test_missing_season_drops_episode_segment() {
    let mut record = record("Enc", "", "Show");
    record.season = None;
    assert_eq!(compose_filename(&record, ".mkv", 0), "[Enc][Show][1080p].mkv");
}

#[test]
fn test_composition_is_deterministic() {
    let record = record("Enc", "Sub", "Show");
    let first = compose_filename(&record, ".mkv", 4);
    for _ in 0..5 {
        assert_eq!(compose_filename(&record, ".mkv", 4), first);
    }
}

#[tokio::test]
async fn test_plan_execute_and_undo() {
    let dir = tempdir().unwrap();
    let paths: Vec<_> = ["ep1.mkv", "ep2.mkv"].iter().map(|n| dir.path().join(n)).collect();
    for path in &paths {
        fs::write(path, b"video").unwrap();
    }

    let mut store = BatchStore::new();
    store.add_files(stat_paths(paths.clone()).await);
    store.update_all_files_rename_data([
        RenameField::EncoderGroup("Enc".into()),
        RenameField::WorkName("Show".into()),
        RenameField::StartEpisode(Some(3)),
    ]);

    let ids: Vec<FileId> = store.files().iter().map(|f| f.id).collect();
    let plan = plan_renames(&mut store, &ids);
    assert!(plan.iter().all(|p| p.status == PlanStatus::Ready));
    assert_eq!(plan[1].new_name, "[Enc][Show][1080p][S01E04].mkv");

    let report = execute_renames(&mut store, plan).await;
    assert_eq!(report.renamed(), 2);
    assert!(dir.path().join("[Enc][Show][1080p][S01E03].mkv").exists());
    assert!(!paths[0].exists());
    assert_eq!(store.files()[0].name, "[Enc][Show][1080p][S01E03].mkv");
    assert_eq!(
        store.record(ids[0]).and_then(|r| r.composed_name.clone()).as_deref(),
        Some("[Enc][Show][1080p][S01E03].mkv")
    );

    let undo = undo_renames(&mut store, &report.undo).await;
    assert_eq!(undo.restored, 2);
    assert!(undo.failures.is_empty());
    assert!(paths.iter().all(|p| p.exists()));
    assert_eq!(store.files()[1].name, "ep2.mkv");
}

#[tokio::test]
async fn test_existing_target_is_not_overwritten() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("ep1.mkv");
    let taken = dir.path().join("[Enc][Show][1080p][S01E01].mkv");
    fs::write(&source, b"new").unwrap();
    fs::write(&taken, b"old").unwrap();

    let mut store = BatchStore::new();
    store.add_files(stat_paths([source.clone()]).await);
    store.update_all_files_rename_data([
        RenameField::EncoderGroup("Enc".into()),
        RenameField::WorkName("Show".into()),
    ]);

    let ids: Vec<FileId> = store.files().iter().map(|f| f.id).collect();
    let plan = plan_renames(&mut store, &ids);
    let report = execute_renames(&mut store, plan).await;

    assert_eq!(report.failed(), 1);
    assert!(report.undo.is_empty());
    assert_eq!(fs::read(&taken).unwrap(), b"old");
    assert!(source.exists());
    assert_eq!(store.files()[0].name, "ep1.mkv");
}

#[tokio::test]
async fn test_invalid_records_are_not_renamed() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("ep1.mkv");
    fs::write(&source, b"video").unwrap();

    let mut store = BatchStore::new();
    store.add_files(stat_paths([source.clone()]).await);

    let ids: Vec<FileId> = store.files().iter().map(|f| f.id).collect();
    let plan = plan_renames(&mut store, &ids);
    assert!(matches!(&plan[0].status, PlanStatus::Invalid(errors) if errors.contains(&"work name must not be empty".to_string())));

    let report = execute_renames(&mut store, plan).await;
    assert!(matches!(report.results[0].status, RenameStatus::Failed(_)));
    assert!(source.exists());
}

#[tokio::test]
async fn test_rerun_after_sanitized_rename_is_unchanged() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("ep1.mkv");
    fs::write(&source, b"video").unwrap();

    let mut store = BatchStore::new();
    store.add_files(stat_paths([source.clone()]).await);
    store.update_all_files_rename_data([RenameField::WorkName("Re:Zero".into())]);
    let ids: Vec<FileId> = store.files().iter().map(|f| f.id).collect();

    let plan = plan_renames(&mut store, &ids);
    assert_eq!(plan[0].new_name, format!("[{PERSONAL_COLLECTION}][Re_Zero][1080p][S01E01].mkv"));
    let first = execute_renames(&mut store, plan).await;
    assert_eq!(first.renamed(), 1);

    let plan = plan_renames(&mut store, &ids);
    assert_eq!(plan[0].status, PlanStatus::Unchanged);
    let second = execute_renames(&mut store, plan).await;
    assert_eq!(second.failed(), 0);
    assert_eq!(second.skipped(), 1);
    assert!(dir.path().join(format!("[{PERSONAL_COLLECTION}][Re_Zero][1080p][S01E01].mkv")).exists());
}
