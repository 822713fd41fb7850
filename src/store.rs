//! In-memory registry of the files being renamed, their rename records and
//! the selection.
//!
//! Records are keyed by [`FileId`] rather than kept in a parallel vector, so
//! reordering files never needs a matching record reorder. [`BatchStore::records`]
//! still yields them in file order.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::{RenameField, RenameRecord};

pub const DEFAULT_RESOLUTION: &str = "1080p";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(Uuid);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A path as handed over by the file-selection collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFileEntry {
    pub path: PathBuf,
    pub size: u64,
    pub last_modified: Option<SystemTime>,
    pub is_file: bool,
    pub is_directory: bool,
}

impl RawFileEntry {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            last_modified: None,
            is_file: true,
            is_directory: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub id: FileId,
    pub name: String,
    pub path: PathBuf,
    /// Lower-cased, without the dot.
    pub extension: String,
    pub size: u64,
    pub last_modified: Option<SystemTime>,
    pub selected: bool,
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(dot) => name[dot + 1..].to_lowercase(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug)]
pub struct BatchStore {
    files: Vec<FileEntry>,
    records: HashMap<FileId, RenameRecord>,
    selection: HashSet<FileId>,
    default_resolution: String,
    processing: bool,
}

impl Default for BatchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchStore {
    pub fn new() -> Self {
        Self::with_default_resolution(DEFAULT_RESOLUTION)
    }

    /// A store whose fresh records start with `resolution` instead of 1080p.
    pub fn with_default_resolution(resolution: impl Into<String>) -> Self {
        Self {
            files: Vec::new(),
            records: HashMap::new(),
            selection: HashSet::new(),
            default_resolution: resolution.into(),
            processing: false,
        }
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn position(&self, id: FileId) -> Option<usize> {
        self.files.iter().position(|f| f.id == id)
    }

    pub fn record(&self, id: FileId) -> Option<&RenameRecord> {
        self.records.get(&id)
    }

    pub(crate) fn record_mut(&mut self, id: FileId) -> Option<&mut RenameRecord> {
        self.records.get_mut(&id)
    }

    /// Records in file order.
    pub fn records(&self) -> impl Iterator<Item = &RenameRecord> + '_ {
        self.files.iter().filter_map(|f| self.records.get(&f.id))
    }

    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    pub fn is_selected(&self, id: FileId) -> bool {
        self.selection.contains(&id)
    }

    /// Selected files in file order.
    pub fn selected_files(&self) -> Vec<&FileEntry> {
        self.files
            .iter()
            .filter(|f| self.selection.contains(&f.id))
            .collect()
    }

    pub fn selected_ids(&self) -> Vec<FileId> {
        self.selected_files().into_iter().map(|f| f.id).collect()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn set_processing(&mut self, processing: bool) {
        self.processing = processing;
    }

    /// Register new files. Paths already present are skipped; the returned
    /// list holds only the entries that were actually added.
    pub fn add_files(&mut self, raw_entries: Vec<RawFileEntry>) -> Vec<FileEntry> {
        let mut added = Vec::new();

        for raw in raw_entries {
            if self.files.iter().any(|f| f.path == raw.path) {
                tracing::debug!(path = %raw.path.display(), "skipping duplicate path");
                continue;
            }

            let name = file_name_of(&raw.path);
            let entry = FileEntry {
                id: FileId::new(),
                extension: extension_of(&name),
                name,
                path: raw.path,
                size: raw.size,
                last_modified: raw.last_modified,
                selected: false,
            };

            let episode = added.len() as u32 + 1;
            let record = RenameRecord::new(entry.id, self.default_resolution.clone(), episode);

            self.records.insert(entry.id, record);
            self.files.push(entry.clone());
            added.push(entry);
        }

        tracing::info!(added = added.len(), total = self.files.len(), "files added");
        added
    }

    pub fn remove_file(&mut self, id: FileId) {
        let Some(index) = self.position(id) else {
            return;
        };
        self.files.remove(index);
        self.records.remove(&id);
        self.selection.remove(&id);
        tracing::info!(file_id = %id, "file removed");
    }

    pub fn remove_files(&mut self, ids: &[FileId]) {
        for id in ids {
            self.remove_file(*id);
        }
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
        self.records.clear();
        self.selection.clear();
        tracing::info!("file list cleared");
    }

    pub fn toggle_file_selection(&mut self, id: FileId) {
        let selected = !self.selection.contains(&id);
        self.set_file_selection(id, selected);
    }

    pub fn set_file_selection(&mut self, id: FileId, selected: bool) {
        let Some(file) = self.files.iter_mut().find(|f| f.id == id) else {
            return;
        };
        file.selected = selected;
        if selected {
            self.selection.insert(id);
        } else {
            self.selection.remove(&id);
        }
    }

    /// Select everything unless everything is already selected, in which
    /// case the selection is cleared.
    pub fn toggle_select_all(&mut self) {
        let select = self.selection.len() != self.files.len();
        self.selection.clear();
        for file in &mut self.files {
            file.selected = select;
            if select {
                self.selection.insert(file.id);
            }
        }
    }

    /// Replace the file order wholesale. `order` must name every current
    /// file exactly once.
    pub fn update_file_order(&mut self, order: &[FileId]) -> Result<(), StoreError> {
        let unique: HashSet<&FileId> = order.iter().collect();
        let is_permutation = order.len() == self.files.len()
            && unique.len() == order.len()
            && order.iter().all(|id| self.records.contains_key(id));
        if !is_permutation {
            return Err(StoreError::NotAPermutation {
                expected: self.files.len(),
                got: order.len(),
            });
        }

        let mut by_id: HashMap<FileId, FileEntry> =
            self.files.drain(..).map(|f| (f.id, f)).collect();
        self.files = order.iter().filter_map(|id| by_id.remove(id)).collect();
        Ok(())
    }

    /// Swap a file with its neighbour. Returns false at either end.
    pub fn move_file(&mut self, id: FileId, direction: MoveDirection) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.files.len() => index + 1,
            _ => return false,
        };
        let mut order: Vec<FileId> = self.files.iter().map(|f| f.id).collect();
        order.swap(index, target);
        self.update_file_order(&order).is_ok()
    }

    /// Set one field on the record paired with `id`. Returns false when no
    /// such record exists.
    pub fn update_file_rename_data(&mut self, id: FileId, field: RenameField) -> bool {
        match self.records.get_mut(&id) {
            Some(record) => {
                record.apply(field);
                true
            }
            None => false,
        }
    }

    /// Apply every field to every record. A start episode also renumbers
    /// each record's episode as `start + position`.
    pub fn update_all_files_rename_data(&mut self, fields: impl IntoIterator<Item = RenameField>) {
        let fields: Vec<RenameField> = fields.into_iter().collect();

        for (index, file) in self.files.iter().enumerate() {
            let Some(record) = self.records.get_mut(&file.id) else {
                continue;
            };
            for field in &fields {
                if let RenameField::StartEpisode(start) = field {
                    record.episode = start.map(|s| s.saturating_add(index as u32));
                }
                record.apply(field.clone());
            }
        }

        tracing::info!(fields = fields.len(), files = self.files.len(), "bulk rename data applied");
    }

    /// Resynchronize an entry with the disk after a successful rename.
    pub fn update_file_info(
        &mut self,
        id: FileId,
        new_name: impl Into<String>,
        new_path: impl Into<PathBuf>,
    ) {
        let Some(file) = self.files.iter_mut().find(|f| f.id == id) else {
            return;
        };
        file.name = new_name.into();
        file.path = new_path.into();
        file.extension = extension_of(&file.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(paths: &[&str]) -> BatchStore {
        let mut store = BatchStore::new();
        store.add_files(paths.iter().map(|p| RawFileEntry::new(*p, 10)).collect());
        store
    }

    fn ids(store: &BatchStore) -> Vec<FileId> {
        store.files().iter().map(|f| f.id).collect()
    }

    fn assert_aligned(store: &BatchStore) {
        let records: Vec<FileId> = store.records().map(|r| r.file_id).collect();
        assert_eq!(records, ids(store));
        assert_eq!(store.records.len(), store.files.len());
    }

    #[test]
    fn add_derives_name_and_extension() {
        let store = store_with(&["/videos/Show.EP01.MKV"]);
        let file = &store.files()[0];
        assert_eq!(file.name, "Show.EP01.MKV");
        assert_eq!(file.extension, "mkv");
        assert_eq!(file.size, 10);
        assert!(!file.selected);
    }

    #[test]
    fn add_without_extension() {
        let store = store_with(&["/videos/README"]);
        assert_eq!(store.files()[0].extension, "");
    }

    #[test]
    fn add_assigns_sequential_default_records() {
        let store = store_with(&["/a/1.mp4", "/a/2.mp4", "/a/3.mp4"]);
        let episodes: Vec<Option<u32>> = store.records().map(|r| r.episode).collect();
        assert_eq!(episodes, vec![Some(1), Some(2), Some(3)]);
        for record in store.records() {
            assert_eq!(record.resolution, DEFAULT_RESOLUTION);
            assert_eq!(record.season, Some(1));
            assert_eq!(record.start_episode, Some(1));
        }
        assert_aligned(&store);
    }

    #[test]
    fn add_is_idempotent_per_path() {
        let mut store = store_with(&["/a/1.mp4", "/a/2.mp4"]);
        let again = store.add_files(vec![
            RawFileEntry::new("/a/1.mp4", 10),
            RawFileEntry::new("/a/2.mp4", 10),
        ]);
        assert!(again.is_empty());
        assert_eq!(store.total_files(), 2);
        assert_aligned(&store);
    }

    #[test]
    fn add_skips_duplicates_within_one_call() {
        let mut store = BatchStore::new();
        let added = store.add_files(vec![
            RawFileEntry::new("/a/1.mp4", 1),
            RawFileEntry::new("/a/1.mp4", 1),
            RawFileEntry::new("/a/2.mp4", 1),
        ]);
        assert_eq!(added.len(), 2);
        assert_eq!(store.records().nth(1).and_then(|r| r.episode), Some(2));
    }

    #[test]
    fn custom_default_resolution() {
        let mut store = BatchStore::with_default_resolution("720p");
        store.add_files(vec![RawFileEntry::new("/a/1.mp4", 1)]);
        assert_eq!(store.records().next().map(|r| r.resolution.as_str()), Some("720p"));
    }

    #[test]
    fn remove_drops_record_and_selection() {
        let mut store = store_with(&["/a/1.mp4", "/a/2.mp4", "/a/3.mp4"]);
        let id = ids(&store)[1];
        store.set_file_selection(id, true);
        store.remove_file(id);

        assert_eq!(store.total_files(), 2);
        assert!(store.record(id).is_none());
        assert_eq!(store.selected_count(), 0);
        assert_aligned(&store);

        store.remove_file(id);
        assert_eq!(store.total_files(), 2);
    }

    #[test]
    fn remove_many_and_clear() {
        let mut store = store_with(&["/a/1.mp4", "/a/2.mp4", "/a/3.mp4"]);
        let all = ids(&store);
        store.remove_files(&all[..2]);
        assert_eq!(store.total_files(), 1);
        assert_aligned(&store);

        store.toggle_select_all();
        store.clear_files();
        assert_eq!(store.total_files(), 0);
        assert_eq!(store.selected_count(), 0);
        assert_eq!(store.records().count(), 0);
    }

    #[test]
    fn selection_toggles() {
        let mut store = store_with(&["/a/1.mp4", "/a/2.mp4"]);
        let all = ids(&store);

        store.toggle_file_selection(all[0]);
        assert!(store.is_selected(all[0]));
        assert!(store.files()[0].selected);

        store.toggle_file_selection(all[0]);
        assert!(!store.is_selected(all[0]));
        assert!(!store.files()[0].selected);

        store.set_file_selection(all[1], true);
        store.set_file_selection(all[1], true);
        assert_eq!(store.selected_count(), 1);

        store.set_file_selection(FileId::new(), true);
        assert_eq!(store.selected_count(), 1);
    }

    #[test]
    fn toggle_select_all_selects_then_clears() {
        let mut store = store_with(&["/a/1.mp4", "/a/2.mp4", "/a/3.mp4"]);
        let all = ids(&store);
        store.set_file_selection(all[2], true);

        store.toggle_select_all();
        assert_eq!(store.selected_count(), 3);
        assert_eq!(store.selected_ids(), all);

        store.toggle_select_all();
        assert_eq!(store.selected_count(), 0);
        assert!(store.files().iter().all(|f| !f.selected));
    }

    #[test]
    fn reorder_keeps_records_paired() {
        let mut store = store_with(&["/a/1.mp4", "/a/2.mp4", "/a/3.mp4"]);
        let all = ids(&store);
        let reversed: Vec<FileId> = all.iter().rev().copied().collect();

        store.update_file_order(&reversed).unwrap();
        assert_eq!(ids(&store), reversed);
        assert_aligned(&store);
        assert_eq!(store.files()[0].name, "3.mp4");
    }

    #[test]
    fn reorder_rejects_non_permutations() {
        let mut store = store_with(&["/a/1.mp4", "/a/2.mp4"]);
        let all = ids(&store);

        assert!(store.update_file_order(&all[..1]).is_err());
        assert!(store.update_file_order(&[all[0], all[0]]).is_err());
        assert!(store.update_file_order(&[all[0], FileId::new()]).is_err());
        assert_eq!(ids(&store), all);
    }

    #[test]
    fn move_file_steps_once() {
        let mut store = store_with(&["/a/1.mp4", "/a/2.mp4", "/a/3.mp4"]);
        let all = ids(&store);

        assert!(store.move_file(all[2], MoveDirection::Up));
        assert_eq!(ids(&store), vec![all[0], all[2], all[1]]);
        assert!(!store.move_file(all[0], MoveDirection::Up));
        assert!(store.move_file(all[0], MoveDirection::Down));
        assert_eq!(ids(&store), vec![all[2], all[0], all[1]]);
        assert_aligned(&store);
    }

    #[test]
    fn single_field_update() {
        let mut store = store_with(&["/a/1.mp4"]);
        let id = ids(&store)[0];

        assert!(store.update_file_rename_data(id, RenameField::WorkName("Example".into())));
        assert_eq!(store.record(id).map(|r| r.work_name.as_str()), Some("Example"));
        assert!(!store.update_file_rename_data(FileId::new(), RenameField::IsMovie(true)));
    }

    #[test]
    fn bulk_start_episode_renumbers() {
        let mut store = store_with(&["/a/1.mp4", "/a/2.mp4", "/a/3.mp4"]);
        store.update_all_files_rename_data([
            RenameField::StartEpisode(Some(5)),
            RenameField::WorkName("Example".into()),
        ]);

        let episodes: Vec<Option<u32>> = store.records().map(|r| r.episode).collect();
        assert_eq!(episodes, vec![Some(5), Some(6), Some(7)]);
        assert!(store.records().all(|r| r.start_episode == Some(5)));
        assert!(store.records().all(|r| r.work_name == "Example"));
    }

    #[test]
    fn bulk_update_follows_current_order() {
        let mut store = store_with(&["/a/1.mp4", "/a/2.mp4"]);
        let all = ids(&store);
        store.update_file_order(&[all[1], all[0]]).unwrap();
        store.update_all_files_rename_data([RenameField::StartEpisode(Some(1))]);

        assert_eq!(store.record(all[1]).and_then(|r| r.episode), Some(1));
        assert_eq!(store.record(all[0]).and_then(|r| r.episode), Some(2));
    }

    #[test]
    fn file_info_resync() {
        let mut store = store_with(&["/a/old.mp4"]);
        let id = ids(&store)[0];
        store.update_file_info(id, "[Group][Work].MP4", "/a/[Group][Work].MP4");

        let file = store.file(id).unwrap();
        assert_eq!(file.name, "[Group][Work].MP4");
        assert_eq!(file.path, PathBuf::from("/a/[Group][Work].MP4"));
        assert_eq!(file.extension, "mp4");
    }

    #[test]
    fn processing_flag() {
        let mut store = BatchStore::new();
        assert!(!store.is_processing());
        store.set_processing(true);
        assert!(store.is_processing());
    }
}
