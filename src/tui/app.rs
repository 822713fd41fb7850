use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::widgets::{ListState, ScrollbarState};

use crate::config::RenamerConfig;
use crate::presets::{self, RESOLUTIONS, SOURCES};
use crate::probe::{AnalysisSummary, MediaProbe};
use crate::record::RenameRecord;
use crate::rename_engine::{UndoOperation, compose_filename, file_extension, sanitize_filename};
use crate::store::{BatchStore, FileEntry, FileId, MoveDirection, RawFileEntry};
use crate::validation::validate;

use super::models::{FileStatus, Focus, FormField, ProcessingStats};

const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

pub struct App {
    pub store: BatchStore,
    pub config: RenamerConfig,
    pub probe: Arc<dyn MediaProbe>,
    pub list_state: ListState,
    pub scroll_state: ScrollbarState,
    pub focus: Focus,
    /// Bulk form; applied to every file (or the highlighted one) on demand.
    pub form: RenameRecord,
    pub form_field: FormField,
    pub validation_errors: Vec<String>,
    pub statuses: HashMap<FileId, FileStatus>,
    pub analysis: Option<(FileId, AnalysisSummary)>,
    pub undo_operations: Vec<UndoOperation>,
    pub stats: ProcessingStats,
    pub processing_progress: f64,
    pub show_help: bool,
    pub show_preview: bool,
    pub finished: bool,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
    pub encoder_groups: Vec<String>,
    pub subtitle_groups: Vec<String>,
}

impl App {
    pub fn new(config: RenamerConfig, probe: Arc<dyn MediaProbe>) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            store: BatchStore::with_default_resolution(config.default_resolution.clone()),
            form: RenameRecord::new(FileId::new(), config.default_resolution.clone(), 1),
            encoder_groups: config.encoder_groups(),
            subtitle_groups: config.subtitle_groups(),
            config,
            probe,
            list_state,
            scroll_state: ScrollbarState::default(),
            focus: Focus::Files,
            form_field: FormField::WorkName,
            validation_errors: Vec::new(),
            statuses: HashMap::new(),
            analysis: None,
            undo_operations: Vec::new(),
            stats: ProcessingStats::default(),
            processing_progress: 0.0,
            show_help: false,
            show_preview: true,
            finished: false,
            should_quit: false,
            status_message: None,
            status_message_time: None,
        }
    }

    pub fn with_selected_files(
        files: Vec<RawFileEntry>,
        config: RenamerConfig,
        probe: Arc<dyn MediaProbe>,
    ) -> Self {
        let mut app = Self::new(config, probe);
        app.add_files(files);
        app
    }

    pub fn add_files(&mut self, files: Vec<RawFileEntry>) {
        let files: Vec<RawFileEntry> = files.into_iter().filter(|f| !f.is_directory).collect();
        let added = self.store.add_files(files);
        for entry in &added {
            self.statuses.insert(entry.id, FileStatus::pending());
        }
        self.stats.total = self.store.total_files();
        self.sync_list_state();
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn clear_status_message_if_expired(&mut self) {
        if self
            .status_message_time
            .is_some_and(|t| t.elapsed() >= STATUS_MESSAGE_TTL)
        {
            self.status_message = None;
            self.status_message_time = None;
        }
    }

    pub fn highlighted(&self) -> Option<&FileEntry> {
        self.list_state
            .selected()
            .and_then(|i| self.store.files().get(i))
    }

    pub fn highlighted_id(&self) -> Option<FileId> {
        self.highlighted().map(|f| f.id)
    }

    /// Files a rename run acts on: the selection, or everything when
    /// nothing is selected.
    pub fn target_ids(&self) -> Vec<FileId> {
        if self.store.selected_count() > 0 {
            self.store.selected_ids()
        } else {
            self.store.files().iter().map(|f| f.id).collect()
        }
    }

    /// Name a file would get from its own record in the next rename run.
    pub fn preview_name(&self, id: FileId) -> Option<String> {
        let file = self.store.file(id)?;
        let record = self.store.record(id)?;
        let targets = self.target_ids();
        let index = targets
            .iter()
            .position(|t| *t == id)
            .or_else(|| self.store.position(id))
            .unwrap_or(0);
        let composed = compose_filename(record, file_extension(&file.name), index as u32);
        Some(sanitize_filename(&composed))
    }

    pub fn next(&mut self) {
        let len = self.store.total_files();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.select_row(i);
    }

    pub fn previous(&mut self) {
        let len = self.store.total_files();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.select_row(i);
    }

    fn select_row(&mut self, i: usize) {
        self.list_state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i);
    }

    fn sync_list_state(&mut self) {
        let len = self.store.total_files();
        self.scroll_state = self.scroll_state.content_length(len);
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.select_row(len - 1),
            None => self.select_row(0),
            Some(_) => {}
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_preview(&mut self) {
        self.show_preview = !self.show_preview;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Files => Focus::Form,
            Focus::Form => Focus::Files,
        };
    }

    pub fn toggle_highlighted_selection(&mut self) {
        if let Some(id) = self.highlighted_id() {
            self.store.toggle_file_selection(id);
        }
    }

    pub fn toggle_select_all(&mut self) {
        self.store.toggle_select_all();
    }

    pub fn move_highlighted(&mut self, direction: MoveDirection) {
        let Some(id) = self.highlighted_id() else {
            return;
        };
        if self.store.move_file(id, direction) {
            if let Some(i) = self.store.position(id) {
                self.select_row(i);
            }
        }
    }

    pub fn remove_highlighted(&mut self) {
        let Some(id) = self.highlighted_id() else {
            return;
        };
        self.store.remove_file(id);
        self.statuses.remove(&id);
        if self.analysis.as_ref().is_some_and(|(a, _)| *a == id) {
            self.analysis = None;
        }
        self.stats.total = self.store.total_files();
        self.sync_list_state();
    }

    pub fn clear_files(&mut self) {
        self.store.clear_files();
        self.statuses.clear();
        self.analysis = None;
        self.undo_operations.clear();
        self.stats = ProcessingStats::default();
        self.finished = false;
        self.sync_list_state();
        self.set_status_message("File list cleared");
    }

    /// Copy the form onto every record.
    pub fn apply_form_to_all(&mut self) {
        self.validation_errors = validate(&self.form).errors;
        self.store.update_all_files_rename_data(self.form.form_fields());
        self.reset_statuses();
        let message = if self.validation_errors.is_empty() {
            format!("Applied to {} file(s)", self.store.total_files())
        } else {
            format!("Applied with {} problem(s)", self.validation_errors.len())
        };
        self.set_status_message(message);
    }

    /// Copy the form onto the highlighted file's record only.
    pub fn apply_form_to_highlighted(&mut self) {
        let Some(id) = self.highlighted_id() else {
            return;
        };
        for field in self.form.form_fields() {
            self.store.update_file_rename_data(id, field);
        }
        self.statuses.insert(id, FileStatus::pending());
        self.set_status_message("Applied to highlighted file");
    }

    /// Load the highlighted file's record into the form.
    pub fn load_form_from_highlighted(&mut self) {
        let Some(record) = self.highlighted_id().and_then(|id| self.store.record(id)) else {
            return;
        };
        for field in record.form_fields() {
            self.form.apply(field);
        }
        self.validation_errors = validate(&self.form).errors;
        self.set_status_message("Loaded record into form");
    }

    fn reset_statuses(&mut self) {
        for file in self.store.files() {
            self.statuses.insert(file.id, FileStatus::pending());
        }
        self.finished = false;
    }

    pub fn form_value(&self, field: FormField) -> String {
        let number = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();
        match field {
            FormField::EncoderGroup => self.form.encoder_group.clone(),
            FormField::SubtitleGroup => self.form.subtitle_group.clone(),
            FormField::WorkName => self.form.work_name.clone(),
            FormField::WorkAlias => self.form.work_alias.clone(),
            FormField::WorkYear => number(self.form.work_year),
            FormField::Resolution => self.form.resolution.clone(),
            FormField::Season => number(self.form.season),
            FormField::StartEpisode => number(self.form.start_episode),
            FormField::IsMovie => (if self.form.is_movie { "yes" } else { "no" }).to_string(),
            FormField::VideoFormat => self.form.video_format.clone(),
            FormField::AudioFormat => self.form.audio_format.clone(),
            FormField::Source => self.form.source.clone(),
        }
    }

    pub fn next_form_field(&mut self) {
        self.form_field = self.form_field.next();
    }

    pub fn previous_form_field(&mut self) {
        self.form_field = self.form_field.previous();
    }

    /// Type a character into the focused form field. Numeric fields accept
    /// digits only.
    pub fn form_input(&mut self, c: char) {
        let field = self.form_field;
        if field == FormField::IsMovie {
            if c == ' ' {
                self.form.is_movie = !self.form.is_movie;
            }
            return;
        }
        if field.is_numeric() {
            let Some(digit) = c.to_digit(10) else {
                return;
            };
            let slot = self.numeric_slot(field);
            let current = slot.unwrap_or(0);
            if let Some(value) = current.checked_mul(10).and_then(|v| v.checked_add(digit)) {
                *slot = Some(value);
            }
            return;
        }
        match field {
            FormField::EncoderGroup => self.form.encoder_group_custom = true,
            FormField::SubtitleGroup => self.form.subtitle_group_custom = true,
            _ => {}
        }
        self.text_slot(field).push(c);
    }

    pub fn form_backspace(&mut self) {
        let field = self.form_field;
        if field == FormField::IsMovie {
            return;
        }
        if field.is_numeric() {
            let slot = self.numeric_slot(field);
            *slot = slot.map(|v| v / 10).filter(|v| *v != 0);
            return;
        }
        self.text_slot(field).pop();
    }

    /// Step through the presets of the focused field.
    pub fn cycle_form_value(&mut self, forward: bool) {
        match self.form_field {
            FormField::EncoderGroup => {
                let options: Vec<&str> = self.encoder_groups.iter().map(String::as_str).collect();
                if let Some(next) = presets::cycle(&options, &self.form.encoder_group, forward) {
                    self.form.encoder_group = next.to_string();
                    self.form.encoder_group_custom = false;
                }
            }
            FormField::SubtitleGroup => {
                let options: Vec<&str> = self.subtitle_groups.iter().map(String::as_str).collect();
                if let Some(next) = presets::cycle(&options, &self.form.subtitle_group, forward) {
                    self.form.subtitle_group = next.to_string();
                    self.form.subtitle_group_custom = false;
                }
            }
            FormField::Resolution => {
                let options: Vec<&str> = RESOLUTIONS.iter().map(|(_, v)| *v).collect();
                if let Some(next) = presets::cycle(&options, &self.form.resolution, forward) {
                    self.form.resolution = next.to_string();
                }
            }
            FormField::Source => {
                let options: Vec<&str> = SOURCES.iter().map(|(_, v)| *v).collect();
                if let Some(next) = presets::cycle(&options, &self.form.source, forward) {
                    self.form.source = next.to_string();
                }
            }
            FormField::IsMovie => self.form.is_movie = !self.form.is_movie,
            _ => {}
        }
    }

    fn numeric_slot(&mut self, field: FormField) -> &mut Option<u32> {
        match field {
            FormField::WorkYear => &mut self.form.work_year,
            FormField::Season => &mut self.form.season,
            _ => &mut self.form.start_episode,
        }
    }

    fn text_slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::EncoderGroup => &mut self.form.encoder_group,
            FormField::SubtitleGroup => &mut self.form.subtitle_group,
            FormField::WorkName => &mut self.form.work_name,
            FormField::WorkAlias => &mut self.form.work_alias,
            FormField::Resolution => &mut self.form.resolution,
            FormField::VideoFormat => &mut self.form.video_format,
            FormField::AudioFormat => &mut self.form.audio_format,
            _ => &mut self.form.source,
        }
    }
}
