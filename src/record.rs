use serde::{Deserialize, Serialize};

use crate::metadata::CanonicalMetadata;
use crate::store::FileId;

/// Per-file naming metadata used to compose a new filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRecord {
    pub file_id: FileId,
    pub encoder_group: String,
    pub encoder_group_custom: bool,
    pub subtitle_group: String,
    pub subtitle_group_custom: bool,
    pub work_name: String,
    pub work_alias: String,
    pub work_year: Option<u32>,
    pub resolution: String,
    pub season: Option<u32>,
    pub start_episode: Option<u32>,
    pub episode: Option<u32>,
    pub is_movie: bool,
    pub video_format: String,
    pub audio_format: String,
    pub source: String,
    /// Last generated filename. Advisory only.
    pub composed_name: Option<String>,
}

impl RenameRecord {
    pub fn new(file_id: FileId, resolution: impl Into<String>, episode: u32) -> Self {
        Self {
            file_id,
            encoder_group: String::new(),
            encoder_group_custom: false,
            subtitle_group: String::new(),
            subtitle_group_custom: false,
            work_name: String::new(),
            work_alias: String::new(),
            work_year: None,
            resolution: resolution.into(),
            season: Some(1),
            start_episode: Some(1),
            episode: Some(episode),
            is_movie: false,
            video_format: String::new(),
            audio_format: String::new(),
            source: String::new(),
            composed_name: None,
        }
    }

    pub fn apply(&mut self, field: RenameField) {
        match field {
            RenameField::EncoderGroup(v) => self.encoder_group = v,
            RenameField::EncoderGroupCustom(v) => self.encoder_group_custom = v,
            RenameField::SubtitleGroup(v) => self.subtitle_group = v,
            RenameField::SubtitleGroupCustom(v) => self.subtitle_group_custom = v,
            RenameField::WorkName(v) => self.work_name = v,
            RenameField::WorkAlias(v) => self.work_alias = v,
            RenameField::WorkYear(v) => self.work_year = v,
            RenameField::Resolution(v) => self.resolution = v,
            RenameField::Season(v) => self.season = v,
            RenameField::StartEpisode(v) => self.start_episode = v,
            RenameField::Episode(v) => self.episode = v,
            RenameField::IsMovie(v) => self.is_movie = v,
            RenameField::VideoFormat(v) => self.video_format = v,
            RenameField::AudioFormat(v) => self.audio_format = v,
            RenameField::Source(v) => self.source = v,
        }
    }

    /// Every editable field of this record, in form order. Feeding the
    /// result to a bulk update copies this record onto other records.
    pub fn form_fields(&self) -> Vec<RenameField> {
        vec![
            RenameField::EncoderGroup(self.encoder_group.clone()),
            RenameField::EncoderGroupCustom(self.encoder_group_custom),
            RenameField::SubtitleGroup(self.subtitle_group.clone()),
            RenameField::SubtitleGroupCustom(self.subtitle_group_custom),
            RenameField::WorkName(self.work_name.clone()),
            RenameField::WorkAlias(self.work_alias.clone()),
            RenameField::WorkYear(self.work_year),
            RenameField::Resolution(self.resolution.clone()),
            RenameField::Season(self.season),
            RenameField::StartEpisode(self.start_episode),
            RenameField::IsMovie(self.is_movie),
            RenameField::VideoFormat(self.video_format.clone()),
            RenameField::AudioFormat(self.audio_format.clone()),
            RenameField::Source(self.source.clone()),
        ]
    }

    /// Overwrite the probed fields with whatever the normalizer resolved.
    /// Empty canonical values leave the current value alone.
    pub fn merge_metadata(&mut self, metadata: &CanonicalMetadata) {
        if !metadata.resolution.is_empty() {
            self.resolution = metadata.resolution.clone();
        }
        if !metadata.video_format.is_empty() {
            self.video_format = metadata.video_format.clone();
        }
        if !metadata.audio_format.is_empty() {
            self.audio_format = metadata.audio_format.clone();
        }
    }
}

/// A single-field update addressed to a [`RenameRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameField {
    EncoderGroup(String),
    EncoderGroupCustom(bool),
    SubtitleGroup(String),
    SubtitleGroupCustom(bool),
    WorkName(String),
    WorkAlias(String),
    WorkYear(Option<u32>),
    Resolution(String),
    Season(Option<u32>),
    StartEpisode(Option<u32>),
    Episode(Option<u32>),
    IsMovie(bool),
    VideoFormat(String),
    AudioFormat(String),
    Source(String),
}
