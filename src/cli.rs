use std::path::PathBuf;

use clap::Parser;

use crate::config::RenamerConfig;
use crate::record::RenameField;

/// Rename video files with bracketed release-style names.
///
/// Without `--preview` or `--apply` an interactive terminal UI is started.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "video-rename", version)]
pub struct Args {
    /// Video files to rename
    pub files: Vec<PathBuf>,

    /// Path to a JSON config file (falls back to $VIDEO_RENAME_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the composed names without renaming anything
    #[arg(long)]
    pub preview: bool,

    /// Rename the files without starting the terminal UI
    #[arg(long, conflicts_with = "preview")]
    pub apply: bool,

    /// Probe the first file and fill resolution, video and audio format
    #[arg(long)]
    pub analyze: bool,

    /// Probe every file and print a summary for each; the first file still
    /// fills the form
    #[arg(long)]
    pub analyze_all: bool,

    #[arg(long)]
    pub work_name: Option<String>,

    #[arg(long)]
    pub alias: Option<String>,

    #[arg(long)]
    pub year: Option<u32>,

    /// Resolution tag, e.g. 1080p
    #[arg(long)]
    pub resolution: Option<String>,

    #[arg(long)]
    pub season: Option<u32>,

    #[arg(long)]
    pub start_episode: Option<u32>,

    #[arg(long)]
    pub encoder_group: Option<String>,

    #[arg(long)]
    pub subtitle_group: Option<String>,

    /// Source tag, e.g. BDZip
    #[arg(long)]
    pub source: Option<String>,

    #[arg(long)]
    pub video_format: Option<String>,

    #[arg(long)]
    pub audio_format: Option<String>,

    /// Treat the files as a movie (no season/episode segment)
    #[arg(long)]
    pub movie: bool,
}

impl Args {
    pub fn is_headless(&self) -> bool {
        self.preview || self.apply
    }

    /// Form fields explicitly given on the command line. A group is custom
    /// unless it is one of the configured presets.
    pub fn form_fields(&self, config: &RenamerConfig) -> Vec<RenameField> {
        let mut fields = Vec::new();

        if let Some(group) = &self.encoder_group {
            fields.push(RenameField::EncoderGroup(group.clone()));
            fields.push(RenameField::EncoderGroupCustom(
                !config.encoder_groups().contains(group),
            ));
        }
        if let Some(group) = &self.subtitle_group {
            fields.push(RenameField::SubtitleGroup(group.clone()));
            fields.push(RenameField::SubtitleGroupCustom(
                !config.subtitle_groups().contains(group),
            ));
        }
        if let Some(name) = &self.work_name {
            fields.push(RenameField::WorkName(name.clone()));
        }
        if let Some(alias) = &self.alias {
            fields.push(RenameField::WorkAlias(alias.clone()));
        }
        if let Some(year) = self.year {
            fields.push(RenameField::WorkYear(Some(year)));
        }
        if let Some(resolution) = &self.resolution {
            fields.push(RenameField::Resolution(resolution.clone()));
        }
        if let Some(season) = self.season {
            fields.push(RenameField::Season(Some(season)));
        }
        if let Some(start) = self.start_episode {
            fields.push(RenameField::StartEpisode(Some(start)));
        }
        if let Some(video) = &self.video_format {
            fields.push(RenameField::VideoFormat(video.clone()));
        }
        if let Some(audio) = &self.audio_format {
            fields.push(RenameField::AudioFormat(audio.clone()));
        }
        if let Some(source) = &self.source {
            fields.push(RenameField::Source(source.clone()));
        }
        if self.movie {
            fields.push(RenameField::IsMovie(true));
        }

        fields
    }
}
