#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingStatus {
    Pending,
    Success,
    Error,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct FileStatus {
    pub status: ProcessingStatus,
    pub error_message: Option<String>,
}

impl FileStatus {
    pub fn pending() -> Self {
        Self {
            status: ProcessingStatus::Pending,
            error_message: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Files,
    Form,
}

/// Rows of the bulk form, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    EncoderGroup,
    SubtitleGroup,
    WorkName,
    WorkAlias,
    WorkYear,
    Resolution,
    Season,
    StartEpisode,
    IsMovie,
    VideoFormat,
    AudioFormat,
    Source,
}

impl FormField {
    pub const ALL: [FormField; 12] = [
        FormField::EncoderGroup,
        FormField::SubtitleGroup,
        FormField::WorkName,
        FormField::WorkAlias,
        FormField::WorkYear,
        FormField::Resolution,
        FormField::Season,
        FormField::StartEpisode,
        FormField::IsMovie,
        FormField::VideoFormat,
        FormField::AudioFormat,
        FormField::Source,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::EncoderGroup => "Encoder group",
            FormField::SubtitleGroup => "Subtitle group",
            FormField::WorkName => "Work name *",
            FormField::WorkAlias => "Alias",
            FormField::WorkYear => "Year",
            FormField::Resolution => "Resolution *",
            FormField::Season => "Season *",
            FormField::StartEpisode => "Start episode *",
            FormField::IsMovie => "Movie",
            FormField::VideoFormat => "Video format",
            FormField::AudioFormat => "Audio format",
            FormField::Source => "Source",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            FormField::WorkYear | FormField::Season | FormField::StartEpisode
        )
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub total: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}
