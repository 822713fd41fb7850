//! Media probing through the `mediainfo` command-line tool.
//!
//! The probe reports tracks with `@type` discriminators (`General`, `Video`,
//! `Audio`). Field values the tool cannot determine come back as the
//! "unknown" sentinel; this module turns those into `None` so nothing
//! downstream ever sees the sentinel.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ProbeError;
use crate::metadata::leading_number;

/// Sentinel the probing layer uses for absent values.
pub const UNKNOWN_SENTINEL: &str = "未知";

/// A media file prober.
pub trait MediaProbe: Send + Sync {
    /// Human-readable name of the implementation.
    fn name(&self) -> &'static str;

    fn probe(&self, path: &Path) -> Result<ProbeReport, ProbeError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneralTrack {
    pub format: Option<String>,
    pub duration: Option<String>,
    pub overall_bit_rate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VideoTrack {
    pub format: Option<String>,
    pub format_profile: Option<String>,
    pub codec_id: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub frame_rate: Option<String>,
    pub bit_rate: Option<String>,
    pub aspect_ratio: Option<String>,
    pub duration: Option<String>,
}

impl VideoTrack {
    /// `"{width}x{height}"`, only when both are known.
    pub fn dimensions(&self) -> Option<String> {
        match (&self.width, &self.height) {
            (Some(w), Some(h)) => Some(format!("{w}x{h}")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AudioTrack {
    pub format: Option<String>,
    pub codec_id: Option<String>,
    pub channels: Option<String>,
    pub sampling_rate: Option<String>,
    pub bit_rate: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub general: Option<GeneralTrack>,
    /// First video track, if any.
    pub video: Option<VideoTrack>,
    pub audio: Vec<AudioTrack>,
}

#[derive(Deserialize)]
struct MediaInfoDocument {
    media: Option<MediaSection>,
}

#[derive(Deserialize)]
struct MediaSection {
    #[serde(default)]
    track: Vec<RawTrack>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawTrack {
    #[serde(rename = "@type")]
    kind: String,
    #[serde(rename = "Format", deserialize_with = "lenient")]
    format: Option<String>,
    #[serde(rename = "Format_Profile", deserialize_with = "lenient")]
    format_profile: Option<String>,
    #[serde(rename = "CodecID", deserialize_with = "lenient")]
    codec_id: Option<String>,
    #[serde(rename = "Width", deserialize_with = "lenient")]
    width: Option<String>,
    #[serde(rename = "Height", deserialize_with = "lenient")]
    height: Option<String>,
    #[serde(rename = "FrameRate", deserialize_with = "lenient")]
    frame_rate: Option<String>,
    #[serde(rename = "BitRate", deserialize_with = "lenient")]
    bit_rate: Option<String>,
    #[serde(rename = "OverallBitRate", deserialize_with = "lenient")]
    overall_bit_rate: Option<String>,
    #[serde(rename = "DisplayAspectRatio", deserialize_with = "lenient")]
    aspect_ratio: Option<String>,
    #[serde(rename = "Duration", deserialize_with = "lenient")]
    duration: Option<String>,
    #[serde(rename = "Channels", deserialize_with = "lenient")]
    channels: Option<String>,
    #[serde(rename = "SamplingRate", deserialize_with = "lenient")]
    sampling_rate: Option<String>,
    #[serde(rename = "Language", deserialize_with = "lenient")]
    language: Option<String>,
}

/// Accept strings or numbers; map blanks and the sentinel to `None`.
fn lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => known(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `None` for empty strings and the "unknown" sentinel in either spelling.
pub fn known(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == UNKNOWN_SENTINEL || trimmed.eq_ignore_ascii_case("unknown")
    {
        None
    } else {
        Some(value)
    }
}

impl ProbeReport {
    /// Parse `mediainfo --Output=JSON` output.
    pub fn from_json(json: &str) -> Result<Self, ProbeError> {
        let document: MediaInfoDocument = serde_json::from_str(json)?;
        let tracks = document.media.map(|m| m.track).unwrap_or_default();
        Ok(Self::from_tracks(tracks))
    }

    fn from_tracks(tracks: Vec<RawTrack>) -> Self {
        let mut report = ProbeReport::default();
        for track in tracks {
            match track.kind.as_str() {
                "General" if report.general.is_none() => {
                    report.general = Some(GeneralTrack {
                        format: track.format,
                        duration: track.duration,
                        overall_bit_rate: track.overall_bit_rate,
                    });
                }
                "Video" if report.video.is_none() => {
                    report.video = Some(VideoTrack {
                        format: track.format,
                        format_profile: track.format_profile,
                        codec_id: track.codec_id,
                        width: track.width,
                        height: track.height,
                        frame_rate: track.frame_rate,
                        bit_rate: track.bit_rate,
                        aspect_ratio: track.aspect_ratio,
                        duration: track.duration,
                    });
                }
                "Audio" => report.audio.push(AudioTrack {
                    format: track.format,
                    codec_id: track.codec_id,
                    channels: track.channels,
                    sampling_rate: track.sampling_rate,
                    bit_rate: track.bit_rate,
                    language: track.language,
                }),
                _ => {}
            }
        }
        report
    }

    /// Human-readable description of the probed file.
    pub fn summary(&self, file_size: u64) -> AnalysisSummary {
        let general = self.general.clone().unwrap_or_default();
        let video = self.video.clone().unwrap_or_default();
        let duration = general.duration.as_deref().or(video.duration.as_deref());

        AnalysisSummary {
            container: display(general.format.as_deref()),
            file_size: format_file_size(file_size),
            duration: format_duration(duration),
            bit_rate: format_bit_rate(general.overall_bit_rate.as_deref()),
            video_format: display(video.format.as_deref()),
            video_profile: display(video.format_profile.as_deref()),
            resolution: video.dimensions().unwrap_or_else(|| "unknown".to_string()),
            frame_rate: format_frame_rate(video.frame_rate.as_deref()),
            video_bit_rate: format_bit_rate(video.bit_rate.as_deref()),
            audio: self
                .audio
                .iter()
                .map(|track| AudioSummary {
                    format: display(track.format.as_deref()),
                    channels: format_channels(track.channels.as_deref()),
                    sample_rate: format_sample_rate(track.sampling_rate.as_deref()),
                    bit_rate: format_bit_rate(track.bit_rate.as_deref()),
                    language: display(track.language.as_deref()),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub container: String,
    pub file_size: String,
    pub duration: String,
    pub bit_rate: String,
    pub video_format: String,
    pub video_profile: String,
    pub resolution: String,
    pub frame_rate: String,
    pub video_bit_rate: String,
    pub audio: Vec<AudioSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioSummary {
    pub format: String,
    pub channels: String,
    pub sample_rate: String,
    pub bit_rate: String,
    pub language: String,
}

fn display(value: Option<&str>) -> String {
    value.unwrap_or("unknown").to_string()
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let bytes = bytes as f64;
    let exponent = (bytes.ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let scaled = ((bytes / 1024f64.powi(exponent as i32)) * 100.0).round() / 100.0;
    format!("{scaled} {}", UNITS[exponent])
}

/// Duration in seconds, as mediainfo reports it.
pub fn format_duration(seconds: Option<&str>) -> String {
    let Some(total) = seconds.and_then(leading_number) else {
        return "unknown".to_string();
    };
    let total = total.max(0.0).floor() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

pub fn format_bit_rate(bit_rate: Option<&str>) -> String {
    let Some(rate) = bit_rate.and_then(leading_number) else {
        return "unknown".to_string();
    };
    let rate = rate.trunc();
    if rate >= 1_000_000.0 {
        format!("{:.1} Mbps", rate / 1_000_000.0)
    } else if rate >= 1000.0 {
        format!("{:.0} Kbps", rate / 1000.0)
    } else {
        format!("{rate} bps")
    }
}

pub fn format_frame_rate(frame_rate: Option<&str>) -> String {
    match frame_rate.and_then(leading_number) {
        Some(rate) => format!("{rate:.2} fps"),
        None => "unknown".to_string(),
    }
}

pub fn format_channels(channels: Option<&str>) -> String {
    let Some(raw) = channels else {
        return "unknown".to_string();
    };
    match raw.trim() {
        "1" => "mono".to_string(),
        "2" => "stereo".to_string(),
        "6" => "5.1 surround".to_string(),
        "8" => "7.1 surround".to_string(),
        other => format!("{other} channels"),
    }
}

pub fn format_sample_rate(sample_rate: Option<&str>) -> String {
    match sample_rate.and_then(leading_number) {
        Some(rate) => format!("{:.1} kHz", rate.trunc() / 1000.0),
        None => "unknown".to_string(),
    }
}

/// Probe backed by the `mediainfo` executable.
#[derive(Debug, Clone)]
pub struct MediaInfoCli {
    binary: PathBuf,
}

impl MediaInfoCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self) -> Command {
        Command::new(&self.binary)
    }

    /// Whether the configured binary can be started at all.
    pub fn is_available(&self) -> bool {
        self.command()
            .arg("--Version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

impl Default for MediaInfoCli {
    fn default() -> Self {
        Self::new("mediainfo")
    }
}

impl MediaProbe for MediaInfoCli {
    fn name(&self) -> &'static str {
        "mediainfo"
    }

    fn probe(&self, path: &Path) -> Result<ProbeReport, ProbeError> {
        let tool = self.binary.display().to_string();
        tracing::debug!(tool = %tool, path = %path.display(), "probing media file");

        let output = self
            .command()
            .arg("--Output=JSON")
            .arg(path)
            .output()
            .map_err(|source| ProbeError::ToolUnavailable {
                tool: tool.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::ToolFailed {
                tool,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        ProbeReport::from_json(&String::from_utf8_lossy(&output.stdout))
    }
}
