//! Normalization of probed track information into the canonical tokens used
//! inside filenames.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::probe::{AudioTrack, ProbeReport};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalMetadata {
    pub resolution: String,
    pub video_format: String,
    pub audio_format: String,
}

const RESOLUTION_TIERS: &[(&str, &str)] = &[
    ("3840x2160", "2160p"),
    ("2560x1440", "1440p"),
    ("1920x1080", "1080p"),
    ("1280x720", "720p"),
    ("854x480", "480p"),
    ("640x360", "360p"),
];

const VIDEO_SIGNATURES: &[(&str, &[&str])] = &[
    ("AVC", &["avc", "h264", "h.264"]),
    ("HEVC", &["hevc", "h265", "h.265"]),
    ("VP9", &["vp9"]),
    ("VP8", &["vp8"]),
    ("AV1", &["av01", "av1"]),
    ("MPEG-2", &["mpeg2", "mpeg-2"]),
];

// E-AC-3 sits before AC-3: "e-ac-3" and "eac3" contain the AC-3 signatures.
const AUDIO_SIGNATURES: &[(&str, &[&str])] = &[
    ("AAC", &["aac"]),
    ("E-AC-3", &["e-ac-3", "eac3", "ec-3"]),
    ("AC-3", &["ac-3", "ac3", "dolby"]),
    ("DTS", &["dts"]),
    ("MP3", &["mp3", "mpeg audio"]),
    ("FLAC", &["flac"]),
    ("Opus", &["opus"]),
    ("Vorbis", &["vorbis"]),
    ("PCM", &["pcm"]),
];

const TEN_BIT_PROFILES: &[&str] = &["Main 10", "High 10"];

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))").expect("leading number regex is valid")
});

/// Parse the numeric prefix of `raw` ("23.976 fps" -> 23.976).
pub fn leading_number(raw: &str) -> Option<f64> {
    let captures = LEADING_NUMBER.captures(raw)?;
    captures
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

pub fn normalize(report: &ProbeReport) -> CanonicalMetadata {
    let video = report.video.as_ref();
    let resolution = video
        .and_then(|v| v.dimensions())
        .map(|dims| map_resolution(&dims))
        .unwrap_or_default();
    let video_format = video
        .map(|v| {
            map_video_format(
                v.format.as_deref(),
                v.format_profile.as_deref(),
                v.frame_rate.as_deref(),
            )
        })
        .unwrap_or_default();
    let audio_format = map_audio_format(&report.audio);

    tracing::debug!(%resolution, %video_format, %audio_format, "normalized probe report");

    CanonicalMetadata {
        resolution,
        video_format,
        audio_format,
    }
}

pub fn map_resolution(dimensions: &str) -> String {
    RESOLUTION_TIERS
        .iter()
        .find(|(raw, _)| *raw == dimensions)
        .map(|(_, tier)| (*tier).to_string())
        .unwrap_or_else(|| dimensions.to_string())
}

pub fn map_video_format(
    format: Option<&str>,
    profile: Option<&str>,
    frame_rate: Option<&str>,
) -> String {
    let Some(format) = format.filter(|f| !f.trim().is_empty()) else {
        return String::new();
    };

    let mut result = match_signature(VIDEO_SIGNATURES, format);

    if profile.is_some_and(|p| TEN_BIT_PROFILES.iter().any(|tag| p.contains(tag))) {
        result.push_str(" 10-bit");
    }

    if let Some(rate) = frame_rate.and_then(leading_number) {
        result.push_str(" @");
        result.push_str(&round_two_places(rate));
    }

    result
}

/// Group audio tracks by canonical codec, keeping first-seen order.
pub fn map_audio_format(tracks: &[AudioTrack]) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();

    for format in tracks
        .iter()
        .filter_map(|t| t.format.as_deref())
        .filter(|f| !f.trim().is_empty())
    {
        let token = match_signature(AUDIO_SIGNATURES, format);
        match counts.iter_mut().find(|(seen, _)| *seen == token) {
            Some((_, count)) => *count += 1,
            None => counts.push((token, 1)),
        }
    }

    counts
        .into_iter()
        .map(|(token, count)| {
            if count > 1 {
                format!("{token}x{count}")
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join("+")
}

fn match_signature(table: &[(&str, &[&str])], raw: &str) -> String {
    let lower = raw.to_lowercase();
    table
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(token, _)| (*token).to_string())
        .unwrap_or_else(|| raw.to_uppercase())
}

/// Round to two decimals and print without trailing zeros (24.0 -> "24").
fn round_two_places(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::VideoTrack;

    fn audio(format: &str) -> AudioTrack {
        AudioTrack {
            format: Some(format.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn resolution_tiers_and_passthrough() {
        assert_eq!(map_resolution("3840x2160"), "2160p");
        assert_eq!(map_resolution("1920x1080"), "1080p");
        assert_eq!(map_resolution("640x360"), "360p");
        assert_eq!(map_resolution("1440x1080"), "1440x1080");
    }

    #[test]
    fn video_format_with_ten_bit_and_frame_rate() {
        assert_eq!(
            map_video_format(Some("AVC"), Some("High 10"), Some("23.976")),
            "AVC 10-bit @23.98"
        );
        assert_eq!(
            map_video_format(Some("HEVC"), Some("Main 10@L5@High"), None),
            "HEVC 10-bit"
        );
        assert_eq!(map_video_format(Some("h.264"), Some("High"), Some("24.000")), "AVC @24");
    }

    #[test]
    fn video_format_signatures() {
        assert_eq!(map_video_format(Some("V_MPEGH/ISO/HEVC"), None, None), "HEVC");
        assert_eq!(map_video_format(Some("vp9"), None, None), "VP9");
        assert_eq!(map_video_format(Some("AV1"), None, None), "AV1");
        assert_eq!(map_video_format(Some("mpeg-2 video"), None, None), "MPEG-2");
        assert_eq!(map_video_format(Some("ProRes"), None, None), "PRORES");
        assert_eq!(map_video_format(None, Some("High 10"), Some("25")), "");
    }

    #[test]
    fn non_numeric_frame_rate_is_ignored() {
        assert_eq!(map_video_format(Some("AVC"), None, Some("VFR")), "AVC");
        assert_eq!(map_video_format(Some("AVC"), None, Some("29.970 fps")), "AVC @29.97");
    }

    #[test]
    fn audio_tracks_grouped_in_first_seen_order() {
        let tracks = vec![audio("FLAC"), audio("AAC LC"), audio("FLAC"), audio("FLAC")];
        assert_eq!(map_audio_format(&tracks), "FLACx3+AAC");
    }

    #[test]
    fn audio_ac3_family() {
        assert_eq!(map_audio_format(&[audio("E-AC-3")]), "E-AC-3");
        assert_eq!(map_audio_format(&[audio("AC-3")]), "AC-3");
        assert_eq!(map_audio_format(&[audio("MPEG Audio")]), "MP3");
        assert_eq!(map_audio_format(&[audio("truehd")]), "TRUEHD");
    }

    #[test]
    fn audio_tracks_without_format_are_skipped() {
        let tracks = vec![AudioTrack::default(), audio(""), audio("Opus")];
        assert_eq!(map_audio_format(&tracks), "Opus");
        assert_eq!(map_audio_format(&[]), "");
    }

    #[test]
    fn normalize_full_report() {
        let report = ProbeReport {
            general: None,
            video: Some(VideoTrack {
                format: Some("HEVC".to_string()),
                format_profile: Some("Main 10".to_string()),
                width: Some("1920".to_string()),
                height: Some("1080".to_string()),
                frame_rate: Some("23.976".to_string()),
                ..Default::default()
            }),
            audio: vec![audio("AAC"), audio("AAC")],
        };
        assert_eq!(
            normalize(&report),
            CanonicalMetadata {
                resolution: "1080p".to_string(),
                video_format: "HEVC 10-bit @23.98".to_string(),
                audio_format: "AACx2".to_string(),
            }
        );
    }

    #[test]
    fn normalize_without_video_track() {
        let report = ProbeReport::default();
        assert_eq!(normalize(&report), CanonicalMetadata::default());
    }
}
