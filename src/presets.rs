//! Preset values offered by the form: well-known release groups, resolution
//! tiers and source tags.

pub const ENCODER_GROUPS: &[&str] = &[
    "VCB-Studio",
    "Snow-Raws",
    "BeanSub",
    "SweetSub",
    "LoliHouse",
    "ANi",
    "Nekomoe kissaten",
    "DMG",
    "Lilith-Raws",
    "NC-Raws",
    "EME",
    "Skymoon-Raws",
    "桜都字幕组",
    "极影字幕社",
    "幻樱字幕组",
    "喵萌奶茶屋",
    "千夏字幕组",
    "风车字幕组",
    "动漫国字幕组",
    "诸神字幕组",
];

pub const SUBTITLE_GROUPS: &[&str] = &[
    "桜都字幕组",
    "极影字幕社",
    "幻樱字幕组",
    "喵萌奶茶屋",
    "千夏字幕组",
    "风车字幕组",
    "动漫国字幕组",
    "诸神字幕组",
    "澄空学园",
    "华盟字幕社",
    "爱恋字幕社",
    "雪飘工作室",
    "悠哈C9字幕社",
    "白恋字幕组",
    "天使动漫论坛",
    "星空字幕组",
    "异域字幕组",
    "轻之国度",
    "HKG字幕组",
    "WOLF字幕组",
];

/// `(label, value)` pairs.
pub const RESOLUTIONS: &[(&str, &str)] = &[
    ("360p", "360p"),
    ("480p", "480p"),
    ("720p", "720p"),
    ("1080p", "1080p"),
    ("2K", "2k"),
    ("4K", "4k"),
];

/// `(label, value)` pairs; the empty value means "no source tag".
pub const SOURCES: &[(&str, &str)] = &[("None", ""), ("BDZip", "BDZip"), ("WebZip", "WebZip")];

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "m4v", "webm", "3gp", "ts",
];

/// Step through `options` starting from `current`, wrapping at both ends.
/// A value not in the list starts from the first (or last) option.
pub fn cycle<'a>(options: &[&'a str], current: &str, forward: bool) -> Option<&'a str> {
    if options.is_empty() {
        return None;
    }
    let len = options.len();
    let next = match options.iter().position(|o| *o == current) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    Some(options[next])
}
