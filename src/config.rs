use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fs_ops;
use crate::store::DEFAULT_RESOLUTION;

pub const CONFIG_ENV: &str = "VIDEO_RENAME_CONFIG";
pub const MEDIAINFO_ENV: &str = "VIDEO_RENAME_MEDIAINFO";
pub const DEFAULT_LOG_FILTER: &str = "info,video_rename=info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenamerConfig {
    /// Executable used to probe media files.
    pub mediainfo_path: PathBuf,
    /// Resolution given to newly added files.
    pub default_resolution: String,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Where the TUI writes its log. Headless runs log to stderr.
    pub log_file: Option<PathBuf>,
    pub extra_encoder_groups: Vec<String>,
    pub extra_subtitle_groups: Vec<String>,
}

impl Default for RenamerConfig {
    fn default() -> Self {
        Self {
            mediainfo_path: PathBuf::from("mediainfo"),
            default_resolution: DEFAULT_RESOLUTION.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_file: None,
            extra_encoder_groups: Vec::new(),
            extra_subtitle_groups: Vec::new(),
        }
    }
}

impl RenamerConfig {
    /// Load from `path`, else from `$VIDEO_RENAME_CONFIG`, else defaults.
    /// `$VIDEO_RENAME_MEDIAINFO` overrides the probe binary either way.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::from_file(&path).await?,
            None => Self::default(),
        };

        if let Some(binary) = std::env::var_os(MEDIAINFO_ENV) {
            config.mediainfo_path = PathBuf::from(binary);
        }

        config.validate()?;
        Ok(config)
    }

    pub async fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs_ops::read_file(path).await.map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mediainfo_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("mediainfo_path must not be empty".to_string()));
        }
        if self.default_resolution.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_resolution must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("video-rename.log"))
    }

    /// Built-in encoder groups followed by configured extras.
    pub fn encoder_groups(&self) -> Vec<String> {
        merge_presets(crate::presets::ENCODER_GROUPS, &self.extra_encoder_groups)
    }

    pub fn subtitle_groups(&self) -> Vec<String> {
        merge_presets(crate::presets::SUBTITLE_GROUPS, &self.extra_subtitle_groups)
    }
}

fn merge_presets(builtin: &[&str], extra: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = builtin.iter().map(|s| s.to_string()).collect();
    for group in extra {
        if !group.trim().is_empty() && !merged.contains(group) {
            merged.push(group.clone());
        }
    }
    merged
}

pub struct ConfigBuilder {
    mediainfo_path: Option<PathBuf>,
    default_resolution: Option<String>,
    log_filter: Option<String>,
    log_file: Option<PathBuf>,
    extra_encoder_groups: Vec<String>,
    extra_subtitle_groups: Vec<String>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            mediainfo_path: None,
            default_resolution: None,
            log_filter: None,
            log_file: None,
            extra_encoder_groups: Vec::new(),
            extra_subtitle_groups: Vec::new(),
        }
    }

    pub fn mediainfo_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.mediainfo_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn default_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.default_resolution = Some(resolution.into());
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    pub fn log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.log_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn encoder_group(mut self, group: impl Into<String>) -> Self {
        self.extra_encoder_groups.push(group.into());
        self
    }

    pub fn subtitle_group(mut self, group: impl Into<String>) -> Self {
        self.extra_subtitle_groups.push(group.into());
        self
    }

    pub fn build(self) -> Result<RenamerConfig, ConfigError> {
        let defaults = RenamerConfig::default();
        let config = RenamerConfig {
            mediainfo_path: self.mediainfo_path.unwrap_or(defaults.mediainfo_path),
            default_resolution: self.default_resolution.unwrap_or(defaults.default_resolution),
            log_filter: self.log_filter.unwrap_or(defaults.log_filter),
            log_file: self.log_file,
            extra_encoder_groups: self.extra_encoder_groups,
            extra_subtitle_groups: self.extra_subtitle_groups,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let config = RenamerConfig::from_json(r#"{"default_resolution": "720p"}"#).unwrap();
        assert_eq!(config.default_resolution, "720p");
        assert_eq!(config.mediainfo_path, PathBuf::from("mediainfo"));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn builder_validates() {
        let config = ConfigBuilder::new()
            .mediainfo_path("/usr/local/bin/mediainfo")
            .encoder_group("MyRaws")
            .build()
            .unwrap();
        assert_eq!(config.default_resolution, "1080p");
        assert_eq!(config.encoder_groups().last().map(String::as_str), Some("MyRaws"));

        let err = ConfigBuilder::new().default_resolution("  ").build();
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn extras_are_not_duplicated() {
        let config = ConfigBuilder::new()
            .subtitle_group("澄空学园")
            .subtitle_group("")
            .build()
            .unwrap();
        assert_eq!(config.subtitle_groups().len(), crate::presets::SUBTITLE_GROUPS.len());
    }

    #[tokio::test]
    async fn read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"mediainfo_path": "/opt/mediainfo", "log_file": "/tmp/x.log"}"#)
            .unwrap();

        let config = RenamerConfig::from_file(&path).await.unwrap();
        assert_eq!(config.mediainfo_path, PathBuf::from("/opt/mediainfo"));
        assert_eq!(config.log_file_path(), PathBuf::from("/tmp/x.log"));

        let missing = RenamerConfig::from_file(&dir.path().join("missing.json")).await;
        assert!(matches!(missing, Err(ConfigError::Read { .. })));

        std::fs::write(&path, "{").unwrap();
        assert!(matches!(RenamerConfig::from_file(&path).await, Err(ConfigError::Parse { .. })));
    }
}
