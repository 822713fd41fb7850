//! Batch renaming of video files into bracketed release-style names such as
//! `[VCB-Studio][Example][1080p][S01E01].mkv`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs_ops;
pub mod headless;
pub mod metadata;
pub mod presets;
pub mod probe;
pub mod record;
pub mod rename_engine;
pub mod store;
pub mod tui;
pub mod validation;

pub use metadata::CanonicalMetadata;
pub use record::{RenameField, RenameRecord};
pub use rename_engine::compose_filename;
pub use store::{BatchStore, FileEntry, FileId, RawFileEntry};
pub use validation::{ValidationReport, validate};
