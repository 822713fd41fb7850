//! Auto-fill: probe files and turn what the probe reports into form values.

use std::sync::Arc;

use crate::error::ProbeError;
use crate::metadata::{CanonicalMetadata, normalize};
use crate::probe::{AnalysisSummary, MediaProbe, ProbeReport};
use crate::store::{FileEntry, FileId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoFill {
    pub canonical: CanonicalMetadata,
    pub report: ProbeReport,
    pub summary: AnalysisSummary,
}

pub fn analyze_file<P: MediaProbe + ?Sized>(probe: &P, file: &FileEntry) -> Result<AutoFill, ProbeError> {
    tracing::info!(probe = probe.name(), file = %file.name, "analyzing file");
    let report = probe.probe(&file.path)?;
    Ok(AutoFill {
        canonical: normalize(&report),
        summary: report.summary(file.size),
        report,
    })
}

/// `analyze_file` on the blocking pool. Probes wait on a child process.
pub async fn analyze_in_background(
    probe: Arc<dyn MediaProbe>,
    file: FileEntry,
) -> Result<AutoFill, ProbeError> {
    tokio::task::spawn_blocking(move || analyze_file(probe.as_ref(), &file)).await?
}

/// Analyze every file, strictly one after another.
pub async fn analyze_files(
    probe: Arc<dyn MediaProbe>,
    files: &[FileEntry],
) -> Vec<(FileId, Result<AutoFill, ProbeError>)> {
    let mut results = Vec::with_capacity(files.len());
    for file in files {
        let result = analyze_in_background(Arc::clone(&probe), file.clone()).await;
        if let Err(e) = &result {
            tracing::warn!(file = %file.name, error = %e, "analysis failed");
        }
        results.push((file.id, result));
    }
    results
}

/// Auto-fill from the first file of the batch only.
pub async fn analyze_first(
    probe: Arc<dyn MediaProbe>,
    files: &[FileEntry],
) -> Result<AutoFill, ProbeError> {
    let first = files.first().ok_or(ProbeError::NoFiles)?;
    analyze_in_background(probe, first.clone()).await
}
