//! Types for operations and results

use nxfw_resolver::ResolutionReport;
use nxfw_store::ArchiveOutput;
use nxfw_types::{TitleId, TitleVersion};
use serde::Serialize;
use std::path::PathBuf;

/// A remote root that differs from the local version
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct UpdateAvailable {
    pub title_id: TitleId,
    pub current: TitleVersion,
    pub remote: TitleVersion,
    /// Remote ordinal is lower than the current one
    pub downgrade: bool,
}

/// Root title to download and where to put the archive
#[derive(Clone, Debug)]
pub struct DownloadRequest {
    pub title_id: TitleId,
    pub version: TitleVersion,
    /// Existing directory receiving the archive and its sidecar
    pub output_dir: PathBuf,
}

impl DownloadRequest {
    #[must_use]
    pub fn new(title_id: TitleId, version: TitleVersion, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            title_id,
            version,
            output_dir: output_dir.into(),
        }
    }
}

/// Outcome of a completed download
#[derive(Clone, Debug, Serialize)]
pub struct DownloadReport {
    pub title_id: TitleId,
    pub version: TitleVersion,
    pub resolution: ResolutionReport,
    pub archive: ArchiveOutput,
    /// Execution time in milliseconds
    pub duration_ms: u64,
}
