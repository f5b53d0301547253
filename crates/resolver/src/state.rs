//! Per-run resolution bookkeeping

use nxfw_types::{ContentId, TitleId, TitleVersion};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

/// What one resolution run has seen and staged so far
#[derive(Debug, Default)]
pub struct ResolutionState {
    seen_meta: HashSet<(TitleId, TitleVersion)>,
    seen_content: HashSet<ContentId>,
    meta_blobs: Vec<String>,
    content_blobs: Vec<String>,
    total_bytes: u64,
    skipped_meta: usize,
    deduplicated_content: usize,
}

impl ResolutionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit; false if the record was already visited this run
    pub fn mark_meta(&mut self, title_id: TitleId, version: TitleVersion) -> bool {
        let fresh = self.seen_meta.insert((title_id, version));
        if !fresh {
            self.skipped_meta += 1;
        }
        fresh
    }

    /// Claim a content id; false if another record already scheduled it
    pub fn mark_content(&mut self, content_id: ContentId) -> bool {
        let fresh = self.seen_content.insert(content_id);
        if !fresh {
            self.deduplicated_content += 1;
        }
        fresh
    }

    pub fn record_meta_blob(&mut self, name: String, size: usize) {
        self.meta_blobs.push(name);
        self.total_bytes += size as u64;
    }

    pub fn record_content_blob(&mut self, name: String, size: usize) {
        self.content_blobs.push(name);
        self.total_bytes += size as u64;
    }

    /// Finish the run
    #[must_use]
    pub fn into_report(
        self,
        root_title: TitleId,
        root_version: TitleVersion,
        duration: Duration,
    ) -> ResolutionReport {
        ResolutionReport {
            root_title,
            root_version,
            meta_blobs: self.meta_blobs,
            content_blobs: self.content_blobs,
            total_bytes: self.total_bytes,
            skipped_meta: self.skipped_meta,
            deduplicated_content: self.deduplicated_content,
            duration,
        }
    }
}

/// Summary of a successful resolution
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub root_title: TitleId,
    pub root_version: TitleVersion,
    /// Staged metadata blob names in visit order
    pub meta_blobs: Vec<String>,
    /// Staged content blob names in completion order
    pub content_blobs: Vec<String>,
    pub total_bytes: u64,
    pub skipped_meta: usize,
    pub deduplicated_content: usize,
    pub duration: Duration,
}
