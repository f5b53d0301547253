use nxfw_types::{ContentId, TitleId, TitleVersion};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Metadata graph traversal events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResolverEvent {
    /// Resolution of a root title started
    Started {
        title_id: TitleId,
        version: TitleVersion,
    },

    /// A metadata record was fetched, decoded and staged
    MetaResolved {
        title_id: TitleId,
        version: TitleVersion,
        depth: usize,
        meta_entries: usize,
        content_entries: usize,
    },

    /// A metadata record was already resolved earlier in this run
    MetaSkipped {
        title_id: TitleId,
        version: TitleVersion,
    },

    /// A content entry was already scheduled by another record
    ContentDeduplicated {
        content_id: ContentId,
        title_id: TitleId,
    },

    /// Metadata walk finished; content downloads are about to start
    ContentScheduled { total: usize, concurrency: usize },

    /// Resolution finished and every blob is staged
    Completed {
        meta_blobs: usize,
        content_blobs: usize,
        total_bytes: u64,
        duration: Duration,
    },

    /// Resolution aborted
    Failed { failure: FailureContext },
}
