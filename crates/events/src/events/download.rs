use nxfw_types::{ContentId, TitleId, TitleVersion};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::FailureContext;

/// What a CDN transfer is fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DownloadItem {
    Meta {
        title_id: TitleId,
        version: TitleVersion,
    },
    Content {
        content_id: ContentId,
        title_id: TitleId,
    },
}

impl fmt::Display for DownloadItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meta { title_id, version } => write!(f, "title {title_id}v{}", version.raw()),
            Self::Content { content_id, .. } => write!(f, "content {content_id}"),
        }
    }
}

/// Download-specific events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Transfer started
    Started { item: DownloadItem },

    /// Transfer finished
    Completed {
        item: DownloadItem,
        size: u64,
        elapsed: Duration,
    },

    /// Transfer failed and will be retried
    Retrying {
        item: DownloadItem,
        attempt: u32,
        max_attempts: u32,
        backoff_delay: Duration,
        reason: String,
    },

    /// Transfer failed for good
    Failed {
        item: DownloadItem,
        failure: FailureContext,
    },
}
