//! Version-check response shape

use crate::{TitleId, TitleVersion};
use serde::{Deserialize, Serialize};

/// Body of the `system_update_meta` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVersionInfo {
    pub timestamp: i64,
    pub system_update_metas: Vec<SystemUpdateMeta>,
}

impl RemoteVersionInfo {
    /// The entry describing the latest root title, if the CDN sent one
    #[must_use]
    pub fn latest(&self) -> Option<&SystemUpdateMeta> {
        self.system_update_metas.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemUpdateMeta {
    pub title_id: TitleId,
    pub title_version: TitleVersion,
}
