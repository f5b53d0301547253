use nxfw_types::{TitleId, TitleVersion};
use serde::{Deserialize, Serialize};

/// Update checker events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UpdateEvent {
    /// Version-check request issued
    CheckStarted { current: TitleVersion },

    /// Remote root version equals the local one
    UpToDate { version: TitleVersion },

    /// Remote root version differs from the local one
    Available {
        current: TitleVersion,
        title_id: TitleId,
        remote: TitleVersion,
        /// Remote ordinal is lower than the local one
        downgrade: bool,
    },
}
