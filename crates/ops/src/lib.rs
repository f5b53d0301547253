#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations orchestration for nxfw
//!
//! This crate sits between the CLI and the specialized crates. It owns the
//! update check and the download pipeline (resolve, stage, archive) and the
//! external-command container codec the CLI plugs into the resolver.

mod codec;
mod context;
mod download;
mod types;
mod update;

pub use codec::CommandCodec;
pub use context::{OpsContextBuilder, OpsCtx};
pub use download::download_update;
pub use types::{DownloadReport, DownloadRequest, UpdateAvailable};
pub use update::{check_update, latest_update};

use nxfw_errors::{Error, OpsError};
use nxfw_types::TitleVersion;

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Remote root equals the local version
    UpToDate { version: TitleVersion },
    /// Remote root differs from the local version
    UpdateAvailable(UpdateAvailable),
    /// Archive written
    Downloaded(DownloadReport),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns `OpsError::SerializationError` if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        })
    }
}
