#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Metadata graph resolution for nxfw
//!
//! Starting from a root system-update title, the resolver downloads and
//! decodes every reachable metadata record, then downloads every content
//! blob those records reference. Each blob is staged exactly once.
//!
//! The CDN and the container decoder sit behind the [`CdnSource`] and
//! [`ContainerCodec`] traits so the walk can be driven by in-memory fakes.

mod codec;
mod resolver;
mod source;
mod state;

pub use codec::{ContainerCodec, JsonCodec};
pub use resolver::{MetadataResolver, ResolverConfig};
pub use source::CdnSource;
pub use state::{ResolutionReport, ResolutionState};

/// Staged file name of a metadata blob
#[must_use]
pub fn meta_blob_name(server_content_id: &str) -> String {
    format!("{server_content_id}.cnmt.nca")
}

/// Staged file name of a content blob
#[must_use]
pub fn content_blob_name(content_id: &nxfw_types::ContentId) -> String {
    format!("{content_id}.nca")
}

