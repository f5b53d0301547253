#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Staging and packaging for nxfw
//!
//! Downloaded blobs land in a per-run [`WorkArea`]. Once the metadata graph
//! is resolved, [`create_archive`] packs the staged set into an uncompressed
//! zip next to an MD5 checksum sidecar.

mod archive;
mod work_area;

pub use archive::{archive_name, create_archive, ArchiveOutput, CHECKSUM_SUFFIX};
pub use work_area::{validate_name, StagedEntry, WorkArea};
