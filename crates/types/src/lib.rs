#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for nxfw
//!
//! This crate provides the identifiers, versions and metadata record shape
//! shared by the CDN client, the resolver and the archiver.

pub mod cdn;
pub mod id;
pub mod metadata;
pub mod version;

// Re-export commonly used types
pub use cdn::{RemoteVersionInfo, SystemUpdateMeta};
pub use id::{ContentId, TitleId};
pub use metadata::{ContentEntry, ContentMetadataRecord, ContentType, MetaEntry, MetaType};
pub use version::TitleVersion;

use serde::{Deserialize, Serialize};

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}
