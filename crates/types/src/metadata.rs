//! Content metadata record shape
//!
//! The container codec decodes a downloaded meta-blob into a
//! [`ContentMetadataRecord`]. Its serde form is the JSON contract external
//! decoders print.

use crate::{ContentId, TitleId, TitleVersion};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One-character discriminator selecting the CDN metadata class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaType {
    /// Root system update record
    SystemUpdate,
    /// Titles referenced by a system update
    SystemTitle,
    /// Any other class served by the CDN
    Other(char),
}

impl MetaType {
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::SystemUpdate => 's',
            Self::SystemTitle => 'a',
            Self::Other(c) => c,
        }
    }
}

impl fmt::Display for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Kind of payload a content entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Meta,
    Program,
    Data,
    Control,
    HtmlDocument,
    LegalInformation,
    DeltaFragment,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Meta => "meta",
            Self::Program => "program",
            Self::Data => "data",
            Self::Control => "control",
            Self::HtmlDocument => "html_document",
            Self::LegalInformation => "legal_information",
            Self::DeltaFragment => "delta_fragment",
        };
        f.write_str(name)
    }
}

/// Reference to another metadata record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetaEntry {
    pub title_id: TitleId,
    pub version: TitleVersion,
}

impl MetaEntry {
    #[must_use]
    pub fn new(title_id: TitleId, version: TitleVersion) -> Self {
        Self { title_id, version }
    }
}

/// Reference to a leaf payload blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentEntry {
    pub content_id: ContentId,
    pub content_type: ContentType,
}

impl ContentEntry {
    #[must_use]
    pub fn new(content_id: ContentId, content_type: ContentType) -> Self {
        Self {
            content_id,
            content_type,
        }
    }
}

/// Decoded metadata record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadataRecord {
    pub title_id: TitleId,
    pub version: TitleVersion,
    #[serde(default)]
    pub meta_entries: Vec<MetaEntry>,
    #[serde(default)]
    pub content_entries: Vec<ContentEntry>,
}

impl ContentMetadataRecord {
    #[must_use]
    pub fn new(title_id: TitleId, version: TitleVersion) -> Self {
        Self {
            title_id,
            version,
            meta_entries: Vec::new(),
            content_entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_meta(mut self, title_id: TitleId, version: TitleVersion) -> Self {
        self.meta_entries.push(MetaEntry::new(title_id, version));
        self
    }

    #[must_use]
    pub fn with_content(mut self, content_id: ContentId, content_type: ContentType) -> Self {
        self.content_entries
            .push(ContentEntry::new(content_id, content_type));
        self
    }
}
