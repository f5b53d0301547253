//! Title id and version parsing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum VersionError {
    #[error("invalid version: {input}")]
    InvalidVersion { input: String },

    #[error("invalid title id: {input}")]
    InvalidTitleId { input: String },

    #[error("invalid content id: {input}")]
    InvalidContentId { input: String },
}

impl UserFacingError for VersionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidVersion { .. } => {
                Some("Versions are raw decimal ordinals such as 1073741824.")
            }
            Self::InvalidTitleId { .. } => {
                Some("Title ids are 16 hex digits such as 0100000000000816.")
            }
            Self::InvalidContentId { .. } => Some("Content ids are 32 hex digits."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidVersion { .. } => "version.invalid_version",
            Self::InvalidTitleId { .. } => "version.invalid_title_id",
            Self::InvalidContentId { .. } => "version.invalid_content_id",
        };
        Some(code)
    }
}
