//! Container codec error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("malformed container: {message}")]
    Malformed { message: String },

    #[error("decoder command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("decoder produced an invalid record: {message}")]
    InvalidRecord { message: String },
}

impl UserFacingError for DecodeError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Malformed { .. } => Some("Make sure the key file matches the CDN environment."),
            Self::CommandFailed { .. } => {
                Some("Check codec.command in the configuration file and that it is installed.")
            }
            Self::InvalidRecord { .. } => {
                Some("The decoder must print the metadata record as JSON on stdout.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Malformed { .. } => "decode.malformed",
            Self::CommandFailed { .. } => "decode.command_failed",
            Self::InvalidRecord { .. } => "decode.invalid_record",
        };
        Some(code)
    }
}
