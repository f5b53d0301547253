//! Metadata resolution error types
//!
//! These wrap the underlying cause with the title or content that was
//! being processed when the walk failed.

use std::borrow::Cow;

use crate::{Error, UserFacingError};

#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ResolveError {
    #[error("failed to resolve metadata for title {title_id} v{version}: {source}")]
    MetaFailed {
        title_id: String,
        version: u32,
        source: Box<Error>,
    },

    #[error("failed to download content {content_id} for title {title_id}: {source}")]
    ContentFailed {
        content_id: String,
        title_id: String,
        source: Box<Error>,
    },

    #[error("metadata graph deeper than {limit} levels at title {title_id}")]
    DepthExceeded { title_id: String, limit: usize },

    #[error("{} downloads failed, first: {}", failures.len(), first_failure(failures))]
    Multiple { failures: Vec<ResolveError> },
}

fn first_failure(failures: &[ResolveError]) -> String {
    failures
        .first()
        .map_or_else(String::new, ToString::to_string)
}

impl ResolveError {
    /// The wrapped cause, when this error carries one
    #[must_use]
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Self::MetaFailed { source, .. } | Self::ContentFailed { source, .. } => Some(source),
            Self::Multiple { failures } => failures.first().and_then(ResolveError::cause),
            Self::DepthExceeded { .. } => None,
        }
    }

    /// Collapse a list of failures into a single error
    ///
    /// Returns `None` for an empty list and the failure itself for a list of one.
    #[must_use]
    pub fn aggregate(mut failures: Vec<ResolveError>) -> Option<Self> {
        match failures.len() {
            0 => None,
            1 => failures.pop(),
            _ => Some(Self::Multiple { failures }),
        }
    }
}

impl UserFacingError for ResolveError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::DepthExceeded { .. } => {
                Some("The CDN returned an unexpectedly deep metadata graph; raise resolver.max_depth if this is legitimate.")
            }
            _ => self.cause().and_then(UserFacingError::user_hint),
        }
    }

    fn is_retryable(&self) -> bool {
        self.cause().is_some_and(UserFacingError::is_retryable)
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MetaFailed { .. } => "resolve.meta_failed",
            Self::ContentFailed { .. } => "resolve.content_failed",
            Self::DepthExceeded { .. } => "resolve.depth_exceeded",
            Self::Multiple { .. } => "resolve.multiple_failures",
        };
        Some(code)
    }
}
