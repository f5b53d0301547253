use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventSource};
use nxfw_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod archive;
pub mod download;
pub mod general;
pub mod resolver;
pub mod update;

pub use archive::*;
pub use download::*;
pub use general::*;
pub use resolver::*;
pub use update::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Update check outcome
    Update(UpdateEvent),

    /// Metadata graph traversal
    Resolver(ResolverEvent),

    /// Individual CDN transfers
    Download(DownloadEvent),

    /// Archive packaging and checksum sidecar
    Archive(ArchiveEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Update(_) => EventSource::UPDATE,
            Self::Resolver(_) => EventSource::RESOLVER,
            Self::Download(_) => EventSource::DOWNLOAD,
            Self::Archive(_) => EventSource::ARCHIVE,
        }
    }

    /// Severity used when forwarding the event to tracing.
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Download(DownloadEvent::Started { .. } | DownloadEvent::Completed { .. })
            | Self::Resolver(
                ResolverEvent::MetaSkipped { .. } | ResolverEvent::ContentDeduplicated { .. },
            ) => EventLevel::Debug,
            Self::General(GeneralEvent::Warning { .. })
            | Self::Download(DownloadEvent::Retrying { .. }) => EventLevel::Warn,
            Self::General(GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. })
            | Self::Resolver(ResolverEvent::Failed { .. })
            | Self::Download(DownloadEvent::Failed { .. })
            | Self::Archive(ArchiveEvent::Failed { .. }) => EventLevel::Error,
            _ => EventLevel::Info,
        }
    }
}
