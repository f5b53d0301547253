//! Structured logging integration for events
//!
//! Every event drained by the CLI is also recorded through `tracing` with
//! structured fields, so `--debug` log files carry the full run history.

use nxfw_events::{
    AppEvent, ArchiveEvent, DownloadEvent, GeneralEvent, ResolverEvent, UpdateEvent,
};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` using the tracing infrastructure with structured fields
#[allow(clippy::too_many_lines)]
pub fn log_event_with_tracing(event: &AppEvent) {
    let source = event.event_source();
    let source = source.as_str();

    match event {
        AppEvent::General(general) => match general {
            GeneralEvent::Warning { message, context } => {
                warn!(source, context = ?context, "{message}");
            }
            GeneralEvent::Error { message, details } => {
                error!(source, details = ?details, "{message}");
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(source, context = ?context, "{message}");
            }
            GeneralEvent::OperationStarted { operation } => {
                info!(source, operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                info!(source, operation = %operation, success, "Operation completed");
            }
            GeneralEvent::OperationFailed { operation, failure } => {
                error!(
                    source,
                    operation = %operation,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Operation failed"
                );
            }
        },

        AppEvent::Update(update) => match update {
            UpdateEvent::CheckStarted { current } => {
                info!(source, current = current.raw(), "Update check started");
            }
            UpdateEvent::UpToDate { version } => {
                info!(source, version = version.raw(), "System is up to date");
            }
            UpdateEvent::Available {
                current,
                title_id,
                remote,
                downgrade,
            } => {
                info!(
                    source,
                    current = current.raw(),
                    title_id = %title_id,
                    remote = remote.raw(),
                    downgrade,
                    "Update available"
                );
            }
        },

        AppEvent::Resolver(resolver) => match resolver {
            ResolverEvent::Started { title_id, version } => {
                info!(source, title_id = %title_id, version = version.raw(), "Resolution started");
            }
            ResolverEvent::MetaResolved {
                title_id,
                version,
                depth,
                meta_entries,
                content_entries,
            } => {
                info!(
                    source,
                    title_id = %title_id,
                    version = version.raw(),
                    depth,
                    meta_entries,
                    content_entries,
                    "Metadata resolved"
                );
            }
            ResolverEvent::MetaSkipped { title_id, version } => {
                debug!(source, title_id = %title_id, version = version.raw(), "Metadata already resolved");
            }
            ResolverEvent::ContentDeduplicated {
                content_id,
                title_id,
            } => {
                debug!(source, content_id = %content_id, title_id = %title_id, "Content already scheduled");
            }
            ResolverEvent::ContentScheduled { total, concurrency } => {
                info!(source, total, concurrency, "Content downloads scheduled");
            }
            ResolverEvent::Completed {
                meta_blobs,
                content_blobs,
                total_bytes,
                duration,
            } => {
                info!(
                    source,
                    meta_blobs,
                    content_blobs,
                    total_bytes,
                    duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                    "Resolution completed"
                );
            }
            ResolverEvent::Failed { failure } => {
                error!(
                    source,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Resolution failed"
                );
            }
        },

        AppEvent::Download(download) => match download {
            DownloadEvent::Started { item } => {
                debug!(source, item = %item, "Download started");
            }
            DownloadEvent::Completed {
                item,
                size,
                elapsed,
            } => {
                debug!(
                    source,
                    item = %item,
                    size,
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "Download completed"
                );
            }
            DownloadEvent::Retrying {
                item,
                attempt,
                max_attempts,
                backoff_delay,
                reason,
            } => {
                warn!(
                    source,
                    item = %item,
                    attempt,
                    max_attempts,
                    backoff_ms = u64::try_from(backoff_delay.as_millis()).unwrap_or(u64::MAX),
                    reason = %reason,
                    "Download retrying"
                );
            }
            DownloadEvent::Failed { item, failure } => {
                error!(
                    source,
                    item = %item,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Download failed"
                );
            }
        },

        AppEvent::Archive(archive) => match archive {
            ArchiveEvent::Started { path, entries } => {
                info!(source, path = %path.display(), entries, "Archive started");
            }
            ArchiveEvent::Completed { path, size } => {
                info!(source, path = %path.display(), size, "Archive completed");
            }
            ArchiveEvent::ChecksumWritten { path, checksum } => {
                info!(source, path = %path.display(), checksum = %checksum, "Checksum written");
            }
            ArchiveEvent::StagingDiscarded { path } => {
                debug!(source, path = %path.display(), "Staging directory removed");
            }
            ArchiveEvent::Failed { failure } => {
                error!(
                    source,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Archive failed"
                );
            }
        },
    }
}
