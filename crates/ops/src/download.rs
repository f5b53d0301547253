//! Download a system update into a firmware archive

use crate::{DownloadReport, DownloadRequest, OpsCtx};
use nxfw_errors::{Error, NetworkError};
use nxfw_events::{AppEvent, ArchiveEvent, EventEmitter, FailureContext};
use nxfw_resolver::{CdnSource, MetadataResolver};
use nxfw_store::{archive_name, create_archive, WorkArea};
use std::sync::Arc;
use std::time::Instant;

const OPERATION: &str = "download";

/// Resolve, stage and archive the closure of a root title
///
/// The whole run is bounded by `network.deadline_secs`. The staging area is
/// removed once the archive step has run, whether it succeeded or not; after
/// a resolution failure it is left in place for inspection.
///
/// # Errors
///
/// Returns a `ResolveError` if any blob cannot be fetched or decoded, a
/// `StorageError` if staging or archiving fails, and
/// `NetworkError::DeadlineExceeded` if the deadline passes first.
pub async fn download_update(
    ctx: &OpsCtx,
    request: &DownloadRequest,
) -> Result<DownloadReport, Error> {
    ctx.emit_operation_started(OPERATION);

    let deadline = ctx.config.deadline();
    let result = match tokio::time::timeout(deadline, run(ctx, request)).await {
        Ok(result) => result,
        Err(_) => Err(NetworkError::DeadlineExceeded {
            seconds: deadline.as_secs(),
        }
        .into()),
    };

    match &result {
        Ok(_) => ctx.emit_operation_completed(OPERATION, true),
        Err(e) => ctx.emit_operation_failed(OPERATION, FailureContext::from_error(e)),
    }
    result
}

async fn run(ctx: &OpsCtx, request: &DownloadRequest) -> Result<DownloadReport, Error> {
    let start = Instant::now();
    let work_area = WorkArea::begin(ctx.config.staging_path()).await?;

    let source: Arc<dyn CdnSource> = ctx.client.clone();
    let resolver = MetadataResolver::new(source, Arc::clone(&ctx.codec), ctx.resolver_config())
        .with_event_sender(ctx.tx.clone());
    let resolution = resolver
        .resolve(request.title_id, request.version, &work_area)
        .await?;

    ctx.emit(AppEvent::Archive(ArchiveEvent::Started {
        path: request.output_dir.join(archive_name(request.version)),
        entries: resolution.meta_blobs.len() + resolution.content_blobs.len(),
    }));
    let archived = create_archive(&work_area, request.version, &request.output_dir).await;

    let staging_path = work_area.path().to_path_buf();
    match work_area.discard().await {
        Ok(()) => ctx.emit(AppEvent::Archive(ArchiveEvent::StagingDiscarded {
            path: staging_path,
        })),
        Err(e) => ctx.emit_warning(format!(
            "failed to remove staging directory {}: {e}",
            staging_path.display()
        )),
    }

    let archive = match archived {
        Ok(archive) => archive,
        Err(e) => {
            ctx.emit(AppEvent::Archive(ArchiveEvent::Failed {
                failure: FailureContext::from_error(&e),
            }));
            return Err(e);
        }
    };
    ctx.emit(AppEvent::Archive(ArchiveEvent::Completed {
        path: archive.archive_path.clone(),
        size: archive.size,
    }));
    ctx.emit(AppEvent::Archive(ArchiveEvent::ChecksumWritten {
        path: archive.sidecar_path.clone(),
        checksum: archive.checksum.clone(),
    }));

    Ok(DownloadReport {
        title_id: request.title_id,
        version: request.version,
        resolution,
        archive,
        duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    })
}
