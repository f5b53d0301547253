//! Metadata graph walk and content download scheduling

use crate::codec::ContainerCodec;
use crate::source::CdnSource;
use crate::state::{ResolutionReport, ResolutionState};
use crate::{content_blob_name, meta_blob_name};
use nxfw_errors::{Error, NetworkError, ResolveError, UserFacingError};
use nxfw_events::{
    AppEvent, DownloadEvent, DownloadItem, EventEmitter, EventSender, FailureContext,
    ResolverEvent,
};
use nxfw_hash::{Hash, HashAlgorithm};
use nxfw_net::{CdnDownload, RetryPolicy, CONTENT_HASH_HEADER, CONTENT_ID_HEADER};
use nxfw_store::WorkArea;
use nxfw_types::{
    ContentEntry, ContentMetadataRecord, MetaType, TitleId, TitleVersion,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Resolver tuning
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Deepest meta-entry nesting accepted below the root
    pub max_depth: usize,
    /// Concurrent content downloads
    pub parallel_downloads: usize,
    /// Check blobs against `X-Nintendo-Content-Hash` when present
    pub verify_content_hash: bool,
    pub retry: RetryPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 16,
            parallel_downloads: 4,
            verify_content_hash: false,
            retry: RetryPolicy::none(),
        }
    }
}

/// Explicit worklist entry for the metadata walk
enum Frame {
    /// Fetch, stage and decode a record, then walk its meta-entries
    Enter {
        title_id: TitleId,
        version: TitleVersion,
        meta_type: MetaType,
        depth: usize,
    },
    /// All meta-entries of the record are resolved; schedule its content
    Exit { record: ContentMetadataRecord },
}

/// Content blob waiting for a download worker
struct PendingContent {
    entry: ContentEntry,
    owner: TitleId,
}

/// Downloads the transitive closure of a root title into a work area
pub struct MetadataResolver {
    fetcher: Fetcher,
    codec: Arc<dyn ContainerCodec>,
    config: ResolverConfig,
}

impl MetadataResolver {
    #[must_use]
    pub fn new(
        source: Arc<dyn CdnSource>,
        codec: Arc<dyn ContainerCodec>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            fetcher: Fetcher {
                source,
                retry: config.retry.clone(),
                verify_content_hash: config.verify_content_hash,
                tx: None,
            },
            codec,
            config,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.fetcher.tx = Some(tx);
        self
    }

    /// Resolve `root_title` at `root_version` and stage every blob
    ///
    /// Metadata records are walked depth-first, each record's meta-entries
    /// before its content. Content blobs are then downloaded concurrently.
    /// The first failure aborts the run; whatever was staged stays in the
    /// work area.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` naming the title or content that failed, or
    /// `ResolveError::Multiple` if several downloads failed before the
    /// in-flight ones could be cancelled.
    pub async fn resolve(
        &self,
        root_title: TitleId,
        root_version: TitleVersion,
        work_area: &WorkArea,
    ) -> Result<ResolutionReport, Error> {
        let started = Instant::now();
        self.emit(AppEvent::Resolver(ResolverEvent::Started {
            title_id: root_title,
            version: root_version,
        }));

        let mut state = ResolutionState::new();
        let result = async {
            let pending = self
                .walk_metadata(root_title, root_version, work_area, &mut state)
                .await?;
            self.download_content(pending, work_area, &mut state).await
        }
        .await;

        if let Err(error) = result {
            self.emit(AppEvent::Resolver(ResolverEvent::Failed {
                failure: FailureContext::from_error(&error),
            }));
            return Err(error);
        }

        let report = state.into_report(root_title, root_version, started.elapsed());
        self.emit(AppEvent::Resolver(ResolverEvent::Completed {
            meta_blobs: report.meta_blobs.len(),
            content_blobs: report.content_blobs.len(),
            total_bytes: report.total_bytes,
            duration: report.duration,
        }));
        Ok(report)
    }

    async fn walk_metadata(
        &self,
        root_title: TitleId,
        root_version: TitleVersion,
        work_area: &WorkArea,
        state: &mut ResolutionState,
    ) -> Result<Vec<PendingContent>, Error> {
        let mut pending = Vec::new();
        let mut stack = vec![Frame::Enter {
            title_id: root_title,
            version: root_version,
            meta_type: MetaType::SystemUpdate,
            depth: 0,
        }];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter {
                    title_id,
                    version,
                    meta_type,
                    depth,
                } => {
                    if !state.mark_meta(title_id, version) {
                        self.emit(AppEvent::Resolver(ResolverEvent::MetaSkipped {
                            title_id,
                            version,
                        }));
                        continue;
                    }
                    if depth > self.config.max_depth {
                        return Err(ResolveError::DepthExceeded {
                            title_id: title_id.to_string(),
                            limit: self.config.max_depth,
                        }
                        .into());
                    }

                    let record = self
                        .resolve_record(title_id, version, meta_type, work_area, state)
                        .await
                        .map_err(|source| ResolveError::MetaFailed {
                            title_id: title_id.to_string(),
                            version: version.raw(),
                            source: Box::new(source),
                        })?;

                    self.emit(AppEvent::Resolver(ResolverEvent::MetaResolved {
                        title_id,
                        version,
                        depth,
                        meta_entries: record.meta_entries.len(),
                        content_entries: record.content_entries.len(),
                    }));

                    let children: Vec<Frame> = record
                        .meta_entries
                        .iter()
                        .rev()
                        .map(|entry| Frame::Enter {
                            title_id: entry.title_id,
                            version: entry.version,
                            meta_type: MetaType::SystemTitle,
                            depth: depth + 1,
                        })
                        .collect();
                    stack.push(Frame::Exit { record });
                    stack.extend(children);
                }
                Frame::Exit { record } => {
                    for entry in record.content_entries {
                        if state.mark_content(entry.content_id) {
                            pending.push(PendingContent {
                                entry,
                                owner: record.title_id,
                            });
                        } else {
                            self.emit(AppEvent::Resolver(ResolverEvent::ContentDeduplicated {
                                content_id: entry.content_id,
                                title_id: record.title_id,
                            }));
                        }
                    }
                }
            }
        }

        Ok(pending)
    }

    /// Fetch a metadata blob, stage it under its server id, then decode it
    async fn resolve_record(
        &self,
        title_id: TitleId,
        version: TitleVersion,
        meta_type: MetaType,
        work_area: &WorkArea,
        state: &mut ResolutionState,
    ) -> Result<ContentMetadataRecord, Error> {
        let item = DownloadItem::Meta { title_id, version };
        let download = self
            .fetcher
            .fetch(item, |source| async move {
                source.fetch_meta(title_id, version, meta_type).await
            })
            .await?;

        let server_id = download
            .content_id
            .as_deref()
            .ok_or_else(|| NetworkError::MissingHeader {
                endpoint: download.endpoint.clone(),
                header: CONTENT_ID_HEADER.to_string(),
            })?;
        let name = meta_blob_name(server_id);
        work_area.stage(&name, &download.data).await?;
        state.record_meta_blob(name, download.data.len());

        Ok(self.codec.decode(&download.data).await?)
    }

    /// Download scheduled content with bounded concurrency
    ///
    /// Workers only fetch; this task stages every blob.
    async fn download_content(
        &self,
        pending: Vec<PendingContent>,
        work_area: &WorkArea,
        state: &mut ResolutionState,
    ) -> Result<(), Error> {
        let concurrency = self.config.parallel_downloads.max(1);
        self.emit(AppEvent::Resolver(ResolverEvent::ContentScheduled {
            total: pending.len(),
            concurrency,
        }));

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut tasks = JoinSet::new();
        for PendingContent { entry, owner } in pending {
            let fetcher = self.fetcher.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => fetcher.fetch_content(&entry, owner).await,
                    Err(e) => Err(Error::internal(format!("download pool closed: {e}"))),
                };
                (entry, owner, result)
            });
        }

        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (entry, owner, result) = match joined {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => continue,
                Err(e) => {
                    failures.push(Error::internal(format!("download task failed: {e}")));
                    tasks.abort_all();
                    continue;
                }
            };

            let staged = match result {
                Ok(download) => {
                    let name = content_blob_name(&entry.content_id);
                    match work_area.stage(&name, &download.data).await {
                        Ok(_) => {
                            state.record_content_blob(name, download.data.len());
                            Ok(())
                        }
                        Err(e) => Err(e),
                    }
                }
                Err(e) => Err(e),
            };

            if let Err(source) = staged {
                failures.push(
                    ResolveError::ContentFailed {
                        content_id: entry.content_id.to_string(),
                        title_id: owner.to_string(),
                        source: Box::new(source),
                    }
                    .into(),
                );
                tasks.abort_all();
            }
        }

        let mut resolve_failures = Vec::with_capacity(failures.len());
        for failure in failures {
            match failure {
                Error::Resolve(e) => resolve_failures.push(e),
                other => return Err(other),
            }
        }
        match ResolveError::aggregate(resolve_failures) {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}

impl EventEmitter for MetadataResolver {
    fn event_sender(&self) -> Option<&EventSender> {
        self.fetcher.tx.as_ref()
    }
}

/// Network side of the resolver, cloned into every download worker
#[derive(Clone)]
struct Fetcher {
    source: Arc<dyn CdnSource>,
    retry: RetryPolicy,
    verify_content_hash: bool,
    tx: Option<EventSender>,
}

impl EventEmitter for Fetcher {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl Fetcher {
    async fn fetch_content(
        &self,
        entry: &ContentEntry,
        owner: TitleId,
    ) -> Result<CdnDownload, Error> {
        let item = DownloadItem::Content {
            content_id: entry.content_id,
            title_id: owner,
        };
        let content_id = entry.content_id;
        let content_type = entry.content_type;
        self.fetch(item, |source| async move {
            source.fetch_content(&content_id, content_type).await
        })
        .await
    }

    /// Run one transfer with hash verification and retries
    async fn fetch<F, Fut>(&self, item: DownloadItem, op: F) -> Result<CdnDownload, Error>
    where
        F: Fn(Arc<dyn CdnSource>) -> Fut,
        Fut: Future<Output = Result<CdnDownload, Error>>,
    {
        let started = Instant::now();
        self.emit(AppEvent::Download(DownloadEvent::Started { item: item.clone() }));

        let mut attempt = 0;
        loop {
            let result = match op(Arc::clone(&self.source)).await {
                Ok(download) => self.verify(&item, download),
                Err(e) => Err(e),
            };

            match result {
                Ok(download) => {
                    self.emit(AppEvent::Download(DownloadEvent::Completed {
                        item,
                        size: download.data.len() as u64,
                        elapsed: started.elapsed(),
                    }));
                    return Ok(download);
                }
                Err(e) if attempt < self.retry.max_retries && e.is_retryable() => {
                    attempt += 1;
                    let delay = self.retry.backoff_delay(attempt);
                    self.emit(AppEvent::Download(DownloadEvent::Retrying {
                        item: item.clone(),
                        attempt,
                        max_attempts: self.retry.max_retries + 1,
                        backoff_delay: delay,
                        reason: e.to_string(),
                    }));
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    self.emit(AppEvent::Download(DownloadEvent::Failed {
                        item,
                        failure: FailureContext::from_error(&e),
                    }));
                    return Err(e);
                }
            }
        }
    }

    fn verify(&self, item: &DownloadItem, download: CdnDownload) -> Result<CdnDownload, Error> {
        if !self.verify_content_hash {
            return Ok(download);
        }
        let Some(expected) = download.content_hash.as_deref() else {
            tracing::debug!(%item, header = CONTENT_HASH_HEADER, "no hash advertised");
            return Ok(download);
        };

        let actual = Hash::from_data(HashAlgorithm::Sha256, &download.data);
        if actual.matches_hex(expected) {
            return Ok(download);
        }
        Err(NetworkError::ChecksumMismatch {
            content_id: item.to_string(),
            expected: expected.to_string(),
            actual: actual.to_hex(),
        }
        .into())
    }
}
