//! Integration tests for resolver

use async_trait::async_trait;
use bytes::Bytes;
use nxfw_errors::{Error, NetworkError, ResolveError};
use nxfw_net::{CdnDownload, RetryPolicy};
use nxfw_resolver::*;
use nxfw_store::WorkArea;
use nxfw_types::{
    ContentId, ContentMetadataRecord, ContentType, MetaType, TitleId, TitleVersion,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

const V: TitleVersion = TitleVersion::new(100);

fn tid(n: u64) -> TitleId {
    TitleId::new(0x0100_0000_0000_0800 + n)
}

fn cid(n: u8) -> ContentId {
    ContentId::from_bytes([n; 16])
}

fn server_id(title: TitleId) -> String {
    format!("{:032x}", u128::from(title.raw()))
}

/// In-memory CDN serving pre-decoded JSON records
#[derive(Default)]
struct FakeCdn {
    metas: HashMap<(TitleId, TitleVersion), (Option<String>, Bytes)>,
    contents: HashMap<ContentId, Bytes>,
    /// Content ids that answer 503 this many more times
    flaky: Mutex<HashMap<ContentId, usize>>,
    meta_log: Mutex<Vec<(TitleId, MetaType)>>,
    content_hits: Mutex<HashMap<ContentId, usize>>,
    content_hash: Option<String>,
}

impl FakeCdn {
    fn with_record(mut self, record: ContentMetadataRecord) -> Self {
        let key = (record.title_id, record.version);
        let blob = Bytes::from(serde_json::to_vec(&record).unwrap());
        for entry in &record.content_entries {
            self.contents
                .insert(entry.content_id, Bytes::from(entry.content_id.to_hex()));
        }
        self.metas
            .insert(key, (Some(server_id(record.title_id)), blob));
        self
    }

    fn without_header(mut self, title: TitleId) -> Self {
        if let Some(entry) = self.metas.get_mut(&(title, V)) {
            entry.0 = None;
        }
        self
    }

    fn meta_order(&self) -> Vec<TitleId> {
        self.meta_log.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    fn hits(&self, id: ContentId) -> usize {
        self.content_hits.lock().unwrap().get(&id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl CdnSource for FakeCdn {
    async fn fetch_meta(
        &self,
        title_id: TitleId,
        version: TitleVersion,
        meta_type: MetaType,
    ) -> Result<CdnDownload, Error> {
        self.meta_log.lock().unwrap().push((title_id, meta_type));
        let endpoint = format!("fake/t/{}/{title_id}/{}", meta_type.as_char(), version.raw());
        let (content_id, data) = self
            .metas
            .get(&(title_id, version))
            .cloned()
            .ok_or_else(|| NetworkError::HttpError {
                endpoint: endpoint.clone(),
                status: 404,
            })?;
        Ok(CdnDownload {
            endpoint,
            content_id,
            content_hash: None,
            data,
        })
    }

    async fn fetch_content(
        &self,
        content_id: &ContentId,
        _content_type: ContentType,
    ) -> Result<CdnDownload, Error> {
        *self
            .content_hits
            .lock()
            .unwrap()
            .entry(*content_id)
            .or_default() += 1;

        let endpoint = format!("fake/c/c/{content_id}");
        {
            let mut flaky = self.flaky.lock().unwrap();
            if let Some(remaining) = flaky.get_mut(content_id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(NetworkError::HttpError {
                        endpoint,
                        status: 503,
                    }
                    .into());
                }
            }
        }

        let data = self
            .contents
            .get(content_id)
            .cloned()
            .ok_or_else(|| NetworkError::HttpError {
                endpoint: endpoint.clone(),
                status: 404,
            })?;
        Ok(CdnDownload {
            endpoint,
            content_id: None,
            content_hash: self.content_hash.clone(),
            data,
        })
    }
}

fn resolver(cdn: Arc<FakeCdn>, config: ResolverConfig) -> MetadataResolver {
    MetadataResolver::new(cdn, Arc::new(JsonCodec), config)
}

async fn staged_names(work: &WorkArea) -> BTreeSet<String> {
    work.entries()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect()
}

/// Root references X and Y; X holds {A, B}, Y holds {B, C}
fn shared_content_cdn() -> FakeCdn {
    FakeCdn::default()
        .with_record(
            ContentMetadataRecord::new(tid(0), V)
                .with_meta(tid(1), V)
                .with_meta(tid(2), V),
        )
        .with_record(
            ContentMetadataRecord::new(tid(1), V)
                .with_content(cid(0xa), ContentType::Program)
                .with_content(cid(0xb), ContentType::Data),
        )
        .with_record(
            ContentMetadataRecord::new(tid(2), V)
                .with_content(cid(0xb), ContentType::Data)
                .with_content(cid(0xc), ContentType::Control),
        )
}

#[tokio::test]
async fn test_shared_content_is_fetched_once() {
    let temp = tempdir().unwrap();
    let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
    let cdn = Arc::new(shared_content_cdn());

    let report = resolver(Arc::clone(&cdn), ResolverConfig::default())
        .resolve(tid(0), V, &work)
        .await
        .unwrap();

    let expected: BTreeSet<String> = [
        format!("{}.cnmt.nca", server_id(tid(0))),
        format!("{}.cnmt.nca", server_id(tid(1))),
        format!("{}.cnmt.nca", server_id(tid(2))),
        format!("{}.nca", cid(0xa)),
        format!("{}.nca", cid(0xb)),
        format!("{}.nca", cid(0xc)),
    ]
    .into_iter()
    .collect();
    assert_eq!(staged_names(&work).await, expected);

    assert_eq!(cdn.hits(cid(0xa)), 1);
    assert_eq!(cdn.hits(cid(0xb)), 1);
    assert_eq!(cdn.hits(cid(0xc)), 1);
    assert_eq!(report.meta_blobs.len(), 3);
    assert_eq!(report.content_blobs.len(), 3);
    assert_eq!(report.deduplicated_content, 1);
}

#[tokio::test]
async fn test_meta_walk_is_depth_first_preorder() {
    let temp = tempdir().unwrap();
    let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
    let cdn = Arc::new(
        FakeCdn::default()
            .with_record(
                ContentMetadataRecord::new(tid(0), V)
                    .with_meta(tid(1), V)
                    .with_meta(tid(3), V),
            )
            .with_record(ContentMetadataRecord::new(tid(1), V).with_meta(tid(2), V))
            .with_record(ContentMetadataRecord::new(tid(2), V))
            .with_record(ContentMetadataRecord::new(tid(3), V)),
    );

    resolver(Arc::clone(&cdn), ResolverConfig::default())
        .resolve(tid(0), V, &work)
        .await
        .unwrap();

    assert_eq!(cdn.meta_order(), vec![tid(0), tid(1), tid(2), tid(3)]);
    let log = cdn.meta_log.lock().unwrap().clone();
    assert_eq!(log[0].1, MetaType::SystemUpdate);
    assert!(log[1..].iter().all(|(_, t)| *t == MetaType::SystemTitle));
}

#[tokio::test]
async fn test_cycles_terminate() {
    let temp = tempdir().unwrap();
    let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
    let cdn = Arc::new(
        FakeCdn::default()
            .with_record(ContentMetadataRecord::new(tid(0), V).with_meta(tid(1), V))
            .with_record(
                ContentMetadataRecord::new(tid(1), V)
                    .with_meta(tid(0), V)
                    .with_content(cid(1), ContentType::Program),
            ),
    );

    let report = resolver(Arc::clone(&cdn), ResolverConfig::default())
        .resolve(tid(0), V, &work)
        .await
        .unwrap();

    assert_eq!(cdn.meta_order(), vec![tid(0), tid(1)]);
    assert_eq!(report.skipped_meta, 1);
    assert_eq!(report.content_blobs.len(), 1);
}

#[tokio::test]
async fn test_depth_limit() {
    let temp = tempdir().unwrap();
    let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
    let mut cdn = FakeCdn::default();
    for n in 0..5 {
        cdn = cdn.with_record(ContentMetadataRecord::new(tid(n), V).with_meta(tid(n + 1), V));
    }
    let config = ResolverConfig {
        max_depth: 2,
        ..ResolverConfig::default()
    };

    let err = resolver(Arc::new(cdn), config)
        .resolve(tid(0), V, &work)
        .await
        .unwrap_err();
    match err {
        Error::Resolve(ResolveError::DepthExceeded { title_id, limit }) => {
            assert_eq!(title_id, tid(3).to_string());
            assert_eq!(limit, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_content_id_header_fails() {
    let temp = tempdir().unwrap();
    let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
    let cdn = Arc::new(shared_content_cdn().without_header(tid(2)));

    let err = resolver(cdn, ResolverConfig::default())
        .resolve(tid(0), V, &work)
        .await
        .unwrap_err();
    match err {
        Error::Resolve(ResolveError::MetaFailed {
            title_id, source, ..
        }) => {
            assert_eq!(title_id, tid(2).to_string());
            assert!(matches!(
                *source,
                Error::Network(NetworkError::MissingHeader { .. })
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_child_names_title_and_skips_content() {
    let temp = tempdir().unwrap();
    let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
    let cdn = Arc::new(
        FakeCdn::default()
            .with_record(
                ContentMetadataRecord::new(tid(0), V)
                    .with_meta(tid(9), V)
                    .with_content(cid(1), ContentType::Program),
            ),
    );

    let err = resolver(Arc::clone(&cdn), ResolverConfig::default())
        .resolve(tid(0), V, &work)
        .await
        .unwrap_err();
    assert!(err.to_string().contains(&tid(9).to_string()));
    // the root blob stays staged; no content was requested
    assert_eq!(staged_names(&work).await.len(), 1);
    assert_eq!(cdn.hits(cid(1)), 0);
}

#[tokio::test]
async fn test_content_failure_names_content_id() {
    let temp = tempdir().unwrap();
    let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
    let mut cdn = shared_content_cdn();
    cdn.contents.remove(&cid(0xc));

    let err = resolver(Arc::new(cdn), ResolverConfig::default())
        .resolve(tid(0), V, &work)
        .await
        .unwrap_err();
    match err {
        Error::Resolve(ResolveError::ContentFailed {
            content_id,
            title_id,
            ..
        }) => {
            assert_eq!(content_id, cid(0xc).to_string());
            assert_eq!(title_id, tid(2).to_string());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_retries_recover_transient_failures() {
    let temp = tempdir().unwrap();
    let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
    let cdn = shared_content_cdn();
    cdn.flaky.lock().unwrap().insert(cid(0xa), 2);
    let cdn = Arc::new(cdn);

    let config = ResolverConfig {
        retry: RetryPolicy::new(2, Duration::from_millis(1)),
        ..ResolverConfig::default()
    };
    resolver(Arc::clone(&cdn), config)
        .resolve(tid(0), V, &work)
        .await
        .unwrap();
    assert_eq!(cdn.hits(cid(0xa)), 3);
}

#[tokio::test]
async fn test_no_retries_by_default() {
    let temp = tempdir().unwrap();
    let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
    let cdn = shared_content_cdn();
    cdn.flaky.lock().unwrap().insert(cid(0xa), 1);
    let cdn = Arc::new(cdn);

    let result = resolver(Arc::clone(&cdn), ResolverConfig::default())
        .resolve(tid(0), V, &work)
        .await;
    assert!(result.is_err());
    assert_eq!(cdn.hits(cid(0xa)), 1);
}

#[tokio::test]
async fn test_hash_verification() {
    let temp = tempdir().unwrap();
    let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
    let mut cdn = shared_content_cdn();
    cdn.content_hash = Some("00".repeat(32));
    let cdn = Arc::new(cdn);

    // ignored unless enabled
    resolver(Arc::clone(&cdn), ResolverConfig::default())
        .resolve(tid(0), V, &work)
        .await
        .unwrap();

    let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
    let config = ResolverConfig {
        verify_content_hash: true,
        ..ResolverConfig::default()
    };
    let err = resolver(cdn, config)
        .resolve(tid(0), V, &work)
        .await
        .unwrap_err();
    let Error::Resolve(resolve) = err else {
        panic!("unexpected error: {err:?}");
    };
    assert!(matches!(
        resolve.cause(),
        Some(Error::Network(NetworkError::ChecksumMismatch { .. }))
    ));
}

#[tokio::test]
async fn test_events_are_emitted() {
    let temp = tempdir().unwrap();
    let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
    let (tx, mut rx) = nxfw_events::channel();

    resolver(Arc::new(shared_content_cdn()), ResolverConfig::default())
        .with_event_sender(tx)
        .resolve(tid(0), V, &work)
        .await
        .unwrap();

    let mut resolved = 0;
    let mut completed = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            nxfw_events::AppEvent::Resolver(nxfw_events::ResolverEvent::MetaResolved { .. }) => {
                resolved += 1;
            }
            nxfw_events::AppEvent::Resolver(nxfw_events::ResolverEvent::Completed {
                content_blobs,
                ..
            }) => {
                completed = true;
                assert_eq!(content_blobs, 3);
            }
            _ => {}
        }
    }
    assert_eq!(resolved, 3);
    assert!(completed);
}

mod closure {
    use super::*;
    use proptest::prelude::*;

    // Each node lists child indices (always greater than its own) and content ids
    fn graph() -> impl Strategy<Value = Vec<(Vec<usize>, Vec<u8>)>> {
        (1usize..8).prop_flat_map(|n| {
            proptest::collection::vec(
                (
                    proptest::collection::vec(0usize..8, 0..3),
                    proptest::collection::vec(0u8..12, 0..4),
                ),
                n,
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn staged_set_is_reachable_closure(nodes in graph()) {
            let n = nodes.len();
            let mut cdn = FakeCdn::default();
            let mut children: Vec<Vec<usize>> = Vec::new();
            for (i, (kids, contents)) in nodes.iter().enumerate() {
                let kids: Vec<usize> = kids.iter().map(|k| k % n).filter(|k| *k > i).collect();
                let mut record = ContentMetadataRecord::new(tid(i as u64), V);
                for k in &kids {
                    record = record.with_meta(tid(*k as u64), V);
                }
                for c in contents {
                    record = record.with_content(cid(*c), ContentType::Data);
                }
                cdn = cdn.with_record(record);
                children.push(kids);
            }

            // reachable set computed independently
            let mut reachable = BTreeSet::new();
            let mut todo = vec![0usize];
            while let Some(i) = todo.pop() {
                if reachable.insert(i) {
                    todo.extend(children[i].iter().copied());
                }
            }
            let mut expected = BTreeSet::new();
            for i in &reachable {
                expected.insert(format!("{}.cnmt.nca", server_id(tid(*i as u64))));
                for c in &nodes[*i].1 {
                    expected.insert(format!("{}.nca", cid(*c)));
                }
            }

            let cdn = Arc::new(cdn);
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let staged = runtime.block_on(async {
                let temp = tempdir().unwrap();
                let work = WorkArea::begin(temp.path().join("stage")).await.unwrap();
                resolver(Arc::clone(&cdn), ResolverConfig::default())
                    .resolve(tid(0), V, &work)
                    .await
                    .unwrap();
                staged_names(&work).await
            });

            prop_assert_eq!(staged, expected);
            let hits = cdn.content_hits.lock().unwrap();
            prop_assert!(hits.values().all(|h| *h == 1));
        }
    }
}
