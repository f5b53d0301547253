//! Blob source seam

use async_trait::async_trait;
use nxfw_errors::Error;
use nxfw_net::{CdnClient, CdnDownload};
use nxfw_types::{ContentId, ContentType, MetaType, TitleId, TitleVersion};

/// Where the resolver gets metadata and content blobs from
#[async_trait]
pub trait CdnSource: Send + Sync {
    /// Fetch the metadata blob of a title version
    async fn fetch_meta(
        &self,
        title_id: TitleId,
        version: TitleVersion,
        meta_type: MetaType,
    ) -> Result<CdnDownload, Error>;

    /// Fetch a content blob
    async fn fetch_content(
        &self,
        content_id: &ContentId,
        content_type: ContentType,
    ) -> Result<CdnDownload, Error>;
}

#[async_trait]
impl CdnSource for CdnClient {
    async fn fetch_meta(
        &self,
        title_id: TitleId,
        version: TitleVersion,
        meta_type: MetaType,
    ) -> Result<CdnDownload, Error> {
        self.download_meta(title_id, version, meta_type).await
    }

    async fn fetch_content(
        &self,
        content_id: &ContentId,
        content_type: ContentType,
    ) -> Result<CdnDownload, Error> {
        self.download_content(content_id, content_type).await
    }
}
