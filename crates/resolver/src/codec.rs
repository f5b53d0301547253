//! Container decoding seam

use async_trait::async_trait;
use nxfw_errors::DecodeError;
use nxfw_types::ContentMetadataRecord;

/// Turns a raw metadata blob into its content metadata record
#[async_trait]
pub trait ContainerCodec: Send + Sync {
    /// Decode one blob
    ///
    /// # Errors
    ///
    /// Returns a `DecodeError` if the blob cannot be decrypted or parsed.
    async fn decode(&self, blob: &[u8]) -> Result<ContentMetadataRecord, DecodeError>;
}

/// Codec for blobs that already hold the record as JSON
///
/// Used by mirrors that serve pre-decoded metadata and by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[async_trait]
impl ContainerCodec for JsonCodec {
    async fn decode(&self, blob: &[u8]) -> Result<ContentMetadataRecord, DecodeError> {
        serde_json::from_slice(blob).map_err(|e| DecodeError::Malformed {
            message: e.to_string(),
        })
    }
}
