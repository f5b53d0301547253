//! HTTP client for the CDN

use crate::config::TransportConfig;
use crate::endpoints::{user_agent, CdnEndpoints};
use bytes::Bytes;
use nxfw_errors::{Error, NetworkError};
use nxfw_types::{ContentId, ContentType, MetaType, RemoteVersionInfo, TitleId, TitleVersion};
use reqwest::{Client, Response};

/// Header carrying the server-side id of the returned blob
pub const CONTENT_ID_HEADER: &str = "X-Nintendo-Content-ID";

/// Header carrying the hex hash of the returned blob
pub const CONTENT_HASH_HEADER: &str = "X-Nintendo-Content-Hash";

/// A downloaded blob with the headers the CDN attached to it
#[derive(Debug, Clone)]
pub struct CdnDownload {
    /// URL the blob came from, without query parameters
    pub endpoint: String,
    pub content_id: Option<String>,
    pub content_hash: Option<String>,
    pub data: Bytes,
}

/// Mutually authenticated client for the version-check and content hosts
#[derive(Clone)]
pub struct CdnClient {
    client: Client,
    endpoints: CdnEndpoints,
    device_id: String,
    user_agent: String,
}

impl CdnClient {
    /// Create a new CDN client
    ///
    /// Certificate relaxation applies to this client only.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::ClientBuild` if the underlying reqwest client
    /// rejects the configuration, e.g. an identity the TLS backend cannot use.
    pub fn new(config: TransportConfig) -> Result<Self, Error> {
        let user_agent = user_agent(
            &config.client_name,
            &config.platform,
            config.local_version,
            &config.device_id,
            &config.environment_id,
        );

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&user_agent)
            .danger_accept_invalid_certs(config.accept_invalid_server_certs);

        if let Some(identity) = &config.identity {
            builder = builder.identity(identity.reqwest_identity());
        }

        let client = builder
            .build()
            .map_err(|e| NetworkError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            endpoints: config.endpoints,
            device_id: config.device_id,
            user_agent,
        })
    }

    #[must_use]
    pub fn endpoints(&self) -> &CdnEndpoints {
        &self.endpoints
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Ask the version-check host for the latest root title
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` if the request fails, the status is not 2xx,
    /// or the body is not the expected JSON document.
    pub async fn get_latest_version(&self) -> Result<RemoteVersionInfo, Error> {
        let endpoint = self.endpoints.version_check_url();
        let response = self.get(&endpoint, true).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&endpoint, &e))?;

        serde_json::from_slice(&body).map_err(|e| {
            NetworkError::InvalidResponse {
                endpoint,
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Download the metadata blob of a title version
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` if the request fails or the status is not 2xx.
    pub async fn download_meta(
        &self,
        title_id: TitleId,
        version: TitleVersion,
        meta_type: MetaType,
    ) -> Result<CdnDownload, Error> {
        let endpoint = self.endpoints.meta_url(title_id, version, meta_type);
        self.download(endpoint, true).await
    }

    /// Download a content blob
    ///
    /// The CDN serves every content type from the same path class.
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` if the request fails or the status is not 2xx.
    pub async fn download_content(
        &self,
        content_id: &ContentId,
        content_type: ContentType,
    ) -> Result<CdnDownload, Error> {
        let endpoint = self.endpoints.content_url(content_id);
        tracing::trace!(%content_id, %content_type, "content request");
        self.download(endpoint, false).await
    }

    async fn download(&self, endpoint: String, with_device: bool) -> Result<CdnDownload, Error> {
        let response = self.get(&endpoint, with_device).await?;

        let content_id = header_value(&response, CONTENT_ID_HEADER);
        let content_hash = header_value(&response, CONTENT_HASH_HEADER);
        let data = response
            .bytes()
            .await
            .map_err(|e| transport_error(&endpoint, &e))?;

        tracing::debug!(%endpoint, size = data.len(), "download finished");
        Ok(CdnDownload {
            endpoint,
            content_id,
            content_hash,
            data,
        })
    }

    async fn get(&self, endpoint: &str, with_device: bool) -> Result<Response, Error> {
        tracing::debug!(%endpoint, "GET");
        let mut request = self.client.get(endpoint);
        if with_device {
            request = request.query(&[("device_id", self.device_id.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(endpoint, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        Ok(response)
    }
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Classify a reqwest failure
fn transport_error(endpoint: &str, error: &reqwest::Error) -> NetworkError {
    if error.is_timeout() {
        return NetworkError::Timeout {
            endpoint: endpoint.to_string(),
        };
    }

    let message = error_chain(error);
    if error.is_connect() {
        let lowered = message.to_ascii_lowercase();
        if ["certificate", "tls", "ssl", "handshake"]
            .iter()
            .any(|needle| lowered.contains(needle))
        {
            return NetworkError::TlsError(format!("{endpoint}: {message}"));
        }
        return NetworkError::ConnectionRefused {
            endpoint: endpoint.to_string(),
            message,
        };
    }

    NetworkError::DownloadFailed {
        endpoint: endpoint.to_string(),
        message,
    }
}

// reqwest's Display stops at the outermost layer
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
