//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum NetworkError {
    #[error("connection timeout to {endpoint}")]
    Timeout { endpoint: String },

    #[error("download from {endpoint} failed: {message}")]
    DownloadFailed { endpoint: String, message: String },

    #[error("connection refused by {endpoint}: {message}")]
    ConnectionRefused { endpoint: String, message: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error {status} from {endpoint}")]
    HttpError { endpoint: String, status: u16 },

    #[error("response from {endpoint} is missing header {header}")]
    MissingHeader { endpoint: String, header: String },

    #[error("invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },

    #[error("checksum mismatch for {content_id}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        content_id: String,
        expected: String,
        actual: String,
    },

    #[error("SSL/TLS error: {0}")]
    TlsError(String),

    #[error("HTTP client setup failed: {0}")]
    ClientBuild(String),

    #[error("download did not finish within {seconds} seconds")]
    DeadlineExceeded { seconds: u64 },
}

impl NetworkError {
    /// Endpoint the failing request was sent to, when known
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Timeout { endpoint }
            | Self::DownloadFailed { endpoint, .. }
            | Self::ConnectionRefused { endpoint, .. }
            | Self::HttpError { endpoint, .. }
            | Self::MissingHeader { endpoint, .. }
            | Self::InvalidResponse { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } | Self::ConnectionRefused { .. } => {
                Some("Check your network connection and the CDN environment id.")
            }
            Self::HttpError { status: 401 | 403, .. } | Self::TlsError(_) => {
                Some("The CDN rejected the client certificate; verify it belongs to this device.")
            }
            Self::HttpError { status: 404, .. } => {
                Some("The requested title or content is not published in this environment.")
            }
            Self::ChecksumMismatch { .. } => {
                Some("Retry the download; disable hash verification if the CDN omits hashes.")
            }
            Self::DeadlineExceeded { .. } => {
                Some("Raise network.deadline_secs in the configuration file.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. }
            | Self::DownloadFailed { .. }
            | Self::ConnectionRefused { .. }
            | Self::ChecksumMismatch { .. } => true,
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Timeout { .. } => "network.timeout",
            Self::DownloadFailed { .. } => "network.download_failed",
            Self::ConnectionRefused { .. } => "network.connection_refused",
            Self::InvalidUrl(_) => "network.invalid_url",
            Self::HttpError { .. } => "network.http_error",
            Self::MissingHeader { .. } => "network.missing_header",
            Self::InvalidResponse { .. } => "network.invalid_response",
            Self::ChecksumMismatch { .. } => "network.checksum_mismatch",
            Self::TlsError(_) => "network.tls_error",
            Self::ClientBuild(_) => "network.client_build",
            Self::DeadlineExceeded { .. } => "network.deadline_exceeded",
        };
        Some(code)
    }
}
