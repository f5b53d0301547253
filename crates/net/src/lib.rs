#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! CDN transport for nxfw
//!
//! This crate performs the three CDN requests the downloader needs: the
//! version check, metadata blob downloads and content blob downloads. It
//! authenticates with a client certificate and never retries on its own;
//! callers wrap requests with [`RetryPolicy`] when they want retries.

mod client;
mod config;
mod endpoints;
mod retry;

pub use client::{CdnClient, CdnDownload, CONTENT_HASH_HEADER, CONTENT_ID_HEADER};
pub use config::{ClientIdentity, TransportConfig};
pub use endpoints::{user_agent, CdnEndpoints};
pub use retry::RetryPolicy;

use nxfw_errors::{Error, NetworkError};
use url::Url;

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or invalid according to RFC 3986.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://sun.hac.lp1.d4c.nintendo.net").is_ok());
        assert!(parse_url("not a url").is_err());
    }
}
