//! Transport configuration and client identity

use crate::endpoints::CdnEndpoints;
use nxfw_config::{constants, Config};
use nxfw_errors::{AuthError, Error};
use nxfw_types::TitleVersion;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client certificate presented to the CDN
#[derive(Clone)]
pub struct ClientIdentity {
    path: PathBuf,
    identity: reqwest::Identity,
}

impl ClientIdentity {
    /// Load a PKCS#12 bundle
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CertificateUnreadable` if the file cannot be read
    /// and `AuthError::InvalidCertificate` if it is not a usable PKCS#12
    /// bundle for the given password.
    pub async fn from_pkcs12_file(path: &Path, password: &str) -> Result<Self, Error> {
        let der = tokio::fs::read(path)
            .await
            .map_err(|e| AuthError::CertificateUnreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::from_pkcs12_der(path, &der, password)
    }

    /// Parse an in-memory PKCS#12 bundle; `path` is only used in errors
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCertificate` if parsing fails.
    pub fn from_pkcs12_der(path: &Path, der: &[u8], password: &str) -> Result<Self, Error> {
        let identity = reqwest::Identity::from_pkcs12_der(der, password).map_err(|e| {
            AuthError::InvalidCertificate {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            identity,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn reqwest_identity(&self) -> reqwest::Identity {
        self.identity.clone()
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Everything needed to build a [`crate::CdnClient`]
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub device_id: String,
    pub environment_id: String,
    pub client_name: String,
    pub platform: String,
    /// Version the console currently runs; only used for the user agent
    pub local_version: TitleVersion,
    pub identity: Option<ClientIdentity>,
    /// Disable server certificate validation for this client only
    pub accept_invalid_server_certs: bool,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub endpoints: CdnEndpoints,
}

impl TransportConfig {
    /// Production defaults for a device
    #[must_use]
    pub fn new(
        device_id: impl Into<String>,
        environment_id: impl Into<String>,
        local_version: TitleVersion,
    ) -> Self {
        let environment_id = environment_id.into();
        Self {
            device_id: device_id.into(),
            endpoints: CdnEndpoints::for_environment(&environment_id),
            environment_id,
            client_name: constants::DEFAULT_CLIENT_NAME.to_string(),
            platform: constants::DEFAULT_PLATFORM.to_string(),
            local_version,
            identity: None,
            accept_invalid_server_certs: false,
            timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(constants::DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Apply the `[cdn]` and `[network]` sections of the configuration
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::InvalidUrl` if a configured host override is
    /// not a valid URL.
    pub fn from_config(
        config: &Config,
        device_id: impl Into<String>,
        environment_id: impl Into<String>,
        local_version: TitleVersion,
    ) -> Result<Self, Error> {
        let mut transport = Self::new(device_id, environment_id, local_version);
        transport.client_name.clone_from(&config.cdn.client_name);
        transport.platform.clone_from(&config.cdn.platform);
        transport.accept_invalid_server_certs = config.cdn.accept_invalid_certs;
        transport.timeout = config.request_timeout();
        transport.connect_timeout = config.connect_timeout();

        if config.cdn.version_host.is_some() || config.cdn.content_host.is_some() {
            let version_base = config
                .cdn
                .version_host
                .clone()
                .unwrap_or_else(|| transport.endpoints.version_base().to_string());
            let content_base = config
                .cdn
                .content_host
                .clone()
                .unwrap_or_else(|| transport.endpoints.content_base().to_string());
            transport.endpoints = CdnEndpoints::new(&version_base, &content_base)?;
        }

        Ok(transport)
    }

    #[must_use]
    pub fn with_identity(mut self, identity: ClientIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: CdnEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_overrides_hosts() {
        let mut config = Config::default();
        config.cdn.content_host = Some("http://127.0.0.1:9000".to_string());
        config.cdn.accept_invalid_certs = false;

        let transport =
            TransportConfig::from_config(&config, "did", "lp1", TitleVersion::new(0)).unwrap();
        assert_eq!(
            transport.endpoints.version_base(),
            "https://sun.hac.lp1.d4c.nintendo.net"
        );
        assert_eq!(transport.endpoints.content_base(), "http://127.0.0.1:9000");
        assert!(!transport.accept_invalid_server_certs);
    }

    #[test]
    fn test_invalid_pkcs12_is_auth_error() {
        let err = ClientIdentity::from_pkcs12_der(Path::new("cert.pfx"), b"not a pfx", "")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Auth(AuthError::InvalidCertificate { .. })
        ));
    }
}
