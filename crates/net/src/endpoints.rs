//! CDN hosts and request URLs

use crate::parse_url;
use nxfw_errors::Error;
use nxfw_types::{ContentId, MetaType, TitleId, TitleVersion};

/// Base URLs of the version-check and content hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdnEndpoints {
    version_base: String,
    content_base: String,
}

impl CdnEndpoints {
    /// Use explicit base URLs, e.g. a local mirror or a mock server
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::InvalidUrl` if either base is not an absolute URL.
    pub fn new(version_base: &str, content_base: &str) -> Result<Self, Error> {
        parse_url(version_base)?;
        parse_url(content_base)?;
        Ok(Self {
            version_base: version_base.trim_end_matches('/').to_string(),
            content_base: content_base.trim_end_matches('/').to_string(),
        })
    }

    /// Production hosts for an environment id
    #[must_use]
    pub fn for_environment(environment_id: &str) -> Self {
        Self {
            version_base: format!("https://sun.hac.{environment_id}.d4c.nintendo.net"),
            content_base: format!("https://atumn.hac.{environment_id}.d4c.nintendo.net"),
        }
    }

    #[must_use]
    pub fn version_base(&self) -> &str {
        &self.version_base
    }

    #[must_use]
    pub fn content_base(&self) -> &str {
        &self.content_base
    }

    pub(crate) fn version_check_url(&self) -> String {
        format!("{}/v1/system_update_meta", self.version_base)
    }

    pub(crate) fn meta_url(
        &self,
        title_id: TitleId,
        version: TitleVersion,
        meta_type: MetaType,
    ) -> String {
        format!(
            "{}/t/{}/{title_id}/{}",
            self.content_base,
            meta_type.as_char(),
            version.raw()
        )
    }

    pub(crate) fn content_url(&self, content_id: &ContentId) -> String {
        format!("{}/c/c/{content_id}", self.content_base)
    }
}

/// User agent the CDN expects, derived from the console's own version
#[must_use]
pub fn user_agent(
    client_name: &str,
    platform: &str,
    local_version: TitleVersion,
    device_id: &str,
    environment_id: &str,
) -> String {
    format!(
        "{client_name} Firmware/{}.{}.{}-1.0 (platform:{platform}; did:{device_id}; eid:{environment_id})",
        local_version.major(),
        local_version.minor(),
        local_version.patch()
    )
}
