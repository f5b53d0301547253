//! Configuration sections

use crate::constants;
use nxfw_types::ColorChoice;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
    #[serde(default = "default_parallel_downloads")]
    pub parallel_downloads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            color: ColorChoice::Auto,
            parallel_downloads: constants::DEFAULT_PARALLEL_DOWNLOADS,
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Per-request timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Extra attempts for retryable failures; 0 disables retrying
    #[serde(default)]
    pub retries: u32,
    /// Base delay for exponential backoff
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Upper bound for a whole download run
    #[serde(default = "default_deadline")]
    pub deadline_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: constants::DEFAULT_CONNECT_TIMEOUT_SECS,
            retries: 0,
            retry_delay_ms: constants::DEFAULT_RETRY_DELAY_MS,
            deadline_secs: constants::DEFAULT_DEADLINE_SECS,
        }
    }
}

/// CDN identity and host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnConfig {
    #[serde(default = "default_client_name")]
    pub client_name: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    /// Overrides the version-check base URL derived from the environment id
    #[serde(default)]
    pub version_host: Option<String>,
    /// Overrides the content base URL derived from the environment id
    #[serde(default)]
    pub content_host: Option<String>,
    /// The CDN chains to a private CA that is not in the system trust store
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub verify_content_hash: bool,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            platform: default_platform(),
            version_host: None,
            content_host: None,
            accept_invalid_certs: default_accept_invalid_certs(),
            verify_content_hash: false,
        }
    }
}

/// Metadata graph traversal limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub staging_dir: Option<PathBuf>,
    pub logs_dir: Option<PathBuf>,
}

/// External container decoder
///
/// `args` may contain `{input}` (path of the blob) and `{keys}` (path of the
/// key file). The command must print the decoded record as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    pub command: Option<String>,
    #[serde(default = "default_codec_args")]
    pub args: Vec<String>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: default_codec_args(),
        }
    }
}

// Default value functions for serde
fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_parallel_downloads() -> usize {
    constants::DEFAULT_PARALLEL_DOWNLOADS
}

fn default_timeout() -> u64 {
    constants::DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    constants::DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_retry_delay() -> u64 {
    constants::DEFAULT_RETRY_DELAY_MS
}

fn default_deadline() -> u64 {
    constants::DEFAULT_DEADLINE_SECS
}

fn default_client_name() -> String {
    constants::DEFAULT_CLIENT_NAME.to_string()
}

fn default_platform() -> String {
    constants::DEFAULT_PLATFORM.to_string()
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_max_depth() -> usize {
    constants::DEFAULT_MAX_DEPTH
}

fn default_codec_args() -> Vec<String> {
    vec!["--keys".to_string(), "{keys}".to_string(), "{input}".to_string()]
}
