//! Fixed defaults for the CDN protocol and on-disk layout

/// Client name reported in the user agent
pub const DEFAULT_CLIENT_NAME: &str = "NintendoSDK";

/// Platform reported in the user agent
pub const DEFAULT_PLATFORM: &str = "NX";

/// Directory name used under the temp, config and cache directories
pub const APP_DIR: &str = "nxfw";

pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_PARALLEL_DOWNLOADS: usize = 4;
pub const DEFAULT_MAX_DEPTH: usize = 16;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
pub const DEFAULT_DEADLINE_SECS: u64 = 3600;
