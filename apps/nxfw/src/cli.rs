//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use nxfw_types::{ColorChoice, TitleId};
use std::path::PathBuf;

/// nxfw - NX system update downloader
#[derive(Parser)]
#[command(name = "nxfw")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Download NX system updates from the CDN into firmware archives")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Args)]
pub struct GlobalArgs {
    /// Key file handed to the container decoder
    #[arg(long, value_name = "PATH")]
    pub keys: PathBuf,

    /// PKCS#12 client certificate used for mutual TLS
    #[arg(long, value_name = "PATH")]
    pub cert: PathBuf,

    /// Password of the client certificate
    #[arg(long, value_name = "PW")]
    pub cert_password: Option<String>,

    /// Device id sent with every request
    #[arg(long, value_name = "DID")]
    pub device_id: String,

    /// CDN environment id, e.g. lp1
    #[arg(long, value_name = "EID")]
    pub environment_id: String,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the logs directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Version the console currently runs
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct CurrentVersion {
    /// Current system version ordinal
    #[arg(long, value_name = "N")]
    pub current_version: Option<u32>,

    /// File holding the current system version ordinal
    #[arg(long, value_name = "PATH")]
    pub version_file: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Check whether the CDN offers a different system version
    Check {
        #[command(flatten)]
        current: CurrentVersion,
    },

    /// Download a system update into a firmware archive
    #[command(alias = "dl")]
    Download {
        #[command(flatten)]
        current: CurrentVersion,

        /// Directory receiving the archive and its checksum
        #[arg(long, short, value_name = "DIR")]
        output: PathBuf,

        /// Download the latest update even if it matches the current version
        #[arg(long, conflicts_with = "title_id")]
        force: bool,

        /// Explicit root title to download instead of the latest update
        #[arg(long, value_name = "HEX", value_parser = parse_title_id, requires = "title_version")]
        title_id: Option<TitleId>,

        /// Version of the explicit root title
        #[arg(long, value_name = "N", requires = "title_id")]
        title_version: Option<u32>,
    },
}

fn parse_title_id(input: &str) -> Result<TitleId, String> {
    TitleId::parse(input).map_err(|e| e.to_string())
}
