//! nxfw - NX system update downloader
//!
//! This is the main CLI application. It wires the configuration, the CDN
//! client and the container decoder into the ops crate and renders the
//! outcome.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, CurrentVersion, GlobalArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use nxfw_config::Config;
use nxfw_events::EventReceiver;
use nxfw_net::{CdnClient, ClientIdentity, TransportConfig};
use nxfw_ops::{DownloadRequest, OperationResult, OpsContextBuilder, OpsCtx};
use nxfw_resolver::{ContainerCodec, JsonCodec};
use nxfw_types::{ColorChoice, TitleVersion};
use std::path::Path;
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    let config = match load_config(&cli.global).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    // Initialize tracing with JSON awareness
    init_tracing(json_mode, cli.global.debug, &config.logs_path());

    // Run the application and handle errors
    if let Err(e) = run(cli, config).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Load configuration with proper precedence: file, then environment, then
/// CLI flags
async fn load_config(global: &GlobalArgs) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(global.config.as_deref()).await?;
    config.merge_env()?;
    if let Some(color) = global.color {
        config.general.color = color;
    }
    Ok(config)
}

/// Main application logic
async fn run(cli: Cli, config: Config) -> Result<(), CliError> {
    info!("Starting nxfw v{}", env!("CARGO_PKG_VERSION"));

    // Everything below up to the first request is local, so argument and
    // configuration problems surface before any network activity
    let current = match &cli.command {
        Commands::Check { current } | Commands::Download { current, .. } => {
            current_version(current).await?
        }
    };

    // Only downloads decode metadata
    let codec: Arc<dyn ContainerCodec> = match &cli.command {
        Commands::Check { .. } => Arc::new(JsonCodec),
        Commands::Download { .. } => Arc::new(nxfw_ops::CommandCodec::from_config(
            &config.codec,
            &cli.global.keys,
        )?),
    };

    let identity = ClientIdentity::from_pkcs12_file(
        &cli.global.cert,
        cli.global.cert_password.as_deref().unwrap_or_default(),
    )
    .await?;
    let transport = TransportConfig::from_config(
        &config,
        cli.global.device_id.clone(),
        cli.global.environment_id.clone(),
        current,
    )?
    .with_identity(identity);
    let client = CdnClient::new(transport)?;

    // Create event channel
    let (event_sender, event_receiver) = nxfw_events::channel();

    let color = config.general.color;
    let ops_ctx = OpsContextBuilder::new()
        .with_client(client)
        .with_codec(codec)
        .with_event_sender(event_sender)
        .with_config(config)
        .build()?;

    // Create output renderer
    let renderer = OutputRenderer::new(cli.global.json, color);

    // Create event handler
    let colors_enabled = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.debug, cli.global.json);

    // Execute command with event handling
    let result = execute_command_with_events(
        cli.command,
        current,
        ops_ctx,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    // Render final result
    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    current: TitleVersion,
    ops_ctx: OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, current, ops_ctx));

    // Handle events concurrently with command execution
    loop {
        select! {
            // Command completed
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            // Event received
            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    current: TitleVersion,
    ctx: OpsCtx,
) -> Result<OperationResult, CliError> {
    match command {
        Commands::Check { .. } => match nxfw_ops::check_update(&ctx, current).await? {
            Some(update) => Ok(OperationResult::UpdateAvailable(update)),
            None => Ok(OperationResult::UpToDate { version: current }),
        },

        Commands::Download {
            output,
            force,
            title_id,
            title_version,
            ..
        } => {
            let request = match (title_id, title_version) {
                (Some(title_id), Some(version)) => {
                    DownloadRequest::new(title_id, TitleVersion::new(version), output)
                }
                _ if force => {
                    let latest = nxfw_ops::latest_update(&ctx).await?;
                    DownloadRequest::new(latest.title_id, latest.title_version, output)
                }
                _ => match nxfw_ops::check_update(&ctx, current).await? {
                    Some(update) => DownloadRequest::new(update.title_id, update.remote, output),
                    None => return Ok(OperationResult::UpToDate { version: current }),
                },
            };

            let report = nxfw_ops::download_update(&ctx, &request).await?;
            Ok(OperationResult::Downloaded(report))
        }
    }
}

/// Resolve the current version from the flag or the version file
async fn current_version(current: &CurrentVersion) -> Result<TitleVersion, CliError> {
    match (&current.current_version, &current.version_file) {
        (Some(raw), _) => Ok(TitleVersion::new(*raw)),
        (None, Some(path)) => read_version_file(path).await,
        (None, None) => Err(CliError::InvalidArguments(
            "--current-version or --version-file is required".to_string(),
        )),
    }
}

/// Read a decimal version ordinal from a file
async fn read_version_file(path: &Path) -> Result<TitleVersion, CliError> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        CliError::InvalidArguments(format!("cannot read version file {}: {e}", path.display()))
    })?;
    let trimmed = contents.trim();
    trimmed.parse::<u32>().map(TitleVersion::new).map_err(|_| {
        CliError::InvalidArguments(format!(
            "version file {} does not hold a decimal version: {trimmed:?}",
            path.display()
        ))
    })
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool, log_dir: &Path) {
    // Check if debug logging is enabled
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = log_dir.join(format!(
            "nxfw-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| tracing_subscriber::EnvFilter::new("info,nxfw=debug"),
                        ),
                    )
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) if !json_mode => {
                eprintln!("Warning: Failed to create log file: {e}");
            }
            Err(_) => {}
        }
    }

    if json_mode {
        // JSON mode: keep stdout and stderr free of log lines
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_version_file_is_trimmed() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("version");
        std::fs::write(&path, " 738263040\n").unwrap();
        assert_eq!(
            read_version_file(&path).await.unwrap(),
            TitleVersion::new(738_263_040)
        );
    }

    #[tokio::test]
    async fn test_version_file_must_be_decimal() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("version");
        std::fs::write(&path, "5.1.0").unwrap();
        assert!(matches!(
            read_version_file(&path).await,
            Err(CliError::InvalidArguments(_))
        ));
        assert!(matches!(
            read_version_file(&temp.path().join("missing")).await,
            Err(CliError::InvalidArguments(_))
        ));
    }

    #[tokio::test]
    async fn test_current_version_flag() {
        let current = CurrentVersion {
            current_version: Some(100),
            version_file: None,
        };
        assert_eq!(
            current_version(&current).await.unwrap(),
            TitleVersion::new(100)
        );
    }
}
