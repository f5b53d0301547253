//! Event handling and status display

use console::{Style, Term};
use nxfw_events::{
    AppEvent, ArchiveEvent, DownloadEvent, EventLevel, GeneralEvent, ResolverEvent, UpdateEvent,
};

/// Renders progress lines on stderr and forwards every event to tracing
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    debug_enabled: bool,
    /// Suppress terminal output; events still reach tracing
    quiet: bool,
    completed_downloads: usize,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            debug_enabled,
            quiet,
            completed_downloads: 0,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        crate::logging::log_event_with_tracing(&event);

        if self.quiet || (event.level() == EventLevel::Debug && !self.debug_enabled) {
            if matches!(event, AppEvent::Download(DownloadEvent::Completed { .. })) {
                self.completed_downloads += 1;
            }
            return;
        }

        match event {
            AppEvent::General(general) => self.handle_general(general),
            AppEvent::Update(update) => self.handle_update(update),
            AppEvent::Resolver(resolver) => self.handle_resolver(resolver),
            AppEvent::Download(download) => self.handle_download(download),
            AppEvent::Archive(archive) => self.handle_archive(archive),
        }
    }

    fn handle_general(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => match context {
                Some(context) => self.show_warning(&format!("{message} ({context})")),
                None => self.show_warning(&message),
            },
            GeneralEvent::Error { message, details } => match details {
                Some(details) => self.show_error(&format!("{message}: {details}")),
                None => self.show_error(&message),
            },
            GeneralEvent::DebugLog { message, .. } => self.show_status(&message),
            GeneralEvent::OperationStarted { .. } | GeneralEvent::OperationCompleted { .. } => {}
            GeneralEvent::OperationFailed { operation, failure } => {
                self.show_error(&format!("{operation} failed: {}", failure.message));
            }
        }
    }

    fn handle_update(&self, event: UpdateEvent) {
        match event {
            UpdateEvent::CheckStarted { current } => {
                self.show_status(&format!("Checking for updates (current {current})"));
            }
            UpdateEvent::UpToDate { .. } => {}
            UpdateEvent::Available {
                remote, downgrade, ..
            } => {
                if downgrade {
                    self.show_warning(&format!(
                        "CDN offers {remote}, which is older than the current version"
                    ));
                }
            }
        }
    }

    fn handle_resolver(&mut self, event: ResolverEvent) {
        match event {
            ResolverEvent::Started { title_id, version } => {
                self.completed_downloads = 0;
                self.show_status(&format!("Resolving {title_id} ({version})"));
            }
            ResolverEvent::MetaResolved {
                title_id,
                depth,
                content_entries,
                ..
            } => {
                let indent = "  ".repeat(depth);
                self.show_status(&format!(
                    "{indent}{} {title_id} ({content_entries} contents)",
                    self.style(Style::new().dim(), "meta")
                ));
            }
            ResolverEvent::MetaSkipped { title_id, .. } => {
                self.show_status(&format!("{title_id} already resolved"));
            }
            ResolverEvent::ContentDeduplicated { content_id, .. } => {
                self.show_status(&format!("{content_id} already scheduled"));
            }
            ResolverEvent::ContentScheduled { total, concurrency } => {
                self.show_status(&format!(
                    "Downloading {total} contents ({concurrency} at a time)"
                ));
            }
            ResolverEvent::Completed {
                meta_blobs,
                content_blobs,
                total_bytes,
                ..
            } => {
                self.show_success(&format!(
                    "Staged {meta_blobs} metadata and {content_blobs} content blobs ({})",
                    format_bytes(total_bytes)
                ));
            }
            ResolverEvent::Failed { failure } => {
                self.show_error(&failure.message);
                if let Some(hint) = failure.hint {
                    self.show_status(&format!("  Hint: {hint}"));
                }
            }
        }
    }

    fn handle_download(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::Started { item } => self.show_status(&format!("Fetching {item}")),
            DownloadEvent::Completed { item, size, .. } => {
                self.completed_downloads += 1;
                self.show_status(&format!(
                    "[{}] {item} ({})",
                    self.completed_downloads,
                    format_bytes(size)
                ));
            }
            DownloadEvent::Retrying {
                item,
                attempt,
                max_attempts,
                reason,
                ..
            } => {
                self.show_warning(&format!(
                    "Retrying {item} (attempt {}/{max_attempts}): {reason}",
                    attempt + 1
                ));
            }
            DownloadEvent::Failed { item, failure } => {
                self.show_error(&format!("{item}: {}", failure.message));
            }
        }
    }

    fn handle_archive(&self, event: ArchiveEvent) {
        match event {
            ArchiveEvent::Started { path, entries } => {
                self.show_status(&format!("Writing {} ({entries} entries)", path.display()));
            }
            ArchiveEvent::Completed { path, size } => {
                self.show_success(&format!("Wrote {} ({})", path.display(), format_bytes(size)));
            }
            ArchiveEvent::ChecksumWritten { checksum, .. } => {
                self.show_status(&format!("MD5 {checksum}"));
            }
            ArchiveEvent::StagingDiscarded { .. } => {}
            ArchiveEvent::Failed { failure } => self.show_error(&failure.message),
        }
    }

    fn style(&self, style: Style, text: &str) -> String {
        if self.colors_enabled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn show_status(&self, message: &str) {
        self.term.write_line(message).unwrap_or(());
    }

    fn show_success(&self, message: &str) {
        let line = format!("{} {message}", self.style(Style::new().green().bold(), "ok"));
        self.term.write_line(&line).unwrap_or(());
    }

    fn show_warning(&self, message: &str) {
        let line = format!("{} {message}", self.style(Style::new().yellow().bold(), "warning:"));
        self.term.write_line(&line).unwrap_or(());
    }

    fn show_error(&self, message: &str) {
        let line = format!("{} {message}", self.style(Style::new().red().bold(), "error:"));
        self.term.write_line(&line).unwrap_or(());
    }
}

/// Human-readable byte count
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024 * 10 && unit < UNITS.len() - 1 {
        value /= 1024;
        unit += 1;
    }
    format!("{value} {}", UNITS[unit])
}
