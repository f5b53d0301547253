//! Output rendering and formatting

use crate::events::format_bytes;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use nxfw_ops::{DownloadReport, OperationResult, UpdateAvailable};
use nxfw_types::{ColorChoice, TitleVersion};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            self.render_text(result)
        }
    }

    /// Render as JSON
    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = result.to_json().map_err(io::Error::other)?;
        self.term.write_line(&json)
    }

    fn render_text(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::UpToDate { version } => self.render_up_to_date(*version),
            OperationResult::UpdateAvailable(update) => self.render_update(update),
            OperationResult::Downloaded(report) => self.render_download(report),
        }
    }

    fn render_up_to_date(&self, version: TitleVersion) -> io::Result<()> {
        self.term.write_line(&format!(
            "System is up to date ({}, ordinal {})",
            self.bold(&version.to_string()),
            version.raw()
        ))
    }

    fn render_update(&self, update: &UpdateAvailable) -> io::Result<()> {
        let label = if update.downgrade {
            "Different version available"
        } else {
            "Update available"
        };
        self.term.write_line(&format!(
            "{label}: {} -> {} (title {}, ordinal {})",
            update.current,
            self.bold(&update.remote.to_string()),
            update.title_id,
            update.remote.raw()
        ))
    }

    /// Render download summary table
    fn render_download(&self, report: &DownloadReport) -> io::Result<()> {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if !self.supports_color() {
            table.force_no_tty();
        }

        table.set_header(vec![
            Cell::new("Firmware").add_attribute(Attribute::Bold),
            Cell::new(report.version.to_string()).fg(Color::Green),
        ]);
        table.add_row(vec![
            Cell::new("Root title"),
            Cell::new(report.title_id.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Archive"),
            Cell::new(report.archive.archive_path.display().to_string()),
        ]);
        table.add_row(vec![
            Cell::new("MD5"),
            Cell::new(&report.archive.checksum),
        ]);
        table.add_row(vec![
            Cell::new("Entries"),
            Cell::new(format!(
                "{} ({} metadata, {} content)",
                report.archive.entries,
                report.resolution.meta_blobs.len(),
                report.resolution.content_blobs.len()
            )),
        ]);
        table.add_row(vec![
            Cell::new("Size"),
            Cell::new(format_bytes(report.archive.size)),
        ]);
        table.add_row(vec![
            Cell::new("Duration"),
            Cell::new(format!("{}ms", report.duration_ms)),
        ]);

        self.term.write_line(&table.to_string())
    }

    fn bold(&self, text: &str) -> String {
        if self.supports_color() {
            Style::new().bold().apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}
