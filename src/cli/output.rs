//! Colored terminal output for release results
//!
//! Diagnostics go through `log`; this is only the user-facing summary.

use crate::release::ReleaseOutcome;
use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    stdout: BufferWriter,
}

impl Default for OutputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputManager {
    /// Create a new output manager writing to stdout
    pub fn new() -> Self {
        Self {
            stdout: BufferWriter::stdout(ColorChoice::Auto),
        }
    }

    /// Print `message` behind a colored marker
    fn marked(
        &self,
        writer: &BufferWriter,
        marker: &str,
        color: Color,
        message: &str,
    ) -> std::io::Result<()> {
        let mut buffer = writer.buffer();
        buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(&mut buffer, "{}", marker)?;
        buffer.reset()?;
        writeln!(&mut buffer, " {}", message)?;
        writer.print(&buffer)
    }

    /// Print a success line
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.marked(&self.stdout, "✓", Color::Green, message)
    }

    /// Print a warning line
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.marked(&self.stdout, "⚠", Color::Yellow, message)
    }

    /// Print an error line to stderr, falling back to stdout
    pub fn error(&self, message: &str) {
        let stderr = BufferWriter::stderr(ColorChoice::Auto);
        if self.marked(&stderr, "✗", Color::Red, message).is_err() {
            println!("✗ {}", message);
        }
    }

    /// Print an indented sub-item
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.println(&format!("    {}", message))
    }

    /// Print a plain line
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        let mut buffer = self.stdout.buffer();
        writeln!(&mut buffer, "{}", message)?;
        self.stdout.print(&buffer)
    }

    /// Summarize a finished release
    pub fn release_summary(&self, outcome: &ReleaseOutcome) -> std::io::Result<()> {
        let release_line = if outcome.release.html_url.is_empty() {
            format!("Release {:?} ({}) created", outcome.name, outcome.tag)
        } else {
            format!(
                "Release {:?} ({}) created: {}",
                outcome.name, outcome.tag, outcome.release.html_url
            )
        };
        self.success(&release_line)?;

        let report = &outcome.uploads;
        if report.total() == 0 {
            return Ok(());
        }

        if report.is_complete() {
            self.success(&format!("Uploaded {} asset(s)", report.uploaded.len()))?;
        } else {
            self.warn(&format!(
                "Uploaded {} of {} asset(s)",
                report.uploaded.len(),
                report.total()
            ))?;
        }

        for asset in &report.uploaded {
            self.indent(&format!("✓ {} ({} bytes)", asset.name, asset.size))?;
        }
        for failure in &report.failed {
            self.indent(&format!("✗ {}", failure))?;
        }

        Ok(())
    }
}
