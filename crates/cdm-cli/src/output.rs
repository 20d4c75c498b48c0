//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing API responses
//! in various formats (JSON, YAML, human-readable) plus progress indicators
//! for job polling.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use cdm_core::JobProgress;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tracing::{trace, Level};

/// Trait for formatting output
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // Bare strings print without quotes for humans
            OutputFormat::Human => match serde_json::to_value(value)? {
                serde_json::Value::String(s) => Ok(s),
                other => Ok(serde_json::to_string_pretty(&other)?),
            },
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            writer,
        }
    }

    /// Disable progress indicators regardless of the terminal
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        if tracing::enabled!(Level::TRACE) {
            let mut value_json = serde_json::to_value(value)?;
            redaction::redact_json_value(&mut value_json);
            trace!("Outputting data: {}", value_json);
        }

        let formatted = self.format.format(value)?;
        self.writeln(formatted.trim_end())
    }

    /// Progress bar tracking a polled job's completion percentage
    pub fn job_progress_bar(&self, url: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(100);
        pb.set_style(job_progress_style());
        pb.set_message(format!("Waiting for {}", url));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }
}

/// Apply one job observation to a progress bar
pub fn update_job_progress(pb: &ProgressBar, progress: &JobProgress) {
    if let Some(percent) = progress.progress {
        pb.set_position(percent.clamp(0.0, 100.0) as u64);
    }
    pb.set_message(describe_job_progress(progress));
}

/// One-line description of a job observation
pub fn describe_job_progress(progress: &JobProgress) -> String {
    let percent = progress
        .progress
        .map(|p| format!("{:.0}%", p))
        .unwrap_or_else(|| "?".to_string());
    format!("{} {} (check #{})", progress.state, percent, progress.attempt)
}

/// Helper function to create the job progress bar style
pub fn job_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}
