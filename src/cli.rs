//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// ideawatch - live summaries for innovation-idea answer feeds
///
/// Fetch the answers submitted for a question, aggregate them by
/// category, department, and keyword, and write a Markdown or JSON
/// summary. Watch mode keeps the summary fresh on a fixed interval.
///
/// Examples:
///   ideawatch --question 6f1c2a
///   ideawatch --question 6f1c2a --watch --interval 10
///   ideawatch --question 6f1c2a --format json --output summary.json
///   ideawatch --question 6f1c2a --export-csv answers.csv
///   ideawatch --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Question id whose answers to summarize
    ///
    /// Not required when using --init-config or --ping.
    #[arg(
        short,
        long,
        value_name = "ID",
        required_unless_present_any = ["init_config", "ping"]
    )]
    pub question: Option<String>,

    /// Base URL of the answers API
    ///
    /// Defaults to http://localhost:8000, or whatever .ideawatch.toml says.
    #[arg(short, long, value_name = "URL", env = "IDEAWATCH_API_URL")]
    pub api_url: Option<String>,

    /// Output file path for the summary
    ///
    /// Defaults to idea_summary.md, or whatever .ideawatch.toml says.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Keep the summary fresh by polling the API
    ///
    /// Rewrites the output file on every successful refresh until
    /// interrupted with Ctrl-C.
    #[arg(short, long)]
    pub watch: bool,

    /// Seconds between refreshes in watch mode
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Only include answers with this category label
    ///
    /// Use the label "ไม่ระบุ" to select answers without a category.
    #[arg(long, value_name = "LABEL")]
    pub category: Option<String>,

    /// Only include answers from this department
    #[arg(long, value_name = "LABEL")]
    pub department: Option<String>,

    /// Number of keywords in the frequency table (0 disables it)
    #[arg(long, value_name = "COUNT")]
    pub top_keywords: Option<usize>,

    /// Also export the fetched batch as CSV to this file
    #[arg(long, value_name = "FILE")]
    pub export_csv: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ideawatch.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(long)]
    pub quiet: bool,

    /// Check API connectivity and exit
    #[arg(long)]
    pub ping: bool,

    /// Generate a default .ideawatch.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the question id, empty if not set (should be validated first).
    pub fn question_id(&self) -> &str {
        self.question.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate API URL format if provided
        if let Some(ref api_url) = self.api_url {
            if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref question) = self.question {
            if question.trim().is_empty() {
                return Err("Question id must not be empty".to_string());
            }
        }

        // Validate interval if provided
        if let Some(interval) = self.interval {
            if interval == 0 {
                return Err("Interval must be at least 1 second".to_string());
            }
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
