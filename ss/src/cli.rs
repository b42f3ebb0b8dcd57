//! CLI command definitions and subcommands

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::CourseStatus;

/// semsync - course schedule to Notion task sync
#[derive(Parser)]
#[command(
    name = "semsync",
    about = "Expand course schedules into dated tasks and push them to Notion",
    version,
    after_help = "Descriptor format: kind-days-time-weeks-m|o[-label], e.g. le-135-10001050-all-m\n\
                  Logs are written to: ~/.local/share/semsync/logs/semsync.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Create a course record and one task per scheduled occurrence
    Course {
        /// First day of the semester (MMDDYYYY)
        #[arg(value_parser = parse_start_date)]
        start: NaiveDate,

        /// Semester length in weeks
        weeks: u32,

        /// Schedule descriptors
        #[arg(value_name = "DESCRIPTOR")]
        descriptors: Vec<String>,

        /// Course name (prompted for when missing)
        #[arg(short, long)]
        name: Option<String>,

        /// Course status: IP, D or NS (prompted for when missing)
        #[arg(short, long)]
        status: Option<CourseStatus>,

        /// Quarter, e.g. "F24" (prompted for when missing)
        #[arg(short, long)]
        quarter: Option<String>,

        /// Log what would be created instead of calling Notion
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the work items a schedule expands to, without submitting
    Preview {
        /// First day of the semester (MMDDYYYY)
        #[arg(value_parser = parse_start_date)]
        start: NaiveDate,

        /// Semester length in weeks
        weeks: u32,

        /// Schedule descriptors
        #[arg(value_name = "DESCRIPTOR")]
        descriptors: Vec<String>,

        /// Course name used as the title prefix
        #[arg(short, long)]
        name: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Parse a semester start date given as MMDDYYYY
pub fn parse_start_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if s.len() != 8 || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Invalid start date: {}. Use MMDDYYYY, e.g. 01082024", s));
    }
    NaiveDate::parse_from_str(s, "%m%d%Y").map_err(|e| format!("Invalid start date {}: {}", s, e))
}

/// Output format for preview
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
