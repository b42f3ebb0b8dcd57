//! semsync - course schedule to Notion task sync
//!
//! CLI entry point for previewing and creating course schedules.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{info, warn};

use semsync::cli::{Cli, Command, OutputFormat};
use semsync::config::Config;
use semsync::dispatch::{DispatchQueue, DispatchReport, Dispatcher};
use semsync::domain::{Course, CourseStatus, ExternalId, WorkItem};
use semsync::prompt::{CourseAnswers, prompt_course};
use semsync::schedule::{Descriptor, Semester, expand_all, parse_descriptor};
use semsync::submit::{DryRunSubmitter, NotionClient, Submitter};

/// Log file location: `<data dir>/semsync/logs/semsync.log`
fn log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("semsync")
        .join("logs")
        .join("semsync.log")
}

fn setup_logging(verbose: bool) -> Result<()> {
    let path = log_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("Failed to create log directory")?;
    }

    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(&path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!(path = %path.display(), verbose, "Logging initialized");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        "semsync loaded config: tokens_per_interval={}, interval_ms={}",
        config.dispatch.tokens_per_interval, config.dispatch.interval_ms
    );

    match cli.command {
        Command::Course {
            start,
            weeks,
            descriptors,
            name,
            status,
            quarter,
            dry_run,
        } => {
            let answers = CourseAnswers { name, status, quarter };
            cmd_course(&config, Semester::new(start, weeks), &descriptors, answers, dry_run).await
        }
        Command::Preview {
            start,
            weeks,
            descriptors,
            name,
            format,
        } => cmd_preview(Semester::new(start, weeks), &descriptors, name.as_deref(), format),
    }
}

/// Parse shorthand tokens, reporting and skipping the malformed ones
fn parse_tokens(tokens: &[String]) -> (Vec<Descriptor>, usize) {
    let mut descriptors = Vec::with_capacity(tokens.len());
    let mut failed = 0;
    for token in tokens {
        match parse_descriptor(token) {
            Ok(descriptor) => descriptors.push(descriptor),
            Err(e) => {
                warn!(%token, error = %e, "Skipping descriptor");
                eprintln!("{} {}", "✗".red(), e);
                failed += 1;
            }
        }
    }
    (descriptors, failed)
}

/// Expand descriptors for one course, reporting and skipping the malformed ones
fn expand_for_course(
    descriptors: Vec<Descriptor>,
    prefix: Option<&str>,
    parent: &ExternalId,
    semester: &Semester,
) -> (Vec<WorkItem>, usize) {
    let descriptors: Vec<Descriptor> = descriptors
        .into_iter()
        .map(|d| {
            let d = match prefix {
                Some(prefix) => d.with_title_prefix(prefix),
                None => d,
            };
            d.with_parent(parent.clone())
        })
        .collect();

    let expansion = expand_all(&descriptors, semester);
    for (index, e) in &expansion.failures {
        warn!(index, error = %e, "Skipping descriptor");
        eprintln!("{} descriptor {}: {}", "✗".red(), index + 1, e);
    }
    (expansion.items, expansion.failures.len())
}

async fn cmd_course(
    config: &Config,
    semester: Semester,
    tokens: &[String],
    answers: CourseAnswers,
    dry_run: bool,
) -> Result<()> {
    config.validate(dry_run).context("Invalid configuration")?;

    let course = prompt_course(answers)?;
    info!(name = %course.name, quarter = %course.quarter, dry_run, "Creating course");

    let (submitter, parent) = if dry_run {
        let dry = DryRunSubmitter::new();
        let parent = dry.create_course(&course);
        let submitter: Arc<dyn Submitter> = Arc::new(dry);
        (submitter, parent)
    } else {
        let client = NotionClient::from_config(&config.notion).context("Failed to create Notion client")?;
        let parent = client.create_course(&course).await.context("Failed to create course record")?;
        let submitter: Arc<dyn Submitter> = Arc::new(client);
        (submitter, parent)
    };
    print_course(&course, &parent);

    let (descriptors, parse_failures) = parse_tokens(tokens);
    let (items, expand_failures) = expand_for_course(descriptors, Some(&course.name), &parent, &semester);
    println!(
        "Expanded {} work items from {} descriptors",
        items.len().to_string().cyan(),
        tokens.len()
    );

    let queue: DispatchQueue = items.into_iter().collect();
    let report = Dispatcher::new(config.dispatch.clone(), submitter).run(queue).await;
    print_report(&report);

    let skipped = parse_failures + expand_failures;
    if skipped > 0 {
        println!("{} {} descriptors skipped", "!".yellow(), skipped);
    }
    if !report.is_complete() {
        return Err(eyre::eyre!(
            "{} work items could not be created, see {} for details",
            report.abandoned.len(),
            log_path().display()
        ));
    }
    Ok(())
}

fn cmd_preview(semester: Semester, tokens: &[String], name: Option<&str>, format: OutputFormat) -> Result<()> {
    let (descriptors, parse_failures) = parse_tokens(tokens);
    let parent = ExternalId::new("preview");
    let prefix = name.map(|n| Course::new(n, CourseStatus::default(), "").name);
    let (items, expand_failures) = expand_for_course(descriptors, prefix.as_deref(), &parent, &semester);

    match format {
        OutputFormat::Text => {
            for item in &items {
                println!("{}", item);
            }
            println!("{} work items", items.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items).context("Failed to serialize work items")?);
        }
    }

    let skipped = parse_failures + expand_failures;
    if skipped > 0 {
        return Err(eyre::eyre!("{} descriptors could not be expanded", skipped));
    }
    Ok(())
}

fn print_course(course: &Course, id: &ExternalId) {
    println!(
        "{} Course {} ({}, {}) {}",
        "✓".green(),
        course.name.bold(),
        course.quarter,
        course.status,
        id.as_str().dimmed()
    );
}

fn print_report(report: &DispatchReport) {
    let stats = &report.stats;
    println!(
        "{} {} created, {} submissions, {} retried",
        "✓".green(),
        stats.total_accepted,
        stats.total_submitted,
        stats.total_retried
    );
    if stats.total_rejected + stats.total_timed_out > 0 {
        println!(
            "  {} rejected, {} timed out",
            stats.total_rejected.to_string().yellow(),
            stats.total_timed_out.to_string().yellow()
        );
    }
    for queued in &report.abandoned {
        println!(
            "{} gave up on {} after {} attempts",
            "✗".red(),
            queued.item.title(),
            queued.attempts
        );
    }
}
