//! ideawatch - live summaries for innovation-idea answer feeds
//!
//! A CLI that fetches the answers submitted for a question, aggregates
//! them by category, department, and keyword, writes a Markdown or JSON
//! summary, and optionally keeps that summary fresh by polling the API.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, write failure, etc.)

mod analysis;
mod api;
mod cli;
mod config;
mod models;
mod report;
mod watch;

use analysis::AnswerFilter;
use anyhow::{Context, Result};
use api::AnswersClient;
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use models::{Answer, Question, ReportMetadata, SummaryReport};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use watch::Poller;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("ideawatch v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .ideawatch.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".ideawatch.toml");

    if path.exists() {
        eprintln!("⚠️  .ideawatch.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .ideawatch.toml")?;

    println!("✅ Created .ideawatch.toml with default settings.");
    println!("   Edit it to customize the API URL, poll interval, and output path.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete workflow: fetch, summarize, write, optionally watch.
async fn run(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let client = AnswersClient::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_seconds),
    )?;

    if args.ping {
        client
            .health_check()
            .await
            .context("API health check failed")?;
        println!("✅ API reachable at {}", client.base_url());
        return Ok(());
    }

    let question_id = args.question_id().to_string();
    let filter = AnswerFilter {
        category: args.category.clone(),
        department: args.department.clone(),
    };

    // Initial fetch: unlike poll refreshes, errors here surface to the
    // user. Question metadata is best effort - a summary is still
    // useful without a title.
    println!("📥 Fetching answers for question {}", question_id);
    let (answers, question) = futures::join!(
        client.fetch_answers(&question_id),
        client.fetch_question(&question_id)
    );
    let answers = answers
        .with_context(|| format!("Failed to fetch answers for question {}", question_id))?;
    let question = match question {
        Ok(q) => Some(q),
        Err(e) => {
            warn!("Could not load question metadata: {}", e);
            None
        }
    };

    // A filter label that matches nothing is usually a typo; say so
    // instead of silently writing an empty summary.
    if let Some(ref category) = filter.category {
        if !analysis::distinct_categories(&answers).contains(category) {
            warn!("Category '{}' does not appear in this batch", category);
        }
    }
    if let Some(ref department) = filter.department {
        if !analysis::distinct_departments(&answers).contains(department) {
            warn!("Department '{}' does not appear in this batch", department);
        }
    }

    let report = write_outputs(
        &args,
        &config,
        &question_id,
        question.as_ref(),
        &filter,
        &answers,
    )?;

    println!("\n📊 Summary:");
    println!("   Answers: {}", report.metadata.answer_count);
    println!(
        "   Categories: {} | Departments: {} | Keywords: {}",
        report.summary.categories.len(),
        report.summary.departments.len(),
        report.summary.keywords.len()
    );
    println!("✅ Summary saved to: {}", config.general.output);
    if let Some(ref csv_path) = args.export_csv {
        println!("✅ CSV exported to: {}", csv_path.display());
    }

    if args.watch {
        run_watch(
            client,
            &args,
            &config,
            &question_id,
            question.as_ref(),
            &filter,
        )
        .await?;
    }

    Ok(())
}

/// Build the summary report and write the requested output files.
///
/// Filtering narrows what the summary counts; the CSV export always
/// carries the full fetched batch.
fn write_outputs(
    args: &Args,
    config: &Config,
    question_id: &str,
    question: Option<&Question>,
    filter: &AnswerFilter,
    answers: &[Answer],
) -> Result<SummaryReport> {
    let visible = if filter.is_empty() {
        answers.to_vec()
    } else {
        filter.apply(answers)
    };
    let summary = analysis::summarize(&visible, config.report.top_keywords);

    let report = SummaryReport {
        metadata: ReportMetadata {
            question_id: question_id.to_string(),
            api_url: config.api.base_url.clone(),
            generated_at: Utc::now(),
            answer_count: visible.len(),
        },
        question_title: question.map(|q| q.question_title.clone()),
        question_description: question.and_then(|q| q.question_description.clone()),
        summary,
    };

    let rendered = match args.format {
        OutputFormat::Markdown => report::generate_markdown_report(&report),
        OutputFormat::Json => report::generate_json_report(&report)?,
    };

    let output_path = Path::new(&config.general.output);
    std::fs::write(output_path, rendered)
        .with_context(|| format!("Failed to write summary to {}", output_path.display()))?;

    if let Some(ref csv_path) = args.export_csv {
        report::write_answers_csv(answers, csv_path)?;
    }

    Ok(report)
}

/// Watch mode: poll the API and rewrite the summary on every refresh
/// until interrupted.
async fn run_watch(
    client: AnswersClient,
    args: &Args,
    config: &Config,
    question_id: &str,
    question: Option<&Question>,
    filter: &AnswerFilter,
) -> Result<()> {
    let interval = Duration::from_secs(config.poll.interval_seconds);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut poller = Poller::new(Arc::new(client), interval);
    poller.start(question_id, move |answers| {
        let _ = tx.send(answers);
    });

    println!(
        "\n👀 Watching question {} (refresh every {}s, Ctrl-C to stop)",
        question_id, config.poll.interval_seconds
    );

    loop {
        tokio::select! {
            maybe_batch = rx.recv() => {
                match maybe_batch {
                    Some(answers) => {
                        let report = write_outputs(
                            args,
                            config,
                            question_id,
                            question,
                            filter,
                            &answers,
                        )?;
                        println!(
                            "🔄 {} refreshed: {} answers, {} categories",
                            Utc::now().format("%H:%M:%S"),
                            report.metadata.answer_count,
                            report.summary.categories.len()
                        );
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\n🛑 Watch stopped");
                break;
            }
        }
    }

    poller.stop();
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .ideawatch.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
