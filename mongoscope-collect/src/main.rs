//! mongoscope-collect: survey a MongoDB database's implicit schema.
//!
//! Connects to a deployment, scans each collection's documents, and prints
//! (or writes as JSON) the observed field paths, their BSON types and
//! occurrence counts, plus each collection's index catalog.

use clap::Parser;
use mongoscope_core::source::mongo::database_from_url;
use mongoscope_core::{
    RetryPolicy, ScanMode, SurveyConfig, SurveyError, SurveyReport, Surveyor, init_logging,
    redact_database_url,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "mongoscope-collect",
    version,
    about = "Survey the implicit schema of a MongoDB database"
)]
struct Cli {
    /// MongoDB connection string (mongodb:// or mongodb+srv://)
    #[arg(env = "DATABASE_URL")]
    database_url: String,

    /// Database to survey (defaults to the database in the connection string)
    #[arg(long)]
    database: Option<String>,

    /// Sample size per collection
    #[arg(long, default_value_t = 100, conflicts_with = "full")]
    sample: u32,

    /// Scan every document instead of sampling
    #[arg(long)]
    full: bool,

    /// Include system.* collections
    #[arg(long)]
    include_system: bool,

    /// Number of collections scanned concurrently
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Total attempts for transient database errors (1 = no retries)
    #[arg(long, default_value_t = 3)]
    retry_attempts: u32,

    /// Write the report as JSON to this path instead of printing a table
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn survey_config(&self) -> SurveyConfig {
        let mode = if self.full {
            ScanMode::Full
        } else {
            ScanMode::Sample(self.sample)
        };
        SurveyConfig::new()
            .with_mode(mode)
            .with_include_system(self.include_system)
            .with_concurrency(self.concurrency)
            .with_retry(RetryPolicy {
                max_attempts: self.retry_attempts,
                ..RetryPolicy::default()
            })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {}", error);
    }

    if let Err(error) = run(cli).await {
        tracing::error!("{}", error);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> mongoscope_core::Result<()> {
    let database = cli
        .database
        .clone()
        .or_else(|| database_from_url(&cli.database_url))
        .ok_or_else(|| {
            SurveyError::configuration(
                "no database to survey: put one in the connection string path or pass --database",
            )
        })?;

    tracing::info!(
        "Connecting to {}",
        redact_database_url(&cli.database_url)
    );
    let surveyor = Surveyor::connect(&cli.database_url, cli.survey_config()).await?;
    let report = surveyor.survey(&database).await?;

    match &cli.output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&report).map_err(|e| {
                SurveyError::Serialization {
                    context: "survey report".to_string(),
                    source: e,
                }
            })?;
            tokio::fs::write(path, json).await.map_err(|e| SurveyError::Io {
                context: format!("writing report to {}", path.display()),
                source: e,
            })?;
            tracing::info!("Report written to {}", path.display());
        }
        None => print_report(&report),
    }

    if !report.errors.is_empty() {
        tracing::warn!(
            "{} of {} collections had errors",
            report.errors.len(),
            report.collections.len()
        );
    }
    Ok(())
}

fn print_report(report: &SurveyReport) {
    println!(
        "Database: {} ({} collections, {} paths, {} ms)",
        report.database,
        report.collections.len(),
        report.total_paths(),
        report.metadata.duration_ms
    );

    for collection in &report.collections {
        println!();
        match collection.status.error() {
            None => println!(
                "{} ({} documents)",
                collection.name, collection.document_count
            ),
            Some(error) => println!(
                "{} ({} documents, DEGRADED: {})",
                collection.name, collection.document_count, error
            ),
        }
        if collection.skipped_documents > 0 {
            println!("  {} malformed documents skipped", collection.skipped_documents);
        }

        let width = collection
            .paths
            .keys()
            .map(String::len)
            .max()
            .unwrap_or(0);
        for (path, summary) in &collection.paths {
            println!(
                "  {:width$}  {:>6}  {}",
                path,
                summary.count,
                summary.type_list(),
            );
        }

        for index in &collection.indexes {
            let keys: Vec<String> = index
                .keys
                .iter()
                .map(|k| format!("{}:{}", k.field, k.direction))
                .collect();
            let mut flags = Vec::new();
            if index.unique {
                flags.push("unique".to_string());
            }
            if index.sparse {
                flags.push("sparse".to_string());
            }
            if let Some(ttl) = index.ttl_seconds {
                flags.push(format!("ttl={}s", ttl));
            }
            if index.partial_filter.is_some() {
                flags.push("partial".to_string());
            }
            let suffix = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };
            println!("  index {} ({}){}", index.name, keys.join(", "), suffix);
        }

        for warning in &collection.warnings {
            println!("  warning: {}", warning);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for error in &report.errors {
            println!("  {}: {}", error.collection, error.message);
        }
    }
}
