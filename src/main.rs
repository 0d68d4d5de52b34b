// src/main.rs
mod edgar;
mod extractors;
mod profile;
mod report;
mod storage;
mod utils;

use clap::{Args, Parser, Subcommand};
use edgar::EdgarClient;
use report::ContentFetcher;
use std::path::PathBuf;
use storage::{LocalContentStore, StorageManager};
use utils::{AppConfig, AppError};

/// Filing section analysis and company profile auditing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Segment and summarize recent 10-K/10-Q filings
    Parse(ParseArgs),
    /// Validate and score company profiles
    Audit(AuditArgs),
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Ticker symbol of the company (resolved to a CIK through EDGAR)
    #[arg(short, long, conflicts_with_all = ["cik", "filings"])]
    ticker: Option<String>,

    /// Company CIK, skips the ticker lookup
    #[arg(long, conflicts_with = "filings")]
    cik: Option<String>,

    /// Local JSON file of filing descriptors instead of the EDGAR index
    #[arg(long, requires = "content_dir")]
    filings: Option<PathBuf>,

    /// Directory of <accession>.txt documents used with --filings
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Maximum reports kept per form family (10-K, 10-Q)
    #[arg(short, long, default_value_t = 3)]
    max_reports_per_form: usize,

    /// Output directory for the JSON result (printed to stdout when omitted)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// A single profile JSON file
    #[arg(short, long, conflicts_with = "profiles_dir")]
    profile: Option<PathBuf>,

    /// Directory of profile JSON files to batch-scan
    #[arg(long)]
    profiles_dir: Option<PathBuf>,

    /// Profiles scoring below this are flagged for regeneration
    #[arg(long, default_value_t = 80.0)]
    threshold: f64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let cli = Cli::parse();
    tracing::info!("Starting processing for args: {:?}", cli);

    match cli.command {
        Command::Parse(args) => run_parse(args).await,
        Command::Audit(args) => run_audit(args),
    }
}

async fn run_parse(args: ParseArgs) -> Result<(), AppError> {
    let (filings, fetcher, cik) = match (&args.filings, &args.content_dir) {
        (Some(path), Some(content_dir)) => {
            let filings = storage::load_filing_descriptors(path)?;
            let cik = filings
                .iter()
                .find_map(|f| f.cik.clone())
                .unwrap_or_else(|| "local".to_string());
            let fetcher: Box<dyn ContentFetcher> = Box::new(LocalContentStore::new(content_dir));
            (filings, fetcher, cik)
        }
        _ => {
            let config = AppConfig::from_env()?;
            let client = EdgarClient::new(&config)?;
            let cik = match (&args.cik, &args.ticker) {
                (Some(cik), _) => cik.clone(),
                (None, Some(ticker)) => client.get_cik_from_ticker(ticker).await?,
                (None, None) => {
                    return Err(AppError::Config(
                        "Provide --ticker, --cik, or --filings with --content-dir".to_string(),
                    ))
                }
            };
            let filings = client.list_filings(&cik).await?;
            let fetcher: Box<dyn ContentFetcher> = Box::new(client);
            (filings, fetcher, cik)
        }
    };

    tracing::info!("Found {} filings for CIK {}", filings.len(), cik);
    let result = report::parse(&filings, args.max_reports_per_form, fetcher.as_ref()).await;

    for warning in &result.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::info!(
        "Processing finished. Reports: {}, Warnings: {}",
        result.total_reports,
        result.warnings.len()
    );

    match &args.output_dir {
        Some(dir) => {
            let storage = StorageManager::new(dir)?;
            let path = storage.save_parse_result(&cik, &result)?;
            println!("{}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

fn run_audit(args: AuditArgs) -> Result<(), AppError> {
    if let Some(path) = &args.profile {
        let record = storage::load_profile(path)?;
        let metrics = profile::analyze(Some(&record));
        tracing::info!(
            "Profile {} scored {} ({})",
            path.display(),
            metrics.overall_score,
            metrics.status
        );
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    let dir = args.profiles_dir.as_ref().ok_or_else(|| {
        AppError::Config("Provide --profile or --profiles-dir".to_string())
    })?;

    let profiles = storage::load_profiles(dir)?;
    let mut regenerate = 0;
    for (name, record) in &profiles {
        let metrics = profile::analyze(Some(record));
        let flag = if profile::needs_regeneration(&metrics, args.threshold) {
            regenerate += 1;
            "REGENERATE"
        } else {
            "ok"
        };
        println!(
            "{:<24} {:>5.1} {:<9} {:<10} {}",
            name, metrics.overall_score, metrics.status, flag, metrics.validation_status
        );
    }

    tracing::info!(
        "Audited {} profiles, {} need regeneration (threshold {})",
        profiles.len(),
        regenerate,
        args.threshold
    );
    Ok(())
}
