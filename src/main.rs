mod api;
mod fetch;
mod server;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use covertrend::batch::BatchOrchestrator;
use covertrend::config::AnalysisConfig;
use covertrend::enrichment::EnrichmentMode;
use covertrend::ranking::{self, RankedEntry};
use covertrend::trends::{self, TrendSummary};
use covertrend::{format_float, format_number, AnalysisMethod, CatalogEntry, CoverAnalysis};

use crate::fetch::ImageFetcher;

#[derive(Parser)]
#[command(name = "covertrend", about = "Book cover trend analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Analyze(AnalyzeArgs),
    Rank(RankArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    /// Catalog JSON file; reads stdin when omitted.
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[arg(long)]
    enrichment: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct RankArgs {
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct AnalyzeReport {
    analyses: Vec<CoverAnalysis>,
    trends: TrendSummary,
    ranked: Vec<RankedEntry>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => run_analyze(args).await,
        Command::Rank(args) => run_rank(args),
        Command::Serve(args) => server::serve(args).await,
    }
}

async fn run_analyze(args: AnalyzeArgs) -> Result<(), String> {
    let (mut config, _) = AnalysisConfig::load(args.config)?;
    if let Some(mode) = args.enrichment {
        EnrichmentMode::from_str(&mode)
            .ok_or_else(|| format!("invalid enrichment mode: {}", mode))?;
        config.enrichment.mode = mode;
    }

    let entries = read_catalog(args.catalog)?;
    let fetcher = ImageFetcher::new(&config.fetch)?;
    let sources = fetcher.resolve_entries(&entries).await;

    let orchestrator = BatchOrchestrator::from_config(&config);
    let analyses = orchestrator.run(sources).await;
    let trends = trends::aggregate(&analyses);
    let ranked = ranking::rank(&ranking::inputs_from_entries(&entries));

    if args.json {
        let report = AnalyzeReport {
            analyses,
            trends,
            ranked,
        };
        let payload = serde_json::to_string_pretty(&report)
            .map_err(|err| format!("failed to serialize report: {}", err))?;
        println!("{}", payload);
        return Ok(());
    }

    print_summary(&analyses, &trends, &ranked);
    Ok(())
}

fn run_rank(args: RankArgs) -> Result<(), String> {
    let entries = read_catalog(args.catalog)?;
    let ranked = ranking::rank(&ranking::inputs_from_entries(&entries));

    if args.json {
        let payload = serde_json::to_string_pretty(&ranked)
            .map_err(|err| format!("failed to serialize ranking: {}", err))?;
        println!("{}", payload);
        return Ok(());
    }

    for entry in &ranked {
        println!(
            "{:>3}. {} - score {} ({} reviews)",
            entry.rank,
            entry.input.title,
            format_float(entry.trending_score, 2),
            format_number(entry.input.reviews_count as f64)
        );
    }
    Ok(())
}

fn print_summary(analyses: &[CoverAnalysis], trends: &TrendSummary, ranked: &[RankedEntry]) {
    let full = analyses
        .iter()
        .filter(|analysis| analysis.analysis_method == AnalysisMethod::Full)
        .count();
    println!(
        "Analyzed {} covers ({} full, {} fallback)",
        analyses.len(),
        full,
        analyses.len() - full
    );

    let themes: Vec<String> = trends
        .color_themes
        .iter()
        .map(|(theme, count)| format!("{} {}", theme, count))
        .collect();
    if !themes.is_empty() {
        println!("Color themes: {}", themes.join(" | "));
    }

    println!(
        "Average brightness {} | contrast {} | thumbnail effectiveness {}",
        trends.average_brightness,
        format_float(trends.average_contrast, 2),
        format_float(trends.average_thumbnail_effectiveness, 2)
    );
    println!("Text presence: {}%", trends.text_presence);

    if !ranked.is_empty() {
        println!("\nTop trending:");
        for entry in ranked.iter().take(10) {
            println!(
                "{:>3}. {} - score {} ({} reviews)",
                entry.rank,
                entry.input.title,
                format_float(entry.trending_score, 2),
                format_number(entry.input.reviews_count as f64)
            );
        }
    }
}

fn read_catalog(path: Option<PathBuf>) -> Result<Vec<CatalogEntry>, String> {
    let payload = match path {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|err| format!("failed to read catalog {}: {}", path.display(), err))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| format!("failed reading stdin: {}", err))?;
            buffer
        }
    };

    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Err("missing catalog: pass --catalog or pipe JSON on stdin".to_string());
    }
    serde_json::from_str(trimmed).map_err(|err| format!("failed to parse catalog: {}", err))
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
