use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use lake_quality_service::catalog;
use lake_quality_service::classifier::SafetyPolicy;
use lake_quality_service::config::{DEFAULT_EXCLUDED_LAKES, DEFAULT_SNIPPET_URL_TEMPLATE};
use lake_quality_service::fetcher::SnippetFetcher;
use lake_quality_service::model::{LakeDataset, NumericValue};
use lake_quality_service::services::LakeDatasetBuilder;
use lake_quality_service::utils::LAKE_ID_PLACEHOLDER;
use tracing::info;

#[derive(Parser)]
#[command(name = "refresh")]
#[command(about = "Fetch lake bulletins once and write the classified dataset as JSON", long_about = None)]
struct Cli {
    /// JSON lake catalog (defaults to the built-in Leipzig lakes)
    #[arg(long, env = "CATALOG_PATH")]
    catalog: Option<PathBuf>,

    /// Snippet URL template; `{id}` is replaced with the lake id
    #[arg(long, env = "SNIPPET_URL_TEMPLATE", default_value = DEFAULT_SNIPPET_URL_TEMPLATE)]
    url_template: String,

    /// Write the dataset here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only report SAFE when the microscopy finding is empty
    #[arg(
        long,
        env = "REQUIRE_EMPTY_MICROSCOPY",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    require_empty_microscopy: bool,

    /// Lake ids or names to skip (comma separated)
    #[arg(
        long,
        env = "EXCLUDED_LAKES",
        value_delimiter = ',',
        default_value = DEFAULT_EXCLUDED_LAKES
    )]
    exclude: Vec<String>,

    /// Number of parallel fetches
    #[arg(long, env = "FETCH_CONCURRENCY", default_value = "4")]
    parallel: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value = "20")]
    timeout_secs: u64,

    /// Retries for transient fetch failures
    #[arg(long, env = "FETCH_RETRIES", default_value = "2")]
    retries: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if !cli.url_template.contains(LAKE_ID_PLACEHOLDER) {
        return Err(format!("--url-template must contain {LAKE_ID_PLACEHOLDER}").into());
    }

    let start_time = Instant::now();
    let lakes = catalog::load_or_default(cli.catalog.as_deref())?;
    info!("Loaded {} lakes", lakes.len());

    let fetcher = SnippetFetcher::new(
        cli.url_template.clone(),
        Duration::from_secs(cli.timeout_secs),
        cli.retries,
    )?;
    let policy = SafetyPolicy {
        require_empty_microscopy: cli.require_empty_microscopy,
    };
    let excluded: Vec<String> = cli
        .exclude
        .iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();
    let builder = LakeDatasetBuilder::new(fetcher, policy)
        .with_concurrency(cli.parallel)
        .with_excluded(excluded);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Fetching bulletins for {} lakes...", lakes.len()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let dataset = builder.build(&lakes).await;
    pb.finish_and_clear();
    let dataset = dataset?;

    print_summary(&dataset, start_time.elapsed());

    let json = serde_json::to_string_pretty(&dataset)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)?;
            eprintln!("Wrote {} lakes to {}", dataset.records.len(), path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn count(value: Option<NumericValue>) -> String {
    match value {
        Some(NumericValue::Value(v)) => v.to_string(),
        Some(NumericValue::ErrorInData) => NumericValue::ERROR_IN_DATA.to_string(),
        None => "-".to_string(),
    }
}

fn print_summary(dataset: &LakeDataset, elapsed: Duration) {
    eprintln!("\n============================================================");
    eprintln!("Lake Water Quality ({})", dataset.generated_at.format("%Y-%m-%d %H:%M UTC"));
    eprintln!("============================================================");
    for record in &dataset.records {
        eprintln!(
            "{:<26} {:>10}  {:<9} entero={:<6} coli={:<6}",
            record.name,
            record.sample_date.format("%d.%m.%Y"),
            format!("{:?}", record.status).to_uppercase(),
            count(record.enterococci),
            count(record.coli),
        );
    }
    eprintln!("------------------------------------------------------------");
    eprintln!("Lakes with data:    {}", dataset.records.len());
    eprintln!("Diagnostics:        {}", dataset.diagnostics.len());
    eprintln!("Total Time:         {:.2}s", elapsed.as_secs_f64());
    eprintln!("============================================================");

    if !dataset.diagnostics.is_empty() {
        eprintln!("\nDiagnostics:");
        for d in &dataset.diagnostics {
            eprintln!("  {} ({}): {}", d.lake_name, d.url, d.message);
        }
    }
}
