mod ingest;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "afrospy-cli")]
#[command(about = "AfroSpy ad ingestion command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape the Ad Library for a keyword and store the results
    Scrape {
        /// Search keyword, e.g. "soin visage"
        keyword: String,

        /// Maximum number of ads to keep from the run
        #[arg(long, default_value_t = 20)]
        limit: u32,

        /// Two-letter country code; defaults to the configured country
        #[arg(long)]
        country: Option<String>,

        /// Platform stamped on stored rows
        #[arg(long, env = "PLATFORM_OVERRIDE", default_value = "facebook")]
        platform: String,

        /// Keep records in memory and print them instead of writing to Supabase
        #[arg(long)]
        dry_run: bool,
    },
    /// Store the items of an existing Apify dataset without starting a run
    ImportDataset {
        dataset_id: String,

        /// Only keep the first N items
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, env = "PLATFORM_OVERRIDE", default_value = "facebook")]
        platform: String,

        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("afrospy-cli: run with --help to list commands");
        return Ok(());
    };

    let config = afrospy_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let outcome = match command {
        Commands::Scrape {
            keyword,
            limit,
            country,
            platform,
            dry_run,
        } => {
            let country = country
                .map(|c| c.trim().to_ascii_uppercase())
                .unwrap_or_else(|| config.default_country.clone());
            ingest::run_scrape(
                &config,
                ingest::ScrapeArgs {
                    keyword,
                    limit,
                    country,
                    platform,
                },
                dry_run,
            )
            .await?
        }
        Commands::ImportDataset {
            dataset_id,
            limit,
            platform,
            dry_run,
        } => ingest::run_import(&config, &dataset_id, limit, &platform, dry_run).await?,
    };

    outcome.print()
}
