//! Command handlers that drive the ingestion pipeline from the terminal.

use std::sync::Arc;

use afrospy_apify::{ApifyClient, PollPolicy};
use afrospy_core::{AdRecord, AppConfig, CancelFlag};
use afrospy_ingest::{IngestParams, IngestSummary, Ingestor, TracingSink};
use afrospy_store::{AdSink, MemoryStore, SupabaseStore};

pub(crate) struct ScrapeArgs {
    pub keyword: String,
    pub limit: u32,
    pub country: String,
    pub platform: String,
}

/// Where records go for this invocation.
enum Target {
    Supabase(Arc<SupabaseStore>),
    DryRun(Arc<MemoryStore>),
}

impl Target {
    /// Dry runs never touch the Supabase settings, so they work without them.
    fn new(config: &AppConfig, dry_run: bool) -> anyhow::Result<Self> {
        if dry_run {
            Ok(Self::DryRun(Arc::new(MemoryStore::new())))
        } else {
            Ok(Self::Supabase(Arc::new(SupabaseStore::from_app_config(config)?)))
        }
    }

    fn sink(&self) -> Arc<dyn AdSink> {
        match self {
            Target::Supabase(store) => store.clone(),
            Target::DryRun(store) => store.clone(),
        }
    }

    fn finish(self, summary: IngestSummary) -> Outcome {
        let dry_run_records = match self {
            Target::DryRun(store) => Some(store.records()),
            Target::Supabase(_) => None,
        };
        Outcome {
            summary,
            dry_run_records,
        }
    }
}

/// What a command produced: the run summary and, for dry runs, the records
/// that would have been written.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub summary: IngestSummary,
    pub dry_run_records: Option<Vec<AdRecord>>,
}

impl Outcome {
    pub(crate) fn print(&self) -> anyhow::Result<()> {
        if let Some(records) = &self.dry_run_records {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        println!("{}", serde_json::to_string_pretty(&self.summary)?);
        Ok(())
    }
}

fn build_ingestor(config: &AppConfig, target: &Target) -> anyhow::Result<Ingestor> {
    let client = ApifyClient::from_app_config(config)?;
    Ok(Ingestor::new(
        Arc::new(client),
        target.sink(),
        PollPolicy::from_app_config(config),
    ))
}

/// Launches a run and stores its results.
///
/// # Errors
///
/// Returns an error if a client cannot be built or the run fails before
/// items are stored.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    args: ScrapeArgs,
    dry_run: bool,
) -> anyhow::Result<Outcome> {
    let target = Target::new(config, dry_run)?;
    let ingestor = build_ingestor(config, &target)?;
    let params = IngestParams {
        keyword: args.keyword,
        country: args.country,
        limit: args.limit,
        platform: args.platform,
    };

    tracing::info!(keyword = %params.keyword, country = %params.country, limit = params.limit, dry_run, "starting scrape");
    let summary = ingestor
        .ingest(&params, &TracingSink, &CancelFlag::new())
        .await?;

    Ok(target.finish(summary))
}

/// Stores the items of an existing dataset.
///
/// # Errors
///
/// Returns an error if a client cannot be built or the dataset cannot be
/// fetched.
pub(crate) async fn run_import(
    config: &AppConfig,
    dataset_id: &str,
    limit: Option<usize>,
    platform: &str,
    dry_run: bool,
) -> anyhow::Result<Outcome> {
    let target = Target::new(config, dry_run)?;
    let ingestor = build_ingestor(config, &target)?;

    tracing::info!(dataset_id, dry_run, "importing dataset");
    let summary = ingestor
        .import_dataset(dataset_id, limit, platform, &TracingSink, &CancelFlag::new())
        .await?;

    Ok(target.finish(summary))
}
