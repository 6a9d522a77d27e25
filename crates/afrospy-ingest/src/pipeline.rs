//! Ingestion pipeline: launch, poll, fetch, then normalize, filter, score
//! and upsert each item in dataset order.

use std::sync::Arc;

use afrospy_apify::{wait_for_run, PollPolicy, ScrapeActor};
use afrospy_core::{CancelFlag, DEFAULT_PLATFORM};
use afrospy_store::AdSink;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::IngestError;
use crate::normalize::normalize_item;
use crate::progress::ProgressSink;
use crate::scorer::trend_score_at;

/// What to scrape. Country and limit are taken as given; callers apply
/// their own policy first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestParams {
    pub keyword: String,
    pub country: String,
    pub limit: u32,
    pub platform: String,
}

impl IngestParams {
    /// Platform to stamp on records; blank means [`DEFAULT_PLATFORM`].
    #[must_use]
    pub fn effective_platform(&self) -> &str {
        platform_or_default(&self.platform)
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    /// `None` for dataset imports, which start no run.
    pub run_id: Option<String>,
    pub dataset_id: String,
    /// Items returned by the dataset, before truncation to the limit.
    pub fetched: usize,
    pub inserted: usize,
    pub skipped: usize,
    /// Records the store refused. Not retried.
    pub failed: usize,
}

/// Drives one ingestion at a time over an actor and a store.
///
/// Cheap to clone: both ends are shared.
#[derive(Clone)]
pub struct Ingestor {
    actor: Arc<dyn ScrapeActor>,
    store: Arc<dyn AdSink>,
    poll: PollPolicy,
    clock: fn() -> DateTime<Utc>,
}

impl Ingestor {
    #[must_use]
    pub fn new(actor: Arc<dyn ScrapeActor>, store: Arc<dyn AdSink>, poll: PollPolicy) -> Self {
        Self {
            actor,
            store,
            poll,
            clock: Utc::now,
        }
    }

    /// Replaces the wall clock used for start-date fallback and scoring.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Launches, polls, fetches and stores in one go.
    ///
    /// # Errors
    ///
    /// Any launch, poll or fetch failure, or cancellation. Store failures
    /// only increment [`IngestSummary::failed`].
    pub async fn ingest(
        &self,
        params: &IngestParams,
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Result<IngestSummary, IngestError> {
        let run_id = self.launch(params, progress).await?;
        self.complete(&run_id, params, progress, cancel).await
    }

    /// Starts the scrape and returns its run id.
    ///
    /// # Errors
    ///
    /// [`IngestError::Launch`] if the actor does not accept the run.
    pub async fn launch(
        &self,
        params: &IngestParams,
        progress: &dyn ProgressSink,
    ) -> Result<String, IngestError> {
        progress.log(format!(
            "AfroSpy: \"{}\" | {} | max {} ads",
            params.keyword, params.country, params.limit
        ));
        progress.log("Starting Apify run...".to_owned());

        let run_id = self
            .actor
            .start_run(&params.keyword, &params.country, params.limit)
            .await
            .map_err(IngestError::Launch)?;

        tracing::info!(run_id = %run_id, keyword = %params.keyword, country = %params.country, "scrape launched");
        progress.log(format!("Run ID: {run_id}"));
        Ok(run_id)
    }

    /// Waits for a launched run, then fetches and stores its dataset.
    ///
    /// # Errors
    ///
    /// Poll timeout, remote failure, inconsistent success, status or fetch
    /// transport errors, or cancellation.
    pub async fn complete(
        &self,
        run_id: &str,
        params: &IngestParams,
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Result<IngestSummary, IngestError> {
        progress.log(format!(
            "Waiting for run to finish (max {}s)...",
            self.poll.timeout.as_secs()
        ));
        let dataset_id = wait_for_run(self.actor.as_ref(), run_id, self.poll, cancel, |status| {
            progress.log(format!("Apify status: {status}"));
        })
        .await
        .map_err(|e| IngestError::from_poll(run_id, e))?;
        progress.log(format!("Dataset ID: {dataset_id}"));

        let mut summary = self
            .store_dataset(
                &dataset_id,
                params.limit as usize,
                params.effective_platform(),
                progress,
                cancel,
            )
            .await
            .map_err(|e| e.with_run_id(run_id))?;
        summary.run_id = Some(run_id.to_owned());

        progress.log(format!(
            "Apify runs: {}",
            self.actor.console_url(run_id)
        ));
        Ok(summary)
    }

    /// Stores an already finished dataset without launching anything.
    /// `limit` of `None` keeps every fetched item.
    ///
    /// # Errors
    ///
    /// Fetch failure or cancellation.
    pub async fn import_dataset(
        &self,
        dataset_id: &str,
        limit: Option<usize>,
        platform: &str,
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Result<IngestSummary, IngestError> {
        self.store_dataset(
            dataset_id,
            limit.unwrap_or(usize::MAX),
            platform_or_default(platform),
            progress,
            cancel,
        )
        .await
        .map_err(|e| e.for_import(dataset_id))
    }

    async fn store_dataset(
        &self,
        dataset_id: &str,
        limit: usize,
        platform: &str,
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Result<IngestSummary, StoreDatasetError> {
        progress.log(format!("Fetching dataset {dataset_id}..."));
        let items = self
            .actor
            .dataset_items(dataset_id)
            .await
            .map_err(|source| {
                StoreDatasetError::Fetch(IngestError::Fetch {
                    dataset_id: dataset_id.to_owned(),
                    source,
                })
            })?;
        progress.log(format!("{} items fetched from Apify", items.len()));

        let mut summary = IngestSummary {
            dataset_id: dataset_id.to_owned(),
            fetched: items.len(),
            ..IngestSummary::default()
        };

        if items.is_empty() {
            progress.warn("No results. Try another keyword or country.".to_owned());
            return Ok(summary);
        }

        for item in items.iter().take(limit) {
            if cancel.is_cancelled() {
                tracing::info!(dataset_id, inserted = summary.inserted, "run cancelled mid-dataset");
                return Err(StoreDatasetError::Cancelled);
            }
            self.store_item(item, platform, progress, &mut summary).await;
        }

        progress.log(format!(
            "Summary: {} inserted, {} skipped, {} failed",
            summary.inserted, summary.skipped, summary.failed
        ));
        tracing::info!(
            dataset_id,
            fetched = summary.fetched,
            inserted = summary.inserted,
            skipped = summary.skipped,
            failed = summary.failed,
            "dataset stored"
        );
        Ok(summary)
    }

    async fn store_item(
        &self,
        item: &Value,
        platform: &str,
        progress: &dyn ProgressSink,
        summary: &mut IngestSummary,
    ) {
        let now = (self.clock)();
        let ad = normalize_item(item, now.date_naive());
        progress.log(format!(
            "\"{}\" | body:{}c | video:{}",
            ad.page_name,
            ad.body.chars().count(),
            ad.has_video()
        ));

        if ad.is_empty() {
            summary.skipped += 1;
            return;
        }

        let score = trend_score_at(ad.started_at, ad.has_video(), now);
        let record = ad.into_record(platform, score);

        match self.store.upsert_ad(&record).await {
            Ok(()) => {
                summary.inserted += 1;
                progress.log(format!(
                    "[{}] \"{}\" | score: {}",
                    summary.inserted, record.page_name, record.trend_score
                ));
            }
            Err(e) => {
                summary.failed += 1;
                progress.warn(format!("Store error for \"{}\": {e}", record.page_name));
            }
        }
    }
}

fn platform_or_default(platform: &str) -> &str {
    let trimmed = platform.trim();
    if trimmed.is_empty() {
        DEFAULT_PLATFORM
    } else {
        trimmed
    }
}

/// Failures of the shared fetch-and-store stage, before the caller says
/// whether a cancellation belongs to a run or to a dataset import.
enum StoreDatasetError {
    Fetch(IngestError),
    Cancelled,
}

impl StoreDatasetError {
    fn with_run_id(self, run_id: &str) -> IngestError {
        match self {
            StoreDatasetError::Fetch(e) => e,
            StoreDatasetError::Cancelled => IngestError::Cancelled {
                run_id: run_id.to_owned(),
            },
        }
    }

    fn for_import(self, dataset_id: &str) -> IngestError {
        match self {
            StoreDatasetError::Fetch(e) => e,
            StoreDatasetError::Cancelled => IngestError::ImportCancelled {
                dataset_id: dataset_id.to_owned(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(platform: &str) -> IngestParams {
        IngestParams {
            keyword: "k".to_string(),
            country: "TD".to_string(),
            limit: 1,
            platform: platform.to_string(),
        }
    }

    #[test]
    fn blank_platform_defaults_to_facebook() {
        assert_eq!(params("").effective_platform(), "facebook");
        assert_eq!(params("   ").effective_platform(), "facebook");
        assert_eq!(params("instagram").effective_platform(), "instagram");
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = IngestSummary {
            run_id: Some("r".to_string()),
            dataset_id: "d".to_string(),
            fetched: 5,
            inserted: 4,
            skipped: 1,
            failed: 0,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["runId"], "r");
        assert_eq!(json["datasetId"], "d");
        assert_eq!(json["inserted"], 4);
    }
}
