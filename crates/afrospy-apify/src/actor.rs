use async_trait::async_trait;

use crate::error::ApifyError;
use crate::poll::RunStatusSource;

/// The operations an ingestion run needs from a scraping actor.
///
/// [`crate::ApifyClient`] is the production implementation; tests can
/// substitute scripted fakes.
#[async_trait]
pub trait ScrapeActor: RunStatusSource {
    /// Starts a scrape and returns the run id.
    async fn start_run(
        &self,
        keyword: &str,
        country: &str,
        results_limit: u32,
    ) -> Result<String, ApifyError>;

    /// Raw items of a finished run's dataset, in dataset order.
    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<serde_json::Value>, ApifyError>;

    /// Human-facing link to the run.
    fn console_url(&self, run_id: &str) -> String;
}
