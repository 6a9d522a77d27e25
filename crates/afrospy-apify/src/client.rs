//! HTTP client for the Apify REST API.
//!
//! Covers the three calls an ingestion run needs: start an actor run, read
//! a run's status, and download a finished run's dataset. No call is
//! retried; every request carries the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::actor::ScrapeActor;
use crate::error::{truncate_body, ApifyError};
use crate::poll::RunStatusSource;
use crate::search_url::ad_library_search_url;
use crate::types::{AdLibraryInput, ApiResponse, RunData, StartUrl};

pub const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2";
pub const DEFAULT_DATASET_PAGE_SIZE: u32 = 200;
pub const DEFAULT_USER_AGENT: &str = "afrospy/0.1 (ad-intelligence)";
const CONSOLE_BASE_URL: &str = "https://console.apify.com";

/// Client for one Apify actor.
///
/// Use [`ApifyClient::new`] for production or [`ApifyClient::with_base_url`]
/// to point at a mock server in tests.
pub struct ApifyClient {
    client: Client,
    token: String,
    actor_id: String,
    base_url: String,
    dataset_page_size: u32,
}

impl ApifyClient {
    /// Creates a client pointed at the production Apify API.
    ///
    /// # Errors
    ///
    /// Returns [`ApifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        token: &str,
        actor_id: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ApifyError> {
        Self::with_base_url(token, actor_id, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ApifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ApifyError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        token: &str,
        actor_id: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ApifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Url::parse(base_url).map_err(|e| ApifyError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            token: token.to_owned(),
            actor_id: actor_id.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            dataset_page_size: DEFAULT_DATASET_PAGE_SIZE,
        })
    }

    /// Builds a client from the application config.
    ///
    /// # Errors
    ///
    /// Same as [`ApifyClient::with_base_url`].
    pub fn from_app_config(config: &afrospy_core::AppConfig) -> Result<Self, ApifyError> {
        Ok(Self::with_base_url(
            &config.apify_token,
            &config.apify_actor_id,
            config.http_timeout_secs,
            &config.user_agent,
            &config.apify_base_url,
        )?
        .with_dataset_page_size(config.dataset_page_size))
    }

    /// Overrides how many items a dataset download requests.
    #[must_use]
    pub fn with_dataset_page_size(mut self, page_size: u32) -> Self {
        self.dataset_page_size = page_size;
        self
    }

    #[must_use]
    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    /// Starts an Ad Library scrape for `keyword` in `country`, capped at
    /// `results_limit` ads. Returns the run id immediately.
    ///
    /// # Errors
    ///
    /// - [`ApifyError::Launch`] if the actor answers with a non-2xx status;
    ///   the body is truncated to 200 characters.
    /// - [`ApifyError::Http`] on network failure or timeout.
    /// - [`ApifyError::Deserialize`] if the response is not a run envelope.
    pub async fn start_run(
        &self,
        keyword: &str,
        country: &str,
        results_limit: u32,
    ) -> Result<String, ApifyError> {
        let input = AdLibraryInput {
            urls: vec![StartUrl {
                url: ad_library_search_url(keyword, country),
            }],
            results_limit,
        };

        let url = format!("{}/acts/{}/runs", self.base_url, self.actor_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&input)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApifyError::Launch {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let envelope: ApiResponse<RunData> =
            Self::decode(response, &format!("start run for actor {}", self.actor_id)).await?;
        tracing::debug!(run_id = %envelope.data.id, keyword, country, "Apify run started");
        Ok(envelope.data.id)
    }

    /// Reads the current status of a run.
    ///
    /// # Errors
    ///
    /// - [`ApifyError::UnexpectedStatus`] on a non-2xx answer.
    /// - [`ApifyError::Http`] on network failure or timeout.
    /// - [`ApifyError::Deserialize`] if the body is not a run envelope.
    pub async fn get_run(&self, run_id: &str) -> Result<RunData, ApifyError> {
        let url = format!("{}/actor-runs/{run_id}", self.base_url);
        let context = format!("actor-runs/{run_id}");
        let response = self.send_get(&url, &context).await?;
        let envelope: ApiResponse<RunData> = Self::decode(response, &context).await?;
        Ok(envelope.data)
    }

    /// Downloads the items of a dataset, always asking for the configured
    /// page size regardless of how many the caller will keep.
    ///
    /// # Errors
    ///
    /// - [`ApifyError::UnexpectedStatus`] on a non-2xx answer.
    /// - [`ApifyError::Http`] on network failure or timeout.
    /// - [`ApifyError::Deserialize`] if the body is not a JSON array.
    pub async fn get_dataset_items<T: DeserializeOwned>(
        &self,
        dataset_id: &str,
    ) -> Result<Vec<T>, ApifyError> {
        let url = format!(
            "{}/datasets/{dataset_id}/items?format=json&limit={}",
            self.base_url, self.dataset_page_size
        );
        let context = format!("datasets/{dataset_id}/items");
        let response = self.send_get(&url, &context).await?;
        Self::decode(response, &context).await
    }

    /// Link to the run in the Apify console.
    #[must_use]
    pub fn console_url(&self, run_id: &str) -> String {
        format!(
            "{CONSOLE_BASE_URL}/actors/{}/runs/{run_id}",
            self.actor_id
        )
    }

    async fn send_get(&self, url: &str, context: &str) -> Result<reqwest::Response, ApifyError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApifyError::UnexpectedStatus {
                status: status.as_u16(),
                context: context.to_owned(),
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T, ApifyError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApifyError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

#[async_trait]
impl RunStatusSource for ApifyClient {
    async fn run_status(&self, run_id: &str) -> Result<RunData, ApifyError> {
        self.get_run(run_id).await
    }
}

#[async_trait]
impl ScrapeActor for ApifyClient {
    async fn start_run(
        &self,
        keyword: &str,
        country: &str,
        results_limit: u32,
    ) -> Result<String, ApifyError> {
        ApifyClient::start_run(self, keyword, country, results_limit).await
    }

    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<serde_json::Value>, ApifyError> {
        self.get_dataset_items(dataset_id).await
    }

    fn console_url(&self, run_id: &str) -> String {
        ApifyClient::console_url(self, run_id)
    }
}
