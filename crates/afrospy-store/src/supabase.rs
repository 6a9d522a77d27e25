//! Upserts into the hosted `ads` table through the PostgREST endpoint.

use std::time::Duration;

use afrospy_core::{AdRecord, SUPABASE_KEY_VARS, SUPABASE_URL_VARS};
use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::{AdSink, StoreError};

const ADS_TABLE: &str = "ads";
const CONFLICT_COLUMNS: &str = "page_name,ad_copy";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Writes one row per call; a conflict on `(page_name, ad_copy)` merges
/// into the existing row.
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the HTTP client cannot be built, or
    /// [`StoreError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Url::parse(base_url).map_err(|e| StoreError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        })
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotConfigured`] if the Supabase URL or key is
    /// unset, otherwise the same as [`SupabaseStore::new`].
    pub fn from_app_config(config: &afrospy_core::AppConfig) -> Result<Self, StoreError> {
        let url = config
            .supabase_url
            .as_deref()
            .ok_or(StoreError::NotConfigured(SUPABASE_URL_VARS[0]))?;
        let key = config
            .supabase_key
            .as_deref()
            .ok_or(StoreError::NotConfigured(SUPABASE_KEY_VARS[0]))?;
        Self::new(url, key, config.http_timeout_secs, &config.user_agent)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{ADS_TABLE}", self.base_url)
    }
}

#[async_trait]
impl AdSink for SupabaseStore {
    async fn upsert_ad(&self, ad: &AdRecord) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.table_url())
            .query(&[("on_conflict", CONFLICT_COLUMNS)])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", PREFER_UPSERT)
            .json(ad)
            .send()
            .await
            .inspect_err(|e| tracing::warn!(page_name = %ad.page_name, error = %e, "upsert failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            tracing::warn!(
                page_name = %ad.page_name,
                status = status.as_u16(),
                body = %body,
                "store rejected upsert"
            );
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
