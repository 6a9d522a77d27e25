use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// What happens to an in-flight ingestion run when the streaming caller
/// that started it goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectPolicy {
    /// Keep running to completion and keep writing to the store.
    Detach,
    /// Stop at the next suspension point (poll tick or next item).
    Cancel,
}

impl std::fmt::Display for DisconnectPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisconnectPolicy::Detach => write!(f, "detach"),
            DisconnectPolicy::Cancel => write!(f, "cancel"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub apify_token: String,
    pub apify_actor_id: String,
    pub apify_base_url: String,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub poll_interval_secs: u64,
    pub poll_timeout_secs: u64,
    pub dataset_page_size: u32,
    pub max_limit: u32,
    pub default_country: String,
    pub on_disconnect: DisconnectPolicy,
    pub rate_limit_per_min: usize,
}

impl AppConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("apify_token", &"[redacted]")
            .field("apify_actor_id", &self.apify_actor_id)
            .field("apify_base_url", &self.apify_base_url)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &self.supabase_key.as_ref().map(|_| "[redacted]"))
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("dataset_page_size", &self.dataset_page_size)
            .field("max_limit", &self.max_limit)
            .field("default_country", &self.default_country)
            .field("on_disconnect", &self.on_disconnect)
            .field("rate_limit_per_min", &self.rate_limit_per_min)
            .finish()
    }
}
