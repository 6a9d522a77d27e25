pub mod ads;
pub mod app_config;
pub mod cancel;
pub mod config;
pub mod policy;

pub use ads::{AdRecord, DEFAULT_PLATFORM, EMPTY_COPY_PLACEHOLDER, UNKNOWN_PAGE_NAME};
pub use app_config::{AppConfig, DisconnectPolicy, Environment};
pub use cancel::CancelFlag;
pub use config::{
    build_app_config, load_app_config, load_app_config_from_env, SUPABASE_KEY_VARS,
    SUPABASE_URL_VARS,
};
pub use policy::{TriggerPolicy, ALLOWED_COUNTRIES};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
