use crate::app_config::{AppConfig, DisconnectPolicy, Environment};
use crate::policy::ALLOWED_COUNTRIES;
use crate::ConfigError;

const DEFAULT_ACTOR_ID: &str = "XtaWFhbtfxyzqrFmd";
const DEFAULT_APIFY_BASE_URL: &str = "https://api.apify.com/v2";

/// Primary name first, legacy fallback second.
pub const SUPABASE_URL_VARS: [&str; 2] = ["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"];
pub const SUPABASE_KEY_VARS: [&str; 2] = [
    "SUPABASE_SERVICE_ROLE_KEY",
    "NEXT_PUBLIC_SUPABASE_ANON_KEY",
];

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation live here, decoupled from the process environment,
/// so tests can drive it from a plain `HashMap`.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    // First variable that is set and non-empty wins; the error names the
    // primary one.
    let optional_any = |vars: &[&str]| -> Option<String> {
        vars.iter()
            .find_map(|var| lookup(var).ok().filter(|v| !v.trim().is_empty()))
    };
    let require_any = |vars: &[&str]| -> Result<String, ConfigError> {
        optional_any(vars).ok_or_else(|| ConfigError::MissingEnvVar(vars[0].to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let apify_token = require_any(&["APIFY_TOKEN", "APIFY_API_TOKEN"])?;
    // Only the Supabase store needs these; dry runs work without them.
    let supabase_url = optional_any(&SUPABASE_URL_VARS[..]);
    let supabase_key = optional_any(&SUPABASE_KEY_VARS[..]);

    let env = parse_environment(&or_default("AFROSPY_ENV", "development"))?;

    let bind_addr = or_default("AFROSPY_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("AFROSPY_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("AFROSPY_LOG_LEVEL", "info");

    let apify_actor_id = or_default("APIFY_ACTOR_ID", DEFAULT_ACTOR_ID);
    let apify_base_url = or_default("APIFY_BASE_URL", DEFAULT_APIFY_BASE_URL);

    let http_timeout_secs = parse_u64("AFROSPY_HTTP_TIMEOUT_SECS", "30")?;
    if http_timeout_secs == 0 {
        return Err(invalid(
            "AFROSPY_HTTP_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let user_agent = or_default("AFROSPY_USER_AGENT", "afrospy/0.1 (ad-intelligence)");

    let poll_interval_secs = parse_u64("AFROSPY_POLL_INTERVAL_SECS", "5")?;
    if poll_interval_secs == 0 {
        return Err(invalid(
            "AFROSPY_POLL_INTERVAL_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let poll_timeout_secs = parse_u64("AFROSPY_POLL_TIMEOUT_SECS", "300")?;
    let dataset_page_size = parse_u32("AFROSPY_DATASET_PAGE_SIZE", "200")?;

    let max_limit = parse_u32("AFROSPY_MAX_LIMIT", "30")?;
    if max_limit == 0 {
        return Err(invalid(
            "AFROSPY_MAX_LIMIT",
            "must be greater than zero".to_string(),
        ));
    }

    let default_country = or_default("AFROSPY_DEFAULT_COUNTRY", "TD")
        .trim()
        .to_ascii_uppercase();
    if !ALLOWED_COUNTRIES.contains(&default_country.as_str()) {
        return Err(invalid(
            "AFROSPY_DEFAULT_COUNTRY",
            format!("{default_country} is not in the country allow-list"),
        ));
    }

    let on_disconnect = parse_disconnect_policy(&or_default("AFROSPY_ON_DISCONNECT", "detach"))?;
    let rate_limit_per_min = parse_usize("AFROSPY_RATE_LIMIT_PER_MIN", "20")?;
    if rate_limit_per_min == 0 {
        return Err(invalid(
            "AFROSPY_RATE_LIMIT_PER_MIN",
            "must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        apify_token,
        apify_actor_id,
        apify_base_url,
        supabase_url,
        supabase_key,
        http_timeout_secs,
        user_agent,
        poll_interval_secs,
        poll_timeout_secs,
        dataset_page_size,
        max_limit,
        default_country,
        on_disconnect,
        rate_limit_per_min,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AFROSPY_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_disconnect_policy(s: &str) -> Result<DisconnectPolicy, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "detach" => Ok(DisconnectPolicy::Detach),
        "cancel" => Ok(DisconnectPolicy::Cancel),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AFROSPY_ON_DISCONNECT".to_string(),
            reason: format!("expected 'detach' or 'cancel', got '{other}'"),
        }),
    }
}
