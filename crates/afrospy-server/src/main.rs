mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use afrospy_apify::{ApifyClient, PollPolicy};
use afrospy_core::TriggerPolicy;
use afrospy_ingest::Ingestor;
use afrospy_store::SupabaseStore;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = afrospy_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let actor = ApifyClient::from_app_config(&config)?;
    let store = SupabaseStore::from_app_config(&config)?;
    let ingestor = Ingestor::new(
        Arc::new(actor),
        Arc::new(store),
        PollPolicy::from_app_config(&config),
    );

    let state = AppState {
        ingestor,
        policy: TriggerPolicy::from_app_config(&config),
        on_disconnect: config.on_disconnect,
    };
    let rate_limit = RateLimitState::new(config.rate_limit_per_min, Duration::from_secs(60));
    let app = build_app(state, rate_limit);

    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        on_disconnect = %config.on_disconnect,
        "afrospy-server listening"
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
