//! `POST /api/smart-task`: launch now, finish in the background.

use afrospy_core::CancelFlag;
use afrospy_ingest::TracingSink;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Serialize;

use super::{parse_body, ApiError, AppState, TriggerRequest};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Started {
    run_id: String,
    status: &'static str,
}

/// Starts the actor run synchronously so launch errors reach the caller,
/// then polls, fetches and stores on a detached task.
pub(crate) async fn smart_task(
    State(state): State<AppState>,
    payload: Result<Json<TriggerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Started>), ApiError> {
    let params = parse_body(payload, &state.policy)?;

    let run_id = state
        .ingestor
        .launch(&params, &TracingSink)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, keyword = %params.keyword, "smart-task launch failed");
            ApiError::internal(e.to_string())
        })?;

    let ingestor = state.ingestor.clone();
    let background_run_id = run_id.clone();
    tokio::spawn(async move {
        match ingestor
            .complete(&background_run_id, &params, &TracingSink, &CancelFlag::new())
            .await
        {
            Ok(summary) => tracing::info!(
                run_id = %background_run_id,
                inserted = summary.inserted,
                skipped = summary.skipped,
                failed = summary.failed,
                "background ingestion finished"
            ),
            Err(e) => tracing::error!(
                run_id = %background_run_id,
                error = %e,
                "background ingestion failed"
            ),
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(Started {
            run_id,
            status: "started",
        }),
    ))
}
