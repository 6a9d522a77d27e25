//! `POST /api/scraper`: runs an ingestion and streams its progress as
//! newline-delimited JSON.

use afrospy_core::{CancelFlag, DisconnectPolicy};
use afrospy_ingest::{ChannelSink, ProgressEvent, ProgressSink};
use axum::{
    body::{Body, Bytes},
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::mpsc;

use super::{parse_body, ApiError, AppState, TriggerRequest};

const NDJSON: &str = "application/x-ndjson";

pub(crate) async fn scraper(
    State(state): State<AppState>,
    payload: Result<Json<TriggerRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let params = parse_body(payload, &state.policy)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancelFlag::new();
    let sink = match state.on_disconnect {
        DisconnectPolicy::Detach => ChannelSink::new(tx),
        DisconnectPolicy::Cancel => ChannelSink::new(tx).cancel_on_disconnect(cancel.clone()),
    };

    sink.emit(ProgressEvent::Start {
        message: format!(
            "Starting scrape for \"{}\" ({})...",
            params.keyword, params.country
        ),
    });

    let ingestor = state.ingestor.clone();
    tokio::spawn(async move {
        let terminal = match ingestor.ingest(&params, &sink, &cancel).await {
            Ok(summary) => ProgressEvent::Done {
                code: 0,
                message: format!(
                    "Scrape finished: {} inserted, {} skipped, {} failed",
                    summary.inserted, summary.skipped, summary.failed
                ),
            },
            Err(e) => {
                tracing::warn!(error = %e, keyword = %params.keyword, "streamed ingestion failed");
                ProgressEvent::Error {
                    message: e.to_string(),
                }
            }
        };
        sink.emit(terminal);
    });

    let lines = futures::stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((ndjson_line(&event), rx))
    });

    Ok((
        [
            (header::CONTENT_TYPE, NDJSON),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(lines),
    )
        .into_response())
}

fn ndjson_line(event: &ProgressEvent) -> Result<Bytes, serde_json::Error> {
    let mut line = serde_json::to_vec(event)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}
