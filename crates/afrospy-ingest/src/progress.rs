//! Progress reporting for ingestion runs.
//!
//! The pipeline describes what it is doing through a [`ProgressSink`]. Each
//! entry point picks the sink that fits: tracing for background runs, a
//! channel for streamed responses, a vector for tests.

use std::sync::Mutex;

use afrospy_core::CancelFlag;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// One progress event. Serializes to the wire shape of the streaming
/// endpoint: `{"type": "...", "message": ..., "code": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressEvent {
    Start { message: String },
    Log { message: String },
    Warn { message: String },
    Error { message: String },
    Done { code: i32, message: String },
}

impl ProgressEvent {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            ProgressEvent::Start { message }
            | ProgressEvent::Log { message }
            | ProgressEvent::Warn { message }
            | ProgressEvent::Error { message }
            | ProgressEvent::Done { message, .. } => message,
        }
    }

    /// `true` for `error` and `done`, after which a stream closes.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Error { .. } | ProgressEvent::Done { .. })
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);

    fn log(&self, message: String) {
        self.emit(ProgressEvent::Log { message });
    }

    fn warn(&self, message: String) {
        self.emit(ProgressEvent::Warn { message });
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, event: ProgressEvent) {
        match &event {
            ProgressEvent::Warn { message } => tracing::warn!("{message}"),
            ProgressEvent::Error { message } => tracing::error!("{message}"),
            other => tracing::info!("{}", other.message()),
        }
    }
}

/// Sends events down an unbounded channel.
///
/// With [`ChannelSink::cancel_on_disconnect`], a send failing because the
/// receiver is gone trips the run's [`CancelFlag`].
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<ProgressEvent>,
    cancel_on_close: Option<CancelFlag>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self {
            tx,
            cancel_on_close: None,
        }
    }

    #[must_use]
    pub fn cancel_on_disconnect(mut self, cancel: CancelFlag) -> Self {
        self.cancel_on_close = Some(cancel);
        self
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        if self.tx.send(event).is_err() {
            if let Some(cancel) = &self.cancel_on_close {
                if !cancel.is_cancelled() {
                    tracing::info!("progress receiver dropped, cancelling run");
                    cancel.cancel();
                }
            }
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl VecSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|e| e.message().to_owned())
            .collect()
    }
}

impl ProgressSink for VecSink {
    fn emit(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }
}
