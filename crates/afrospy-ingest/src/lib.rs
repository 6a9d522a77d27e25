//! Ad ingestion: turns a keyword into scored rows in the `ads` table.

pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod scorer;

pub use error::IngestError;
pub use normalize::{normalize_item, NormalizedAd};
pub use pipeline::{IngestParams, IngestSummary, Ingestor};
pub use progress::{ChannelSink, ProgressEvent, ProgressSink, TracingSink, VecSink};
pub use scorer::{trend_score, trend_score_at};
