//! Apify actor client: launch a Facebook Ad Library scrape, poll the run,
//! and download its dataset.

pub mod actor;
pub mod client;
pub mod error;
pub mod poll;
pub mod search_url;
pub mod types;

pub use actor::ScrapeActor;
pub use client::{ApifyClient, DEFAULT_BASE_URL, DEFAULT_DATASET_PAGE_SIZE, DEFAULT_USER_AGENT};
pub use error::ApifyError;
pub use poll::{wait_for_run, PollError, PollPolicy, PollState, RunStatusSource};
pub use search_url::ad_library_search_url;
pub use types::{RunData, RunStatus};
