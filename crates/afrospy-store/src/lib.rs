//! Persistence of normalized ads.
//!
//! [`AdSink`] is the seam the pipeline writes through. [`SupabaseStore`]
//! upserts into the hosted `ads` table; [`MemoryStore`] keeps rows in
//! process for dry runs and tests.

pub mod error;
pub mod memory;
pub mod supabase;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use afrospy_core::AdRecord;
use async_trait::async_trait;

/// Destination for normalized ads.
///
/// Implementations resolve conflicts on [`AdRecord::conflict_key`]: writing
/// a record whose key already exists replaces the stored row.
#[async_trait]
pub trait AdSink: Send + Sync {
    /// Writes one record. Never retried by callers.
    async fn upsert_ad(&self, ad: &AdRecord) -> Result<(), StoreError>;
}
