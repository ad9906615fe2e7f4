//! Record source boundary
//!
//! The dashboard only ever sees records through this trait, whether they
//! live in the local store or behind the HTTP API.

use crate::reads::{ReadDraft, ReadId, ReadRecord, ReadStore};
use crate::Result;
use async_trait::async_trait;

/// Read/append/delete access to the canonical read collection
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Full current collection; callers replace their snapshot with it
    async fn fetch_all(&self) -> Result<Vec<ReadRecord>>;

    /// Append a read; the source assigns the id
    async fn create(&self, draft: ReadDraft) -> Result<ReadRecord>;

    /// Remove exactly one read
    async fn delete(&self, id: ReadId) -> Result<()>;
}

#[async_trait]
impl RecordSource for ReadStore {
    async fn fetch_all(&self) -> Result<Vec<ReadRecord>> {
        Ok(self.list().await)
    }

    async fn create(&self, draft: ReadDraft) -> Result<ReadRecord> {
        ReadStore::create(self, draft).await
    }

    async fn delete(&self, id: ReadId) -> Result<()> {
        ReadStore::delete(self, id).await
    }
}
