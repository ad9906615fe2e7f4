//! Dashboard controller: record snapshot plus filter state
//!
//! The snapshot is always a full copy of the source's collection. Refreshes
//! may overlap; each takes a ticket before fetching and a result is only
//! installed if no newer refresh has already landed, so a slow response can
//! never overwrite a fresher one. Failed boundary calls leave both the
//! snapshot and the filters as they were.

use super::filter::{ContentType, FilterAction, FilterState};
use super::selection::{reads_table, select};
use super::source::RecordSource;
use super::stats::{aggregate, ReadingStats};
use crate::reads::{ReadDraft, ReadId, ReadRecord};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Filters, working-set size and statistics as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub filter: FilterState,
    pub count: usize,
    pub stats: ReadingStats,
}

impl DashboardView {
    /// Select and aggregate `records` under `filter`
    pub fn compute(records: &[ReadRecord], filter: &FilterState) -> Self {
        let working_set = select(records, filter);
        Self {
            filter: filter.clone(),
            count: working_set.len(),
            stats: aggregate(&working_set),
        }
    }
}

/// Result of a refresh that reached the source successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetched collection replaced the snapshot
    Installed { records: usize },
    /// A newer refresh had already been installed; this result was dropped
    Stale,
}

struct Snapshot {
    /// Ticket of the refresh that produced `records`; 0 before the first load
    ticket: u64,
    records: Arc<Vec<ReadRecord>>,
}

/// Owns the current snapshot and filter state for one dashboard
pub struct Dashboard {
    source: Arc<dyn RecordSource>,
    snapshot: RwLock<Snapshot>,
    filter: RwLock<FilterState>,
    next_ticket: AtomicU64,
}

impl Dashboard {
    /// Create a dashboard with an empty snapshot; call [`Dashboard::refresh`] to load
    pub fn new(source: Arc<dyn RecordSource>, filter: FilterState) -> Self {
        Self {
            source,
            snapshot: RwLock::new(Snapshot {
                ticket: 0,
                records: Arc::new(Vec::new()),
            }),
            filter: RwLock::new(filter),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Replace the snapshot with the source's full current collection
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);

        let records = match self.source.fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Refresh {} failed, keeping previous snapshot: {}", ticket, e);
                return Err(e);
            }
        };

        let mut snapshot = self.snapshot.write().await;
        if ticket < snapshot.ticket {
            tracing::debug!(
                "Dropping refresh {} ({} reads), snapshot is from refresh {}",
                ticket,
                records.len(),
                snapshot.ticket
            );
            return Ok(RefreshOutcome::Stale);
        }

        let count = records.len();
        *snapshot = Snapshot {
            ticket,
            records: Arc::new(records),
        };
        tracing::debug!("Installed refresh {} with {} reads", ticket, count);
        Ok(RefreshOutcome::Installed { records: count })
    }

    /// Current snapshot
    pub async fn records(&self) -> Arc<Vec<ReadRecord>> {
        self.snapshot.read().await.records.clone()
    }

    /// Current filter state
    pub async fn filter(&self) -> FilterState {
        self.filter.read().await.clone()
    }

    /// Apply a filter transition and return the new state
    pub async fn apply(&self, action: FilterAction) -> FilterState {
        let mut filter = self.filter.write().await;
        filter.apply(action);
        filter.clone()
    }

    pub async fn toggle_year(&self, year: i32) -> FilterState {
        self.apply(FilterAction::ToggleYear(year)).await
    }

    pub async fn select_only_year(&self, year: i32) -> FilterState {
        self.apply(FilterAction::SelectOnlyYear(year)).await
    }

    pub async fn toggle_type(&self, content: ContentType) -> FilterState {
        self.apply(FilterAction::ToggleType(content)).await
    }

    /// Statistics for the current snapshot under the current filters
    pub async fn view(&self) -> DashboardView {
        let records = self.records().await;
        let filter = self.filter().await;
        DashboardView::compute(&records, &filter)
    }

    /// Working set ordered by finish date
    pub async fn reads_table(&self) -> Vec<ReadRecord> {
        let records = self.records().await;
        let filter = self.filter().await;
        let working_set = select(&records, &filter);
        reads_table(&working_set).into_iter().cloned().collect()
    }

    /// Create a read through the source, then refresh
    pub async fn create(&self, draft: ReadDraft) -> Result<ReadRecord> {
        let record = self.source.create(draft).await?;
        if let Err(e) = self.refresh().await {
            tracing::warn!("Read {} created but refresh failed: {}", record.id, e);
        }
        Ok(record)
    }

    /// Delete a read through the source, then refresh
    pub async fn delete(&self, id: ReadId) -> Result<()> {
        self.source.delete(id).await?;
        if let Err(e) = self.refresh().await {
            tracing::warn!("Read {} deleted but refresh failed: {}", id, e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::testing::read;
    use crate::reads::store::tests::make_draft;
    use crate::reads::{BookType, ReadStore};
    use crate::Error;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    /// Source whose first fetch blocks until released and whose fetches can be made to fail
    struct ScriptedSource {
        calls: AtomicUsize,
        release_first: Notify,
        block_first: bool,
        responses: Mutex<Vec<Result<Vec<ReadRecord>>>>,
    }

    impl ScriptedSource {
        fn new(block_first: bool, responses: Vec<Result<Vec<ReadRecord>>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                release_first: Notify::new(),
                block_first,
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl RecordSource for ScriptedSource {
        async fn fetch_all(&self) -> Result<Vec<ReadRecord>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let response = self.responses.lock().unwrap().remove(0);
            if call == 0 && self.block_first {
                self.release_first.notified().await;
            }
            response
        }

        async fn create(&self, _draft: ReadDraft) -> Result<ReadRecord> {
            Err(Error::Store("read-only".to_string()))
        }

        async fn delete(&self, id: ReadId) -> Result<()> {
            Err(Error::NotFound(id))
        }
    }

    fn snapshot_a() -> Vec<ReadRecord> {
        vec![read(1, "Old", BookType::Novel, Some("2024-01-01"))]
    }

    fn snapshot_b() -> Vec<ReadRecord> {
        vec![
            read(1, "Old", BookType::Novel, Some("2024-01-01")),
            read(2, "New", BookType::Manga, Some("2024-06-01")),
        ]
    }

    #[tokio::test]
    async fn test_refresh_installs_snapshot() {
        let source = Arc::new(ScriptedSource::new(false, vec![Ok(snapshot_b())]));
        let dashboard = Dashboard::new(source, FilterState::default());

        assert!(dashboard.records().await.is_empty());
        let outcome = dashboard.refresh().await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Installed { records: 2 });
        assert_eq!(dashboard.view().await.count, 2);
    }

    #[tokio::test]
    async fn test_stale_refresh_is_discarded() {
        let source = Arc::new(ScriptedSource::new(
            true,
            vec![Ok(snapshot_a()), Ok(snapshot_b())],
        ));
        let dashboard = Arc::new(Dashboard::new(source.clone(), FilterState::default()));

        let slow = tokio::spawn({
            let dashboard = dashboard.clone();
            async move { dashboard.refresh().await }
        });
        while source.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let fast = dashboard.refresh().await.unwrap();
        assert_eq!(fast, RefreshOutcome::Installed { records: 2 });

        source.release_first.notify_one();
        let slow = slow.await.unwrap().unwrap();
        assert_eq!(slow, RefreshOutcome::Stale);

        let records = dashboard.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "New");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot_and_filter() {
        let source = Arc::new(ScriptedSource::new(
            false,
            vec![Ok(snapshot_b()), Err(Error::Store("offline".to_string()))],
        ));
        let dashboard = Dashboard::new(source, FilterState::default());
        dashboard.refresh().await.unwrap();
        dashboard.select_only_year(2024).await;
        let before = dashboard.view().await;

        let result = dashboard.refresh().await;
        assert!(matches!(result, Err(Error::Store(_))));
        assert_eq!(dashboard.view().await, before);
    }

    #[tokio::test]
    async fn test_failed_create_and_delete_are_reported() {
        let source = Arc::new(ScriptedSource::new(false, vec![Ok(snapshot_a())]));
        let dashboard = Dashboard::new(source, FilterState::default());
        dashboard.refresh().await.unwrap();

        let result = dashboard.create(make_draft("Nope", "2024-01-01")).await;
        assert!(matches!(result, Err(Error::Store(_))));
        let result = dashboard.delete(7).await;
        assert!(matches!(result, Err(Error::NotFound(7))));
        assert_eq!(dashboard.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_filters_drive_view() {
        let source = Arc::new(ScriptedSource::new(false, vec![Ok(snapshot_b())]));
        let dashboard = Dashboard::new(source, FilterState::default());
        dashboard.refresh().await.unwrap();

        let filter = dashboard.toggle_type(ContentType::Books).await;
        assert!(!filter.is_type_active(ContentType::Books));
        let view = dashboard.view().await;
        assert_eq!(view.count, 1);
        assert_eq!(view.stats.book_types[0].book_type, BookType::Manga);

        dashboard.toggle_type(ContentType::Manga).await;
        let view = dashboard.view().await;
        assert_eq!(view.count, 0);
        assert_eq!(view.stats, ReadingStats::empty());

        dashboard.toggle_year(2024).await;
        dashboard.toggle_year(2024).await;
        assert_eq!(dashboard.filter().await.active_years().len(), 7);
    }

    #[tokio::test]
    async fn test_create_and_delete_refresh_from_store() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ReadStore::new(dir.path().to_path_buf()).await.unwrap());
        let dashboard = Dashboard::new(store, FilterState::new([2023, 2024]));

        let created = dashboard
            .create(make_draft("The Telling", "2023-09-14"))
            .await
            .unwrap();
        dashboard
            .create(make_draft("Gifts", "2024-02-02"))
            .await
            .unwrap();
        assert_eq!(dashboard.view().await.count, 2);

        dashboard.select_only_year(2023).await;
        let table = dashboard.reads_table().await;
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].title, "The Telling");

        dashboard.delete(created.id).await.unwrap();
        assert_eq!(dashboard.view().await.count, 0);
        assert_eq!(dashboard.records().await.len(), 1);
    }
}
