//! Read store with file-based JSON persistence
//!
//! Directory layout:
//! ```text
//! ~/.readlog/
//! └── reads/
//!     ├── read-1.json
//!     ├── read-2.json
//!     ├── ...
//!     └── next-id
//! ```
//!
//! Ids come from a monotonic sequence and are never reused, even after the
//! newest read is deleted. The sequence also stays above every
//! `read-<id>.json` on disk, including files that failed to load.

use crate::reads::types::*;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// Shortest title query the duplicate lookup answers
pub const MIN_SEARCH_LEN: usize = 2;

/// Maximum number of title matches returned by the duplicate lookup
pub const MAX_SEARCH_RESULTS: usize = 3;

/// File holding the next id to hand out
const SEQUENCE_FILE: &str = "next-id";

/// In-memory read store backed by JSON files
pub struct ReadStore {
    reads_dir: PathBuf,
    reads: Arc<RwLock<Vec<ReadRecord>>>,
    next_id: AtomicU64,
}

impl ReadStore {
    /// Create a new read store at the given base directory
    pub async fn new(base_dir: PathBuf) -> std::io::Result<Self> {
        let reads_dir = base_dir.join("reads");
        tokio::fs::create_dir_all(&reads_dir).await?;

        let (reads, highest_on_disk) = Self::load_json_files(&reads_dir);
        let next_id = Self::load_sequence(&reads_dir).max(highest_on_disk + 1);
        tracing::info!(
            "Loaded {} reads from {} (next id {})",
            reads.len(),
            reads_dir.display(),
            next_id
        );

        Ok(Self {
            reads_dir,
            reads: Arc::new(RwLock::new(reads)),
            next_id: AtomicU64::new(next_id),
        })
    }

    /// Default base directory (~/.readlog/)
    pub fn default_dir() -> PathBuf {
        dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".readlog")
    }

    // =========================================================================
    // Read CRUD
    // =========================================================================

    /// All reads, ordered by finish date then title (undated reads last)
    pub async fn list(&self) -> Vec<ReadRecord> {
        let mut reads = self.reads.read().await.clone();
        reads.sort_by(|a, b| {
            (a.finish_date.is_none(), a.finish_date, &a.title).cmp(&(
                b.finish_date.is_none(),
                b.finish_date,
                &b.title,
            ))
        });
        reads
    }

    /// Get a single read by ID
    pub async fn get(&self, id: ReadId) -> Option<ReadRecord> {
        let reads = self.reads.read().await;
        reads.iter().find(|r| r.id == id).cloned()
    }

    /// Number of stored reads
    pub async fn len(&self) -> usize {
        self.reads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reads.read().await.is_empty()
    }

    /// Case-insensitive title lookup used to spot an already-logged title
    ///
    /// Queries shorter than [`MIN_SEARCH_LEN`] characters return nothing.
    pub async fn search_titles(&self, query: &str) -> Vec<ReadRecord> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        self.list()
            .await
            .into_iter()
            .filter(|r| r.title.to_lowercase().contains(&needle))
            .take(MAX_SEARCH_RESULTS)
            .collect()
    }

    /// Validate a draft, assign the next id and persist it
    pub async fn create(&self, draft: ReadDraft) -> Result<ReadRecord> {
        let draft = draft.validate()?;

        let mut reads = self.reads.write().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.save_sequence(id + 1).await;
        let record = draft.into_record(id);

        self.persist(&record).await?;
        reads.push(record.clone());

        tracing::info!("Created read {} ({})", record.id, record.title);
        Ok(record)
    }

    /// Delete a read by id
    pub async fn delete(&self, id: ReadId) -> Result<()> {
        let mut reads = self.reads.write().await;
        let index = reads
            .iter()
            .position(|r| r.id == id)
            .ok_or(Error::NotFound(id))?;

        match tokio::fs::remove_file(self.read_path(id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Read {} had no file on disk", id);
            }
            Err(e) => return Err(e.into()),
        }

        let removed = reads.remove(index);
        tracing::info!("Deleted read {} ({})", removed.id, removed.title);
        Ok(())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn read_path(&self, id: ReadId) -> PathBuf {
        self.reads_dir.join(format!("read-{}.json", id))
    }

    /// Write a new read to disk; never replaces an existing file
    async fn persist(&self, record: &ReadRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        let path = self.read_path(record.id);

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;
        let mut file = match file {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                tracing::warn!("Refusing to overwrite {}", path.display());
                return Err(Error::Store(format!(
                    "{} already exists",
                    path.display()
                )));
            }
            Err(e) => {
                tracing::warn!("Failed to persist read {}: {}", record.id, e);
                return Err(Error::Io(e));
            }
        };

        let written = match file.write_all(json.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        written.map_err(|e| {
            tracing::warn!("Failed to persist read {}: {}", record.id, e);
            Error::Io(e)
        })
    }

    /// Record the next id so it survives restarts
    async fn save_sequence(&self, next_id: ReadId) {
        let path = self.reads_dir.join(SEQUENCE_FILE);
        if let Err(e) = tokio::fs::write(&path, next_id.to_string()).await {
            tracing::warn!("Failed to write {}: {}", path.display(), e);
        }
    }

    /// Saved next id, or 1 when there is none
    fn load_sequence(dir: &Path) -> ReadId {
        let path = dir.join(SEQUENCE_FILE);
        match std::fs::read_to_string(&path) {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring unparsable {}", path.display());
                1
            }),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
                1
            }
        }
    }

    /// Id encoded in a `read-<id>.json` file name
    fn id_from_path(path: &Path) -> Option<ReadId> {
        path.file_stem()?
            .to_str()?
            .strip_prefix("read-")?
            .parse()
            .ok()
    }

    /// Load all JSON files from a directory, skipping unreadable ones
    ///
    /// Also returns the highest id found on disk, counting file names of
    /// skipped files, so new ids never land on an existing file.
    fn load_json_files(dir: &Path) -> (Vec<ReadRecord>, ReadId) {
        let mut items: Vec<ReadRecord> = Vec::new();
        let mut highest: ReadId = 0;
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read directory {}: {}", dir.display(), e);
                }
                return (items, highest);
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = Self::id_from_path(&path) {
                highest = highest.max(id);
            }
            match std::fs::read_to_string(&path) {
                Ok(data) => match serde_json::from_str::<ReadRecord>(&data) {
                    Ok(item) => {
                        if items.iter().any(|r| r.id == item.id) {
                            tracing::warn!(
                                "Skipping {}: duplicate read id {}",
                                path.display(),
                                item.id
                            );
                            continue;
                        }
                        highest = highest.max(item.id);
                        items.push(item);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }

        (items, highest)
    }
}
