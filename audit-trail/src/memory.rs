//! In-memory record store.
//!
//! Keeps every record for the lifetime of the process. Useful for tests and
//! single-node deployments; availability can be toggled to exercise outage
//! handling.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;

use crate::store::{Record, RecordQuery, RecordStore, RecordType, Result, StoreError};

#[derive(Default)]
struct Records {
    /// Append order
    log: Vec<Record>,
    /// Ids present in `log`
    ids: HashSet<String>,
}

/// Record store backed by process memory.
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Records>>,
    /// Simulated reachability
    available: AtomicBool,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Records::default())),
            available: AtomicBool::new(true),
        }
    }

    /// Mark the store reachable or unreachable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Total record count.
    pub async fn len(&self) -> usize {
        self.records.read().await.log.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.log.is_empty()
    }

    /// Count of records of one type.
    pub async fn count(&self, record_type: RecordType) -> usize {
        let records = self.records.read().await;
        records.log.iter().filter(|r| r.record_type == record_type).count()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store marked unavailable".to_string()))
        }
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn append(&self, record: Record) -> Result<String> {
        self.ensure_available()?;

        let mut records = self.records.write().await;
        if !records.ids.insert(record.id.clone()) {
            trace!(record_id = %record.id, "Record already stored");
            return Ok(record.id);
        }

        let id = record.id.clone();
        trace!(record_id = %id, record_type = record.record_type.as_str(), "Appending record");
        records.log.push(record);
        Ok(id)
    }

    async fn query(&self, query: &RecordQuery) -> Result<Vec<Record>> {
        self.ensure_available()?;

        let records = self.records.read().await;
        let mut matched: Vec<Record> = records.log.iter().filter(|r| query.matches(r)).cloned().collect();
        // Newest first; append order breaks ties.
        matched.reverse();
        matched.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
