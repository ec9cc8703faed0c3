//! Audit Trail - append-only persistence for governance decisions
//!
//! Provides:
//! - The [`RecordStore`] capability every durable backend implements
//! - An in-memory store for tests and single-node deployments
//! - The best-effort [`AuditRecorder`] used after every policy decision
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌────────────────────┐
//! │  AuditRecorder   │────▶│ dyn RecordStore    │
//! │  (two writes per │     │ (append + query)   │
//! │   decision)      │     └─────────┬──────────┘
//! └──────────────────┘               │
//!                          ┌─────────┴──────────┐
//!                          ▼                    ▼
//!                   InMemoryRecordStore   external backends
//! ```

pub mod memory;
pub mod recorder;
pub mod store;

// Re-export main types for convenience
pub use memory::InMemoryRecordStore;
pub use recorder::{AuditEntry, AuditRecorder};
pub use store::{Record, RecordQuery, RecordStore, RecordType, Result, StoreError};
