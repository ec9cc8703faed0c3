//! Record store capability.
//!
//! Durability is delegated to whatever backend implements [`RecordStore`].
//! The core only needs append and query; no transactional guarantees across
//! records are assumed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error types for record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend is not reachable
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Query could not be executed
    #[error("Query failed: {0}")]
    Query(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Kind of durable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// A policy decision with its governance metadata
    GovernanceDecision,
    /// A fine-grained audit log entry
    AuditLog,
    /// A system integrity report
    IntegrityReport,
}

impl RecordType {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GovernanceDecision => "governance_decision",
            Self::AuditLog => "audit_log",
            Self::IntegrityReport => "integrity_report",
        }
    }
}

/// An append-only record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique record ID
    pub id: String,
    /// Record type
    pub record_type: RecordType,
    /// Record fields
    pub fields: Map<String, Value>,
    /// When the record was written
    pub recorded_at: DateTime<Utc>,
}

impl Record {
    /// Create a record with a fresh ID.
    pub fn new(record_type: RecordType, fields: Map<String, Value>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            record_type,
            fields,
            recorded_at: Utc::now(),
        }
    }

    /// Create a record from any serializable value.
    ///
    /// Non-object values are stored under a `value` field.
    pub fn from_serializable(record_type: RecordType, value: &impl Serialize) -> Result<Self> {
        let fields = match serde_json::to_value(value)? {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Ok(Self::new(record_type, fields))
    }

    /// Builder: set the record ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder: set the record timestamp.
    pub fn recorded_at(mut self, at: DateTime<Utc>) -> Self {
        self.recorded_at = at;
        self
    }

    /// Get a field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a boolean field (missing or non-boolean is false).
    pub fn flag(&self, name: &str) -> bool {
        self.field(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Get a numeric field.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(Value::as_f64)
    }

    /// Decode the fields into a typed value.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

/// Filter for [`RecordStore::query`].
#[derive(Debug, Clone)]
pub struct RecordQuery {
    /// Record type to match
    pub record_type: RecordType,
    /// Fields that must equal the given values
    pub field_equals: Vec<(String, Value)>,
    /// Inclusive lower bound on `recorded_at`
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `recorded_at`
    pub until: Option<DateTime<Utc>>,
    /// Maximum records to return (newest first)
    pub limit: Option<usize>,
}

impl RecordQuery {
    /// Query all records of a type.
    pub fn new(record_type: RecordType) -> Self {
        Self {
            record_type,
            field_equals: Vec::new(),
            since: None,
            until: None,
            limit: None,
        }
    }

    /// Builder: require a field value.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field_equals.push((name.into(), value.into()));
        self
    }

    /// Builder: only records at or after `since`.
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Builder: only records before `until`.
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Builder: cap the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a record satisfies the filter (ignores `limit`).
    pub fn matches(&self, record: &Record) -> bool {
        if record.record_type != self.record_type {
            return false;
        }
        if self.since.is_some_and(|since| record.recorded_at < since) {
            return false;
        }
        if self.until.is_some_and(|until| record.recorded_at >= until) {
            return false;
        }
        self.field_equals
            .iter()
            .all(|(name, value)| record.field(name) == Some(value))
    }
}

/// Append-only durable store.
///
/// Appends are idempotent by record ID: re-appending an existing ID is a
/// no-op that returns the ID.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append a record, returning its ID.
    async fn append(&self, record: Record) -> Result<String>;

    /// Query records, newest first.
    async fn query(&self, query: &RecordQuery) -> Result<Vec<Record>>;

    /// Check if the store is reachable.
    async fn is_available(&self) -> bool;
}
