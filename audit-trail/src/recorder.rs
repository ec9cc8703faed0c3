//! Audit recorder.
//!
//! Persists every policy decision as two append-only records: the
//! governance decision itself and a flat audit-log entry that integrity
//! probes read back later. Recording is fire-and-forget from the caller's
//! point of view: store failures are logged, never returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use compliance::{AuditConfig, Decision, DecisionMode, Operation, OperationKind};

use crate::store::{Record, RecordStore, RecordType, Result};

/// Fine-grained audit entry for one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Audit ID returned to the caller
    pub id: String,
    /// Decision this entry describes
    pub decision_id: String,
    /// Kind of operation decided on
    pub operation_kind: OperationKind,
    /// Payload reference of the operation
    pub payload: String,
    /// Decision outcome
    pub approved: bool,
    /// Sovereignty requirements were met
    pub sovereignty_checked: bool,
    /// Community consent was in place
    pub consent_verified: bool,
    /// Consent came from a vote or consensus
    pub democratic_process_followed: bool,
    /// Entry may be published
    pub public_visibility: bool,
    /// Entry is visible to the affected community
    pub community_visibility: bool,
    /// Normal or emergency path
    pub mode: DecisionMode,
    /// Why the emergency path was taken
    #[serde(default)]
    pub justification: Option<String>,
    /// Verdict fingerprint of the decision
    pub decision_fingerprint: String,
    /// Creator revenue share, for monetized operations
    #[serde(default)]
    pub creator_share: Option<f64>,
    /// Liberation criteria were declared
    pub liberation_criteria_provided: bool,
    /// Empowerment score of the decision
    pub empowerment_score: f64,
    /// Participation rate of the consent verdict
    pub participation_rate: f64,
    /// When the entry was created
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Build the entry describing `decision`.
    pub fn from_decision(
        id: impl Into<String>,
        decision: &Decision,
        operation: &Operation,
        config: &AuditConfig,
        justification: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            decision_id: decision.id.clone(),
            operation_kind: decision.operation_kind,
            payload: operation.payload.clone(),
            approved: decision.approved,
            sovereignty_checked: decision.sovereignty.maintained,
            consent_verified: decision.consent.obtained,
            democratic_process_followed: decision.consent.mechanism.is_democratic(),
            public_visibility: config.public_visibility,
            community_visibility: config.community_visibility,
            mode: decision.mode,
            justification: justification.map(str::to_string),
            decision_fingerprint: decision.fingerprint(),
            creator_share: operation.revenue_sharing.as_ref().map(|s| s.creator_share),
            liberation_criteria_provided: decision.liberation.criteria_provided,
            empowerment_score: decision.liberation.empowerment_score,
            participation_rate: decision.consent.participation_rate,
            recorded_at: Utc::now(),
        }
    }

    /// Decode an entry from an audit-log record.
    pub fn from_record(record: &Record) -> Result<Self> {
        record.decode()
    }

    /// Encode as an audit-log record keyed by the entry ID.
    pub fn to_record(&self) -> Result<Record> {
        Ok(Record::from_serializable(RecordType::AuditLog, self)?
            .with_id(self.id.clone())
            .recorded_at(self.recorded_at))
    }
}

/// Governance-decision record: the decision plus its audit metadata.
fn decision_record(audit_id: &str, decision: &Decision, operation: &Operation) -> Result<Record> {
    let mut record = Record::from_serializable(RecordType::GovernanceDecision, decision)?
        .with_id(decision.id.clone())
        .recorded_at(decision.timestamp);
    record
        .fields
        .insert("audit_id".to_string(), Value::String(audit_id.to_string()));
    record
        .fields
        .insert("payload".to_string(), Value::String(operation.payload.clone()));
    record.fields.insert(
        "fingerprint".to_string(),
        Value::String(decision.fingerprint()),
    );
    Ok(record)
}

/// Best-effort recorder for policy decisions.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn RecordStore>,
    config: AuditConfig,
}

impl AuditRecorder {
    /// Create with default audit configuration.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_config(store, AuditConfig::default())
    }

    /// Create with custom audit configuration.
    pub fn with_config(store: Arc<dyn RecordStore>, config: AuditConfig) -> Self {
        Self { store, config }
    }

    /// Underlying record store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Audit configuration.
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Record a decision, returning its audit ID.
    pub async fn record(&self, decision: &Decision, operation: &Operation) -> String {
        self.record_with_justification(decision, operation, None)
            .await
    }

    /// Record a decision with an emergency justification.
    ///
    /// Both writes are issued concurrently and awaited. The audit ID is
    /// returned even when the store rejects either write.
    pub async fn record_with_justification(
        &self,
        decision: &Decision,
        operation: &Operation,
        justification: Option<&str>,
    ) -> String {
        let audit_id = uuid::Uuid::new_v4().to_string();

        if !self.config.enabled {
            debug!(decision_id = %decision.id, audit_id = %audit_id, "Audit disabled, skipping writes");
            return audit_id;
        }

        let entry =
            AuditEntry::from_decision(&audit_id, decision, operation, &self.config, justification);

        let (decision_write, entry_write) = tokio::join!(
            self.append(decision_record(&audit_id, decision, operation)),
            self.append(entry.to_record()),
        );

        match (decision_write, entry_write) {
            (Ok(_), Ok(_)) => {
                info!(
                    decision_id = %decision.id,
                    audit_id = %audit_id,
                    approved = decision.approved,
                    "Decision recorded"
                );
            }
            (Err(e), Ok(_)) => {
                warn!(decision_id = %decision.id, audit_id = %audit_id, error = %e, "Governance decision write failed");
            }
            (Ok(_), Err(e)) => {
                warn!(decision_id = %decision.id, audit_id = %audit_id, error = %e, "Audit log write failed");
            }
            (Err(decision_err), Err(entry_err)) => {
                error!(
                    decision_id = %decision.id,
                    audit_id = %audit_id,
                    decision_error = %decision_err,
                    entry_error = %entry_err,
                    "Decision could not be recorded"
                );
            }
        }

        audit_id
    }

    /// Append an externally produced audit entry.
    pub async fn log_entry(&self, entry: AuditEntry) -> Result<String> {
        self.append(entry.to_record()).await
    }

    async fn append(&self, record: Result<Record>) -> Result<String> {
        self.store.append(record?).await
    }
}
