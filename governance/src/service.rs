//! PolicyService - evaluate an operation and record the decision.
//!
//! Two entry points share one engine and one recorder:
//! - [`PolicyService::submit`] honours the community approval precondition
//! - [`PolicyService::submit_emergency`] waives it and records why

use std::sync::Arc;
use tracing::{debug, warn};

use audit_trail::{AuditRecorder, RecordStore};
use compliance::{Decision, DecisionMode, GovernanceConfig, Operation, PolicyEngine};

use crate::error::{GovernanceError, Result};

/// A decision together with the audit ID it was recorded under.
#[derive(Debug, Clone)]
pub struct RecordedDecision {
    /// The engine's verdict
    pub decision: Decision,
    /// Audit ID, returned even if the store rejected the writes
    pub audit_id: String,
}

impl RecordedDecision {
    /// Whether the operation may proceed.
    pub fn approved(&self) -> bool {
        self.decision.approved
    }
}

/// Main entry point for policy decisions.
#[derive(Clone)]
pub struct PolicyService {
    engine: PolicyEngine,
    recorder: AuditRecorder,
}

impl PolicyService {
    /// Create with default configuration.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_config(store, &GovernanceConfig::default())
    }

    /// Create from governance configuration.
    pub fn with_config(store: Arc<dyn RecordStore>, config: &GovernanceConfig) -> Self {
        Self {
            engine: PolicyEngine::with_config(&config.policy),
            recorder: AuditRecorder::with_config(store, config.audit.clone()),
        }
    }

    /// Policy engine used for evaluation.
    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Recorder used after every decision.
    pub fn recorder(&self) -> &AuditRecorder {
        &self.recorder
    }

    /// Evaluate an operation on the normal path and record the decision.
    pub async fn submit(&self, operation: &Operation) -> Result<RecordedDecision> {
        let decision = self.engine.evaluate(operation)?;
        let audit_id = self.recorder.record(&decision, operation).await;

        debug!(decision_id = %decision.id, audit_id = %audit_id, "Normal decision submitted");

        Ok(RecordedDecision { decision, audit_id })
    }

    /// Evaluate an operation with the community approval precondition
    /// waived, recording the justification in the audit entry.
    ///
    /// Every evaluator still runs; only the vote requirement is lifted.
    pub async fn submit_emergency(
        &self,
        operation: &Operation,
        justification: &str,
    ) -> Result<RecordedDecision> {
        let justification = justification.trim();
        if justification.is_empty() {
            return Err(GovernanceError::InvalidRequest(
                "emergency override requires a justification".to_string(),
            ));
        }

        warn!(
            kind = %operation.kind,
            payload = %operation.payload,
            justification = %justification,
            "Emergency override requested"
        );

        let waived = operation.with_community_approval_waived();
        let decision = self
            .engine
            .evaluate_in_mode(&waived, DecisionMode::Emergency)?;
        let audit_id = self
            .recorder
            .record_with_justification(&decision, &waived, Some(justification))
            .await;

        warn!(
            decision_id = %decision.id,
            audit_id = %audit_id,
            approved = decision.approved,
            "Emergency decision recorded"
        );

        Ok(RecordedDecision { decision, audit_id })
    }
}
