//! Policy decision engine.
//!
//! Runs the three rule evaluators for one operation and composes a single
//! approve/deny [`Decision`]. Rejection is expressed as `approved = false`
//! with reasons; only malformed operations produce an error.

use tracing::{debug, info};

use crate::config::PolicyConfig;
use crate::decision::{
    ConsentVerdict, Decision, DecisionMode, LiberationVerdict, SovereigntyVerdict,
};
use crate::evaluators::{ConsentEvaluator, LiberationEvaluator, SovereigntyEvaluator};
use crate::types::{Operation, Result};

/// Reasons attached to every approved decision, in order.
pub const APPROVAL_REASONS: [&str; 4] = [
    "Operation advances community liberation and empowerment",
    "Creator sovereignty and community ownership are preserved",
    "Community consent has been obtained",
    "Operation complies with platform governance policy",
];

/// Instructions attached to every approved decision, in order.
pub const BASE_INSTRUCTIONS: [&str; 3] = [
    "Record the decision in the governance audit trail before executing",
    "Preserve creator ownership and control over affected data",
    "Keep operation details visible to the affected community",
];

/// Stateless policy engine.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    consent: ConsentEvaluator,
    sovereignty: SovereigntyEvaluator,
    liberation: LiberationEvaluator,
}

impl PolicyEngine {
    /// Create with default policy.
    pub fn new() -> Self {
        Self::with_config(&PolicyConfig::default())
    }

    /// Create from policy configuration.
    pub fn with_config(config: &PolicyConfig) -> Self {
        Self {
            consent: ConsentEvaluator::with_config(config),
            sovereignty: SovereigntyEvaluator::with_config(config),
            liberation: LiberationEvaluator::with_config(config),
        }
    }

    /// Evaluate an operation on the normal path.
    pub fn evaluate(&self, operation: &Operation) -> Result<Decision> {
        self.evaluate_in_mode(operation, DecisionMode::Normal)
    }

    /// Evaluate an operation, tagging the decision with the path it took.
    ///
    /// The mode is recorded only; the verdict depends solely on the
    /// operation and the evaluators.
    pub fn evaluate_in_mode(&self, operation: &Operation, mode: DecisionMode) -> Result<Decision> {
        operation.validate()?;

        let liberation = self.liberation.evaluate(operation);
        let sovereignty = self.sovereignty.evaluate(operation);
        let consent = self.consent.evaluate(operation);

        debug!(
            kind = %operation.kind,
            liberation_valid = liberation.valid,
            empowerment = liberation.empowerment_score,
            sovereignty_maintained = sovereignty.maintained,
            consent_obtained = consent.obtained,
            mechanism = consent.mechanism.as_str(),
            "Rule evaluators completed"
        );

        let approved = liberation.valid && sovereignty.maintained && consent.obtained;
        let reasons = compose_reasons(approved, &liberation, &sovereignty, &consent);
        let implementation_instructions = approved.then(|| build_instructions(operation));

        let decision = Decision {
            id: uuid::Uuid::new_v4().to_string(),
            approved,
            reasons,
            liberation,
            sovereignty,
            consent,
            operation_kind: operation.kind,
            mode,
            timestamp: chrono::Utc::now(),
            implementation_instructions,
        };

        info!(
            decision_id = %decision.id,
            kind = %operation.kind,
            approved = decision.approved,
            mode = ?mode,
            "Policy decision made"
        );

        Ok(decision)
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Liberation issues first, then sovereignty, then consent.
fn compose_reasons(
    approved: bool,
    liberation: &LiberationVerdict,
    sovereignty: &SovereigntyVerdict,
    consent: &ConsentVerdict,
) -> Vec<String> {
    if approved {
        return APPROVAL_REASONS.iter().map(|r| r.to_string()).collect();
    }

    let mut reasons = liberation.issues.clone();
    if !sovereignty.maintained {
        reasons.push(format!(
            "Sovereignty requirements not met: {}",
            sovereignty.issues.join("; ")
        ));
    }
    if !consent.obtained {
        let detail = consent
            .issue
            .as_deref()
            .unwrap_or("no consent mechanism applied");
        reasons.push(format!("Community consent not obtained: {detail}"));
    }
    reasons
}

fn build_instructions(operation: &Operation) -> Vec<String> {
    let mut instructions: Vec<String> = BASE_INSTRUCTIONS.iter().map(|i| i.to_string()).collect();

    if operation.audit_trail_required() {
        instructions.push("Write every step of this operation to the fine-grained audit log".to_string());
    }

    if let Some(sharing) = &operation.revenue_sharing {
        let mut split = format!(
            "Distribute revenue as creator {}%, community {}%",
            sharing.creator_share, sharing.community_share
        );
        if let Some(platform) = sharing.platform_share {
            split.push_str(&format!(", platform {platform}%"));
        }
        if sharing.transparent_accounting {
            split.push_str(" with accounting published to the community");
        }
        instructions.push(split);
    }

    if let Some(backup) = &operation.backup_config {
        if !backup.encrypted {
            instructions.push("Encrypt backup data before it leaves community infrastructure".to_string());
        }
    }

    instructions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        CommunityVote, ComplianceError, LiberationCriteria, LiberationInput, OperationKind,
        RevenueSharing, SovereigntyRules,
    };

    fn content_operation(creator: f64, community: f64) -> Operation {
        Operation::builder()
            .kind(OperationKind::ContentStorage)
            .payload("content-42")
            .revenue_sharing(RevenueSharing::new(creator, community))
            .liberation_criteria(LiberationCriteria::all())
            .build()
            .unwrap()
    }

    #[test]
    fn test_compliant_content_is_approved() {
        let decision = PolicyEngine::new().evaluate(&content_operation(80.0, 20.0)).unwrap();
        assert!(decision.approved);
        assert!(decision.sovereignty.revenue_share_compliant);
        assert_eq!(decision.reasons, APPROVAL_REASONS.to_vec());
        assert_eq!(decision.mode, DecisionMode::Normal);

        let instructions = decision.implementation_instructions.unwrap();
        assert_eq!(instructions.len(), 4);
        assert!(instructions[3].contains("creator 80%"));
    }

    #[test]
    fn test_low_creator_share_is_rejected_with_values() {
        let decision = PolicyEngine::new().evaluate(&content_operation(60.0, 20.0)).unwrap();
        assert!(!decision.approved);
        assert!(decision.implementation_instructions.is_none());
        assert!(decision
            .reasons
            .iter()
            .any(|r| r.contains("60") && r.contains("75")));
    }

    #[test]
    fn test_reason_ordering() {
        let mut operation = content_operation(50.0, 50.0);
        operation.liberation = LiberationInput::Provided(LiberationCriteria {
            empowers_community: false,
            ..LiberationCriteria::all()
        });
        operation.community_vote = Some(CommunityVote {
            eligible_voters: 5,
            votes_for: 1,
            votes_against: 4,
            abstentions: 0,
        });

        let decision = PolicyEngine::new().evaluate(&operation).unwrap();
        assert!(!decision.approved);
        assert_eq!(decision.reasons.len(), 4);
        assert_eq!(decision.reasons[0], "Operation does not empower the community");
        assert!(decision.reasons[1].starts_with("Empowerment score"));
        assert!(decision.reasons[2].starts_with("Sovereignty requirements not met"));
        assert!(decision.reasons[3].starts_with("Community consent not obtained"));
    }

    #[test]
    fn test_missing_liberation_rejected_for_content() {
        let operation = Operation::builder()
            .kind(OperationKind::ContentStorage)
            .payload("content-1")
            .revenue_sharing(RevenueSharing::new(80.0, 20.0))
            .build()
            .unwrap();
        let decision = PolicyEngine::new().evaluate(&operation).unwrap();
        assert!(!decision.approved);
        assert_eq!(decision.liberation.empowerment_score, 0.5);
    }

    #[test]
    fn test_approved_iff_all_verdicts_pass() {
        let engine = PolicyEngine::new();
        let operations = vec![
            content_operation(80.0, 20.0),
            content_operation(70.0, 30.0),
            Operation::builder()
                .kind(OperationKind::Backup)
                .payload("snapshot")
                .build()
                .unwrap(),
            Operation::builder()
                .kind(OperationKind::Export)
                .payload("dataset")
                .sovereignty_rules(SovereigntyRules {
                    control_restricted: true,
                    ..Default::default()
                })
                .liberation_criteria(LiberationCriteria::all())
                .build()
                .unwrap(),
        ];
        for operation in &operations {
            let decision = engine.evaluate(operation).unwrap();
            assert_eq!(decision.approved, decision.all_verdicts_pass());
        }
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let engine = PolicyEngine::new();
        let operation = content_operation(60.0, 40.0);
        let first = engine.evaluate(&operation).unwrap();
        let second = engine.evaluate(&operation).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.approved, second.approved);
        assert_eq!(first.reasons, second.reasons);
        assert_eq!(first.liberation, second.liberation);
        assert_eq!(first.sovereignty, second.sovereignty);
        assert_eq!(first.consent, second.consent);
        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn test_audit_instruction_when_requested() {
        let mut operation = content_operation(90.0, 10.0);
        operation.sovereignty_rules = Some(SovereigntyRules {
            audit_trail_required: true,
            ..Default::default()
        });
        let decision = PolicyEngine::new().evaluate(&operation).unwrap();
        let instructions = decision.implementation_instructions.unwrap();
        assert!(instructions.iter().any(|i| i.contains("audit log")));
    }

    #[test]
    fn test_structural_error_is_not_rejection() {
        let mut operation = content_operation(80.0, 20.0);
        operation.payload = String::new();
        let err = PolicyEngine::new().evaluate(&operation).unwrap_err();
        assert!(matches!(err, ComplianceError::MissingField("payload")));
    }

    #[test]
    fn test_mode_does_not_change_verdict() {
        let engine = PolicyEngine::new();
        let operation = content_operation(80.0, 20.0);
        let normal = engine.evaluate(&operation).unwrap();
        let emergency = engine
            .evaluate_in_mode(&operation, DecisionMode::Emergency)
            .unwrap();
        assert_eq!(emergency.mode, DecisionMode::Emergency);
        assert_eq!(normal.fingerprint(), emergency.fingerprint());
    }
}
