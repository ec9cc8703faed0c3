//! Decision records produced by the policy engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::types::OperationKind;

/// How community consent was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ConsentMechanism {
    /// Explicit community vote
    DemocraticVote,
    /// Unanimous agreement of every eligible member
    Consensus,
    /// Covered by standing delegated authority
    Delegated,
    /// Vote waived through the emergency path
    EmergencyOverride,
}

impl ConsentMechanism {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DemocraticVote => "democratic_vote",
            Self::Consensus => "consensus",
            Self::Delegated => "delegated",
            Self::EmergencyOverride => "emergency_override",
        }
    }

    /// Whether a democratic process produced the consent.
    pub fn is_democratic(&self) -> bool {
        matches!(self, Self::DemocraticVote | Self::Consensus)
    }
}

/// Path an operation took through the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    /// Community approval precondition honoured
    #[default]
    Normal,
    /// Community approval precondition waived
    Emergency,
}

/// Outcome of the liberation evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct LiberationVerdict {
    /// Operation is liberation-valid
    pub valid: bool,
    /// Equal-weighted empowerment score (0.0 - 1.0)
    pub empowerment_score: f64,
    /// Anti-oppression resistance score (0.0 - 1.0)
    pub resistance_score: f64,
    /// Whether criteria were declared at all
    pub criteria_provided: bool,
    /// Specific failures, in evaluation order
    pub issues: Vec<String>,
}

impl LiberationVerdict {
    /// Sub-verdict score.
    pub fn score(&self) -> f64 {
        self.empowerment_score
    }
}

/// Outcome of the sovereignty evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SovereigntyVerdict {
    /// All three checks passed
    pub maintained: bool,
    /// Creator share meets the minimum and shares balance
    pub revenue_share_compliant: bool,
    /// No ownership transfer or control restriction
    pub control_preserved: bool,
    /// Data stays in an allowed region
    pub residency_compliant: bool,
    /// Specific failures, in evaluation order
    pub issues: Vec<String>,
}

impl SovereigntyVerdict {
    /// Fraction of the three checks that passed.
    pub fn score(&self) -> f64 {
        let passed = [
            self.revenue_share_compliant,
            self.control_preserved,
            self.residency_compliant,
        ]
        .iter()
        .filter(|passed| **passed)
        .count();
        passed as f64 / 3.0
    }
}

/// Outcome of the consent evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ConsentVerdict {
    /// Consent is in place
    pub obtained: bool,
    /// Share of eligible members that took part (0.0 - 1.0)
    pub participation_rate: f64,
    /// How consent was established
    pub mechanism: ConsentMechanism,
    /// Approval strength (0.0 - 1.0)
    pub score: f64,
    /// Why consent is missing
    pub issue: Option<String>,
}

/// The engine's verdict on one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Unique decision ID
    pub id: String,
    /// Whether the operation may proceed
    pub approved: bool,
    /// Human-readable reasons, order is significant
    pub reasons: Vec<String>,
    /// Liberation sub-verdict
    pub liberation: LiberationVerdict,
    /// Sovereignty sub-verdict
    pub sovereignty: SovereigntyVerdict,
    /// Consent sub-verdict
    pub consent: ConsentVerdict,
    /// Kind of operation decided on
    pub operation_kind: OperationKind,
    /// Normal or emergency path
    pub mode: DecisionMode,
    /// When the decision was made
    pub timestamp: DateTime<Utc>,
    /// Steps the caller must follow, present only when approved
    pub implementation_instructions: Option<Vec<String>>,
}

/// Verdict content covered by the fingerprint.
#[derive(Serialize)]
struct VerdictDigest<'a> {
    approved: bool,
    operation_kind: OperationKind,
    reasons: &'a [String],
    liberation: &'a LiberationVerdict,
    sovereignty: &'a SovereigntyVerdict,
    consent: &'a ConsentVerdict,
    implementation_instructions: &'a Option<Vec<String>>,
}

impl Decision {
    /// Whether every sub-verdict passed.
    pub fn all_verdicts_pass(&self) -> bool {
        self.liberation.valid && self.sovereignty.maintained && self.consent.obtained
    }

    /// SHA256 over the verdict content.
    ///
    /// Excludes id, timestamp and mode, so re-evaluating an identical
    /// operation yields the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let digest = VerdictDigest {
            approved: self.approved,
            operation_kind: self.operation_kind,
            reasons: &self.reasons,
            liberation: &self.liberation,
            sovereignty: &self.sovereignty,
            consent: &self.consent,
            implementation_instructions: &self.implementation_instructions,
        };
        let json = serde_json::to_vec(&digest).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&json);
        hex::encode(hasher.finalize())
    }
}
