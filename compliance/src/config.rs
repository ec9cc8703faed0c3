//! Configuration for policy evaluation, auditing and integrity scoring.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::thresholds::*;
use crate::types::{ComplianceError, OperationKind, Result};

/// Top-level configuration shared by the policy engine, the audit recorder
/// and the integrity aggregator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Rule evaluator configuration
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Audit recorder configuration
    #[serde(default)]
    pub audit: AuditConfig,
    /// Integrity aggregator configuration
    #[serde(default)]
    pub integrity: IntegrityConfig,
}

impl GovernanceConfig {
    /// Load config from YAML and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.policy.validate()?;
        self.integrity.validate()
    }
}

/// Rule evaluator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Minimum creator share (percent)
    pub min_creator_share: f64,
    /// Rounding tolerance when revenue shares are summed
    pub share_tolerance: f64,
    /// Empowerment score required for liberation validity
    pub empowerment_threshold: f64,
    /// For-vote ratio that must be exceeded for consent
    pub vote_approval_threshold: f64,
    /// Operation kinds that need an explicit community vote
    pub vote_required_kinds: Vec<OperationKind>,
    /// Regions data may reside in
    pub allowed_regions: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_creator_share: MIN_CREATOR_SHARE,
            share_tolerance: SHARE_SUM_TOLERANCE,
            empowerment_threshold: EMPOWERMENT_THRESHOLD,
            vote_approval_threshold: VOTE_APPROVAL_THRESHOLD,
            vote_required_kinds: vec![
                OperationKind::Deletion,
                OperationKind::PlatformIntegration,
                OperationKind::Analytics,
            ],
            allowed_regions: ["local", "community", "eu", "ca", "us"]
                .iter()
                .map(|r| r.to_string())
                .collect(),
        }
    }
}

impl PolicyConfig {
    /// Whether the kind needs a democratic vote.
    pub fn requires_vote(&self, kind: OperationKind) -> bool {
        self.vote_required_kinds.contains(&kind)
    }

    /// Whether data may live in the region (case-insensitive).
    pub fn region_allowed(&self, region: &str) -> bool {
        self.allowed_regions
            .iter()
            .any(|r| r.eq_ignore_ascii_case(region.trim()))
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.min_creator_share) {
            return Err(ComplianceError::InvalidConfig(format!(
                "min_creator_share must be within 0-100, got {}",
                self.min_creator_share
            )));
        }
        for (name, value) in [
            ("empowerment_threshold", self.empowerment_threshold),
            ("vote_approval_threshold", self.vote_approval_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ComplianceError::InvalidConfig(format!(
                    "{name} must be within 0-1, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Audit recorder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Persist decisions to the record store
    pub enabled: bool,
    /// Mark audit entries as publicly visible
    pub public_visibility: bool,
    /// Mark audit entries as visible to the affected community
    pub community_visibility: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            public_visibility: true,
            community_visibility: true,
        }
    }
}

/// Integrity aggregator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Per-probe timeout (ms)
    pub probe_timeout_ms: u64,
    /// Component weights for the overall score
    pub weights: ScoreWeights,
    /// Component breakpoints
    pub thresholds: IntegrityThresholds,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: PROBE_TIMEOUT_MS,
            weights: ScoreWeights::default(),
            thresholds: IntegrityThresholds::default(),
        }
    }
}

impl IntegrityConfig {
    /// Timeout, weights and thresholds must all be usable.
    pub fn validate(&self) -> Result<()> {
        if self.probe_timeout_ms == 0 {
            return Err(ComplianceError::InvalidConfig(
                "probe_timeout_ms must be greater than 0".to_string(),
            ));
        }
        self.weights.validate()?;
        self.thresholds.validate()
    }
}

/// Weights applied to the five component scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub governance: f64,
    pub sovereignty: f64,
    pub liberation: f64,
    pub backup: f64,
    pub transparency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            governance: GOVERNANCE_WEIGHT,
            sovereignty: SOVEREIGNTY_WEIGHT,
            liberation: LIBERATION_WEIGHT,
            backup: BACKUP_WEIGHT,
            transparency: TRANSPARENCY_WEIGHT,
        }
    }
}

impl ScoreWeights {
    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.governance + self.sovereignty + self.liberation + self.backup + self.transparency
    }

    /// Weights must be non-negative and sum to 1.0.
    pub fn validate(&self) -> Result<()> {
        let weights = [
            self.governance,
            self.sovereignty,
            self.liberation,
            self.backup,
            self.transparency,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ComplianceError::InvalidConfig(
                "integrity weights must be finite and non-negative".to_string(),
            ));
        }
        if (self.total() - 1.0).abs() > 1e-6 {
            return Err(ComplianceError::InvalidConfig(format!(
                "integrity weights must sum to 1.0, got {:.4}",
                self.total()
            )));
        }
        Ok(())
    }
}

/// Breakpoints used by the integrity component assessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityThresholds {
    pub decision_window_days: i64,
    pub audit_window_hours: i64,
    pub backup_window_days: i64,
    pub sovereignty_compliance_target: f64,
    pub min_creator_share: f64,
    pub community_empowerment_target: f64,
    pub democratic_participation_target: f64,
    pub backup_success_target: f64,
    pub storage_utilization_limit: f64,
    pub audit_completeness_target: f64,
}

impl Default for IntegrityThresholds {
    fn default() -> Self {
        Self {
            decision_window_days: DECISION_ACTIVITY_WINDOW_DAYS,
            audit_window_hours: AUDIT_WINDOW_HOURS,
            backup_window_days: BACKUP_WINDOW_DAYS,
            sovereignty_compliance_target: SOVEREIGNTY_COMPLIANCE_TARGET,
            min_creator_share: MIN_CREATOR_SHARE,
            community_empowerment_target: COMMUNITY_EMPOWERMENT_TARGET,
            democratic_participation_target: DEMOCRATIC_PARTICIPATION_TARGET,
            backup_success_target: BACKUP_SUCCESS_TARGET,
            storage_utilization_limit: STORAGE_UTILIZATION_LIMIT,
            audit_completeness_target: AUDIT_COMPLETENESS_TARGET,
        }
    }
}

impl IntegrityThresholds {
    /// Lookback for governance activity and liberation metrics.
    pub fn decision_window(&self) -> Result<Duration> {
        window("decision_window_days", self.decision_window_days, MAX_WINDOW_DAYS, Duration::try_days)
    }

    /// Lookback for sovereignty and transparency audits.
    pub fn audit_window(&self) -> Result<Duration> {
        window("audit_window_hours", self.audit_window_hours, MAX_WINDOW_DAYS * 24, Duration::try_hours)
    }

    /// Lookback for backup success rates.
    pub fn backup_window(&self) -> Result<Duration> {
        window("backup_window_days", self.backup_window_days, MAX_WINDOW_DAYS, Duration::try_days)
    }

    /// Windows must be positive and bounded; targets must be fractions.
    pub fn validate(&self) -> Result<()> {
        self.decision_window()?;
        self.audit_window()?;
        self.backup_window()?;

        for (name, value) in [
            ("sovereignty_compliance_target", self.sovereignty_compliance_target),
            ("community_empowerment_target", self.community_empowerment_target),
            ("democratic_participation_target", self.democratic_participation_target),
            ("backup_success_target", self.backup_success_target),
            ("storage_utilization_limit", self.storage_utilization_limit),
            ("audit_completeness_target", self.audit_completeness_target),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ComplianceError::InvalidConfig(format!(
                    "{name} must be within 0-1, got {value}"
                )));
            }
        }

        if !self.min_creator_share.is_finite() || !(0.0..=100.0).contains(&self.min_creator_share) {
            return Err(ComplianceError::InvalidConfig(format!(
                "integrity min_creator_share must be within 0-100, got {}",
                self.min_creator_share
            )));
        }
        Ok(())
    }
}

fn window(
    name: &str,
    value: i64,
    max: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration> {
    if value <= 0 || value > max {
        return Err(ComplianceError::InvalidConfig(format!(
            "{name} must be within 1-{max}, got {value}"
        )));
    }
    to_duration(value).ok_or_else(|| {
        ComplianceError::InvalidConfig(format!("{name} is out of range: {value}"))
    })
}
