//! Named scoring constants.
//!
//! Every weight and breakpoint used by the rule evaluators and the integrity
//! aggregator lives here so changes show up in review. The breakpoints are
//! tunable through [`crate::config::GovernanceConfig`]; these values are the
//! defaults.

// Revenue sharing

/// Minimum creator share (percent) for a compliant revenue split.
pub const MIN_CREATOR_SHARE: f64 = 75.0;
/// Allowed rounding drift (percentage points) when shares are summed.
pub const SHARE_SUM_TOLERANCE: f64 = 0.5;

// Liberation

/// Empowerment score an operation must reach to be liberation-valid.
pub const EMPOWERMENT_THRESHOLD: f64 = 0.8;
/// Score reported when no data is available.
pub const NEUTRAL_SCORE: f64 = 0.5;
/// Starting point of the resistance score.
pub const RESISTANCE_BASE: f64 = 0.5;
/// Resistance bonus for anti-oppression safeguards.
pub const ANTI_OPPRESSION_BONUS: f64 = 0.3;
/// Resistance bonus for mutual-aid support.
pub const MUTUAL_AID_BONUS: f64 = 0.2;

// Consent

/// Share of for-votes (among for + against) that must be exceeded.
pub const VOTE_APPROVAL_THRESHOLD: f64 = 0.5;

// Integrity weights (sum to 1.0)

pub const GOVERNANCE_WEIGHT: f64 = 0.25;
pub const SOVEREIGNTY_WEIGHT: f64 = 0.25;
pub const LIBERATION_WEIGHT: f64 = 0.30;
pub const BACKUP_WEIGHT: f64 = 0.10;
pub const TRANSPARENCY_WEIGHT: f64 = 0.10;

// Governance component

pub const STORE_UNREACHABLE_PENALTY: f64 = 0.5;
pub const INACTIVE_GOVERNANCE_PENALTY: f64 = 0.2;
pub const DECISION_ACTIVITY_WINDOW_DAYS: i64 = 30;

// Sovereignty component

pub const SOVEREIGNTY_COMPLIANCE_TARGET: f64 = 0.95;
pub const AUDIT_WINDOW_HOURS: i64 = 24;

// Liberation component

pub const CREATOR_SHARE_PENALTY: f64 = 0.6;
pub const COMMUNITY_EMPOWERMENT_TARGET: f64 = 0.7;
pub const LOW_EMPOWERMENT_PENALTY: f64 = 0.3;
pub const DEMOCRATIC_PARTICIPATION_TARGET: f64 = 0.6;
pub const LOW_PARTICIPATION_PENALTY: f64 = 0.2;

// Backup component

pub const BACKUP_SUCCESS_TARGET: f64 = 0.95;
pub const BACKUP_WINDOW_DAYS: i64 = 7;
pub const STORAGE_UTILIZATION_LIMIT: f64 = 0.85;
pub const STORAGE_PRESSURE_PENALTY: f64 = 0.1;

// Transparency component

pub const AUDIT_COMPLETENESS_TARGET: f64 = 0.9;
pub const INCOMPLETE_AUDIT_PENALTY: f64 = 0.1;

// Issue severity by shortfall below target (fraction of 1.0)

pub const CRITICAL_SHORTFALL: f64 = 0.35;
pub const HIGH_SHORTFALL: f64 = 0.20;
pub const MEDIUM_SHORTFALL: f64 = 0.10;

// Probes

pub const PROBE_TIMEOUT_MS: u64 = 5_000;
/// Longest lookback any integrity window may use.
pub const MAX_WINDOW_DAYS: i64 = 36_500;
/// Component score assigned when a probe fails or times out.
pub const PROBE_FAILURE_SCORE: f64 = NEUTRAL_SCORE;
