//! Health probes feeding the integrity aggregator.
//!
//! A probe reads one governed domain and reports a [`ProbeSnapshot`]: a
//! headline score plus named samples. The aggregator turns samples into a
//! component score and issues; probes only measure.

mod fixed;
mod store;

pub use fixed::StaticProbe;
pub use store::{
    DecisionActivityProbe, LiberationMetricsProbe, SovereigntyAuditProbe, TransparencyProbe,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use compliance::IntegrityComponent;

use crate::error::ProbeError;

/// Sample names understood by the component assessors.
pub mod samples {
    /// 1.0 when the record store answered, 0.0 otherwise
    pub const STORE_REACHABLE: &str = "store_reachable";
    /// Decisions recorded within the activity window
    pub const RECENT_DECISIONS: &str = "recent_decisions";
    /// Share of audited operations that passed sovereignty checks
    pub const SOVEREIGNTY_CHECKED_RATE: &str = "sovereignty_checked_rate";
    /// Audit entries inside the audit window
    pub const AUDITED_ENTRIES: &str = "audited_entries";
    /// Mean creator revenue share (percent)
    pub const AVG_CREATOR_SHARE: &str = "avg_creator_share";
    /// Mean empowerment score of operations with declared criteria
    pub const COMMUNITY_EMPOWERMENT: &str = "community_empowerment";
    /// Mean consent participation rate
    pub const DEMOCRATIC_PARTICIPATION: &str = "democratic_participation";
    /// Share of successful backups in the backup window
    pub const BACKUP_SUCCESS_RATE: &str = "backup_success_rate";
    /// Fraction of backup storage in use
    pub const STORAGE_UTILIZATION: &str = "storage_utilization";
    /// Share of audit entries that are publicly visible
    pub const TRANSPARENCY_RATIO: &str = "transparency_ratio";
    /// Audit entries over recorded decisions
    pub const AUDIT_COMPLETENESS: &str = "audit_completeness";
}

/// Point-in-time reading from a probe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeSnapshot {
    /// Headline health reading (0.0 - 1.0)
    pub score: f64,
    /// Named measurements
    pub samples: HashMap<String, f64>,
}

impl ProbeSnapshot {
    /// Create a snapshot with no samples.
    pub fn new(score: f64) -> Self {
        Self {
            score,
            samples: HashMap::new(),
        }
    }

    /// Builder: add a sample.
    pub fn with_sample(mut self, name: impl Into<String>, value: f64) -> Self {
        self.samples.insert(name.into(), value);
        self
    }

    /// Get a sample if present and finite.
    pub fn sample(&self, name: &str) -> Option<f64> {
        self.samples.get(name).copied().filter(|v| v.is_finite())
    }

    /// Get a sample the assessment cannot do without.
    pub fn require(&self, name: &'static str) -> Result<f64, ProbeError> {
        self.sample(name).ok_or(ProbeError::MissingSample(name))
    }
}

/// A source of health readings for one governed domain.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Domain this probe measures.
    fn component(&self) -> IntegrityComponent;

    /// Take a reading.
    async fn snapshot(&self) -> Result<ProbeSnapshot, ProbeError>;
}
