//! Probes that read the governance record store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{trace, warn};

use audit_trail::{AuditEntry, RecordQuery, RecordStore, RecordType};
use compliance::thresholds::{AUDIT_WINDOW_HOURS, DECISION_ACTIVITY_WINDOW_DAYS};
use compliance::{IntegrityComponent, IntegrityThresholds};

use super::samples::*;
use super::{HealthProbe, ProbeSnapshot};
use crate::error::ProbeError;

/// Audit entries recorded at or after `since`, skipping records that do not
/// decode.
async fn audit_entries(
    store: &dyn RecordStore,
    since: DateTime<Utc>,
) -> Result<Vec<AuditEntry>, ProbeError> {
    let records = store
        .query(&RecordQuery::new(RecordType::AuditLog).since(since))
        .await?;

    Ok(records
        .iter()
        .filter_map(|record| match AuditEntry::from_record(record) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(record_id = %record.id, error = %e, "Skipping malformed audit entry");
                None
            }
        })
        .collect())
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        1.0
    } else {
        part as f64 / whole as f64
    }
}

/// Governance activity: store reachability and recent decisions.
pub struct DecisionActivityProbe {
    store: Arc<dyn RecordStore>,
    window: Duration,
}

impl DecisionActivityProbe {
    /// Create with the default activity window.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            window: Duration::days(DECISION_ACTIVITY_WINDOW_DAYS),
        }
    }

    /// Create with configured thresholds, rejecting an unusable window.
    pub fn with_thresholds(store: Arc<dyn RecordStore>, thresholds: &IntegrityThresholds) -> crate::Result<Self> {
        Ok(Self {
            store,
            window: thresholds.decision_window()?,
        })
    }
}

#[async_trait]
impl HealthProbe for DecisionActivityProbe {
    fn component(&self) -> IntegrityComponent {
        IntegrityComponent::Governance
    }

    async fn snapshot(&self) -> Result<ProbeSnapshot, ProbeError> {
        if !self.store.is_available().await {
            return Ok(ProbeSnapshot::new(0.0).with_sample(STORE_REACHABLE, 0.0));
        }

        let since = Utc::now() - self.window;
        let recent = self
            .store
            .query(&RecordQuery::new(RecordType::GovernanceDecision).since(since))
            .await?
            .len();

        trace!(recent_decisions = recent, "Decision activity sampled");

        Ok(ProbeSnapshot::new(1.0)
            .with_sample(STORE_REACHABLE, 1.0)
            .with_sample(RECENT_DECISIONS, recent as f64))
    }
}

/// Share of recently audited operations that passed sovereignty checks.
pub struct SovereigntyAuditProbe {
    store: Arc<dyn RecordStore>,
    window: Duration,
}

impl SovereigntyAuditProbe {
    /// Create with the default audit window.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            window: Duration::hours(AUDIT_WINDOW_HOURS),
        }
    }

    /// Create with configured thresholds, rejecting an unusable window.
    pub fn with_thresholds(store: Arc<dyn RecordStore>, thresholds: &IntegrityThresholds) -> crate::Result<Self> {
        Ok(Self {
            store,
            window: thresholds.audit_window()?,
        })
    }
}

#[async_trait]
impl HealthProbe for SovereigntyAuditProbe {
    fn component(&self) -> IntegrityComponent {
        IntegrityComponent::Sovereignty
    }

    async fn snapshot(&self) -> Result<ProbeSnapshot, ProbeError> {
        let entries = audit_entries(self.store.as_ref(), Utc::now() - self.window).await?;
        let checked = entries.iter().filter(|e| e.sovereignty_checked).count();
        // No audited operations means nothing violated sovereignty.
        let rate = ratio(checked, entries.len());

        Ok(ProbeSnapshot::new(rate)
            .with_sample(SOVEREIGNTY_CHECKED_RATE, rate)
            .with_sample(AUDITED_ENTRIES, entries.len() as f64))
    }
}

/// Revenue, empowerment and participation metrics from audit metadata.
pub struct LiberationMetricsProbe {
    store: Arc<dyn RecordStore>,
    window: Duration,
}

impl LiberationMetricsProbe {
    /// Create with the default decision window.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            window: Duration::days(DECISION_ACTIVITY_WINDOW_DAYS),
        }
    }

    /// Create with configured thresholds, rejecting an unusable window.
    pub fn with_thresholds(store: Arc<dyn RecordStore>, thresholds: &IntegrityThresholds) -> crate::Result<Self> {
        Ok(Self {
            store,
            window: thresholds.decision_window()?,
        })
    }
}

#[async_trait]
impl HealthProbe for LiberationMetricsProbe {
    fn component(&self) -> IntegrityComponent {
        IntegrityComponent::Liberation
    }

    async fn snapshot(&self) -> Result<ProbeSnapshot, ProbeError> {
        let entries = audit_entries(self.store.as_ref(), Utc::now() - self.window).await?;

        let creator_share = mean(entries.iter().filter_map(|e| e.creator_share));
        let empowerment = mean(
            entries
                .iter()
                .filter(|e| e.liberation_criteria_provided)
                .map(|e| e.empowerment_score),
        );
        let participation = mean(entries.iter().map(|e| e.participation_rate));

        // Absent metrics stay absent; the assessor applies no penalty for them.
        let mut snapshot = ProbeSnapshot::new(empowerment.unwrap_or(1.0));
        for (name, value) in [
            (AVG_CREATOR_SHARE, creator_share),
            (COMMUNITY_EMPOWERMENT, empowerment),
            (DEMOCRATIC_PARTICIPATION, participation),
        ] {
            if let Some(value) = value {
                snapshot = snapshot.with_sample(name, value);
            }
        }
        Ok(snapshot)
    }
}

/// Audit visibility and completeness.
pub struct TransparencyProbe {
    store: Arc<dyn RecordStore>,
    window: Duration,
}

impl TransparencyProbe {
    /// Create with the default audit window.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            window: Duration::hours(AUDIT_WINDOW_HOURS),
        }
    }

    /// Create with configured thresholds, rejecting an unusable window.
    pub fn with_thresholds(store: Arc<dyn RecordStore>, thresholds: &IntegrityThresholds) -> crate::Result<Self> {
        Ok(Self {
            store,
            window: thresholds.audit_window()?,
        })
    }
}

#[async_trait]
impl HealthProbe for TransparencyProbe {
    fn component(&self) -> IntegrityComponent {
        IntegrityComponent::Transparency
    }

    async fn snapshot(&self) -> Result<ProbeSnapshot, ProbeError> {
        let since = Utc::now() - self.window;
        let entries = audit_entries(self.store.as_ref(), since).await?;
        let decisions = self
            .store
            .query(&RecordQuery::new(RecordType::GovernanceDecision).since(since))
            .await?
            .len();

        let public = entries.iter().filter(|e| e.public_visibility).count();
        let transparency = ratio(public, entries.len());
        let completeness = ratio(entries.len(), decisions).min(1.0);

        Ok(ProbeSnapshot::new(transparency)
            .with_sample(TRANSPARENCY_RATIO, transparency)
            .with_sample(AUDIT_COMPLETENESS, completeness))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_trail::{AuditRecorder, InMemoryRecordStore, Record};
    use compliance::{
        AuditConfig, LiberationCriteria, Operation, OperationKind, PolicyEngine, RevenueSharing,
    };
    use serde_json::Map;

    fn content(creator: f64) -> Operation {
        Operation::builder()
            .kind(OperationKind::ContentStorage)
            .payload("content-1")
            .revenue_sharing(RevenueSharing::new(creator, 100.0 - creator))
            .liberation_criteria(LiberationCriteria::all())
            .build()
            .unwrap()
    }

    async fn record(recorder: &AuditRecorder, operation: &Operation) {
        let decision = PolicyEngine::new().evaluate(operation).unwrap();
        recorder.record(&decision, operation).await;
    }

    #[tokio::test]
    async fn test_decision_activity() {
        let store = Arc::new(InMemoryRecordStore::new());
        let probe = DecisionActivityProbe::new(store.clone());

        let empty = probe.snapshot().await.unwrap();
        assert_eq!(empty.sample(STORE_REACHABLE), Some(1.0));
        assert_eq!(empty.sample(RECENT_DECISIONS), Some(0.0));

        record(&AuditRecorder::new(store.clone()), &content(80.0)).await;
        let active = probe.snapshot().await.unwrap();
        assert_eq!(active.sample(RECENT_DECISIONS), Some(1.0));

        store.set_available(false);
        let unreachable = probe.snapshot().await.unwrap();
        assert_eq!(unreachable.sample(STORE_REACHABLE), Some(0.0));
        assert_eq!(unreachable.sample(RECENT_DECISIONS), None);
    }

    #[tokio::test]
    async fn test_sovereignty_rate() {
        let store = Arc::new(InMemoryRecordStore::new());
        let recorder = AuditRecorder::new(store.clone());
        let probe = SovereigntyAuditProbe::new(store.clone());

        assert_eq!(
            probe.snapshot().await.unwrap().sample(SOVEREIGNTY_CHECKED_RATE),
            Some(1.0)
        );

        record(&recorder, &content(80.0)).await;
        record(&recorder, &content(60.0)).await;
        let snapshot = probe.snapshot().await.unwrap();
        assert_eq!(snapshot.sample(SOVEREIGNTY_CHECKED_RATE), Some(0.5));
        assert_eq!(snapshot.sample(AUDITED_ENTRIES), Some(2.0));

        store.set_available(false);
        assert!(matches!(probe.snapshot().await, Err(ProbeError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_liberation_metrics() {
        let store = Arc::new(InMemoryRecordStore::new());
        let recorder = AuditRecorder::new(store.clone());
        let probe = LiberationMetricsProbe::new(store.clone());

        let empty = probe.snapshot().await.unwrap();
        assert!(empty.samples.is_empty());

        record(&recorder, &content(80.0)).await;
        record(&recorder, &content(60.0)).await;
        let backup = Operation::builder()
            .kind(OperationKind::Backup)
            .payload("snapshot-1")
            .build()
            .unwrap();
        record(&recorder, &backup).await;

        let snapshot = probe.snapshot().await.unwrap();
        assert_eq!(snapshot.sample(AVG_CREATOR_SHARE), Some(70.0));
        assert_eq!(snapshot.sample(COMMUNITY_EMPOWERMENT), Some(1.0));
        assert!(snapshot.sample(DEMOCRATIC_PARTICIPATION).is_some());
    }

    #[tokio::test]
    async fn test_transparency_and_completeness() {
        let store = Arc::new(InMemoryRecordStore::new());
        let public = AuditRecorder::new(store.clone());
        let private = AuditRecorder::with_config(
            store.clone(),
            AuditConfig {
                public_visibility: false,
                ..Default::default()
            },
        );
        let probe = TransparencyProbe::new(store.clone());

        record(&public, &content(80.0)).await;
        record(&private, &content(80.0)).await;
        // A decision persisted without its audit entry.
        store
            .append(Record::new(RecordType::GovernanceDecision, Map::new()))
            .await
            .unwrap();

        let snapshot = probe.snapshot().await.unwrap();
        assert_eq!(snapshot.sample(TRANSPARENCY_RATIO), Some(0.5));
        let completeness = snapshot.sample(AUDIT_COMPLETENESS).unwrap();
        assert!((completeness - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_malformed_entries_are_skipped() {
        let store = Arc::new(InMemoryRecordStore::new());
        store
            .append(Record::new(RecordType::AuditLog, Map::new()))
            .await
            .unwrap();

        let snapshot = SovereigntyAuditProbe::new(store.clone())
            .snapshot()
            .await
            .unwrap();
        assert_eq!(snapshot.sample(AUDITED_ENTRIES), Some(0.0));
    }

    #[test]
    fn test_out_of_range_window_rejected() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        let thresholds = IntegrityThresholds {
            decision_window_days: i64::MAX,
            audit_window_hours: -24,
            ..Default::default()
        };

        assert!(DecisionActivityProbe::with_thresholds(store.clone(), &thresholds).is_err());
        assert!(LiberationMetricsProbe::with_thresholds(store.clone(), &thresholds).is_err());
        assert!(SovereigntyAuditProbe::with_thresholds(store.clone(), &thresholds).is_err());
        assert!(TransparencyProbe::with_thresholds(store.clone(), &thresholds).is_err());
        assert!(TransparencyProbe::with_thresholds(store, &IntegrityThresholds::default()).is_ok());
    }
}
