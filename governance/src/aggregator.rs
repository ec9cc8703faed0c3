//! IntegrityAggregator - periodic system-wide integrity assessment.
//!
//! Runs one probe per governed domain concurrently, each under its own
//! timeout, scores the results and persists the report. A probe that fails
//! or times out degrades its component to a neutral score; it never fails
//! the assessment.

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use audit_trail::{Record, RecordQuery, RecordStore, RecordType};
use compliance::{ComponentScores, IntegrityComponent, IntegrityConfig, IntegrityReport, Issue};

use crate::assess::{assess, Assessment};
use crate::error::{ProbeError, Result};
use crate::probes::{
    DecisionActivityProbe, HealthProbe, LiberationMetricsProbe, SovereigntyAuditProbe,
    TransparencyProbe,
};

/// Aggregates probe readings into integrity reports.
pub struct IntegrityAggregator {
    store: Arc<dyn RecordStore>,
    probes: Vec<Arc<dyn HealthProbe>>,
    config: IntegrityConfig,
}

impl IntegrityAggregator {
    /// Create with no probes registered.
    pub fn new(store: Arc<dyn RecordStore>, config: IntegrityConfig) -> Self {
        Self {
            store,
            probes: Vec::new(),
            config,
        }
    }

    /// Create with the store-backed probes for governance, sovereignty,
    /// liberation and transparency. Backup health must be supplied with
    /// [`with_probe`](Self::with_probe).
    ///
    /// Fails with `InvalidConfig` when the configuration does not validate.
    pub fn with_store_probes(store: Arc<dyn RecordStore>, config: IntegrityConfig) -> Result<Self> {
        config.validate()?;
        let thresholds = &config.thresholds;
        let probes: Vec<Arc<dyn HealthProbe>> = vec![
            Arc::new(DecisionActivityProbe::with_thresholds(store.clone(), thresholds)?),
            Arc::new(SovereigntyAuditProbe::with_thresholds(store.clone(), thresholds)?),
            Arc::new(LiberationMetricsProbe::with_thresholds(store.clone(), thresholds)?),
            Arc::new(TransparencyProbe::with_thresholds(store.clone(), thresholds)?),
        ];
        Ok(Self {
            store,
            probes,
            config,
        })
    }

    /// Builder: register a probe, replacing any probe for the same component.
    pub fn with_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        let component = probe.component();
        self.probes.retain(|p| p.component() != component);
        self.probes.push(probe);
        self
    }

    /// Integrity configuration.
    pub fn config(&self) -> &IntegrityConfig {
        &self.config
    }

    /// Run every probe and compose, persist and return a report.
    pub async fn assess(&self) -> IntegrityReport {
        let start = Instant::now();
        let timeout = Duration::from_millis(self.config.probe_timeout_ms);

        let readings = join_all(IntegrityComponent::all().into_iter().map(|component| {
            let probe = self.probes.iter().find(|p| p.component() == component).cloned();
            async move {
                let reading = match probe {
                    Some(probe) => match tokio::time::timeout(timeout, probe.snapshot()).await {
                        Ok(result) => result,
                        Err(_) => Err(ProbeError::Timeout(timeout.as_millis() as u64)),
                    },
                    None => Err(ProbeError::Unavailable("no probe registered".to_string())),
                };
                (component, reading)
            }
        }))
        .await;

        let mut scores = ComponentScores::default();
        let mut issues: Vec<Issue> = Vec::new();

        for (component, reading) in readings {
            let assessment = match reading
                .and_then(|snapshot| {
                    debug!(
                        component = %component,
                        probe_score = snapshot.score,
                        samples = snapshot.samples.len(),
                        "Probe answered"
                    );
                    assess(component, &snapshot, &self.config.thresholds)
                }) {
                Ok(assessment) => assessment,
                Err(e) => {
                    warn!(component = %component, error = %e, "Integrity probe failed");
                    Assessment::probe_failed(component, &e)
                }
            };
            scores.set(component, assessment.score);
            issues.extend(assessment.issues);
        }

        let report = IntegrityReport::compose(scores, issues, &self.config.weights);
        self.persist(&report).await;

        info!(
            report_id = %report.id,
            overall = report.overall,
            issues = report.issues.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Integrity report generated"
        );

        report
    }

    /// Persisted reports, newest first.
    pub async fn history(&self, limit: usize) -> Result<Vec<IntegrityReport>> {
        let records = self
            .store
            .query(&RecordQuery::new(RecordType::IntegrityReport).limit(limit))
            .await?;

        let reports = records
            .iter()
            .map(|record| record.decode::<IntegrityReport>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(reports)
    }

    async fn persist(&self, report: &IntegrityReport) {
        let record = match Record::from_serializable(RecordType::IntegrityReport, report) {
            Ok(record) => record.with_id(report.id.clone()).recorded_at(report.generated_at),
            Err(e) => {
                warn!(report_id = %report.id, error = %e, "Integrity report could not be encoded");
                return;
            }
        };

        if let Err(e) = self.store.append(record).await {
            warn!(report_id = %report.id, error = %e, "Integrity report not persisted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::{samples, ProbeSnapshot, StaticProbe};
    use async_trait::async_trait;
    use audit_trail::InMemoryRecordStore;
    use crate::error::GovernanceError;
    use compliance::{ComplianceError, Severity};

    struct SlowProbe;

    #[async_trait]
    impl HealthProbe for SlowProbe {
        fn component(&self) -> IntegrityComponent {
            IntegrityComponent::Transparency
        }

        async fn snapshot(&self) -> std::result::Result<ProbeSnapshot, ProbeError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ProbeSnapshot::new(1.0))
        }
    }

    fn fixed(component: IntegrityComponent, score: f64) -> Arc<dyn HealthProbe> {
        Arc::new(StaticProbe::with_snapshot(component, ProbeSnapshot::new(score)))
    }

    fn all_fixed(store: Arc<InMemoryRecordStore>, scores: [f64; 5]) -> IntegrityAggregator {
        IntegrityComponent::all()
            .into_iter()
            .zip(scores)
            .fold(
                IntegrityAggregator::new(store, IntegrityConfig::default()),
                |aggregator, (component, score)| aggregator.with_probe(fixed(component, score)),
            )
    }

    #[tokio::test]
    async fn test_healthy_report() {
        let store = Arc::new(InMemoryRecordStore::new());
        let report = all_fixed(store, [1.0; 5]).assess().await;
        assert!((report.overall - 1.0).abs() < 1e-9);
        assert!(report.issues.is_empty());
        assert_eq!(report.recommendations.len(), 1);
    }

    #[tokio::test]
    async fn test_weighted_overall() {
        let store = Arc::new(InMemoryRecordStore::new());
        let report = all_fixed(store, [1.0, 1.0, 0.5, 1.0, 1.0]).assess().await;
        assert!((report.overall - 0.85).abs() < 1e-9);
        assert_eq!(report.components.liberation, 0.5);
    }

    #[tokio::test]
    async fn test_missing_probe_is_neutral() {
        let store = Arc::new(InMemoryRecordStore::new());
        let aggregator = IntegrityAggregator::new(store, IntegrityConfig::default())
            .with_probe(fixed(IntegrityComponent::Governance, 1.0));
        let report = aggregator.assess().await;

        assert_eq!(report.components.governance, 1.0);
        assert_eq!(report.components.backup, 0.5);
        assert_eq!(report.issues_for(IntegrityComponent::Backup).len(), 1);
        assert_eq!(report.highest_severity(), Some(Severity::High));
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut config = IntegrityConfig::default();
        config.probe_timeout_ms = 20;
        let aggregator = IntegrityComponent::all()
            .into_iter()
            .fold(IntegrityAggregator::new(store, config), |aggregator, component| {
                aggregator.with_probe(fixed(component, 1.0))
            })
            .with_probe(Arc::new(SlowProbe));

        let report = aggregator.assess().await;
        assert_eq!(report.components.transparency, 0.5);
        let issues = report.issues_for(IntegrityComponent::Transparency);
        assert!(issues[0].description.contains("timed out"));
    }

    #[tokio::test]
    async fn test_reports_persisted_newest_first() {
        let store = Arc::new(InMemoryRecordStore::new());
        let aggregator = all_fixed(store.clone(), [1.0; 5]);

        let first = aggregator.assess().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = aggregator.assess().await;

        let history = aggregator.history(10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);
        assert_eq!(aggregator.history(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_store_degrades_governance() {
        let store = Arc::new(InMemoryRecordStore::new());
        let aggregator = IntegrityAggregator::with_store_probes(store.clone(), IntegrityConfig::default())
            .unwrap()
            .with_probe(Arc::new(StaticProbe::with_snapshot(
                IntegrityComponent::Backup,
                ProbeSnapshot::new(1.0).with_sample(samples::BACKUP_SUCCESS_RATE, 1.0),
            )));
        store.set_available(false);

        let report = aggregator.assess().await;
        assert_eq!(report.components.governance, 0.5);
        // Store-backed probes fail outright while the store is down.
        assert_eq!(report.components.sovereignty, 0.5);
        assert_eq!(report.components.backup, 1.0);
        assert!(aggregator.history(5).await.is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let store = Arc::new(InMemoryRecordStore::new());
        let mut config = IntegrityConfig::default();
        config.thresholds.decision_window_days = i64::MAX;
        assert!(matches!(
            IntegrityAggregator::with_store_probes(store.clone(), config),
            Err(GovernanceError::Compliance(ComplianceError::InvalidConfig(_)))
        ));

        let mut config = IntegrityConfig::default();
        config.thresholds.backup_success_target = f64::NAN;
        assert!(IntegrityAggregator::with_store_probes(store, config).is_err());
    }
}
