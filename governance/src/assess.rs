//! Component assessors.
//!
//! Pure functions from a probe snapshot to a component score and the issues
//! behind any deduction. Each component starts from its base reading and
//! loses the penalties named in `compliance::thresholds`.

use compliance::thresholds::{
    CREATOR_SHARE_PENALTY, INACTIVE_GOVERNANCE_PENALTY, INCOMPLETE_AUDIT_PENALTY,
    LOW_EMPOWERMENT_PENALTY, LOW_PARTICIPATION_PENALTY, MEDIUM_SHORTFALL, PROBE_FAILURE_SCORE,
    STORAGE_PRESSURE_PENALTY, STORE_UNREACHABLE_PENALTY,
};
use compliance::{IntegrityComponent, IntegrityThresholds, Issue, Severity};

use crate::error::ProbeError;
use crate::probes::samples::*;
use crate::probes::ProbeSnapshot;

/// Score and issues for one component.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    /// Component score before clamping
    pub score: f64,
    /// Issues behind each deduction
    pub issues: Vec<Issue>,
}

impl Assessment {
    fn healthy() -> Self {
        Self {
            score: 1.0,
            issues: Vec::new(),
        }
    }

    fn deduct(&mut self, penalty: f64, issue: Issue) {
        self.score -= penalty;
        self.issues.push(issue);
    }

    /// Neutral score and a single issue for a probe that did not answer.
    pub fn probe_failed(component: IntegrityComponent, error: &ProbeError) -> Self {
        Self {
            score: PROBE_FAILURE_SCORE,
            issues: vec![Issue::new(
                component,
                Severity::High,
                format!("{component} probe failed: {error}"),
                format!("Restore the {component} health probe so the domain can be assessed"),
            )],
        }
    }
}

/// Assess one component from its snapshot.
///
/// A snapshot without samples is taken at its headline score; otherwise the
/// component's required samples must be present.
pub fn assess(
    component: IntegrityComponent,
    snapshot: &ProbeSnapshot,
    thresholds: &IntegrityThresholds,
) -> Result<Assessment, ProbeError> {
    if snapshot.samples.is_empty() {
        return Ok(reported(component, snapshot.score));
    }

    match component {
        IntegrityComponent::Governance => governance(snapshot, thresholds),
        IntegrityComponent::Sovereignty => sovereignty(snapshot, thresholds),
        IntegrityComponent::Liberation => Ok(liberation(snapshot, thresholds)),
        IntegrityComponent::Backup => backup(snapshot, thresholds),
        IntegrityComponent::Transparency => transparency(snapshot, thresholds),
    }
}

fn reported(component: IntegrityComponent, score: f64) -> Assessment {
    let score = if score.is_finite() { score } else { 0.0 };
    let shortfall = 1.0 - score;
    let mut assessment = Assessment::healthy();
    assessment.score = score;
    if shortfall > MEDIUM_SHORTFALL {
        assessment.issues.push(Issue::new(
            component,
            Severity::from_shortfall(shortfall),
            format!("{component} subsystem reports health {score:.2}"),
            format!("Investigate the {component} subsystem's own diagnostics"),
        ));
    }
    assessment
}

fn governance(
    snapshot: &ProbeSnapshot,
    thresholds: &IntegrityThresholds,
) -> Result<Assessment, ProbeError> {
    let mut assessment = Assessment::healthy();
    let component = IntegrityComponent::Governance;

    if snapshot.require(STORE_REACHABLE)? < 1.0 {
        assessment.deduct(
            STORE_UNREACHABLE_PENALTY,
            Issue::new(
                component,
                Severity::from_shortfall(STORE_UNREACHABLE_PENALTY),
                "Governance record store is unreachable; decisions cannot be persisted",
                "Restore connectivity to the governance record store",
            ),
        );
    }

    // Activity is unknown while the store is unreachable.
    if snapshot.sample(RECENT_DECISIONS) == Some(0.0) {
        assessment.deduct(
            INACTIVE_GOVERNANCE_PENALTY,
            Issue::new(
                component,
                Severity::from_shortfall(INACTIVE_GOVERNANCE_PENALTY),
                format!(
                    "No governance decisions recorded in the last {} days",
                    thresholds.decision_window_days
                ),
                "Schedule a community governance session to review pending operations",
            )
            .requiring_governance(),
        );
    }

    Ok(assessment)
}

fn sovereignty(
    snapshot: &ProbeSnapshot,
    thresholds: &IntegrityThresholds,
) -> Result<Assessment, ProbeError> {
    let rate = snapshot.require(SOVEREIGNTY_CHECKED_RATE)?;
    let target = thresholds.sovereignty_compliance_target;
    let shortfall = (target - rate).max(0.0);

    let mut assessment = Assessment::healthy();
    if shortfall > 0.0 {
        let severity = Severity::from_shortfall(shortfall);
        let mut issue = Issue::new(
            IntegrityComponent::Sovereignty,
            severity,
            format!(
                "Sovereignty checks passed for {:.0}% of operations audited in the last {} hours (target {:.0}%)",
                rate * 100.0,
                thresholds.audit_window_hours,
                target * 100.0
            ),
            "Review rejected operations for creator control and data residency violations",
        );
        if severity >= Severity::High {
            issue = issue.requiring_governance();
        }
        assessment.deduct(shortfall, issue);
    }
    Ok(assessment)
}

fn liberation(snapshot: &ProbeSnapshot, thresholds: &IntegrityThresholds) -> Assessment {
    let mut assessment = Assessment::healthy();
    let component = IntegrityComponent::Liberation;

    if let Some(share) = snapshot.sample(AVG_CREATOR_SHARE) {
        if share < thresholds.min_creator_share {
            assessment.deduct(
                CREATOR_SHARE_PENALTY,
                Issue::new(
                    component,
                    Severity::Critical,
                    format!(
                        "Average creator revenue share {:.1}% is below the required {}%",
                        share, thresholds.min_creator_share
                    ),
                    "Restore creator-first revenue sharing on monetized content",
                )
                .requiring_governance(),
            );
        }
    }

    if let Some(empowerment) = snapshot.sample(COMMUNITY_EMPOWERMENT) {
        if empowerment < thresholds.community_empowerment_target {
            assessment.deduct(
                LOW_EMPOWERMENT_PENALTY,
                Issue::new(
                    component,
                    Severity::from_shortfall(LOW_EMPOWERMENT_PENALTY),
                    format!(
                        "Community empowerment {:.2} is below the target {:.2}",
                        empowerment, thresholds.community_empowerment_target
                    ),
                    "Revisit operations that do not empower the community",
                )
                .requiring_governance(),
            );
        }
    }

    if let Some(participation) = snapshot.sample(DEMOCRATIC_PARTICIPATION) {
        if participation < thresholds.democratic_participation_target {
            assessment.deduct(
                LOW_PARTICIPATION_PENALTY,
                Issue::new(
                    component,
                    Severity::from_shortfall(LOW_PARTICIPATION_PENALTY),
                    format!(
                        "Democratic participation {:.2} is below the target {:.2}",
                        participation, thresholds.democratic_participation_target
                    ),
                    "Increase member turnout for community votes",
                ),
            );
        }
    }

    assessment
}

fn backup(
    snapshot: &ProbeSnapshot,
    thresholds: &IntegrityThresholds,
) -> Result<Assessment, ProbeError> {
    let component = IntegrityComponent::Backup;
    let rate = snapshot.require(BACKUP_SUCCESS_RATE)?;
    let shortfall = (thresholds.backup_success_target - rate).max(0.0);

    let mut assessment = Assessment::healthy();
    if shortfall > 0.0 {
        assessment.deduct(
            shortfall,
            Issue::new(
                component,
                Severity::from_shortfall(shortfall),
                format!(
                    "Backup success rate {:.0}% over the last {} days is below the target {:.0}%",
                    rate * 100.0,
                    thresholds.backup_window_days,
                    thresholds.backup_success_target * 100.0
                ),
                "Investigate failing backup jobs and verify restore paths",
            ),
        );
    }

    if let Some(utilization) = snapshot.sample(STORAGE_UTILIZATION) {
        if utilization > thresholds.storage_utilization_limit {
            assessment.deduct(
                STORAGE_PRESSURE_PENALTY,
                Issue::new(
                    component,
                    Severity::from_shortfall(STORAGE_PRESSURE_PENALTY),
                    format!(
                        "Backup storage is {:.0}% full (limit {:.0}%)",
                        utilization * 100.0,
                        thresholds.storage_utilization_limit * 100.0
                    ),
                    "Expand community backup storage or prune expired backups",
                ),
            );
        }
    }

    Ok(assessment)
}

fn transparency(
    snapshot: &ProbeSnapshot,
    thresholds: &IntegrityThresholds,
) -> Result<Assessment, ProbeError> {
    let component = IntegrityComponent::Transparency;
    let ratio = snapshot.require(TRANSPARENCY_RATIO)?;

    let mut assessment = Assessment::healthy();
    let hidden = (1.0 - ratio).max(0.0);
    if hidden > 0.0 {
        assessment.deduct(
            hidden,
            Issue::new(
                component,
                Severity::from_shortfall(hidden),
                format!("Only {:.0}% of audit entries are publicly visible", ratio * 100.0),
                "Review audit visibility settings with the community",
            )
            .requiring_governance(),
        );
    }

    if let Some(completeness) = snapshot.sample(AUDIT_COMPLETENESS) {
        if completeness < thresholds.audit_completeness_target {
            assessment.deduct(
                INCOMPLETE_AUDIT_PENALTY,
                Issue::new(
                    component,
                    Severity::from_shortfall(INCOMPLETE_AUDIT_PENALTY),
                    format!(
                        "Audit log covers {:.0}% of recorded decisions (target {:.0}%)",
                        completeness * 100.0,
                        thresholds.audit_completeness_target * 100.0
                    ),
                    "Check the audit recorder for failed writes",
                ),
            );
        }
    }

    Ok(assessment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> IntegrityThresholds {
        IntegrityThresholds::default()
    }

    #[test]
    fn test_governance_penalties() {
        let healthy = ProbeSnapshot::new(1.0)
            .with_sample(STORE_REACHABLE, 1.0)
            .with_sample(RECENT_DECISIONS, 12.0);
        let result = assess(IntegrityComponent::Governance, &healthy, &thresholds()).unwrap();
        assert_eq!(result.score, 1.0);
        assert!(result.issues.is_empty());

        let idle = ProbeSnapshot::new(1.0)
            .with_sample(STORE_REACHABLE, 1.0)
            .with_sample(RECENT_DECISIONS, 0.0);
        let result = assess(IntegrityComponent::Governance, &idle, &thresholds()).unwrap();
        assert!((result.score - 0.8).abs() < 1e-9);
        assert!(result.issues[0].governance_required);

        let unreachable = ProbeSnapshot::new(0.0).with_sample(STORE_REACHABLE, 0.0);
        let result = assess(IntegrityComponent::Governance, &unreachable, &thresholds()).unwrap();
        assert_eq!(result.score, 0.5);
        assert_eq!(result.issues[0].severity, Severity::Critical);
    }

    #[test]
    fn test_sovereignty_shortfall() {
        let snapshot = ProbeSnapshot::new(0.5).with_sample(SOVEREIGNTY_CHECKED_RATE, 0.5);
        let result = assess(IntegrityComponent::Sovereignty, &snapshot, &thresholds()).unwrap();
        assert!((result.score - 0.55).abs() < 1e-9);
        assert_eq!(result.issues[0].severity, Severity::Critical);
        assert!(result.issues[0].governance_required);

        let compliant = ProbeSnapshot::new(0.97).with_sample(SOVEREIGNTY_CHECKED_RATE, 0.97);
        let result = assess(IntegrityComponent::Sovereignty, &compliant, &thresholds()).unwrap();
        assert_eq!(result.score, 1.0);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_liberation_penalties() {
        let snapshot = ProbeSnapshot::new(0.6)
            .with_sample(AVG_CREATOR_SHARE, 60.0)
            .with_sample(COMMUNITY_EMPOWERMENT, 0.6)
            .with_sample(DEMOCRATIC_PARTICIPATION, 0.9);
        let result = assess(IntegrityComponent::Liberation, &snapshot, &thresholds()).unwrap();
        assert!((result.score - 0.1).abs() < 1e-9);
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[0].severity, Severity::Critical);
        assert!(result.issues[0].description.contains("60.0%"));
        assert_eq!(result.issues[1].severity, Severity::High);
    }

    #[test]
    fn test_liberation_without_data_is_healthy() {
        let result =
            assess(IntegrityComponent::Liberation, &ProbeSnapshot::new(1.0), &thresholds()).unwrap();
        assert_eq!(result.score, 1.0);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_backup_penalties() {
        let snapshot = ProbeSnapshot::new(0.9)
            .with_sample(BACKUP_SUCCESS_RATE, 0.9)
            .with_sample(STORAGE_UTILIZATION, 0.9);
        let result = assess(IntegrityComponent::Backup, &snapshot, &thresholds()).unwrap();
        assert!((result.score - 0.85).abs() < 1e-9);
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[1].severity, Severity::Low);
    }

    #[test]
    fn test_transparency_penalties() {
        let snapshot = ProbeSnapshot::new(0.8)
            .with_sample(TRANSPARENCY_RATIO, 0.8)
            .with_sample(AUDIT_COMPLETENESS, 0.5);
        let result = assess(IntegrityComponent::Transparency, &snapshot, &thresholds()).unwrap();
        assert!((result.score - 0.7).abs() < 1e-9);
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn test_missing_required_sample() {
        let snapshot = ProbeSnapshot::new(0.9).with_sample(STORAGE_UTILIZATION, 0.5);
        let err = assess(IntegrityComponent::Backup, &snapshot, &thresholds()).unwrap_err();
        assert!(matches!(err, ProbeError::MissingSample("backup_success_rate")));
    }

    #[test]
    fn test_opaque_snapshot_uses_headline_score() {
        let result =
            assess(IntegrityComponent::Backup, &ProbeSnapshot::new(0.6), &thresholds()).unwrap();
        assert_eq!(result.score, 0.6);
        assert_eq!(result.issues[0].severity, Severity::Critical);

        let result =
            assess(IntegrityComponent::Backup, &ProbeSnapshot::new(0.95), &thresholds()).unwrap();
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_probe_failure_is_neutral() {
        let result = Assessment::probe_failed(IntegrityComponent::Backup, &ProbeError::Timeout(5_000));
        assert_eq!(result.score, 0.5);
        assert!(result.issues[0].description.contains("probe failed"));
    }
}
