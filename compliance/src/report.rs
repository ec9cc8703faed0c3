//! Integrity report types.
//!
//! A report is a point-in-time aggregate over five governed domains. The
//! overall score is a fixed-weight sum of the component scores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::config::ScoreWeights;
use crate::thresholds::{CRITICAL_SHORTFALL, HIGH_SHORTFALL, MEDIUM_SHORTFALL};

/// Severity of an integrity issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Worth noting
    Low = 0,
    /// Requires attention
    Medium = 1,
    /// Act soon
    High = 2,
    /// Platform values at risk
    Critical = 3,
}

impl Severity {
    /// Classify by how far a measurement falls below its target.
    pub fn from_shortfall(shortfall: f64) -> Self {
        if shortfall > CRITICAL_SHORTFALL {
            Self::Critical
        } else if shortfall > HIGH_SHORTFALL {
            Self::High
        } else if shortfall > MEDIUM_SHORTFALL {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// A governed domain scored by the integrity aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum IntegrityComponent {
    Governance,
    Sovereignty,
    Liberation,
    Backup,
    Transparency,
}

impl IntegrityComponent {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Governance => "governance",
            Self::Sovereignty => "sovereignty",
            Self::Liberation => "liberation",
            Self::Backup => "backup",
            Self::Transparency => "transparency",
        }
    }

    /// Weight of this component in the overall score.
    pub fn weight(&self, weights: &ScoreWeights) -> f64 {
        match self {
            Self::Governance => weights.governance,
            Self::Sovereignty => weights.sovereignty,
            Self::Liberation => weights.liberation,
            Self::Backup => weights.backup,
            Self::Transparency => weights.transparency,
        }
    }

    /// All components in report order.
    pub fn all() -> [Self; 5] {
        [
            Self::Governance,
            Self::Sovereignty,
            Self::Liberation,
            Self::Backup,
            Self::Transparency,
        ]
    }
}

impl std::fmt::Display for IntegrityComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected shortfall with remediation guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Issue {
    pub severity: Severity,
    pub component: IntegrityComponent,
    pub description: String,
    pub resolution: String,
    /// Remediation needs a policy or community decision
    pub governance_required: bool,
}

impl Issue {
    /// Create an issue resolvable by operators.
    pub fn new(
        component: IntegrityComponent,
        severity: Severity,
        description: impl Into<String>,
        resolution: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            component,
            description: description.into(),
            resolution: resolution.into(),
            governance_required: false,
        }
    }

    /// Mark the issue as needing a community decision.
    pub fn requiring_governance(mut self) -> Self {
        self.governance_required = true;
        self
    }
}

/// Per-component scores (each 0.0 - 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ComponentScores {
    pub governance: f64,
    pub sovereignty: f64,
    pub liberation: f64,
    pub backup: f64,
    pub transparency: f64,
}

impl Default for ComponentScores {
    fn default() -> Self {
        Self {
            governance: 1.0,
            sovereignty: 1.0,
            liberation: 1.0,
            backup: 1.0,
            transparency: 1.0,
        }
    }
}

impl ComponentScores {
    /// Score for one component.
    pub fn get(&self, component: IntegrityComponent) -> f64 {
        match component {
            IntegrityComponent::Governance => self.governance,
            IntegrityComponent::Sovereignty => self.sovereignty,
            IntegrityComponent::Liberation => self.liberation,
            IntegrityComponent::Backup => self.backup,
            IntegrityComponent::Transparency => self.transparency,
        }
    }

    /// Set a component score, clamped to [0, 1]. NaN becomes 0.
    pub fn set(&mut self, component: IntegrityComponent, score: f64) {
        let score = clamp_unit(score);
        match component {
            IntegrityComponent::Governance => self.governance = score,
            IntegrityComponent::Sovereignty => self.sovereignty = score,
            IntegrityComponent::Liberation => self.liberation = score,
            IntegrityComponent::Backup => self.backup = score,
            IntegrityComponent::Transparency => self.transparency = score,
        }
    }

    /// Weighted sum of the component scores, clamped to [0, 1].
    pub fn weighted(&self, weights: &ScoreWeights) -> f64 {
        let sum: f64 = IntegrityComponent::all()
            .iter()
            .map(|c| c.weight(weights) * clamp_unit(self.get(*c)))
            .sum();
        clamp_unit(sum)
    }

    /// Weighted sum using the default weights.
    pub fn overall(&self) -> f64 {
        self.weighted(&ScoreWeights::default())
    }
}

/// Point-in-time integrity assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// Unique report ID
    pub id: String,
    /// Weighted overall score (0.0 - 1.0)
    pub overall: f64,
    /// Component scores
    pub components: ComponentScores,
    /// Issues, most severe first
    pub issues: Vec<Issue>,
    /// Remediation summary derived from the issues
    pub recommendations: Vec<String>,
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
}

impl IntegrityReport {
    /// Compose a report from component scores and detected issues.
    pub fn compose(components: ComponentScores, mut issues: Vec<Issue>, weights: &ScoreWeights) -> Self {
        // Stable sort keeps component order within a severity.
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));
        let recommendations = Self::recommend(&issues);

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            overall: components.weighted(weights),
            components,
            issues,
            recommendations,
            generated_at: Utc::now(),
        }
    }

    /// Most severe issue, if any.
    pub fn highest_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity).max()
    }

    /// Whether any issue needs a community decision.
    pub fn requires_governance(&self) -> bool {
        self.issues.iter().any(|i| i.governance_required)
    }

    /// Issues for one component.
    pub fn issues_for(&self, component: IntegrityComponent) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.component == component).collect()
    }

    fn recommend(issues: &[Issue]) -> Vec<String> {
        if issues.is_empty() {
            return vec![
                "All governed domains are within thresholds; continue scheduled monitoring"
                    .to_string(),
            ];
        }

        let mut recommendations = Vec::new();

        let mut governance_components: Vec<&str> = Vec::new();
        for issue in issues.iter().filter(|i| i.governance_required) {
            if !governance_components.contains(&issue.component.as_str()) {
                governance_components.push(issue.component.as_str());
            }
        }
        if !governance_components.is_empty() {
            recommendations.push(format!(
                "Convene a community governance review for: {}",
                governance_components.join(", ")
            ));
        }

        for issue in issues {
            if !recommendations.contains(&issue.resolution) {
                recommendations.push(issue.resolution.clone());
            }
        }

        recommendations
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_severity_from_shortfall() {
        assert_eq!(Severity::from_shortfall(0.05), Severity::Low);
        assert_eq!(Severity::from_shortfall(0.15), Severity::Medium);
        assert_eq!(Severity::from_shortfall(0.25), Severity::High);
        assert_eq!(Severity::from_shortfall(0.5), Severity::Critical);
        assert!(Severity::Critical > Severity::Low);
    }

    #[test]
    fn test_weighted_liberation_shortfall() {
        let scores = ComponentScores {
            liberation: 0.5,
            ..Default::default()
        };
        assert!((scores.overall() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_set_clamps() {
        let mut scores = ComponentScores::default();
        scores.set(IntegrityComponent::Backup, 1.7);
        scores.set(IntegrityComponent::Transparency, -0.2);
        scores.set(IntegrityComponent::Governance, f64::NAN);
        assert_eq!(scores.backup, 1.0);
        assert_eq!(scores.transparency, 0.0);
        assert_eq!(scores.governance, 0.0);
    }

    #[test]
    fn test_compose_ranks_issues() {
        let issues = vec![
            Issue::new(IntegrityComponent::Backup, Severity::Low, "storage high", "Expand storage"),
            Issue::new(
                IntegrityComponent::Liberation,
                Severity::Critical,
                "creator share low",
                "Restore creator-first revenue sharing",
            )
            .requiring_governance(),
        ];
        let report = IntegrityReport::compose(ComponentScores::default(), issues, &ScoreWeights::default());

        assert_eq!(report.issues[0].severity, Severity::Critical);
        assert_eq!(report.highest_severity(), Some(Severity::Critical));
        assert!(report.requires_governance());
        assert_eq!(
            report.recommendations[0],
            "Convene a community governance review for: liberation"
        );
        assert_eq!(report.recommendations.len(), 3);
        assert_eq!(report.issues_for(IntegrityComponent::Backup).len(), 1);
    }

    #[test]
    fn test_compose_without_issues() {
        let report = IntegrityReport::compose(ComponentScores::default(), vec![], &ScoreWeights::default());
        assert_eq!(report.overall, 1.0);
        assert_eq!(report.recommendations.len(), 1);
        assert!(!report.requires_governance());
    }

    proptest! {
        #[test]
        fn overall_is_weighted_sum_within_unit_range(
            g in 0.0f64..=1.0,
            s in 0.0f64..=1.0,
            l in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
            t in 0.0f64..=1.0,
        ) {
            let scores = ComponentScores { governance: g, sovereignty: s, liberation: l, backup: b, transparency: t };
            let overall = scores.overall();
            let expected = 0.25 * g + 0.25 * s + 0.30 * l + 0.10 * b + 0.10 * t;
            prop_assert!((0.0..=1.0).contains(&overall));
            prop_assert!((overall - expected).abs() < 1e-9);
        }

        #[test]
        fn overall_stays_in_range_for_out_of_range_inputs(
            g in -5.0f64..5.0,
            l in -5.0f64..5.0,
        ) {
            let scores = ComponentScores { governance: g, liberation: l, ..Default::default() };
            prop_assert!((0.0..=1.0).contains(&scores.overall()));
        }
    }
}
