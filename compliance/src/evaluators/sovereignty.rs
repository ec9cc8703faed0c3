//! Creator and community sovereignty evaluation.

use crate::config::PolicyConfig;
use crate::decision::SovereigntyVerdict;
use crate::types::{Operation, RevenueSharing};

/// Evaluator for revenue share, creator control and data residency.
#[derive(Debug, Clone)]
pub struct SovereigntyEvaluator {
    config: PolicyConfig,
}

impl SovereigntyEvaluator {
    /// Create with default policy.
    pub fn new() -> Self {
        Self::with_config(&PolicyConfig::default())
    }

    /// Create from policy configuration.
    pub fn with_config(config: &PolicyConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Evaluate sovereignty for an operation.
    pub fn evaluate(&self, operation: &Operation) -> SovereigntyVerdict {
        let mut issues = Vec::new();

        let revenue_share_compliant = match &operation.revenue_sharing {
            // Non-monetized operation
            None => true,
            Some(sharing) => self.check_revenue(sharing, &mut issues),
        };

        let mut control_preserved = true;
        if let Some(rules) = &operation.sovereignty_rules {
            if rules.ownership_transfer {
                control_preserved = false;
                issues.push("ownership would transfer away from the creator".to_string());
            }
            if rules.control_restricted {
                control_preserved = false;
                issues.push("creator control over the data would be restricted".to_string());
            }
        }
        if let Some(backup) = &operation.backup_config {
            if !backup.community_controlled {
                control_preserved = false;
                issues.push("backup would not be under community control".to_string());
            }
        }

        let mut residency_compliant = true;
        let residency = operation
            .sovereignty_rules
            .as_ref()
            .and_then(|rules| rules.data_residency.as_deref());
        if let Some(region) = residency {
            if !self.config.region_allowed(region) {
                residency_compliant = false;
                issues.push(format!("data residency '{region}' is not an allowed region"));
            }
        }
        let destination = operation
            .backup_config
            .as_ref()
            .and_then(|backup| backup.destination_region.as_deref());
        if let Some(region) = destination {
            if !self.config.region_allowed(region) {
                residency_compliant = false;
                issues.push(format!("backup destination '{region}' is not an allowed region"));
            }
        }

        SovereigntyVerdict {
            maintained: revenue_share_compliant && control_preserved && residency_compliant,
            revenue_share_compliant,
            control_preserved,
            residency_compliant,
            issues,
        }
    }

    fn check_revenue(&self, sharing: &RevenueSharing, issues: &mut Vec<String>) -> bool {
        let mut compliant = true;
        if sharing.creator_share < self.config.min_creator_share {
            compliant = false;
            issues.push(format!(
                "creator share {}% is below the required {}%",
                sharing.creator_share, self.config.min_creator_share
            ));
        }
        if !sharing.is_balanced(self.config.share_tolerance) {
            compliant = false;
            issues.push(format!(
                "revenue shares total {}% instead of 100%",
                sharing.total()
            ));
        }
        compliant
    }
}

impl Default for SovereigntyEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BackupConfig, OperationKind, SovereigntyRules};

    fn content_with_share(creator: f64, community: f64) -> Operation {
        Operation::builder()
            .kind(OperationKind::ContentStorage)
            .payload("content-1")
            .revenue_sharing(RevenueSharing::new(creator, community))
            .build()
            .unwrap()
    }

    #[test]
    fn test_compliant_share() {
        let verdict = SovereigntyEvaluator::new().evaluate(&content_with_share(80.0, 20.0));
        assert!(verdict.revenue_share_compliant);
        assert!(verdict.maintained);
        assert_eq!(verdict.score(), 1.0);
    }

    #[test]
    fn test_share_below_minimum() {
        let verdict = SovereigntyEvaluator::new().evaluate(&content_with_share(60.0, 40.0));
        assert!(!verdict.revenue_share_compliant);
        assert!(!verdict.maintained);
        assert_eq!(verdict.issues, vec!["creator share 60% is below the required 75%"]);
    }

    #[test]
    fn test_unbalanced_share() {
        let verdict = SovereigntyEvaluator::new().evaluate(&content_with_share(80.0, 10.0));
        assert!(!verdict.revenue_share_compliant);
        assert!(verdict.issues[0].contains("90%"));
    }

    #[test]
    fn test_missing_revenue_is_vacuously_compliant() {
        let operation = Operation::builder()
            .kind(OperationKind::DataStorage)
            .payload("dataset-1")
            .build()
            .unwrap();
        let verdict = SovereigntyEvaluator::new().evaluate(&operation);
        assert!(verdict.revenue_share_compliant);
        assert!(verdict.maintained);
    }

    #[test]
    fn test_control_and_residency() {
        let operation = Operation::builder()
            .kind(OperationKind::Export)
            .payload("dataset-1")
            .sovereignty_rules(SovereigntyRules {
                data_residency: Some("offshore".to_string()),
                ownership_transfer: true,
                ..Default::default()
            })
            .build()
            .unwrap();
        let verdict = SovereigntyEvaluator::new().evaluate(&operation);
        assert!(verdict.revenue_share_compliant);
        assert!(!verdict.control_preserved);
        assert!(!verdict.residency_compliant);
        assert!(!verdict.maintained);
        assert!((verdict.score() - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(verdict.issues.len(), 2);
    }

    #[test]
    fn test_backup_destination_checked() {
        let operation = Operation::builder()
            .kind(OperationKind::Backup)
            .payload("snapshot-1")
            .backup_config(BackupConfig {
                encrypted: true,
                community_controlled: true,
                retention_days: 90,
                destination_region: Some("EU".to_string()),
            })
            .build()
            .unwrap();
        assert!(SovereigntyEvaluator::new().evaluate(&operation).maintained);
    }
}
