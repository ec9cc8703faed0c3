//! Liberation criteria evaluation.
//!
//! Empowerment is the equal-weighted mean of four flags. Resistance starts
//! at a base and gains bonuses for anti-oppression and mutual-aid support.

use crate::config::PolicyConfig;
use crate::decision::LiberationVerdict;
use crate::thresholds::{ANTI_OPPRESSION_BONUS, MUTUAL_AID_BONUS, NEUTRAL_SCORE, RESISTANCE_BASE};
use crate::types::{LiberationCriteria, LiberationInput, Operation};

/// Evaluator for liberation criteria.
#[derive(Debug, Clone)]
pub struct LiberationEvaluator {
    /// Empowerment score required for validity
    threshold: f64,
}

impl LiberationEvaluator {
    /// Create with default policy.
    pub fn new() -> Self {
        Self::with_config(&PolicyConfig::default())
    }

    /// Create from policy configuration.
    pub fn with_config(config: &PolicyConfig) -> Self {
        Self {
            threshold: config.empowerment_threshold,
        }
    }

    /// Create with custom threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Evaluate liberation criteria for an operation.
    pub fn evaluate(&self, operation: &Operation) -> LiberationVerdict {
        match &operation.liberation {
            LiberationInput::Provided(criteria) => self.evaluate_criteria(criteria),
            LiberationInput::NotProvided => {
                let required = operation.kind.requires_liberation_validation();
                let issues = if required {
                    vec![format!(
                        "No liberation criteria provided; neutral empowerment score {:.2} is below the required {:.2}",
                        NEUTRAL_SCORE, self.threshold
                    )]
                } else {
                    vec![]
                };
                LiberationVerdict {
                    valid: !required,
                    empowerment_score: NEUTRAL_SCORE,
                    resistance_score: NEUTRAL_SCORE,
                    criteria_provided: false,
                    issues,
                }
            }
        }
    }

    fn evaluate_criteria(&self, criteria: &LiberationCriteria) -> LiberationVerdict {
        let empowerment_score = empowerment_score(criteria);
        let resistance_score = resistance_score(criteria);

        let required = [
            (criteria.empowers_community, "Operation does not empower the community"),
            (
                criteria.maintains_sovereignty,
                "Operation does not maintain creator and community sovereignty",
            ),
            (criteria.prevents_oppression, "Operation lacks anti-oppression safeguards"),
            (
                criteria.supports_democratic_participation,
                "Operation does not support democratic participation",
            ),
        ];
        let mut issues: Vec<String> = required
            .iter()
            .filter(|(met, _)| !met)
            .map(|(_, issue)| issue.to_string())
            .collect();

        if empowerment_score < self.threshold {
            issues.push(format!(
                "Empowerment score {:.2} is below the required {:.2}",
                empowerment_score, self.threshold
            ));
        }

        LiberationVerdict {
            valid: issues.is_empty(),
            empowerment_score,
            resistance_score,
            criteria_provided: true,
            issues,
        }
    }
}

impl Default for LiberationEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean of the four empowerment flags, clamped to [0, 1].
pub fn empowerment_score(criteria: &LiberationCriteria) -> f64 {
    let flags = [
        criteria.empowers_community,
        criteria.maintains_sovereignty,
        criteria.promotes_community_liberation,
        criteria.supports_democratic_participation,
    ];
    let met = flags.iter().filter(|flag| **flag).count() as f64;
    (met / flags.len() as f64).clamp(0.0, 1.0)
}

/// Resistance to oppression, capped at 1.0.
pub fn resistance_score(criteria: &LiberationCriteria) -> f64 {
    let mut score = RESISTANCE_BASE;
    if criteria.prevents_oppression {
        score += ANTI_OPPRESSION_BONUS;
    }
    if criteria.enables_mutual_aid {
        score += MUTUAL_AID_BONUS;
    }
    score.min(1.0)
}
