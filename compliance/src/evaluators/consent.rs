//! Community consent evaluation.
//!
//! No voting subsystem is consulted. Kinds on the vote-required list are
//! assumed to have passed their vote unless a [`CommunityVote`] tally is
//! attached to the operation; an attached tally is always honoured.

use tracing::debug;

use crate::config::PolicyConfig;
use crate::decision::{ConsentMechanism, ConsentVerdict};
use crate::types::{CommunityVote, Operation, OperationKind};

/// Evaluator for community consent.
#[derive(Debug, Clone)]
pub struct ConsentEvaluator {
    /// Kinds needing a democratic vote
    vote_required: Vec<OperationKind>,
    /// For-vote ratio that must be exceeded
    approval_threshold: f64,
}

impl ConsentEvaluator {
    /// Create with default policy.
    pub fn new() -> Self {
        Self::with_config(&PolicyConfig::default())
    }

    /// Create from policy configuration.
    pub fn with_config(config: &PolicyConfig) -> Self {
        Self {
            vote_required: config.vote_required_kinds.clone(),
            approval_threshold: config.vote_approval_threshold,
        }
    }

    /// Evaluate consent for an operation.
    pub fn evaluate(&self, operation: &Operation) -> ConsentVerdict {
        if let Some(vote) = &operation.community_vote {
            return self.evaluate_vote(vote);
        }

        let vote_required = self.vote_required.contains(&operation.kind);
        match (vote_required, operation.community_approval_required()) {
            (true, true) => {
                debug!(
                    kind = %operation.kind,
                    "No vote tally attached; treating community vote as passed"
                );
                ConsentVerdict {
                    obtained: true,
                    participation_rate: 1.0,
                    mechanism: ConsentMechanism::DemocraticVote,
                    score: 1.0,
                    issue: None,
                }
            }
            (true, false) => ConsentVerdict {
                obtained: true,
                participation_rate: 0.0,
                mechanism: ConsentMechanism::EmergencyOverride,
                score: 1.0,
                issue: None,
            },
            (false, _) => ConsentVerdict {
                obtained: true,
                participation_rate: 1.0,
                mechanism: ConsentMechanism::Delegated,
                score: 1.0,
                issue: None,
            },
        }
    }

    fn evaluate_vote(&self, vote: &CommunityVote) -> ConsentVerdict {
        let approval = vote.approval_ratio();
        let obtained = approval > self.approval_threshold;
        let mechanism = if vote.is_unanimous() {
            ConsentMechanism::Consensus
        } else {
            ConsentMechanism::DemocraticVote
        };

        let issue = (!obtained).then(|| {
            format!(
                "community vote did not pass ({} for, {} against; approval {:.0}% needs more than {:.0}%)",
                vote.votes_for,
                vote.votes_against,
                approval * 100.0,
                self.approval_threshold * 100.0
            )
        });

        ConsentVerdict {
            obtained,
            participation_rate: vote.participation_rate(),
            mechanism,
            score: approval,
            issue,
        }
    }
}

impl Default for ConsentEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
