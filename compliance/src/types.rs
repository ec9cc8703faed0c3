//! Operation model submitted for policy evaluation.
//!
//! With the `typescript` feature enabled, these types can be exported to
//! TypeScript using ts-rs for the platform frontend.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Kind of operation being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Persisting member data
    DataStorage,
    /// Persisting creator content (monetized)
    ContentStorage,
    /// Backing up community data
    Backup,
    /// Exporting data out of the platform
    Export,
    /// Deleting data
    Deletion,
    /// Connecting a third-party platform
    PlatformIntegration,
    /// Running analytics over community data
    Analytics,
}

impl OperationKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataStorage => "data_storage",
            Self::ContentStorage => "content_storage",
            Self::Backup => "backup",
            Self::Export => "export",
            Self::Deletion => "deletion",
            Self::PlatformIntegration => "platform_integration",
            Self::Analytics => "analytics",
        }
    }

    /// Whether the operation must carry passing liberation criteria.
    ///
    /// Backups and deletions protect or withdraw existing data; every
    /// other kind fails closed without liberation metadata.
    pub fn requires_liberation_validation(&self) -> bool {
        !matches!(self, Self::Backup | Self::Deletion)
    }

    /// All kinds.
    pub fn all() -> Vec<Self> {
        vec![
            Self::DataStorage,
            Self::ContentStorage,
            Self::Backup,
            Self::Export,
            Self::Deletion,
            Self::PlatformIntegration,
            Self::Analytics,
        ]
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sovereignty constraints attached to an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct SovereigntyRules {
    /// Region the data will live in
    pub data_residency: Option<String>,
    /// Ownership moves away from the creator or community
    pub ownership_transfer: bool,
    /// Creator control over the data is restricted
    pub control_restricted: bool,
    /// An explicit community vote is required
    pub community_approval_required: bool,
    /// Every step must be written to the fine-grained audit log
    pub audit_trail_required: bool,
}

impl Default for SovereigntyRules {
    fn default() -> Self {
        Self {
            data_residency: None,
            ownership_transfer: false,
            control_restricted: false,
            community_approval_required: true,
            audit_trail_required: false,
        }
    }
}

/// How revenue from an operation is split (percentages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RevenueSharing {
    /// Creator share (0-100)
    pub creator_share: f64,
    /// Community share (0-100)
    pub community_share: f64,
    /// Platform share (0-100)
    #[serde(default)]
    pub platform_share: Option<f64>,
    /// Accounting is published to the community
    #[serde(default)]
    pub transparent_accounting: bool,
}

impl RevenueSharing {
    /// Create a creator/community split with transparent accounting.
    pub fn new(creator_share: f64, community_share: f64) -> Self {
        Self {
            creator_share,
            community_share,
            platform_share: None,
            transparent_accounting: true,
        }
    }

    /// Builder: set the platform share.
    pub fn with_platform_share(mut self, share: f64) -> Self {
        self.platform_share = Some(share);
        self
    }

    /// Sum of all shares.
    pub fn total(&self) -> f64 {
        self.creator_share + self.community_share + self.platform_share.unwrap_or(0.0)
    }

    /// Whether shares sum to 100 within the tolerance.
    pub fn is_balanced(&self, tolerance: f64) -> bool {
        (self.total() - 100.0).abs() <= tolerance
    }

    /// Reject shares that cannot be evaluated at all.
    pub fn validate(&self) -> Result<()> {
        let shares = [
            ("creator_share", Some(self.creator_share)),
            ("community_share", Some(self.community_share)),
            ("platform_share", self.platform_share),
        ];
        for (name, share) in shares {
            if let Some(value) = share {
                if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                    return Err(ComplianceError::InvalidRevenueSharing(format!(
                        "{name} must be within 0-100, got {value}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Qualitative liberation flags declared for an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct LiberationCriteria {
    pub empowers_community: bool,
    pub maintains_sovereignty: bool,
    pub prevents_oppression: bool,
    pub enables_mutual_aid: bool,
    pub supports_democratic_participation: bool,
    pub promotes_community_liberation: bool,
}

impl LiberationCriteria {
    /// Every flag set.
    pub fn all() -> Self {
        Self {
            empowers_community: true,
            maintains_sovereignty: true,
            prevents_oppression: true,
            enables_mutual_aid: true,
            supports_democratic_participation: true,
            promotes_community_liberation: true,
        }
    }
}

/// Whether liberation criteria accompany the operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "status", content = "criteria", rename_all = "snake_case")]
pub enum LiberationInput {
    /// Criteria were declared
    Provided(LiberationCriteria),
    /// Nothing declared; evaluated with neutral scores
    #[default]
    NotProvided,
}

impl LiberationInput {
    /// Borrow the criteria if present.
    pub fn criteria(&self) -> Option<&LiberationCriteria> {
        match self {
            Self::Provided(criteria) => Some(criteria),
            Self::NotProvided => None,
        }
    }
}

impl From<Option<LiberationCriteria>> for LiberationInput {
    fn from(criteria: Option<LiberationCriteria>) -> Self {
        criteria.map_or(Self::NotProvided, Self::Provided)
    }
}

/// Backup settings for backup operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct BackupConfig {
    /// Backup is encrypted at rest
    pub encrypted: bool,
    /// Community holds the keys / controls restore
    pub community_controlled: bool,
    /// Retention period
    pub retention_days: u32,
    /// Where the backup is shipped
    #[serde(default)]
    pub destination_region: Option<String>,
}

/// Tally of a community vote attached to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CommunityVote {
    pub eligible_voters: u32,
    pub votes_for: u32,
    pub votes_against: u32,
    #[serde(default)]
    pub abstentions: u32,
}

impl CommunityVote {
    /// Total ballots cast, abstentions included.
    pub fn ballots_cast(&self) -> u64 {
        u64::from(self.votes_for) + u64::from(self.votes_against) + u64::from(self.abstentions)
    }

    /// Ballots cast over eligible voters (0.0 - 1.0).
    pub fn participation_rate(&self) -> f64 {
        if self.eligible_voters == 0 {
            return 0.0;
        }
        (self.ballots_cast() as f64 / self.eligible_voters as f64).clamp(0.0, 1.0)
    }

    /// For-votes over decisive votes (0.0 - 1.0).
    pub fn approval_ratio(&self) -> f64 {
        let decisive = u64::from(self.votes_for) + u64::from(self.votes_against);
        if decisive == 0 {
            return 0.0;
        }
        self.votes_for as f64 / decisive as f64
    }

    /// Every eligible member voted in favour.
    pub fn is_unanimous(&self) -> bool {
        self.eligible_voters > 0 && self.votes_for == self.eligible_voters
    }

    fn validate(&self) -> Result<()> {
        if self.eligible_voters == 0 {
            return Err(ComplianceError::InvalidOperation(
                "community vote has no eligible voters".to_string(),
            ));
        }
        if self.ballots_cast() > u64::from(self.eligible_voters) {
            return Err(ComplianceError::InvalidOperation(format!(
                "community vote has {} ballots for {} eligible voters",
                self.ballots_cast(),
                self.eligible_voters
            )));
        }
        Ok(())
    }
}

/// A requested action subject to policy evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Operation {
    /// Kind of operation
    pub kind: OperationKind,
    /// Reference to the payload (content id, dataset, target platform)
    pub payload: String,
    /// Sovereignty constraints
    #[serde(default)]
    pub sovereignty_rules: Option<SovereigntyRules>,
    /// Revenue split, absent for non-monetized operations
    #[serde(default)]
    pub revenue_sharing: Option<RevenueSharing>,
    /// Liberation criteria
    #[serde(default)]
    pub liberation: LiberationInput,
    /// Backup settings
    #[serde(default)]
    pub backup_config: Option<BackupConfig>,
    /// Community vote tally, if one was held
    #[serde(default)]
    pub community_vote: Option<CommunityVote>,
}

impl Operation {
    /// Create a builder.
    pub fn builder() -> OperationBuilder {
        OperationBuilder::new()
    }

    /// Whether a community vote is required (defaults to true).
    pub fn community_approval_required(&self) -> bool {
        self.sovereignty_rules
            .as_ref()
            .map_or(true, |rules| rules.community_approval_required)
    }

    /// Whether the caller asked for a fine-grained audit log.
    pub fn audit_trail_required(&self) -> bool {
        self.sovereignty_rules
            .as_ref()
            .is_some_and(|rules| rules.audit_trail_required)
    }

    /// Copy of this operation with the community approval precondition waived.
    pub fn with_community_approval_waived(&self) -> Self {
        let mut operation = self.clone();
        operation
            .sovereignty_rules
            .get_or_insert_with(SovereigntyRules::default)
            .community_approval_required = false;
        operation
    }

    /// Check that the operation can be evaluated at all.
    ///
    /// Policy problems are not errors; this only rejects malformed input.
    pub fn validate(&self) -> Result<()> {
        if self.payload.trim().is_empty() {
            return Err(ComplianceError::MissingField("payload"));
        }
        if let Some(sharing) = &self.revenue_sharing {
            sharing.validate()?;
        }
        if let Some(vote) = &self.community_vote {
            vote.validate()?;
        }
        Ok(())
    }
}

/// Builder for [`Operation`].
#[derive(Debug, Clone, Default)]
pub struct OperationBuilder {
    kind: Option<OperationKind>,
    payload: Option<String>,
    sovereignty_rules: Option<SovereigntyRules>,
    revenue_sharing: Option<RevenueSharing>,
    liberation: LiberationInput,
    backup_config: Option<BackupConfig>,
    community_vote: Option<CommunityVote>,
}

impl OperationBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operation kind.
    pub fn kind(mut self, kind: OperationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the payload reference.
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Set sovereignty rules.
    pub fn sovereignty_rules(mut self, rules: SovereigntyRules) -> Self {
        self.sovereignty_rules = Some(rules);
        self
    }

    /// Set revenue sharing.
    pub fn revenue_sharing(mut self, sharing: RevenueSharing) -> Self {
        self.revenue_sharing = Some(sharing);
        self
    }

    /// Declare liberation criteria.
    pub fn liberation_criteria(mut self, criteria: LiberationCriteria) -> Self {
        self.liberation = LiberationInput::Provided(criteria);
        self
    }

    /// Set backup configuration.
    pub fn backup_config(mut self, config: BackupConfig) -> Self {
        self.backup_config = Some(config);
        self
    }

    /// Attach a community vote tally.
    pub fn community_vote(mut self, vote: CommunityVote) -> Self {
        self.community_vote = Some(vote);
        self
    }

    /// Build and validate the operation.
    pub fn build(self) -> Result<Operation> {
        let operation = Operation {
            kind: self.kind.ok_or(ComplianceError::MissingField("kind"))?,
            payload: self.payload.ok_or(ComplianceError::MissingField("payload"))?,
            sovereignty_rules: self.sovereignty_rules,
            revenue_sharing: self.revenue_sharing,
            liberation: self.liberation,
            backup_config: self.backup_config,
            community_vote: self.community_vote,
        };
        operation.validate()?;
        Ok(operation)
    }
}

/// Error types for compliance evaluation.
///
/// Policy rejections are never errors; these signal malformed input or
/// configuration.
#[derive(Debug, thiserror::Error)]
pub enum ComplianceError {
    /// A field needed for evaluation is absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Revenue shares cannot be interpreted
    #[error("Invalid revenue sharing: {0}")]
    InvalidRevenueSharing(String),

    /// Operation is structurally malformed
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration violates an invariant
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ComplianceError>;
