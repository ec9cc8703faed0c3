//! Error types for the governance layer.

use audit_trail::StoreError;
use compliance::ComplianceError;

/// Errors returned by the policy service and the integrity aggregator.
///
/// Policy rejections are never errors; a rejected operation comes back as a
/// decision with `approved = false`.
#[derive(Debug, thiserror::Error)]
pub enum GovernanceError {
    /// Operation or configuration is malformed
    #[error("Compliance error: {0}")]
    Compliance(#[from] ComplianceError),

    /// Record store failed where the caller needs the result
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Request validation error
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, GovernanceError>;

/// Errors a health probe can report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProbeError {
    /// Probed subsystem could not be reached
    #[error("Probe target unavailable: {0}")]
    Unavailable(String),

    /// Probe did not answer in time
    #[error("Probe timed out after {0}ms")]
    Timeout(u64),

    /// Snapshot lacks a sample the assessment needs
    #[error("Missing probe sample: {0}")]
    MissingSample(&'static str),
}

impl From<StoreError> for ProbeError {
    fn from(err: StoreError) -> Self {
        Self::Unavailable(err.to_string())
    }
}
