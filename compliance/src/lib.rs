//! Compliance rule evaluation for community platform operations.
//!
//! Every data, backup or content operation is scored against three
//! compliance dimensions before it runs:
//!
//! - **Consent**: did the community agree, and through which mechanism
//! - **Sovereignty**: creator-first revenue share, creator control, residency
//! - **Liberation**: empowerment and anti-oppression criteria
//!
//! The [`PolicyEngine`] composes the three verdicts into an auditable
//! [`Decision`]. The [`IntegrityReport`] types describe the periodic
//! system-wide assessment built by the `governance` crate.
//!
//! # Example
//!
//! ```
//! use compliance::{LiberationCriteria, Operation, OperationKind, PolicyEngine, RevenueSharing};
//!
//! let operation = Operation::builder()
//!     .kind(OperationKind::ContentStorage)
//!     .payload("content-123")
//!     .revenue_sharing(RevenueSharing::new(80.0, 20.0))
//!     .liberation_criteria(LiberationCriteria::all())
//!     .build()?;
//!
//! let decision = PolicyEngine::new().evaluate(&operation)?;
//! assert!(decision.approved);
//! # Ok::<(), compliance::ComplianceError>(())
//! ```

pub mod config;
pub mod decision;
pub mod engine;
pub mod evaluators;
pub mod report;
pub mod thresholds;
pub mod types;

// Re-export main types
pub use config::{AuditConfig, GovernanceConfig, IntegrityConfig, IntegrityThresholds, PolicyConfig, ScoreWeights};
pub use decision::*;
pub use engine::PolicyEngine;
pub use evaluators::{ConsentEvaluator, LiberationEvaluator, SovereigntyEvaluator};
pub use report::*;
pub use types::*;
