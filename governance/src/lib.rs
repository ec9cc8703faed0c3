//! Governance - policy decisions and integrity monitoring
//!
//! Ties the compliance rules to durable records:
//! - [`PolicyService`] evaluates operations and records every decision,
//!   with an emergency path that waives the community vote
//! - [`IntegrityAggregator`] scores five governed domains from health probes
//!   and keeps a history of integrity reports
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Decision   ┌───────────────┐
//! │ PolicyService│─────────────▶│ AuditRecorder │──┐
//! │ (PolicyEngine│              └───────────────┘  │
//! └──────────────┘                                 ▼
//!                                          ┌──────────────┐
//! ┌────────────────────┐   probes read     │ RecordStore  │
//! │ IntegrityAggregator│◀──────────────────│              │
//! │ (5 HealthProbes)   │──── reports ─────▶│              │
//! └────────────────────┘                   └──────────────┘
//! ```

pub mod aggregator;
pub mod assess;
pub mod error;
pub mod probes;
pub mod service;

// Re-export main types for convenience
pub use aggregator::IntegrityAggregator;
pub use error::{GovernanceError, ProbeError, Result};
pub use probes::{
    DecisionActivityProbe, HealthProbe, LiberationMetricsProbe, ProbeSnapshot, SovereigntyAuditProbe,
    StaticProbe, TransparencyProbe,
};
pub use service::{PolicyService, RecordedDecision};
