//! Rule evaluators.
//!
//! Each evaluator scores one compliance dimension of an operation:
//! - **Consent**: whether the community agreed, and how
//! - **Sovereignty**: revenue share, creator control, data residency
//! - **Liberation**: empowerment and anti-oppression criteria
//!
//! Evaluators hold only configuration and never mutate state, so they can
//! be shared freely across threads.

mod consent;
mod liberation;
mod sovereignty;

pub use consent::ConsentEvaluator;
pub use liberation::{empowerment_score, resistance_score, LiberationEvaluator};
pub use sovereignty::SovereigntyEvaluator;
