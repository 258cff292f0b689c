//! Governance policy combinator.
//!
//! Maps `{stasis, dissolution mode, renegotiation, withhold}` onto one of
//! `emit`, `withhold`, `halt` or `dissolve`. Contested invariants never emit.

#![deny(unsafe_code)]

pub mod decision;
pub mod error;
pub mod stasis_aware;

pub use decision::{DissolutionMode, GovernanceDecision, GovernancePolicy, PolicyInputs};
pub use error::PolicyError;
pub use stasis_aware::StasisAwarePolicy;
