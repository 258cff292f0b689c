#![deny(unsafe_code)]
//! Value objects for the Invariant Stasis Gate.
//!
//! A contest against a protected invariant is filed as a validated
//! [`RenegotiationIntent`]; it is settled by a quorum-backed
//! [`RenegotiationResolution`]. Both are immutable once built and both
//! reject malformed input at construction, so nothing under-specified can
//! reach gate state.
//!
//! The audit trail kept by the gate is made of [`StasisRecord`]s, which
//! carry only [`Fingerprint`]s and counts, never raw content or submitter
//! identity.
//!
//! ## Invariants
//!
//! - **Opaque invariants**: an [`InvariantId`] is an atomic, case-sensitive
//!   token. It is never parsed, prefix-matched or interpreted.
//! - **Collective submission**: intents are filed on behalf of a group
//!   (`collective:`, `role:`, `org:`, `council:`, `guild:`), never an individual.
//! - **Fingerprint stability**: equal field sets fingerprint identically,
//!   independent of key order. Identity-bearing fields are excluded.

pub mod error;
pub mod fingerprint;
pub mod intent;
pub mod invariant;
pub mod record;
pub mod resolution;

pub use error::{ValidationError, Violation};
pub use fingerprint::{fingerprint, Fingerprint, FingerprintFields, Fingerprintable};
pub use intent::{IntentDraft, RenegotiationIntent, SUBMITTER_PREFIXES};
pub use invariant::InvariantId;
pub use record::{notes, StasisEvent, StasisRecord};
pub use resolution::{
    RenegotiationResolution, ResolutionDraft, ResolutionOutcome, DEFAULT_QUORUM_MIN,
    MIN_SUMMARY_LEN,
};
