//! Invariant Stasis Gate
//!
//! When a protected invariant is contested, the gate holds it in *stasis*:
//! every action relying on it is refused until the contest is settled by a
//! quorum-attested resolution or lapses through temporal decay.
//!
//! # Guarantees
//!
//! - **Non-bypassable**: the only route back to `CLEAR` is an applied
//!   resolution or TTL expiry. There is no override.
//! - **Exactly-once clearing**: a resolution clears one contest; replaying it
//!   fails.
//! - **Linear history**: operations on one invariant are totally ordered.
//! - **Minimal audit**: records carry fingerprints and counts, never intent
//!   content or attester labels.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use stasis_gate::{InvariantEnforcer, StasisGate};
//! use stasis_types::{RenegotiationIntent, RenegotiationResolution};
//!
//! let gate = Arc::new(StasisGate::new());
//! let enforcer = InvariantEnforcer::new(gate.clone());
//!
//! let intent = RenegotiationIntent::builder("no_ranking", "collective:stewards")
//!     .triggering_event("attempted ranking")
//!     .impacted_group("newcomers")
//!     .harm_claim("ranking silences newcomers")
//!     .counter_harm_risk("comparative gradients")
//!     .non_negotiable("no_ranking")
//!     .alternative("emit_refusal")
//!     .build()?;
//! gate.register_intent(intent);
//! assert!(enforcer.require_clear(["no_ranking"]).is_err());
//!
//! let resolution = RenegotiationResolution::builder("no_ranking", "Upheld after review")
//!     .community_window_closed(true)
//!     .attestations(["council:a", "guild:b"])
//!     .build()?;
//! gate.apply_resolution(resolution)?;
//! assert!(enforcer.require_clear(["no_ranking"]).is_ok());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod enforcer;
pub mod error;
pub mod gate;
mod history;
pub mod sink;
pub mod telemetry;
pub mod threshold;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{GateConfig, LoggingConfig, StasisConfig};
pub use enforcer::InvariantEnforcer;
pub use error::{ConfigError, ResolutionRejection, SinkError, StasisError};
pub use gate::{StasisGate, StasisGateBuilder};
pub use sink::{AuditSink, JsonlAuditSink, MemoryAuditSink};
pub use threshold::{CollectiveTrace, DetailLevel, RelationalThreshold, StasisEncountered, TraceOrigin};

pub use stasis_types as types;
