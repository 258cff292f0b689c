//! Relational façade over the gate.
//!
//! Same state machine, friendlier surface: refusals carry the held intent so
//! the caller can see why an action was refused, and resolution routing is
//! checked before the gate sees it.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stasis_types::{
    Fingerprint, Fingerprintable, InvariantId, RenegotiationIntent, RenegotiationResolution,
    StasisEvent, StasisRecord,
};
use tracing::error;

use crate::error::StasisError;
use crate::gate::StasisGate;

/// Refusal raised by [`RelationalThreshold::encounter`].
#[derive(Debug, Clone)]
pub struct StasisEncountered {
    invariant: InvariantId,
    intent: RenegotiationIntent,
    intent_fingerprint: Fingerprint,
}

impl StasisEncountered {
    pub fn invariant(&self) -> &InvariantId {
        &self.invariant
    }

    pub fn intent(&self) -> &RenegotiationIntent {
        &self.intent
    }

    pub fn intent_fingerprint(&self) -> &Fingerprint {
        &self.intent_fingerprint
    }
}

// Intent content stays behind `intent()`; the message only correlates.
impl fmt::Display for StasisEncountered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "invariant `{}` is held in stasis; the action cannot proceed",
            self.invariant
        )?;
        writeln!(f)?;
        writeln!(f, "Resolution Context")?;
        writeln!(f, "  invariant: {}", self.invariant)?;
        write!(f, "  intent_fp: {}", self.intent_fingerprint)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceOrigin {
    Stasis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    Minimal,
}

/// Minimal residue left behind by a settled contest.
///
/// Carries no intent content and no attester labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectiveTrace {
    pub invariant: InvariantId,
    pub origin: TraceOrigin,
    pub detail_level: DetailLevel,
    pub last_event: StasisEvent,
    pub at: DateTime<Utc>,
    pub record_count: usize,
}

#[derive(Debug, Clone)]
pub struct RelationalThreshold {
    gate: Arc<StasisGate>,
    collective_trace: bool,
}

impl RelationalThreshold {
    pub fn new(gate: Arc<StasisGate>) -> Self {
        Self {
            gate,
            collective_trace: false,
        }
    }

    /// Opt in to [`CollectiveTrace`] artifacts.
    pub fn with_collective_trace(mut self, enabled: bool) -> Self {
        self.collective_trace = enabled;
        self
    }

    pub fn gate(&self) -> &Arc<StasisGate> {
        &self.gate
    }

    /// Enter stasis for the intent's invariant.
    pub fn hold_space(&self, intent: RenegotiationIntent) -> Fingerprint {
        self.gate.register_intent(intent)
    }

    /// Refuse with the held intent attached if `invariant` is contested.
    pub fn encounter(&self, invariant: &str) -> Result<(), StasisError> {
        match self.gate.current_intent(invariant) {
            Some(intent) => {
                let intent_fingerprint = intent.fingerprint();
                Err(StasisError::Encountered(Box::new(StasisEncountered {
                    invariant: intent.contested_invariant().clone(),
                    intent,
                    intent_fingerprint,
                })))
            }
            None => Ok(()),
        }
    }

    /// Non-throwing read of the held intent.
    pub fn stay_with_trouble(&self, invariant: &str) -> Option<RenegotiationIntent> {
        self.gate.current_intent(invariant)
    }

    /// Apply a resolution, rejecting one routed to the wrong contest before
    /// the gate sees it.
    pub fn acknowledge_resolution(
        &self,
        resolution: RenegotiationResolution,
    ) -> Result<(), StasisError> {
        let offered = resolution.contested_invariant();
        if let Some(held) = self.gate.current_intent(offered.as_str()) {
            if held.contested_invariant() != offered {
                error!(
                    held = %held.contested_invariant(),
                    offered = %offered,
                    "Resolution routed to the wrong contest"
                );
                return Err(StasisError::ResolutionMismatch {
                    held: held.contested_invariant().clone(),
                    offered: offered.clone(),
                });
            }
        }
        self.gate.apply_resolution(resolution)
    }

    pub fn is_stasis_tended(&self, invariant: &str) -> bool {
        self.gate.is_active(invariant)
    }

    pub fn retroactive_trace(&self, invariant: &str, limit: usize) -> Vec<StasisRecord> {
        self.gate.history(invariant, limit)
    }

    /// Residue of a settled contest. `None` while disabled, while the
    /// invariant is still contested, or when it has no history.
    pub fn collective_trace(&self, invariant: &str) -> Option<CollectiveTrace> {
        if !self.collective_trace || self.gate.is_active(invariant) {
            return None;
        }

        let records = self.gate.history(invariant, usize::MAX);
        let last = records.last()?;
        Some(CollectiveTrace {
            invariant: last.invariant.clone(),
            origin: TraceOrigin::Stasis,
            detail_level: DetailLevel::Minimal,
            last_event: last.event,
            at: last.at,
            record_count: records.len(),
        })
    }
}

impl Default for RelationalThreshold {
    fn default() -> Self {
        Self::new(Arc::new(StasisGate::new()))
    }
}
