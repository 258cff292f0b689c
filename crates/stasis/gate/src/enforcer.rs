//! The single pre-action check.
//!
//! Action-performing code asks the enforcer whether every invariant it relies
//! on is clear. No method skips the gate.

use std::sync::Arc;

use tracing::debug;

use crate::error::StasisError;
use crate::gate::StasisGate;

#[derive(Debug, Clone)]
pub struct InvariantEnforcer {
    gate: Arc<StasisGate>,
}

impl InvariantEnforcer {
    pub fn new(gate: Arc<StasisGate>) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> &Arc<StasisGate> {
        &self.gate
    }

    /// Check `invariants` in the order given, stopping at the first contested
    /// one. An empty list passes.
    pub fn require_clear<I, S>(&self, invariants: I) -> Result<(), StasisError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for invariant in invariants {
            let invariant = invariant.as_ref();
            if let Err(err) = self.gate.require_not_in_stasis(invariant) {
                debug!(invariant = %invariant, "Enforcer blocked action");
                return Err(err);
            }
        }
        Ok(())
    }
}
