//! Policy fed by a live gate.

use std::sync::Arc;

use stasis_gate::StasisGate;
use tracing::debug;

use crate::decision::{DissolutionMode, GovernanceDecision, GovernancePolicy, PolicyInputs};

/// Samples the gate for the `stasis_active` input, then applies
/// [`GovernancePolicy`].
///
/// The sample is a point-in-time read; the gate's enforcer remains the
/// authority on whether an individual action may proceed.
#[derive(Debug, Clone)]
pub struct StasisAwarePolicy {
    gate: Arc<StasisGate>,
    policy: GovernancePolicy,
}

impl StasisAwarePolicy {
    pub fn new(gate: Arc<StasisGate>) -> Self {
        Self {
            gate,
            policy: GovernancePolicy,
        }
    }

    /// Decide for an output that relies on `invariants`.
    pub fn decide<I, S>(
        &self,
        invariants: I,
        withhold: bool,
        dissolution: DissolutionMode,
        renegotiation_required: bool,
    ) -> GovernanceDecision
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stasis_active = invariants
            .into_iter()
            .any(|invariant| self.gate.is_active(invariant.as_ref()));

        let decision = self.policy.decide(PolicyInputs {
            withhold,
            dissolution,
            renegotiation_required,
            stasis_active,
        });

        debug!(
            stasis_active,
            dissolution = %dissolution,
            decision = %decision,
            "Governance decision"
        );
        decision
    }
}
