use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use stasis_types::{
    notes, Fingerprint, Fingerprintable, InvariantId, RenegotiationIntent,
    RenegotiationResolution, StasisEvent, StasisRecord,
};
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::GateConfig;
use crate::error::{ConfigError, ResolutionRejection, StasisError};
use crate::history::AuditTrail;
use crate::sink::AuditSink;

/// One contested invariant.
#[derive(Debug)]
struct StasisSlot {
    intent: RenegotiationIntent,
    intent_fingerprint: Fingerprint,
    entered_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl StasisSlot {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Everything guarded by the gate's lock.
#[derive(Debug)]
struct GateState {
    slots: HashMap<InvariantId, StasisSlot>,
    trail: AuditTrail,
}

impl GateState {
    /// Append to the trail and queue the record for the sink.
    fn record(&mut self, record: StasisRecord, outbox: &mut Vec<StasisRecord>) {
        outbox.push(record.clone());
        self.trail.append(record);
    }

    /// Lazy TTL decay: drop the slot if its contest has outlived the TTL.
    fn expire_if_due(
        &mut self,
        invariant: &str,
        now: DateTime<Utc>,
        outbox: &mut Vec<StasisRecord>,
    ) {
        let due = self
            .slots
            .get(invariant)
            .is_some_and(|slot| slot.is_expired(now));
        if !due {
            return;
        }

        if let Some((id, slot)) = self.slots.remove_entry(invariant) {
            info!(
                invariant = %id,
                intent_fp = %slot.intent_fingerprint,
                "Stasis expired unresolved"
            );
            self.record(
                StasisRecord::new(id, StasisEvent::Expired, now)
                    .with_intent(slot.intent_fingerprint)
                    .with_note(notes::TTL_ELAPSED_UNRESOLVED),
                outbox,
            );
        }
    }

    fn expire_all_due(&mut self, now: DateTime<Utc>, outbox: &mut Vec<StasisRecord>) {
        let due: Vec<InvariantId> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.is_expired(now))
            .map(|(id, _)| id.clone())
            .collect();
        for id in due {
            self.expire_if_due(id.as_str(), now, outbox);
        }
    }
}

/// The Stasis Gate: authoritative state machine for contested invariants.
///
/// Per invariant: `CLEAR` (no slot) → `CONTESTED` (slot held) → back to
/// `CLEAR` only through TTL expiry or an applied resolution. There is no
/// override and no administrative bypass.
///
/// Every public operation runs under one lock per gate, so operations on the
/// same invariant observe a single linear history. TTL is checked lazily at
/// the start of each operation; there is no background sweeper. Audit records
/// are handed to the optional [`AuditSink`] after the lock is released.
pub struct StasisGate {
    state: Mutex<GateState>,
    config: GateConfig,
    clock: Arc<dyn Clock>,
    sink: Option<Arc<dyn AuditSink>>,
    sink_failures: AtomicU64,
}

impl StasisGate {
    /// Gate with default configuration and the system clock.
    pub fn new() -> Self {
        Self::assemble(GateConfig::default(), Arc::new(SystemClock), None)
    }

    /// Gate with the given configuration and the system clock.
    pub fn with_config(config: GateConfig) -> Result<Self, ConfigError> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> StasisGateBuilder {
        StasisGateBuilder::default()
    }

    fn assemble(
        config: GateConfig,
        clock: Arc<dyn Clock>,
        sink: Option<Arc<dyn AuditSink>>,
    ) -> Self {
        Self {
            state: Mutex::new(GateState {
                slots: HashMap::new(),
                trail: AuditTrail::new(config.history_limit),
            }),
            config,
            clock,
            sink,
            sink_failures: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Enter (or re-enter) stasis for the intent's invariant.
    ///
    /// Latest contest wins: an existing slot is overwritten and its TTL
    /// restarts. Returns the intent's fingerprint.
    pub fn register_intent(&self, intent: RenegotiationIntent) -> Fingerprint {
        let now = self.clock.now();
        let invariant = intent.contested_invariant().clone();
        let fingerprint = intent.fingerprint();
        let expires_at = self
            .config
            .ttl()
            .and_then(|ttl| now.checked_add_signed(ttl));

        let mut outbox = Vec::new();
        let replaced = {
            let mut state = self.state.lock();
            state.expire_if_due(invariant.as_str(), now, &mut outbox);

            let previous = state.slots.insert(
                invariant.clone(),
                StasisSlot {
                    intent,
                    intent_fingerprint: fingerprint.clone(),
                    entered_at: now,
                    expires_at,
                },
            );

            let note = match (&previous, expires_at) {
                (Some(_), _) => notes::INTENT_REPLACED,
                (None, Some(_)) => notes::TTL_ENABLED,
                (None, None) => notes::TTL_DISABLED,
            };
            state.record(
                StasisRecord::new(invariant.clone(), StasisEvent::Entered, now)
                    .with_intent(fingerprint.clone())
                    .with_note(note),
                &mut outbox,
            );
            previous.is_some()
        };

        info!(
            invariant = %invariant,
            intent_fp = %fingerprint,
            replaced,
            expires_at = ?expires_at,
            "Invariant entered stasis"
        );

        self.flush(outbox);
        fingerprint
    }

    /// The held intent, if the invariant is contested.
    pub fn current_intent(&self, invariant: &str) -> Option<RenegotiationIntent> {
        let now = self.clock.now();
        let mut outbox = Vec::new();
        let intent = {
            let mut state = self.state.lock();
            state.expire_if_due(invariant, now, &mut outbox);
            state.slots.get(invariant).map(|slot| slot.intent.clone())
        };
        self.flush(outbox);
        intent
    }

    pub fn is_active(&self, invariant: &str) -> bool {
        self.current_intent(invariant).is_some()
    }

    /// The canonical refusal surface.
    ///
    /// Fails with [`StasisError::Active`] while the invariant is contested;
    /// otherwise returns without side effects.
    pub fn require_not_in_stasis(&self, invariant: &str) -> Result<(), StasisError> {
        let now = self.clock.now();
        let mut outbox = Vec::new();
        let result = {
            let mut state = self.state.lock();
            state.expire_if_due(invariant, now, &mut outbox);
            match state.slots.get_key_value(invariant) {
                Some((id, slot)) => Err(StasisError::Active {
                    invariant: id.clone(),
                    intent_fingerprint: slot.intent_fingerprint.clone(),
                    entered_at: slot.entered_at,
                    expires_at: slot.expires_at,
                }),
                None => Ok(()),
            }
        };

        if result.is_err() {
            debug!(invariant = %invariant, "Action refused: invariant in stasis");
        }

        self.flush(outbox);
        result
    }

    /// Settle a contest and return the invariant to `CLEAR`.
    ///
    /// Fails if nothing is contested (a resolution cannot be replayed), if the
    /// resolution does not validate against the gate's quorum, or if the held
    /// intent belongs to a different invariant.
    pub fn apply_resolution(&self, resolution: RenegotiationResolution) -> Result<(), StasisError> {
        let now = self.clock.now();
        let invariant = resolution.contested_invariant().clone();
        let quorum = resolution.quorum_count();

        let mut outbox = Vec::new();
        let result = {
            let mut state = self.state.lock();
            state.expire_if_due(invariant.as_str(), now, &mut outbox);
            self.settle(&mut state, &resolution, now, &mut outbox)
        };

        match &result {
            Ok(()) => info!(
                invariant = %invariant,
                outcome = %resolution.outcome(),
                quorum,
                "Stasis cleared by resolution"
            ),
            Err(err @ StasisError::ResolutionMismatch { .. }) => error!(
                invariant = %invariant,
                error = %err,
                "Resolution integrity failure"
            ),
            Err(err) => warn!(
                invariant = %invariant,
                error = %err,
                "Resolution rejected"
            ),
        }

        self.flush(outbox);
        result
    }

    fn settle(
        &self,
        state: &mut GateState,
        resolution: &RenegotiationResolution,
        now: DateTime<Utc>,
        outbox: &mut Vec<StasisRecord>,
    ) -> Result<(), StasisError> {
        let invariant = resolution.contested_invariant();
        let reject = |reason| StasisError::InvalidResolution {
            invariant: invariant.clone(),
            reason,
        };

        let Some(slot) = state.slots.get(invariant.as_str()) else {
            return Err(reject(ResolutionRejection::NoActiveStasis));
        };

        // Every construction path is re-validated, against the gate's quorum
        // rather than the one the resolution was built with.
        if let Some(violation) = resolution
            .validate(self.config.quorum_min)
            .into_iter()
            .next()
        {
            return Err(reject(ResolutionRejection::from(violation)));
        }
        let quorum = resolution.quorum_count();

        if slot.intent.contested_invariant() != invariant {
            return Err(StasisError::ResolutionMismatch {
                held: slot.intent.contested_invariant().clone(),
                offered: invariant.clone(),
            });
        }

        let resolution_fp = resolution.fingerprint();
        let intent_fp = slot.intent_fingerprint.clone();

        state.record(
            StasisRecord::new(invariant.clone(), StasisEvent::ResolutionAck, now)
                .with_intent(intent_fp)
                .with_resolution(resolution_fp.clone(), quorum)
                .with_note(notes::QUORUM_MET_WINDOW_CLOSED),
            outbox,
        );
        state.slots.remove(invariant.as_str());
        state.record(
            StasisRecord::new(invariant.clone(), StasisEvent::Cleared, now)
                .with_resolution(resolution_fp, quorum)
                .with_note(resolution.outcome().as_str()),
            outbox,
        );

        Ok(())
    }

    /// Retained audit records for `invariant`, newest last, at most `limit`.
    pub fn history(&self, invariant: &str, limit: usize) -> Vec<StasisRecord> {
        let now = self.clock.now();
        let mut outbox = Vec::new();
        let records = {
            let mut state = self.state.lock();
            state.expire_if_due(invariant, now, &mut outbox);
            state.trail.recent(invariant, limit)
        };
        self.flush(outbox);
        records
    }

    /// Currently contested invariants, sorted.
    pub fn active_invariants(&self) -> Vec<InvariantId> {
        let now = self.clock.now();
        let mut outbox = Vec::new();
        let mut active: Vec<InvariantId> = {
            let mut state = self.state.lock();
            state.expire_all_due(now, &mut outbox);
            state.slots.keys().cloned().collect()
        };
        self.flush(outbox);
        active.sort();
        active
    }

    /// Audit records the sink failed to persist since construction.
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    // Called with the lock released. Failures never reach the caller.
    fn flush(&self, outbox: Vec<StasisRecord>) {
        let Some(sink) = &self.sink else {
            return;
        };
        for record in &outbox {
            if let Err(err) = sink.persist(record) {
                self.sink_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    invariant = %record.invariant,
                    event = %record.event,
                    error = %err,
                    "Failed to persist stasis record"
                );
            }
        }
    }
}

impl Default for StasisGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StasisGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StasisGate")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`StasisGate`].
#[derive(Default)]
pub struct StasisGateBuilder {
    config: Option<GateConfig>,
    clock: Option<Arc<dyn Clock>>,
    sink: Option<Arc<dyn AuditSink>>,
}

impl StasisGateBuilder {
    pub fn config(mut self, config: GateConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<StasisGate, ConfigError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(StasisGate::assemble(
            config,
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.sink,
        ))
    }
}
