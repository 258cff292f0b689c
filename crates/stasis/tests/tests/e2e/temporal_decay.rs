//! E2E: contests lapse when left unresolved.
//!
//! Expiry is lazy: it happens on the first gate operation after the TTL has
//! elapsed, not on a timer.

use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;

use chrono::Duration;
use stasis_gate::{
    GateConfig, InvariantEnforcer, MemoryAuditSink, ResolutionRejection, StasisError, StasisGate,
};
use stasis_tests::{make_intent, make_resolution, manual_gate};
use stasis_types::{notes, StasisEvent};

#[test]
fn real_clock_ttl_expires_after_sleep() {
    let gate = StasisGate::with_config(GateConfig::default().with_ttl_ms(Some(100))).unwrap();
    gate.register_intent(make_intent("no_ranking"));
    assert!(gate.require_not_in_stasis("no_ranking").is_err());

    thread::sleep(StdDuration::from_millis(150));

    assert!(gate.require_not_in_stasis("no_ranking").is_ok());
    let last = gate.history("no_ranking", 1).remove(0);
    assert_eq!(last.event, StasisEvent::Expired);
}

#[test]
fn expiry_boundary_is_inclusive() {
    let (gate, clock) = manual_gate(Some(Duration::hours(72)));
    gate.register_intent(make_intent("no_ranking"));

    clock.advance(Duration::hours(72) - Duration::milliseconds(1));
    assert!(gate.is_active("no_ranking"));

    clock.advance(Duration::milliseconds(1));
    assert!(!gate.is_active("no_ranking"));
}

#[test]
fn expiry_is_recorded_once() {
    let (gate, clock) = manual_gate(Some(Duration::minutes(10)));
    let enforcer = InvariantEnforcer::new(gate.clone());
    gate.register_intent(make_intent("no_ranking"));
    clock.advance(Duration::minutes(11));

    for _ in 0..5 {
        enforcer.require_clear(["no_ranking"]).unwrap();
    }

    let expired: Vec<_> = gate
        .history("no_ranking", 64)
        .into_iter()
        .filter(|r| r.event == StasisEvent::Expired)
        .collect();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].note.as_deref(), Some(notes::TTL_ELAPSED_UNRESOLVED));
}

#[test]
fn late_resolution_is_rejected() {
    let (gate, clock) = manual_gate(Some(Duration::hours(1)));
    gate.register_intent(make_intent("no_ranking"));
    clock.advance(Duration::hours(2));

    let err = gate
        .apply_resolution(make_resolution("no_ranking"))
        .unwrap_err();
    assert!(matches!(
        err,
        StasisError::InvalidResolution {
            reason: ResolutionRejection::NoActiveStasis,
            ..
        }
    ));
}

#[test]
fn new_contest_after_expiry_restarts_lifecycle() {
    let (gate, clock) = manual_gate(Some(Duration::hours(1)));
    gate.register_intent(make_intent("no_ranking"));
    clock.advance(Duration::hours(1));
    assert!(!gate.is_active("no_ranking"));

    gate.register_intent(make_intent("no_ranking"));
    assert!(gate.is_active("no_ranking"));

    let events: Vec<_> = gate
        .history("no_ranking", 10)
        .into_iter()
        .map(|r| (r.event, r.note))
        .collect();
    assert_eq!(
        events,
        [
            (StasisEvent::Entered, Some(notes::TTL_ENABLED.to_string())),
            (
                StasisEvent::Expired,
                Some(notes::TTL_ELAPSED_UNRESOLVED.to_string())
            ),
            (StasisEvent::Entered, Some(notes::TTL_ENABLED.to_string())),
        ]
    );
}

#[test]
fn lazy_expiry_reaches_the_sink() {
    let clock = stasis_gate::ManualClock::starting_now();
    let sink = Arc::new(MemoryAuditSink::new());
    let gate = StasisGate::builder()
        .config(GateConfig::default().with_ttl(Some(Duration::seconds(30))))
        .clock(Arc::new(clock.clone()))
        .sink(sink.clone())
        .build()
        .unwrap();

    gate.register_intent(make_intent("no_ranking"));
    clock.advance(Duration::seconds(31));
    assert!(gate.active_invariants().is_empty());

    let events: Vec<_> = sink.records().into_iter().map(|r| r.event).collect();
    assert_eq!(events, [StasisEvent::Entered, StasisEvent::Expired]);
}

#[test]
fn disabled_ttl_holds_until_resolved() {
    let (gate, clock) = manual_gate(None);
    gate.register_intent(make_intent("no_ranking"));
    clock.advance(Duration::days(3650));

    assert!(gate.is_active("no_ranking"));
    gate.apply_resolution(make_resolution("no_ranking")).unwrap();
    assert!(!gate.is_active("no_ranking"));
}
