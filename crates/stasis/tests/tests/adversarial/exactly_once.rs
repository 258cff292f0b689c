//! Adversarial: one resolution clears one contest, once.

use std::sync::Arc;

use stasis_gate::{ResolutionRejection, StasisError, StasisGate};
use stasis_tests::{make_intent, make_resolution};
use stasis_types::StasisEvent;

#[test]
fn replayed_resolution_fails() {
    let gate = StasisGate::new();
    gate.register_intent(make_intent("no_ranking"));
    let resolution = make_resolution("no_ranking");

    gate.apply_resolution(resolution.clone()).unwrap();
    for _ in 0..3 {
        assert!(matches!(
            gate.apply_resolution(resolution.clone()),
            Err(StasisError::InvalidResolution {
                reason: ResolutionRejection::NoActiveStasis,
                ..
            })
        ));
    }

    let cleared = gate
        .history("no_ranking", 64)
        .into_iter()
        .filter(|r| r.event == StasisEvent::Cleared)
        .count();
    assert_eq!(cleared, 1);
}

#[test]
fn old_resolution_cannot_clear_a_new_contest_twice() {
    let gate = StasisGate::new();
    let resolution = make_resolution("no_ranking");

    gate.register_intent(make_intent("no_ranking"));
    gate.apply_resolution(resolution.clone()).unwrap();

    // A fresh contest is a new slot; the same resolution content clears it
    // once more, and only once.
    gate.register_intent(make_intent("no_ranking"));
    gate.apply_resolution(resolution.clone()).unwrap();
    assert!(gate.apply_resolution(resolution).is_err());
}

#[test]
fn racing_resolutions_clear_exactly_once() {
    for _ in 0..20 {
        let gate = Arc::new(StasisGate::new());
        gate.register_intent(make_intent("no_ranking"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                std::thread::spawn(move || gate.apply_resolution(make_resolution("no_ranking")))
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();
        assert_eq!(successes, 1);
        assert!(!gate.is_active("no_ranking"));
    }
}
