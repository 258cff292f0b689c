//! Adversarial: many threads hitting one gate observe a single linear history.

use std::sync::{Arc, Barrier};
use std::thread;

use stasis_gate::{GateConfig, InvariantEnforcer, StasisGate};
use stasis_tests::{make_intent, make_resolution};
use stasis_types::StasisEvent;

#[test]
fn enforcer_refuses_throughout_contest() {
    let gate = Arc::new(StasisGate::new());
    gate.register_intent(make_intent("no_ranking"));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let enforcer = InvariantEnforcer::new(gate.clone());
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..200)
                    .filter(|_| enforcer.require_clear(["no_ranking"]).is_ok())
                    .count()
            })
        })
        .collect();

    let passed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(passed, 0);
}

#[test]
fn interleaved_register_and_resolve_keep_history_consistent() {
    let gate = Arc::new(
        StasisGate::with_config(GateConfig::default().with_history_limit(10_000)).unwrap(),
    );
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let gate = gate.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..100 {
                    if i % 2 == 0 {
                        gate.register_intent(make_intent("no_ranking"));
                    } else {
                        let _ = gate.apply_resolution(make_resolution("no_ranking"));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Every ack is immediately followed by its clear, and each clear follows
    // at least one entry since the previous clear.
    let history = gate.history("no_ranking", usize::MAX);
    let mut contested = false;
    for pair in history.windows(2) {
        if pair[0].event == StasisEvent::ResolutionAck {
            assert_eq!(pair[1].event, StasisEvent::Cleared);
        }
    }
    for record in &history {
        match record.event {
            StasisEvent::Entered => contested = true,
            StasisEvent::ResolutionAck => assert!(contested),
            StasisEvent::Cleared => contested = false,
            StasisEvent::Expired => unreachable!("default TTL cannot elapse here"),
        }
    }
    assert_eq!(contested, gate.is_active("no_ranking"));
}

#[test]
fn contests_on_different_invariants_proceed_in_parallel() {
    let gate = Arc::new(StasisGate::new());
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let gate = gate.clone();
            thread::spawn(move || {
                let invariant = format!("invariant_{i}");
                gate.register_intent(make_intent(&invariant));
                gate.apply_resolution(make_resolution(&invariant))
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    assert!(gate.active_invariants().is_empty());
}
