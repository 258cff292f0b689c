//! Adversarial: a contested invariant cannot be released by any route other
//! than a valid resolution or temporal decay.

use std::sync::Arc;

use stasis_gate::{
    GateConfig, InvariantEnforcer, RelationalThreshold, ResolutionRejection, StasisError,
    StasisGate,
};
use stasis_tests::{make_intent, make_resolution};
use stasis_types::{
    RenegotiationIntent, RenegotiationResolution, ResolutionOutcome, Violation, MIN_SUMMARY_LEN,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn contested_gate() -> Arc<StasisGate> {
    let gate = Arc::new(StasisGate::new());
    gate.register_intent(make_intent("no_ranking"));
    gate
}

fn assert_rejected(result: Result<(), StasisError>, expected: ResolutionRejection) {
    match result {
        Err(StasisError::InvalidResolution { reason, .. }) => assert_eq!(reason, expected),
        other => panic!("expected InvalidResolution({expected:?}), got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Tests: Resolution Bypass Attempts
// ---------------------------------------------------------------------------

#[test]
fn open_window_cannot_clear() {
    let gate = contested_gate();
    let resolution = RenegotiationResolution::builder("no_ranking", "Override by the operators")
        .attestations(["council:a", "guild:b", "org:c", "role:d"])
        .build_unchecked();

    assert_rejected(
        gate.apply_resolution(resolution),
        ResolutionRejection::CommunityWindowOpen,
    );
    assert!(gate.is_active("no_ranking"));
}

#[test]
fn duplicate_attestations_do_not_make_quorum() {
    let gate = contested_gate();
    let resolution = RenegotiationResolution::builder("no_ranking", "Same voice counted twice")
        .community_window_closed(true)
        .attestations(["council:a", "council:a", "  "])
        .build_unchecked();

    assert_rejected(
        gate.apply_resolution(resolution),
        ResolutionRejection::QuorumNotMet {
            required: 2,
            actual: 1,
        },
    );
    assert!(gate.is_active("no_ranking"));
}

#[test]
fn lowered_constructor_quorum_does_not_lower_gate_quorum() {
    let gate = contested_gate();
    let resolution = RenegotiationResolution::builder("no_ranking", "Single voice settlement")
        .community_window_closed(true)
        .attestation("council:a")
        .quorum_min(1)
        .build()
        .unwrap();

    assert_rejected(
        gate.apply_resolution(resolution),
        ResolutionRejection::QuorumNotMet {
            required: 2,
            actual: 1,
        },
    );
}

#[test]
fn amendment_without_version_cannot_clear() {
    let gate = contested_gate();
    let resolution = RenegotiationResolution::builder("no_ranking", "Amended but unversioned")
        .outcome(ResolutionOutcome::Amended)
        .community_window_closed(true)
        .attestations(["council:a", "guild:b"])
        .build_unchecked();

    assert_rejected(
        gate.apply_resolution(resolution),
        ResolutionRejection::MissingInvariantVersion,
    );
}

#[test]
fn resolution_for_other_invariant_leaves_contest_alone() {
    let gate = contested_gate();
    assert_rejected(
        gate.apply_resolution(make_resolution("no_surveillance")),
        ResolutionRejection::NoActiveStasis,
    );
    assert!(gate.is_active("no_ranking"));
}

#[test]
fn tampered_json_resolution_is_refused_at_parse() {
    let json = r#"{
        "contested_invariant": "no_ranking",
        "outcome": "dissolved",
        "summary": "x",
        "community_window_closed": false,
        "quorum_attestations": []
    }"#;
    assert!(serde_json::from_str::<RenegotiationResolution>(json).is_err());
}

#[test]
fn blank_summary_cannot_clear() {
    let gate = contested_gate();
    let resolution = RenegotiationResolution::builder("no_ranking", "  ")
        .community_window_closed(true)
        .attestations(["council:a", "guild:b"])
        .build_unchecked();

    assert_rejected(
        gate.apply_resolution(resolution),
        ResolutionRejection::Malformed(Violation::BlankField { field: "summary" }),
    );
    assert!(gate.is_active("no_ranking"));
}

#[test]
fn rubber_stamp_summary_cannot_clear() {
    let gate = contested_gate();
    let resolution = RenegotiationResolution::builder("no_ranking", "ok")
        .community_window_closed(true)
        .attestations(["council:a", "guild:b"])
        .build_unchecked();

    assert_rejected(
        gate.apply_resolution(resolution),
        ResolutionRejection::Malformed(Violation::SummaryTooShort {
            min: MIN_SUMMARY_LEN,
            actual: 2,
        }),
    );
    assert!(gate.is_active("no_ranking"));
}

#[test]
fn blank_invariant_resolution_cannot_clear() {
    let gate = contested_gate();
    let resolution = RenegotiationResolution::builder("   ", "Community process completed")
        .community_window_closed(true)
        .attestations(["council:a", "guild:b"])
        .build_unchecked();

    assert!(gate.apply_resolution(resolution).is_err());
    assert!(gate.is_active("no_ranking"));
}

// ---------------------------------------------------------------------------
// Tests: Identifier Bypass Attempts
// ---------------------------------------------------------------------------

#[test]
fn invariant_ids_are_opaque() {
    let gate = Arc::new(StasisGate::new());
    let enforcer = InvariantEnforcer::new(gate.clone());
    gate.register_intent(make_intent("no_ranking"));

    // Near-miss identifiers are different invariants.
    for near_miss in ["No_Ranking", "no_ranking ", "no_rank", "no_ranking_v2", ""] {
        enforcer.require_clear([near_miss]).unwrap();
    }
    assert!(enforcer.require_clear(["no_ranking"]).is_err());
}

#[test]
fn enforcer_is_fail_fast_across_the_list() {
    let gate = Arc::new(StasisGate::new());
    gate.register_intent(make_intent("b"));
    gate.register_intent(make_intent("c"));
    let enforcer = InvariantEnforcer::new(gate);

    let err = enforcer.require_clear(["a", "c", "b"]).unwrap_err();
    assert_eq!(err.invariant().map(|i| i.as_str()), Some("c"));
}

// ---------------------------------------------------------------------------
// Tests: Intent Validation
// ---------------------------------------------------------------------------

#[test]
fn malformed_intents_never_reach_the_gate() {
    let anonymous = RenegotiationIntent::builder("no_ranking", "someone")
        .triggering_event("e")
        .impacted_group("g")
        .harm_claim("h")
        .counter_harm_risk("c")
        .non_negotiable("n")
        .alternative("a")
        .build();
    assert!(anonymous.is_err());

    let json = r#"{
        "contested_invariant": "no_ranking",
        "triggering_event": "e",
        "impacted_groups": ["g"],
        "harm_claim": "h",
        "counter_harm_risk": "c",
        "non_negotiables": [],
        "alternatives_considered": ["a"],
        "submitted_by": "collective:x"
    }"#;
    assert!(serde_json::from_str::<RenegotiationIntent>(json).is_err());
}

#[test]
fn ordinary_rejections_are_not_integrity_failures() {
    let strict = StasisGate::with_config(GateConfig::default().with_quorum_min(5)).unwrap();
    strict.register_intent(make_intent("no_ranking"));
    let err = strict
        .apply_resolution(make_resolution("no_ranking"))
        .unwrap_err();
    assert!(!err.is_integrity_failure());
    assert!(!err.is_refusal());

    let threshold = RelationalThreshold::new(contested_gate());
    assert!(threshold
        .acknowledge_resolution(make_resolution("no_ranking"))
        .is_ok());
}
