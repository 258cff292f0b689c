#[path = "property/fingerprint_stability.rs"]
mod fingerprint_stability;

#[path = "property/quorum_gating.rs"]
mod quorum_gating;
