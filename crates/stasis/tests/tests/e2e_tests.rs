#[path = "e2e/contest_lifecycle.rs"]
mod contest_lifecycle;

#[path = "e2e/temporal_decay.rs"]
mod temporal_decay;

#[path = "e2e/audit_persistence.rs"]
mod audit_persistence;

#[path = "e2e/policy_integration.rs"]
mod policy_integration;
