#[path = "adversarial/bypass_gate.rs"]
mod bypass_gate;

#[path = "adversarial/exactly_once.rs"]
mod exactly_once;

#[path = "adversarial/concurrent_callers.rs"]
mod concurrent_callers;
