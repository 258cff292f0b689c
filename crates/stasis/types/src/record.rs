use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::invariant::InvariantId;

/// Audit notes attached to records.
pub mod notes {
    pub const TTL_ENABLED: &str = "ttl_enabled";
    pub const TTL_DISABLED: &str = "ttl_disabled";
    pub const INTENT_REPLACED: &str = "intent_replaced";
    pub const QUORUM_MET_WINDOW_CLOSED: &str = "quorum_met_window_closed";
    pub const TTL_ELAPSED_UNRESOLVED: &str = "ttl_elapsed_unresolved";
}

/// Lifecycle event recorded in the audit trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StasisEvent {
    Entered,
    ResolutionAck,
    Expired,
    Cleared,
}

impl StasisEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entered => "entered",
            Self::ResolutionAck => "resolution_ack",
            Self::Expired => "expired",
            Self::Cleared => "cleared",
        }
    }
}

impl fmt::Display for StasisEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit entry.
///
/// Carries fingerprints and counts only. No raw intent or resolution text,
/// no submitter identity, no attester labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StasisRecord {
    pub invariant: InvariantId,
    pub event: StasisEvent,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_fingerprint: Option<Fingerprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_fingerprint: Option<Fingerprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quorum_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StasisRecord {
    pub fn new(invariant: InvariantId, event: StasisEvent, at: DateTime<Utc>) -> Self {
        Self {
            invariant,
            event,
            at,
            intent_fingerprint: None,
            resolution_fingerprint: None,
            quorum_count: None,
            note: None,
        }
    }

    pub fn with_intent(mut self, fingerprint: Fingerprint) -> Self {
        self.intent_fingerprint = Some(fingerprint);
        self
    }

    pub fn with_resolution(mut self, fingerprint: Fingerprint, quorum_count: usize) -> Self {
        self.resolution_fingerprint = Some(fingerprint);
        self.quorum_count = Some(quorum_count);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
