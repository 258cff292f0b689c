use chrono::{DateTime, Utc};
use stasis_types::{Fingerprint, InvariantId, ValidationError, Violation};
use thiserror::Error;

use crate::threshold::StasisEncountered;

/// Why the gate refused to apply a resolution.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolutionRejection {
    #[error("no active stasis for invariant")]
    NoActiveStasis,

    #[error("community window still open")]
    CommunityWindowOpen,

    #[error("quorum not met: {actual} of {required} required attestations")]
    QuorumNotMet { required: usize, actual: usize },

    #[error("new invariant version required for an amended outcome")]
    MissingInvariantVersion,

    /// Any other construction rule, such as a blank or short summary.
    #[error("{0}")]
    Malformed(Violation),
}

impl From<Violation> for ResolutionRejection {
    fn from(violation: Violation) -> Self {
        match violation {
            Violation::CommunityWindowOpen => Self::CommunityWindowOpen,
            Violation::QuorumNotMet { required, actual } => Self::QuorumNotMet { required, actual },
            Violation::MissingInvariantVersion => Self::MissingInvariantVersion,
            other => Self::Malformed(other),
        }
    }
}

/// Errors surfaced by the Stasis Gate and its façades.
///
/// Callers branch on the variant, never on the message.
#[derive(Debug, Error)]
pub enum StasisError {
    /// The invariant is contested; the action must not proceed.
    #[error("stasis active for invariant `{invariant}` (intent_fp={intent_fingerprint})")]
    Active {
        invariant: InvariantId,
        intent_fingerprint: Fingerprint,
        entered_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    },

    /// Façade flavour of [`StasisError::Active`] carrying the held intent.
    #[error("{0}")]
    Encountered(Box<StasisEncountered>),

    #[error("invalid resolution for invariant `{invariant}`: {reason}")]
    InvalidResolution {
        invariant: InvariantId,
        reason: ResolutionRejection,
    },

    /// Integrity failure: a resolution was routed to the wrong contest.
    #[error("resolution for `{offered}` does not match held intent for `{held}`")]
    ResolutionMismatch {
        held: InvariantId,
        offered: InvariantId,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StasisError {
    /// Expected refusal of an action against a contested invariant.
    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::Active { .. } | Self::Encountered(_))
    }

    /// Caller-side wiring error rather than ordinary contest activity.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::ResolutionMismatch { .. })
    }

    /// The invariant this error concerns, where there is one.
    pub fn invariant(&self) -> Option<&InvariantId> {
        match self {
            Self::Active { invariant, .. } | Self::InvalidResolution { invariant, .. } => {
                Some(invariant)
            }
            Self::Encountered(e) => Some(e.invariant()),
            Self::ResolutionMismatch { offered, .. } => Some(offered),
            Self::Validation(_) => None,
        }
    }
}

/// Failure to persist an audit record. Never affects gate decisions.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("audit sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors loading or validating gate configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
