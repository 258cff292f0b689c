use serde::Serialize;
use thiserror::Error;

/// One reason a draft intent or resolution cannot be built.
///
/// Drafts report every violation through `validate()`; the throwing
/// `build()` path surfaces only the first one as a [`ValidationError`].
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("`{field}` must not be blank")]
    BlankField { field: &'static str },

    #[error("`{field}` must contain at least one entry")]
    EmptyList { field: &'static str },

    #[error("`{field}` entry {index} must not be blank")]
    BlankListItem { field: &'static str, index: usize },

    #[error("`submitted_by` must be a namespaced collective label such as `collective:stewards`")]
    SubmitterNotNamespaced,

    #[error("`summary` must be at least {min} characters (got {actual})")]
    SummaryTooShort { min: usize, actual: usize },

    #[error("`community_window_closed` must be true to finalize a resolution")]
    CommunityWindowOpen,

    #[error("at least {required} distinct quorum attestations are required (got {actual})")]
    QuorumNotMet { required: usize, actual: usize },

    #[error("`new_invariant_version` is required when outcome is amended")]
    MissingInvariantVersion,
}

impl Violation {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::BlankField { field }
            | Self::EmptyList { field }
            | Self::BlankListItem { field, .. } => field,
            Self::SubmitterNotNamespaced => "submitted_by",
            Self::SummaryTooShort { .. } => "summary",
            Self::CommunityWindowOpen => "community_window_closed",
            Self::QuorumNotMet { .. } => "quorum_attestations",
            Self::MissingInvariantVersion => "new_invariant_version",
        }
    }
}

/// A malformed intent or resolution was rejected at construction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("validation failed on `{}`: {}", .0.field(), .0)]
pub struct ValidationError(pub Violation);

impl ValidationError {
    pub fn field(&self) -> &'static str {
        self.0.field()
    }

    pub fn violation(&self) -> &Violation {
        &self.0
    }
}

impl From<Violation> for ValidationError {
    fn from(v: Violation) -> Self {
        Self(v)
    }
}
