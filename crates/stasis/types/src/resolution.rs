//! Renegotiation resolution: a quorum-backed claim that a contest is settled.
//!
//! [`ResolutionDraft::build`] is the production path and fails fast.
//! [`ResolutionDraft::validate`] and [`RenegotiationResolution::validate`]
//! explain rejection without failing. Deserialization goes through
//! [`ResolutionDraft::build`], so it validates against the default quorum.
//! Only [`ResolutionDraft::build_unchecked`] skips validation; the gate
//! re-validates every resolution against its own quorum before applying it.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ValidationError, Violation};
use crate::fingerprint::{FingerprintFields, Fingerprintable};
use crate::invariant::InvariantId;

/// Minimum summary length, in characters after trimming.
pub const MIN_SUMMARY_LEN: usize = 12;

/// Minimum distinct attestations when none is configured.
pub const DEFAULT_QUORUM_MIN: usize = 2;

/// How a contest was settled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    #[default]
    Upheld,
    Amended,
    Forked,
    Dissolved,
}

impl ResolutionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upheld => "upheld",
            Self::Amended => "amended",
            Self::Forked => "forked",
            Self::Dissolved => "dissolved",
        }
    }
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed or finalized settlement of a contest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ResolutionDraft")]
pub struct RenegotiationResolution {
    contested_invariant: InvariantId,
    outcome: ResolutionOutcome,
    summary: String,
    community_window_closed: bool,
    quorum_attestations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_invariant_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    alt_modality_trace: Vec<String>,
}

impl RenegotiationResolution {
    /// Start a draft resolving `contested_invariant`.
    pub fn builder(
        contested_invariant: impl Into<String>,
        summary: impl Into<String>,
    ) -> ResolutionDraft {
        ResolutionDraft {
            contested_invariant: contested_invariant.into(),
            summary: summary.into(),
            ..Default::default()
        }
    }

    pub fn contested_invariant(&self) -> &InvariantId {
        &self.contested_invariant
    }

    pub fn outcome(&self) -> ResolutionOutcome {
        self.outcome
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn community_window_closed(&self) -> bool {
        self.community_window_closed
    }

    /// Opaque attester labels as supplied.
    pub fn quorum_attestations(&self) -> &[String] {
        &self.quorum_attestations
    }

    /// Number of distinct, non-blank attestations. This is what quorum counts.
    pub fn quorum_count(&self) -> usize {
        distinct_attestations(&self.quorum_attestations)
    }

    pub fn new_invariant_version(&self) -> Option<&str> {
        self.new_invariant_version.as_deref()
    }

    pub fn alt_modality_trace(&self) -> &[String] {
        &self.alt_modality_trace
    }

    /// Check this resolution against `quorum_min` without failing.
    ///
    /// Useful for resolutions that did not come through [`ResolutionDraft::build`].
    pub fn validate(&self, quorum_min: usize) -> Vec<Violation> {
        resolution_violations(
            self.contested_invariant.as_str(),
            &self.summary,
            self.outcome,
            self.community_window_closed,
            &self.quorum_attestations,
            self.new_invariant_version.as_deref(),
            quorum_min,
        )
    }
}

impl TryFrom<ResolutionDraft> for RenegotiationResolution {
    type Error = ValidationError;

    fn try_from(draft: ResolutionDraft) -> Result<Self, Self::Error> {
        draft.build()
    }
}

impl Fingerprintable for RenegotiationResolution {
    // Attester labels never enter the fingerprint; only their count does.
    fn fingerprint_fields(&self) -> FingerprintFields {
        let mut fields = FingerprintFields::new();
        fields.insert(
            "contested_invariant".into(),
            json!(self.contested_invariant.as_str()),
        );
        fields.insert("outcome".into(), json!(self.outcome.as_str()));
        fields.insert(
            "community_window_closed".into(),
            json!(self.community_window_closed),
        );
        fields.insert("quorum_count".into(), json!(self.quorum_count()));
        fields.insert("alt_count".into(), json!(self.alt_modality_trace.len()));
        fields.insert(
            "alt_preview".into(),
            json!(self.alt_modality_trace.first()),
        );
        fields.insert("summary".into(), json!(self.summary));
        fields
    }
}

/// Unvalidated resolution under construction.
#[derive(Clone, Debug, Deserialize)]
pub struct ResolutionDraft {
    pub contested_invariant: String,
    #[serde(default)]
    pub outcome: ResolutionOutcome,
    pub summary: String,
    #[serde(default)]
    pub community_window_closed: bool,
    #[serde(default)]
    pub quorum_attestations: Vec<String>,
    #[serde(default)]
    pub new_invariant_version: Option<String>,
    #[serde(default)]
    pub alt_modality_trace: Vec<String>,
    /// Attestations required by [`ResolutionDraft::build`].
    #[serde(skip, default = "default_quorum_min")]
    pub quorum_min: usize,
}

impl Default for ResolutionDraft {
    fn default() -> Self {
        Self {
            contested_invariant: String::new(),
            outcome: ResolutionOutcome::default(),
            summary: String::new(),
            community_window_closed: false,
            quorum_attestations: Vec::new(),
            new_invariant_version: None,
            alt_modality_trace: Vec::new(),
            quorum_min: DEFAULT_QUORUM_MIN,
        }
    }
}

fn default_quorum_min() -> usize {
    DEFAULT_QUORUM_MIN
}

impl ResolutionDraft {
    pub fn outcome(mut self, outcome: ResolutionOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn community_window_closed(mut self, closed: bool) -> Self {
        self.community_window_closed = closed;
        self
    }

    pub fn attestation(mut self, label: impl Into<String>) -> Self {
        self.quorum_attestations.push(label.into());
        self
    }

    pub fn attestations<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.quorum_attestations
            .extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn new_invariant_version(mut self, version: impl Into<String>) -> Self {
        self.new_invariant_version = Some(version.into());
        self
    }

    pub fn alt_modality(mut self, pathway: impl Into<String>) -> Self {
        self.alt_modality_trace.push(pathway.into());
        self
    }

    pub fn quorum_min(mut self, quorum_min: usize) -> Self {
        self.quorum_min = quorum_min;
        self
    }

    /// Every reason this draft would be rejected. Never fails.
    pub fn validate(&self) -> Vec<Violation> {
        resolution_violations(
            &self.contested_invariant,
            &self.summary,
            self.outcome,
            self.community_window_closed,
            &self.quorum_attestations,
            self.new_invariant_version.as_deref(),
            self.quorum_min,
        )
    }

    /// Validate and freeze. Fails on the first violation.
    pub fn build(self) -> Result<RenegotiationResolution, ValidationError> {
        if let Some(first) = self.validate().into_iter().next() {
            return Err(ValidationError(first));
        }
        Ok(self.build_unchecked())
    }

    /// Freeze without validating. Strings are still trimmed.
    ///
    /// For relays and importers that defer validation to the gate; the gate
    /// refuses anything that fails its own window and quorum checks.
    pub fn build_unchecked(self) -> RenegotiationResolution {
        RenegotiationResolution {
            contested_invariant: InvariantId::new(self.contested_invariant.trim()),
            outcome: self.outcome,
            summary: self.summary.trim().to_string(),
            community_window_closed: self.community_window_closed,
            quorum_attestations: self
                .quorum_attestations
                .into_iter()
                .map(|s| s.trim().to_string())
                .collect(),
            new_invariant_version: self
                .new_invariant_version
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            alt_modality_trace: self
                .alt_modality_trace
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

fn distinct_attestations(labels: &[String]) -> usize {
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<BTreeSet<_>>()
        .len()
}

fn resolution_violations(
    contested_invariant: &str,
    summary: &str,
    outcome: ResolutionOutcome,
    community_window_closed: bool,
    quorum_attestations: &[String],
    new_invariant_version: Option<&str>,
    quorum_min: usize,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if contested_invariant.trim().is_empty() {
        violations.push(Violation::BlankField {
            field: "contested_invariant",
        });
    }

    let summary_len = summary.trim().chars().count();
    if summary_len == 0 {
        violations.push(Violation::BlankField { field: "summary" });
    } else if summary_len < MIN_SUMMARY_LEN {
        violations.push(Violation::SummaryTooShort {
            min: MIN_SUMMARY_LEN,
            actual: summary_len,
        });
    }

    if !community_window_closed {
        violations.push(Violation::CommunityWindowOpen);
    }

    let quorum = distinct_attestations(quorum_attestations);
    if quorum < quorum_min {
        violations.push(Violation::QuorumNotMet {
            required: quorum_min,
            actual: quorum,
        });
    }

    let has_version = new_invariant_version.is_some_and(|v| !v.trim().is_empty());
    if outcome == ResolutionOutcome::Amended && !has_version {
        violations.push(Violation::MissingInvariantVersion);
    }

    violations
}
