//! Renegotiation intent: a validated claim that an invariant is contested.
//!
//! Built through [`IntentDraft`]. Every string is trimmed, every required
//! field must be non-blank, every list must hold at least one non-blank
//! entry, and the submitter must be a namespaced collective label. The same
//! rules apply when an intent is deserialized.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ValidationError, Violation};
use crate::fingerprint::{FingerprintFields, Fingerprintable};
use crate::invariant::InvariantId;

/// Namespaces accepted for `submitted_by`.
pub const SUBMITTER_PREFIXES: [&str; 5] = ["collective", "role", "org", "council", "guild"];

/// A filed contest against a protected invariant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IntentDraft")]
pub struct RenegotiationIntent {
    contested_invariant: InvariantId,
    triggering_event: String,
    impacted_groups: Vec<String>,
    harm_claim: String,
    counter_harm_risk: String,
    non_negotiables: Vec<String>,
    alternatives_considered: Vec<String>,
    submitted_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    situated_context: Option<String>,
}

impl RenegotiationIntent {
    /// Start a draft for the given invariant and submitting collective.
    ///
    /// The invariant is stored trimmed. Gate queries match it exactly.
    pub fn builder(
        contested_invariant: impl Into<String>,
        submitted_by: impl Into<String>,
    ) -> IntentDraft {
        IntentDraft {
            contested_invariant: contested_invariant.into(),
            submitted_by: submitted_by.into(),
            ..Default::default()
        }
    }

    pub fn contested_invariant(&self) -> &InvariantId {
        &self.contested_invariant
    }

    pub fn triggering_event(&self) -> &str {
        &self.triggering_event
    }

    /// Category labels, never individual identities.
    pub fn impacted_groups(&self) -> &[String] {
        &self.impacted_groups
    }

    pub fn harm_claim(&self) -> &str {
        &self.harm_claim
    }

    pub fn counter_harm_risk(&self) -> &str {
        &self.counter_harm_risk
    }

    pub fn non_negotiables(&self) -> &[String] {
        &self.non_negotiables
    }

    pub fn alternatives_considered(&self) -> &[String] {
        &self.alternatives_considered
    }

    pub fn submitted_by(&self) -> &str {
        &self.submitted_by
    }

    pub fn situated_context(&self) -> Option<&str> {
        self.situated_context.as_deref()
    }
}

impl Fingerprintable for RenegotiationIntent {
    // Never includes `submitted_by`.
    fn fingerprint_fields(&self) -> FingerprintFields {
        let mut fields = FingerprintFields::new();
        fields.insert(
            "contested_invariant".into(),
            json!(self.contested_invariant.as_str()),
        );
        fields.insert("triggering_event".into(), json!(self.triggering_event));
        fields.insert("impacted_groups".into(), json!(self.impacted_groups));
        fields.insert("harm_claim".into(), json!(self.harm_claim));
        fields.insert("counter_harm_risk".into(), json!(self.counter_harm_risk));
        fields.insert("non_negotiables".into(), json!(self.non_negotiables));
        fields.insert(
            "alternatives_considered".into(),
            json!(self.alternatives_considered),
        );
        fields.insert("situated_context".into(), json!(self.situated_context));
        fields
    }
}

impl TryFrom<IntentDraft> for RenegotiationIntent {
    type Error = ValidationError;

    fn try_from(draft: IntentDraft) -> Result<Self, Self::Error> {
        draft.build()
    }
}

/// Unvalidated intent under construction.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct IntentDraft {
    pub contested_invariant: String,
    pub triggering_event: String,
    pub impacted_groups: Vec<String>,
    pub harm_claim: String,
    pub counter_harm_risk: String,
    pub non_negotiables: Vec<String>,
    pub alternatives_considered: Vec<String>,
    pub submitted_by: String,
    #[serde(default)]
    pub situated_context: Option<String>,
}

impl IntentDraft {
    pub fn triggering_event(mut self, event: impl Into<String>) -> Self {
        self.triggering_event = event.into();
        self
    }

    pub fn impacted_group(mut self, group: impl Into<String>) -> Self {
        self.impacted_groups.push(group.into());
        self
    }

    pub fn impacted_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.impacted_groups.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn harm_claim(mut self, claim: impl Into<String>) -> Self {
        self.harm_claim = claim.into();
        self
    }

    pub fn counter_harm_risk(mut self, risk: impl Into<String>) -> Self {
        self.counter_harm_risk = risk.into();
        self
    }

    pub fn non_negotiable(mut self, item: impl Into<String>) -> Self {
        self.non_negotiables.push(item.into());
        self
    }

    pub fn alternative(mut self, alternative: impl Into<String>) -> Self {
        self.alternatives_considered.push(alternative.into());
        self
    }

    pub fn situated_context(mut self, context: impl Into<String>) -> Self {
        self.situated_context = Some(context.into());
        self
    }

    /// Every violation in field declaration order. Never fails.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        check_text(&mut violations, "contested_invariant", &self.contested_invariant);
        check_text(&mut violations, "triggering_event", &self.triggering_event);
        check_list(&mut violations, "impacted_groups", &self.impacted_groups);
        check_text(&mut violations, "harm_claim", &self.harm_claim);
        check_text(&mut violations, "counter_harm_risk", &self.counter_harm_risk);
        check_list(&mut violations, "non_negotiables", &self.non_negotiables);
        check_list(
            &mut violations,
            "alternatives_considered",
            &self.alternatives_considered,
        );

        let submitter = self.submitted_by.trim();
        if submitter.is_empty() {
            violations.push(Violation::BlankField {
                field: "submitted_by",
            });
        } else if !is_namespaced(submitter) {
            violations.push(Violation::SubmitterNotNamespaced);
        }

        violations
    }

    /// Validate and freeze. Fails on the first violation.
    pub fn build(self) -> Result<RenegotiationIntent, ValidationError> {
        if let Some(first) = self.validate().into_iter().next() {
            return Err(ValidationError(first));
        }

        Ok(RenegotiationIntent {
            contested_invariant: InvariantId::new(self.contested_invariant.trim()),
            triggering_event: self.triggering_event.trim().to_string(),
            impacted_groups: trim_all(self.impacted_groups),
            harm_claim: self.harm_claim.trim().to_string(),
            counter_harm_risk: self.counter_harm_risk.trim().to_string(),
            non_negotiables: trim_all(self.non_negotiables),
            alternatives_considered: trim_all(self.alternatives_considered),
            submitted_by: self.submitted_by.trim().to_string(),
            situated_context: self
                .situated_context
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        })
    }
}

/// `prefix:name` with a known prefix and a non-blank name.
fn is_namespaced(submitter: &str) -> bool {
    match submitter.split_once(':') {
        Some((prefix, name)) => SUBMITTER_PREFIXES.contains(&prefix) && !name.trim().is_empty(),
        None => false,
    }
}

fn check_text(violations: &mut Vec<Violation>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        violations.push(Violation::BlankField { field });
    }
}

fn check_list(violations: &mut Vec<Violation>, field: &'static str, items: &[String]) {
    if items.is_empty() {
        violations.push(Violation::EmptyList { field });
        return;
    }
    for (index, item) in items.iter().enumerate() {
        if item.trim().is_empty() {
            violations.push(Violation::BlankListItem { field, index });
        }
    }
}

fn trim_all(items: Vec<String>) -> Vec<String> {
    items.into_iter().map(|s| s.trim().to_string()).collect()
}
