use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier naming a protected rule (e.g. `no_ranking`).
///
/// Compared byte-for-byte. `no_forced_synthesis` and
/// `no_forced_synthesis_v2_experimental` are unrelated invariants.
///
/// Intent and resolution builders store the identifier trimmed, but lookups
/// are never normalised: a gate holding `no_ranking` does not answer for
/// `" no_ranking"`. Callers querying the gate pass the canonical form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvariantId(String);

impl InvariantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InvariantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets slot maps keyed by `InvariantId` be queried with a plain `&str`.
impl Borrow<str> for InvariantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InvariantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for InvariantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for InvariantId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for InvariantId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
