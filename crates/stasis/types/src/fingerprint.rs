//! Deterministic correlation tags for audit records.
//!
//! A fingerprint is a truncated SHA-256 over a canonical JSON rendering of a
//! field map. It exists to correlate audit entries without retaining content;
//! it is not a lookup key and not a security boundary.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 16;

/// Fields that could re-identify a party. Dropped before hashing even if a
/// caller includes them.
pub const EXCLUDED_FIELDS: &[&str] = &["submitted_by", "quorum_attestations"];

/// Field map fed to [`fingerprint`]. Ordered, so iteration is already canonical.
pub type FingerprintFields = BTreeMap<String, Value>;

/// Short hex digest of a canonicalized field subset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint a field map.
///
/// Keys are sorted at every nesting level before serialization, so two maps
/// holding the same entries always produce the same tag. Excluded fields
/// never contribute.
pub fn fingerprint(fields: &FingerprintFields) -> Fingerprint {
    let canonical: Map<String, Value> = fields
        .iter()
        .filter(|(k, _)| !EXCLUDED_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), canonicalize(v)))
        .collect();

    let blob = serde_json::to_string(&Value::Object(canonical)).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(blob.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    Fingerprint(digest)
}

// serde_json's `Map` keeps insertion order when `preserve_order` is enabled
// anywhere in the build, so nested objects are rebuilt in sorted key order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Types that expose a non-identifying field subset for fingerprinting.
pub trait Fingerprintable {
    fn fingerprint_fields(&self) -> FingerprintFields;

    fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.fingerprint_fields())
    }
}
