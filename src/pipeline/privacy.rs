//! Privacy protection: pseudonymisation and anonymization of record fields.

use crate::config::FieldSpec;
use crate::record::{is_empty, stringify, Record};
use indexmap::IndexMap;
use sha2::{Digest, Sha256};

/// Marker substituted by the `stub` pseudonymisation method.
pub const REDACTED: &str = "[REDACTED]";

/// How a pseudonymised value is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashMethod {
    Sha256,
    /// Replace the value with the fixed [`REDACTED`] marker.
    Stub,
}

/// A parsed pseudonymisation directive, e.g. `sha256`, `sha256:8`, `stub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashSpec {
    pub method: HashMethod,
    /// Keep only the first `n` hex characters of the digest.
    pub truncate: Option<usize>,
    /// Optional key mixed into the digest ahead of the value.
    pub key: Option<String>,
}

impl HashSpec {
    /// Parse the `method[:length]` mini-language once at config load.
    /// Unknown methods or bad lengths are a config warning upstream.
    pub fn parse(spec: &str, key: Option<String>) -> Option<HashSpec> {
        let spec = spec.trim().to_lowercase();
        let (method, truncate) = match spec.split_once(':') {
            Some((m, n)) => (m.to_string(), Some(n.trim().parse::<usize>().ok()?)),
            None => (spec, None),
        };
        let method = match method.as_str() {
            "sha256" => HashMethod::Sha256,
            "stub" => HashMethod::Stub,
            _ => return None,
        };
        Some(HashSpec {
            method,
            truncate,
            key,
        })
    }

    /// Derive the replacement value. Deterministic: identical input and
    /// truncation always produce identical output.
    pub fn digest(&self, value: &str) -> String {
        match self.method {
            HashMethod::Stub => REDACTED.to_string(),
            HashMethod::Sha256 => {
                let mut hasher = Sha256::new();
                if let Some(key) = &self.key {
                    hasher.update(key.as_bytes());
                }
                hasher.update(value.as_bytes());
                let hex = hex::encode(hasher.finalize());
                match self.truncate {
                    Some(n) if n < hex.len() => hex[..n].to_string(),
                    _ => hex,
                }
            }
        }
    }
}

/// Per-field privacy directives. Both may be declared; anonymization wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrivacyPolicy {
    pub pseudonymise: Option<HashSpec>,
    pub anonymize: bool,
}

impl PrivacyPolicy {
    pub fn is_empty(&self) -> bool {
        self.pseudonymise.is_none() && !self.anonymize
    }
}

/// Apply privacy protection to an assembled record, in place.
///
/// Pseudonymised fields have their live value replaced by the digest of
/// its stringified form; anonymized fields are deleted outright, after any
/// pseudonymisation is computed. Removal is idempotent: re-protecting a
/// record never resurrects a dropped field.
pub fn protect(record: &mut Record, fields: &IndexMap<String, FieldSpec>) {
    for (name, spec) in fields {
        let Some(policy) = &spec.privacy else {
            continue;
        };

        if let Some(hash) = &policy.pseudonymise {
            if let Some(value) = record.get(name) {
                if !is_empty(value) {
                    let digest = hash.digest(&stringify(value));
                    record.insert(name.clone(), serde_json::Value::String(digest));
                }
            }
        }

        if policy.anonymize {
            record.shift_remove(name);
        }
    }
}
