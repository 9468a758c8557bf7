//! Record-level exclusion filters.

use crate::record::{is_empty, stringify, Record};
use serde::Deserialize;

/// Exclude a record when the named field's value contains the given
/// substring, case-insensitively.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ExclusionRule {
    pub field: String,
    pub contains: String,
}

impl ExclusionRule {
    /// Whether this rule fires for the given record. An absent field or
    /// empty value never triggers exclusion.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(value) = record.get(&self.field) else {
            return false;
        };
        if is_empty(value) {
            return false;
        }
        stringify(value)
            .to_lowercase()
            .contains(&self.contains.to_lowercase())
    }
}

/// Whether a record survives the exclusion rules. Any matching rule
/// excludes the record.
pub fn include(record: &Record, rules: &[ExclusionRule]) -> bool {
    !rules.iter().any(|rule| rule.matches(record))
}
