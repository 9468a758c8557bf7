//! Per-field validation: pattern and length constraints.

use crate::record::{is_empty, stringify};
use regex::Regex;
use serde_json::Value;

/// Constraints a field value must satisfy to be kept on a record.
///
/// Validation never enforces presence: a null or empty value always
/// passes (`required` handles absence, and only with a warning). The
/// pattern is compiled once at config load and matched anchored at the
/// start of the stringified value.
#[derive(Debug, Clone, Default)]
pub struct ValidationRule {
    pub pattern: Option<Regex>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl ValidationRule {
    /// Compile a rule from its config parts. A pattern that fails to
    /// compile is returned as an error message for the config loader to
    /// report; the rule then degrades to length checks only.
    pub fn compile(
        pattern: Option<&str>,
        min_length: Option<usize>,
        max_length: Option<usize>,
    ) -> Result<Self, String> {
        let pattern = match pattern {
            Some(p) => Some(
                Regex::new(&format!("^(?:{p})"))
                    .map_err(|e| format!("invalid validation pattern `{p}`: {e}"))?,
            ),
            None => None,
        };
        Ok(Self {
            pattern,
            min_length,
            max_length,
        })
    }

    /// True when no rule parts are present.
    pub fn is_vacuous(&self) -> bool {
        self.pattern.is_none() && self.min_length.is_none() && self.max_length.is_none()
    }

    /// Check a record value. Empty values always validate; constraints
    /// that are absent are satisfied.
    pub fn validate(&self, value: &Value) -> bool {
        if is_empty(value) {
            return true;
        }
        let text = stringify(value);
        if let Some(re) = &self.pattern {
            if !re.is_match(&text) {
                return false;
            }
        }
        let chars = text.chars().count();
        if let Some(min) = self.min_length {
            if chars < min {
                return false;
            }
        }
        if let Some(max) = self.max_length {
            if chars > max {
                return false;
            }
        }
        true
    }
}
