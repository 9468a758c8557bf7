//! Per-field extraction specs and the two config shapes that produce them.
//!
//! A field is declared either as a bare pipe expression
//! (`".name::text | strip | title_case"`) or as a nested map with explicit
//! `selector`, `transform`, `validation`, `privacy`, `required`, and
//! `default` keys. Both shapes resolve to the same [`FieldSpec`] at load
//! time; nothing re-branches on config shape per record.

use crate::pipeline::{HashSpec, PrivacyPolicy, TransformOp, ValidationRule};
use crate::reporter::Reporter;
use serde::Deserialize;

/// A fully-resolved extraction spec for one named field. Immutable after
/// config load.
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    pub name: String,
    pub selector: String,
    pub transformations: Vec<TransformOp>,
    pub validation: Option<ValidationRule>,
    pub required: bool,
    pub default_value: Option<String>,
    pub privacy: Option<PrivacyPolicy>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a spec from the bare-string shape: a selector followed by
    /// ` | `-separated transformation ops.
    pub fn from_expr(name: &str, expr: &str, reporter: &dyn Reporter) -> Option<FieldSpec> {
        let mut parts = expr.split(" | ").map(str::trim);
        let selector = parts.next().unwrap_or_default();
        if selector.is_empty() {
            reporter.config_warning(&format!("field `{name}` has an empty selector, skipped"));
            return None;
        }

        let mut spec = FieldSpec::new(name);
        spec.selector = selector.to_string();
        spec.transformations = parse_ops(name, parts, reporter);
        Some(spec)
    }

    /// Build a spec from the nested-map shape.
    pub fn from_map(name: &str, raw: RawFieldSpec, reporter: &dyn Reporter) -> Option<FieldSpec> {
        let selector = raw.selector.unwrap_or_default();
        if selector.trim().is_empty() {
            reporter.config_warning(&format!("field `{name}` declares no selector, skipped"));
            return None;
        }

        let mut spec = FieldSpec::new(name);
        spec.selector = selector.trim().to_string();
        spec.transformations = parse_ops(name, raw.transform.into_iter(), reporter);
        spec.required = raw.required;
        spec.default_value = raw.default;
        spec.validation = raw.validation.and_then(|v| build_validation(name, v, reporter));
        spec.privacy = raw.privacy.and_then(|p| build_privacy(name, p, reporter));
        Some(spec)
    }
}

/// Nested-map field shape as it appears in YAML. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawFieldSpec {
    pub selector: Option<String>,
    pub transform: StringList,
    pub validation: Option<RawValidation>,
    pub required: bool,
    pub default: Option<String>,
    pub privacy: Option<RawPrivacy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawValidation {
    pub pattern: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawPrivacy {
    pub pseudonymise: Option<String>,
    pub key: Option<String>,
    pub anonymize: bool,
}

/// Accepts both `transform: strip` and `transform: [strip, title_case]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    One(String),
    Many(Vec<String>),
}

impl Default for StringList {
    fn default() -> Self {
        StringList::Many(Vec::new())
    }
}

impl IntoIterator for StringList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            StringList::One(s) => vec![s].into_iter(),
            StringList::Many(v) => v.into_iter(),
        }
    }
}

fn parse_ops<I, S>(field: &str, specs: I, reporter: &dyn Reporter) -> Vec<TransformOp>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    specs
        .filter_map(|s| {
            let s = s.as_ref();
            let op = TransformOp::parse(s);
            if op.is_none() {
                reporter
                    .config_warning(&format!("field `{field}`: unknown transformation `{s}`"));
            }
            op
        })
        .collect()
}

fn build_validation(
    field: &str,
    raw: RawValidation,
    reporter: &dyn Reporter,
) -> Option<ValidationRule> {
    let rule = match ValidationRule::compile(raw.pattern.as_deref(), raw.min_length, raw.max_length)
    {
        Ok(rule) => rule,
        Err(message) => {
            reporter.config_warning(&format!("field `{field}`: {message}"));
            // Degrade to length checks only.
            ValidationRule::compile(None, raw.min_length, raw.max_length).unwrap_or_default()
        }
    };
    (!rule.is_vacuous()).then_some(rule)
}

fn build_privacy(field: &str, raw: RawPrivacy, reporter: &dyn Reporter) -> Option<PrivacyPolicy> {
    let pseudonymise = match raw.pseudonymise {
        Some(spec) => {
            let parsed = HashSpec::parse(&spec, raw.key);
            if parsed.is_none() {
                reporter.config_warning(&format!(
                    "field `{field}`: unknown pseudonymisation method `{spec}`"
                ));
            }
            parsed
        }
        None => None,
    };
    let policy = PrivacyPolicy {
        pseudonymise,
        anonymize: raw.anonymize,
    };
    (!policy.is_empty()).then_some(policy)
}
