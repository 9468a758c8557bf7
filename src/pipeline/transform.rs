//! Ordered value transformations applied after extraction.
//!
//! Each operation consumes a sequence of strings and returns the sequence
//! for the next operation. Ops are parsed once at config load from the
//! `op` / `op:arg` / `op:'a','b'` mini-language and applied strictly in
//! declaration order.

use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// One step of a field's transformation chain.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOp {
    /// Drop empty entries, trim whitespace on the rest.
    Strip,
    Lowercase,
    Uppercase,
    TitleCase,
    /// Keep only the first `n` entries of the sequence.
    Limit(usize),
    /// Collapse the sequence into one separator-joined entry.
    Join(String),
    /// Expand each entry into multiple entries by separator.
    Split(String),
    /// Substring replacement within each entry.
    Replace { from: String, to: String },
    /// Truncate each entry to `n` characters.
    Truncate(usize),
    /// Remove `<...>` tag runs from each entry.
    RemoveHtml,
    RemovePrefix(String),
    RemoveSuffix(String),
    /// Canonicalize North-American phone numbers to `+1XXXXXXXXXX`.
    NormalizePhone,
}

impl TransformOp {
    /// Parse one op from its config spelling, e.g. `strip`, `limit:3`,
    /// `replace:'old','new'`. Returns None for unknown op names or
    /// malformed arguments; the caller reports and skips the op.
    pub fn parse(spec: &str) -> Option<TransformOp> {
        let spec = spec.trim();
        let (name, arg) = match spec.split_once(':') {
            Some((n, a)) => (n.trim(), Some(a.trim())),
            None => (spec, None),
        };

        match name {
            "strip" => Some(TransformOp::Strip),
            "lowercase" => Some(TransformOp::Lowercase),
            "uppercase" => Some(TransformOp::Uppercase),
            "title_case" => Some(TransformOp::TitleCase),
            "limit" => arg?.parse().ok().map(TransformOp::Limit),
            "join" => Some(TransformOp::Join(
                arg.map(unquote).unwrap_or_else(|| " ".to_string()),
            )),
            "split" => arg.map(|a| TransformOp::Split(unquote(a))),
            "replace" => {
                let (from, to) = arg?.split_once(',')?;
                Some(TransformOp::Replace {
                    from: unquote(from),
                    to: unquote(to),
                })
            }
            "truncate" => arg?.parse().ok().map(TransformOp::Truncate),
            "remove_html" => Some(TransformOp::RemoveHtml),
            "remove_prefix" => arg.map(|a| TransformOp::RemovePrefix(unquote(a))),
            "remove_suffix" => arg.map(|a| TransformOp::RemoveSuffix(unquote(a))),
            "normalize_phone" => Some(TransformOp::NormalizePhone),
            _ => None,
        }
    }

    /// Apply this op to a value sequence.
    pub fn apply(&self, values: Vec<String>) -> Vec<String> {
        match self {
            TransformOp::Strip => values
                .into_iter()
                .filter(|v| !v.is_empty())
                .map(|v| v.trim().to_string())
                .collect(),
            TransformOp::Lowercase => values.into_iter().map(|v| v.to_lowercase()).collect(),
            TransformOp::Uppercase => values.into_iter().map(|v| v.to_uppercase()).collect(),
            TransformOp::TitleCase => values.iter().map(|v| title_case(v)).collect(),
            TransformOp::Limit(n) => {
                let mut values = values;
                values.truncate(*n);
                values
            }
            TransformOp::Join(sep) => vec![values.join(sep)],
            TransformOp::Split(sep) => values
                .iter()
                .flat_map(|v| v.split(sep.as_str()).map(String::from))
                .collect(),
            TransformOp::Replace { from, to } => values
                .into_iter()
                .map(|v| v.replace(from.as_str(), to))
                .collect(),
            TransformOp::Truncate(n) => values
                .into_iter()
                .map(|v| v.chars().take(*n).collect())
                .collect(),
            TransformOp::RemoveHtml => values
                .iter()
                .map(|v| TAG_RE.replace_all(v, "").into_owned())
                .collect(),
            TransformOp::RemovePrefix(p) => values
                .into_iter()
                .map(|v| v.strip_prefix(p.as_str()).map(String::from).unwrap_or(v))
                .collect(),
            TransformOp::RemoveSuffix(s) => values
                .into_iter()
                .map(|v| v.strip_suffix(s.as_str()).map(String::from).unwrap_or(v))
                .collect(),
            TransformOp::NormalizePhone => {
                values.iter().map(|v| normalize_phone(v)).collect()
            }
        }
    }
}

/// Run a full transformation chain in declaration order. An empty chain is
/// a no-op returning the original sequence.
pub fn apply_all(values: Vec<String>, ops: &[TransformOp]) -> Vec<String> {
    ops.iter().fold(values, |acc, op| op.apply(acc))
}

/// Strip surrounding single or double quotes from an op argument.
fn unquote(arg: &str) -> String {
    let arg = arg.trim();
    let quotes: &[char] = &['\'', '"'];
    arg.strip_prefix(quotes)
        .and_then(|a| a.strip_suffix(quotes))
        .unwrap_or(arg)
        .to_string()
}

/// Capitalize the first letter of each word, lowercasing the rest.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Strip everything but digits and `+`, then format 10-digit numbers and
/// leading-1 11-digit numbers as `+1XXXXXXXXXX`. Anything else is returned
/// unchanged.
fn normalize_phone(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("+1{digits}")
    } else if digits.len() == 11 && digits.starts_with('1') {
        format!("+{digits}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vals(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_mini_language() {
        assert_eq!(TransformOp::parse("strip"), Some(TransformOp::Strip));
        assert_eq!(TransformOp::parse("limit:3"), Some(TransformOp::Limit(3)));
        assert_eq!(
            TransformOp::parse("join:', '"),
            Some(TransformOp::Join(", ".into()))
        );
        assert_eq!(
            TransformOp::parse("replace:'old','new'"),
            Some(TransformOp::Replace {
                from: "old".into(),
                to: "new".into()
            })
        );
        assert_eq!(TransformOp::parse("frobnicate"), None);
        assert_eq!(TransformOp::parse("limit:abc"), None);
    }

    #[test]
    fn test_strip_then_uppercase() {
        let out = apply_all(
            vals(&[" a ", " b "]),
            &[TransformOp::Strip, TransformOp::Uppercase],
        );
        assert_eq!(out, vals(&["A", "B"]));
    }

    #[test]
    fn test_uppercase_then_strip() {
        // Strip is whitespace-robust regardless of prior case folding.
        let out = apply_all(
            vals(&[" a ", " b "]),
            &[TransformOp::Uppercase, TransformOp::Strip],
        );
        assert_eq!(out, vals(&["A", "B"]));
    }

    #[test]
    fn test_strip_drops_empty_entries() {
        let out = TransformOp::Strip.apply(vals(&["", "  x  ", ""]));
        assert_eq!(out, vals(&["x"]));
    }

    #[test]
    fn test_limit_preserves_order() {
        let out = TransformOp::Limit(2).apply(vals(&["1", "2", "3", "4", "5"]));
        assert_eq!(out, vals(&["1", "2"]));
    }

    #[test]
    fn test_join_and_split() {
        assert_eq!(
            TransformOp::Join(", ".into()).apply(vals(&["a", "b"])),
            vals(&["a, b"])
        );
        assert_eq!(
            TransformOp::Split(",".into()).apply(vals(&["a,b", "c"])),
            vals(&["a", "b", "c"])
        );
    }

    #[test]
    fn test_truncate_counts_characters() {
        let out = TransformOp::Truncate(3).apply(vals(&["ábcde"]));
        assert_eq!(out, vals(&["ábc"]));
    }

    #[test]
    fn test_remove_html() {
        let out = TransformOp::RemoveHtml.apply(vals(&["<b>bold</b> text"]));
        assert_eq!(out, vals(&["bold text"]));
    }

    #[test]
    fn test_remove_prefix_only_at_edge() {
        let op = TransformOp::RemovePrefix("Dr. ".into());
        assert_eq!(op.apply(vals(&["Dr. Who", "No Dr. here"]))[1], "No Dr. here");
        assert_eq!(op.apply(vals(&["Dr. Who"]))[0], "Who");
    }

    #[test]
    fn test_title_case() {
        let out = TransformOp::TitleCase.apply(vals(&["ada LOVELACE"]));
        assert_eq!(out, vals(&["Ada Lovelace"]));
    }

    #[test]
    fn test_normalize_phone() {
        let op = TransformOp::NormalizePhone;
        assert_eq!(op.apply(vals(&["(555) 123-4567"])), vals(&["+15551234567"]));
        assert_eq!(op.apply(vals(&["1-555-123-4567"])), vals(&["+15551234567"]));
        // Too few digits: untouched.
        assert_eq!(op.apply(vals(&["12345"])), vals(&["12345"]));
    }

    #[test]
    fn test_empty_chain_is_noop() {
        let input = vals(&[" raw "]);
        assert_eq!(apply_all(input.clone(), &[]), input);
    }
}
