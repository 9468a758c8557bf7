//! Target configuration: what to crawl, what to extract, how to protect
//! it, and where the results go.
//!
//! Loading never fails hard. A missing or unparseable file degrades to an
//! empty configuration with a warning; a broken field spec degrades to
//! skipping that field. The only fatal precondition (an empty start set)
//! is checked by the processor, not here.

mod field;

pub use field::{FieldSpec, RawFieldSpec, RawPrivacy, RawValidation, StringList};

use crate::pipeline::ExclusionRule;
use crate::reporter::Reporter;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Page and depth quotas plus the domain fence for one job.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    pub max_pages: usize,
    pub max_depth: u32,
    pub follow_links: bool,
    pub allowed_domains: Vec<String>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_pages: 10,
            max_depth: 3,
            follow_links: true,
            allowed_domains: Vec::new(),
        }
    }
}

/// Patterns handed to the fetch engine to decide which discovered links
/// qualify for traversal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkRules {
    pub follow_paths: Vec<String>,
    pub ignore_paths: Vec<String>,
    pub ignore_extensions: Vec<String>,
    pub restrict_css: Option<String>,
}

/// Where and how the record collection is written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path template; `{job_name}` and `{timestamp}` are resolved at
    /// write time, format is inferred from the extension.
    pub file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: "output/{job_name}_{timestamp}.json".to_string(),
        }
    }
}

/// One job's full declarative specification.
#[derive(Debug, Clone, Default)]
pub struct TargetConfig {
    pub job_name: String,
    pub start_urls: Vec<String>,
    pub crawl: CrawlSettings,
    /// Field name → spec, in declaration order. Names are unique by
    /// construction (map keys).
    pub fields: IndexMap<String, FieldSpec>,
    pub exclude_if: Vec<ExclusionRule>,
    pub links: LinkRules,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    job_name: Option<String>,
    start_urls: Vec<String>,
    crawl_settings: CrawlSettings,
    extract_fields: IndexMap<String, serde_yaml::Value>,
    filters: RawFilters,
    link_extraction: LinkRules,
    output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFilters {
    exclude_if: Vec<ExclusionRule>,
}

impl TargetConfig {
    /// Load a target file. Missing or malformed files degrade to an
    /// empty configuration with a warning.
    pub fn load(path: &Path, reporter: &dyn Reporter) -> TargetConfig {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                reporter.config_warning(&format!(
                    "target file `{}` not readable ({e}); using empty configuration",
                    path.display()
                ));
                return TargetConfig::default();
            }
        };
        Self::from_yaml(&text, reporter)
    }

    /// Parse a target configuration from YAML text.
    pub fn from_yaml(text: &str, reporter: &dyn Reporter) -> TargetConfig {
        match serde_yaml::from_str::<RawConfig>(text) {
            Ok(raw) => Self::from_raw(raw, reporter),
            Err(e) => {
                reporter.config_warning(&format!(
                    "target configuration is not valid YAML ({e}); using empty configuration"
                ));
                TargetConfig::default()
            }
        }
    }

    fn from_raw(raw: RawConfig, reporter: &dyn Reporter) -> TargetConfig {
        let mut fields = IndexMap::new();
        for (name, shape) in raw.extract_fields {
            let spec = match shape {
                serde_yaml::Value::String(expr) => FieldSpec::from_expr(&name, &expr, reporter),
                map @ serde_yaml::Value::Mapping(_) => {
                    match serde_yaml::from_value::<RawFieldSpec>(map) {
                        Ok(map) => FieldSpec::from_map(&name, map, reporter),
                        Err(e) => {
                            reporter.config_warning(&format!(
                                "field `{name}` has an invalid spec ({e}), skipped"
                            ));
                            None
                        }
                    }
                }
                _ => {
                    reporter.config_warning(&format!(
                        "field `{name}` must be a selector expression or a map, skipped"
                    ));
                    None
                }
            };
            if let Some(spec) = spec {
                fields.insert(name, spec);
            }
        }

        let mut crawl = raw.crawl_settings;
        if crawl.allowed_domains.is_empty() {
            crawl.allowed_domains = domains_of(&raw.start_urls);
        }

        TargetConfig {
            job_name: raw.job_name.unwrap_or_else(|| "gleaner-job".to_string()),
            start_urls: raw.start_urls,
            crawl,
            fields,
            exclude_if: raw.filters.exclude_if,
            links: raw.link_extraction,
            output: raw.output,
        }
    }

    /// Column names for CSV output: declared fields in order, minus the
    /// anonymized ones (they never appear on a finalized record).
    pub fn declared_columns(&self) -> Vec<String> {
        self.fields
            .values()
            .filter(|spec| {
                spec.privacy
                    .as_ref()
                    .map_or(true, |policy| !policy.anonymize)
            })
            .map(|spec| spec.name.clone())
            .collect()
    }
}

/// Unique hosts of the start set, in first-seen order.
fn domains_of(start_urls: &[String]) -> Vec<String> {
    let mut domains = Vec::new();
    for url in start_urls {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                if !domains.iter().any(|d| d == host) {
                    domains.push(host.to_string());
                }
            }
        }
    }
    domains
}
