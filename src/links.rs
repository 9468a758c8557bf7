//! Link eligibility — which discovered links the fetch engine may enqueue.
//!
//! The core never schedules fetches itself; it answers two questions for
//! the engine: "which anchors on this document qualify?" and "is this URL
//! allowed at all?". Rules come from `link_extraction` plus the domain
//! fence in `crawl_settings`.

use crate::config::TargetConfig;
use crate::document::Document;
use crate::reporter::Reporter;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// File extensions never worth fetching as documents, used when the
/// config declares none of its own.
pub const DEFAULT_IGNORED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "zip", "rar", "tar", "gz",
];

/// Compiled allow/deny rules for discovered links.
pub struct LinkPolicy {
    follow_paths: Vec<String>,
    ignore_paths: Vec<String>,
    ignore_extensions: Vec<String>,
    domains: Vec<String>,
    anchors: Selector,
}

impl LinkPolicy {
    /// Compile the policy once per job. An unparseable `restrict_css`
    /// scope degrades to scanning all anchors, with a warning.
    pub fn new(config: &TargetConfig, reporter: &dyn Reporter) -> Self {
        let anchors = config
            .links
            .restrict_css
            .as_deref()
            .and_then(|scope| {
                let scoped = format!("{scope} a[href]");
                let parsed = match Selector::parse(&scoped) {
                    Ok(sel) => Some(sel),
                    Err(e) => {
                        reporter.config_warning(&format!(
                            "link_extraction.restrict_css `{scope}` is invalid ({e}); scanning all links"
                        ));
                        None
                    }
                };
                parsed
            })
            .unwrap_or_else(|| Selector::parse("a[href]").expect("static selector"));

        let ignore_extensions = if config.links.ignore_extensions.is_empty() {
            DEFAULT_IGNORED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            config.links.ignore_extensions.clone()
        };

        Self {
            follow_paths: config.links.follow_paths.clone(),
            ignore_paths: config.links.ignore_paths.clone(),
            ignore_extensions,
            domains: config.crawl.allowed_domains.clone(),
            anchors,
        }
    }

    /// Whether a single absolute URL qualifies for traversal.
    pub fn allows(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        if !self.domains.is_empty() {
            let host = parsed.host_str().unwrap_or_default();
            if !self.domains.iter().any(|d| d == host) {
                return false;
            }
        }

        let path = parsed.path().to_lowercase();
        if self
            .ignore_extensions
            .iter()
            .any(|ext| path.ends_with(&format!(".{}", ext.to_lowercase())))
        {
            return false;
        }
        if self.ignore_paths.iter().any(|p| path.contains(p.as_str())) {
            return false;
        }
        if !self.follow_paths.is_empty()
            && !self.follow_paths.iter().any(|p| path.contains(p.as_str()))
        {
            return false;
        }
        true
    }

    /// Collect the document's eligible outbound links: anchors within the
    /// configured scope, resolved against the document address, fragments
    /// stripped, deduplicated in first-seen order.
    pub fn eligible_links(&self, doc: &Document) -> Vec<String> {
        let Ok(base) = Url::parse(doc.url()) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for el in doc.html().select(&self.anchors) {
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            let Ok(mut resolved) = base.join(href) else {
                continue;
            };
            resolved.set_fragment(None);
            let url = resolved.to_string();
            if self.allows(&url) && seen.insert(url.clone()) {
                links.push(url);
            }
        }
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::CollectingReporter;

    fn config(yaml: &str) -> TargetConfig {
        TargetConfig::from_yaml(yaml, &CollectingReporter::default())
    }

    const PAGE: &str = r#"
        <nav><a href="/people?page=2">next</a></nav>
        <main>
          <a href="/people/ada">Ada</a>
          <a href="/people/ada#bio">Ada bio</a>
          <a href="/files/cv.pdf">CV</a>
          <a href="/admin/edit">edit</a>
          <a href="https://elsewhere.example.net/people">mirror</a>
        </main>
    "#;

    #[test]
    fn test_same_domain_fence_and_deny_rules() {
        let config = config(
            "start_urls: [\"https://example.edu/people\"]\nlink_extraction:\n  ignore_paths: [\"/admin\"]\n",
        );
        let policy = LinkPolicy::new(&config, &CollectingReporter::default());
        let doc = Document::new("https://example.edu/people", PAGE, 0.1, 0);

        let links = policy.eligible_links(&doc);
        assert_eq!(
            links,
            vec![
                "https://example.edu/people?page=2".to_string(),
                "https://example.edu/people/ada".to_string(),
            ]
        );
    }

    #[test]
    fn test_restrict_css_scopes_anchor_search() {
        let config = config(
            "start_urls: [\"https://example.edu/people\"]\nlink_extraction:\n  restrict_css: \"main\"\n  ignore_paths: [\"/admin\"]\n",
        );
        let policy = LinkPolicy::new(&config, &CollectingReporter::default());
        let doc = Document::new("https://example.edu/people", PAGE, 0.1, 0);

        let links = policy.eligible_links(&doc);
        assert_eq!(links, vec!["https://example.edu/people/ada".to_string()]);
    }

    #[test]
    fn test_follow_paths_allowlist() {
        let config = config(
            "start_urls: [\"https://example.edu/\"]\nlink_extraction:\n  follow_paths: [\"/people\"]\n",
        );
        let policy = LinkPolicy::new(&config, &CollectingReporter::default());
        assert!(policy.allows("https://example.edu/people/ada"));
        assert!(!policy.allows("https://example.edu/news/today"));
    }

    #[test]
    fn test_default_extension_denylist() {
        let config = config("start_urls: [\"https://example.edu/\"]\n");
        let policy = LinkPolicy::new(&config, &CollectingReporter::default());
        assert!(!policy.allows("https://example.edu/files/report.PDF"));
        assert!(policy.allows("https://example.edu/files/report.html"));
    }

    #[test]
    fn test_invalid_restrict_css_degrades_with_warning() {
        let reporter = CollectingReporter::default();
        let config = config(
            "start_urls: [\"https://example.edu/\"]\nlink_extraction:\n  restrict_css: \":::bad\"\n",
        );
        let policy = LinkPolicy::new(&config, &reporter);
        assert!(reporter.contains("restrict_css"));
        let doc = Document::new("https://example.edu/", "<a href=\"/x\">x</a>", 0.1, 0);
        assert_eq!(policy.eligible_links(&doc).len(), 1);
    }
}
