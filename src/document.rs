//! One fetched unit of content supplied by the external fetch engine.

use scraper::Html;

/// A fetched document: a stable address, the parsed HTML body, the elapsed
/// fetch time, and the crawl depth at which it was discovered.
///
/// Documents are created by the fetch engine at the crate boundary and are
/// read-only inside the pipeline. The HTML is parsed exactly once, here.
pub struct Document {
    url: String,
    html: Html,
    response_time: f64,
    depth: u32,
}

impl Document {
    /// Parse a fetched page into a queryable document.
    pub fn new(url: impl Into<String>, body: &str, response_time: f64, depth: u32) -> Self {
        Self {
            url: url.into(),
            html: Html::parse_document(body),
            response_time,
            depth,
        }
    }

    /// The document's own address.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parsed HTML, for CSS selection.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Elapsed fetch time in seconds, as measured by the fetch engine.
    pub fn response_time(&self) -> f64 {
        self.response_time
    }

    /// Crawl depth: 0 for start URLs, +1 per followed link.
    pub fn depth(&self) -> u32 {
        self.depth
    }
}
