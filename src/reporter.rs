//! Injected reporting callbacks for pipeline observability.
//!
//! Recoverable conditions (degraded config sections, skipped fields,
//! filtered records) are reported here rather than returned as errors, so
//! hosts can route them to logs, metrics, or a compliance trail.

use std::time::Duration;
use tracing::{info, warn};

/// Summary of one finished job, handed to the reporter before output is
/// written.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub job_name: String,
    pub pages_processed: usize,
    pub records_kept: usize,
    pub elapsed: Duration,
}

/// Observability hooks invoked by the config loader and the document
/// processor. All methods have no-op-adjacent defaults in the tracing
/// implementation; implementors may buffer or redirect as needed.
pub trait Reporter: Send + Sync {
    /// A configuration section could not be used and degraded to default.
    fn config_warning(&self, message: &str);

    /// A field was skipped or substituted while processing a document.
    fn field_warning(&self, url: &str, field: &str, message: &str);

    /// A document finished the pipeline (whether or not it produced a
    /// record).
    fn page_processed(&self, url: &str, page: usize, max_pages: usize);

    /// A fully-built record was excluded by a filter rule.
    fn record_excluded(&self, url: &str, field: &str);

    /// The job ended; serialization happens after this call.
    fn job_finished(&self, summary: &RunSummary);
}

/// Default reporter: everything goes to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn config_warning(&self, message: &str) {
        warn!("config: {message}");
    }

    fn field_warning(&self, url: &str, field: &str, message: &str) {
        warn!("{url}: field `{field}`: {message}");
    }

    fn page_processed(&self, url: &str, page: usize, max_pages: usize) {
        info!("processed page {page}/{max_pages}: {url}");
    }

    fn record_excluded(&self, url: &str, field: &str) {
        info!("{url}: record excluded by filter on `{field}`");
    }

    fn job_finished(&self, summary: &RunSummary) {
        info!(
            "job `{}` finished: {} pages, {} records kept, {:.1}s",
            summary.job_name,
            summary.pages_processed,
            summary.records_kept,
            summary.elapsed.as_secs_f64()
        );
    }
}

/// Test reporter that collects messages instead of logging them.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub messages: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl CollectingReporter {
    pub fn contains(&self, needle: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.contains(needle))
    }
}

#[cfg(test)]
impl Reporter for CollectingReporter {
    fn config_warning(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn field_warning(&self, url: &str, field: &str, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("{url} {field} {message}"));
    }

    fn page_processed(&self, _url: &str, _page: usize, _max_pages: usize) {}

    fn record_excluded(&self, url: &str, field: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("excluded {url} {field}"));
    }

    fn job_finished(&self, _summary: &RunSummary) {}
}
