//! Document processor — sequences the pipeline stages per document and
//! enforces the page quota.
//!
//! The fetch engine may deliver documents from several in-flight requests
//! at once, so the quota check, pipeline run, and append are one critical
//! section behind a mutex. Everything inside the section is synchronous
//! and non-blocking; serialization happens exactly once, in [`finish`].
//!
//! [`finish`]: DocumentProcessor::finish

use crate::config::{FieldSpec, TargetConfig};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::links::LinkPolicy;
use crate::output;
use crate::pipeline::{self, extract, protect};
use crate::record::{self, Record};
use crate::reporter::{Reporter, RunSummary};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

/// Marker substituted when a field's selector fails and no default is
/// configured.
pub const ERROR_MARKER: &str = "[ERROR]";

/// Lifecycle of one crawl job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    /// The page quota was hit; no further documents are accepted.
    PageLimitReached,
    /// The fetch engine signalled completion.
    Exhausted,
}

/// What happened to one delivered document, reported back to the fetch
/// engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// A record was appended. `follow_links` tells the engine whether
    /// this document's outbound links are eligible for traversal.
    Recorded { follow_links: bool },
    /// The record was built but excluded by a filter rule.
    Filtered { follow_links: bool },
    /// The job already hit its page quota; the document was not counted.
    PageLimitReached,
}

impl Disposition {
    /// Whether the engine should enqueue this document's links.
    pub fn follow_links(&self) -> bool {
        matches!(
            self,
            Disposition::Recorded { follow_links: true }
                | Disposition::Filtered { follow_links: true }
        )
    }
}

struct RunState {
    state: JobState,
    pages_processed: usize,
    records: Vec<Record>,
}

/// Per-job context: configuration, compiled link policy, reporter, and
/// the shared mutable run state.
pub struct DocumentProcessor<R: Reporter> {
    config: TargetConfig,
    policy: LinkPolicy,
    reporter: R,
    run: Mutex<RunState>,
    started: Instant,
}

impl<R: Reporter> DocumentProcessor<R> {
    /// Create the processor for one job. An empty start set is the one
    /// fatal precondition and is rejected here, once.
    pub fn new(config: TargetConfig, reporter: R) -> Result<Self> {
        if config.start_urls.is_empty() {
            return Err(Error::NoStartUrls);
        }
        let policy = LinkPolicy::new(&config, &reporter);
        Ok(Self {
            config,
            policy,
            reporter,
            run: Mutex::new(RunState {
                state: JobState::Running,
                pages_processed: 0,
                records: Vec::new(),
            }),
            started: Instant::now(),
        })
    }

    /// The compiled link policy, for the fetch engine to pre-filter
    /// discovered links.
    pub fn link_policy(&self) -> &LinkPolicy {
        &self.policy
    }

    /// Current job state.
    pub fn state(&self) -> JobState {
        self.run.lock().expect("run state poisoned").state
    }

    /// Records accumulated so far (cloned snapshot).
    pub fn records(&self) -> Vec<Record> {
        self.run.lock().expect("run state poisoned").records.clone()
    }

    /// Run one document through the pipeline.
    ///
    /// Quota check, extraction, filtering, privacy, append, and counter
    /// increment happen under a single lock so concurrent deliveries
    /// cannot overshoot the quota or interleave appends.
    pub fn process(&self, doc: &Document) -> Disposition {
        let mut run = self.run.lock().expect("run state poisoned");

        if run.state != JobState::Running {
            return Disposition::PageLimitReached;
        }
        if run.pages_processed >= self.config.crawl.max_pages {
            run.state = JobState::PageLimitReached;
            return Disposition::PageLimitReached;
        }

        let follow_links =
            self.config.crawl.follow_links && doc.depth() < self.config.crawl.max_depth;

        let mut item = self.build_record(doc);
        record::append_metadata(&mut item, doc);

        run.pages_processed += 1;
        let page = run.pages_processed;
        self.reporter
            .page_processed(doc.url(), page, self.config.crawl.max_pages);

        if let Some(rule) = self
            .config
            .exclude_if
            .iter()
            .find(|rule| rule.matches(&item))
        {
            self.reporter.record_excluded(doc.url(), &rule.field);
            return Disposition::Filtered { follow_links };
        }

        protect(&mut item, &self.config.fields);
        run.records.push(item);

        Disposition::Recorded { follow_links }
    }

    /// Assemble the field portion of a record: extraction →
    /// transformation → default substitution → validation, per field in
    /// declaration order.
    fn build_record(&self, doc: &Document) -> Record {
        let mut item = Record::new();
        for (name, spec) in &self.config.fields {
            match self.build_field(doc, spec) {
                Some(value) => {
                    if spec.required && record::is_empty(&value) {
                        self.reporter
                            .field_warning(doc.url(), name, "required field is missing");
                    }
                    item.insert(name.clone(), value);
                }
                None => {
                    // Validation failure: field left unset.
                }
            }
        }
        item
    }

    /// Build one field's value. Returns None when validation rejects the
    /// value (the field is skipped for this record).
    fn build_field(&self, doc: &Document, spec: &FieldSpec) -> Option<Value> {
        let value = match extract(doc, &spec.selector) {
            Ok(raw) => {
                let transformed = pipeline::apply_all(raw, &spec.transformations);
                let collapsed = record::collapse(transformed);
                if record::is_empty(&collapsed) {
                    self.substitute_default(spec)
                } else {
                    collapsed
                }
            }
            Err(e) => {
                self.reporter
                    .field_warning(doc.url(), &spec.name, &e.to_string());
                match &spec.default_value {
                    Some(default) => Value::String(default.clone()),
                    None => Value::String(ERROR_MARKER.to_string()),
                }
            }
        };

        if let Some(rule) = &spec.validation {
            if !rule.validate(&value) {
                self.reporter.field_warning(
                    doc.url(),
                    &spec.name,
                    "value failed validation, field skipped",
                );
                return None;
            }
        }

        Some(value)
    }

    fn substitute_default(&self, spec: &FieldSpec) -> Value {
        match &spec.default_value {
            Some(default) => Value::String(default.clone()),
            None => Value::Null,
        }
    }

    /// End the job: transition out of `Running`, report the summary, and
    /// serialize the collection exactly once. The collection is kept in
    /// memory even when the write fails.
    ///
    /// Callers must ensure all in-flight `process` calls have returned;
    /// the lock makes that a barrier, not a data race.
    pub fn finish(&self) -> Result<Option<PathBuf>> {
        let mut run = self.run.lock().expect("run state poisoned");
        if run.state == JobState::Running {
            run.state = JobState::Exhausted;
        }

        self.reporter.job_finished(&RunSummary {
            job_name: self.config.job_name.clone(),
            pages_processed: run.pages_processed,
            records_kept: run.records.len(),
            elapsed: self.started.elapsed(),
        });

        if run.records.is_empty() {
            self.reporter.config_warning("no records to save");
            return Ok(None);
        }

        let path = output::serialize(
            &run.records,
            &self.config.output,
            &self.config.job_name,
            &self.config.declared_columns(),
        )?;
        Ok(Some(path))
    }
}
