//! Gleaner — declarative field extraction for fetched web documents.
//!
//! A target configuration names the fields to pull out of each document,
//! the transformations that shape them, the constraints that validate
//! them, and the privacy protections applied before anything is kept.
//! An external fetch engine supplies the documents; this crate turns each
//! one into a structured record, accumulates the collection, and writes
//! it once at job end as CSV, YAML, or JSON.

pub mod config;
pub mod document;
pub mod error;
pub mod links;
pub mod output;
pub mod pipeline;
pub mod processor;
pub mod record;
pub mod reporter;

pub use config::{FieldSpec, TargetConfig};
pub use document::Document;
pub use error::{Error, Result};
pub use links::LinkPolicy;
pub use pipeline::{ExclusionRule, PrivacyPolicy, TransformOp, ValidationRule};
pub use processor::{Disposition, DocumentProcessor, JobState};
pub use record::Record;
pub use reporter::{Reporter, RunSummary, TracingReporter};
