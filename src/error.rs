//! Error taxonomy for the extraction core.
//!
//! Only two conditions are fatal to a job: a missing start set and a failed
//! output write. Everything else (bad selectors, failed validation, broken
//! config sections) degrades locally and is surfaced through the
//! [`Reporter`](crate::reporter::Reporter).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The configuration names no start URLs. Checked once at job start.
    #[error("no start URLs configured")]
    NoStartUrls,

    /// A selector expression could not be parsed against the document.
    /// Recovered per field by substituting the configured default.
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    /// A configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// The single output write failed. The in-memory collection is
    /// preserved; no retry is attempted.
    #[error("failed to write output to `{path}`: {message}")]
    Serialize { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
