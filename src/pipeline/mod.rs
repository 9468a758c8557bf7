//! Per-document processing stages.
//!
//! Stage order is fixed: extraction → transformation → default
//! substitution → validation → assembly → filter → privacy. Each stage is
//! a pure function over its inputs; the processor sequences them.

pub mod extract;
pub mod filter;
pub mod privacy;
pub mod transform;
pub mod validate;

pub use extract::{extract, URL_SENTINEL};
pub use filter::{include, ExclusionRule};
pub use privacy::{protect, HashMethod, HashSpec, PrivacyPolicy, REDACTED};
pub use transform::{apply_all, TransformOp};
pub use validate::ValidationRule;
