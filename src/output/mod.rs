//! Output serialization — write the record collection once, at job end.
//!
//! The path template supports `{job_name}` and `{timestamp}`; the format
//! is inferred from the resolved extension. Bytes are rendered fully in
//! memory, written to a sibling temp file, and renamed into place so a
//! failed write never leaves a half-written target.

use crate::config::OutputConfig;
use crate::error::Error;
use crate::record::{stringify, Record};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Output formats, inferred from the resolved path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Yaml,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Format {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("csv") => Format::Csv,
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Json,
        }
    }
}

/// Resolve the output path template for this job.
pub fn resolve_path(config: &OutputConfig, job_name: &str) -> PathBuf {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    PathBuf::from(
        config
            .file
            .replace("{job_name}", job_name)
            .replace("{timestamp}", &timestamp),
    )
}

/// Serialize the collection to the resolved path. `declared_columns`
/// fixes the leading CSV column order; extra keys follow in first-seen
/// order. Returns the written path.
pub fn serialize(
    records: &[Record],
    config: &OutputConfig,
    job_name: &str,
    declared_columns: &[String],
) -> Result<PathBuf, Error> {
    let path = resolve_path(config, job_name);
    let fail = |message: String| Error::Serialize {
        path: path.display().to_string(),
        message,
    };

    let bytes = match Format::from_path(&path) {
        Format::Csv => to_csv(records, declared_columns).map_err(&fail)?,
        Format::Yaml => serde_yaml::to_string(records)
            .map(String::into_bytes)
            .map_err(|e| fail(e.to_string()))?,
        Format::Json => serde_json::to_vec_pretty(records).map_err(|e| fail(e.to_string()))?,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
        }
    }

    // Stage next to the target, then rename: all-or-nothing on failure.
    let staged = path.with_extension("tmp");
    std::fs::write(&staged, &bytes).map_err(|e| fail(e.to_string()))?;
    std::fs::rename(&staged, &path).map_err(|e| fail(e.to_string()))?;

    Ok(path)
}

/// Render CSV: declared columns first, then undeclared keys as they first
/// appear across records. Missing keys render as empty cells.
fn to_csv(records: &[Record], declared_columns: &[String]) -> Result<Vec<u8>, String> {
    let mut columns: Vec<String> = declared_columns.to_vec();
    for record in records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns).map_err(|e| e.to_string())?;
    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|col| record.get(col).map(stringify).unwrap_or_default())
            .collect();
        writer.write_record(&row).map_err(|e| e.to_string())?;
    }

    writer
        .into_inner()
        .map_err(|e| e.to_string())
}
