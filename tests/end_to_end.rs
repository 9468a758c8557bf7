//! Full-pipeline tests: YAML config in, fetched HTML in, output file out.

use gleaner::{Disposition, Document, DocumentProcessor, TargetConfig, TracingReporter};

const STAFF_PAGE: &str = r#"
<html><body>
  <div class="person">
    <span class="name"> grace hopper </span>
    <span class="email">Grace.Hopper@Example.EDU</span>
    <span class="phone">(555) 123-4567</span>
    <span class="office">B-21</span>
  </div>
</body></html>
"#;

const SPARSE_PAGE: &str = r#"
<html><body>
  <div class="person">
    <span class="name">anonymous intern</span>
    <span class="email">intern@example.edu</span>
    <span class="phone">(555) 999-0000</span>
  </div>
</body></html>
"#;

const SPAM_PAGE: &str = r#"
<html><body>
  <div class="person">
    <span class="name">SPAM Bot</span>
    <span class="email">bot@example.edu</span>
    <span class="phone">(555) 000-0000</span>
  </div>
</body></html>
"#;

fn target_yaml(output_file: &str) -> String {
    format!(
        r#"
job_name: "staff-directory"
start_urls:
  - "https://example.edu/people"
crawl_settings:
  max_pages: 10
  max_depth: 2
extract_fields:
  name: ".person .name::text | strip | title_case"
  email:
    selector: ".person .email::text"
    transform: [strip, lowercase]
    privacy:
      pseudonymise: "sha256:12"
  phone: ".person .phone::text | normalize_phone"
  office:
    selector: ".person .office::text"
  ip:
    selector: ".person .ip::text"
    privacy:
      anonymize: true
filters:
  exclude_if:
    - field: "name"
      contains: "spam"
output:
  file: "{output_file}"
"#
    )
}

fn run_job(output_file: &str) -> std::path::PathBuf {
    let config = TargetConfig::from_yaml(&target_yaml(output_file), &TracingReporter);
    let processor = DocumentProcessor::new(config, TracingReporter).unwrap();

    let pages = [
        ("https://example.edu/people", STAFF_PAGE),
        ("https://example.edu/people/interns", SPARSE_PAGE),
        ("https://example.edu/people/bot", SPAM_PAGE),
    ];
    for (url, html) in pages {
        processor.process(&Document::new(url, html, 0.2, 0));
    }

    processor.finish().unwrap().expect("output written")
}

#[test]
fn normalize_phone_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("{job_name}.json");
    let path = run_job(&out.to_string_lossy());

    let text = std::fs::read_to_string(path).unwrap();
    let records: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(records[0]["phone"], serde_json::json!("+15551234567"));
}

#[test]
fn privacy_and_filtering_survive_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("{job_name}.json");
    let path = run_job(&out.to_string_lossy());

    let text = std::fs::read_to_string(path).unwrap();
    let records: serde_json::Value = serde_json::from_str(&text).unwrap();
    let records = records.as_array().unwrap();

    // The spam record was filtered out.
    assert_eq!(records.len(), 2);

    for record in records {
        // Anonymized fields are absent from every finalized record.
        assert!(record.get("ip").is_none());
        // Pseudonymised email: 12 hex chars, not the raw address.
        let email = record["email"].as_str().unwrap();
        assert_eq!(email.len(), 12);
        assert!(email.chars().all(|c| c.is_ascii_hexdigit()));
    }

    // Same raw value always hashes the same: re-run and compare.
    let dir2 = tempfile::tempdir().unwrap();
    let out2 = dir2.path().join("{job_name}.json");
    let path2 = run_job(&out2.to_string_lossy());
    let text2 = std::fs::read_to_string(path2).unwrap();
    let records2: serde_json::Value = serde_json::from_str(&text2).unwrap();
    assert_eq!(records[0]["email"], records2[0]["email"]);
}

#[test]
fn csv_union_header_with_missing_cells() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("{job_name}.csv");
    let path = run_job(&out.to_string_lossy());

    let text = std::fs::read_to_string(path).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();

    // Declared order first (minus the anonymized field), metadata after.
    assert!(header.starts_with("name,email,phone,office"));
    assert!(!header.contains("ip"));
    assert!(header.contains("scraped_at"));
    assert!(header.contains("user_contacted"));

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    let headers: Vec<&str> = header.split(',').collect();
    let office_idx = headers.iter().position(|h| *h == "office").unwrap();
    assert_eq!(rows[0].get(office_idx), Some("B-21"));
    // The sparse record has no office: empty cell, not a column shift.
    assert_eq!(rows[1].get(office_idx), Some(""));
}

#[test]
fn page_quota_closes_the_job() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("{job_name}.json");
    let yaml = target_yaml(&out.to_string_lossy()).replace("max_pages: 10", "max_pages: 1");

    let config = TargetConfig::from_yaml(&yaml, &TracingReporter);
    let processor = DocumentProcessor::new(config, TracingReporter).unwrap();

    let first = processor.process(&Document::new("https://example.edu/a", STAFF_PAGE, 0.1, 0));
    assert!(matches!(first, Disposition::Recorded { .. }));
    let second = processor.process(&Document::new("https://example.edu/b", STAFF_PAGE, 0.1, 0));
    assert_eq!(second, Disposition::PageLimitReached);

    let path = processor.finish().unwrap().expect("output written");
    let records: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 1);
}
