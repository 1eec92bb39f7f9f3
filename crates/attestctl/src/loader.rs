//! Record-set loading.
//!
//! Reads the two tabular input sources (controls, evidence) from CSV
//! files with a header row, preserving row order. The reader handles
//! quoted fields and doubled quotes; embedded newlines inside quoted
//! fields are not supported. This is the thin shim in front of the
//! engine; all validation beyond column presence happens downstream.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

use attest_common::error::MapperError;
use attest_common::types::{Control, Evidence, DRIFT_DAYS_DEFAULT};

/// Split one CSV line into fields, honoring double quotes.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Parse a CSV document into header-keyed row maps, in input order.
fn parse_rows(raw: &str) -> Result<Vec<HashMap<String, String>>> {
    let mut lines = raw.lines().filter(|l| !l.trim().is_empty());
    let Some(header_line) = lines.next() else {
        bail!("input has no header row");
    };
    let header: Vec<String> = split_fields(header_line)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for line in lines {
        let fields = split_fields(line);
        let mut row = HashMap::new();
        for (i, name) in header.iter().enumerate() {
            row.insert(name.clone(), fields.get(i).cloned().unwrap_or_default());
        }
        rows.push(row);
    }
    Ok(rows)
}

fn required<'a>(
    row: &'a HashMap<String, String>,
    record: &str,
    field: &str,
) -> Result<&'a str, MapperError> {
    match row.get(field) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim()),
        _ => Err(MapperError::MissingField {
            record: record.to_string(),
            field: field.to_string(),
        }),
    }
}

/// Load the controls record set.
pub fn load_controls(path: &Path) -> Result<Vec<Control>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read controls file {}", path.display()))?;
    let mut controls = Vec::new();
    for row in parse_rows(&raw)? {
        let control_id = required(&row, "control", "control_id")?;
        let max_age = match row.get("max_evidence_age_days").map(|s| s.trim()) {
            None | Some("") => DRIFT_DAYS_DEFAULT,
            Some(v) => v
                .parse()
                .with_context(|| format!("control {}: bad max_evidence_age_days {:?}", control_id, v))?,
        };
        controls.push(
            Control::new(
                control_id,
                row.get("control_name").map(|s| s.trim()).unwrap_or_default(),
                row.get("trust_service").map(|s| s.trim()).unwrap_or_default(),
            )
            .with_keywords(row.get("keywords").map(String::as_str).unwrap_or_default())
            .with_max_age(max_age),
        );
    }
    Ok(controls)
}

/// Load the evidence record set.
pub fn load_evidence(path: &Path) -> Result<Vec<Evidence>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read evidence file {}", path.display()))?;
    let mut evidence = Vec::new();
    for row in parse_rows(&raw)? {
        let evidence_id = required(&row, "evidence", "evidence_id")?;
        let last_updated = required(&row, "evidence", "last_updated")?;
        evidence.push(Evidence::new(
            evidence_id,
            row.get("source").map(|s| s.trim()).unwrap_or_default(),
            row.get("description").map(|s| s.trim()).unwrap_or_default(),
            last_updated,
        ));
    }
    Ok(evidence)
}
