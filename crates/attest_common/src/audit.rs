//! Call auditor.
//!
//! Best-effort persistence of each narrative exchange as one JSON object
//! under a date-partitioned key: `{prefix}{YYYYMMDD}/{kind}-{rid}.json`,
//! where `rid` is the first 8 hex characters of a v4 UUID. With no
//! storage root configured the auditor is a silent no-op; the narrative
//! pipeline never blocks on it.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use crate::error::AuditWriteError;
use crate::types::NarrativeKind;

/// One persisted exchange. Prompt and output arrive already redacted
/// when redaction is enabled.
#[derive(Debug, Serialize)]
struct CallRecord<'a> {
    ts: String,
    kind: &'a str,
    prompt_len: usize,
    output_len: usize,
    prompt: &'a str,
    output: &'a str,
}

/// Writes call records under a configurable root, or does nothing.
#[derive(Debug, Clone)]
pub struct CallAuditor {
    root: Option<PathBuf>,
    prefix: String,
}

impl CallAuditor {
    pub fn new(root: Option<PathBuf>, prefix: &str) -> Self {
        Self {
            root,
            prefix: prefix.to_string(),
        }
    }

    /// Auditor that never persists anything.
    pub fn disabled() -> Self {
        Self::new(None, "llm_logs/")
    }

    /// Persist one exchange. Returns the written object's location, or
    /// `None` when no root is configured.
    pub fn record(
        &self,
        kind: NarrativeKind,
        prompt: &str,
        output: &str,
    ) -> Result<Option<String>, AuditWriteError> {
        let Some(root) = &self.root else {
            return Ok(None);
        };

        let rid: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
        let key = format!(
            "{}{}/{}-{}.json",
            self.prefix,
            Utc::now().format("%Y%m%d"),
            kind.as_str(),
            rid
        );
        let path = root.join(&key);

        let record = CallRecord {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            kind: kind.as_str(),
            prompt_len: prompt.len(),
            output_len: output.len(),
            prompt,
            output,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_vec_pretty(&record)?)?;
        debug!(path = %path.display(), "audit record written");
        Ok(Some(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_auditor_is_a_noop() {
        let auditor = CallAuditor::disabled();
        let uri = auditor.record(NarrativeKind::Summary, "p", "o").unwrap();
        assert!(uri.is_none());
    }

    #[test]
    fn record_writes_date_partitioned_object() {
        let dir = tempfile::tempdir().unwrap();
        let auditor = CallAuditor::new(Some(dir.path().to_path_buf()), "llm_logs/");
        let uri = auditor
            .record(NarrativeKind::Rationale, "the prompt", "the output")
            .unwrap()
            .unwrap();

        let datepart = Utc::now().format("%Y%m%d").to_string();
        assert!(uri.contains(&format!("llm_logs/{}/rationale-", datepart)));
        assert!(uri.ends_with(".json"));

        let body: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&uri).unwrap()).unwrap();
        assert_eq!(body["kind"], "rationale");
        assert_eq!(body["prompt"], "the prompt");
        assert_eq!(body["prompt_len"], 10);
        assert_eq!(body["output_len"], 10);
        assert!(body["ts"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn successive_records_get_distinct_keys() {
        let dir = tempfile::tempdir().unwrap();
        let auditor = CallAuditor::new(Some(dir.path().to_path_buf()), "llm_logs/");
        let a = auditor.record(NarrativeKind::Hint, "p", "o").unwrap().unwrap();
        let b = auditor.record(NarrativeKind::Hint, "p", "o").unwrap().unwrap();
        assert_ne!(a, b);
    }
}
