//! Core record types for the mapping engine and the report artifact.
//!
//! `Control` and `Evidence` are the two input record sets; everything else
//! is derived fresh on each run. `ReportRow` field names are the durable
//! JSON contract consumed by auditors downstream and must not change.

use serde::{Deserialize, Serialize};

/// Default evidence freshness threshold in days, used when a control
/// record leaves `max_evidence_age_days` blank.
pub const DRIFT_DAYS_DEFAULT: u32 = 30;

/// A compliance control: an identifier, a keyword set, and a freshness
/// threshold for its supporting evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    pub control_id: String,
    pub control_name: String,
    pub trust_service: String,
    /// Lowercased, trimmed keywords. Parse the raw semicolon-delimited
    /// column with [`crate::matcher::parse_keywords`].
    pub keywords: Vec<String>,
    /// Evidence older than this (in days) is drifted.
    #[serde(default = "default_max_age")]
    pub max_evidence_age_days: u32,
}

fn default_max_age() -> u32 {
    DRIFT_DAYS_DEFAULT
}

impl Control {
    pub fn new(control_id: &str, control_name: &str, trust_service: &str) -> Self {
        Self {
            control_id: control_id.to_string(),
            control_name: control_name.to_string(),
            trust_service: trust_service.to_string(),
            keywords: Vec::new(),
            max_evidence_age_days: DRIFT_DAYS_DEFAULT,
        }
    }

    pub fn with_keywords(mut self, raw: &str) -> Self {
        self.keywords = crate::matcher::parse_keywords(raw);
        self
    }

    pub fn with_max_age(mut self, days: u32) -> Self {
        self.max_evidence_age_days = days;
        self
    }
}

/// A dated evidence record asserting an operational fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub evidence_id: String,
    pub source: String,
    pub description: String,
    /// Raw date field; the first 10 characters must parse as an ISO
    /// calendar date. Kept verbatim for the report artifact.
    pub last_updated: String,
}

impl Evidence {
    pub fn new(evidence_id: &str, source: &str, description: &str, last_updated: &str) -> Self {
        Self {
            evidence_id: evidence_id.to_string(),
            source: source.to_string(),
            description: description.to_string(),
            last_updated: last_updated.to_string(),
        }
    }
}

/// One scored (control, evidence) association, enriched with display
/// fields from both records. Generated, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub control_id: String,
    pub control_name: String,
    pub trust_service: String,
    pub evidence_id: String,
    pub evidence_source: String,
    pub evidence_desc: String,
    pub last_updated: String,
    /// Whole days between the run's "today" and the evidence date.
    /// Negative for future-dated evidence.
    pub age_days: i64,
    pub max_age_days: u32,
    pub drift: bool,
    pub match_score: u32,
}

/// Per-control compliance classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "PARTIAL")]
    Partial,
    #[serde(rename = "FAIL")]
    Fail,
}

impl std::fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ControlStatus::Pass => "PASS",
            ControlStatus::Partial => "PARTIAL",
            ControlStatus::Fail => "FAIL",
        };
        write!(f, "{}", s)
    }
}

/// Evidence counts and status for one control. The counts are an exact
/// partition of that control's rows: ok + drift == total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSummary {
    pub control_id: String,
    pub status: ControlStatus,
    pub ok_evidence: u32,
    pub drift_evidence: u32,
    pub total_evidence: u32,
}

/// The auditor-facing report artifact. Top-level field names are part of
/// the external contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// UTC instant of assembly, ISO-8601 with a trailing `Z`.
    pub generated_at: String,
    pub summary: Vec<ControlSummary>,
    pub rows: Vec<ReportRow>,
}

/// Which narrative is being generated; selects the prompt template and
/// the audit key component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeKind {
    Summary,
    Rationale,
    Hint,
}

impl NarrativeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeKind::Summary => "summary",
            NarrativeKind::Rationale => "rationale",
            NarrativeKind::Hint => "hint",
        }
    }

    /// Template file name under the prompts directory.
    pub fn template_file(&self) -> &'static str {
        match self {
            NarrativeKind::Summary => "summary_v1.md",
            NarrativeKind::Rationale => "rationale_v1.md",
            NarrativeKind::Hint => "fuzzy_hint_v1.md",
        }
    }
}

/// Output of the narrative pipeline. `log_uri` is set only when the call
/// auditor persisted the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeResult {
    pub text: String,
    pub log_uri: Option<String>,
}

/// Prompt-builder view of a report row. Severity and category are
/// optional so callers can feed findings from other sources; rows map
/// drift to High and fresh evidence to Informational, with the trust
/// service as category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Option<String>,
    pub category: Option<String>,
    pub description: String,
    pub resource_type: String,
    pub resource_id: String,
}

impl From<&ReportRow> for Finding {
    fn from(row: &ReportRow) -> Self {
        let severity = if row.drift { "High" } else { "Informational" };
        Self {
            severity: Some(severity.to_string()),
            category: Some(row.trust_service.clone()),
            description: format!(
                "{}: {} (evidence {} days old, threshold {})",
                row.control_id, row.evidence_desc, row.age_days, row.max_age_days
            ),
            resource_type: row.evidence_source.clone(),
            resource_id: row.evidence_id.clone(),
        }
    }
}
