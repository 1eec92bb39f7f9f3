//! Drift evaluator.
//!
//! Computes evidence age against an injected "today" reference and
//! classifies it against a control's freshness threshold. Pure: the
//! caller supplies the reference date, so the same inputs always produce
//! the same answer.

use chrono::NaiveDate;

use crate::error::MapperError;

/// Outcome of evaluating one evidence date against one threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftEvaluation {
    /// Whole days between `today` and the evidence date. Negative for
    /// future-dated evidence.
    pub age_days: i64,
    /// True iff age_days strictly exceeds the threshold. Boundary
    /// equality is not drift; negative age never is.
    pub drift: bool,
}

/// Parse the evidence date from the first 10 characters of the raw
/// `last_updated` field (ISO calendar date, `YYYY-MM-DD`). Longer values
/// such as full timestamps are accepted; the time portion is ignored.
pub fn parse_evidence_date(evidence_id: &str, raw: &str) -> Result<NaiveDate, MapperError> {
    let head: String = raw.chars().take(10).collect();
    NaiveDate::parse_from_str(&head, "%Y-%m-%d").map_err(|_| MapperError::MalformedDate {
        evidence_id: evidence_id.to_string(),
        raw: raw.to_string(),
    })
}

/// Evaluate one evidence record's freshness.
pub fn evaluate(
    evidence_id: &str,
    last_updated: &str,
    max_age_days: u32,
    today: NaiveDate,
) -> Result<DriftEvaluation, MapperError> {
    let date = parse_evidence_date(evidence_id, last_updated)?;
    let age_days = (today - date).num_days();
    Ok(DriftEvaluation {
        age_days,
        drift: age_days > i64::from(max_age_days),
    })
}
