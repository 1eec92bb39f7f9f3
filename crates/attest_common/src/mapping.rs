//! Mapping engine.
//!
//! Walks the full cross product of controls × evidence, scoring each pair
//! with the keyword matcher and evaluating freshness for every pair that
//! matches. Output order is stable: controls in input order, evidence in
//! input order within each control, so identical inputs and the same
//! "today" produce byte-identical rows.

use chrono::NaiveDate;
use tracing::warn;

use crate::drift;
use crate::error::MapperError;
use crate::matcher;
use crate::types::{Control, Evidence, ReportRow};

/// What to do with an evidence record whose date cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedRecordPolicy {
    /// Drop the pair and continue the run (logged at warn).
    #[default]
    Skip,
    /// Propagate the error and abort the run.
    Abort,
}

/// Produce one enriched row per (control, evidence) pair with a positive
/// match score. Complexity is O(controls × evidence); record sets are
/// tens to low hundreds of rows.
pub fn map_evidence(
    controls: &[Control],
    evidence: &[Evidence],
    today: NaiveDate,
    policy: MalformedRecordPolicy,
) -> Result<Vec<ReportRow>, MapperError> {
    let mut rows = Vec::new();
    for control in controls {
        for ev in evidence {
            let score = matcher::match_score(&control.keywords, ev);
            if score == 0 {
                continue;
            }
            let eval = match drift::evaluate(
                &ev.evidence_id,
                &ev.last_updated,
                control.max_evidence_age_days,
                today,
            ) {
                Ok(eval) => eval,
                Err(e) => match policy {
                    MalformedRecordPolicy::Skip => {
                        warn!(evidence_id = %ev.evidence_id, error = %e, "skipping malformed evidence record");
                        continue;
                    }
                    MalformedRecordPolicy::Abort => return Err(e),
                },
            };
            rows.push(ReportRow {
                control_id: control.control_id.clone(),
                control_name: control.control_name.clone(),
                trust_service: control.trust_service.clone(),
                evidence_id: ev.evidence_id.clone(),
                evidence_source: ev.source.clone(),
                evidence_desc: ev.description.clone(),
                last_updated: ev.last_updated.clone(),
                age_days: eval.age_days,
                max_age_days: control.max_evidence_age_days,
                drift: eval.drift,
                match_score: score,
            });
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
    }

    fn controls() -> Vec<Control> {
        vec![
            Control::new("CC6.1", "Logical access", "Security").with_keywords("access;login"),
            Control::new("CC7.2", "Monitoring", "Availability").with_keywords("monitor;alert"),
        ]
    }

    #[test]
    fn zero_score_pairs_emit_nothing() {
        let evidence = vec![Evidence::new("E1", "wiki", "unrelated note", "2026-08-01")];
        let rows = map_evidence(&controls(), &evidence, today(), MalformedRecordPolicy::Abort)
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn control_with_no_keywords_produces_no_rows() {
        let ctrl = vec![Control::new("CC1.1", "Governance", "Security")];
        let evidence = vec![Evidence::new("E1", "siem", "anything at all", "2026-08-01")];
        let rows = map_evidence(&ctrl, &evidence, today(), MalformedRecordPolicy::Abort).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn rows_are_ordered_controls_outer_evidence_inner() {
        let evidence = vec![
            Evidence::new("E1", "siem", "login alert feed", "2026-08-20"),
            Evidence::new("E2", "grafana", "uptime monitor", "2026-08-25"),
        ];
        let rows = map_evidence(&controls(), &evidence, today(), MalformedRecordPolicy::Abort)
            .unwrap();
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.control_id.as_str(), r.evidence_id.as_str()))
            .collect();
        // CC6.1 matches E1 ("login"), CC7.2 matches E1 ("alert") and E2 ("monitor").
        assert_eq!(keys, vec![("CC6.1", "E1"), ("CC7.2", "E1"), ("CC7.2", "E2")]);
    }

    #[test]
    fn skip_policy_drops_malformed_records() {
        let evidence = vec![
            Evidence::new("E1", "siem", "login log", "not-a-date"),
            Evidence::new("E2", "siem", "access review", "2026-08-25"),
        ];
        let rows = map_evidence(&controls(), &evidence, today(), MalformedRecordPolicy::Skip)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].evidence_id, "E2");
    }

    #[test]
    fn abort_policy_propagates_malformed_records() {
        let evidence = vec![Evidence::new("E1", "siem", "login log", "not-a-date")];
        let err = map_evidence(&controls(), &evidence, today(), MalformedRecordPolicy::Abort)
            .unwrap_err();
        assert!(matches!(err, MapperError::MalformedDate { .. }));
    }

    #[test]
    fn row_carries_score_and_drift() {
        let evidence = vec![Evidence::new("E1", "siem", "login audit log access", "2026-07-01")];
        let rows = map_evidence(&controls(), &evidence, today(), MalformedRecordPolicy::Abort)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].match_score, 2);
        assert_eq!(rows[0].age_days, 59);
        assert!(rows[0].drift);
    }
}
