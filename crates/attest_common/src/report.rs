//! Aggregation and report assembly.
//!
//! Reduces mapping rows to a per-control summary and assembles the
//! dated report artifact. Every loaded control appears in the summary,
//! including controls with no matching evidence at all: absence of
//! evidence is itself a finding and is reported as FAIL with zero counts.

use chrono::{SecondsFormat, Utc};

use crate::types::{Control, ControlStatus, ControlSummary, Report, ReportRow};

/// Classify one control from its evidence counts.
///
/// PASS requires at least one fresh record and no drifted ones; PARTIAL
/// is fresh plus drifted; FAIL is no fresh evidence at all, which covers
/// the zero-evidence case.
fn classify(ok: u32, drifted: u32) -> ControlStatus {
    if ok > 0 && drifted == 0 {
        ControlStatus::Pass
    } else if ok > 0 {
        ControlStatus::Partial
    } else {
        ControlStatus::Fail
    }
}

/// Group rows by control, in Control input order, and apply the status
/// rule. Controls absent from `rows` still get a FAIL/0/0/0 entry.
pub fn summarize(controls: &[Control], rows: &[ReportRow]) -> Vec<ControlSummary> {
    controls
        .iter()
        .map(|control| {
            let mut ok = 0u32;
            let mut drifted = 0u32;
            for row in rows.iter().filter(|r| r.control_id == control.control_id) {
                if row.drift {
                    drifted += 1;
                } else {
                    ok += 1;
                }
            }
            ControlSummary {
                control_id: control.control_id.clone(),
                status: classify(ok, drifted),
                ok_evidence: ok,
                drift_evidence: drifted,
                total_evidence: ok + drifted,
            }
        })
        .collect()
}

/// Current UTC instant, ISO-8601 with an explicit `Z` suffix.
pub fn generated_at_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Assemble the report artifact. Pure assembly, no further computation.
pub fn build_report(controls: &[Control], rows: Vec<ReportRow>, generated_at: String) -> Report {
    Report {
        generated_at,
        summary: summarize(controls, &rows),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{map_evidence, MalformedRecordPolicy};
    use crate::types::Evidence;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
    }

    fn row(control_id: &str, drift: bool) -> ReportRow {
        ReportRow {
            control_id: control_id.into(),
            control_name: "ctl".into(),
            trust_service: "Security".into(),
            evidence_id: "E1".into(),
            evidence_source: "siem".into(),
            evidence_desc: "desc".into(),
            last_updated: "2026-08-01".into(),
            age_days: 28,
            max_age_days: 30,
            drift,
            match_score: 1,
        }
    }

    #[test]
    fn status_rule_covers_all_combinations() {
        assert_eq!(classify(1, 0), ControlStatus::Pass);
        assert_eq!(classify(3, 2), ControlStatus::Partial);
        assert_eq!(classify(0, 2), ControlStatus::Fail);
        assert_eq!(classify(0, 0), ControlStatus::Fail);
    }

    #[test]
    fn counts_partition_rows() {
        let controls = vec![Control::new("CC6.1", "ctl", "Security").with_keywords("x")];
        let rows = vec![row("CC6.1", true), row("CC6.1", false), row("CC6.1", false)];
        let summary = summarize(&controls, &rows);
        assert_eq!(summary.len(), 1);
        let s = &summary[0];
        assert_eq!(s.ok_evidence + s.drift_evidence, s.total_evidence);
        assert_eq!(s.total_evidence, 3);
        assert_eq!(s.status, ControlStatus::Partial);
    }

    #[test]
    fn zero_mapping_controls_still_appear_as_fail() {
        let controls = vec![
            Control::new("CC6.1", "ctl", "Security").with_keywords("x"),
            Control::new("CC9.9", "orphan", "Privacy").with_keywords("zzz"),
        ];
        let summary = summarize(&controls, &[row("CC6.1", false)]);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[1].control_id, "CC9.9");
        assert_eq!(summary[1].status, ControlStatus::Fail);
        assert_eq!(summary[1].total_evidence, 0);
    }

    #[test]
    fn generated_at_carries_z_suffix() {
        assert!(generated_at_now().ends_with('Z'));
    }

    #[test]
    fn report_json_contract_field_names() {
        let controls = vec![Control::new("CC6.1", "ctl", "Security").with_keywords("x")];
        let report = build_report(&controls, vec![row("CC6.1", false)], "2026-08-29T00:00:00Z".into());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("generated_at").is_some());
        assert!(json["summary"][0].get("ok_evidence").is_some());
        assert!(json["rows"][0].get("evidence_desc").is_some());
        assert_eq!(json["summary"][0]["status"], "PASS");
    }

    #[test]
    fn end_to_end_drifted_single_pair() {
        // keywords "access;login" against a 45-day-old SIEM login log.
        let controls = vec![
            Control::new("CC6.1", "Logical access", "Security")
                .with_keywords("access;login")
                .with_max_age(30),
        ];
        let evidence = vec![Evidence::new("E1", "siem", "login audit log access", "2026-07-15")];
        let rows = map_evidence(&controls, &evidence, today(), MalformedRecordPolicy::Abort)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].match_score, 2);
        assert_eq!(rows[0].age_days, 45);
        assert!(rows[0].drift);

        let summary = summarize(&controls, &rows);
        assert_eq!(summary[0].status, ControlStatus::Fail);
        assert_eq!(summary[0].drift_evidence, 1);
        assert_eq!(summary[0].ok_evidence, 0);
    }

    #[test]
    fn end_to_end_fresh_single_pair_passes() {
        let controls = vec![
            Control::new("CC6.1", "Logical access", "Security")
                .with_keywords("access;login")
                .with_max_age(30),
        ];
        let evidence = vec![Evidence::new("E1", "siem", "login audit log", "2026-08-19")];
        let rows = map_evidence(&controls, &evidence, today(), MalformedRecordPolicy::Abort)
            .unwrap();
        assert_eq!(rows[0].age_days, 10);
        assert!(!rows[0].drift);
        let summary = summarize(&controls, &rows);
        assert_eq!(summary[0].status, ControlStatus::Pass);
    }

    #[test]
    fn end_to_end_unmatched_control_reports_fail() {
        let controls = vec![
            Control::new("CC8.1", "Change mgmt", "Security").with_keywords("deploy;rollback"),
        ];
        let evidence = vec![Evidence::new("E1", "siem", "login audit log", "2026-08-19")];
        let rows = map_evidence(&controls, &evidence, today(), MalformedRecordPolicy::Abort)
            .unwrap();
        assert!(rows.is_empty());
        let report = build_report(&controls, rows, generated_at_now());
        assert_eq!(report.summary.len(), 1);
        assert_eq!(report.summary[0].status, ControlStatus::Fail);
        assert_eq!(report.summary[0].total_evidence, 0);
    }
}
