//! Attest Control - CLI for the compliance mapper and narrative pipeline.
//!
//! `report` builds the deterministic mapping report from the two input
//! record sets; `narrative`, `explain`, and `hint` drive the model-backed
//! narrative pipeline over an existing report. The narrative commands
//! never fail on model errors; the fallback text prints instead.

mod loader;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use attest_common::audit::CallAuditor;
use attest_common::config::AttestConfig;
use attest_common::llm_client::HttpModelClient;
use attest_common::mapping::{self, MalformedRecordPolicy};
use attest_common::narrative;
use attest_common::report;
use attest_common::types::{NarrativeKind, Report};

#[derive(Parser)]
#[command(name = "attestctl")]
#[command(about = "Evidence-to-control compliance mapping with AI narratives", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults plus ATTEST_* env overrides)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the mapping report from control and evidence record sets
    Report {
        /// Controls CSV (control_id, control_name, trust_service,
        /// keywords, max_evidence_age_days)
        #[arg(long)]
        controls: PathBuf,

        /// Evidence CSV (evidence_id, source, description, last_updated)
        #[arg(long)]
        evidence: PathBuf,

        /// Output path for the report JSON
        #[arg(long, default_value = "latest_report.json")]
        out: PathBuf,

        /// Skip evidence records with unparseable dates instead of
        /// aborting the run
        #[arg(long)]
        skip_malformed: bool,
    },

    /// Generate an executive summary narrative for a report
    Narrative {
        /// Report JSON produced by `report`
        #[arg(long)]
        report: PathBuf,
    },

    /// Explain one control's findings
    Explain {
        #[arg(long)]
        report: PathBuf,

        /// Control identifier, e.g. CC6.1
        #[arg(long)]
        control: String,
    },

    /// Get a fuzzy remediation hint for one control
    Hint {
        #[arg(long)]
        report: PathBuf,

        #[arg(long)]
        control: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AttestConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Report {
            controls,
            evidence,
            out,
            skip_malformed,
        } => run_report(&controls, &evidence, &out, skip_malformed),
        Commands::Narrative { report } => {
            run_narrative(&config, &report, NarrativeKind::Summary, None)
        }
        Commands::Explain { report, control } => {
            run_narrative(&config, &report, NarrativeKind::Rationale, Some(&control))
        }
        Commands::Hint { report, control } => {
            run_narrative(&config, &report, NarrativeKind::Hint, Some(&control))
        }
    }
}

fn run_report(
    controls_path: &Path,
    evidence_path: &Path,
    out: &Path,
    skip_malformed: bool,
) -> Result<()> {
    let controls = loader::load_controls(controls_path)?;
    let evidence = loader::load_evidence(evidence_path)?;
    info!(controls = controls.len(), evidence = evidence.len(), "record sets loaded");

    let policy = if skip_malformed {
        MalformedRecordPolicy::Skip
    } else {
        MalformedRecordPolicy::Abort
    };
    let today = chrono::Utc::now().date_naive();
    let rows = mapping::map_evidence(&controls, &evidence, today, policy)?;
    let report = report::build_report(&controls, rows, report::generated_at_now());

    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(out, &json)
        .with_context(|| format!("failed to write report to {}", out.display()))?;

    info!(rows = report.rows.len(), out = %out.display(), "report written");
    println!(
        "Report written to {} ({} mappings, {} controls)",
        out.display(),
        report.rows.len(),
        report.summary.len()
    );
    Ok(())
}

fn run_narrative(
    config: &AttestConfig,
    report_path: &Path,
    kind: NarrativeKind,
    control_id: Option<&str>,
) -> Result<()> {
    let raw = std::fs::read_to_string(report_path)
        .with_context(|| format!("failed to read report {}", report_path.display()))?;
    let report: Report = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse report {}", report_path.display()))?;

    let rows = match control_id {
        Some(id) => {
            if !report.summary.iter().any(|s| s.control_id == id) {
                bail!("control {} does not appear in the report", id);
            }
            narrative::rows_for_control(&report.rows, id)
        }
        None => report.rows.clone(),
    };

    let client = HttpModelClient::new(config.llm.clone())?;
    let auditor = CallAuditor::new(config.audit_root.clone(), &config.audit_prefix);
    let result = narrative::generate(
        kind,
        &rows,
        &config.llm,
        &config.prompts_dir,
        &client,
        &auditor,
    );

    println!("{}", result.text);
    if let Some(uri) = result.log_uri {
        info!(log_uri = %uri, "narrative call audited");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn report_command_writes_contract_artifact() {
        let controls = write_tmp(
            "control_id,control_name,trust_service,keywords,max_evidence_age_days\n\
             CC6.1,Logical access,Security,access;login,30\n\
             CC9.9,Orphan,Privacy,nothing-matches,30\n",
        );
        let evidence = write_tmp(
            "evidence_id,source,description,last_updated\n\
             E1,siem,login audit log,2026-08-01\n",
        );
        let out = tempfile::NamedTempFile::new().unwrap();

        run_report(controls.path(), evidence.path(), out.path(), false).unwrap();

        let report: Report =
            serde_json::from_str(&std::fs::read_to_string(out.path()).unwrap()).unwrap();
        assert!(report.generated_at.ends_with('Z'));
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].control_id, "CC6.1");
        // The unmatched control still appears in the summary.
        assert_eq!(report.summary.len(), 2);
        assert_eq!(report.summary[1].control_id, "CC9.9");
        assert_eq!(report.summary[1].total_evidence, 0);
    }

    #[test]
    fn report_command_aborts_on_malformed_date_by_default() {
        let controls = write_tmp(
            "control_id,control_name,trust_service,keywords\nCC6.1,Access,Security,login\n",
        );
        let evidence = write_tmp(
            "evidence_id,source,description,last_updated\nE1,siem,login log,whenever\n",
        );
        let out = tempfile::NamedTempFile::new().unwrap();
        assert!(run_report(controls.path(), evidence.path(), out.path(), false).is_err());
        assert!(run_report(controls.path(), evidence.path(), out.path(), true).is_ok());
    }
}
