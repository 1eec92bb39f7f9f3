//! Narrative pipeline.
//!
//! BuildPrompt → Redact → Invoke → Normalize, with a deterministic
//! fallback narrative on any failure or on an empty-but-successful
//! response. No error from the model path ever reaches the caller: the
//! worst observable outcome is the fixed fallback text.

use std::path::Path;

use tracing::warn;

use crate::audit::CallAuditor;
use crate::llm_client::{LlmConfig, ModelClient};
use crate::prompt;
use crate::redaction;
use crate::types::{Finding, NarrativeKind, NarrativeResult, ReportRow};

/// Extract plain text from whatever response body the provider returned.
///
/// Total function: in order, tries the flat string fields, the nested
/// `output.message.content[].text` shape, the `outputs[0].content[].text`
/// shape, and finally a string rendering of the parsed value. Unparseable
/// bodies come back trimmed as-is.
pub fn extract_narrative(raw: &str) -> String {
    let data: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => return raw.trim().to_string(),
    };

    for key in ["completion", "outputText", "generation", "answer", "output"] {
        if let Some(text) = data.get(key).and_then(|v| v.as_str()) {
            return text.trim().to_string();
        }
    }

    if let Some(parts) = data
        .get("output")
        .and_then(|v| v.get("message"))
        .and_then(|v| v.get("content"))
        .and_then(|v| v.as_array())
    {
        let texts = join_text_fragments(parts);
        if !texts.is_empty() {
            return texts;
        }
    }

    if let Some(parts) = data
        .get("outputs")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("content"))
        .and_then(|v| v.as_array())
    {
        let texts = join_text_fragments(parts);
        if !texts.is_empty() {
            return texts;
        }
    }

    data.to_string().trim().to_string()
}

fn join_text_fragments(parts: &[serde_json::Value]) -> String {
    parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fixed narrative used whenever the model path fails or returns nothing.
pub fn fallback_narrative() -> String {
    "# Compliance Narrative (Fallback)\n\n\
     AI narrative unavailable. Review the deterministic mapping report.\n\n\
     Next steps:\n\
     - Prioritize Critical/High findings.\n\
     - Validate evidence timestamps; remediate drift.\n\
     - Re-run the assessment after remediation.\n"
        .to_string()
}

/// Generate one narrative over the given report rows.
///
/// Rows are converted to findings, rendered through the kind's template,
/// scrubbed (unless redaction is disabled), sent to the model, and
/// normalized. The auditor persists the exchange best-effort; its failure
/// only costs the `log_uri`.
pub fn generate(
    kind: NarrativeKind,
    rows: &[ReportRow],
    config: &LlmConfig,
    prompts_dir: &Path,
    client: &dyn ModelClient,
    auditor: &CallAuditor,
) -> NarrativeResult {
    let findings: Vec<Finding> = rows.iter().map(Finding::from).collect();
    let template = prompt::load_template(kind, prompts_dir);
    let rendered = prompt::build_prompt(&template, &findings);
    let safe_prompt = if config.redact {
        redaction::scrub_text(&rendered)
    } else {
        rendered
    };

    let text = match client.invoke(&safe_prompt) {
        Ok(raw) => {
            let narrative = extract_narrative(&raw);
            if narrative.is_empty() {
                warn!(kind = kind.as_str(), "model returned empty narrative, using fallback");
                fallback_narrative()
            } else {
                narrative
            }
        }
        Err(e) => {
            warn!(kind = kind.as_str(), error = %e, "model invocation failed, using fallback");
            fallback_narrative()
        }
    };

    let log_uri = match auditor.record(kind, &safe_prompt, &text) {
        Ok(uri) => uri,
        Err(e) => {
            warn!(kind = kind.as_str(), error = %e, "audit write failed");
            None
        }
    };

    NarrativeResult { text, log_uri }
}

/// Rows filtered to one control, for per-control rationale and hints.
pub fn rows_for_control<'a>(rows: &'a [ReportRow], control_id: &str) -> Vec<ReportRow> {
    rows.iter().filter(|r| r.control_id == control_id).cloned().collect()
}
