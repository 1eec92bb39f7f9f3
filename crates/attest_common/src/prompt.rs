//! Prompt builder.
//!
//! Renders a bounded, templated prompt from a list of findings. The
//! numeric summary counts the whole finding set passed in; the body
//! groups by category and shows at most the top five per category by
//! severity rank, with an overflow line for the rest. Callers scrub the
//! rendered prompt before it leaves the process (see the narrative
//! pipeline).

use std::path::Path;

use tracing::debug;

use crate::types::{Finding, NarrativeKind};

const SEVERITIES: [&str; 5] = ["Critical", "High", "Medium", "Low", "Informational"];

/// Fixed severity rank: Critical=0 through Informational=4, anything
/// else (or missing) sorts last.
fn severity_rank(severity: Option<&str>) -> u8 {
    match severity {
        Some("Critical") => 0,
        Some("High") => 1,
        Some("Medium") => 2,
        Some("Low") => 3,
        Some("Informational") => 4,
        _ => 99,
    }
}

/// Per-category cap on verbatim findings.
const TOP_PER_CATEGORY: usize = 5;

/// Built-in instruction used when no template file is available.
const BUILTIN_TEMPLATE: &str =
    "You are an AI auditor assistant. Summarize and explain findings clearly.";

/// Load the template for a narrative kind from the prompts directory,
/// falling back to the built-in instruction line.
pub fn load_template(kind: NarrativeKind, prompts_dir: &Path) -> String {
    let path = prompts_dir.join(kind.template_file());
    match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "prompt template unavailable, using builtin");
            BUILTIN_TEMPLATE.to_string()
        }
    }
}

/// Render the bounded findings block and prefix it with the template.
pub fn build_prompt(template: &str, findings: &[Finding]) -> String {
    let mut counts = [0usize; 5];
    for f in findings {
        if let Some(i) = SEVERITIES.iter().position(|s| f.severity.as_deref() == Some(*s)) {
            counts[i] += 1;
        }
    }

    // Group by category in first-seen order.
    let mut categories: Vec<(&str, Vec<&Finding>)> = Vec::new();
    for f in findings {
        let cat = f.category.as_deref().unwrap_or("Other");
        match categories.iter_mut().find(|(c, _)| *c == cat) {
            Some((_, group)) => group.push(f),
            None => categories.push((cat, vec![f])),
        }
    }

    let mut lines = Vec::new();
    for (cat, mut group) in categories {
        lines.push(format!("\nCategory: {}", cat));
        group.sort_by_key(|f| severity_rank(f.severity.as_deref()));
        for f in group.iter().take(TOP_PER_CATEGORY) {
            lines.push(format!(
                "  - {}: {} ({}:{})",
                f.severity.as_deref().unwrap_or("Unknown"),
                f.description,
                f.resource_type,
                f.resource_id
            ));
        }
        if group.len() > TOP_PER_CATEGORY {
            lines.push(format!(
                "  - ... and {} more {} findings",
                group.len() - TOP_PER_CATEGORY,
                cat
            ));
        }
    }

    format!(
        "{template}\n\n<findings>\n# Compliance Findings Summary\n\n\
         Total findings: {total}\n\
         - Critical: {}\n- High: {}\n- Medium: {}\n- Low: {}\n- Informational: {}\n\n\
         ## Findings by Category:\n{body}\n</findings>",
        counts[0],
        counts[1],
        counts[2],
        counts[3],
        counts[4],
        template = template,
        total = findings.len(),
        body = lines.join("\n"),
    )
}
