//! Keyword matcher.
//!
//! Scores an evidence record against a control's keyword set by pure
//! substring containment over the lowercased searchable text. No
//! tokenization or stemming: "access" matches "access-control-log", and a
//! short keyword like "key" also matches "monkey". That over-match is a
//! known heuristic, kept deliberately.

use crate::types::Evidence;

/// Normalize a semicolon-delimited keyword column: lowercase, trim,
/// discard empties. Entry order is preserved; duplicates are dropped so
/// the result behaves as a set.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for part in raw.split(';') {
        let k = part.trim().to_lowercase();
        if !k.is_empty() && !keywords.contains(&k) {
            keywords.push(k);
        }
    }
    keywords
}

/// Searchable text for an evidence record: description and source,
/// concatenated and lowercased.
pub fn searchable_text(evidence: &Evidence) -> String {
    format!("{} {}", evidence.description, evidence.source).to_lowercase()
}

/// Count of keywords occurring anywhere in the searchable text. A score
/// of 0 means the pair produces no mapping; an empty keyword set always
/// scores 0.
pub fn match_score(keywords: &[String], evidence: &Evidence) -> u32 {
    if keywords.is_empty() {
        return 0;
    }
    let text = searchable_text(evidence);
    keywords.iter().filter(|kw| text.contains(kw.as_str())).count() as u32
}
