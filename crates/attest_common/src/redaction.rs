//! Redaction filter.
//!
//! Scrubs PII- and secret-shaped substrings from any text about to leave
//! the trust boundary (model endpoint requests, audit log records).
//!
//! Substitution order is fixed and load-bearing: email before UUID before
//! secret words before PII words. Reordering changes the output for
//! inputs where one pattern's surroundings feed the next, so the table
//! below must stay in this order.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap()
});

static UUID_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[089ab][0-9a-f]{3}-[0-9a-f]{12}\b",
    )
    .unwrap()
});

static SECRET_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(api|client|db|token|secret|key|password|bearer|access[-_ ]?key)\b")
        .unwrap()
});

static PII_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(ssn|sin|passport|driver'?s?\s*license|dob|date of birth)\b").unwrap()
});

pub const REDACTED_EMAIL: &str = "[REDACTED_EMAIL]";
pub const REDACTED_UUID: &str = "[REDACTED_UUID]";
pub const REDACTED_SECRET: &str = "[REDACTED_SECRET]";
pub const REDACTED_PII: &str = "[REDACTED_PII]";

/// Apply the four substitutions in order. Idempotent: the placeholders
/// themselves match none of the patterns.
pub fn scrub_text(s: &str) -> String {
    let s = EMAIL.replace_all(s, REDACTED_EMAIL);
    let s = UUID_LIKE.replace_all(&s, REDACTED_UUID);
    let s = SECRET_WORDS.replace_all(&s, REDACTED_SECRET);
    let s = PII_WORDS.replace_all(&s, REDACTED_PII);
    s.into_owned()
}

/// Serialize any JSON-serializable value, then scrub the serialized text.
pub fn scrub_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let s = serde_json::to_string(value)?;
    Ok(scrub_text(&s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_redacted() {
        assert_eq!(
            scrub_text("contact auditor@example.com please"),
            "contact [REDACTED_EMAIL] please"
        );
    }

    #[test]
    fn uuids_are_redacted() {
        let s = scrub_text("run 3F2504E0-4F89-41D3-9A0C-0305E82C3301 done");
        assert_eq!(s, "run [REDACTED_UUID] done");
    }

    #[test]
    fn secret_indicator_words_are_redacted() {
        assert_eq!(
            scrub_text("rotate the API token and the access-key"),
            "rotate the [REDACTED_SECRET] [REDACTED_SECRET] and the [REDACTED_SECRET]"
        );
    }

    #[test]
    fn pii_indicator_words_are_redacted() {
        assert_eq!(
            scrub_text("holds SSN and driver's license and date of birth"),
            "holds [REDACTED_PII] and [REDACTED_PII] and [REDACTED_PII]"
        );
    }

    #[test]
    fn email_wins_over_secret_words_inside_it() {
        // "api@corp.io" must become one email placeholder, not a secret hit.
        assert_eq!(scrub_text("api@corp.io"), "[REDACTED_EMAIL]");
    }

    #[test]
    fn scrubbing_is_idempotent() {
        let once = scrub_text("mail a@b.co about the db password and ssn");
        assert_eq!(scrub_text(&once), once);
    }

    #[test]
    fn scrub_json_serializes_then_scrubs() {
        let v = serde_json::json!({"note": "password is in the vault", "owner": "x@y.io"});
        let s = scrub_json(&v).unwrap();
        assert!(s.contains("[REDACTED_SECRET]"));
        assert!(s.contains("[REDACTED_EMAIL]"));
        assert!(!s.contains("x@y.io"));
    }

    #[test]
    fn word_boundaries_limit_secret_hits() {
        // "monkey" contains "key" but not on a word boundary.
        assert_eq!(scrub_text("monkey"), "monkey");
    }
}
