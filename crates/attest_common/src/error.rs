//! Error taxonomy.
//!
//! Mapping/report generation is fail-fast per malformed record; the
//! narrative path is fail-soft end to end. Audit persistence failures are
//! logged and swallowed, never surfaced.

use thiserror::Error;

/// A record in one of the input sets could not be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MapperError {
    #[error("evidence {evidence_id}: unparseable last_updated {raw:?}")]
    MalformedDate { evidence_id: String, raw: String },

    #[error("{record}: missing required field {field}")]
    MissingField { record: String, field: String },
}

/// The model endpoint could not produce a response, after retries.
#[derive(Debug, Clone, Error)]
pub enum InvocationError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("model returned empty response")]
    EmptyResponse,
}

/// The call auditor could not persist an exchange.
#[derive(Debug, Error)]
pub enum AuditWriteError {
    #[error("audit write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
