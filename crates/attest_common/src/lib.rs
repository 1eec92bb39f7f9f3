//! Attest - evidence-to-control mapping with model-generated narratives.
//!
//! Two halves, composed by the `attestctl` binary:
//!
//! - A deterministic engine that scores evidence records against control
//!   keyword sets, evaluates freshness drift, and assembles a dated,
//!   auditor-facing report ([`matcher`], [`drift`], [`mapping`],
//!   [`report`]).
//! - A fail-soft narrative pipeline that turns report rows into prose via
//!   a hosted model, behind redaction, bounded timeouts, and uniform
//!   retry ([`redaction`], [`prompt`], [`llm_client`], [`retry`],
//!   [`narrative`], [`audit`]).
//!
//! Every run is stateless: the report is recomputed from the two input
//! record sets, and the only persisted artifacts are the report itself
//! and optional call-audit records.

pub mod audit;
pub mod config;
pub mod drift;
pub mod error;
pub mod llm_client;
pub mod mapping;
pub mod matcher;
pub mod narrative;
pub mod prompt;
pub mod redaction;
pub mod report;
pub mod retry;
pub mod types;

pub use config::AttestConfig;
pub use error::{AuditWriteError, InvocationError, MapperError};
pub use types::{
    Control, ControlStatus, ControlSummary, Evidence, NarrativeKind, NarrativeResult, Report,
    ReportRow,
};
