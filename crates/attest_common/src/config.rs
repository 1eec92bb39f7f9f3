//! Configuration.
//!
//! One explicit struct, constructed once at startup and passed by
//! reference to the components that need it. Sources, in order: built-in
//! defaults, an optional TOML file, then `ATTEST_*` environment
//! overrides. Library components never read the environment themselves.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::llm_client::LlmConfig;

/// Full process configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    /// Storage root for audit records. Unset disables auditing.
    #[serde(default)]
    pub audit_root: Option<PathBuf>,

    /// Key prefix for audit records under the root.
    #[serde(default = "default_audit_prefix")]
    pub audit_prefix: String,

    /// Directory holding the narrative prompt templates.
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: PathBuf,
}

fn default_audit_prefix() -> String {
    "llm_logs/".to_string()
}

fn default_prompts_dir() -> PathBuf {
    PathBuf::from("prompts")
}

impl Default for AttestConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            audit_root: None,
            audit_prefix: default_audit_prefix(),
            prompts_dir: default_prompts_dir(),
        }
    }
}

impl AttestConfig {
    /// Parse a TOML config file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Defaults, optionally overlaid with a config file, then with
    /// `ATTEST_*` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::load_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ATTEST_REGION") {
            self.llm.region = v;
        }
        if let Ok(v) = std::env::var("ATTEST_ENDPOINT") {
            self.llm.endpoint = Some(v);
        }
        if let Ok(v) = std::env::var("ATTEST_MODEL_ID") {
            self.llm.model_id = v;
        }
        if let Ok(v) = std::env::var("ATTEST_TEMPERATURE") {
            match v.parse() {
                Ok(t) => self.llm.temperature = t,
                Err(_) => debug!(value = %v, "ignoring unparseable ATTEST_TEMPERATURE"),
            }
        }
        if let Ok(v) = std::env::var("ATTEST_MAX_TOKENS") {
            match v.parse() {
                Ok(t) => self.llm.max_tokens = t,
                Err(_) => debug!(value = %v, "ignoring unparseable ATTEST_MAX_TOKENS"),
            }
        }
        if let Ok(v) = std::env::var("ATTEST_TIMEOUT_SECS") {
            match v.parse() {
                Ok(t) => self.llm.timeout_secs = t,
                Err(_) => debug!(value = %v, "ignoring unparseable ATTEST_TIMEOUT_SECS"),
            }
        }
        if let Ok(v) = std::env::var("ATTEST_REDACT") {
            self.llm.redact = v.to_lowercase() != "false";
        }
        if let Ok(v) = std::env::var("ATTEST_AUDIT_ROOT") {
            self.audit_root = if v.is_empty() { None } else { Some(PathBuf::from(v)) };
        }
        if let Ok(v) = std::env::var("ATTEST_PROMPTS_DIR") {
            self.prompts_dir = PathBuf::from(v);
        }
    }
}
