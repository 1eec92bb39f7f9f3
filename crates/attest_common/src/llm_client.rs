//! Model endpoint client.
//!
//! Provides a narrow seam for invoking a hosted language model over HTTP
//! with bounded timeouts and uniform retry. The request body shape is a
//! closed two-way fork keyed on the model identifier prefix: the
//! `amazon.nova-` family takes a multi-turn message body, everything else
//! a single-string completion body. Extend by adding prefix branches.
//!
//! `FakeModelClient` supports tests without a network.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::InvocationError;
use crate::retry::{self, RetryPolicy};

/// Model endpoint configuration. Read-only after construction; pass by
/// reference to whatever needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub region: String,
    /// Full endpoint base URL. When unset, derived from the region.
    pub endpoint: Option<String>,
    pub model_id: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Read timeout. Kept low so an interactive caller is never stuck
    /// behind a slow model.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// When false, prompts and audit records are sent unscrubbed.
    pub redact: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
            model_id: "amazon.nova-lite-v1:0".to_string(),
            temperature: 0.2,
            max_tokens: 800,
            timeout_secs: 18,
            connect_timeout_secs: 5,
            redact: true,
        }
    }
}

impl LlmConfig {
    /// Endpoint base URL, falling back to the regional model runtime.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region),
        }
    }
}

/// Seam for invoking the model with an already-redacted prompt.
pub trait ModelClient: Send + Sync {
    /// Returns the raw response body text; the narrative normalizer
    /// decides what to make of it.
    fn invoke(&self, prompt: &str) -> Result<String, InvocationError>;
}

/// Blocking HTTP client with retry, modeled on how the hosted runtime
/// exposes `POST /model/{id}/invoke`.
pub struct HttpModelClient {
    config: LlmConfig,
    policy: RetryPolicy,
    client: reqwest::blocking::Client,
}

impl HttpModelClient {
    pub fn new(config: LlmConfig) -> Result<Self, InvocationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| InvocationError::Http(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            config,
            policy: RetryPolicy::default(),
            client,
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Request body for the configured model family.
    fn request_body(&self, prompt: &str) -> serde_json::Value {
        if self.config.model_id.starts_with("amazon.nova-") {
            // Multi-turn message shape.
            serde_json::json!({
                "messages": [
                    {"role": "user", "content": [{"text": prompt}]}
                ],
                "inferenceConfig": {
                    "maxTokens": self.config.max_tokens,
                    "temperature": self.config.temperature,
                    "topP": 0.9
                }
            })
        } else {
            // Single-string completion shape.
            serde_json::json!({
                "prompt": format!("\n\nHuman: {}\n\nAssistant:", prompt),
                "max_tokens_to_sample": self.config.max_tokens,
                "temperature": self.config.temperature,
            })
        }
    }

    fn invoke_once(&self, prompt: &str) -> Result<String, InvocationError> {
        let url = format!("{}/model/{}/invoke", self.config.endpoint_url(), self.config.model_id);
        let response = self
            .client
            .post(&url)
            .header("accept", "application/json")
            .json(&self.request_body(prompt))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    InvocationError::Timeout(self.config.timeout_secs)
                } else {
                    InvocationError::Http(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(InvocationError::Http(format!("HTTP {} from model endpoint", status)));
        }

        response
            .text()
            .map_err(|e| InvocationError::Http(format!("failed to read response body: {}", e)))
    }
}

impl ModelClient for HttpModelClient {
    fn invoke(&self, prompt: &str) -> Result<String, InvocationError> {
        debug!(model_id = %self.config.model_id, prompt_len = prompt.len(), "invoking model");
        retry::run(&self.policy, || self.invoke_once(prompt))
    }
}

/// Scripted client for tests: returns its responses in order, repeating
/// the final one once the script runs out.
pub struct FakeModelClient {
    responses: std::sync::Mutex<Vec<Result<String, InvocationError>>>,
    call_count: std::sync::Mutex<usize>,
    last_prompt: std::sync::Mutex<Option<String>>,
}

impl FakeModelClient {
    pub fn new(responses: Vec<Result<String, InvocationError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            call_count: std::sync::Mutex::new(0),
            last_prompt: std::sync::Mutex::new(None),
        }
    }

    pub fn always(raw: &str) -> Self {
        Self::new(vec![Ok(raw.to_string())])
    }

    pub fn always_error(error: InvocationError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Prompt from the most recent invocation, for boundary assertions.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

impl ModelClient for FakeModelClient {
    fn invoke(&self, prompt: &str) -> Result<String, InvocationError> {
        *self.call_count.lock().unwrap() += 1;
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(InvocationError::EmptyResponse);
        }
        if responses.len() == 1 {
            responses[0].clone()
        } else {
            responses.remove(0)
        }
    }
}
