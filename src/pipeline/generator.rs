//! LLM interaction: build chat messages and call the provider.
//!
//! This module is intentionally thin — prompt text lives in
//! [`crate::prompts`] and response validation in
//! [`crate::pipeline::quiz`], so retry and provider plumbing can change
//! without touching either.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 503 errors from LLM APIs are transient. Exponential backoff
//! (`retry_backoff_ms * 2^attempt`) gives a wait sequence of
//! 500 ms → 1 s → 2 s with the defaults, totalling < 4 s of back-off per
//! call. Only after every retry fails does the caller's degradation policy
//! (raw-text fallback, placeholder quiz) kick in.

use crate::config::IngestConfig;
use crate::error::{GenerateError, IngestError};
use crate::prompts::{ELABORATE_SYSTEM_PROMPT, QUIZ_SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Environment variable holding the API credential the default provider
/// resolution reads.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Model used when the caller specifies none.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// The content-generation collaborator.
///
/// Both methods return the model's raw text. `quiz` output is parsed and
/// validated by [`crate::pipeline::quiz::parse_quiz_response`]; keeping the
/// parse step out of the trait lets tests feed arbitrary (including
/// malformed) responses through the real fallback policy.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Turn raw slide text into a textbook-style explanation.
    async fn elaborate(&self, raw_text: &str) -> Result<String, GenerateError>;

    /// Produce 1–3 multiple-choice questions for an explanation, as raw
    /// model text expected to contain a JSON array.
    async fn quiz(&self, content: &str) -> Result<String, GenerateError>;
}

/// Production generator backed by an [`LLMProvider`].
pub struct LlmGenerator {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl LlmGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &IngestConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }

    /// One chat completion with retry.
    ///
    /// `label` names the call in logs ("elaborate" / "quiz").
    async fn chat(&self, label: &str, system: &str, user: &str) -> Result<String, GenerateError> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let options = CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        let mut last_err: Option<String> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "{}: retry {}/{} after {}ms",
                    label, attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match self.provider.chat(&messages, Some(&options)).await {
                Ok(response) => {
                    debug!(
                        "{}: {} input tokens, {} output tokens",
                        label, response.prompt_tokens, response.completion_tokens
                    );
                    return Ok(response.content);
                }
                Err(e) => {
                    let err_msg = format!("{}", e);
                    warn!("{}: attempt {} failed: {}", label, attempt + 1, err_msg);
                    last_err = Some(err_msg);
                }
            }
        }

        Err(GenerateError::new(
            last_err.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

#[async_trait]
impl ContentGenerator for LlmGenerator {
    async fn elaborate(&self, raw_text: &str) -> Result<String, GenerateError> {
        self.chat("elaborate", ELABORATE_SYSTEM_PROMPT, raw_text).await
    }

    async fn quiz(&self, content: &str) -> Result<String, GenerateError> {
        self.chat("quiz", QUIZ_SYSTEM_PROMPT, content).await
    }
}

/// Resolve the content generator, from most-specific to least-specific.
///
/// The fallback chain lets library users and CLI users each set exactly as
/// much or as little as they need:
///
/// 1. **Pre-built generator** (`config.generator`) — the caller supplied the
///    collaborator entirely; used as-is. This is the test seam.
///
/// 2. **Pre-built provider** (`config.provider`) — the caller constructed
///    and configured the LLM provider; wrapped in [`LlmGenerator`].
///
/// 3. **Named provider + model** (`config.provider_name`) — resolved through
///    [`ProviderFactory::create_llm_provider`], which reads the matching API
///    key from the environment.
///
/// 4. **`GEMINI_API_KEY` present** — the single-credential setup this tool
///    documents; a gemini provider with the configured or default model.
///
/// 5. **Full auto-detection** (`ProviderFactory::from_env`) — the factory
///    scans all known API key variables and picks the first available
///    provider.
///
/// No usable backend anywhere yields
/// [`IngestError::ProviderNotConfigured`], returned to the caller — the
/// library never exits the process.
pub fn resolve_generator(config: &IngestConfig) -> Result<Arc<dyn ContentGenerator>, IngestError> {
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }

    let provider = resolve_provider(config)?;
    Ok(Arc::new(LlmGenerator::new(provider, config)))
}

fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, IngestError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        IngestError::ProviderNotConfigured {
            hint: format!("Provider '{provider_name}' could not be created: {e}"),
        }
    })
}

fn resolve_provider(config: &IngestConfig) -> Result<Arc<dyn LLMProvider>, IngestError> {
    // 1) User-provided provider takes priority
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    // 3) The documented single-credential setup
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("gemini", model);
        }
    }

    // 4) Scan all known key variables
    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| IngestError::ProviderNotConfigured {
            hint: format!(
                "No LLM provider could be auto-detected from the environment.\n\
                Set GEMINI_API_KEY, or configure a provider explicitly.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
