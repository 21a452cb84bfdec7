//! Configuration types for the ingestion pipeline.
//!
//! All run behaviour is controlled through [`IngestConfig`], built via its
//! [`IngestConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to pass a single value through the pipeline, and the collaborator override
//! fields (`provider`, `generator`, `extractor`) give tests a seam that does
//! not touch the network or a real PDF parser.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! defaults for the rest.

use crate::error::IngestError;
use crate::pipeline::extract::TextExtractor;
use crate::pipeline::generator::ContentGenerator;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one ingestion run.
///
/// Built via [`IngestConfig::builder()`] or using
/// [`IngestConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2course::IngestConfig;
///
/// let config = IngestConfig::builder()
///     .input_dir("slides")
///     .output_path("course.json")
///     .reprocess(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct IngestConfig {
    /// Root directory holding one subdirectory per course module. Default: `input_pdfs`.
    pub input_dir: PathBuf,

    /// Path of the persisted corpus JSON. Default: `data.json`.
    pub output_path: PathBuf,

    /// Discard any existing corpus and reprocess every file. Default: false.
    ///
    /// Without this flag a file is skipped whenever its derived page id is
    /// already present in the loaded corpus — no content hashing, no
    /// modification-time check. A file whose content changed under an
    /// unchanged id is therefore skipped until this flag is passed.
    pub reprocess: bool,

    /// LLM model identifier, e.g. "gemini-2.5-flash".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai").
    /// If None along with `provider`, resolution falls back to the
    /// environment (see [`crate::pipeline::generator::resolve_generator`]).
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed content generator. Takes precedence over every
    /// provider field; the seam tests use to stub generation entirely.
    pub generator: Option<Arc<dyn ContentGenerator>>,

    /// Text extractor override. Default: the pdf-extract based extractor.
    pub extractor: Option<Arc<dyn TextExtractor>>,

    /// Sampling temperature for generation calls. Default: 0.7.
    ///
    /// Explanations benefit from a little variety; quiz JSON stays well
    /// formed at this level in practice, and malformed output is handled by
    /// the fallback policy anyway.
    pub temperature: f32,

    /// Maximum tokens the model may generate per call. Default: 8192.
    ///
    /// A full-deck explanation routinely exceeds 2 000 output tokens.
    /// Setting this too low truncates the explanation mid-sentence.
    pub max_tokens: usize,

    /// Maximum retry attempts on a failed generation call. Default: 3.
    ///
    /// Retries happen inside the generator, before the degradation policy
    /// (raw-text fallback, placeholder quiz) is applied.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// Minimum whitespace-delimited token count an explanation needs before
    /// quiz generation is attempted. Default: 100.
    ///
    /// Below the threshold the page gets an empty `tests` list — content
    /// that thin cannot be quizzed meaningfully.
    pub quiz_token_threshold: usize,

    /// Progress callback fired per file. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input_pdfs"),
            output_path: PathBuf::from("data.json"),
            reprocess: false,
            model: None,
            provider_name: None,
            provider: None,
            generator: None,
            extractor: None,
            temperature: 0.7,
            max_tokens: 8192,
            max_retries: 3,
            retry_backoff_ms: 500,
            quiz_token_threshold: 100,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for IngestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestConfig")
            .field("input_dir", &self.input_dir)
            .field("output_path", &self.output_path)
            .field("reprocess", &self.reprocess)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("generator", &self.generator.as_ref().map(|_| "<dyn ContentGenerator>"))
            .field("extractor", &self.extractor.as_ref().map(|_| "<dyn TextExtractor>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("quiz_token_threshold", &self.quiz_token_threshold)
            .finish()
    }
}

impl IngestConfig {
    /// Create a new builder for `IngestConfig`.
    pub fn builder() -> IngestConfigBuilder {
        IngestConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`IngestConfig`].
#[derive(Debug)]
pub struct IngestConfigBuilder {
    config: IngestConfig,
}

impl IngestConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn reprocess(mut self, v: bool) -> Self {
        self.config.reprocess = v;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn quiz_token_threshold(mut self, n: usize) -> Self {
        self.config.quiz_token_threshold = n;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<IngestConfig, IngestError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(IngestError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.input_dir.as_os_str().is_empty() {
            return Err(IngestError::InvalidConfig(
                "input_dir must not be empty".into(),
            ));
        }
        if c.output_path.as_os_str().is_empty() {
            return Err(IngestError::InvalidConfig(
                "output_path must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
