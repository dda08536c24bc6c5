//! Configuration types for statement extraction.
//!
//! All pipeline behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across requests and to diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::StmtError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Default chunk budget in characters.
pub const DEFAULT_MAX_CHARS_PER_CHUNK: usize = 6_000;

/// Default maximum upload size accepted by the HTTP boundary.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Configuration for one extraction pipeline.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use stmt2json::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .max_chars_per_chunk(4000)
///     .concurrency(2)
///     .model("gpt-4.1-nano")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Maximum characters per chunk (header + body). Default: 6000.
    ///
    /// Statement text under this length goes to the model in a single call;
    /// longer text is split by [`crate::pipeline::chunk::split_text`]. The
    /// budget bounds prompt size per call, not total document size.
    pub max_chars_per_chunk: usize,

    /// Number of concurrent extraction calls for a chunked document. Default: 4.
    ///
    /// Calls are network-bound. Results are still consumed in chunk-submission
    /// order regardless of completion order, so raising this never changes
    /// the output — only the wall-clock time.
    pub concurrency: usize,

    /// LLM model identifier, e.g. "gpt-4.1-nano", "llama-3.3-70b-versatile".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "groq", "ollama").
    /// If None along with `provider`, uses `ProviderFactory::from_env()`.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    ///
    /// This is the injection point for tests and for callers that need
    /// custom middleware (caching, rate-limiting): construct the client once
    /// at startup and pass it here rather than reaching for process globals.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.1.
    ///
    /// Low temperature keeps the model faithful to what is actually in the
    /// statement text — exactly what you want for data extraction.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per chunk. Default: 4096.
    pub max_tokens: usize,

    /// Per-extraction-call timeout in seconds. Default: 60.
    ///
    /// Bounds every outbound call so a cancelled or abandoned request never
    /// leaves an extraction hanging. Retry policy lives in the provider
    /// transport, not here.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Maximum upload size in bytes accepted by the HTTP boundary.
    /// Default: 16 MiB. Checked before the pipeline is invoked.
    pub max_upload_bytes: usize,

    /// Custom system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Custom worked example prepended to the user prompt.
    /// If None, uses the built-in default.
    pub example: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_chars_per_chunk: DEFAULT_MAX_CHARS_PER_CHUNK,
            concurrency: 4,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 4096,
            api_timeout_secs: 60,
            download_timeout_secs: 120,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            system_prompt: None,
            example: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("max_chars_per_chunk", &self.max_chars_per_chunk)
            .field("concurrency", &self.concurrency)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn max_chars_per_chunk(mut self, n: usize) -> Self {
        self.config.max_chars_per_chunk = n;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
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

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.config.example = Some(example.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, StmtError> {
        let c = &self.config;
        if c.max_chars_per_chunk == 0 {
            return Err(StmtError::InvalidConfig(
                "max_chars_per_chunk must be ≥ 1".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(StmtError::InvalidConfig("concurrency must be ≥ 1".into()));
        }
        if c.max_upload_bytes == 0 {
            return Err(StmtError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ExtractionConfig::default();
        assert_eq!(c.max_chars_per_chunk, 6_000);
        assert_eq!(c.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(c.concurrency, 4);
        assert_eq!(c.temperature, 0.1);
    }

    #[test]
    fn builder_rejects_zero_chunk_size() {
        let result = ExtractionConfig::builder().max_chars_per_chunk(0).build();
        assert!(matches!(result, Err(StmtError::InvalidConfig(_))));
    }

    #[test]
    fn builder_clamps_concurrency() {
        let c = ExtractionConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn builder_sets_model_and_prompt() {
        let c = ExtractionConfig::builder()
            .model("gpt-4.1-nano")
            .system_prompt("custom")
            .build()
            .unwrap();
        assert_eq!(c.model.as_deref(), Some("gpt-4.1-nano"));
        assert_eq!(c.system_prompt.as_deref(), Some("custom"));
    }
}
