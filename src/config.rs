//! Configuration types for document analysis.
//!
//! All analyser behaviour is controlled through [`AnalyserConfig`], built via
//! its [`AnalyserConfigBuilder`]. OCR knobs live in a nested [`OcrConfig`]
//! because they only matter when a PDF has no text layer.

use crate::error::DocQaError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Provider used when nothing else is configured.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Model used when the provider is named but the model is not.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Upper bound for [`AnalyserConfig::max_retries`].
pub const MAX_RETRIES: u32 = 10;

/// Number of characters shown by the extracted-text preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 2000;

/// Configuration for a [`crate::analyser::DocumentAnalyser`].
///
/// # Example
/// ```rust
/// use edgequake_pdfqa::AnalyserConfig;
///
/// let config = AnalyserConfig::builder()
///     .model("gemini-2.0-flash")
///     .max_retries(1)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalyserConfig {
    /// LLM model identifier, e.g. "gemini-2.0-flash", "gpt-4.1-mini".
    /// If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "anthropic").
    /// If None along with `provider`, the provider is detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for answers. Default: 0.2.
    ///
    /// Answers must stay faithful to the document text; a low temperature
    /// keeps the model from embellishing.
    pub temperature: f32,

    /// Maximum tokens the model may generate per answer. Default: 2048.
    pub max_tokens: usize,

    /// Retry attempts on a failed model call. Default: 2.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-call timeout for the model API in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Custom system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Ask the model to put tabular answers in ```csv blocks. Default: true.
    pub table_hint: bool,

    /// Earlier exchanges on the same document included as context. Default: 0.
    pub history_turns: usize,

    /// Characters shown by the extracted-text preview. Default: 2000.
    pub preview_chars: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// OCR fallback settings.
    pub ocr: OcrConfig,

    /// Optional observer for extraction and answer events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 2048,
            max_retries: 2,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            password: None,
            system_prompt: None,
            table_hint: true,
            history_turns: 0,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            download_timeout_secs: 120,
            ocr: OcrConfig::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalyserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyserConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("table_hint", &self.table_hint)
            .field("history_turns", &self.history_turns)
            .field("preview_chars", &self.preview_chars)
            .field("ocr", &self.ocr)
            .finish()
    }
}

impl AnalyserConfig {
    /// Create a new builder for `AnalyserConfig`.
    pub fn builder() -> AnalyserConfigBuilder {
        AnalyserConfigBuilder {
            config: Self::default(),
        }
    }

    /// The model that will be requested from the provider.
    pub fn effective_model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`AnalyserConfig`].
#[derive(Debug)]
pub struct AnalyserConfigBuilder {
    config: AnalyserConfig,
}

impl AnalyserConfigBuilder {
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

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn table_hint(mut self, v: bool) -> Self {
        self.config.table_hint = v;
        self
    }

    pub fn history_turns(mut self, n: usize) -> Self {
        self.config.history_turns = n;
        self
    }

    pub fn preview_chars(mut self, n: usize) -> Self {
        self.config.preview_chars = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn ocr(mut self, ocr: OcrConfig) -> Self {
        self.config.ocr = ocr;
        self
    }

    pub fn ocr_engine(mut self, engine: OcrEngineKind) -> Self {
        self.config.ocr.engine = engine;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr.language = lang.into();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.ocr.tesseract_cmd = Some(cmd.into());
        self
    }

    pub fn ocr_dpi(mut self, dpi: u32) -> Self {
        self.config.ocr.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyserConfig, DocQaError> {
        let c = &self.config;
        if c.ocr.dpi < 72 || c.ocr.dpi > 400 {
            return Err(DocQaError::InvalidConfig(format!(
                "OCR DPI must be 72–400, got {}",
                c.ocr.dpi
            )));
        }
        if c.max_tokens == 0 {
            return Err(DocQaError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.max_retries > MAX_RETRIES {
            return Err(DocQaError::InvalidConfig(format!(
                "max_retries must be ≤ {}, got {}",
                MAX_RETRIES, c.max_retries
            )));
        }
        if c.ocr.language.trim().is_empty() {
            return Err(DocQaError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if matches!(c.model.as_deref(), Some(m) if m.trim().is_empty()) {
            return Err(DocQaError::InvalidConfig("model must not be empty".into()));
        }
        Ok(self.config)
    }
}

// ── OCR ──────────────────────────────────────────────────────────────────

/// Which engine reads page images when the text layer is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngineKind {
    /// Tesseract via its command-line binary (default).
    #[default]
    Tesseract,
    /// The configured vision-capable LLM transcribes each page image.
    Vision,
}

/// Settings for the OCR fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Engine used for OCR. Default: [`OcrEngineKind::Tesseract`].
    pub engine: OcrEngineKind,

    /// Tesseract language code(s), e.g. "eng" or "eng+deu". Default: "eng".
    pub language: String,

    /// Explicit tesseract binary. If None, well-known install locations are
    /// probed before falling back to `tesseract` on `PATH`.
    pub tesseract_cmd: Option<PathBuf>,

    /// Rendering DPI used when rasterising pages. Range: 72–400. Default: 300.
    ///
    /// Tesseract is tuned for ~300 DPI scans; lower values lose small print.
    pub dpi: u32,

    /// Cap on the longest rendered edge in pixels. Default: 3000.
    pub max_rendered_pixels: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::default(),
            language: "eng".to_string(),
            tesseract_cmd: None,
            dpi: 300,
            max_rendered_pixels: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = AnalyserConfig::default();
        assert_eq!(c.effective_model(), "gemini-2.0-flash");
        assert_eq!(c.preview_chars, 2000);
        assert!(c.table_hint);
        assert_eq!(c.history_turns, 0);
        assert_eq!(c.ocr.engine, OcrEngineKind::Tesseract);
        assert_eq!(c.ocr.language, "eng");
        assert_eq!(c.ocr.dpi, 300);
    }

    #[test]
    fn builder_clamps_dpi_and_temperature() {
        let c = AnalyserConfig::builder()
            .ocr_dpi(1000)
            .temperature(5.0)
            .build()
            .unwrap();
        assert_eq!(c.ocr.dpi, 400);
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_empty_language() {
        let err = AnalyserConfig::builder().ocr_language("  ").build().unwrap_err();
        assert!(matches!(err, DocQaError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_max_tokens() {
        assert!(AnalyserConfig::builder().max_tokens(0).build().is_err());
    }

    #[test]
    fn builder_caps_max_retries() {
        assert!(AnalyserConfig::builder().max_retries(MAX_RETRIES).build().is_ok());
        let err = AnalyserConfig::builder()
            .max_retries(u32::MAX)
            .build()
            .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn debug_redacts_password() {
        let c = AnalyserConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn engine_kind_deserialises_lowercase() {
        #[derive(Deserialize)]
        struct Wrap {
            engine: OcrEngineKind,
        }
        let w: Wrap = toml::from_str("engine = \"vision\"").unwrap();
        assert_eq!(w.engine, OcrEngineKind::Vision);
    }
}
