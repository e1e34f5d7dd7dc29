//! OCR engines for pages without a text layer.
//!
//! Two engines implement [`OcrEngine`]:
//! - [`TesseractEngine`]: the `tesseract` command-line binary
//! - [`VisionOcrEngine`]: the configured vision-capable LLM
//!
//! [`ocr_pages`] runs an engine over rendered pages in order and joins the
//! results, each page preceded by `\n--- Page N ---\n`.

use crate::config::{OcrConfig, OcrEngineKind};
use crate::error::DocQaError;
use crate::pipeline::encode::{encode_page, png_bytes};
use crate::progress::ProgressCallback;
use crate::prompts::OCR_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info};

/// Install locations probed when no tesseract command is configured.
pub const TESSERACT_CANDIDATES: &[&str] = &["/usr/bin/tesseract", "/app/.apt/usr/bin/tesseract"];

/// Errors from OCR engines.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine not available: {0}")]
    EngineNotAvailable(String),

    #[error("page {page}: {detail}")]
    PageFailed { page: usize, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(String),
}

impl From<OcrError> for DocQaError {
    fn from(e: OcrError) -> Self {
        DocQaError::OcrFailed {
            detail: e.to_string(),
        }
    }
}

/// Reads the text on one rendered page.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &'static str;

    /// Recognise the text on page `page_num` (1-based).
    async fn recognise(&self, page_num: usize, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Tesseract via its command-line binary.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: PathBuf,
    language: String,
}

impl TesseractEngine {
    pub fn new(command: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    /// Engine using the configured command, or the first installed candidate.
    pub fn from_config(config: &OcrConfig) -> Self {
        let command = resolve_tesseract_command(config.tesseract_cmd.as_deref());
        debug!("Using tesseract at {}", command.display());
        Self::new(command, config.language.clone())
    }

    pub fn command(&self) -> &Path {
        &self.command
    }
}

/// Pick the tesseract binary: configured, else a known install path, else `PATH`.
pub fn resolve_tesseract_command(configured: Option<&Path>) -> PathBuf {
    let candidates: Vec<&Path> = TESSERACT_CANDIDATES.iter().map(Path::new).collect();
    resolve_from(configured, &candidates)
}

fn resolve_from(configured: Option<&Path>, candidates: &[&Path]) -> PathBuf {
    if let Some(cmd) = configured {
        return cmd.to_path_buf();
    }
    candidates
        .iter()
        .find(|p| p.is_file())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("tesseract"))
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognise(&self, page_num: usize, image: &DynamicImage) -> Result<String, OcrError> {
        let png = png_bytes(image).map_err(|e| OcrError::Image(e.to_string()))?;
        let dir = TempDir::new()?;
        let image_path = dir.path().join(format!("page-{page_num}.png"));
        tokio::fs::write(&image_path, &png).await?;

        let output = tokio::process::Command::new(&self.command)
            .arg(&image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => Err(OcrError::PageFailed {
                page: page_num,
                detail: format!(
                    "tesseract failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::EngineNotAvailable(format!(
                    "'{}' not found (install tesseract-ocr or set --tesseract-cmd)",
                    self.command.display()
                )))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

/// OCR by asking a vision-capable model to transcribe each page.
pub struct VisionOcrEngine {
    provider: Arc<dyn LLMProvider>,
    max_tokens: usize,
}

impl VisionOcrEngine {
    pub fn new(provider: Arc<dyn LLMProvider>, max_tokens: usize) -> Self {
        Self {
            provider,
            max_tokens,
        }
    }
}

#[async_trait]
impl OcrEngine for VisionOcrEngine {
    fn name(&self) -> &'static str {
        "vision"
    }

    async fn recognise(&self, page_num: usize, image: &DynamicImage) -> Result<String, OcrError> {
        let image_data = encode_page(image).map_err(|e| OcrError::Image(e.to_string()))?;
        let messages = vec![
            ChatMessage::system(OCR_PROMPT),
            ChatMessage::user_with_images("", vec![image_data]),
        ];
        let options = CompletionOptions {
            temperature: Some(0.0),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| OcrError::PageFailed {
                page: page_num,
                detail: e.to_string(),
            })?;
        Ok(response.content)
    }
}

/// Build the engine selected by `config`.
///
/// The vision engine needs a provider; without one this is a configuration
/// error.
pub fn engine_for(
    config: &OcrConfig,
    provider: Option<Arc<dyn LLMProvider>>,
    max_tokens: usize,
) -> Result<Box<dyn OcrEngine>, DocQaError> {
    match config.engine {
        OcrEngineKind::Tesseract => Ok(Box::new(TesseractEngine::from_config(config))),
        OcrEngineKind::Vision => {
            let provider = provider.ok_or_else(|| {
                DocQaError::InvalidConfig("vision OCR requires an LLM provider".to_string())
            })?;
            Ok(Box::new(VisionOcrEngine::new(provider, max_tokens)))
        }
    }
}

/// OCR output for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrText {
    /// Page texts in order, each preceded by its page marker.
    pub text: String,
    /// `true` once any page produced non-blank text. The markers alone do
    /// not count.
    pub recognised_any: bool,
}

impl OcrText {
    /// Append the text recognised on `page_num` (1-based).
    pub fn push_page(&mut self, page_num: usize, page_text: &str) {
        self.text.push_str(&page_marker(page_num));
        self.text.push_str(page_text);
        self.recognised_any |= !page_text.trim().is_empty();
    }

    pub fn is_empty(&self) -> bool {
        !self.recognised_any
    }
}

/// Run `engine` over `pages` in order and join the results with page markers.
///
/// The first page that fails aborts the run.
pub async fn ocr_pages(
    engine: &dyn OcrEngine,
    pages: &[(usize, DynamicImage)],
    progress: Option<&ProgressCallback>,
) -> Result<OcrText, OcrError> {
    let start = Instant::now();
    let total = pages.len();
    let mut text = OcrText::default();

    for (idx, image) in pages {
        let page_num = idx + 1;
        if let Some(cb) = progress {
            cb.on_ocr_page(page_num, total);
        }
        let page_text = engine.recognise(page_num, image).await?;
        debug!("OCR page {}: {} chars", page_num, page_text.len());
        text.push_page(page_num, &page_text);
    }

    info!(
        "{} OCR finished: {} pages in {:?}",
        engine.name(),
        total,
        start.elapsed()
    );
    Ok(text)
}

/// Delimiter placed before each OCR'd page.
pub fn page_marker(page_num: usize) -> String {
    format!("\n--- Page {page_num} ---\n")
}
