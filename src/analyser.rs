//! Session orchestration: load documents, ask questions, keep history.
//!
//! [`DocumentAnalyser`] owns one [`Session`] and drives the pipeline stages
//! for it. Every operation checks the login gate first.

use crate::auth::AuthState;
use crate::config::{AnalyserConfig, OcrEngineKind, DEFAULT_MODEL, DEFAULT_PROVIDER};
use crate::error::DocQaError;
use crate::output::{DocumentMetadata, Extraction};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::{extract, llm, ocr, render};
use crate::session::{ChatEntry, DocumentSession, Session};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Default OpenAI model when only `OPENAI_API_KEY` is available.
const OPENAI_FALLBACK_MODEL: &str = "gpt-4.1-nano";

/// One user's document Q&A session.
pub struct DocumentAnalyser {
    config: AnalyserConfig,
    session: Session,
    provider: Option<Arc<dyn LLMProvider>>,
}

impl DocumentAnalyser {
    pub fn new(config: AnalyserConfig, auth: AuthState) -> Self {
        Self {
            config,
            session: Session::new(auth),
            provider: None,
        }
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), DocQaError> {
        self.session.login(username, password)
    }

    /// Log out, dropping the loaded document and its history.
    pub fn logout(&mut self) {
        self.session.logout();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.auth().is_authenticated()
    }

    /// Load a PDF from a local path or HTTP/HTTPS URL.
    pub async fn load_path(&mut self, source: &str) -> Result<&DocumentSession, DocQaError> {
        self.session.auth().ensure_authenticated()?;
        let resolved =
            input::resolve_input(source, self.config.download_timeout_secs).await;
        let resolved = self.report(resolved)?;
        self.load_resolved(resolved).await
    }

    /// Load a PDF from an uploaded buffer.
    pub async fn load_bytes(
        &mut self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<&DocumentSession, DocQaError> {
        self.session.auth().ensure_authenticated()?;
        let resolved = input::input_from_bytes(file_name, bytes);
        let resolved = self.report(resolved)?;
        self.load_resolved(resolved).await
    }

    /// Extract a resolved input and make it the current document.
    ///
    /// Re-loading byte-identical content keeps the document and history; any
    /// other file is extracted, whatever its name. A failed load leaves the
    /// previous document in place.
    async fn load_resolved(
        &mut self,
        resolved: ResolvedInput,
    ) -> Result<&DocumentSession, DocQaError> {
        let file_name = resolved.file_name();
        let content_hash = resolved.content_hash();
        let content_hash = self.report(content_hash)?;
        if self.session.is_current(&content_hash) {
            info!("'{}' is already loaded", file_name);
            return self
                .session
                .document()
                .ok_or_else(|| DocQaError::Internal("current document vanished".into()));
        }

        let extraction = self.extract(&resolved, &file_name, content_hash).await;
        let extraction = self.report(extraction)?;

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_extraction_complete(extraction.method, extraction.char_count());
        }
        Ok(self.session.load_document(extraction))
    }

    async fn extract(
        &mut self,
        resolved: &ResolvedInput,
        file_name: &str,
        content_hash: String,
    ) -> Result<Extraction, DocQaError> {
        let start = Instant::now();
        let path = resolved.path();
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_extraction_start(file_name);
        }

        let layer = extract::extract_text_layer(path, self.config.password.as_deref()).await?;
        let page_count = layer.page_count;

        let vision_provider = self.vision_provider();
        let config = &self.config;
        let password = config.password.as_deref();

        let (text, method) = extract::apply_fallback(file_name, layer.text, move || async move {
            let vision_provider = vision_provider.transpose()?;
            let pages = render::render_pages(path, &config.ocr, password).await?;
            if let Some(ref cb) = config.progress_callback {
                cb.on_ocr_fallback(file_name, pages.len());
            }
            let engine = ocr::engine_for(&config.ocr, vision_provider, config.max_tokens)?;
            let text =
                ocr::ocr_pages(engine.as_ref(), &pages, config.progress_callback.as_ref()).await?;
            Ok::<_, DocQaError>(text)
        })
        .await?;

        Ok(Extraction {
            file_name: file_name.to_string(),
            content_hash,
            text,
            method,
            page_count,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Ask a question about the current document and record the answer.
    pub async fn ask(&mut self, question: &str) -> Result<&ChatEntry, DocQaError> {
        self.session.auth().ensure_authenticated()?;
        if self.session.document().is_none() {
            return Err(DocQaError::NoDocumentLoaded);
        }
        if question.trim().is_empty() {
            return Err(DocQaError::EmptyQuestion);
        }

        let provider = self.provider();
        let provider = self.report(provider)?;
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_question_start(question);
        }

        let text = self
            .session
            .document()
            .map(|d| d.text())
            .ok_or(DocQaError::NoDocumentLoaded)?;
        let answer = llm::ask(&provider, text, question, self.session.history(), &self.config).await;
        let answer = self.report(answer)?;

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_answer_complete(answer.raw.len(), answer.tables().count());
        }
        self.session.record(answer)
    }

    pub fn history(&self) -> &[ChatEntry] {
        self.session.history()
    }

    pub fn current_document(&self) -> Option<&DocumentSession> {
        self.session.document()
    }

    /// The first `preview_chars` characters of the current document.
    pub fn preview(&self) -> Option<String> {
        self.session
            .document()
            .map(|d| d.extraction().preview(self.config.preview_chars))
    }

    pub fn clear_history(&mut self) {
        self.session.clear_history();
    }

    /// Provider for vision OCR, when that engine is selected. The result is
    /// only reported if OCR actually runs.
    fn vision_provider(&mut self) -> Option<Result<Arc<dyn LLMProvider>, DocQaError>> {
        match self.config.ocr.engine {
            OcrEngineKind::Vision => Some(self.provider()),
            OcrEngineKind::Tesseract => None,
        }
    }

    /// The model provider, resolved on first use.
    pub fn provider(&mut self) -> Result<Arc<dyn LLMProvider>, DocQaError> {
        if let Some(ref p) = self.provider {
            return Ok(Arc::clone(p));
        }
        let p = resolve_provider(&self.config)?;
        debug!("Resolved LLM provider");
        self.provider = Some(Arc::clone(&p));
        Ok(p)
    }

    fn report<T>(&self, result: Result<T, DocQaError>) -> Result<T, DocQaError> {
        if let (Err(e), Some(cb)) = (&result, &self.config.progress_callback) {
            cb.on_error(&e.to_string());
        }
        result
    }
}

/// Read PDF metadata without a provider or a login.
pub async fn inspect(source: impl AsRef<str>) -> Result<DocumentMetadata, DocQaError> {
    let resolved = input::resolve_input(source.as_ref(), 120).await?;
    render::extract_metadata(resolved.path(), None).await
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, DocQaError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DocQaError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. a pre-built `config.provider`
/// 2. `config.provider_name` with `config.model` (or the default model)
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, when both are set
/// 4. `GEMINI_API_KEY` → gemini
/// 5. `OPENAI_API_KEY` → openai
/// 6. `ProviderFactory::from_env` auto-detection
pub fn resolve_provider(config: &AnalyserConfig) -> Result<Arc<dyn LLMProvider>, DocQaError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        return create_provider(name, config.effective_model());
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if env_is_set("GEMINI_API_KEY") {
        return create_provider(DEFAULT_PROVIDER, config.effective_model());
    }

    if env_is_set("OPENAI_API_KEY") {
        let model = config.model.as_deref().unwrap_or(OPENAI_FALLBACK_MODEL);
        return create_provider("openai", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| DocQaError::ProviderNotConfigured {
            provider: DEFAULT_PROVIDER.to_string(),
            hint: format!(
                "No API key found. Add api_key to the secrets file or set GEMINI_API_KEY \
                 (default model {DEFAULT_MODEL}).\nError: {e}"
            ),
        })?;
    Ok(llm_provider)
}

fn env_is_set(name: &str) -> bool {
    std::env::var(name).map(|v| !v.trim().is_empty()).unwrap_or(false)
}
