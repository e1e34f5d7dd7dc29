//! Error types for the edgequake-pdfqa library.
//!
//! Two error types reflect two layers:
//!
//! * [`DocQaError`] — everything the session surface can report to a user:
//!   bad input, unreadable PDF, failed extraction, model errors, bad
//!   credentials, missing configuration.
//!
//! * [`crate::pipeline::ocr::OcrError`] — engine-level OCR failures. They are
//!   folded into [`DocQaError::OcrFailed`] at the extraction boundary.
//!
//! None of these errors is fatal to the process. Configuration errors
//! ([`DocQaError::is_configuration_error`]) stop further interaction until the
//! configuration is fixed; all others are shown and the session continues.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdfqa library.
#[derive(Debug, Error)]
pub enum DocQaError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("Error processing PDF '{path}': {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium could not read the text layer of a page.
    #[error("Text extraction failed on page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    /// pdfium-render returned an error while rasterising a page for OCR.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the binary, install it system-wide, or\n\
set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The OCR engine failed while reading page images.
    #[error("OCR Error: {detail}")]
    OcrFailed { detail: String },

    /// Neither the text layer nor OCR produced any text.
    #[error("No text could be extracted from '{file_name}' (text layer empty, OCR found nothing).")]
    NoTextExtracted { file_name: String },

    // ── Session errors ────────────────────────────────────────────────────
    /// A question was asked before any document was loaded.
    #[error("No document loaded. Load a PDF file to get started.")]
    NoDocumentLoaded,

    /// The submitted question is empty or whitespace.
    #[error("Question is empty.")]
    EmptyQuestion,

    /// An action requiring login was attempted while logged out.
    #[error("Not logged in.")]
    NotAuthenticated,

    // ── Auth errors ───────────────────────────────────────────────────────
    /// Username or password did not match the configured credentials.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Login is required but no credentials are configured.
    #[error("Authentication configuration not found in secrets.\nAdd an [auth] table with username and password.")]
    AuthNotConfigured,

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API failed on every attempt.
    #[error("Error querying LLM API after {retries} retries: {message}\nPlease check your API key and try again.")]
    LlmApiError { message: String, retries: u32 },

    /// A single LLM call exceeded the configured timeout.
    #[error("LLM call timed out after {secs}s")]
    ApiTimeout { secs: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The secrets file exists but could not be read.
    #[error("Failed to read secrets file '{path}': {source}")]
    SecretsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The secrets file is not valid TOML for the expected layout.
    #[error("Invalid secrets file '{path}': {detail}")]
    SecretsInvalid { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an exported table file.
    #[error("Failed to write export file '{path}': {source}")]
    ExportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocQaError {
    /// `true` for errors that mean the utility is not set up correctly.
    ///
    /// The interactive surface stops asking questions when it sees one of
    /// these; every other error is shown and the session continues.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DocQaError::ProviderNotConfigured { .. }
                | DocQaError::AuthNotConfigured
                | DocQaError::InvalidConfig(_)
                | DocQaError::SecretsUnreadable { .. }
                | DocQaError::SecretsInvalid { .. }
                | DocQaError::PdfiumBindingFailed(_)
        )
    }
}
