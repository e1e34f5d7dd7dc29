//! # edgequake-pdfqa
//!
//! Ask questions about PDF documents with an LLM.
//!
//! A document is loaded once: its embedded text layer is read with pdfium,
//! and when that comes back empty (a scan) every page is rasterised and run
//! through OCR. Questions are then answered by a hosted model using the
//! extracted text as context. Answers that contain fenced ```` ```csv ````
//! blocks are split into prose and tables, and tables can be exported as CSV.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file, URL download, or uploaded bytes
//!  ├─ 2. Extract  text layer via pdfium (spawn_blocking)
//!  ├─ 3. OCR      only if the text layer is empty: render + tesseract/vision
//!  ├─ 4. Ask      document text + question → model, with retry
//!  └─ 5. Split    prose and csv tables, appended to the session history
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfqa::{AnalyserConfig, AuthState, DocumentAnalyser};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / …
//!     let config = AnalyserConfig::default();
//!     let mut analyser = DocumentAnalyser::new(config, AuthState::open());
//!
//!     let doc = analyser.load_path("tender.pdf").await?;
//!     eprintln!("{} via {}", doc.file_name(), doc.method());
//!
//!     let entry = analyser.ask("What is the submission deadline?").await?;
//!     println!("{}", entry.answer.to_markdown());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfqa` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## External tools
//!
//! - pdfium shared library: next to the binary, on the system library path,
//!   or named by `PDFIUM_LIB_PATH`
//! - `tesseract` for the default OCR engine (only needed for scanned PDFs)

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyser;
pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod secrets;
pub mod session;
pub mod table;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyser::{inspect, resolve_provider, DocumentAnalyser};
pub use auth::{AuthState, Credentials};
pub use config::{AnalyserConfig, AnalyserConfigBuilder, OcrConfig, OcrEngineKind};
pub use error::DocQaError;
pub use export::export_tables;
pub use output::{Answer, AnswerSegment, DocumentMetadata, Extraction, ExtractionMethod};
pub use pipeline::ocr::{OcrEngine, OcrError, OcrText};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use secrets::Secrets;
pub use session::{ChatEntry, DocumentSession, Session};
pub use table::Table;
