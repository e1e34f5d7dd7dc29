//! Pipeline stages for document question answering.
//!
//! Each submodule implements one step; [`crate::analyser`] wires them
//! together around a [`crate::session::Session`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──┬──────────────────────────────▶ text
//!                     └─(empty)─▶ render ──▶ ocr ──────▶ text
//!
//! text + question ──▶ llm ──▶ postprocess ──▶ Answer
//! ```
//!
//! 1. [`input`]   — canonicalise a path, URL or byte buffer to a local PDF
//! 2. [`engine`]  — bind the pdfium shared library
//! 3. [`extract`] — read the text layer and apply the OCR fallback policy
//! 4. [`render`]  — rasterise every page when OCR is needed; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 5. [`ocr`]     — recognise page images (tesseract or a vision model)
//! 6. [`encode`]  — PNG + base64 for vision-model OCR
//! 7. [`llm`]     — question prompt + model call with retry/backoff
//! 8. [`postprocess`] — split the answer into prose and table segments

pub mod encode;
pub mod engine;
pub mod extract;
pub mod input;
pub mod llm;
pub mod ocr;
pub mod postprocess;
pub mod render;
