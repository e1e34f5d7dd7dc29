//! Progress-callback trait for extraction and answer events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalyserConfigBuilder::progress_callback`] to receive
//! events while a document is extracted (including the OCR fallback, which
//! can take a while on long scans) and while a question is answered.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdfqa::{AnalysisProgressCallback, AnalyserConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct OcrPageCounter {
//!     pages: Arc<AtomicUsize>,
//! }
//!
//! impl AnalysisProgressCallback for OcrPageCounter {
//!     fn on_ocr_page(&self, page_num: usize, total_pages: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("OCR page {}/{}", page_num, total_pages);
//!     }
//! }
//!
//! let counter = Arc::new(OcrPageCounter {
//!     pages: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = AnalyserConfig::builder()
//!     .progress_callback(counter as Arc<dyn AnalysisProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ExtractionMethod;
use std::sync::Arc;

/// Called by the analyser as it extracts documents and answers questions.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called once before the text layer is read.
    fn on_extraction_start(&self, file_name: &str) {
        let _ = file_name;
    }

    /// Called when the text layer came back empty and OCR is about to run.
    fn on_ocr_fallback(&self, file_name: &str, total_pages: usize) {
        let _ = (file_name, total_pages);
    }

    /// Called before each page is sent to the OCR engine.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages being recognised
    fn on_ocr_page(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a document has been loaded successfully.
    ///
    /// # Arguments
    /// * `method`     — whether the text came from the text layer or OCR
    /// * `char_count` — number of characters extracted
    fn on_extraction_complete(&self, method: ExtractionMethod, char_count: usize) {
        let _ = (method, char_count);
    }

    /// Called just before the question is sent to the model.
    fn on_question_start(&self, question: &str) {
        let _ = question;
    }

    /// Called when the model answered.
    ///
    /// # Arguments
    /// * `answer_len`  — byte length of the raw answer
    /// * `table_count` — number of tables parsed out of the answer
    fn on_answer_complete(&self, answer_len: usize, table_count: usize) {
        let _ = (answer_len, table_count);
    }

    /// Called when extraction or answering failed.
    fn on_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalyserConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        fallbacks: AtomicUsize,
        ocr_pages: AtomicUsize,
        chars: AtomicUsize,
        tables: AtomicUsize,
    }

    impl AnalysisProgressCallback for TrackingCallback {
        fn on_ocr_fallback(&self, _file_name: &str, _total_pages: usize) {
            self.fallbacks.fetch_add(1, Ordering::SeqCst);
        }

        fn on_ocr_page(&self, _page_num: usize, _total_pages: usize) {
            self.ocr_pages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_extraction_complete(&self, _method: ExtractionMethod, char_count: usize) {
            self.chars.store(char_count, Ordering::SeqCst);
        }

        fn on_answer_complete(&self, _answer_len: usize, table_count: usize) {
            self.tables.store(table_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start("a.pdf");
        cb.on_ocr_fallback("a.pdf", 3);
        cb.on_ocr_page(1, 3);
        cb.on_extraction_complete(ExtractionMethod::Ocr, 10);
        cb.on_question_start("what?");
        cb.on_answer_complete(42, 1);
        cb.on_error("boom");
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_ocr_fallback("scan.pdf", 2);
        tracker.on_ocr_page(1, 2);
        tracker.on_ocr_page(2, 2);
        tracker.on_extraction_complete(ExtractionMethod::Ocr, 1234);
        tracker.on_answer_complete(300, 2);

        assert_eq!(tracker.fallbacks.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.ocr_pages.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.chars.load(Ordering::SeqCst), 1234);
        assert_eq!(tracker.tables.load(Ordering::SeqCst), 2);
    }
}
