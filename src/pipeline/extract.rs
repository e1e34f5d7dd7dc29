//! Text extraction and the OCR fallback policy.
//!
//! The text layer is always tried first. Only when it is empty after
//! trimming does [`apply_fallback`] run OCR; a non-empty text layer is used
//! as-is and OCR is never started.

use crate::error::DocQaError;
use crate::output::ExtractionMethod;
use crate::pipeline::engine::{bind_pdfium, open_pdf};
use crate::pipeline::ocr::OcrText;
use std::future::Future;
use std::path::Path;
use tracing::{debug, info, warn};

/// Text read from a PDF's embedded text layer.
#[derive(Debug, Clone)]
pub struct TextLayer {
    /// Page texts concatenated in page order.
    pub text: String,
    pub page_count: usize,
}

impl TextLayer {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Read the text layer of every page, in page order.
pub async fn extract_text_layer(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<TextLayer, DocQaError> {
    let path = pdf_path.to_path_buf();
    let password = password.map(str::to_string);

    tokio::task::spawn_blocking(move || extract_text_layer_blocking(&path, password.as_deref()))
        .await
        .map_err(|e| DocQaError::Internal(format!("Extraction task panicked: {}", e)))?
}

fn extract_text_layer_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<TextLayer, DocQaError> {
    let pdfium = bind_pdfium()?;
    let document = open_pdf(&pdfium, pdf_path, password)?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    let mut text = String::new();

    for (idx, page) in pages.iter().enumerate() {
        let page_text = page
            .text()
            .map_err(|e| DocQaError::TextExtractionFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?
            .all();
        debug!("Page {}: {} chars in text layer", idx + 1, page_text.len());
        if !text.is_empty() && !page_text.is_empty() {
            text.push('\n');
        }
        text.push_str(&page_text);
    }

    info!(
        "Text layer of {}: {} pages, {} chars",
        pdf_path.display(),
        page_count,
        text.len()
    );
    Ok(TextLayer { text, page_count })
}

/// Choose between the text layer and OCR.
///
/// `ocr` is only awaited when `direct` is empty after trimming. Fails with
/// [`DocQaError::NoTextExtracted`] when no OCR'd page produced any text.
pub async fn apply_fallback<F, Fut>(
    file_name: &str,
    direct: String,
    ocr: F,
) -> Result<(String, ExtractionMethod), DocQaError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<OcrText, DocQaError>>,
{
    if !direct.trim().is_empty() {
        return Ok((direct, ExtractionMethod::TextLayer));
    }

    info!("No text layer in '{}', falling back to OCR", file_name);
    let recognised = ocr().await?;
    if recognised.is_empty() {
        warn!("OCR found no text in '{}'", file_name);
        return Err(DocQaError::NoTextExtracted {
            file_name: file_name.to_string(),
        });
    }
    Ok((recognised.text, ExtractionMethod::Ocr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ocr_output(pages: &[&str]) -> OcrText {
        let mut out = OcrText::default();
        for (i, page) in pages.iter().enumerate() {
            out.push_page(i + 1, page);
        }
        out
    }

    #[tokio::test]
    async fn text_layer_skips_ocr() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let (text, method) = apply_fallback("a.pdf", "Invoice total: 42".into(), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ocr_output(&["ocr"]))
        })
        .await
        .unwrap();
        assert_eq!(text, "Invoice total: 42");
        assert_eq!(method, ExtractionMethod::TextLayer);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn whitespace_text_layer_uses_ocr() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let (text, method) = apply_fallback("scan.pdf", " \n\t ".into(), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ocr_output(&["Scanned words"]))
        })
        .await
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(method, ExtractionMethod::Ocr);
        assert_eq!(text, "\n--- Page 1 ---\nScanned words");
    }

    #[tokio::test]
    async fn empty_everywhere_is_an_error() {
        let err = apply_fallback("blank.pdf", String::new(), || async {
            Ok(ocr_output(&["   ", "\n"]))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, DocQaError::NoTextExtracted { ref file_name } if file_name == "blank.pdf"));
    }

    #[tokio::test]
    async fn ocr_error_propagates() {
        let err = apply_fallback("x.pdf", String::new(), || async {
            Err(DocQaError::OcrFailed {
                detail: "engine missing".into(),
            })
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "OCR Error: engine missing");
    }

    #[test]
    fn text_layer_emptiness_ignores_whitespace() {
        let layer = TextLayer {
            text: "\n\n ".into(),
            page_count: 2,
        };
        assert!(layer.is_empty());
    }
}
