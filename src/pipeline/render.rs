//! PDF rasterisation for OCR, and metadata inspection.
//!
//! pdfium is not async-safe, so every call here hops onto the blocking pool
//! with `tokio::task::spawn_blocking`.
//!
//! Pages are rendered at the configured OCR DPI, with the longest edge capped
//! at `max_rendered_pixels` so a poster-sized page cannot blow up memory.

use crate::config::OcrConfig;
use crate::error::DocQaError;
use crate::output::DocumentMetadata;
use crate::pipeline::engine::{bind_pdfium, open_pdf};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// PDF user-space units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Rasterise every page of a PDF.
///
/// Returns `(page_index_0based, image)` pairs in page order.
pub async fn render_pages(
    pdf_path: &Path,
    ocr: &OcrConfig,
    password: Option<&str>,
) -> Result<Vec<(usize, DynamicImage)>, DocQaError> {
    let path = pdf_path.to_path_buf();
    let dpi = ocr.dpi;
    let max_pixels = ocr.max_rendered_pixels;
    let password = password.map(str::to_string);

    tokio::task::spawn_blocking(move || {
        render_pages_blocking(&path, dpi, max_pixels, password.as_deref())
    })
    .await
    .map_err(|e| DocQaError::Internal(format!("Render task panicked: {}", e)))?
}

fn render_pages_blocking(
    pdf_path: &Path,
    dpi: u32,
    max_pixels: u32,
    password: Option<&str>,
) -> Result<Vec<(usize, DynamicImage)>, DocQaError> {
    let pdfium = bind_pdfium()?;
    let document = open_pdf(&pdfium, pdf_path, password)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("Rendering {} pages at {} DPI for OCR", total_pages, dpi);

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(dpi as f32 / POINTS_PER_INCH)
        .set_maximum_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            DocQaError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push((idx, image));
    }

    Ok(results)
}

/// Read document metadata without rendering or extracting anything.
pub async fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, DocQaError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| DocQaError::Internal(format!("Metadata task panicked: {}", e)))?
}

fn extract_metadata_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, DocQaError> {
    let pdfium = bind_pdfium()?;
    let document = open_pdf(&pdfium, pdf_path, password)?;

    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata
            .get(tag)
            .map(|t| t.value().trim().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}
