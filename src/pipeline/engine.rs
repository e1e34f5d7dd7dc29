//! pdfium binding.
//!
//! Lookup order:
//!
//! 1. `PDFIUM_LIB_PATH`, when set (must point at the library file)
//! 2. the platform library name in the current working directory
//! 3. the system library search path
//!
//! The first location that binds is remembered for the rest of the process.

use crate::error::DocQaError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Environment variable naming an explicit pdfium library file.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

#[derive(Debug, Clone)]
enum BindSource {
    Path(PathBuf),
    System,
}

static RESOLVED: OnceLock<BindSource> = OnceLock::new();

/// Bind to a pdfium library and return a ready [`Pdfium`] instance.
pub fn bind_pdfium() -> Result<Pdfium, DocQaError> {
    if let Some(source) = RESOLVED.get() {
        return bind_from(source)
            .map(Pdfium::new)
            .map_err(|e| DocQaError::PdfiumBindingFailed(e.to_string()));
    }

    let mut attempts = Vec::new();
    for source in candidates() {
        match bind_from(&source) {
            Ok(bindings) => {
                debug!("Bound pdfium via {:?}", source);
                let _ = RESOLVED.set(source);
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => attempts.push(format!("{:?}: {}", source, e)),
        }
    }

    Err(DocQaError::PdfiumBindingFailed(attempts.join("; ")))
}

/// Open `path` with pdfium, mapping password problems to their own errors.
pub fn open_pdf<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, DocQaError> {
    pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                DocQaError::WrongPassword {
                    path: path.to_path_buf(),
                }
            } else {
                DocQaError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            }
        } else {
            DocQaError::CorruptPdf {
                path: path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

fn candidates() -> Vec<BindSource> {
    let mut out = Vec::with_capacity(3);
    if let Ok(p) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !p.trim().is_empty() {
            out.push(BindSource::Path(PathBuf::from(p)));
        }
    }
    out.push(BindSource::Path(Pdfium::pdfium_platform_library_name_at_path(
        "./",
    )));
    out.push(BindSource::System);
    out
}

fn bind_from(source: &BindSource) -> Result<Box<dyn PdfiumLibraryBindings>, PdfiumError> {
    match source {
        BindSource::Path(p) => Pdfium::bind_to_library(p),
        BindSource::System => Pdfium::bind_to_system_library(),
    }
}
