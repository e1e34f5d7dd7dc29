//! Input resolution: turn a path, URL or uploaded bytes into a local PDF.
//!
//! pdfium opens documents from the file system, so downloads and uploaded
//! buffers are written into a `TempDir` that lives as long as the
//! [`ResolvedInput`]. The `%PDF` magic bytes are checked before anything is
//! handed to pdfium so callers get [`DocQaError::NotAPdf`] instead of an
//! opaque parser error.

use crate::error::DocQaError;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A PDF on disk, plus the temp directory backing it when there is one.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was downloaded or uploaded; the `TempDir` is removed on drop.
    Temporary { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Temporary { path, .. } => path,
        }
    }

    /// File name shown to the user.
    pub fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string())
    }

    /// SHA-256 of the file contents. Two inputs are the same document only
    /// when their hashes match; the file name plays no part.
    pub fn content_hash(&self) -> Result<String, DocQaError> {
        let path = self.path();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => DocQaError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => DocQaError::FileNotFound {
                path: path.to_path_buf(),
            },
        })?;
        Ok(content_hash(&bytes))
    }
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a user-supplied path or HTTP/HTTPS URL to a local PDF.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, DocQaError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DocQaError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(trimmed) {
        download_url(trimmed, timeout_secs).await
    } else if trimmed.contains("://") {
        Err(DocQaError::InvalidInput {
            input: trimmed.to_string(),
        })
    } else {
        resolve_local(trimmed)
    }
}

/// Write an uploaded buffer to a temp file named `file_name`.
///
/// Only the final path component of `file_name` is used.
pub fn input_from_bytes(file_name: &str, bytes: &[u8]) -> Result<ResolvedInput, DocQaError> {
    let name = sanitise_file_name(file_name);
    check_magic(bytes, Path::new(&name))?;

    let temp_dir = TempDir::new().map_err(|e| DocQaError::Internal(e.to_string()))?;
    let path = temp_dir.path().join(&name);
    std::fs::write(&path, bytes)
        .map_err(|e| DocQaError::Internal(format!("Failed to write temp file: {}", e)))?;

    debug!("Staged {} bytes as {}", bytes.len(), path.display());
    Ok(ResolvedInput::Temporary {
        path,
        _temp_dir: temp_dir,
    })
}

fn resolve_local(path_str: &str) -> Result<ResolvedInput, DocQaError> {
    let path = PathBuf::from(path_str);

    if !path.is_file() {
        return Err(DocQaError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            let read = f.read(&mut magic).unwrap_or(0);
            check_magic(&magic[..read], &path)?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DocQaError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(DocQaError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, DocQaError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DocQaError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_send_err = |e: reqwest::Error| {
        if e.is_timeout() {
            DocQaError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            DocQaError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_send_err)?;

    if !response.status().is_success() {
        return Err(DocQaError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_send_err)?;
    let resolved = input_from_bytes(&filename_from_url(url), &bytes)?;

    info!("Downloaded to: {}", resolved.path().display());
    Ok(resolved)
}

fn check_magic(bytes: &[u8], path: &Path) -> Result<(), DocQaError> {
    if bytes.starts_with(PDF_MAGIC) {
        return Ok(());
    }
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    Err(DocQaError::NotAPdf {
        path: path.to_path_buf(),
        magic,
    })
}

/// Last path segment of `url` if it looks like a file name.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }
    "downloaded.pdf".to_string()
}

fn sanitise_file_name(name: &str) -> String {
    Path::new(name.trim())
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "document.pdf".to_string())
}
