//! CSV export of answer tables.
//!
//! Each table is written as `<stem>_table_<n>.csv` (1-based `n`). Files are
//! written to a temp file in the target directory and renamed into place, so
//! a reader never sees a half-written CSV.

use crate::error::DocQaError;
use crate::output::Answer;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Write every table in `answer` under `dir`. Returns the written paths.
///
/// Creates `dir` if needed. An answer without tables writes nothing.
pub fn export_tables(answer: &Answer, dir: &Path, stem: &str) -> Result<Vec<PathBuf>, DocQaError> {
    let tables: Vec<_> = answer.tables().collect();
    if tables.is_empty() {
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(dir).map_err(|e| DocQaError::ExportWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let stem = file_stem(stem);
    let mut written = Vec::with_capacity(tables.len());
    for (i, table) in tables.iter().enumerate() {
        let path = dir.join(format!("{}_table_{}.csv", stem, i + 1));
        write_atomic(&path, table.to_csv().as_bytes())?;
        written.push(path);
    }

    info!("Exported {} tables to {}", written.len(), dir.display());
    Ok(written)
}

/// Stem for export names: the document name without extension, with
/// characters that are awkward in file names replaced.
pub fn file_stem(name: &str) -> String {
    let base = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "answer".to_string()
    } else {
        cleaned
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), DocQaError> {
    let write_err = |e: std::io::Error| DocQaError::ExportWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::postprocess::split_answer;

    fn answer(raw: &str) -> Answer {
        Answer {
            question: "q".into(),
            raw: raw.into(),
            segments: split_answer(raw),
            input_tokens: 0,
            output_tokens: 0,
            duration_ms: 0,
            retries: 0,
        }
    }

    #[test]
    fn writes_one_file_per_table() {
        let dir = tempfile::tempdir().unwrap();
        let a = answer("```csv\na,b\n1,2\n```\ntext\n```csv\nc\n3\n```");
        let paths = export_tables(&a, dir.path(), "Tender 2024.pdf").unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("Tender_2024_table_1.csv"));
        assert_eq!(std::fs::read_to_string(&paths[0]).unwrap(), "a,b\n1,2\n");
        assert_eq!(std::fs::read_to_string(&paths[1]).unwrap(), "c\n3\n");
    }

    #[test]
    fn no_tables_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let paths = export_tables(&answer("just prose"), &target, "a.pdf").unwrap();
        assert!(paths.is_empty());
        assert!(!target.exists());
    }

    #[test]
    fn stem_falls_back_when_empty() {
        assert_eq!(file_stem(""), "answer");
        assert_eq!(file_stem("report.final.pdf"), "report.final");
    }
}
