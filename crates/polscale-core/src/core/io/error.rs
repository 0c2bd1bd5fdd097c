use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the polarizability, monomer/dimer and fragment tables.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Input file not found: '{}'", path.display())]
    FileNotFound { path: PathBuf },

    #[error("File I/O error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Duplicate {kind} '{key}' in '{}' (line {line})", path.display())]
    DuplicateKey {
        path: PathBuf,
        line: usize,
        kind: &'static str,
        key: String,
    },

    #[error("Unresolved reference in '{}' (line {line}): {message}", path.display())]
    Reference {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Malformed line {line} in '{}': {reason}", path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

pub(crate) fn read_table(path: &std::path::Path) -> Result<String, TableError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TableError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            TableError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}
