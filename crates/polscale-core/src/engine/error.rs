use super::config::ConfigError;
use crate::core::forcefield::document::DocumentError;
use crate::core::forcefield::lj::ForcefieldError;
use crate::core::io::error::TableError;
use crate::core::io::structure::StructureError;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of every failure the scaling pass can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateKey,
    ReferenceError,
    MalformedLine,
    MissingStructureFile,
    MissingReferenceValue,
    DivisionByZero,
    FileNotFound,
    Io,
    Document,
    Config,
    Internal,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Forcefield(#[from] ForcefieldError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(
        "Fragments '{first}' and '{second}' interact but no dimer is declared for them in '{}'",
        source_file.display()
    )]
    MissingDimer {
        first: String,
        second: String,
        source_file: PathBuf,
    },

    #[error(
        "Reference scaling requested but the dimer '{first}' '{second}' in '{}' has no reference factor",
        source_file.display()
    )]
    MissingReferenceValue {
        first: String,
        second: String,
        source_file: PathBuf,
    },

    #[error(
        "Atom '{label}' of fragment '{fragment}' (from '{}') has no polarizability in '{}'",
        structure_file.display(),
        table_file.display()
    )]
    MissingPolarizability {
        fragment: String,
        label: String,
        structure_file: PathBuf,
        table_file: PathBuf,
    },

    #[error("Total polarizability of fragment '{fragment}' is zero; cannot predict a scaling factor")]
    DivisionByZero { fragment: String },

    #[error("No predicted scaling factor for fragments '{first}' and '{second}'")]
    MissingPrediction { first: String, second: String },

    #[error("Unknown fragment '{name}' named in {context}")]
    UnknownFragment { name: String, context: &'static str },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl From<DocumentError> for EngineError {
    fn from(e: DocumentError) -> Self {
        EngineError::Forcefield(ForcefieldError::Document(e))
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Table(e) => match e {
                TableError::FileNotFound { .. } => ErrorKind::FileNotFound,
                TableError::Io { .. } => ErrorKind::Io,
                TableError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
                TableError::Reference { .. } => ErrorKind::ReferenceError,
                TableError::MalformedLine { .. } => ErrorKind::MalformedLine,
            },
            EngineError::Structure(e) => match e {
                StructureError::MissingStructureFile { .. } => ErrorKind::MissingStructureFile,
                StructureError::Io { .. } => ErrorKind::Io,
                StructureError::Parse { .. } => ErrorKind::MalformedLine,
            },
            EngineError::Forcefield(ForcefieldError::Document(e)) => match e {
                DocumentError::FileNotFound { .. } => ErrorKind::FileNotFound,
                DocumentError::Io { .. } => ErrorKind::Io,
                _ => ErrorKind::Document,
            },
            EngineError::Forcefield(_) => ErrorKind::Document,
            EngineError::Config(_) => ErrorKind::Config,
            EngineError::MissingDimer { .. }
            | EngineError::UnknownFragment { .. }
            | EngineError::MissingPolarizability { .. } => ErrorKind::ReferenceError,
            EngineError::MissingReferenceValue { .. } => ErrorKind::MissingReferenceValue,
            EngineError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            EngineError::MissingPrediction { .. } | EngineError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }
}
