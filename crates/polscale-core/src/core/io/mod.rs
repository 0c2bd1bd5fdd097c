//! Readers for the plain-text input tables, per-fragment structure files and the XML
//! force-field document.
//!
//! The three configuration tables share one lexical convention: whitespace-separated
//! tokens, `#` comments and blank lines ignored. Each reader validates uniqueness and
//! cross-table references as it goes and fails on the first offending line.

pub mod error;
pub mod fragments;
pub(crate) mod lines;
pub mod monomers;
pub mod polarizability;
pub mod structure;
pub mod xml;
