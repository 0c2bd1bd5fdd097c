//! Reader for the atomic polarizability table.
//!
//! ```text
//! # type  m/u     q/e    k/(kJ/molA2)  alpha/A3  a_thole
//! CR      0.4000  -1.0   4184.0        1.122     2.6
//! NA      0.4000  -1.0   4184.0        1.094     2.6
//! ```
//!
//! Only the atom-type name (first token) and the polarizability (fifth token) are used.

use super::error::{TableError, read_table};
use super::lines::token_lines;
use crate::core::models::polarizability::{AtomType, PolarizabilityTable};
use std::path::Path;
use tracing::debug;

const ALPHA_COLUMN: usize = 4;

pub fn load(path: &Path) -> Result<PolarizabilityTable, TableError> {
    let content = read_table(path)?;
    parse(&content, path)
}

pub fn parse(content: &str, source: &Path) -> Result<PolarizabilityTable, TableError> {
    let mut table = PolarizabilityTable::new(source);

    for line in token_lines(content) {
        let malformed = |reason: String| TableError::MalformedLine {
            path: source.to_path_buf(),
            line: line.number,
            reason,
        };

        let raw_alpha = line.tokens.get(ALPHA_COLUMN).ok_or_else(|| {
            malformed(format!(
                "expected at least {} fields, found {}",
                ALPHA_COLUMN + 1,
                line.tokens.len()
            ))
        })?;
        let alpha: f64 = raw_alpha
            .parse()
            .map_err(|_| malformed(format!("polarizability '{}' is not a number", raw_alpha)))?;
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(malformed(format!(
                "polarizability must be a non-negative number, found {}",
                raw_alpha
            )));
        }

        let name = line.tokens[0].to_string();
        table
            .insert(AtomType { name, alpha })
            .map_err(|dup| TableError::DuplicateKey {
                path: source.to_path_buf(),
                line: line.number,
                kind: "atom type",
                key: dup.name,
            })?;
    }

    debug!(
        count = table.len(),
        "Loaded polarizability table from {:?}.", source
    );
    Ok(table)
}
