//! Reader for the fragment-membership table.
//!
//! Each row names a fragment (matching a declared monomer) followed by the atom classes
//! of the force field that belong to it:
//!
//! ```text
//! c2c1im   NA CR CW C1 C2E CE
//! dca      N3A CZA NZA
//! ```

use super::error::{TableError, read_table};
use super::lines::token_lines;
use crate::core::models::fragment::{FragmentEntry, FragmentTable};
use crate::core::models::monomer::{MonomerTable, normalize_name};
use std::path::Path;
use tracing::debug;

pub fn load(path: &Path, monomers: &MonomerTable) -> Result<FragmentTable, TableError> {
    let content = read_table(path)?;
    parse(&content, path, monomers)
}

pub fn parse(
    content: &str,
    source: &Path,
    monomers: &MonomerTable,
) -> Result<FragmentTable, TableError> {
    let mut table = FragmentTable::new(source);

    for line in token_lines(content) {
        let name = normalize_name(line.tokens[0]);

        if table.contains(&name) {
            return Err(TableError::DuplicateKey {
                path: source.to_path_buf(),
                line: line.number,
                kind: "fragment",
                key: name,
            });
        }

        let raw_labels = &line.tokens[1..];
        if raw_labels.is_empty() {
            return Err(TableError::MalformedLine {
                path: source.to_path_buf(),
                line: line.number,
                reason: format!("fragment '{}' lists no atom labels", name),
            });
        }
        if let Some(numeric) = raw_labels
            .iter()
            .find(|l| l.parse::<f64>().is_ok_and(f64::is_finite))
        {
            return Err(TableError::MalformedLine {
                path: source.to_path_buf(),
                line: line.number,
                reason: format!(
                    "atom label '{}' of fragment '{}' is numeric; labels must be identifiers",
                    numeric, name
                ),
            });
        }

        if !monomers.contains(&name) {
            return Err(TableError::Reference {
                path: source.to_path_buf(),
                line: line.number,
                message: format!(
                    "fragment '{}' has no matching monomer in '{}'",
                    name,
                    monomers.source().display()
                ),
            });
        }

        let mut labels: Vec<String> = Vec::with_capacity(raw_labels.len());
        for &label in raw_labels {
            if labels.iter().any(|l| l == label) {
                debug!(fragment = %name, label, "Ignoring repeated atom label.");
                continue;
            }
            labels.push(label.to_string());
        }

        table.push(FragmentEntry {
            name,
            labels,
            line: line.number,
        });
    }

    debug!(
        count = table.entries().len(),
        "Loaded fragment table from {:?}.", source
    );
    Ok(table)
}
