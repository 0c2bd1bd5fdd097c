//! Reader for the monomer/dimer table.
//!
//! ```text
//! MONOMERS
//! # name     q/e    mu/D
//! c2c1im+    1      1.1558
//! dca-      -1      2.7805
//!
//! DIMERS
//! # m1       m2     r_COM/A  k_sapt
//! c2c1im+    dca-   4.2636   0.6122
//! ```
//!
//! Section headers are case-insensitive. The reference factor column is optional.

use super::error::{TableError, read_table};
use super::lines::{TokenLine, token_lines};
use crate::core::models::monomer::{Dimer, DimerTable, Monomer, MonomerTable, normalize_name};
use phf::{Map, phf_map};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Monomers,
    Dimers,
}

static SECTION_HEADERS: Map<&'static str, Section> = phf_map! {
    "monomers" => Section::Monomers,
    "dimers" => Section::Dimers,
};

pub fn load(path: &Path) -> Result<(MonomerTable, DimerTable), TableError> {
    let content = read_table(path)?;
    parse(&content, path)
}

pub fn parse(content: &str, source: &Path) -> Result<(MonomerTable, DimerTable), TableError> {
    let mut monomers = MonomerTable::new(source);
    let mut dimers = DimerTable::new(source);
    let mut section: Option<Section> = None;

    for line in token_lines(content) {
        if line.tokens.len() == 1 {
            if let Some(&next) = SECTION_HEADERS.get(line.tokens[0].to_lowercase().as_str()) {
                section = Some(next);
                continue;
            }
        }

        match section {
            Some(Section::Monomers) => {
                let monomer = parse_monomer(&line, source)?;
                monomers
                    .insert(monomer)
                    .map_err(|dup| TableError::DuplicateKey {
                        path: source.to_path_buf(),
                        line: line.number,
                        kind: "monomer",
                        key: dup.name,
                    })?;
            }
            Some(Section::Dimers) => {
                let dimer = parse_dimer(&line, source)?;
                for name in [&dimer.first, &dimer.second] {
                    if !monomers.contains(name) {
                        return Err(TableError::Reference {
                            path: source.to_path_buf(),
                            line: line.number,
                            message: format!("dimer references undeclared monomer '{}'", name),
                        });
                    }
                }
                dimers.insert(dimer).map_err(|dup| TableError::DuplicateKey {
                    path: source.to_path_buf(),
                    line: line.number,
                    kind: "dimer",
                    key: format!("{} {}", dup.first, dup.second),
                })?;
            }
            None => {
                return Err(malformed(
                    source,
                    line.number,
                    "data found before a MONOMERS or DIMERS header".to_string(),
                ));
            }
        }
    }

    debug!(
        monomers = monomers.len(),
        dimers = dimers.len(),
        "Loaded monomer/dimer table from {:?}.",
        source
    );
    Ok((monomers, dimers))
}

fn parse_monomer(line: &TokenLine, source: &Path) -> Result<Monomer, TableError> {
    if line.tokens.len() < 3 {
        return Err(malformed(
            source,
            line.number,
            format!(
                "monomer rows need 'name charge dipole', found {} field(s)",
                line.tokens.len()
            ),
        ));
    }
    let charge = parse_real(line, 1, "charge", source)?;
    let dipole = parse_real(line, 2, "dipole moment", source)?;
    if dipole < 0.0 {
        return Err(malformed(
            source,
            line.number,
            format!("dipole moment must be non-negative, found {}", dipole),
        ));
    }
    Ok(Monomer {
        name: normalize_name(line.tokens[0]),
        charge,
        dipole,
    })
}

fn parse_dimer(line: &TokenLine, source: &Path) -> Result<Dimer, TableError> {
    if line.tokens.len() < 3 {
        return Err(malformed(
            source,
            line.number,
            format!(
                "dimer rows need 'monomer1 monomer2 distance [k_sapt]', found {} field(s)",
                line.tokens.len()
            ),
        ));
    }
    let distance = parse_real(line, 2, "distance", source)?;
    if distance <= 0.0 {
        return Err(malformed(
            source,
            line.number,
            format!("distance must be positive, found {}", distance),
        ));
    }
    let reference_factor = match line.tokens.get(3) {
        Some(_) => {
            let k = parse_real(line, 3, "reference factor", source)?;
            if k <= 0.0 {
                return Err(malformed(
                    source,
                    line.number,
                    format!("reference factor must be positive, found {}", k),
                ));
            }
            Some(k)
        }
        None => None,
    };
    Ok(Dimer {
        first: normalize_name(line.tokens[0]),
        second: normalize_name(line.tokens[1]),
        distance,
        reference_factor,
    })
}

fn parse_real(
    line: &TokenLine,
    column: usize,
    what: &str,
    source: &Path,
) -> Result<f64, TableError> {
    let raw = line.tokens[column];
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            malformed(
                source,
                line.number,
                format!("{} '{}' is not a number", what, raw),
            )
        })
}

fn malformed(source: &Path, line: usize, reason: String) -> TableError {
    TableError::MalformedLine {
        path: source.to_path_buf(),
        line,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
MONOMERS
# name     q/e    mu/D
c2c1im+    1      1.1558
dca-      -1      2.7805
water      0      1.85

dimers
c2c1im+    dca-   4.2636   0.6122
dca        water  3.9
";

    fn src() -> &'static Path {
        Path::new("fragment.inp")
    }

    #[test]
    fn parse_reads_both_sections() {
        let (monomers, dimers) = parse(TABLE, src()).unwrap();
        assert_eq!(monomers.len(), 3);
        let cation = monomers.get("c2c1im").unwrap();
        assert_eq!(cation.charge, 1.0);
        assert_eq!(cation.dipole, 1.1558);
        assert_eq!(monomers.get("DCA-").unwrap().charge, -1.0);

        assert_eq!(dimers.len(), 2);
        let ion_pair = dimers.find("dca", "c2c1im").unwrap();
        assert_eq!(ion_pair.distance, 4.2636);
        assert_eq!(ion_pair.reference_factor, Some(0.6122));
        assert_eq!(dimers.find("water", "dca").unwrap().reference_factor, None);
    }

    #[test]
    fn duplicate_monomer_is_rejected() {
        let content = "MONOMERS\nbf4- -1 0\nBF4 -1 0\n";
        let err = parse(content, src()).unwrap_err();
        assert!(matches!(
            err,
            TableError::DuplicateKey {
                kind: "monomer",
                line: 3,
                ..
            }
        ));
    }

    #[test]
    fn reversed_duplicate_dimer_is_rejected() {
        let content = "MONOMERS\na 1 0\nb -1 0\nDIMERS\na b 4.0 0.7\nb a 4.1 0.8\n";
        let err = parse(content, src()).unwrap_err();
        assert!(matches!(err, TableError::DuplicateKey { kind: "dimer", .. }));
    }

    #[test]
    fn dimer_with_undeclared_monomer_is_a_reference_error() {
        let content = "MONOMERS\na 1 0\nDIMERS\na ghost 4.0\n";
        let err = parse(content, src()).unwrap_err();
        match err {
            TableError::Reference { line, message, .. } => {
                assert_eq!(line, 4);
                assert!(message.contains("ghost"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_fields_are_malformed() {
        let content = "MONOMERS\na one 0\n";
        assert!(matches!(
            parse(content, src()),
            Err(TableError::MalformedLine { line: 2, .. })
        ));

        let content = "MONOMERS\na 1 0\nb 1 0\nDIMERS\na b far\n";
        assert!(matches!(
            parse(content, src()),
            Err(TableError::MalformedLine { line: 5, .. })
        ));
    }

    #[test]
    fn missing_fields_are_malformed() {
        assert!(matches!(
            parse("MONOMERS\na 1\n", src()),
            Err(TableError::MalformedLine { .. })
        ));
        assert!(matches!(
            parse("MONOMERS\na 1 0\nDIMERS\na a\n", src()),
            Err(TableError::MalformedLine { .. })
        ));
    }

    #[test]
    fn non_positive_distance_is_malformed() {
        let content = "MONOMERS\na 1 0\nDIMERS\na a 0.0\n";
        assert!(matches!(
            parse(content, src()),
            Err(TableError::MalformedLine { .. })
        ));
    }

    #[test]
    fn non_positive_reference_factor_is_malformed() {
        for k in ["0", "-0.5"] {
            let content = format!("MONOMERS\na 1 0\nb -1 0\nDIMERS\na b 4.0 {k}\n");
            match parse(&content, src()).unwrap_err() {
                TableError::MalformedLine { line, reason, .. } => {
                    assert_eq!(line, 5);
                    assert!(reason.contains("reference factor"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn data_before_any_header_is_malformed() {
        assert!(matches!(
            parse("a 1 0\n", src()),
            Err(TableError::MalformedLine { line: 1, .. })
        ));
    }
}
