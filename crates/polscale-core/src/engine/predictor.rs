//! Empirical prediction of epsilon scaling factors.
//!
//! For a pair of fragments at centre-of-mass distance `r`, each non-polarizable side sees
//! the other side's charge and dipole polarize it:
//!
//! ```text
//! k_pred = 1 / (1 + [C0 r^2 q2^2 + C1 mu2^2] / alpha2 + [C0 r^2 q1^2 + C1 mu1^2] / alpha1)
//! ```
//!
//! where the bracket involving fragment 2 is only present when fragment 1 is not already
//! polarizable and vice versa. `alpha` is the summed atomic polarizability of a fragment,
//! taken from its structure file and the polarizability table.

use super::error::EngineError;
use super::graph::FragmentGraph;
use crate::core::io::structure;
use crate::core::models::fragment::Fragment;
use crate::core::models::polarizability::PolarizabilityTable;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Regression coefficient of the charge term.
pub const C0: f64 = 0.254952;
/// Regression coefficient of the dipole term.
pub const C1: f64 = 0.106906;

/// Predicts `k_pred` for two fragments at distance `r`, given their summed polarizabilities.
///
/// # Errors
///
/// Returns [`EngineError::DivisionByZero`] if a polarizability needed by the formula is
/// zero.
pub fn predict(
    first: &Fragment,
    first_alpha: f64,
    second: &Fragment,
    second_alpha: f64,
    r: f64,
) -> Result<f64, EngineError> {
    let mut denominator = 1.0;
    if !first.polarizable {
        denominator += induction_term(second, second_alpha, r)?;
    }
    if !second.polarizable {
        denominator += induction_term(first, first_alpha, r)?;
    }
    Ok(1.0 / denominator)
}

// Polarization of the partner induced by `source`'s charge and dipole, over `source`'s alpha.
fn induction_term(source: &Fragment, alpha: f64, r: f64) -> Result<f64, EngineError> {
    if alpha == 0.0 {
        return Err(EngineError::DivisionByZero {
            fragment: source.name().to_string(),
        });
    }
    let q = source.charge();
    let mu = source.dipole();
    Ok((C0 * r * r * q * q + C1 * mu * mu) / alpha)
}

/// Sums atomic polarizabilities over the structure file of a fragment.
pub fn fragment_polarizability(
    fragment: &Fragment,
    table: &PolarizabilityTable,
    structures_dir: &Path,
) -> Result<f64, EngineError> {
    let file = structure::read(structures_dir, fragment.name())?;
    let mut total = 0.0;
    for label in &file.labels {
        let atom_type =
            table
                .resolve_label(label)
                .ok_or_else(|| EngineError::MissingPolarizability {
                    fragment: fragment.name().to_string(),
                    label: label.clone(),
                    structure_file: file.path.clone(),
                    table_file: table.source().to_path_buf(),
                })?;
        total += atom_type.alpha;
    }
    debug!(
        fragment = fragment.name(),
        alpha = total,
        "Summed fragment polarizability."
    );
    Ok(total)
}

/// Sums the polarizability of every paired fragment, then fills `k_pred` of every pair.
///
/// Returns the sums indexed like [`FragmentGraph::fragments`]; fragments outside every
/// pair stay `None` and their structure files are never read.
#[instrument(skip_all, name = "scaling_prediction_task")]
pub fn predict_all(
    graph: &mut FragmentGraph,
    table: &PolarizabilityTable,
    structures_dir: &Path,
) -> Result<Vec<Option<f64>>, EngineError> {
    let mut alphas = vec![None; graph.fragments().len()];
    for index in graph.paired_fragments() {
        alphas[index] = Some(fragment_polarizability(
            &graph.fragments()[index],
            table,
            structures_dir,
        )?);
    }

    let summed = |index: usize| {
        alphas[index].ok_or_else(|| {
            EngineError::Internal(format!(
                "polarizability of fragment '{}' was not computed",
                graph.fragments()[index].name()
            ))
        })
    };
    let mut predictions = Vec::with_capacity(graph.pairs().len());
    for pair in graph.pairs() {
        let (a, b) = graph.pair_fragments(pair);
        let k = predict(a, summed(pair.first)?, b, summed(pair.second)?, pair.distance())?;
        debug!(first = a.name(), second = b.name(), k_pred = k, "Predicted scaling factor.");
        predictions.push(k);
    }
    for (pair, k) in graph.pairs_mut().iter_mut().zip(predictions) {
        pair.predicted_factor = Some(k);
    }

    info!(pairs = graph.pairs().len(), "Scaling factors predicted.");
    Ok(alphas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::{fragments, monomers, polarizability};
    use crate::core::models::monomer::Monomer;
    use crate::engine::error::ErrorKind;
    use std::fs;
    use tempfile::tempdir;

    fn fragment(name: &str, charge: f64, dipole: f64, polarizable: bool) -> Fragment {
        Fragment::new(
            Monomer {
                name: name.into(),
                charge,
                dipole,
            },
            vec!["X".into()],
            polarizable,
        )
    }

    fn graph(monomer_table: &str, fragment_table: &str, polarizable: &[&str]) -> FragmentGraph {
        let (m, d) = monomers::parse(monomer_table, Path::new("fragment.inp")).unwrap();
        let f = fragments::parse(fragment_table, Path::new("fragment.ff"), &m).unwrap();
        let polarizable: Vec<String> = polarizable.iter().map(|s| s.to_string()).collect();
        FragmentGraph::build(&m, &f, &d, &polarizable).unwrap()
    }

    #[test]
    fn unit_charges_at_three_angstrom_give_reference_value() {
        let a = fragment("a", 1.0, 0.0, false);
        let b = fragment("b", 1.0, 0.0, false);
        let k = predict(&a, 1.0, &b, 1.0, 3.0).unwrap();
        assert!((k - 1.0 / 5.589136).abs() < 1e-9);
        assert!((k - 0.17892).abs() < 1e-5);
    }

    #[test]
    fn dipole_term_contributes_through_c1() {
        let a = fragment("a", 0.0, 2.0, false);
        let b = fragment("b", 0.0, 0.0, false);
        // only a's dipole acts: 1 + C1 * 4 / 4
        let k = predict(&a, 4.0, &b, 1.0, 5.0).unwrap();
        assert!((k - 1.0 / (1.0 + C1)).abs() < 1e-12);
    }

    #[test]
    fn polarizable_side_drops_the_partner_term() {
        let ion = fragment("ion", 1.0, 0.0, false);
        let pol = fragment("pol", -1.0, 0.0, true);
        // first is not polarizable: pol's charge polarizes it, over pol's alpha.
        let expected = 1.0 / (1.0 + C0 * 16.0 / 8.0);
        let k = predict(&ion, 2.0, &pol, 8.0, 4.0).unwrap();
        assert!((k - expected).abs() < 1e-12);
        let k_swapped = predict(&pol, 8.0, &ion, 2.0, 4.0).unwrap();
        assert!((k_swapped - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_polarizability_is_a_division_error() {
        let a = fragment("a", 1.0, 0.0, false);
        let b = fragment("b", -1.0, 0.0, false);
        let err = predict(&a, 0.0, &b, 1.0, 4.0).unwrap_err();
        match err {
            EngineError::DivisionByZero { fragment } => assert_eq!(fragment, "a"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unused_zero_polarizability_is_harmless() {
        // b is polarizable, so a's charge term (over a's alpha) is never evaluated.
        let a = fragment("a", 1.0, 0.0, false);
        let b = fragment("b", -1.0, 0.0, true);
        assert!(predict(&a, 0.0, &b, 1.0, 4.0).is_ok());
    }

    #[test]
    fn unknown_structure_label_is_a_missing_polarizability() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("x.xyz"), "2\nx\nNA 0 0 0\nZZ 1 0 0\n").unwrap();
        let table = polarizability::parse("NA 0 0 0 1.094\n", Path::new("alpha.ff")).unwrap();
        let x = fragment("x", 1.0, 0.0, false);

        let err = fragment_polarizability(&x, &table, dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceError);
        match err {
            EngineError::MissingPolarizability {
                fragment, label, ..
            } => {
                assert_eq!(fragment, "x");
                assert_eq!(label, "ZZ");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sums_are_kept_only_for_paired_fragments() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.xyz"), "2\na\nNA 0 0 0\nNA2 1 0 0\n").unwrap();
        fs::write(dir.path().join("b.xyz"), "1\nb\nCL 0 0 0\n").unwrap();
        let table =
            polarizability::parse("NA 0 0 0 1.5\nCL 0 0 0 2.0\n", Path::new("alpha.ff")).unwrap();
        // c is neutral, apolar and polarizable, so it takes part in no pair and its
        // missing structure file is never read.
        let mut g = graph(
            "MONOMERS\na 1 0\nb -1 0\nc 0 0\nDIMERS\na b 4.0\n",
            "a NA\nb CL\nc OW\n",
            &["c"],
        );

        let alphas = predict_all(&mut g, &table, dir.path()).unwrap();
        assert_eq!(alphas, vec![Some(3.0), Some(2.0), None]);
        let expected = predict(&g.fragments()[0], 3.0, &g.fragments()[1], 2.0, 4.0).unwrap();
        assert_eq!(g.pairs()[0].predicted_factor, Some(expected));
    }
}
