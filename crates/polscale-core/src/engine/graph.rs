use super::config::SigmaTargets;
use super::error::EngineError;
use crate::core::models::fragment::{Fragment, FragmentPair, FragmentTable};
use crate::core::models::monomer::{DimerTable, MonomerTable, normalize_name};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Fragments of the active system and the pairs whose interaction is corrected.
///
/// Both collections keep declaration order; pair order is the order in which the
/// pairing loop discovered them and is the tie-break order of the scaling pass.
#[derive(Debug, Clone, Default)]
pub struct FragmentGraph {
    fragments: Vec<Fragment>,
    pairs: Vec<FragmentPair>,
    dimer_source: PathBuf,
}

impl FragmentGraph {
    /// Builds the fragments from the membership table and derives their pairs.
    ///
    /// `polarizable` lists monomer names whose polarization is already modelled
    /// explicitly; names that match no fragment are reported and ignored.
    #[instrument(skip_all, name = "fragment_graph")]
    pub fn build(
        monomers: &MonomerTable,
        memberships: &FragmentTable,
        dimers: &DimerTable,
        polarizable: &[String],
    ) -> Result<Self, EngineError> {
        let polarizable: HashSet<String> = polarizable.iter().map(|n| normalize_name(n)).collect();

        let mut fragments = Vec::with_capacity(memberships.entries().len());
        for entry in memberships.entries() {
            let monomer = monomers
                .get(&entry.name)
                .cloned()
                .ok_or_else(|| EngineError::UnknownFragment {
                    name: entry.name.clone(),
                    context: "the monomer table",
                })?;
            let is_polarizable = polarizable.contains(&entry.name);
            fragments.push(Fragment::new(monomer, entry.labels.clone(), is_polarizable));
        }

        for name in &polarizable {
            if !fragments.iter().any(|f| f.name() == name) {
                warn!("Polarizable monomer '{}' does not match any fragment.", name);
            }
        }

        let pairs = derive_pairs(&fragments, dimers)?;
        info!(
            fragments = fragments.len(),
            pairs = pairs.len(),
            "Fragment graph built."
        );
        Ok(Self {
            fragments,
            pairs,
            dimer_source: dimers.source().to_path_buf(),
        })
    }

    /// Flags the fragments whose sigma values are to be scaled.
    pub fn apply_sigma_targets(&mut self, targets: &SigmaTargets) -> Result<(), EngineError> {
        match targets {
            SigmaTargets::AllEligible => {
                for fragment in &mut self.fragments {
                    fragment.sigma_eligible = !fragment.polarizable;
                }
            }
            SigmaTargets::Named(names) => {
                for name in names {
                    let fragment = self
                        .fragments
                        .iter_mut()
                        .find(|f| f.name() == name.as_str())
                        .ok_or_else(|| EngineError::UnknownFragment {
                            name: name.clone(),
                            context: "the sigma scaling directive",
                        })?;
                    fragment.sigma_eligible = true;
                }
            }
        }
        Ok(())
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn pairs(&self) -> &[FragmentPair] {
        &self.pairs
    }

    /// The dimer table the pairs were derived from.
    pub fn dimer_source(&self) -> &Path {
        &self.dimer_source
    }

    pub(crate) fn pairs_mut(&mut self) -> &mut [FragmentPair] {
        &mut self.pairs
    }

    pub fn pair_fragments(&self, pair: &FragmentPair) -> (&Fragment, &Fragment) {
        (&self.fragments[pair.first], &self.fragments[pair.second])
    }

    /// The first fragment, in declaration order, that owns a class.
    pub fn owning_fragment(&self, class: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.contains(class))
    }

    /// Indices of the fragments that take part in at least one pair.
    pub fn paired_fragments(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .pairs
            .iter()
            .flat_map(|p| [p.first, p.second])
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

/// Whether two fragments interact in a way that needs correcting.
///
/// Oppositely charged or neutral partners qualify, both must be eligible for epsilon
/// scaling, and at most one of them may already be polarizable.
pub fn interacts(a: &Fragment, b: &Fragment) -> bool {
    let (qa, qb) = (a.charge(), b.charge());
    let charges_compatible = qa * qb <= 0.0 || qa.abs().max(qb.abs()) == 0.0;
    charges_compatible
        && a.epsilon_eligible
        && b.epsilon_eligible
        && !(a.polarizable && b.polarizable)
}

/// Derives the interacting pairs over all `i <= j` in fragment order.
///
/// A distinct pair selected by [`interacts`] must have a dimer entry; a fragment is only
/// paired with itself when a self-dimer is declared. When exactly one side is already
/// polarizable the reference factor applied is the square root of the tabulated one.
pub fn derive_pairs(
    fragments: &[Fragment],
    dimers: &DimerTable,
) -> Result<Vec<FragmentPair>, EngineError> {
    let mut pairs = Vec::new();
    for i in 0..fragments.len() {
        for j in i..fragments.len() {
            let (a, b) = (&fragments[i], &fragments[j]);
            if !interacts(a, b) {
                continue;
            }
            let dimer = match dimers.find(a.name(), b.name()) {
                Some(d) => d.clone(),
                None if i == j => {
                    debug!(fragment = a.name(), "No self-dimer declared; skipping.");
                    continue;
                }
                None => {
                    return Err(EngineError::MissingDimer {
                        first: a.name().to_string(),
                        second: b.name().to_string(),
                        source_file: dimers.source().to_path_buf(),
                    });
                }
            };
            let half_corrected = a.polarizable != b.polarizable;
            let reference_factor = dimer
                .reference_factor
                .map(|k| if half_corrected { k.sqrt() } else { k });
            debug!(
                first = a.name(),
                second = b.name(),
                distance = dimer.distance,
                "Derived fragment pair."
            );
            pairs.push(FragmentPair {
                first: i,
                second: j,
                dimer,
                reference_factor,
                predicted_factor: None,
            });
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::{fragments, monomers};
    use crate::core::models::monomer::Monomer;
    use std::path::Path;

    const TABLE: &str = "\
MONOMERS
c2c1im+  1   1.1558
dca-    -1   2.7805
bf4-    -1   0.0
water    0   1.85
DIMERS
c2c1im   dca    4.2636  0.64
c2c1im   bf4    4.50    0.70
dca      water  3.90    0.81
c2c1im   water  4.10
bf4      water  3.70    0.90
water    water  2.90    0.95
";

    fn build(fragment_rows: &str, polarizable: &[&str]) -> Result<FragmentGraph, EngineError> {
        let (m, d) = monomers::parse(TABLE, Path::new("fragment.inp")).unwrap();
        let f = fragments::parse(fragment_rows, Path::new("fragment.ff"), &m).unwrap();
        let polarizable: Vec<String> = polarizable.iter().map(|s| s.to_string()).collect();
        FragmentGraph::build(&m, &f, &d, &polarizable)
    }

    fn fragment(charge: f64, dipole: f64, polarizable: bool) -> Fragment {
        Fragment::new(
            Monomer {
                name: "x".into(),
                charge,
                dipole,
            },
            vec!["X".into()],
            polarizable,
        )
    }

    #[test]
    fn opposite_charges_interact_and_like_charges_do_not() {
        let cation = fragment(1.0, 0.0, false);
        let anion = fragment(-1.0, 0.0, false);
        assert!(interacts(&cation, &anion));
        assert!(!interacts(&cation, &cation.clone()));
    }

    #[test]
    fn neutral_partners_interact() {
        let neutral = fragment(0.0, 1.0, false);
        let cation = fragment(1.0, 0.0, false);
        assert!(interacts(&neutral, &cation));
        assert!(interacts(&neutral, &neutral.clone()));
    }

    #[test]
    fn two_polarizable_fragments_never_interact() {
        let a = fragment(1.0, 0.0, true);
        let b = fragment(-1.0, 0.0, true);
        assert!(!interacts(&a, &b));
    }

    #[test]
    fn ineligible_fragment_blocks_pairing() {
        let inert = fragment(0.0, 0.0, true);
        let cation = fragment(1.0, 0.0, false);
        assert!(!inert.epsilon_eligible);
        assert!(!interacts(&inert, &cation));
    }

    #[test]
    fn pairs_follow_fragment_declaration_order() {
        let graph = build("c2c1im NA CR\ndca N3A\nbf4 B F\n", &[]).unwrap();
        let names: Vec<_> = graph
            .pairs()
            .iter()
            .map(|p| {
                let (a, b) = graph.pair_fragments(p);
                (a.name().to_string(), b.name().to_string())
            })
            .collect();
        assert_eq!(
            names,
            vec![
                ("c2c1im".to_string(), "dca".to_string()),
                ("c2c1im".to_string(), "bf4".to_string()),
            ]
        );
        assert_eq!(graph.pairs()[0].reference_factor, Some(0.64));
        assert_eq!(graph.pairs()[0].distance(), 4.2636);
    }

    #[test]
    fn pair_lookup_ignores_declaration_order_of_dimer() {
        let graph = build("dca N3A\nc2c1im NA\n", &[]).unwrap();
        assert_eq!(graph.pairs().len(), 1);
        assert_eq!(graph.pairs()[0].first, 0);
        assert_eq!(graph.pairs()[0].second, 1);
        assert_eq!(graph.pairs()[0].dimer.first, "c2c1im");
    }

    #[test]
    fn one_polarizable_side_takes_square_root_of_reference() {
        let graph = build("c2c1im NA\ndca N3A\n", &["dca-"]).unwrap();
        let k = graph.pairs()[0].reference_factor.unwrap();
        assert!((k - 0.8).abs() < 1e-12);
        assert_eq!(graph.pairs()[0].dimer.reference_factor, Some(0.64));
    }

    #[test]
    fn self_pair_requires_declared_self_dimer() {
        let graph = build("water OW HW\ndca N3A\n", &[]).unwrap();
        let pairs: Vec<_> = graph.pairs().iter().map(|p| (p.first, p.second)).collect();
        assert_eq!(pairs, vec![(0, 0), (0, 1)]);
        assert!(graph.pairs()[0].is_self_pair());

        let graph = build("dca N3A\n", &[]).unwrap();
        assert!(graph.pairs().is_empty());
    }

    #[test]
    fn missing_dimer_for_interacting_pair_is_fatal() {
        let (m, _) = monomers::parse(TABLE, Path::new("fragment.inp")).unwrap();
        let (_, empty) =
            monomers::parse("MONOMERS\nx 0 0\n", Path::new("empty.inp")).unwrap();
        let f = fragments::parse("c2c1im NA\ndca N3A\n", Path::new("f"), &m).unwrap();
        let err = FragmentGraph::build(&m, &f, &empty, &[]).unwrap_err();
        match err {
            EngineError::MissingDimer { first, second, .. } => {
                assert_eq!(first, "c2c1im");
                assert_eq!(second, "dca");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sigma_targets_all_eligible_skips_polarizable_fragments() {
        let mut graph = build("c2c1im NA\ndca N3A\n", &["dca"]).unwrap();
        graph.apply_sigma_targets(&SigmaTargets::AllEligible).unwrap();
        assert!(graph.fragments()[0].sigma_eligible);
        assert!(!graph.fragments()[1].sigma_eligible);
    }

    #[test]
    fn sigma_targets_named_must_exist() {
        let mut graph = build("c2c1im NA\ndca N3A\n", &[]).unwrap();
        graph
            .apply_sigma_targets(&SigmaTargets::Named(vec!["dca".into()]))
            .unwrap();
        assert!(!graph.fragments()[0].sigma_eligible);
        assert!(graph.fragments()[1].sigma_eligible);

        let err = graph
            .apply_sigma_targets(&SigmaTargets::Named(vec!["ghost".into()]))
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownFragment { .. }));
    }

    #[test]
    fn owning_fragment_is_first_in_declaration_order() {
        let graph = build("c2c1im NA SHARED\ndca SHARED N3A\n", &[]).unwrap();
        assert_eq!(graph.owning_fragment("SHARED").unwrap().name(), "c2c1im");
        assert_eq!(graph.owning_fragment("N3A").unwrap().name(), "dca");
        assert!(graph.owning_fragment("OW").is_none());
        assert_eq!(graph.paired_fragments(), vec![0, 1]);
    }
}
