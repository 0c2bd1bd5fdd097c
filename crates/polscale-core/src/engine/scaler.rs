use super::config::FactorSource;
use super::error::EngineError;
use super::graph::FragmentGraph;
use crate::core::forcefield::document::{ElementId, StructuredDocument};
use crate::core::forcefield::format;
use crate::core::forcefield::lj::{EPSILON, LjAtomRecord, LjPairRecord, LjTables, SIGMA};
use crate::core::models::fragment::{Fragment, FragmentPair};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingOptions {
    pub factor_source: FactorSource,
    /// Multiplier for sigma of classes owned by sigma-eligible fragments; `None` leaves
    /// sigma unscaled.
    pub sigma_factor: Option<f64>,
}

/// Counts of the records rewritten by one scaling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScalingSummary {
    pub atom_records: usize,
    pub atom_epsilon_scaled: usize,
    pub atom_sigma_scaled: usize,
    pub pair_records: usize,
    pub pair_epsilon_scaled: usize,
    pub pair_sigma_scaled: usize,
}

#[derive(Debug)]
struct RecordUpdate {
    element: ElementId,
    epsilon: String,
    sigma: String,
    epsilon_scaled: bool,
    sigma_scaled: bool,
}

/// Scales every Lennard-Jones record of `document` and rewrites it in fixed precision.
///
/// Each record takes the factor of the first pair, in discovery order, that contains its
/// class(es) and whose factor is below one. All records are resolved before the first
/// attribute is written, so on error the document is left as it was.
#[instrument(skip_all, name = "lj_scaling_task")]
pub fn scale<D: StructuredDocument + ?Sized>(
    document: &mut D,
    tables: &LjTables,
    graph: &FragmentGraph,
    options: ScalingOptions,
) -> Result<ScalingSummary, EngineError> {
    let resolver = Resolver { graph, options };

    #[cfg(not(feature = "parallel"))]
    let (atoms, pairs) = (tables.atoms.iter(), tables.pairs.iter());

    #[cfg(feature = "parallel")]
    let (atoms, pairs) = (tables.atoms.par_iter(), tables.pairs.par_iter());

    let atom_results: Vec<_> = atoms.map(|r| resolver.atom_update(r)).collect();
    let pair_results: Vec<_> = pairs.map(|r| resolver.pair_update(r)).collect();

    // Report the first failing record in document order.
    let atom_updates = atom_results.into_iter().collect::<Result<Vec<_>, _>>()?;
    let pair_updates = pair_results.into_iter().collect::<Result<Vec<_>, _>>()?;

    let mut summary = ScalingSummary::default();
    for update in &atom_updates {
        write(document, update)?;
        summary.atom_records += 1;
        summary.atom_epsilon_scaled += usize::from(update.epsilon_scaled);
        summary.atom_sigma_scaled += usize::from(update.sigma_scaled);
    }
    for update in &pair_updates {
        write(document, update)?;
        summary.pair_records += 1;
        summary.pair_epsilon_scaled += usize::from(update.epsilon_scaled);
        summary.pair_sigma_scaled += usize::from(update.sigma_scaled);
    }

    info!(
        atoms = summary.atom_records,
        atoms_scaled = summary.atom_epsilon_scaled,
        pairs = summary.pair_records,
        pairs_scaled = summary.pair_epsilon_scaled,
        "Lennard-Jones records rewritten."
    );
    Ok(summary)
}

fn write<D: StructuredDocument + ?Sized>(
    document: &mut D,
    update: &RecordUpdate,
) -> Result<(), EngineError> {
    document.set_attribute(update.element, EPSILON, &update.epsilon)?;
    document.set_attribute(update.element, SIGMA, &update.sigma)?;
    Ok(())
}

struct Resolver<'a> {
    graph: &'a FragmentGraph,
    options: ScalingOptions,
}

impl Resolver<'_> {
    fn atom_update(&self, record: &LjAtomRecord) -> Result<RecordUpdate, EngineError> {
        let class = record.class.as_str();
        let epsilon_factor = self.epsilon_factor(|a, b| a.contains(class) && b.contains(class))?;
        let sigma_factor = self
            .options
            .sigma_factor
            .filter(|_| self.sigma_eligible(class));

        if let Some(k) = epsilon_factor {
            debug!(class, factor = k, "Scaling per-class epsilon.");
        }
        Ok(RecordUpdate {
            element: record.element,
            epsilon: format::atom_epsilon(record.epsilon * epsilon_factor.unwrap_or(1.0)),
            sigma: format::atom_sigma(record.sigma * sigma_factor.unwrap_or(1.0)),
            epsilon_scaled: epsilon_factor.is_some(),
            sigma_scaled: sigma_factor.is_some(),
        })
    }

    fn pair_update(&self, record: &LjPairRecord) -> Result<RecordUpdate, EngineError> {
        let (i, j) = (record.class1.as_str(), record.class2.as_str());
        let epsilon_factor = self.epsilon_factor(|a, b| {
            (a.contains(i) && b.contains(j)) || (a.contains(j) && b.contains(i))
        })?;
        let sigma_factor = self
            .options
            .sigma_factor
            .filter(|_| self.sigma_eligible(i) && self.sigma_eligible(j));

        if let Some(k) = epsilon_factor {
            debug!(class1 = i, class2 = j, factor = k, "Scaling cross-pair epsilon.");
        }
        Ok(RecordUpdate {
            element: record.element,
            epsilon: format::pair_value(record.epsilon * epsilon_factor.unwrap_or(1.0)),
            sigma: format::pair_value(record.sigma * sigma_factor.unwrap_or(1.0)),
            epsilon_scaled: epsilon_factor.is_some(),
            sigma_scaled: sigma_factor.is_some(),
        })
    }

    /// First factor below one among the candidate pairs, scanned in discovery order.
    fn epsilon_factor(
        &self,
        is_candidate: impl Fn(&Fragment, &Fragment) -> bool,
    ) -> Result<Option<f64>, EngineError> {
        for pair in self.graph.pairs() {
            let (a, b) = self.graph.pair_fragments(pair);
            if !is_candidate(a, b) {
                continue;
            }
            let k = self.pair_factor(pair)?;
            if k < 1.0 {
                return Ok(Some(k));
            }
        }
        Ok(None)
    }

    fn pair_factor(&self, pair: &FragmentPair) -> Result<f64, EngineError> {
        let (a, b) = self.graph.pair_fragments(pair);
        match self.options.factor_source {
            FactorSource::Reference => {
                pair.reference_factor
                    .ok_or_else(|| EngineError::MissingReferenceValue {
                        first: a.name().to_string(),
                        second: b.name().to_string(),
                        source_file: self.graph.dimer_source().to_path_buf(),
                    })
            }
            FactorSource::Predicted => {
                pair.predicted_factor
                    .ok_or_else(|| EngineError::MissingPrediction {
                        first: a.name().to_string(),
                        second: b.name().to_string(),
                    })
            }
        }
    }

    fn sigma_eligible(&self, class: &str) -> bool {
        self.graph
            .owning_fragment(class)
            .is_some_and(|f| f.sigma_eligible)
    }
}
