use super::report::ScalingReport;
use crate::core::forcefield::document::StructuredDocument;
use crate::core::forcefield::lj::LjTables;
use crate::core::io::{fragments, monomers, polarizability};
use crate::engine::config::{FactorSource, ScalingConfig};
use crate::engine::coverage;
use crate::engine::error::EngineError;
use crate::engine::graph::FragmentGraph;
use crate::engine::predictor;
use crate::engine::scaler::{self, ScalingOptions};
use tracing::{info, instrument};

/// Runs the complete scaling pass on an in-memory force-field document.
///
/// The document is only modified once every factor has been resolved; persisting it is
/// left to the caller.
#[instrument(skip_all, name = "scaling_workflow")]
pub fn run<D: StructuredDocument + ?Sized>(
    document: &mut D,
    config: &ScalingConfig,
) -> Result<ScalingReport, EngineError> {
    // === Phase 1: Load and cross-check the input tables ===
    info!("Loading polarizability, monomer and fragment tables.");
    let alphas = polarizability::load(&config.inputs.polarizability)?;
    let (monomer_table, dimer_table) = monomers::load(&config.inputs.monomers)?;
    let memberships = fragments::load(&config.inputs.fragments, &monomer_table)?;

    let mut graph =
        FragmentGraph::build(&monomer_table, &memberships, &dimer_table, &config.polarizable)?;
    if let Some(sigma) = &config.sigma {
        graph.apply_sigma_targets(&sigma.targets)?;
    }

    // === Phase 2: Scaling factors ===
    let polarizabilities = match config.factor_source {
        FactorSource::Predicted => {
            predictor::predict_all(&mut graph, &alphas, &config.inputs.structures_dir)?
        }
        FactorSource::Reference => {
            info!("Using reference scaling factors from the dimer table.");
            vec![None; graph.fragments().len()]
        }
    };

    // === Phase 3: Rewrite the Lennard-Jones records ===
    let tables = LjTables::extract(&*document)?;
    let coverage = coverage::check(&tables, graph.fragments());
    let options = ScalingOptions {
        factor_source: config.factor_source,
        sigma_factor: config.sigma.as_ref().map(|s| s.factor),
    };
    let summary = scaler::scale(document, &tables, &graph, options)?;

    info!("Scaling workflow completed.");
    Ok(ScalingReport::new(
        &graph,
        &polarizabilities,
        options.factor_source,
        options.sigma_factor,
        summary,
        coverage,
    ))
}
