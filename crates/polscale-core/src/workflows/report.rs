use crate::engine::config::FactorSource;
use crate::engine::coverage::CoverageReport;
use crate::engine::graph::FragmentGraph;
use crate::engine::scaler::ScalingSummary;
use serde::Serialize;
use std::io;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentRow {
    pub name: String,
    pub charge: f64,
    pub dipole: f64,
    pub polarizable: bool,
    pub epsilon_eligible: bool,
    pub sigma_eligible: bool,
    pub alpha: Option<f64>,
    pub labels: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairRow {
    pub first: String,
    pub second: String,
    pub distance: f64,
    pub k_sapt: Option<f64>,
    pub k_sapt_applied: Option<f64>,
    pub k_pred: Option<f64>,
}

impl PairRow {
    /// The factor the scaling pass used for this pair.
    pub fn factor(&self, source: FactorSource) -> Option<f64> {
        match source {
            FactorSource::Reference => self.k_sapt_applied,
            FactorSource::Predicted => self.k_pred,
        }
    }
}

/// Final state of a scaling run, for printing and export.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingReport {
    pub factor_source: FactorSource,
    pub sigma_factor: Option<f64>,
    pub fragments: Vec<FragmentRow>,
    pub pairs: Vec<PairRow>,
    pub summary: ScalingSummary,
    pub coverage: CoverageReport,
}

impl ScalingReport {
    /// `polarizabilities` is indexed like [`FragmentGraph::fragments`].
    pub fn new(
        graph: &FragmentGraph,
        polarizabilities: &[Option<f64>],
        factor_source: FactorSource,
        sigma_factor: Option<f64>,
        summary: ScalingSummary,
        coverage: CoverageReport,
    ) -> Self {
        let fragments = graph
            .fragments()
            .iter()
            .enumerate()
            .map(|(i, f)| FragmentRow {
                name: f.name().to_string(),
                charge: f.charge(),
                dipole: f.dipole(),
                polarizable: f.polarizable,
                epsilon_eligible: f.epsilon_eligible,
                sigma_eligible: f.sigma_eligible,
                alpha: polarizabilities.get(i).copied().flatten(),
                labels: f.labels.len(),
            })
            .collect();
        let pairs = graph
            .pairs()
            .iter()
            .map(|p| {
                let (a, b) = graph.pair_fragments(p);
                PairRow {
                    first: a.name().to_string(),
                    second: b.name().to_string(),
                    distance: p.distance(),
                    k_sapt: p.dimer.reference_factor,
                    k_sapt_applied: p.reference_factor,
                    k_pred: p.predicted_factor,
                }
            })
            .collect();
        Self {
            factor_source,
            sigma_factor,
            fragments,
            pairs,
            summary,
            coverage,
        }
    }

    /// Writes the pair table as CSV with a header row.
    pub fn write_pairs_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.pairs {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
