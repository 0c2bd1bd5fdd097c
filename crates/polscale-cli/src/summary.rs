use polscale::engine::config::FactorSource;
use polscale::workflows::report::ScalingReport;
use std::fmt;

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn optional(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", decimals, v))
}

/// End-of-run summary printed after a successful scaling pass.
pub struct Summary<'a>(pub &'a ScalingReport);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        writeln!(f, "Fragments:")?;
        writeln!(
            f,
            "  {:<12} {:>7} {:>8} {:>9}  {:<11} {:<7} {:<5}",
            "name", "q/e", "mu/D", "alpha/A3", "polarizable", "epsilon", "sigma"
        )?;
        for row in &report.fragments {
            writeln!(
                f,
                "  {:<12} {:>7.2} {:>8.4} {:>9}  {:<11} {:<7} {:<5}",
                row.name,
                row.charge,
                row.dipole,
                optional(row.alpha, 3),
                yes_no(row.polarizable),
                yes_no(row.epsilon_eligible),
                yes_no(row.sigma_eligible),
            )?;
        }

        let source = match report.factor_source {
            FactorSource::Reference => "reference",
            FactorSource::Predicted => "predicted",
        };
        writeln!(f, "Fragment pairs ({} factors):", source)?;
        if report.pairs.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for p in &report.pairs {
            writeln!(
                f,
                "  {:<12} {:<12} r = {:>7.4} A   k = {}",
                p.first,
                p.second,
                p.distance,
                optional(p.factor(report.factor_source), 5),
            )?;
        }

        let s = &report.summary;
        writeln!(
            f,
            "Records: {} per-class ({} epsilon, {} sigma scaled), {} cross-pair ({} epsilon, {} sigma scaled)",
            s.atom_records,
            s.atom_epsilon_scaled,
            s.atom_sigma_scaled,
            s.pair_records,
            s.pair_epsilon_scaled,
            s.pair_sigma_scaled,
        )?;
        if let Some(factor) = report.sigma_factor {
            writeln!(f, "Sigma factor: {}", factor)?;
        }

        let coverage = &report.coverage;
        for class in &coverage.unassigned_classes {
            writeln!(f, "Warning: atom class '{}' belongs to no fragment", class)?;
        }
        for (fragment, label) in &coverage.unknown_labels {
            writeln!(
                f,
                "Warning: label '{}' of fragment '{}' is not a force field class",
                label, fragment
            )?;
        }
        Ok(())
    }
}
