use super::monomer::{Dimer, Monomer};
use std::path::{Path, PathBuf};

/// One row of the fragment-membership table: a fragment name and the atom classes it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentEntry {
    pub name: String,
    pub labels: Vec<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FragmentTable {
    entries: Vec<FragmentEntry>,
    source: PathBuf,
}

impl FragmentTable {
    pub(crate) fn new(source: &Path) -> Self {
        Self {
            entries: Vec::new(),
            source: source.to_path_buf(),
        }
    }

    pub(crate) fn push(&mut self, entry: FragmentEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn entries(&self) -> &[FragmentEntry] {
        &self.entries
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// A group of atom classes treated as one unit of polarization bookkeeping.
///
/// A fragment carries its backing monomer by value. Flags are fixed at construction
/// except `sigma_eligible`, which is set by the sigma-scaling step. Polarizability sums
/// live with the predictor, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub monomer: Monomer,
    pub labels: Vec<String>,       // Atom classes owned by this fragment, in file order
    pub polarizable: bool,         // Polarization already modelled explicitly
    pub epsilon_eligible: bool,    // May take part in epsilon scaling
    pub sigma_eligible: bool,      // Sigma is scaled for classes owned by this fragment
}

impl Fragment {
    pub fn new(monomer: Monomer, labels: Vec<String>, polarizable: bool) -> Self {
        let epsilon_eligible = !(polarizable && monomer.charge == 0.0 && monomer.dipole == 0.0);
        Self {
            monomer,
            labels,
            polarizable,
            epsilon_eligible,
            sigma_eligible: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.monomer.name
    }

    pub fn charge(&self) -> f64 {
        self.monomer.charge
    }

    pub fn dipole(&self) -> f64 {
        self.monomer.dipole
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// A dimer realised over two fragments of the active system.
///
/// `first <= second` are indices into the fragment list in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentPair {
    pub first: usize,
    pub second: usize,
    pub dimer: Dimer,
    pub reference_factor: Option<f64>, // k_sapt as applied; sqrt of the dimer value when one side is polarizable
    pub predicted_factor: Option<f64>, // k_pred, filled by the predictor
}

impl FragmentPair {
    pub fn distance(&self) -> f64 {
        self.dimer.distance
    }

    pub fn is_self_pair(&self) -> bool {
        self.first == self.second
    }
}
