use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Normalises a monomer or fragment name for lookup.
///
/// Names are compared case-insensitively, and a single trailing charge sign is dropped so
/// that `C4C1im+` and `c4c1im` refer to the same monomer.
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    match lowered.strip_suffix(['+', '-']) {
        Some(stripped) => stripped.to_string(),
        None => lowered,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Monomer {
    pub name: String, // Normalised name
    pub charge: f64,  // Net charge in e
    pub dipole: f64,  // Dipole moment magnitude in D
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dimer {
    pub first: String,
    pub second: String,
    pub distance: f64,                  // Centre-of-mass separation in A
    pub reference_factor: Option<f64>, // k_sapt from reference calculations, when supplied
}

/// Order-independent key identifying a dimer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DimerKey(String, String);

impl DimerKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

impl Dimer {
    pub fn key(&self) -> DimerKey {
        DimerKey::new(&self.first, &self.second)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MonomerTable {
    monomers: Vec<Monomer>,
    index: HashMap<String, usize>,
    source: PathBuf,
}

impl MonomerTable {
    pub(crate) fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            ..Default::default()
        }
    }

    pub(crate) fn insert(&mut self, monomer: Monomer) -> Result<(), Monomer> {
        if self.index.contains_key(&monomer.name) {
            return Err(monomer);
        }
        self.index.insert(monomer.name.clone(), self.monomers.len());
        self.monomers.push(monomer);
        Ok(())
    }

    /// Looks up a monomer by name; the name is normalised before the lookup.
    pub fn get(&self, name: &str) -> Option<&Monomer> {
        self.index
            .get(&normalize_name(name))
            .map(|&i| &self.monomers[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Monomer> {
        self.monomers.iter()
    }

    pub fn len(&self) -> usize {
        self.monomers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monomers.is_empty()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[derive(Debug, Clone, Default)]
pub struct DimerTable {
    dimers: Vec<Dimer>,
    index: HashMap<DimerKey, usize>,
    source: PathBuf,
}

impl DimerTable {
    pub(crate) fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            ..Default::default()
        }
    }

    pub(crate) fn insert(&mut self, dimer: Dimer) -> Result<(), Dimer> {
        let key = dimer.key();
        if self.index.contains_key(&key) {
            return Err(dimer);
        }
        self.index.insert(key, self.dimers.len());
        self.dimers.push(dimer);
        Ok(())
    }

    /// Finds the dimer for two monomers regardless of declaration order.
    pub fn find(&self, a: &str, b: &str) -> Option<&Dimer> {
        let key = DimerKey::new(&normalize_name(a), &normalize_name(b));
        self.index.get(&key).map(|&i| &self.dimers[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dimer> {
        self.dimers.iter()
    }

    pub fn len(&self) -> usize {
        self.dimers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimers.is_empty()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}
