use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct AtomType {
    pub name: String, // Atom type name, first token of the table row
    pub alpha: f64,   // Isotropic polarizability in A^3
}

/// Per-atom-type polarizabilities, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct PolarizabilityTable {
    types: Vec<AtomType>,
    index: HashMap<String, usize>,
    source: PathBuf,
}

impl PolarizabilityTable {
    pub(crate) fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            ..Default::default()
        }
    }

    /// Inserts a new atom type, handing it back if the name is already taken.
    pub(crate) fn insert(&mut self, atom_type: AtomType) -> Result<(), AtomType> {
        if self.index.contains_key(&atom_type.name) {
            return Err(atom_type);
        }
        self.index.insert(atom_type.name.clone(), self.types.len());
        self.types.push(atom_type);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&AtomType> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    /// Resolves a structure-file atom label to its atom type.
    ///
    /// Labels are matched exactly first; numbered labels such as `C12` fall back to the
    /// name with its trailing digits removed.
    pub fn resolve_label(&self, label: &str) -> Option<&AtomType> {
        self.get(label).or_else(|| {
            let stem = label.trim_end_matches(|c: char| c.is_ascii_digit());
            if stem.is_empty() || stem == label {
                None
            } else {
                self.get(stem)
            }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &AtomType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PolarizabilityTable {
        let mut table = PolarizabilityTable::new(Path::new("alpha.ff"));
        table
            .insert(AtomType {
                name: "C".to_string(),
                alpha: 1.122,
            })
            .unwrap();
        table
            .insert(AtomType {
                name: "NA".to_string(),
                alpha: 1.094,
            })
            .unwrap();
        table
    }

    #[test]
    fn insert_rejects_duplicate_names() {
        let mut table = table();
        let dup = AtomType {
            name: "C".to_string(),
            alpha: 2.0,
        };
        assert_eq!(table.insert(dup.clone()), Err(dup));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("C").unwrap().alpha, 1.122);
    }

    #[test]
    fn resolve_label_prefers_exact_match() {
        let table = table();
        assert_eq!(table.resolve_label("NA").unwrap().name, "NA");
    }

    #[test]
    fn resolve_label_strips_trailing_digits() {
        let table = table();
        assert_eq!(table.resolve_label("C12").unwrap().name, "C");
        assert_eq!(table.resolve_label("NA3").unwrap().name, "NA");
    }

    #[test]
    fn resolve_label_returns_none_for_unknown_labels() {
        let table = table();
        assert!(table.resolve_label("H1").is_none());
        assert!(table.resolve_label("42").is_none());
    }

    #[test]
    fn iteration_follows_declaration_order() {
        let table = table();
        let names: Vec<_> = table.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["C", "NA"]);
        assert_eq!(table.source(), Path::new("alpha.ff"));
    }
}
