use super::document::{DocumentError, ElementId, StructuredDocument};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

const ATOM_TYPES: (&str, &str) = ("AtomTypes", "Type");
const LJ_ATOMS: (&str, &str) = ("LennardJonesForce", "Atom");
const LJ_PAIRS: (&str, &str) = ("LennardJonesForce", "NBFixPair");
const DRUDE_PARTICLES: (&str, &str) = ("DrudeForce", "Particle");

pub const EPSILON: &str = "epsilon";
pub const SIGMA: &str = "sigma";

#[derive(Debug, Error)]
pub enum ForcefieldError {
    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("<{element}> attribute '{attribute}' is not a number: '{value}'")]
    InvalidNumber {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    #[error("<{element}> refers to undeclared atom type '{name}'")]
    UnknownType { element: &'static str, name: String },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// An atom type declared in the force field.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomTypeDecl {
    pub name: String,
    pub class: String,
    pub auxiliary: bool, // Drude particle or virtual site; never owned by a fragment
}

/// Per-class Lennard-Jones parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LjAtomRecord {
    pub element: ElementId,
    pub class: String,
    pub epsilon: f64,
    pub sigma: f64,
}

/// Lennard-Jones parameters overriding the combination rule for one pair of classes.
#[derive(Debug, Clone, PartialEq)]
pub struct LjPairRecord {
    pub element: ElementId,
    pub class1: String,
    pub class2: String,
    pub epsilon: f64,
    pub sigma: f64,
}

/// Everything the scaling pass reads from a force-field document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LjTables {
    pub atom_types: Vec<AtomTypeDecl>,
    pub atoms: Vec<LjAtomRecord>,
    pub pairs: Vec<LjPairRecord>,
}

impl LjTables {
    pub fn extract<D: StructuredDocument + ?Sized>(document: &D) -> Result<Self, ForcefieldError> {
        let drude_types: HashSet<&str> = document
            .elements(DRUDE_PARTICLES.0, DRUDE_PARTICLES.1)
            .into_iter()
            .filter_map(|id| document.attribute(id, "type1"))
            .collect();

        let mut atom_types = Vec::new();
        for id in document.elements(ATOM_TYPES.0, ATOM_TYPES.1) {
            let name = required(document, id, "Type", "name")?;
            let class = document.attribute(id, "class").unwrap_or(name);
            let auxiliary =
                document.attribute(id, "element").is_none() || drude_types.contains(name);
            atom_types.push(AtomTypeDecl {
                name: name.to_string(),
                class: class.to_string(),
                auxiliary,
            });
        }

        let class_of: HashMap<&str, &str> = atom_types
            .iter()
            .map(|t| (t.name.as_str(), t.class.as_str()))
            .collect();
        let resolve = |element: &'static str,
                       id: ElementId,
                       class_attr: &'static str,
                       type_attr: &'static str|
         -> Result<String, ForcefieldError> {
            if let Some(class) = document.attribute(id, class_attr) {
                return Ok(class.to_string());
            }
            let type_name =
                document
                    .attribute(id, type_attr)
                    .ok_or(ForcefieldError::MissingAttribute {
                        element,
                        attribute: class_attr,
                    })?;
            class_of
                .get(type_name)
                .map(|c| c.to_string())
                .ok_or_else(|| ForcefieldError::UnknownType {
                    element,
                    name: type_name.to_string(),
                })
        };

        let mut atoms = Vec::new();
        for id in document.elements(LJ_ATOMS.0, LJ_ATOMS.1) {
            atoms.push(LjAtomRecord {
                element: id,
                class: resolve("Atom", id, "class", "type")?,
                epsilon: number(document, id, "Atom", EPSILON)?,
                sigma: number(document, id, "Atom", SIGMA)?,
            });
        }

        let mut pairs = Vec::new();
        for id in document.elements(LJ_PAIRS.0, LJ_PAIRS.1) {
            pairs.push(LjPairRecord {
                element: id,
                class1: resolve("NBFixPair", id, "class1", "type1")?,
                class2: resolve("NBFixPair", id, "class2", "type2")?,
                epsilon: number(document, id, "NBFixPair", EPSILON)?,
                sigma: number(document, id, "NBFixPair", SIGMA)?,
            });
        }

        Ok(Self {
            atom_types,
            atoms,
            pairs,
        })
    }

    /// Classes of all non-auxiliary atom types, deduplicated, in declaration order.
    pub fn declared_classes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.atom_types
            .iter()
            .filter(|t| !t.auxiliary)
            .map(|t| t.class.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}

fn required<'d, D: StructuredDocument + ?Sized>(
    document: &'d D,
    id: ElementId,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'d str, ForcefieldError> {
    document
        .attribute(id, attribute)
        .ok_or(ForcefieldError::MissingAttribute { element, attribute })
}

fn number<D: StructuredDocument + ?Sized>(
    document: &D,
    id: ElementId,
    element: &'static str,
    attribute: &'static str,
) -> Result<f64, ForcefieldError> {
    let raw = required(document, id, element, attribute)?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ForcefieldError::InvalidNumber {
            element,
            attribute,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::xml::XmlDocument;

    const FIELD: &str = r#"<ForceField>
 <AtomTypes>
  <Type name="c2c1im_NA" class="NA" element="N" mass="14.007"/>
  <Type name="c2c1im_CR" class="CR" element="C" mass="12.011"/>
  <Type name="dca_N3A" class="N3A" element="N" mass="14.007"/>
  <Type name="D_NA" class="DNA" mass="0.4"/>
  <Type name="DP_CR" class="DCR" element="C" mass="0.4"/>
 </AtomTypes>
 <DrudeForce>
  <Particle type1="DP_CR" type2="c2c1im_CR" charge="-1.0" polarizability="0.001"/>
 </DrudeForce>
 <LennardJonesForce lj14scale="0.5">
  <Atom class="NA" sigma="0.3250" epsilon="0.71128"/>
  <Atom type="c2c1im_CR" sigma="0.3550" epsilon="0.29288"/>
  <NBFixPair class1="NA" type2="dca_N3A" sigma="0.32500000" epsilon="0.71128000"/>
 </LennardJonesForce>
</ForceField>
"#;

    fn tables() -> LjTables {
        let doc = XmlDocument::parse(FIELD, "field.xml".as_ref()).unwrap();
        LjTables::extract(&doc).unwrap()
    }

    #[test]
    fn extracts_atom_types_and_flags_auxiliary_sites() {
        let t = tables();
        assert_eq!(t.atom_types.len(), 5);
        assert_eq!(t.atom_types[0].class, "NA");
        assert!(!t.atom_types[0].auxiliary);
        assert!(t.atom_types[3].auxiliary, "no element attribute");
        assert!(t.atom_types[4].auxiliary, "declared as Drude particle");
    }

    #[test]
    fn declared_classes_skip_auxiliary_types() {
        assert_eq!(tables().declared_classes(), vec!["NA", "CR", "N3A"]);
    }

    #[test]
    fn atom_records_resolve_type_to_class() {
        let t = tables();
        assert_eq!(t.atoms.len(), 2);
        assert_eq!(t.atoms[0].class, "NA");
        assert_eq!(t.atoms[0].epsilon, 0.71128);
        assert_eq!(t.atoms[1].class, "CR");
        assert_eq!(t.atoms[1].sigma, 0.355);
    }

    #[test]
    fn pair_records_mix_class_and_type_keys() {
        let t = tables();
        assert_eq!(t.pairs.len(), 1);
        assert_eq!(t.pairs[0].class1, "NA");
        assert_eq!(t.pairs[0].class2, "N3A");
    }

    #[test]
    fn non_numeric_epsilon_is_rejected() {
        let xml = r#"<ForceField><LennardJonesForce><Atom class="X" sigma="0.3" epsilon="deep"/></LennardJonesForce></ForceField>"#;
        let doc = XmlDocument::parse(xml, "f.xml".as_ref()).unwrap();
        assert!(matches!(
            LjTables::extract(&doc),
            Err(ForcefieldError::InvalidNumber {
                attribute: "epsilon",
                ..
            })
        ));
    }

    #[test]
    fn undeclared_type_reference_is_rejected() {
        let xml = r#"<ForceField><LennardJonesForce><Atom type="ghost" sigma="0.3" epsilon="0.1"/></LennardJonesForce></ForceField>"#;
        let doc = XmlDocument::parse(xml, "f.xml".as_ref()).unwrap();
        assert!(matches!(
            LjTables::extract(&doc),
            Err(ForcefieldError::UnknownType { .. })
        ));
    }

    #[test]
    fn atom_record_without_key_is_rejected() {
        let xml = r#"<ForceField><LennardJonesForce><Atom sigma="0.3" epsilon="0.1"/></LennardJonesForce></ForceField>"#;
        let doc = XmlDocument::parse(xml, "f.xml".as_ref()).unwrap();
        assert!(matches!(
            LjTables::extract(&doc),
            Err(ForcefieldError::MissingAttribute {
                attribute: "class",
                ..
            })
        ));
    }
}
