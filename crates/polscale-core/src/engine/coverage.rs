use crate::core::forcefield::lj::LjTables;
use crate::core::models::fragment::Fragment;
use std::collections::HashSet;
use tracing::warn;

/// Mismatches between the atom classes of the document and the fragment label sets.
///
/// Neither kind of gap aborts a run; both are surfaced to the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    /// Non-auxiliary classes of the document that no fragment owns.
    pub unassigned_classes: Vec<String>,
    /// `(fragment, label)` pairs whose label is not a class of the document.
    pub unknown_labels: Vec<(String, String)>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.unassigned_classes.is_empty() && self.unknown_labels.is_empty()
    }
}

pub fn check(tables: &LjTables, fragments: &[Fragment]) -> CoverageReport {
    let declared = tables.declared_classes();
    let owned: HashSet<&str> = fragments
        .iter()
        .flat_map(|f| f.labels.iter().map(String::as_str))
        .collect();

    let unassigned_classes: Vec<String> = declared
        .iter()
        .filter(|class| !owned.contains(*class))
        .map(|class| class.to_string())
        .collect();
    for class in &unassigned_classes {
        warn!("Atom class '{}' does not belong to any fragment.", class);
    }

    let declared: HashSet<&str> = declared.into_iter().collect();
    let mut unknown_labels = Vec::new();
    for fragment in fragments {
        for label in &fragment.labels {
            if !declared.contains(label.as_str()) {
                warn!(
                    "Label '{}' of fragment '{}' is not an atom class of the force field.",
                    label,
                    fragment.name()
                );
                unknown_labels.push((fragment.name().to_string(), label.clone()));
            }
        }
    }

    CoverageReport {
        unassigned_classes,
        unknown_labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::xml::XmlDocument;
    use crate::core::models::monomer::Monomer;
    use std::path::Path;

    const FIELD: &str = r#"<ForceField>
 <AtomTypes>
  <Type name="c2c1im_NA" class="NA" element="N"/>
  <Type name="c2c1im_CR" class="CR" element="C"/>
  <Type name="c2c1im_CR2" class="CR" element="C"/>
  <Type name="dca_N3A" class="N3A" element="N"/>
  <Type name="DRUDE" class="DRUDE"/>
 </AtomTypes>
</ForceField>
"#;

    fn tables() -> LjTables {
        let doc = XmlDocument::parse(FIELD, Path::new("field.xml")).unwrap();
        LjTables::extract(&doc).unwrap()
    }

    fn fragment(name: &str, labels: &[&str]) -> Fragment {
        Fragment::new(
            Monomer {
                name: name.into(),
                charge: 0.0,
                dipole: 1.0,
            },
            labels.iter().map(|l| l.to_string()).collect(),
            false,
        )
    }

    #[test]
    fn fully_covered_document_reports_nothing() {
        let fragments = [fragment("c2c1im", &["NA", "CR"]), fragment("dca", &["N3A"])];
        let report = check(&tables(), &fragments);
        assert!(report.is_complete());
    }

    #[test]
    fn unowned_class_is_reported_once_and_auxiliary_sites_are_ignored() {
        let fragments = [fragment("c2c1im", &["NA"]), fragment("dca", &["N3A"])];
        let report = check(&tables(), &fragments);
        assert_eq!(report.unassigned_classes, vec!["CR".to_string()]);
        assert!(report.unknown_labels.is_empty());
    }

    #[test]
    fn label_absent_from_document_is_reported() {
        let fragments = [
            fragment("c2c1im", &["NA", "CR", "HX"]),
            fragment("dca", &["N3A"]),
        ];
        let report = check(&tables(), &fragments);
        assert_eq!(
            report.unknown_labels,
            vec![("c2c1im".to_string(), "HX".to_string())]
        );
        assert!(!report.is_complete());
    }
}
