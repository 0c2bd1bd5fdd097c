//! XML force-field documents (OpenMM `ForceField` layout).
//!
//! The document keeps every parsed event. Saving re-emits untouched events byte for byte
//! and rebuilds only the elements whose attributes were changed, keeping their attribute
//! order, so a scaled file diffs cleanly against its input.

use crate::core::forcefield::document::{DocumentError, ElementId, StructuredDocument};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct Element {
    name: String,
    parent: Option<String>,
    attributes: Vec<(String, String)>,
    self_closing: bool,
    modified: bool,
    raw: BytesStart<'static>,
}

impl Element {
    fn rebuild(&self) -> BytesStart<'static> {
        let mut start = BytesStart::new(self.name.clone());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        start
    }
}

#[derive(Debug, Clone)]
enum Node {
    Element(Element),
    Other(Event<'static>),
}

#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<Node>,
    path: PathBuf,
}

impl XmlDocument {
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DocumentError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DocumentError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::parse(&content, path)
    }

    /// Parses a document from memory; `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, DocumentError> {
        let syntax = |message: String| DocumentError::Syntax {
            path: path.to_path_buf(),
            message,
        };

        let mut reader = Reader::from_str(content);
        let mut nodes = Vec::new();
        let mut open: Vec<String> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                syntax(format!("{} (at byte {})", e, reader.buffer_position()))
            })?;
            match event {
                Event::Eof => break,
                Event::Start(start) => {
                    let element = read_element(start, open.last(), false).map_err(syntax)?;
                    open.push(element.name.clone());
                    nodes.push(Node::Element(element));
                }
                Event::Empty(start) => {
                    let element = read_element(start, open.last(), true).map_err(syntax)?;
                    nodes.push(Node::Element(element));
                }
                Event::End(end) => {
                    open.pop();
                    nodes.push(Node::Other(Event::End(end.into_owned())));
                }
                other => nodes.push(Node::Other(other.into_owned())),
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(syntax(format!("element <{}> is never closed", unclosed)));
        }

        Ok(Self {
            nodes,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            let event = match node {
                Node::Element(element) => {
                    let start = if element.modified {
                        element.rebuild()
                    } else {
                        element.raw.clone()
                    };
                    if element.self_closing {
                        Event::Empty(start)
                    } else {
                        Event::Start(start)
                    }
                }
                Node::Other(event) => event.clone(),
            };
            writer
                .write_event(event)
                .map_err(|e| DocumentError::Serialize(e.to_string()))?;
        }
        Ok(writer.into_inner())
    }

    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).map_err(|e| DocumentError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn element(&self, id: ElementId) -> Option<&Element> {
        match self.nodes.get(id.0) {
            Some(Node::Element(element)) => Some(element),
            _ => None,
        }
    }
}

fn read_element(
    start: BytesStart<'_>,
    parent: Option<&String>,
    self_closing: bool,
) -> Result<Element, String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("invalid attribute in <{}>: {}", name, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("invalid value for '{}' in <{}>: {}", key, name, e))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        parent: parent.cloned(),
        attributes,
        self_closing,
        modified: false,
        raw: start.into_owned(),
    })
}

impl StructuredDocument for XmlDocument {
    fn elements(&self, parent: &str, tag: &str) -> Vec<ElementId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| match node {
                Node::Element(e) if e.name == tag && e.parent.as_deref() == Some(parent) => {
                    Some(ElementId(i))
                }
                _ => None,
            })
            .collect()
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<&str> {
        self.element(element)?
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn set_attribute(
        &mut self,
        element: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), DocumentError> {
        let Some(Node::Element(target)) = self.nodes.get_mut(element.0) else {
            return Err(DocumentError::UnknownElement(element));
        };
        match target.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) if existing == value => return Ok(()),
            Some((_, existing)) => *existing = value.to_string(),
            None => target
                .attributes
                .push((name.to_string(), value.to_string())),
        }
        target.modified = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const FIELD: &str = r#"<?xml version="1.0"?>
<ForceField>
 <!-- generated -->
 <AtomTypes>
  <Type name="c3" class="CT" element="C" mass="12.011"/>
 </AtomTypes>
 <LennardJonesForce lj14scale="0.5">
  <Atom class="CT" sigma="0.3500" epsilon="0.27614"/>
  <Atom class="HC" sigma="0.2500" epsilon="0.12552"/>
 </LennardJonesForce>
</ForceField>
"#;

    fn doc() -> XmlDocument {
        XmlDocument::parse(FIELD, Path::new("field.xml")).unwrap()
    }

    #[test]
    fn unmodified_document_round_trips_byte_for_byte() {
        let bytes = doc().to_bytes().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), FIELD);
    }

    #[test]
    fn elements_are_selected_by_parent_and_tag() {
        let d = doc();
        let atoms = d.elements("LennardJonesForce", "Atom");
        assert_eq!(atoms.len(), 2);
        assert_eq!(d.attribute(atoms[1], "class"), Some("HC"));
        assert!(d.elements("ForceField", "Atom").is_empty());
        assert_eq!(d.elements("AtomTypes", "Type").len(), 1);
    }

    #[test]
    fn set_attribute_rewrites_only_the_touched_element() {
        let mut d = doc();
        let atoms = d.elements("LennardJonesForce", "Atom");
        d.set_attribute(atoms[0], "epsilon", "0.13807").unwrap();
        let text = String::from_utf8(d.to_bytes().unwrap()).unwrap();
        assert!(text.contains(r#"<Atom class="CT" sigma="0.3500" epsilon="0.13807"/>"#));
        assert!(text.contains(r#"<Atom class="HC" sigma="0.2500" epsilon="0.12552"/>"#));
        assert!(text.contains("<!-- generated -->"));
    }

    #[test]
    fn set_attribute_appends_missing_attribute() {
        let mut d = doc();
        let id = d.elements("AtomTypes", "Type")[0];
        d.set_attribute(id, "charge", "0.0").unwrap();
        assert_eq!(d.attribute(id, "charge"), Some("0.0"));
    }

    #[test]
    fn set_attribute_on_non_element_fails() {
        let mut d = doc();
        let result = d.set_attribute(ElementId(0), "x", "1");
        assert!(matches!(result, Err(DocumentError::UnknownElement(_))));
        let result = d.set_attribute(ElementId(10_000), "x", "1");
        assert!(matches!(result, Err(DocumentError::UnknownElement(_))));
    }

    #[test]
    fn unclosed_element_is_a_syntax_error() {
        let result = XmlDocument::parse("<ForceField><AtomTypes>", Path::new("bad.xml"));
        assert!(matches!(result, Err(DocumentError::Syntax { .. })));
    }

    #[test]
    fn load_and_save_use_the_filesystem() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("field.xml");
        let output = dir.path().join("out.xml");
        fs::write(&input, FIELD).unwrap();
        let d = XmlDocument::load(&input).unwrap();
        assert_eq!(d.path(), input.as_path());
        d.save(&output).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), FIELD);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempdir().unwrap();
        let result = XmlDocument::load(&dir.path().join("nope.xml"));
        assert!(matches!(result, Err(DocumentError::FileNotFound { .. })));
    }
}
