use std::path::PathBuf;
use thiserror::Error;

/// Opaque handle to one element of a structured document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Force field document not found: '{}'", path.display())]
    FileNotFound { path: PathBuf },

    #[error("File I/O error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed document '{}': {message}", path.display())]
    Syntax { path: PathBuf, message: String },

    #[error("Element {0:?} does not exist in the document")]
    UnknownElement(ElementId),

    #[error("Failed to serialize document: {0}")]
    Serialize(String),
}

/// A structured document exposing named elements and their attributes.
///
/// Elements are addressed by their own tag and the tag of their direct parent, which is
/// all the scaling pass needs from a force-field file. Handles returned by
/// [`StructuredDocument::elements`] stay valid across attribute updates.
pub trait StructuredDocument {
    /// Returns every element named `tag` whose parent is named `parent`, in document order.
    fn elements(&self, parent: &str, tag: &str) -> Vec<ElementId>;

    /// Returns the value of an attribute, or `None` if the element or attribute is absent.
    fn attribute(&self, element: ElementId, name: &str) -> Option<&str>;

    /// Sets an attribute value, appending the attribute if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnknownElement`] if the handle does not name an element.
    fn set_attribute(
        &mut self,
        element: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), DocumentError>;
}
