//! The screenplay document model.
//!
//! A `Document` is an ordered list of [`DocumentElement`]s. The only structural rule is
//! that at most one `Interim` element exists, and if it exists it is the last element.
//! Mutation that could break that rule stays inside the crate (the normalizer owns it).

use serde::{Deserialize, Serialize};

use crate::element::{DocumentElement, ElementKind};
use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct Document {
    elements: Vec<DocumentElement>,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    elements: Vec<DocumentElement>,
}

impl TryFrom<RawDocument> for Document {
    type Error = Error;

    fn try_from(raw: RawDocument) -> Result<Self> {
        Document::from_committed(raw.elements)
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from already-committed elements.
    ///
    /// Interim elements are transient and cannot be loaded from persisted content.
    pub fn from_committed(elements: Vec<DocumentElement>) -> Result<Self> {
        if let Some(idx) = elements.iter().position(|el| el.kind.is_interim()) {
            return Err(Error::validation(format!(
                "element {idx} is an interim placeholder and cannot be persisted"
            )));
        }
        Ok(Self { elements })
    }

    pub fn elements(&self) -> &[DocumentElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The trailing interim placeholder, if speech is in progress.
    pub fn interim(&self) -> Option<&DocumentElement> {
        self.elements.last().filter(|el| el.kind.is_interim())
    }

    pub fn has_interim(&self) -> bool {
        self.interim().is_some()
    }

    /// Iterate over committed elements only.
    pub fn committed_elements(&self) -> impl Iterator<Item = &DocumentElement> {
        self.elements.iter().filter(|el| !el.kind.is_interim())
    }

    /// A copy of this document with any interim placeholder dropped.
    pub fn committed(&self) -> Document {
        Document {
            elements: self.committed_elements().cloned().collect(),
        }
    }

    /// Reset to an empty element list.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub(crate) fn interim_mut(&mut self) -> Option<&mut DocumentElement> {
        self.elements.last_mut().filter(|el| el.kind.is_interim())
    }

    pub(crate) fn take_interim(&mut self) -> Option<DocumentElement> {
        if self.has_interim() {
            self.elements.pop()
        } else {
            None
        }
    }

    /// The last committed element. Callers must have removed the interim first.
    pub(crate) fn last_committed_mut(&mut self) -> Option<&mut DocumentElement> {
        debug_assert!(!self.has_interim());
        self.elements.last_mut()
    }

    pub(crate) fn pop_committed(&mut self) -> Option<DocumentElement> {
        debug_assert!(!self.has_interim());
        self.elements.pop()
    }

    /// Append an element, keeping the interim placeholder last.
    pub(crate) fn push(&mut self, element: DocumentElement) {
        debug_assert!(
            element.kind.is_interim() || !self.has_interim(),
            "committed element pushed after an interim placeholder"
        );
        debug_assert!(!(element.kind.is_interim() && self.has_interim()));
        self.elements.push(element);
    }
}

impl From<Document> for Vec<DocumentElement> {
    fn from(doc: Document) -> Self {
        doc.elements
    }
}
