use serde::{Deserialize, Serialize};

/// The structural role of a screenplay element.
///
/// Wire names are kebab-case (`scene-heading`, `action`, ...) so persisted documents
/// stay compatible with the editor front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    SceneHeading,
    Action,
    Character,
    Parenthetical,
    Dialogue,
    Transition,

    /// Transient placeholder for in-progress speech. Never persisted.
    Interim,
}

impl ElementKind {
    /// The kind plain dictation falls back to and merges into.
    pub const CONTINUATION: ElementKind = ElementKind::Action;

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::SceneHeading => "scene-heading",
            ElementKind::Action => "action",
            ElementKind::Character => "character",
            ElementKind::Parenthetical => "parenthetical",
            ElementKind::Dialogue => "dialogue",
            ElementKind::Transition => "transition",
            ElementKind::Interim => "interim",
        }
    }

    pub fn is_interim(self) -> bool {
        self == ElementKind::Interim
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed block of screenplay text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,

    #[serde(rename = "content")]
    pub text: String,
}

impl DocumentElement {
    pub fn new(kind: ElementKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Interim, text)
    }

    pub fn action(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Action, text)
    }
}
