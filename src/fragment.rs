use serde::{Deserialize, Serialize};

/// One speech-recognition callback payload.
///
/// Interim text is the engine's current best guess for the whole utterance, so it
/// replaces (rather than extends) any earlier interim text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionFragment {
    pub text: String,

    #[serde(rename = "isFinal", alias = "is_final", default)]
    pub is_final: bool,
}

impl RecognitionFragment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    /// Whether this fragment carries no speech at all.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
