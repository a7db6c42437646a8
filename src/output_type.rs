use std::str::FromStr;

use crate::Error;

/// The supported output formats for encoded documents.
///
/// Each variant maps to a concrete `DocumentEncoder` implementation. With the `cli`
/// feature the enum doubles as a `clap` flag value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// `{"elements":[{"type":..,"content":..}]}`, the persistence wire format.
    #[default]
    Json,

    /// A plain-text screenplay layout.
    Text,
}

impl OutputType {
    pub fn content_type(self) -> &'static str {
        match self {
            OutputType::Json => "application/json; charset=utf-8",
            OutputType::Text => "text/plain; charset=utf-8",
        }
    }
}

impl FromStr for OutputType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputType::Json),
            "text" | "txt" => Ok(OutputType::Text),
            other => Err(Error::validation(format!(
                "unknown output type '{other}' (expected 'json' or 'text')"
            ))),
        }
    }
}
