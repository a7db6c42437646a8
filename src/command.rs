//! Spoken command-prefix grammar.
//!
//! A final utterance such as `"Int: kitchen, night"` is matched case-insensitively against a
//! table of prefixes. The longest matching prefix wins; the prefix is stripped, the rest is
//! trimmed and transformed into the element text. Utterances without a prefix become plain
//! `Action` text.

use crate::element::{DocumentElement, ElementKind};

/// How the remainder of an utterance becomes element text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    AsIs,
    Uppercase,
    /// Uppercase, preceded by a fixed lead-in such as `INT. `.
    Lead(&'static str),
    Parenthesize,
}

impl Transform {
    fn apply(self, text: &str) -> String {
        match self {
            Transform::AsIs => text.to_owned(),
            Transform::Uppercase => text.to_uppercase(),
            Transform::Lead(lead) if text.is_empty() => lead.trim_end().to_owned(),
            Transform::Lead(lead) => format!("{lead}{}", text.to_uppercase()),
            Transform::Parenthesize => {
                if text.starts_with('(') && text.ends_with(')') {
                    text.to_owned()
                } else {
                    format!("({text})")
                }
            }
        }
    }
}

/// One entry of the prefix grammar.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    /// Lowercase spoken prefix, including the trailing colon.
    pub prefix: &'static str,
    pub kind: ElementKind,
    pub transform: Transform,
    pub description: &'static str,
}

const COMMANDS: &[Command] = &[
    Command {
        prefix: "new scene:",
        kind: ElementKind::SceneHeading,
        transform: Transform::Uppercase,
        description: "Creates a scene heading",
    },
    Command {
        prefix: "scene:",
        kind: ElementKind::SceneHeading,
        transform: Transform::Uppercase,
        description: "Creates a scene heading",
    },
    Command {
        prefix: "int:",
        kind: ElementKind::SceneHeading,
        transform: Transform::Lead("INT. "),
        description: "Creates an interior scene heading",
    },
    Command {
        prefix: "ext:",
        kind: ElementKind::SceneHeading,
        transform: Transform::Lead("EXT. "),
        description: "Creates an exterior scene heading",
    },
    Command {
        prefix: "character:",
        kind: ElementKind::Character,
        transform: Transform::Uppercase,
        description: "Creates a character name block",
    },
    Command {
        prefix: "enter:",
        kind: ElementKind::Character,
        transform: Transform::Uppercase,
        description: "Creates a character name block",
    },
    Command {
        prefix: "dialogue:",
        kind: ElementKind::Dialogue,
        transform: Transform::AsIs,
        description: "Creates dialogue for the last character",
    },
    Command {
        prefix: "says:",
        kind: ElementKind::Dialogue,
        transform: Transform::AsIs,
        description: "Creates dialogue for the last character",
    },
    Command {
        prefix: "parenthetical:",
        kind: ElementKind::Parenthetical,
        transform: Transform::Parenthesize,
        description: "Adds a direction for delivery",
    },
    Command {
        prefix: "aside:",
        kind: ElementKind::Parenthetical,
        transform: Transform::Parenthesize,
        description: "Adds a direction for delivery",
    },
    Command {
        prefix: "action:",
        kind: ElementKind::Action,
        transform: Transform::AsIs,
        description: "Starts a new action paragraph",
    },
    Command {
        prefix: "describe:",
        kind: ElementKind::Action,
        transform: Transform::AsIs,
        description: "Starts a new action paragraph",
    },
    Command {
        prefix: "transition:",
        kind: ElementKind::Transition,
        transform: Transform::Uppercase,
        description: "Adds a transition",
    },
    Command {
        prefix: "cut to:",
        kind: ElementKind::Transition,
        transform: Transform::Lead("CUT TO: "),
        description: "Adds a CUT TO transition",
    },
    Command {
        prefix: "fade to:",
        kind: ElementKind::Transition,
        transform: Transform::Lead("FADE TO: "),
        description: "Adds a FADE TO transition",
    },
];

/// The full command table, in display order.
pub fn commands() -> &'static [Command] {
    COMMANDS
}

/// The result of classifying a final utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub element: DocumentElement,

    /// The matched prefix, or `None` for plain dictation.
    pub prefix: Option<&'static str>,
}

impl Classified {
    /// Plain dictation (no prefix) is the only thing allowed to merge into earlier text.
    pub fn is_plain(&self) -> bool {
        self.prefix.is_none()
    }
}

/// Classify a final utterance.
///
/// Returns `None` when there is nothing to write: blank input, or a bare prefix such as
/// `"Scene:"` with no content after it. A bare lead-in prefix (`"Cut to:"`, `"Int:"`) still
/// writes its lead, e.g. `CUT TO:`.
pub fn classify(text: &str) -> Option<Classified> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let Some(cmd) = match_prefix(text) else {
        return Some(Classified {
            element: DocumentElement::new(ElementKind::CONTINUATION, text),
            prefix: None,
        });
    };

    let rest = text[cmd.prefix.len()..].trim();
    if rest.is_empty() && !matches!(cmd.transform, Transform::Lead(_)) {
        return None;
    }

    Some(Classified {
        element: DocumentElement::new(cmd.kind, cmd.transform.apply(rest)),
        prefix: Some(cmd.prefix),
    })
}

fn match_prefix(text: &str) -> Option<&'static Command> {
    COMMANDS
        .iter()
        .filter(|cmd| {
            text.get(..cmd.prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(cmd.prefix))
        })
        .max_by_key(|cmd| cmd.prefix.len())
}

/// Spoken phrases that edit the document instead of adding text to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    DeleteLastLine,
}

/// Match a whole utterance against the control phrases.
///
/// Trailing punctuation is ignored since engines often add a period.
pub fn parse_control(text: &str) -> Option<ControlCommand> {
    let phrase = text
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?' | ','))
        .trim_end();

    if phrase.eq_ignore_ascii_case("delete last line") {
        Some(ControlCommand::DeleteLastLine)
    } else {
        None
    }
}
