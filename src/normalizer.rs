//! Folding streaming recognition results into a document.
//!
//! This is a pure, synchronous reducer over [`Document`]:
//! - interim fragments maintain a single trailing placeholder
//! - final fragments replace the placeholder with a classified element
//! - plain dictation merges into a preceding `Action` so it reads as one paragraph
//! - explicit commands always start a new element
//!
//! Nothing here fails. Blank input and bare prefixes are ignored (a bare lead-in such as
//! "Cut to:" still writes its lead), and unknown prefixes fall back to plain `Action` text.

use tracing::debug;

use crate::command::{self, ControlCommand};
use crate::document::Document;
use crate::element::{DocumentElement, ElementKind};
use crate::fragment::RecognitionFragment;
use crate::opts::SessionEndPolicy;

/// What a reducer call did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// The document is unchanged.
    Ignored,
    InterimUpdated,
    /// The placeholder was confirmed as nothing (e.g. a bare prefix) and removed.
    InterimCleared,
    Appended(ElementKind),
    /// Plain dictation was joined onto the previous `Action`.
    Merged,
    DeletedLast,
}

/// Apply one fragment. Every utterance is dictation; control phrases are not recognized.
pub fn on_fragment(doc: &mut Document, fragment: &RecognitionFragment) -> FragmentOutcome {
    apply_fragment(doc, fragment, false)
}

/// Apply one fragment, optionally recognizing control phrases.
///
/// With `control_commands` off, phrases like "delete last line" are dictated as text. With it
/// on, "delete last line" removes the last committed element, which may be a whole merged
/// `Action` paragraph.
pub fn apply_fragment(
    doc: &mut Document,
    fragment: &RecognitionFragment,
    control_commands: bool,
) -> FragmentOutcome {
    if fragment.is_blank() {
        return FragmentOutcome::Ignored;
    }

    let outcome = if fragment.is_final {
        commit(doc, &fragment.text, control_commands)
    } else {
        update_interim(doc, &fragment.text)
    };

    debug!(?outcome, is_final = fragment.is_final, "fragment applied");
    outcome
}

/// Resolve the trailing interim element at the end of a recording session.
pub fn on_session_end(doc: &mut Document) -> FragmentOutcome {
    on_session_end_with(doc, SessionEndPolicy::Finalize)
}

/// Resolve the trailing interim element using the given policy.
///
/// Afterwards the document contains no interim element.
pub fn on_session_end_with(doc: &mut Document, policy: SessionEndPolicy) -> FragmentOutcome {
    let Some(interim) = doc.take_interim() else {
        return FragmentOutcome::Ignored;
    };

    let text = interim.text.trim();
    if text.is_empty() || policy == SessionEndPolicy::Discard {
        debug!(?policy, "interim text dropped at session end");
        return FragmentOutcome::InterimCleared;
    }

    append_or_merge(doc, DocumentElement::action(text), true)
}

fn update_interim(doc: &mut Document, text: &str) -> FragmentOutcome {
    match doc.interim_mut() {
        Some(interim) => {
            if interim.text == text {
                return FragmentOutcome::Ignored;
            }
            interim.text = text.to_owned();
        }
        None => doc.push(DocumentElement::interim(text)),
    }
    FragmentOutcome::InterimUpdated
}

fn commit(doc: &mut Document, text: &str, control_commands: bool) -> FragmentOutcome {
    let had_interim = doc.take_interim().is_some();

    if control_commands && command::parse_control(text) == Some(ControlCommand::DeleteLastLine) {
        return match doc.pop_committed() {
            Some(_) => FragmentOutcome::DeletedLast,
            None if had_interim => FragmentOutcome::InterimCleared,
            None => FragmentOutcome::Ignored,
        };
    }

    match command::classify(text) {
        Some(classified) => {
            let plain = classified.is_plain();
            append_or_merge(doc, classified.element, plain)
        }
        // A bare prefix still confirms the utterance, so the placeholder is gone.
        None if had_interim => FragmentOutcome::InterimCleared,
        None => FragmentOutcome::Ignored,
    }
}

fn append_or_merge(doc: &mut Document, element: DocumentElement, plain: bool) -> FragmentOutcome {
    if plain && element.kind == ElementKind::CONTINUATION {
        if let Some(last) = doc.last_committed_mut() {
            if last.kind == ElementKind::CONTINUATION {
                last.text.truncate(last.text.trim_end().len());
                if !last.text.is_empty() {
                    last.text.push(' ');
                }
                last.text.push_str(&element.text);
                return FragmentOutcome::Merged;
            }
        }
    }

    let kind = element.kind;
    doc.push(element);
    FragmentOutcome::Appended(kind)
}
