use std::io::Write;

use crate::Result;
use crate::document_encoder::DocumentEncoder;
use crate::element::{DocumentElement, ElementKind};

const DIALOGUE_INDENT: usize = 10;
const PARENTHETICAL_INDENT: usize = 15;
const CHARACTER_INDENT: usize = 20;
const TRANSITION_INDENT: usize = 45;

/// A `DocumentEncoder` that writes a plain-text screenplay.
///
/// Scene headings and action sit at the left margin; character cues, parentheticals and
/// dialogue are indented; transitions are pushed right. Blocks are separated by a blank
/// line, except that a character cue and the parentheticals/dialogue under it stay together.
pub struct TextEncoder<W: Write> {
    w: W,
    prev: Option<ElementKind>,
    closed: bool,
}

impl<W: Write> TextEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            prev: None,
            closed: false,
        }
    }
}

impl<W: Write> DocumentEncoder for TextEncoder<W> {
    fn write_element(&mut self, element: &DocumentElement) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write element: encoder is already closed",
            ));
        }

        if element.kind.is_interim() {
            return Ok(());
        }

        if let Some(prev) = self.prev {
            if !continues_block(prev, element.kind) {
                writeln!(&mut self.w)?;
            }
        }

        let indent = indent_for(element.kind);
        writeln!(&mut self.w, "{:indent$}{}", "", element.text)?;
        self.w.flush()?;

        self.prev = Some(element.kind);
        Ok(())
    }

    /// Flush the underlying writer. Idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

fn indent_for(kind: ElementKind) -> usize {
    match kind {
        ElementKind::Character => CHARACTER_INDENT,
        ElementKind::Parenthetical => PARENTHETICAL_INDENT,
        ElementKind::Dialogue => DIALOGUE_INDENT,
        ElementKind::Transition => TRANSITION_INDENT,
        ElementKind::SceneHeading | ElementKind::Action | ElementKind::Interim => 0,
    }
}

/// Whether `next` belongs to the same speech block as `prev`.
fn continues_block(prev: ElementKind, next: ElementKind) -> bool {
    matches!(
        prev,
        ElementKind::Character | ElementKind::Parenthetical | ElementKind::Dialogue
    ) && matches!(next, ElementKind::Parenthetical | ElementKind::Dialogue)
}
