use std::io::Write;

use crate::Result;
use crate::document_encoder::DocumentEncoder;
use crate::element::DocumentElement;

/// A `DocumentEncoder` that writes the persistence wire format.
///
/// Design:
/// - We stream each element straight to the writer instead of building the whole document
///   as a `serde_json::Value` first.
/// - The encoder is stateful so the wrapper object and the commas between elements come out
///   right no matter how many elements are written.
///
/// Example output:
/// ```json
/// {"elements":[{"type":"character","content":"JOHN"},{"type":"dialogue","content":"Hi."}]}
/// ```
pub struct JsonEncoder<W: Write> {
    w: W,

    /// Whether the `{"elements":[` preamble has been written.
    started: bool,

    /// Whether the next element is the first one (no leading comma).
    first: bool,

    /// Once closed, no further writes are allowed.
    closed: bool,
}

impl<W: Write> JsonEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
        }
    }

    /// Write the preamble lazily so an empty document still yields `{"elements":[]}`.
    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(br#"{"elements":["#)?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> DocumentEncoder for JsonEncoder<W> {
    fn write_element(&mut self, element: &DocumentElement) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write element: encoder is already closed",
            ));
        }

        if element.kind.is_interim() {
            return Ok(());
        }

        self.start_if_needed()?;

        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        serde_json::to_writer(&mut self.w, element)?;
        self.w.flush()?;

        Ok(())
    }

    /// Finalize the JSON object. Idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.write_all(b"]}")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}
