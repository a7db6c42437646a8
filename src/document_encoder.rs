use std::io::Write;

use crate::Result;
use crate::document::Document;
use crate::element::DocumentElement;
use crate::json_encoder::JsonEncoder;
use crate::output_type::OutputType;
use crate::text_encoder::TextEncoder;

/// A streaming sink for document elements.
///
/// Encoders receive elements in document order and must produce well-formed output even
/// when `close` is called without any elements. Interim placeholders are never written.
pub trait DocumentEncoder {
    fn write_element(&mut self, element: &DocumentElement) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Encode every committed element of `doc` into `w` using the requested format.
///
/// The encoder is always closed, even if writing an element failed.
pub fn encode_document<W: Write>(doc: &Document, w: W, output_type: OutputType) -> Result<()> {
    match output_type {
        OutputType::Json => {
            let mut encoder = JsonEncoder::new(w);
            let run_res = write_all(doc, &mut encoder);
            merge_run_and_close(run_res, encoder.close())
        }
        OutputType::Text => {
            let mut encoder = TextEncoder::new(w);
            let run_res = write_all(doc, &mut encoder);
            merge_run_and_close(run_res, encoder.close())
        }
    }
}

fn write_all<E: DocumentEncoder>(doc: &Document, encoder: &mut E) -> Result<()> {
    for element in doc.committed_elements() {
        encoder.write_element(element)?;
    }
    Ok(())
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), _) => Err(err),
    }
}
