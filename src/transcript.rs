//! Recorded fragment streams.
//!
//! A transcript is JSON Lines: one `{"text": "...", "isFinal": true|false}` object per
//! line, in the order the speech engine delivered them. Blank lines are skipped.

use std::io::BufRead;

use crate::fragment::RecognitionFragment;
use crate::{Error, Result};

/// Parse every fragment from a JSON Lines reader.
pub fn read_fragments<R: BufRead>(r: R) -> Result<Vec<RecognitionFragment>> {
    let mut fragments = Vec::new();
    for (idx, line) in r.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fragment: RecognitionFragment = serde_json::from_str(line)
            .map_err(|err| Error::validation(format!("transcript line {}: {err}", idx + 1)))?;
        fragments.push(fragment);
    }
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lines_in_order_and_skips_blanks() -> anyhow::Result<()> {
        let raw = "{\"text\":\"sce\",\"isFinal\":false}\n\n{\"text\":\"Scene: roof\",\"isFinal\":true}\n";
        let fragments = read_fragments(raw.as_bytes())?;
        assert_eq!(
            fragments,
            vec![
                RecognitionFragment::interim("sce"),
                RecognitionFragment::final_text("Scene: roof"),
            ]
        );
        Ok(())
    }

    #[test]
    fn malformed_line_names_its_line_number() {
        let raw = "{\"text\":\"ok\",\"isFinal\":true}\nnot json\n";
        let err = read_fragments(raw.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("transcript line 2"), "{err}");
    }
}
