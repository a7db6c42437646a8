//! Recording sessions: one recognizer, one document, one `Idle → Active → Idle` lifecycle.
//!
//! The session is the only writer of its document. Fragments are applied strictly one at a
//! time, and once `stop` has resolved the interim element any late fragment is dropped, so
//! nothing reaches the document after session end.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::Result;
use crate::document::Document;
use crate::document_encoder::encode_document;
use crate::element::ElementKind;
use crate::fragment::RecognitionFragment;
use crate::normalizer::{self, FragmentOutcome};
use crate::opts::Opts;
use crate::recognizer::{Recognizer, ScriptedRecognizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Active,
}

/// An explicit command recognized during dictation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRecord {
    /// Element kind wire name (e.g. `scene-heading`) or `delete-last-line`.
    pub command: String,
    pub content: String,
    pub at: DateTime<Utc>,
}

pub struct RecordingSession<R: Recognizer = ScriptedRecognizer> {
    id: Uuid,
    recognizer: R,
    opts: Opts,
    state: SessionState,
    document: Document,
    history: Vec<CommandRecord>,
}

impl<R: Recognizer> RecordingSession<R> {
    /// Create an idle session over an empty document.
    pub fn new(recognizer: R, opts: Opts) -> Self {
        Self::with_document(recognizer, opts, Document::new())
    }

    /// Create an idle session that continues an existing document.
    pub fn with_document(recognizer: R, opts: Opts, document: Document) -> Self {
        Self {
            id: Uuid::new_v4(),
            recognizer,
            opts,
            state: SessionState::Idle,
            document,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Start recording. Starting an active session is a no-op.
    ///
    /// If the recognizer refuses to start, the session stays idle and the document is
    /// untouched.
    pub fn start(&mut self) -> Result<()> {
        if self.is_active() {
            debug!(session = %self.id, "start ignored: already recording");
            return Ok(());
        }

        if let Err(err) = self.recognizer.start() {
            warn!(session = %self.id, error = %err, "recognizer failed to start");
            return Err(err);
        }

        self.state = SessionState::Active;
        info!(session = %self.id, "recording started");
        Ok(())
    }

    /// Stop recording and resolve any pending interim element.
    ///
    /// Stopping an idle session is a no-op, so the session-end handler runs exactly once
    /// per stop. A recognizer that fails to stop is logged, and the document is still
    /// finalized.
    pub fn stop(&mut self) -> FragmentOutcome {
        if !self.is_active() {
            return FragmentOutcome::Ignored;
        }

        self.state = SessionState::Idle;
        if let Err(err) = self.recognizer.stop() {
            warn!(session = %self.id, error = %err, "recognizer failed to stop cleanly");
        }

        let outcome =
            normalizer::on_session_end_with(&mut self.document, self.opts.session_end_policy);
        info!(
            session = %self.id,
            ?outcome,
            elements = self.document.len(),
            "recording stopped"
        );
        outcome
    }

    /// Flip between recording and idle, returning the new state.
    pub fn toggle(&mut self) -> Result<SessionState> {
        if self.is_active() {
            self.stop();
        } else {
            self.start()?;
        }
        Ok(self.state)
    }

    /// Apply one fragment delivered by the speech capability.
    ///
    /// Fragments that arrive while idle are dropped.
    pub fn on_fragment(&mut self, fragment: &RecognitionFragment) -> FragmentOutcome {
        if !self.is_active() {
            debug!(session = %self.id, "fragment dropped: session is idle");
            return FragmentOutcome::Ignored;
        }

        let outcome = normalizer::apply_fragment(
            &mut self.document,
            fragment,
            self.opts.enable_control_commands,
        );
        self.record(outcome);
        outcome
    }

    /// Apply every fragment the recognizer has ready. Returns how many were delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while self.is_active() {
            let Some(fragment) = self.recognizer.poll() else {
                break;
            };
            self.on_fragment(&fragment);
            delivered += 1;
        }
        delivered
    }

    /// Reset the document to an empty element list.
    pub fn clear(&mut self) {
        self.document.clear();
        info!(session = %self.id, "document cleared");
    }

    /// The live document, including any in-progress interim element.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The committed document to hand to persistence.
    pub fn snapshot(&self) -> Document {
        self.document.committed()
    }

    /// Write the committed document in the session's configured output format.
    pub fn encode<W: Write>(&self, w: W) -> Result<()> {
        encode_document(&self.snapshot(), w, self.opts.output_type)
    }

    /// Stop if needed and return the finished document.
    pub fn finish(mut self) -> Document {
        self.stop();
        self.document
    }

    pub fn history(&self) -> &[CommandRecord] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn recognizer_mut(&mut self) -> &mut R {
        &mut self.recognizer
    }

    fn record(&mut self, outcome: FragmentOutcome) {
        let (command, content) = match outcome {
            FragmentOutcome::Appended(kind)
                if !matches!(kind, ElementKind::Action | ElementKind::Dialogue) =>
            {
                let content = self
                    .document
                    .elements()
                    .last()
                    .map(|el| el.text.clone())
                    .unwrap_or_default();
                (kind.as_str().to_owned(), content)
            }
            FragmentOutcome::DeletedLast => ("delete-last-line".to_owned(), String::new()),
            _ => return,
        };

        self.history.push(CommandRecord {
            command,
            content,
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::DocumentElement;
    use crate::opts::SessionEndPolicy;
    use crate::output_type::OutputType;

    fn session(fragments: Vec<RecognitionFragment>) -> RecordingSession {
        RecordingSession::new(ScriptedRecognizer::new(fragments), Opts::default())
    }

    #[test]
    fn fragments_while_idle_are_dropped() {
        let mut s = session(vec![]);
        assert_eq!(
            s.on_fragment(&RecognitionFragment::final_text("hello")),
            FragmentOutcome::Ignored
        );
        assert!(s.document().is_empty());
    }

    #[test]
    fn pump_applies_fragments_in_order() -> anyhow::Result<()> {
        let mut s = session(vec![
            RecognitionFragment::interim("char"),
            RecognitionFragment::final_text("Character: john"),
            RecognitionFragment::interim("hi"),
            RecognitionFragment::final_text("Dialogue: hi there"),
        ]);
        s.start()?;
        assert_eq!(s.pump(), 4);
        assert_eq!(
            s.document().elements(),
            &[
                DocumentElement::new(ElementKind::Character, "JOHN"),
                DocumentElement::new(ElementKind::Dialogue, "hi there"),
            ]
        );
        Ok(())
    }

    #[test]
    fn stop_finalizes_once_and_blocks_late_fragments() -> anyhow::Result<()> {
        let mut s = session(vec![
            RecognitionFragment::final_text("Hello"),
            RecognitionFragment::interim("and then"),
        ]);
        s.start()?;
        s.pump();
        assert_eq!(s.stop(), FragmentOutcome::Merged);
        assert_eq!(s.stop(), FragmentOutcome::Ignored);

        s.on_fragment(&RecognitionFragment::final_text("late"));
        assert_eq!(
            s.document().elements(),
            &[DocumentElement::action("Hello and then")]
        );
        Ok(())
    }

    #[test]
    fn discard_policy_drops_interim_on_stop() -> anyhow::Result<()> {
        let opts = Opts {
            session_end_policy: SessionEndPolicy::Discard,
            ..Opts::default()
        };
        let mut s = RecordingSession::new(
            ScriptedRecognizer::new([RecognitionFragment::interim("maybe")]),
            opts,
        );
        s.start()?;
        s.pump();
        s.stop();
        assert!(s.document().is_empty());
        Ok(())
    }

    #[test]
    fn failed_start_stays_idle() {
        let mut s =
            RecordingSession::new(ScriptedRecognizer::failing("not-allowed"), Opts::default());
        assert!(s.start().is_err());
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.document().is_empty());
    }

    #[test]
    fn toggle_flips_state() -> anyhow::Result<()> {
        let mut s = session(vec![]);
        assert_eq!(s.toggle()?, SessionState::Active);
        assert_eq!(s.toggle()?, SessionState::Idle);
        Ok(())
    }

    #[test]
    fn snapshot_excludes_interim() -> anyhow::Result<()> {
        let mut s = session(vec![
            RecognitionFragment::final_text("Hello"),
            RecognitionFragment::interim("wor"),
        ]);
        s.start()?;
        s.pump();
        assert!(s.document().has_interim());
        assert_eq!(s.snapshot().elements(), &[DocumentElement::action("Hello")]);
        Ok(())
    }

    #[test]
    fn history_records_structural_commands_only() -> anyhow::Result<()> {
        let opts = Opts {
            enable_control_commands: true,
            ..Opts::default()
        };
        let mut s = RecordingSession::new(
            ScriptedRecognizer::new([
                RecognitionFragment::final_text("Int: kitchen"),
                RecognitionFragment::final_text("She cooks."),
                RecognitionFragment::final_text("Says: hello"),
                RecognitionFragment::final_text("delete last line"),
            ]),
            opts,
        );
        s.start()?;
        s.pump();

        let commands: Vec<&str> = s.history().iter().map(|r| r.command.as_str()).collect();
        assert_eq!(commands, ["scene-heading", "delete-last-line"]);
        assert_eq!(s.history()[0].content, "INT. KITCHEN");
        Ok(())
    }

    #[test]
    fn control_phrases_are_dictated_unless_enabled() -> anyhow::Result<()> {
        let mut s = session(vec![
            RecognitionFragment::final_text("Hello"),
            RecognitionFragment::final_text("delete last line"),
        ]);
        s.start()?;
        s.pump();
        assert_eq!(
            s.document().elements(),
            &[DocumentElement::action("Hello delete last line")]
        );
        assert!(s.history().is_empty());
        Ok(())
    }

    #[test]
    fn encode_uses_configured_output_type() -> anyhow::Result<()> {
        let opts = Opts {
            output_type: OutputType::Text,
            ..Opts::default()
        };
        let mut s = RecordingSession::new(
            ScriptedRecognizer::new([
                RecognitionFragment::final_text("Scene: the roof"),
                RecognitionFragment::interim("wind"),
            ]),
            opts,
        );
        s.start()?;
        s.pump();

        let mut text = Vec::new();
        s.encode(&mut text)?;
        assert_eq!(String::from_utf8(text)?, "THE ROOF\n");

        let mut s = session(vec![RecognitionFragment::final_text("Hello")]);
        s.start()?;
        s.pump();
        let mut json = Vec::new();
        s.encode(&mut json)?;
        assert_eq!(
            String::from_utf8(json)?,
            r#"{"elements":[{"type":"action","content":"Hello"}]}"#
        );
        Ok(())
    }

    #[test]
    fn clear_resets_document() -> anyhow::Result<()> {
        let mut s = session(vec![RecognitionFragment::final_text("Hello")]);
        s.start()?;
        s.pump();
        s.clear();
        assert!(s.document().is_empty());
        Ok(())
    }
}
