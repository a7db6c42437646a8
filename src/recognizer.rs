use std::collections::VecDeque;

use crate::Result;
use crate::fragment::RecognitionFragment;

/// Pluggable speech-recognition capability used by [`crate::RecordingSession`].
///
/// A recognizer turns live audio into [`RecognitionFragment`]s. The session owns exactly one
/// recognizer and drives its lifecycle; no recognizer is shared between sessions.
///
/// Implementations own their own restart behavior (e.g. re-arming after an engine timeout);
/// the session only sees `start`, `stop` and the fragments delivered in between.
pub trait Recognizer {
    /// Begin delivering fragments.
    ///
    /// Failures (permission denied, no microphone) leave the session idle.
    fn start(&mut self) -> Result<()>;

    /// Stop delivering fragments. Called once per session stop.
    fn stop(&mut self) -> Result<()>;

    /// Return the next fragment that is ready, if any.
    fn poll(&mut self) -> Option<RecognitionFragment>;
}

/// A `Recognizer` that replays a prepared list of fragments.
///
/// Used to replay recorded transcripts (CLI, HTTP ingestion) and to drive sessions
/// deterministically in tests.
#[derive(Debug, Default)]
pub struct ScriptedRecognizer {
    pending: VecDeque<RecognitionFragment>,
    running: bool,
    start_error: Option<String>,
}

impl ScriptedRecognizer {
    pub fn new(fragments: impl IntoIterator<Item = RecognitionFragment>) -> Self {
        Self {
            pending: fragments.into_iter().collect(),
            running: false,
            start_error: None,
        }
    }

    /// A recognizer whose `start` always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            start_error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Queue more fragments behind the ones already pending.
    pub fn push(&mut self, fragment: RecognitionFragment) {
        self.pending.push_back(fragment);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl Recognizer for ScriptedRecognizer {
    fn start(&mut self) -> Result<()> {
        if let Some(message) = &self.start_error {
            return Err(crate::Error::recognizer(message.clone()));
        }
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.running = false;
        Ok(())
    }

    fn poll(&mut self) -> Option<RecognitionFragment> {
        if !self.running {
            return None;
        }
        self.pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_nothing_until_started() -> anyhow::Result<()> {
        let mut r = ScriptedRecognizer::new([RecognitionFragment::final_text("hi")]);
        assert_eq!(r.poll(), None);
        r.start()?;
        assert_eq!(r.poll(), Some(RecognitionFragment::final_text("hi")));
        assert_eq!(r.poll(), None);
        Ok(())
    }

    #[test]
    fn stop_holds_back_remaining_fragments() -> anyhow::Result<()> {
        let mut r = ScriptedRecognizer::new([
            RecognitionFragment::interim("a"),
            RecognitionFragment::final_text("a b"),
        ]);
        r.start()?;
        r.poll();
        r.stop()?;
        assert_eq!(r.poll(), None);
        assert_eq!(r.remaining(), 1);
        Ok(())
    }

    #[test]
    fn failing_recognizer_reports_error() {
        let mut r = ScriptedRecognizer::failing("not-allowed");
        let err = r.start().unwrap_err();
        assert!(err.to_string().contains("not-allowed"));
        assert!(!r.is_running());
    }
}
