use crate::output_type::OutputType;

/// What happens to unconfirmed interim text when a recording session stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionEndPolicy {
    /// Commit the interim text as `Action`, merging into a preceding `Action`.
    #[default]
    Finalize,

    /// Drop the interim text.
    Discard,
}

/// Options that control how dictation is folded into a document.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI and server map their inputs into this type so other frontends (tests,
/// embedding applications) can construct it programmatically.
#[derive(Debug, Clone)]
pub struct Opts {
    /// Policy applied to a dangling interim element on session end.
    pub session_end_policy: SessionEndPolicy,

    /// Whether spoken control phrases (e.g. "delete last line") edit the document.
    ///
    /// Off by default: such phrases are then dictated as plain text.
    pub enable_control_commands: bool,

    /// The format [`crate::RecordingSession::encode`] writes.
    pub output_type: OutputType,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            session_end_policy: SessionEndPolicy::Finalize,
            enable_control_commands: false,
            output_type: OutputType::Json,
        }
    }
}
