//! `voicescript` — turns streaming speech recognition into a structured screenplay.
//!
//! This crate provides:
//! - A screenplay document model (scene headings, action, characters, dialogue, ...)
//! - A spoken command-prefix grammar (`"Int: kitchen"` → `INT. KITCHEN`)
//! - A deterministic reducer that folds interim/final recognition fragments into a document
//! - Recording sessions driven by an injected speech-recognition capability
//! - Pluggable document encoders (JSON, plain-text screenplay)
//! - A small document store for the HTTP backend
//!
//! The reducer never fails: blank fragments are ignored and unknown prefixes fall back to
//! plain action text. Errors only come from the surfaces around it.

mod error;

// Document model.
pub mod document;
pub mod element;
pub mod fragment;

// Dictation: grammar, reducer, sessions.
pub mod command;
pub mod normalizer;
pub mod opts;
pub mod recognizer;
pub mod session;

// Output selection and encoders.
pub mod document_encoder;
pub mod json_encoder;
pub mod output_type;
pub mod text_encoder;

// Persistence and recorded inputs.
pub mod storage;
pub mod transcript;

// Logging configuration (binaries opt in).
#[cfg(feature = "logging")]
pub mod logging;

pub use document::Document;
pub use element::{DocumentElement, ElementKind};
pub use error::{Error, Result};
pub use fragment::RecognitionFragment;
pub use normalizer::{FragmentOutcome, on_fragment, on_session_end};
pub use opts::{Opts, SessionEndPolicy};
pub use output_type::OutputType;
pub use recognizer::{Recognizer, ScriptedRecognizer};
pub use session::{RecordingSession, SessionState};

#[cfg(feature = "logging")]
pub use logging::init as init_logging;
