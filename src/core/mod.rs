//! Core session engine with zero optional dependencies.
//!
//! This module provides the fundamental building blocks:
//! - [`Session`] - Command dispatch and session state
//! - [`Value`] / [`format_value`] - Evaluator value model and inspector
//! - [`HistoryStore`] - Persisted, navigable command history
//! - [`CompletionEngine`] - Symbol completion over the input line
//! - [`Transcript`] - Newest-first transcript with anchored insertion
//! - Events for communication between layers

mod value;
mod inspect;
mod history;
mod complete;
mod transcript;
mod dispatch;
mod events;

pub use value::{Value, ListRef, MapRef, OpaqueRef, OpaqueValue, PropertyError};
pub use inspect::{format_value, CIRCULAR_MARKER};
pub use history::{HistoryStore, Direction, NavOutcome};
pub use complete::{CompletionEngine, CompletionState, Suggestion};
pub use transcript::{Transcript, TranscriptEntry, EntryKind, EchoId, ResponseKind};
pub use dispatch::{
    Session, Evaluator, EvalError, EvaluatorResponse, ResponsePoster,
    CommandTable, CommandArgs, InternalHandler, escape_control, COMMAND_SIGIL,
};
pub use events::{
    ReplInputEvent, ReplOutputEvent, OutputKind, TranscriptClearedEvent,
    ReplEventsPlugin,
};
