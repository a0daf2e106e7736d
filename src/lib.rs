//! An embeddable read-eval-print console session engine for Bevy.
//!
//! The engine owns everything between a line of input and a rendered
//! transcript, with no opinion about either end:
//!
//! - **Session**: echo, dispatch, and built-in `:` commands
//! - **Transcript**: newest-first log with responses anchored to their command
//! - **HistoryStore**: persisted, navigable command history
//! - **CompletionEngine**: prefix completion with tab cycling
//! - **Inspector**: cycle-safe rendering of evaluator values
//!
//! # Features
//!
//! - `capture` (default): funnel host `tracing` logs into the transcript
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_repl::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(ReplPlugin::default())
//!         .add_systems(Startup, install_evaluator)
//!         .run();
//! }
//!
//! fn install_evaluator(mut session: ResMut<Session>) {
//!     let poster = session.poster();
//!     session.set_evaluator(MyLisp::new(poster));
//! }
//!
//! fn submit(mut events: MessageWriter<ReplInputEvent>) {
//!     events.write(ReplInputEvent::new("(+ 1 2)"));
//! }
//! ```

use std::path::PathBuf;

use bevy::prelude::*;

// Core module (always available, zero optional deps)
pub mod core;

// Storage collaborator for history persistence
pub mod persist;

// Log capture (feature-gated)
#[cfg(feature = "capture")]
pub mod logging;

// Re-export core types at crate root for convenience
pub use core::{
    Session, Evaluator, EvalError, EvaluatorResponse, ResponsePoster,
    CommandTable, CommandArgs, InternalHandler, escape_control, COMMAND_SIGIL,
    Value, ListRef, MapRef, OpaqueRef, OpaqueValue, PropertyError,
    format_value, CIRCULAR_MARKER,
    HistoryStore, Direction, NavOutcome,
    CompletionEngine, CompletionState, Suggestion,
    Transcript, TranscriptEntry, EntryKind, EchoId, ResponseKind,
    ReplInputEvent, ReplOutputEvent, OutputKind, TranscriptClearedEvent,
    ReplEventsPlugin,
};

pub use persist::{KeyValueStore, MemoryStore, DisabledStore, FileStore, StorageError};

#[cfg(feature = "capture")]
pub use logging::{custom_log_layer, LogMessage};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::core::{
        Session, Evaluator, EvalError, EvaluatorResponse, ResponsePoster,
        Value, OpaqueValue, format_value,
        Direction, NavOutcome, Suggestion,
        EchoId, ResponseKind,
        ReplInputEvent, ReplOutputEvent, OutputKind, TranscriptClearedEvent,
    };
    pub use crate::ReplPlugin;
}

/// Main session plugin.
///
/// # Configuration
///
/// ```ignore
/// // Ephemeral history
/// ReplPlugin::default()
///
/// // History persisted under ~/.myapp, one file per session key
/// ReplPlugin::default()
///     .with_storage_dir(home.join(".myapp"))
///     .with_history_key("editor")
/// ```
pub struct ReplPlugin {
    history_key: String,
    storage_dir: Option<PathBuf>,
}

impl Default for ReplPlugin {
    fn default() -> Self {
        Self {
            history_key: "history".to_string(),
            storage_dir: None,
        }
    }
}

impl ReplPlugin {
    /// Persist history under this directory instead of keeping it in memory.
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    /// Session key the history is stored under.
    pub fn with_history_key(mut self, key: impl Into<String>) -> Self {
        self.history_key = key.into();
        self
    }
}

impl Plugin for ReplPlugin {
    fn build(&self, app: &mut App) {
        let store: Box<dyn KeyValueStore> = match &self.storage_dir {
            Some(dir) => Box::new(FileStore::new(dir.clone())),
            None => Box::new(MemoryStore::new()),
        };
        let history = HistoryStore::load(store, self.history_key.clone());

        app.insert_resource(Session::new(history))
            .add_plugins(ReplEventsPlugin);

        // Input/dispatch pipeline (three-stage, chained):
        // 1. process_input_events: echo, dispatch, record submitted lines
        // 2. pump_evaluator_responses: drain async answers into the transcript
        // 3. flush_session: fan appended lines out as events, apply clears
        app.add_systems(
            Update,
            (
                process_input_events,
                pump_evaluator_responses,
                flush_session,
            )
                .chain(),
        );

        #[cfg(feature = "capture")]
        app.add_systems(
            Update,
            append_captured_logs
                .after(pump_evaluator_responses)
                .before(flush_session),
        );
    }
}

/// Feed submitted input events into the session.
fn process_input_events(
    mut session: ResMut<Session>,
    mut events: MessageReader<ReplInputEvent>,
) {
    for event in events.read() {
        debug!("repl input: {}", event.command);
        if event.blind {
            session.submit_blind(&event.command);
        } else {
            session.submit(&event.command);
        }
    }
}

/// Drain pending evaluator responses into the transcript.
fn pump_evaluator_responses(mut session: ResMut<Session>) {
    session.pump();
}

/// Append captured host logs to the transcript.
///
/// The reader is optional because [`LogMessage`] is only registered when the
/// host installs [`custom_log_layer`].
#[cfg(feature = "capture")]
fn append_captured_logs(
    mut session: ResMut<Session>,
    logs: Option<MessageReader<LogMessage>>,
) {
    let Some(mut logs) = logs else {
        return;
    };
    for log in logs.read() {
        session.append_log(log.message.clone());
    }
}

/// Fan out lines appended since last frame and apply a deferred clear.
fn flush_session(
    mut session: ResMut<Session>,
    mut outputs: MessageWriter<ReplOutputEvent>,
    mut cleared: MessageWriter<TranscriptClearedEvent>,
) {
    for (kind, body) in session.take_outbox() {
        outputs.write(ReplOutputEvent::new(kind, body));
    }
    if session.apply_pending_clear() {
        cleared.write(TranscriptClearedEvent);
    }
}
