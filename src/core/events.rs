//! Session events for communication between layers.
//!
//! Events are the primary mechanism for:
//! - Host/UI -> Core: command input
//! - Core -> Host/UI: transcript output, clear notifications

use bevy::prelude::*;

/// Event sent when a command line is submitted to the session.
///
/// The session system will echo, dispatch, and record this command.
///
/// # Examples
///
/// ```ignore
/// fn submit_command(mut events: MessageWriter<ReplInputEvent>) {
///     events.write(ReplInputEvent::new("(+ 1 2)"));
/// }
/// ```
#[derive(Message, Debug, Clone)]
pub struct ReplInputEvent {
    /// The raw command line to execute.
    pub command: String,
    /// Run without recording the command in history.
    pub blind: bool,
}

impl ReplInputEvent {
    /// Create a new input event.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            blind: false,
        }
    }

    /// Create an input event that skips history recording.
    pub fn blind(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            blind: true,
        }
    }
}

/// Presentation class of a transcript output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    /// The echo of a submitted command.
    Echo,
    /// An ordinary result or informational response.
    #[default]
    Info,
    /// An evaluation or dispatch failure.
    Error,
    /// A captured log line.
    Log,
}

/// Event sent when a new line was added to the transcript.
///
/// # Examples
///
/// ```ignore
/// fn render_output(mut events: MessageReader<ReplOutputEvent>) {
///     for event in events.read() {
///         println!("{:?}: {}", event.kind, event.body);
///     }
/// }
/// ```
#[derive(Message, Debug, Clone)]
pub struct ReplOutputEvent {
    /// The presentation class of the line.
    pub kind: OutputKind,
    /// The display text.
    pub body: String,
}

impl ReplOutputEvent {
    /// Create a new output event.
    pub fn new(kind: OutputKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            body: body.into(),
        }
    }
}

/// Event sent when the transcript was cleared.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct TranscriptClearedEvent;

/// Plugin that registers all session events.
pub struct ReplEventsPlugin;

impl Plugin for ReplEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ReplInputEvent>()
            .add_message::<ReplOutputEvent>()
            .add_message::<TranscriptClearedEvent>();
    }
}
