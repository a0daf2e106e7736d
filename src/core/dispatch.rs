//! Command dispatch and session state.
//!
//! [`Session`] owns the transcript, history, completion engine, and the
//! pluggable [`Evaluator`]. A submitted line is echoed, then routed: lines
//! starting with the `:` sigil run built-in commands synchronously, anything
//! else goes to the evaluator. Evaluator results arrive asynchronously over a
//! channel and are pumped into the transcript once per frame, anchored to the
//! command that produced them.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use bevy::prelude::*;

use super::complete::{CompletionEngine, Suggestion};
use super::events::OutputKind;
use super::history::{Direction, HistoryStore, NavOutcome};
use super::inspect::format_value;
use super::transcript::{EchoId, ResponseKind, Transcript};
use super::value::Value;

/// Prefix that routes a line to built-in commands instead of the evaluator.
pub const COMMAND_SIGIL: char = ':';

/// An evaluation failure reported synchronously by the evaluator.
#[derive(Debug, Clone)]
pub struct EvalError {
    /// The evaluator's message.
    pub message: String,
}

impl EvalError {
    /// Create an error from the evaluator's message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

/// The language backend of a session.
///
/// `eval` may answer immediately through the [`ResponsePoster`] handed out at
/// install time, later from another thread, several times, or never. A
/// synchronous `Err` is rendered as an error response right away.
pub trait Evaluator: Send + Sync {
    /// Evaluate one command line. `anchor` identifies the command's echo and
    /// must be carried on every response this evaluation produces.
    fn eval(&mut self, command: &str, anchor: EchoId) -> Result<(), EvalError>;
}

/// Placeholder evaluator used until a real one is installed.
struct NoEvaluator;

impl Evaluator for NoEvaluator {
    fn eval(&mut self, _command: &str, _anchor: EchoId) -> Result<(), EvalError> {
        Err(EvalError::new("no evaluator installed"))
    }
}

/// How an asynchronous evaluator response should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PostKind {
    Info,
    Error,
    Log,
}

/// One asynchronous answer from the evaluator.
#[derive(Debug, Clone)]
pub struct EvaluatorResponse {
    anchor: EchoId,
    kind: PostKind,
    value: Value,
    verbose: bool,
}

impl EvaluatorResponse {
    /// A result value. Opaque objects get the verbose property dump.
    pub fn info(anchor: EchoId, value: Value) -> Self {
        Self {
            anchor,
            kind: PostKind::Info,
            value,
            verbose: true,
        }
    }

    /// A failure value, rendered compactly.
    pub fn error(anchor: EchoId, value: Value) -> Self {
        Self {
            anchor,
            kind: PostKind::Error,
            value,
            verbose: false,
        }
    }

    /// A log line emitted during evaluation, rendered compactly.
    pub fn log(anchor: EchoId, value: Value) -> Self {
        Self {
            anchor,
            kind: PostKind::Log,
            value,
            verbose: false,
        }
    }
}

/// Cloneable sender handed to evaluators for posting responses.
#[derive(Debug, Clone)]
pub struct ResponsePoster {
    sender: Sender<EvaluatorResponse>,
}

impl ResponsePoster {
    /// Post a response. Silently dropped if the session is gone.
    pub fn post(&self, response: EvaluatorResponse) {
        let _ = self.sender.send(response);
    }
}

/// Arguments passed to a built-in command handler.
#[derive(Debug, Clone)]
pub struct CommandArgs<'a> {
    /// The raw line, sigil and command name included.
    raw: &'a str,
    /// Parsed arguments (excluding the command name).
    args: Vec<&'a str>,
}

impl<'a> CommandArgs<'a> {
    /// Create new command args from a raw line and parsed arguments.
    pub fn new(raw: &'a str, args: Vec<&'a str>) -> Self {
        Self { raw, args }
    }

    /// Get the raw line.
    #[inline]
    pub fn raw(&self) -> &str {
        self.raw
    }

    /// Get the number of arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Check if there are no arguments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Get an argument by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).copied()
    }

    /// Iterate over arguments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.args.iter().copied()
    }

    /// Join all arguments with a separator.
    pub fn join(&self, separator: &str) -> String {
        self.args.join(separator)
    }
}

/// Type alias for built-in command handler functions.
///
/// Handlers run synchronously with full access to the session and return the
/// response text, or `None` for no response.
pub type InternalHandler = Box<dyn Fn(&CommandArgs, &mut Session) -> Option<String> + Send + Sync>;

/// Named built-in commands, stored apart from the session state they mutate.
#[derive(Default)]
pub struct CommandTable {
    handlers: HashMap<String, InternalHandler>,
}

impl CommandTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard built-ins.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register("help", |_args, session| Some(session.help_text()));
        table.register("about", |_args, _session| {
            Some(
                "an embeddable read-eval-print session engine, \
                 after jsconsole by @rem"
                    .to_string(),
            )
        });
        table.register("history", |_args, session| {
            Some(session.history.list().collect::<Vec<_>>().join("\n"))
        });
        table.register("system", |_args, session| {
            // Asks the evaluator to describe itself; the answer arrives
            // asynchronously under the same anchor.
            if let Some(anchor) = session.transcript.anchor() {
                let _ = session.evaluator.eval("(system)", anchor);
            }
            Some("evaluator system configuration:".to_string())
        });
        table.register("clear", |_args, session| {
            // Deferred: the flag is applied after this response lands, so
            // the wipe takes everything including the clear exchange itself.
            session.pending_clear = true;
            Some("clearing...".to_string())
        });
        table
    }

    /// Register a handler under a name, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&CommandArgs, &mut Session) -> Option<String> + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    /// Take a handler out for execution.
    pub fn take(&mut self, name: &str) -> Option<InternalHandler> {
        self.handlers.remove(name)
    }

    /// Put a handler back after execution.
    pub fn put(&mut self, name: &str, handler: InternalHandler) {
        self.handlers.insert(name.to_string(), handler);
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// One read-eval-print session: transcript, history, completion, dispatch.
#[derive(Resource)]
pub struct Session {
    transcript: Transcript,
    history: HistoryStore,
    completion: CompletionEngine,
    commands: CommandTable,
    evaluator: Box<dyn Evaluator>,
    // Receiver is not Sync; the lock makes the session a valid resource.
    responses: Mutex<Receiver<EvaluatorResponse>>,
    poster: ResponsePoster,
    outbox: Vec<(OutputKind, String)>,
    pending_clear: bool,
}

impl Session {
    /// Create a session over the given history store, with the standard
    /// built-ins and no evaluator.
    pub fn new(history: HistoryStore) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            transcript: Transcript::new(),
            history,
            completion: CompletionEngine::new(),
            commands: CommandTable::with_builtins(),
            evaluator: Box::new(NoEvaluator),
            responses: Mutex::new(receiver),
            poster: ResponsePoster { sender },
            outbox: Vec::new(),
            pending_clear: false,
        }
    }

    /// Install the language backend.
    pub fn set_evaluator(&mut self, evaluator: impl Evaluator + 'static) {
        self.evaluator = Box::new(evaluator);
    }

    /// The poster evaluators use to answer asynchronously.
    pub fn poster(&self) -> ResponsePoster {
        self.poster.clone()
    }

    /// Register an additional built-in command.
    pub fn register_command<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&CommandArgs, &mut Session) -> Option<String> + Send + Sync + 'static,
    {
        self.commands.register(name, handler);
    }

    /// Submit a command line: echo it, dispatch it, record it in history.
    pub fn submit(&mut self, command: &str) {
        self.post(command, false);
    }

    /// Submit a command line without recording it in history.
    pub fn submit_blind(&mut self, command: &str) {
        self.post(command, true);
    }

    fn post(&mut self, command: &str, blind: bool) {
        let command = command.trim();
        if command.is_empty() {
            return;
        }

        let anchor = self.transcript.append_echo(command);
        self.outbox.push((OutputKind::Echo, command.to_string()));

        if let Some(rest) = command.strip_prefix(COMMAND_SIGIL) {
            self.run_internal(command, rest, anchor);
        } else if let Err(error) = self.evaluator.eval(command, anchor) {
            self.respond(anchor, ResponseKind::Error, escape_control(&error.message));
        }

        if !blind {
            self.history.record(command);
        }
        self.history.reset_cursor();
    }

    fn run_internal(&mut self, raw: &str, rest: &str, anchor: EchoId) {
        let mut parts = rest.split_whitespace();
        let Some(name) = parts.next() else {
            return;
        };
        let args: Vec<&str> = parts.collect();

        // The handler is taken out of the table so it can borrow the whole
        // session, then restored. An unknown name is a silent no-op.
        let Some(handler) = self.commands.take(name) else {
            return;
        };
        let reply = handler(&CommandArgs::new(raw, args), self);
        self.commands.put(name, handler);

        if let Some(reply) = reply {
            self.respond(anchor, ResponseKind::Info, reply);
        }
    }

    /// Post a response to a past command without echoing or recording
    /// anything, as when re-rendering output for a command run earlier.
    pub fn replay(&mut self, anchor: EchoId, kind: ResponseKind, body: impl Into<String>) {
        self.respond(anchor, kind, body.into());
    }

    fn respond(&mut self, anchor: EchoId, kind: ResponseKind, body: String) {
        self.transcript.append_response(anchor, kind, body.clone());
        let output_kind = match kind {
            ResponseKind::Info => OutputKind::Info,
            ResponseKind::Error => OutputKind::Error,
        };
        self.outbox.push((output_kind, body));
    }

    /// Drain pending evaluator responses into the transcript.
    pub fn pump(&mut self) {
        let drained: Vec<EvaluatorResponse> = match self.responses.lock() {
            Ok(receiver) => receiver.try_iter().collect(),
            Err(_) => return,
        };

        for response in drained {
            let body = format_value(&response.value, !response.verbose);
            match response.kind {
                PostKind::Info => self.respond(response.anchor, ResponseKind::Info, body),
                PostKind::Error => self.respond(response.anchor, ResponseKind::Error, body),
                PostKind::Log => {
                    self.transcript.append_log(Some(response.anchor), body.clone());
                    self.outbox.push((OutputKind::Log, body));
                }
            }
        }
    }

    /// Append a captured host log line, anchored to the newest echo if any.
    pub fn append_log(&mut self, body: impl Into<String>) {
        let body = body.into();
        self.transcript.append_log(self.transcript.anchor(), body.clone());
        self.outbox.push((OutputKind::Log, body));
    }

    /// Move the history cursor and report what the input line should show.
    pub fn navigate_history(&mut self, direction: Direction) -> NavOutcome {
        self.history.navigate(direction)
    }

    /// Ask for a completion of `input`.
    pub fn complete(&mut self, input: &str, tab: bool, shift: bool) -> Suggestion {
        self.completion.suggest(input, tab, shift)
    }

    /// Commit the previewed completion onto `input`.
    pub fn accept_completion(&mut self, input: &str) -> Option<String> {
        self.completion.accept(input)
    }

    /// Replace the completion symbol table.
    pub fn set_symbols(&mut self, symbols: Vec<String>) {
        self.completion.set_symbols(symbols);
    }

    /// Output lines produced since the last flush, oldest first.
    pub fn take_outbox(&mut self) -> Vec<(OutputKind, String)> {
        std::mem::take(&mut self.outbox)
    }

    /// Apply a deferred `:clear`, wiping the transcript. Returns whether a
    /// clear was pending.
    pub fn apply_pending_clear(&mut self) -> bool {
        if !std::mem::take(&mut self.pending_clear) {
            return false;
        }
        self.transcript.clear();
        true
    }

    /// The transcript, newest entries first.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The command history.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    fn help_text(&self) -> String {
        let mut lines = vec![format!(
            "built-in commands (prefix with '{}'):",
            COMMAND_SIGIL
        )];
        for name in self.commands.names() {
            lines.push(format!("  {}{}", COMMAND_SIGIL, name));
        }
        lines.push("anything else is sent to the evaluator".to_string());
        lines.join("\n")
    }
}

/// Escape control characters so error messages stay on one line, keeping
/// newlines and tabs readable.
pub fn escape_control(text: &str) -> String {
    text.chars()
        .flat_map(|c| {
            if c.is_control() && c != '\n' && c != '\t' {
                c.escape_default().collect::<Vec<char>>()
            } else {
                vec![c]
            }
        })
        .collect()
}
