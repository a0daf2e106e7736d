//! Newest-first transcript with anchored response insertion.
//!
//! Every submitted command is echoed at the top of the transcript and becomes
//! the current anchor. Responses and captured logs that belong to a command
//! insert themselves directly below its echo, after any earlier responses to
//! the same command, so late asynchronous output lands next to the command
//! that caused it instead of at the top of the list.

/// Identity of one command echo, used to anchor responses to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EchoId(u64);

/// How a response entry should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Ordinary result or informational output.
    Info,
    /// Evaluation or dispatch failure.
    Error,
}

/// What a transcript entry is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// The echo of a submitted command.
    Echo {
        /// Identity other entries anchor to.
        id: EchoId,
    },
    /// A response to a specific command.
    Response {
        /// Presentation of the response.
        kind: ResponseKind,
        /// The command echo this responds to.
        anchor: EchoId,
    },
    /// A captured log line.
    Log {
        /// The command running when the log was emitted, if any.
        anchor: Option<EchoId>,
    },
}

impl EntryKind {
    /// The echo this entry is anchored to, if any.
    pub fn anchor(&self) -> Option<EchoId> {
        match self {
            EntryKind::Echo { .. } => None,
            EntryKind::Response { anchor, .. } => Some(*anchor),
            EntryKind::Log { anchor } => *anchor,
        }
    }
}

/// One line of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    /// What kind of line this is.
    pub kind: EntryKind,
    /// The display text.
    pub body: String,
}

/// The session transcript, newest entries first.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_id: u64,
    anchor: Option<EchoId>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Echo a submitted command at the top and make it the current anchor.
    pub fn append_echo(&mut self, body: impl Into<String>) -> EchoId {
        let id = EchoId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            0,
            TranscriptEntry {
                kind: EntryKind::Echo { id },
                body: body.into(),
            },
        );
        self.anchor = Some(id);
        id
    }

    /// Insert a response below the echo it belongs to.
    pub fn append_response(&mut self, anchor: EchoId, kind: ResponseKind, body: impl Into<String>) {
        self.insert_after_anchor(
            anchor,
            TranscriptEntry {
                kind: EntryKind::Response { kind, anchor },
                body: body.into(),
            },
        );
    }

    /// Append a captured log line.
    ///
    /// With an anchor it lands below the matching echo like a response;
    /// without one it goes to the back of the transcript.
    pub fn append_log(&mut self, anchor: Option<EchoId>, body: impl Into<String>) {
        let entry = TranscriptEntry {
            kind: EntryKind::Log { anchor },
            body: body.into(),
        };
        match anchor {
            Some(anchor) => self.insert_after_anchor(anchor, entry),
            None => self.entries.push(entry),
        }
    }

    /// Insert after the anchor echo and after everything already anchored to
    /// it, preserving arrival order within one command's output block.
    /// A missing echo (cleared transcript) degrades to insertion at the top.
    fn insert_after_anchor(&mut self, anchor: EchoId, entry: TranscriptEntry) {
        let echo_idx = self
            .entries
            .iter()
            .position(|e| e.kind == EntryKind::Echo { id: anchor });

        let Some(echo_idx) = echo_idx else {
            self.entries.insert(0, entry);
            return;
        };

        let mut idx = echo_idx + 1;
        while idx < self.entries.len() && self.entries[idx].kind.anchor() == Some(anchor) {
            idx += 1;
        }
        self.entries.insert(idx, entry);
    }

    /// The current anchor, newest echo unless the transcript was cleared.
    pub fn anchor(&self) -> Option<EchoId> {
        self.anchor
    }

    /// Remove every entry and forget the anchor. Echo identities are not
    /// reused afterward.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.anchor = None;
    }

    /// The entries, newest first.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bodies(transcript: &Transcript) -> Vec<&str> {
        transcript
            .entries()
            .iter()
            .map(|e| e.body.as_str())
            .collect()
    }

    #[test]
    fn test_echo_goes_to_top() {
        let mut transcript = Transcript::new();
        transcript.append_echo("first");
        transcript.append_echo("second");
        assert_eq!(bodies(&transcript), vec!["second", "first"]);
    }

    #[test]
    fn test_response_lands_below_its_echo() {
        let mut transcript = Transcript::new();
        let a = transcript.append_echo("a");
        transcript.append_echo("b");
        transcript.append_response(a, ResponseKind::Info, "a result");

        assert_eq!(bodies(&transcript), vec!["b", "a", "a result"]);
    }

    #[test]
    fn test_responses_keep_arrival_order_within_a_command() {
        let mut transcript = Transcript::new();
        let a = transcript.append_echo("a");
        transcript.append_response(a, ResponseKind::Info, "one");
        transcript.append_response(a, ResponseKind::Info, "two");
        transcript.append_echo("b");
        transcript.append_response(a, ResponseKind::Error, "three");

        assert_eq!(bodies(&transcript), vec!["b", "a", "one", "two", "three"]);
    }

    #[test]
    fn test_anchored_log_behaves_like_response() {
        let mut transcript = Transcript::new();
        let a = transcript.append_echo("a");
        transcript.append_response(a, ResponseKind::Info, "result");
        transcript.append_log(Some(a), "log line");

        assert_eq!(bodies(&transcript), vec!["a", "result", "log line"]);
    }

    #[test]
    fn test_unanchored_log_goes_to_back() {
        let mut transcript = Transcript::new();
        transcript.append_echo("a");
        transcript.append_log(None, "startup noise");

        assert_eq!(bodies(&transcript), vec!["a", "startup noise"]);
    }

    #[test]
    fn test_response_after_clear_falls_back_to_top() {
        let mut transcript = Transcript::new();
        let a = transcript.append_echo("a");
        transcript.clear();
        transcript.append_echo("b");
        transcript.append_response(a, ResponseKind::Info, "late");

        assert_eq!(bodies(&transcript), vec!["late", "b"]);
    }

    #[test]
    fn test_clear_resets_anchor() {
        let mut transcript = Transcript::new();
        transcript.append_echo("a");
        assert!(transcript.anchor().is_some());

        transcript.clear();
        assert!(transcript.is_empty());
        assert_eq!(transcript.anchor(), None);
    }

    #[test]
    fn test_echo_ids_are_unique_across_clear() {
        let mut transcript = Transcript::new();
        let a = transcript.append_echo("a");
        transcript.clear();
        let b = transcript.append_echo("b");
        assert_ne!(a, b);
    }
}
