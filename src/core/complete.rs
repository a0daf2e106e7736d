//! Symbol completion over the input line.
//!
//! Completion looks only at the last token of the line (split on whitespace
//! and parentheses) and at the last `.`-separated segment of that token.
//! Candidates are strict prefixes of a known symbol; an exact match is not a
//! candidate. With several candidates, repeated tab presses cycle through
//! them without committing until the suggestion is accepted.

/// What the input line should show after a completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// Nothing to suggest; leave the line alone.
    None,
    /// Exactly one candidate; the line becomes this text immediately.
    Accept(String),
    /// Several candidates; show `candidates[index]` as a preview.
    Cycle {
        /// Completion suffixes, in symbol-table order.
        candidates: Vec<String>,
        /// The previewed candidate.
        index: usize,
    },
}

/// Cycling state carried between completion requests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompletionState {
    candidates: Vec<String>,
    index: Option<usize>,
}

impl CompletionState {
    /// The current candidate suffixes.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// The previewed candidate, if cycling has started.
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

/// Prefix-completion engine over a flat symbol table.
#[derive(Debug, Default)]
pub struct CompletionEngine {
    symbols: Vec<String>,
    state: CompletionState,
}

impl CompletionEngine {
    /// Create an engine with no known symbols.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the symbol table. Does not touch in-flight cycling state.
    pub fn set_symbols(&mut self, symbols: Vec<String>) {
        self.symbols = symbols;
    }

    /// The current cycling state, for rendering.
    pub fn state(&self) -> &CompletionState {
        &self.state
    }

    /// Forget any in-flight cycling state.
    pub fn reset(&mut self) {
        self.state = CompletionState::default();
    }

    /// Recompute candidates for `input` and advance the preview.
    ///
    /// `tab` marks an explicit completion keypress; `shift` reverses the
    /// cycling direction. A non-tab call (the line changed) recomputes
    /// candidates and resets the preview to the first one.
    pub fn suggest(&mut self, input: &str, tab: bool, shift: bool) -> Suggestion {
        let candidates = self.candidates_for(input);

        if candidates.is_empty() {
            self.state = CompletionState::default();
            return Suggestion::None;
        }

        if candidates.len() == 1 {
            let completed = format!("{}{}", input, candidates[0]);
            self.state = CompletionState::default();
            return Suggestion::Accept(completed);
        }

        let index = if tab {
            let len = candidates.len();
            match self.state.index {
                Some(i) if self.state.candidates == candidates => {
                    if shift {
                        if i == 0 { len - 1 } else { i - 1 }
                    } else {
                        (i + 1) % len
                    }
                }
                _ => {
                    if shift { len - 1 } else { 0 }
                }
            }
        } else {
            0
        };

        self.state = CompletionState {
            candidates: candidates.clone(),
            index: Some(index),
        };
        Suggestion::Cycle { candidates, index }
    }

    /// Commit the previewed candidate onto `input`, clearing the state.
    pub fn accept(&mut self, input: &str) -> Option<String> {
        let index = self.state.index?;
        let suffix = self.state.candidates.get(index)?.clone();
        self.state = CompletionState::default();
        Some(format!("{}{}", input, suffix))
    }

    /// Completion suffixes for the last path segment of the last token.
    fn candidates_for(&self, input: &str) -> Vec<String> {
        let token = last_token(input);

        // A trailing dot asks for every member: full names, not suffixes.
        if token.ends_with('.') || token.is_empty() {
            return self.symbols.clone();
        }

        let segment = token.rsplit('.').next().unwrap_or(token);
        self.symbols
            .iter()
            .filter(|symbol| symbol.starts_with(segment) && symbol.as_str() != segment)
            .map(|symbol| symbol[segment.len()..].to_string())
            .collect()
    }
}

/// The last token of the line, with whitespace and parens as separators.
fn last_token(input: &str) -> &str {
    input
        .rsplit(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .next()
        .unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> CompletionEngine {
        let mut engine = CompletionEngine::new();
        engine.set_symbols(vec![
            "define".to_string(),
            "defmacro".to_string(),
            "display".to_string(),
            "car".to_string(),
        ]);
        engine
    }

    #[test]
    fn test_no_candidates() {
        let mut engine = engine();
        assert_eq!(engine.suggest("zzz", false, false), Suggestion::None);
        assert_eq!(engine.state().index(), None);
    }

    #[test]
    fn test_single_candidate_accepts_immediately() {
        let mut engine = engine();
        assert_eq!(
            engine.suggest("ca", false, false),
            Suggestion::Accept("car".to_string())
        );
        assert_eq!(engine.state().index(), None);
    }

    #[test]
    fn test_exact_match_is_not_a_candidate() {
        let mut engine = engine();
        assert_eq!(engine.suggest("car", false, false), Suggestion::None);
    }

    #[test]
    fn test_multiple_candidates_preview_first() {
        let mut engine = engine();
        let suggestion = engine.suggest("de", false, false);
        assert_eq!(
            suggestion,
            Suggestion::Cycle {
                candidates: vec!["fine".to_string(), "fmacro".to_string()],
                index: 0,
            }
        );
    }

    #[test]
    fn test_tab_cycles_forward_with_wrap() {
        let mut engine = engine();
        engine.suggest("de", false, false);

        let s = engine.suggest("de", true, false);
        assert!(matches!(s, Suggestion::Cycle { index: 1, .. }));
        let s = engine.suggest("de", true, false);
        assert!(matches!(s, Suggestion::Cycle { index: 0, .. }));
    }

    #[test]
    fn test_shift_tab_cycles_backward_with_wrap() {
        let mut engine = engine();
        engine.suggest("de", false, false);

        let s = engine.suggest("de", true, true);
        assert!(matches!(s, Suggestion::Cycle { index: 1, .. }));
        let s = engine.suggest("de", true, true);
        assert!(matches!(s, Suggestion::Cycle { index: 0, .. }));
    }

    #[test]
    fn test_tab_with_no_prior_state_starts_at_ends() {
        let mut engine = engine();
        let s = engine.suggest("de", true, false);
        assert!(matches!(s, Suggestion::Cycle { index: 0, .. }));

        engine.reset();
        let s = engine.suggest("de", true, true);
        assert!(matches!(s, Suggestion::Cycle { index: 1, .. }));
    }

    #[test]
    fn test_accept_commits_previewed_candidate() {
        let mut engine = engine();
        engine.suggest("de", false, false);
        engine.suggest("de", true, false);

        assert_eq!(engine.accept("de"), Some("defmacro".to_string()));
        assert_eq!(engine.accept("de"), None);
        assert_eq!(engine.state().index(), None);
    }

    #[test]
    fn test_only_last_token_considered() {
        let mut engine = engine();
        assert_eq!(
            engine.suggest("(display ca", false, false),
            Suggestion::Accept("(display car".to_string())
        );
        assert_eq!(
            engine.suggest("zzz(ca", false, false),
            Suggestion::Accept("zzz(car".to_string())
        );
    }

    #[test]
    fn test_dotted_path_completes_last_segment() {
        let mut engine = CompletionEngine::new();
        engine.set_symbols(vec!["location".to_string(), "log".to_string()]);

        assert_eq!(
            engine.suggest("window.loc", false, false),
            Suggestion::Accept("window.location".to_string())
        );
    }

    #[test]
    fn test_trailing_dot_lists_all_symbols() {
        let mut engine = CompletionEngine::new();
        engine.set_symbols(vec!["alert".to_string(), "blur".to_string()]);

        let suggestion = engine.suggest("window.", false, false);
        assert_eq!(
            suggestion,
            Suggestion::Cycle {
                candidates: vec!["alert".to_string(), "blur".to_string()],
                index: 0,
            }
        );
    }

    #[test]
    fn test_changed_input_resets_preview() {
        let mut engine = engine();
        engine.suggest("de", true, false);
        engine.suggest("de", true, false);

        let s = engine.suggest("di", false, false);
        assert_eq!(s, Suggestion::Accept("display".to_string()));
    }
}
