//! Brace and quote state machine.
//!
//! States are `{quote open, quote closed} x brace stack`. Each character is
//! fed through [`ScanState::step`], which may report an event. Line
//! classification lives elsewhere so this can be tested on its own.

/// Something the state machine noticed while consuming a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    /// A `}` outside a string with no open brace to match.
    UnexpectedClose,
}

/// What was still open after the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unclosed {
    /// Line of the most recently opened unmatched brace, with the number of
    /// unmatched braces.
    pub braces: Option<(usize, usize)>,
    pub quote: bool,
}

/// Transient scan state for one validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    brace_stack: Vec<usize>,
    quote_open: bool,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume `ch` found on `line`; `prev` is the preceding character on
    /// the same line, if any.
    ///
    /// A quote preceded by a backslash does not toggle the quote state. An
    /// escaped backslash before a quote (`\\"`) is not recognised, so such a
    /// quote is treated as escaped too.
    pub fn step(&mut self, line: usize, ch: char, prev: Option<char>) -> Option<ScanEvent> {
        match ch {
            '"' if prev != Some('\\') => {
                self.quote_open = !self.quote_open;
                None
            }
            '{' if !self.quote_open => {
                self.brace_stack.push(line);
                None
            }
            '}' if !self.quote_open => match self.brace_stack.pop() {
                Some(_) => None,
                None => Some(ScanEvent::UnexpectedClose),
            },
            _ => None,
        }
    }

    pub fn quote_open(&self) -> bool {
        self.quote_open
    }

    pub fn depth(&self) -> usize {
        self.brace_stack.len()
    }

    /// Consume the state and report what was left open.
    pub fn finish(self) -> Unclosed {
        Unclosed {
            braces: self
                .brace_stack
                .last()
                .map(|&line| (line, self.brace_stack.len())),
            quote: self.quote_open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(state: &mut ScanState, line: usize, text: &str) -> Vec<(usize, ScanEvent)> {
        let mut events = Vec::new();
        let mut prev = None;
        for (idx, ch) in text.char_indices() {
            if let Some(event) = state.step(line, ch, prev) {
                events.push((idx, event));
            }
            prev = Some(ch);
        }
        events
    }

    #[test]
    fn braces_push_and_pop() {
        let mut state = ScanState::new();
        feed(&mut state, 1, "a {");
        feed(&mut state, 2, "b {");
        assert_eq!(state.depth(), 2);
        feed(&mut state, 3, "}");
        assert_eq!(state.depth(), 1);

        let unclosed = state.finish();
        assert_eq!(unclosed.braces, Some((1, 1)));
        assert!(!unclosed.quote);
    }

    #[test]
    fn unmatched_close_reports_event_at_its_index() {
        let mut state = ScanState::new();
        let events = feed(&mut state, 1, "  }");
        assert_eq!(events, vec![(2, ScanEvent::UnexpectedClose)]);
        assert_eq!(state.depth(), 0);
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let mut state = ScanState::new();
        let events = feed(&mut state, 1, r#"x = "{ } }""#);
        assert!(events.is_empty());
        assert_eq!(state.depth(), 0);
        assert!(!state.quote_open());
    }

    #[test]
    fn escaped_quote_does_not_toggle() {
        let mut state = ScanState::new();
        feed(&mut state, 1, r#"x = "say \"hi\"""#);
        assert!(!state.quote_open());
    }

    #[test]
    fn escaped_backslash_before_quote_is_still_treated_as_escape() {
        let mut state = ScanState::new();
        // The closing quote follows `\\`, which the scanner reads as `\"`.
        feed(&mut state, 1, r#"path = "C:\\""#);
        assert!(state.quote_open());
    }

    #[test]
    fn quote_state_spans_lines() {
        let mut state = ScanState::new();
        feed(&mut state, 1, r#"x = "open {"#);
        assert!(state.quote_open());
        feed(&mut state, 2, r#"still } inside" {"#);
        assert!(!state.quote_open());
        assert_eq!(state.finish().braces, Some((2, 1)));
    }
}
