//! Line classification.

/// Kind of a configuration line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or whitespace-only
    Blank,
    /// Starts with `//` or `#` after trimming
    Comment,
    /// Anything else; subject to all checks
    Code,
}

impl LineKind {
    /// Blank and comment lines are exempt from every check.
    pub fn is_exempt(self) -> bool {
        !matches!(self, LineKind::Code)
    }
}

/// A single line of input with its 1-based number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    /// The raw, untrimmed text. Columns are offsets into this.
    pub raw: &'a str,
    pub kind: LineKind,
}

impl<'a> Line<'a> {
    pub fn trimmed(&self) -> &'a str {
        self.raw.trim()
    }
}

pub fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Blank
    } else if trimmed.starts_with("//") || trimmed.starts_with('#') {
        LineKind::Comment
    } else {
        LineKind::Code
    }
}

/// Split `content` on `\n` and classify each piece.
///
/// A trailing newline yields a final blank line, so the number of the last
/// line is always the count of `\n` plus one.
pub fn lines(content: &str) -> impl Iterator<Item = Line<'_>> {
    content.split('\n').enumerate().map(|(idx, raw)| Line {
        number: idx + 1,
        raw,
        kind: classify(raw),
    })
}
