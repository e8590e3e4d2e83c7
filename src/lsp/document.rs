use tower_lsp::lsp_types::{Position, Range};

/// State for each open document
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub content: String,
    pub version: Option<i32>,
}

impl DocumentState {
    pub fn new(content: String, version: Option<i32>) -> Self {
        Self { content, version }
    }

    /// Raw text of the 0-based line `idx`, without its `\n`.
    pub fn line(&self, idx: usize) -> Option<&str> {
        self.content.split('\n').nth(idx)
    }

    /// Range covering the whole document.
    pub fn full_range(&self) -> Range {
        let last_idx = self.content.split('\n').count().saturating_sub(1);
        let last = self.line(last_idx).unwrap_or("");
        Range::new(
            Position::new(0, 0),
            Position::new(last_idx as u32, utf16_len(last)),
        )
    }
}

/// Length of `text` in UTF-16 code units, as LSP positions count.
pub fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

/// Convert a byte offset within `line` to a UTF-16 character position.
pub fn utf16_offset(line: &str, byte_offset: usize) -> u32 {
    let mut end = byte_offset.min(line.len());
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    utf16_len(&line[..end])
}

/// Byte span of the identifier-like word (`[A-Za-z0-9_.]`) around char
/// index `char_idx`, if any.
pub fn word_at(line: &str, char_idx: usize) -> Option<(usize, usize)> {
    let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '.';
    let chars: Vec<(usize, char)> = line.char_indices().collect();

    let mut start = char_idx.min(chars.len());
    while start > 0 && is_word(chars[start - 1].1) {
        start -= 1;
    }
    let mut end = char_idx.min(chars.len());
    while end < chars.len() && is_word(chars[end].1) {
        end += 1;
    }

    if start >= end {
        return None;
    }
    let byte_start = chars[start].0;
    let byte_end = chars.get(end).map_or(line.len(), |&(idx, _)| idx);
    Some((byte_start, byte_end))
}
