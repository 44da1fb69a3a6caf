//! Translation of statement byte offsets into script coordinates.

use serde::{Deserialize, Serialize};

use mysqlscript_types::Charset;

use crate::splitter::Statement;

/// Script-absolute location: 1-based line, 0-based character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Where a statement starts in its script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatementOrigin {
    pub line: u32,
    /// Column of the statement's first byte; only the statement's first line
    /// is shifted by it.
    pub column: u32,
    pub charset: Charset,
}

impl StatementOrigin {
    pub const fn new(line: u32, column: u32, charset: Charset) -> Self {
        Self {
            line,
            column,
            charset,
        }
    }

    pub const fn of(statement: &Statement, charset: Charset) -> Self {
        Self::new(statement.line, statement.column, charset)
    }

    /// Script position of byte `offset` inside the statement `text`.
    pub fn locate(&self, text: &[u8], offset: usize) -> Position {
        let offset = offset.min(text.len());
        let mut line = self.line;
        let mut line_start = None;
        for idx in memchr::memchr2_iter(b'\n', b'\r', &text[..offset]) {
            if text[idx] == b'\n' || text.get(idx + 1) != Some(&b'\n') {
                line += 1;
                line_start = Some(idx + 1);
            }
        }
        let column = match line_start {
            Some(start) => self.charset.count_chars(&text[start.min(offset)..offset]) as u32,
            None => self.column + self.charset.count_chars(&text[..offset]) as u32,
        };
        Position::new(line, column)
    }
}

/// End of a token span with trailing whitespace dropped.
pub fn trimmed_end(text: &[u8], begin: usize, end: usize) -> usize {
    let end = end.min(text.len());
    let mut at = end;
    while at > begin && text[at - 1].is_ascii_whitespace() {
        at -= 1;
    }
    at
}

/// Length in characters of `text[begin..end]`, trailing whitespace excluded.
pub fn token_length(text: &[u8], begin: usize, end: usize, charset: Charset) -> u32 {
    let begin = begin.min(text.len());
    let end = trimmed_end(text, begin, end);
    charset.count_chars(&text[begin..end]) as u32
}
