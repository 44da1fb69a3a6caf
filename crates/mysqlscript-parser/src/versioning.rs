//! Unwrapping of `/*!NNNNN ... */` comments.
//!
//! Dump tools wrap whole statements in versioned comments. Before a
//! statement is filtered and scanned, each opener `/*!NNNNN` and its
//! matching `*/` are overwritten with spaces so the wrapped SQL is seen as
//! plain text. Byte offsets are unchanged by the replacement.

use std::borrow::Cow;

use mysqlscript_types::Charset;

const CREATE_TABLE_MARKER: &[u8] = b" CREATE TABLE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedSql<'a> {
    /// Statement text with versioned comment markers blanked out.
    pub text: Cow<'a, str>,
    /// Offset of the first unwrapped opener.
    pub first_comment_at: Option<usize>,
    /// Set when the last opener was directly followed by ` CREATE TABLE`;
    /// such wrapped tables belong to dumped views and are skipped.
    pub ignore_statement: bool,
}

impl VersionedSql<'_> {
    pub fn is_modified(&self) -> bool {
        matches!(self.text, Cow::Owned(_))
    }
}

/// Blank out the versioned comment markers of `sql`.
///
/// Only openers carrying version digits are unwrapped. The closer is found
/// by honouring quotes, backslash escapes inside quotes, `#` comments and
/// nested `/* */` pairs. An opener whose closer is missing ends the search.
pub fn remove_versioning_comments(sql: &str, charset: Charset) -> VersionedSql<'_> {
    let bytes = sql.as_bytes();
    let end = bytes.len();
    let mut edits: Vec<(usize, usize, usize)> = Vec::new();
    let mut ignore_statement = false;
    let mut at = 0;

    loop {
        while at < end && bytes[at] != b'/' {
            at += charset.char_len(&bytes[at..]);
        }
        if at + 3 >= end {
            break;
        }
        if bytes[at + 1] != b'*' || bytes[at + 2] != b'!' {
            at += 1;
            continue;
        }
        let opener = at;
        at += 3;
        let digits_start = at;
        while at < end && bytes[at].is_ascii_digit() {
            at += 1;
        }
        if at == digits_start {
            continue;
        }
        let opener_end = at;
        ignore_statement = bytes[at..].starts_with(CREATE_TABLE_MARKER);

        let Some(closer) = find_closer(bytes, at) else {
            break;
        };
        edits.push((opener, opener_end, closer));
        at = closer + 2;
    }

    let Some(&(first, _, _)) = edits.first() else {
        return VersionedSql {
            text: Cow::Borrowed(sql),
            first_comment_at: None,
            ignore_statement,
        };
    };
    let mut text = sql.to_owned();
    for &(opener, opener_end, closer) in &edits {
        // markers are ASCII so the ranges sit on char boundaries
        text.replace_range(opener..opener_end, &" ".repeat(opener_end - opener));
        text.replace_range(closer..closer + 2, "  ");
    }
    tracing::trace!(
        target: "mysqlscript.parse",
        comments = edits.len(),
        ignore_statement,
        "unwrapped versioned comments"
    );
    VersionedSql {
        text: Cow::Owned(text),
        first_comment_at: Some(first),
        ignore_statement,
    }
}

/// Offset of the `*/` closing the versioned comment whose body starts at
/// `from`.
fn find_closer(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quoted: Option<u8> = None;
    let mut pending_escape = false;
    let mut commented = false;
    let mut depth = 1usize;
    let last = bytes.len().checked_sub(1)?;
    let mut at = from;
    while at < last {
        let byte = bytes[at];
        let next = bytes[at + 1];
        let escaped = pending_escape;
        pending_escape = !commented && quoted.is_some() && byte == b'\\' && !escaped;
        match byte {
            b'#' if depth == 1 && quoted.is_none() => commented = true,
            b'\r' | b'\n' => commented = false,
            b'/' if !commented && quoted.is_none() && next == b'*' => depth += 1,
            b'*' if !commented && quoted.is_none() && next == b'/' => {
                depth -= 1;
                if depth == 0 {
                    return Some(at);
                }
            }
            b'"' | b'\'' if !escaped && !commented => match quoted {
                Some(q) if q == byte => quoted = None,
                Some(_) => {}
                None => quoted = Some(byte),
            },
            _ => {}
        }
        at += 1;
    }
    None
}
