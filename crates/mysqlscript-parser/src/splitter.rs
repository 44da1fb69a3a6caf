//! Script splitter.
//!
//! Cuts a script into statements at the current delimiter while stepping
//! over quoted text and comments. The delimiter can be redefined by a
//! `DELIMITER xyz` line; the new one applies from the next line on.
//!
//! The splitter never fails: unterminated quotes and comments simply run to
//! the end of the script.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};

use mysqlscript_error::{Result, ScriptError};
use mysqlscript_types::{Cancellation, Charset};

/// Bytes scanned between two cancellation polls.
const CANCEL_POLL_BYTES: usize = 4096;

const PRAGMA: &[u8] = b"delimiter";

static STATEMENTS_SPLIT: AtomicU64 = AtomicU64::new(0);
static DELIMITER_CHANGES: AtomicU64 = AtomicU64::new(0);
static SCRIPTS_SPLIT: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitMetricsSnapshot {
    pub scripts_total: u64,
    pub statements_total: u64,
    pub delimiter_changes_total: u64,
}

pub fn split_metrics_snapshot() -> SplitMetricsSnapshot {
    SplitMetricsSnapshot {
        scripts_total: SCRIPTS_SPLIT.load(Ordering::Relaxed),
        statements_total: STATEMENTS_SPLIT.load(Ordering::Relaxed),
        delimiter_changes_total: DELIMITER_CHANGES.load(Ordering::Relaxed),
    }
}

pub fn reset_split_metrics() {
    SCRIPTS_SPLIT.store(0, Ordering::Relaxed);
    STATEMENTS_SPLIT.store(0, Ordering::Relaxed);
    DELIMITER_CHANGES.store(0, Ordering::Relaxed);
}

/// What happens to text after the last delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// Trailing content is a statement of its own.
    #[default]
    Normal,
    /// Only delimiter-terminated statements are reported.
    DelimiterRequired,
}

/// One statement located in a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Byte offset of the first byte in the script.
    pub begin: usize,
    /// Byte length, delimiter excluded.
    pub len: usize,
    /// 1-based line of the first byte.
    pub line: u32,
    /// Characters between the preceding line break and the first byte.
    pub column: u32,
    /// Line breaks before the first byte.
    pub lines_before: u32,
    /// Delimiter in effect when the statement ended.
    pub delimiter: String,
}

impl Statement {
    pub const fn end(&self) -> usize {
        self.begin + self.len
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.begin..self.end()
    }

    pub fn bytes<'s>(&self, script: &'s [u8]) -> &'s [u8] {
        script.get(self.range()).unwrap_or_default()
    }

    pub fn text<'s>(&self, script: &'s str) -> &'s str {
        script.get(self.range()).unwrap_or_default()
    }
}

/// Totals of one [`StatementSplitter::process`] run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitSummary {
    pub statements: usize,
    pub delimiter_changes: usize,
    /// Delimiter in effect at the end of the script.
    pub final_delimiter: String,
    /// The callback asked to stop.
    pub stopped: bool,
    pub cancelled: bool,
}

/// Incremental line/column cursor. Targets must be non-decreasing.
#[derive(Debug, Clone, Copy)]
struct LineCursor {
    offset: usize,
    line: u32,
    line_start: usize,
}

impl LineCursor {
    const fn new() -> Self {
        Self {
            offset: 0,
            line: 1,
            line_start: 0,
        }
    }

    fn advance_to(&mut self, src: &[u8], target: usize) {
        let target = target.min(src.len());
        if target <= self.offset {
            return;
        }
        for idx in memchr::memchr2_iter(b'\n', b'\r', &src[self.offset..target]) {
            let at = self.offset + idx;
            if src[at] == b'\n' || src.get(at + 1) != Some(&b'\n') {
                self.line += 1;
                self.line_start = at + 1;
            }
        }
        self.offset = target;
    }
}

/// `DELIMITER` line found at the cursor.
struct Pragma {
    argument: std::ops::Range<usize>,
    line_end: usize,
    /// First byte after the consumed line break.
    next: usize,
}

#[derive(Debug, Clone)]
pub struct StatementSplitter {
    charset: Charset,
    delimiter: String,
    mode: SplitMode,
    cancel: Option<Cancellation>,
}

impl Default for StatementSplitter {
    fn default() -> Self {
        Self {
            charset: Charset::Utf8,
            delimiter: ";".to_owned(),
            mode: SplitMode::Normal,
            cancel: None,
        }
    }
}

impl StatementSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `delimiter` at the start of every run. An empty delimiter or one
    /// spanning a line break is rejected.
    pub fn with_delimiter(mut self, delimiter: &str) -> Result<Self> {
        if delimiter.is_empty() || delimiter.contains(['\n', '\r']) {
            return Err(ScriptError::InvalidDelimiter {
                delimiter: delimiter.to_owned(),
            });
        }
        self.delimiter = delimiter.to_owned();
        Ok(self)
    }

    pub const fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub const fn with_mode(mut self, mode: SplitMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|cancel| cancel.checkpoint().is_err())
    }

    /// Split `script`, handing each statement and its bytes to
    /// `on_statement` in script order.
    pub fn process<F>(&self, script: &[u8], mut on_statement: F) -> SplitSummary
    where
        F: FnMut(&Statement, &[u8]) -> ControlFlow<()>,
    {
        SCRIPTS_SPLIT.fetch_add(1, Ordering::Relaxed);
        let mut run = SplitRun {
            src: script,
            charset: self.charset,
            delimiter: self.delimiter.as_bytes().to_vec(),
            cursor: LineCursor::new(),
            summary: SplitSummary::default(),
        };
        let mut pos = 0;
        let mut stmt_start = 0;
        let mut have_content = false;
        let mut next_poll = CANCEL_POLL_BYTES;

        macro_rules! emit {
            ($begin:expr, $end:expr) => {
                if self.cancelled() {
                    run.summary.cancelled = true;
                    return run.finish();
                }
                if run.emit($begin, $end, &mut on_statement).is_break() {
                    run.summary.stopped = true;
                    return run.finish();
                }
            };
        }

        while pos < script.len() {
            if pos >= next_poll {
                if self.cancelled() {
                    run.summary.cancelled = true;
                    return run.finish();
                }
                next_poll = pos + CANCEL_POLL_BYTES;
            }

            if script[pos..].starts_with(&run.delimiter) {
                if have_content {
                    emit!(stmt_start, pos);
                }
                pos += run.delimiter.len();
                stmt_start = pos;
                have_content = false;
                continue;
            }

            let byte = script[pos];
            match byte {
                b'\'' | b'"' | b'`' => {
                    have_content = true;
                    pos = run.skip_quoted(pos);
                }
                b'#' => {
                    pos = run.line_end(pos);
                    if !have_content {
                        stmt_start = pos;
                    }
                }
                b'-' if script.get(pos + 1) == Some(&b'-')
                    && script
                        .get(pos + 2)
                        .is_none_or(|b| b.is_ascii_whitespace() || b.is_ascii_control()) =>
                {
                    pos = run.line_end(pos);
                    if !have_content {
                        stmt_start = pos;
                    }
                }
                b'/' if script.get(pos + 1) == Some(&b'*') => {
                    let versioned = script.get(pos + 2) == Some(&b'!');
                    pos = match memchr::memmem::find(&script[pos + 2..], b"*/") {
                        Some(offset) => pos + 2 + offset + 2,
                        None => script.len(),
                    };
                    if versioned {
                        have_content = true;
                    } else if !have_content {
                        stmt_start = pos;
                    }
                }
                b'd' | b'D' => {
                    if let Some(pragma) = run.pragma_at(pos) {
                        if have_content {
                            emit!(stmt_start, pos);
                            stmt_start = pos;
                        }
                        let argument = script[pragma.argument.clone()].to_vec();
                        if memchr::memmem::find(&argument, &run.delimiter).is_some() {
                            emit!(stmt_start, pragma.line_end);
                        }
                        tracing::trace!(
                            target: "mysqlscript.split",
                            offset = pos,
                            delimiter = %String::from_utf8_lossy(&argument),
                            "delimiter changed"
                        );
                        DELIMITER_CHANGES.fetch_add(1, Ordering::Relaxed);
                        run.summary.delimiter_changes += 1;
                        run.delimiter = argument;
                        pos = pragma.next;
                        stmt_start = pos;
                        have_content = false;
                    } else {
                        have_content = true;
                        pos += 1;
                    }
                }
                _ => {
                    if byte > b' ' {
                        have_content = true;
                    }
                    pos += self.charset.char_len(&script[pos..]);
                }
            }
        }

        if have_content && self.mode == SplitMode::Normal {
            emit!(stmt_start, script.len());
        }
        run.finish()
    }
}

struct SplitRun<'s> {
    src: &'s [u8],
    charset: Charset,
    delimiter: Vec<u8>,
    cursor: LineCursor,
    summary: SplitSummary,
}

impl SplitRun<'_> {
    fn emit<F>(&mut self, begin: usize, end: usize, on_statement: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&Statement, &[u8]) -> ControlFlow<()>,
    {
        self.cursor.advance_to(self.src, begin);
        let line_start = self.cursor.line_start.min(begin);
        let column = self.charset.count_chars(&self.src[line_start..begin]);
        let statement = Statement {
            begin,
            len: end - begin,
            line: self.cursor.line,
            column: column as u32,
            lines_before: self.cursor.line - 1,
            delimiter: String::from_utf8_lossy(&self.delimiter).into_owned(),
        };
        tracing::trace!(
            target: "mysqlscript.split",
            begin,
            len = statement.len,
            line = statement.line,
            "statement"
        );
        STATEMENTS_SPLIT.fetch_add(1, Ordering::Relaxed);
        self.summary.statements += 1;
        on_statement(&statement, &self.src[begin..end])
    }

    fn finish(mut self) -> SplitSummary {
        self.summary.final_delimiter = String::from_utf8_lossy(&self.delimiter).into_owned();
        self.summary
    }

    /// Position just past the quoted run opening at `start`.
    fn skip_quoted(&self, start: usize) -> usize {
        let quote = self.src[start];
        let mut at = start + 1;
        while at < self.src.len() && self.src[at] != quote {
            if self.src[at] == b'\\' {
                at += 1;
                if at >= self.src.len() {
                    break;
                }
            }
            at += self.charset.char_len(&self.src[at..]);
        }
        (at + 1).min(self.src.len())
    }

    /// Offset of the line break ending the line that contains `from`.
    fn line_end(&self, from: usize) -> usize {
        memchr::memchr2(b'\n', b'\r', &self.src[from..]).map_or(self.src.len(), |i| from + i)
    }

    fn pragma_at(&self, at: usize) -> Option<Pragma> {
        let src = self.src;
        if at > 0 && Charset::Utf8.is_ident_byte(src[at - 1]) {
            return None;
        }
        let word = src.get(at..at + PRAGMA.len())?;
        if !self.charset.eq_ignore_case(word, PRAGMA) {
            return None;
        }
        let after = at + PRAGMA.len();
        if !matches!(src.get(after), Some(b' ' | b'\t')) {
            return None;
        }
        let line_end = self.line_end(after);
        let mut arg_start = after;
        let mut arg_end = line_end;
        while arg_start < arg_end && src[arg_start].is_ascii_whitespace() {
            arg_start += 1;
        }
        while arg_end > arg_start && src[arg_end - 1].is_ascii_whitespace() {
            arg_end -= 1;
        }
        if arg_start == arg_end {
            return None;
        }
        let next = match (src.get(line_end), src.get(line_end + 1)) {
            (Some(b'\r'), Some(b'\n')) => line_end + 2,
            (Some(_), _) => line_end + 1,
            (None, _) => line_end,
        };
        Some(Pragma {
            argument: arg_start..arg_end,
            line_end,
            next,
        })
    }
}

/// Split `script` in [`SplitMode::Normal`] starting with `delimiter`.
pub fn split_script(script: &str, delimiter: &str) -> Result<Vec<Statement>> {
    let splitter = StatementSplitter::new().with_delimiter(delimiter)?;
    let mut out = Vec::new();
    splitter.process(script.as_bytes(), |statement, _| {
        out.push(statement.clone());
        ControlFlow::Continue(())
    });
    Ok(out)
}

/// `(offset, len)` of every statement with leading whitespace trimmed.
pub fn statement_ranges(script: &str, delimiter: &str) -> Result<Vec<(usize, usize)>> {
    let bytes = script.as_bytes();
    Ok(split_script(script, delimiter)?
        .into_iter()
        .filter_map(|statement| {
            let skip = statement
                .bytes(bytes)
                .iter()
                .take_while(|&&b| b <= b' ')
                .count();
            let len = statement.len - skip;
            (len > 0).then_some((statement.begin + skip, len))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(script: &str) -> Vec<String> {
        split_script(script, ";")
            .expect("default delimiter")
            .iter()
            .map(|s| s.text(script).to_owned())
            .collect()
    }

    fn strict_texts(script: &str) -> Vec<String> {
        let mut out = Vec::new();
        StatementSplitter::new()
            .with_mode(SplitMode::DelimiterRequired)
            .process(script.as_bytes(), |s, _| {
                out.push(s.text(script).to_owned());
                ControlFlow::Continue(())
            });
        out
    }

    #[test]
    fn comment_only_statements_are_swallowed() {
        assert_eq!(
            texts("select * from a; /* x */ ; select * from b"),
            vec!["select * from a", " select * from b"]
        );
        assert!(texts(" ; -- just a note\n ;\n").is_empty());
    }

    #[test]
    fn delimiter_pragma_sequence() {
        let script = "select * from a1; delimiter %%%\n delimiter $$$%%%\n select * from a2 $$$%%% select ";
        assert_eq!(
            texts(script),
            vec!["select * from a1", " delimiter $$$%%%", " select * from a2 ", " select "]
        );
        assert_eq!(
            strict_texts(script),
            vec!["select * from a1", " delimiter $$$%%%", " select * from a2 "]
        );
    }

    #[test]
    fn delimiters_inside_quotes_and_comments_are_ignored() {
        assert_eq!(
            texts("select 'a;b', \"c;d\", `e;f` -- g;h\n from t; select 1 # x;y\n"),
            vec![
                "select 'a;b', \"c;d\", `e;f` -- g;h\n from t",
                " select 1 # x;y\n"
            ]
        );
        assert_eq!(texts("select 'it\\'s;'; x"), vec!["select 'it\\'s;'", " x"]);
    }

    #[test]
    fn versioned_comments_count_as_content() {
        assert_eq!(
            texts("/*!40101 SET NAMES utf8 */;/* plain */;"),
            vec!["/*!40101 SET NAMES utf8 */"]
        );
    }

    #[test]
    fn leading_comment_moves_statement_start() {
        let script = "-- header\nselect 1;";
        let stmts = split_script(script, ";").expect("split");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].text(script), "\nselect 1");
        assert_eq!(stmts[0].line, 1);
        assert_eq!(stmts[0].begin, 9);
    }

    #[test]
    fn double_dash_needs_whitespace() {
        assert_eq!(texts("select 1--2; select 3"), vec!["select 1--2", " select 3"]);
    }

    #[test]
    fn multi_byte_delimiter_partial_match_is_text() {
        let splitter = StatementSplitter::new().with_delimiter("$$").expect("valid");
        let script = "select '$' $ 1$$select 2$$";
        let mut out = Vec::new();
        let summary = splitter.process(script.as_bytes(), |s, bytes| {
            out.push(String::from_utf8_lossy(bytes).into_owned());
            assert_eq!(s.delimiter, "$$");
            ControlFlow::Continue(())
        });
        assert_eq!(out, vec!["select '$' $ 1", "select 2"]);
        assert_eq!(summary.statements, 2);
    }

    #[test]
    fn pragma_needs_word_boundary_and_argument() {
        assert_eq!(texts("set xdelimiter //\n; y"), vec!["set xdelimiter //\n", " y"]);
        assert_eq!(texts("delimiter \n;"), vec!["delimiter \n"]);
    }

    #[test]
    fn pragma_matches_case_insensitively_under_latin1() {
        let script = "DeLiMiTeR $$\nselect 1$$\ndelimiter ;\nselect 2;";
        let mut stmts = Vec::new();
        let summary = StatementSplitter::new()
            .with_charset(Charset::Latin1)
            .process(script.as_bytes(), |s, _| {
                stmts.push(s.text(script).to_owned());
                ControlFlow::Continue(())
            });
        assert_eq!(stmts, vec!["select 1", "select 2"]);
        assert_eq!(summary.delimiter_changes, 2);
    }

    #[test]
    fn content_before_pragma_is_emitted_first() {
        let script = "select 1 delimiter //\nselect 2//";
        assert_eq!(texts(script), vec!["select 1 ", "select 2"]);
        let summary = StatementSplitter::new().process(script.as_bytes(), |_, _| ControlFlow::Continue(()));
        assert_eq!(summary.final_delimiter, "//");
        assert_eq!(summary.delimiter_changes, 1);
    }

    #[test]
    fn crlf_pragma_line_break_is_consumed_once() {
        let script = "DELIMITER //\r\nselect 1//\r\n";
        let stmts = split_script(script, ";").expect("split");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].text(script), "select 1");
        assert_eq!(stmts[0].line, 2);
        assert_eq!(stmts[0].lines_before, 1);
        assert_eq!(stmts[0].column, 0);
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let script = "select 1;\n  select 2; select 3;\rselect 4";
        let stmts = split_script(script, ";").expect("split");
        let meta: Vec<(u32, u32)> = stmts.iter().map(|s| (s.line, s.column)).collect();
        assert_eq!(meta, vec![(1, 0), (1, 9), (2, 11), (2, 21)]);
    }

    #[test]
    fn columns_count_characters() {
        let script = "select 'é';select 2";
        let stmts = split_script(script, ";").expect("split");
        assert_eq!(stmts[1].column, 11);
        assert_eq!(stmts[1].begin, 12);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        assert_eq!(texts("select 'abc; select 2"), vec!["select 'abc; select 2"]);
        assert!(strict_texts("select 'abc; select 2").is_empty());
    }

    #[test]
    fn callback_can_stop_early() {
        let mut seen = 0;
        let summary = StatementSplitter::new().process(b"a;b;c;", |_, _| {
            seen += 1;
            ControlFlow::Break(())
        });
        assert_eq!(seen, 1);
        assert!(summary.stopped);
    }

    #[test]
    fn cancellation_stops_the_run() {
        let cancel = Cancellation::new();
        cancel.cancel();
        let summary = StatementSplitter::new()
            .with_cancellation(cancel)
            .process(b"a;b;", |_, _| ControlFlow::Continue(()));
        assert!(summary.cancelled);
        assert_eq!(summary.statements, 0);
    }

    #[test]
    fn invalid_delimiters_are_rejected() {
        assert!(matches!(
            StatementSplitter::new().with_delimiter(""),
            Err(ScriptError::InvalidDelimiter { .. })
        ));
        assert!(StatementSplitter::new().with_delimiter("a\nb").is_err());
    }

    #[test]
    fn ranges_trim_leading_whitespace() {
        let script = "select 1;\n  select 2 ;  ";
        assert_eq!(
            statement_ranges(script, ";").expect("ranges"),
            vec![(0, 8), (12, 9)]
        );
    }
}
