//! Script front end.
//!
//! [`ScriptParser`] drives one run: the script is split into statements,
//! each statement has its versioned comments unwrapped, passes the
//! relevance filter, is scanned and handed to the grammar, and the outcome
//! goes to the caller's callback with script-absolute positions.

use std::borrow::Cow;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use mysqlscript_ast::Ast;
use mysqlscript_error::{Result, ScriptError};
use mysqlscript_types::{Cancellation, Charset};

use crate::grammar::{FlatGrammar, Grammar, GrammarError, ParseContext};
use crate::lexer::{ScanOptions, Scanner};
use crate::options::ParserOptions;
use crate::position::{Position, StatementOrigin, token_length, trimmed_end};
use crate::splitter::{Statement, StatementSplitter};
use crate::token::Token;
use crate::versioning::remove_versioning_comments;

/// Bytes of statement text quoted in a syntax error message.
const MAX_ERROR_CONTEXT: usize = 80;

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

static STATEMENTS_PARSED: AtomicU64 = AtomicU64::new(0);
static STATEMENTS_FAILED: AtomicU64 = AtomicU64::new(0);
static STATEMENTS_IGNORED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseMetricsSnapshot {
    pub statements_parsed_total: u64,
    pub statements_failed_total: u64,
    pub statements_ignored_total: u64,
}

pub fn parse_metrics_snapshot() -> ParseMetricsSnapshot {
    ParseMetricsSnapshot {
        statements_parsed_total: STATEMENTS_PARSED.load(Ordering::Relaxed),
        statements_failed_total: STATEMENTS_FAILED.load(Ordering::Relaxed),
        statements_ignored_total: STATEMENTS_IGNORED.load(Ordering::Relaxed),
    }
}

pub fn reset_parse_metrics() {
    STATEMENTS_PARSED.store(0, Ordering::Relaxed);
    STATEMENTS_FAILED.store(0, Ordering::Relaxed);
    STATEMENTS_IGNORED.store(0, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Failure of one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementError {
    /// Start of the offending token.
    pub position: Position,
    /// Offending token length in characters.
    pub length: u32,
    pub message: String,
}

impl StatementError {
    pub fn to_script_error(&self) -> ScriptError {
        ScriptError::syntax(self.position.line, self.position.column, self.message.clone())
    }
}

/// What the callback sees for each parsed statement.
#[derive(Debug, Clone, Copy)]
pub struct StatementReport<'r> {
    /// 0-based ordinal among all statements of the script, ignored ones
    /// included.
    pub index: usize,
    pub statement: &'r Statement,
    /// The statement as written, versioned comments intact.
    pub text: &'r str,
    /// Tree with its root set; `None` on error or with tree building off.
    pub tree: Option<&'r Ast>,
    /// Start of the first token.
    pub begin: Position,
    /// End of the last token.
    pub end: Position,
    pub error: Option<&'r StatementError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunOutcome {
    /// Every statement was processed.
    #[default]
    Completed,
    /// The callback returned `ControlFlow::Break`.
    Stopped,
    /// [`ScriptParser::stop`] was called during the run.
    Cancelled,
    /// `max_error_count` failures were reached.
    TooManyErrors,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    /// Statements produced by the splitter and examined.
    pub statements: usize,
    pub parsed: usize,
    pub failed: usize,
    /// Dropped by the relevance filter or as wrapped dump tables.
    pub ignored: usize,
    /// Statements without a single token.
    pub empty: usize,
    pub delimiter_changes: usize,
    pub final_delimiter: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// First token of a statement, uppercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstToken {
    pub text: String,
    pub offset: usize,
}

/// Uppercased first token of `sql`. When `versioned_subst` is given and a
/// versioned comment opens before that token, the substitute is returned
/// at the comment offset instead.
pub fn first_sql_token(
    sql: &str,
    options: ScanOptions,
    versioned_subst: Option<&str>,
) -> Option<FirstToken> {
    let token = Scanner::new(sql.as_bytes(), options).next_token();
    if token.is_end() || token.span.is_empty() {
        return None;
    }
    if let Some(subst) = versioned_subst {
        let versioned = remove_versioning_comments(sql, options.charset);
        if let Some(at) = versioned.first_comment_at.filter(|&at| at < token.span.start as usize) {
            return Some(FirstToken {
                text: subst.to_owned(),
                offset: at,
            });
        }
    }
    let text = match token.value {
        Some(value) => value,
        None => String::from_utf8_lossy(token.text(sql.as_bytes())).into_owned(),
    };
    Some(FirstToken {
        text: text.to_uppercase(),
        offset: token.span.start as usize,
    })
}

/// Whether the options ask for `sql` to be parsed.
pub fn is_statement_relevant(sql: &str, options: &ParserOptions) -> bool {
    let first = first_sql_token(sql, options.scan_options(), None);
    let token = first.as_ref().map_or("", |t| t.text.as_str());
    if matches!(token, "USE" | "BEGIN") {
        return true;
    }
    let irrelevant = match token {
        "CREATE" => !options.process_create,
        "ALTER" => !options.process_alter,
        "DROP" => !options.process_drop,
        "SELECT" | "UPDATE" | "DELETE" => options.ignore_dml,
        "INSERT" => {
            options.ignore_dml
                || (options.ast_generation
                    && options.max_insert_statement_size != 0
                    && sql.len() > options.max_insert_statement_size)
        }
        _ => false,
    };
    !irrelevant
}

/// Escape `text` for use inside a quoted MySQL string literal.
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\u{1a}' => out.push_str("\\Z"),
            other => out.push(other),
        }
    }
    out
}

/// Up to [`MAX_ERROR_CONTEXT`] bytes of `text` from `at`, cut on character
/// boundaries.
fn error_context(text: &str, at: usize) -> &str {
    let mut start = at.min(text.len());
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (start + MAX_ERROR_CONTEXT).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}

/// Script text as UTF-8. Under a single-byte charset invalid input is read
/// as Latin-1, one character per byte.
fn decode_script(script: &[u8], charset: Charset) -> Result<(Cow<'_, str>, Charset)> {
    match std::str::from_utf8(script) {
        Ok(text) => Ok((Cow::Borrowed(text), charset)),
        Err(err) if charset.is_multibyte() => Err(ScriptError::encoding(err.valid_up_to())),
        Err(_) => {
            tracing::debug!(
                target: "mysqlscript.parse",
                charset = %charset,
                "script is not UTF-8, reading it as latin1"
            );
            let text: String = script.iter().map(|&b| char::from(b)).collect();
            Ok((Cow::Owned(text), Charset::Utf8))
        }
    }
}

// ---------------------------------------------------------------------------
// Front end
// ---------------------------------------------------------------------------

pub struct ScriptParser<G = FlatGrammar> {
    options: ParserOptions,
    grammar: G,
    cancel: Cancellation,
}

impl ScriptParser<FlatGrammar> {
    pub fn new(options: ParserOptions) -> Result<Self> {
        Self::with_grammar(options, FlatGrammar)
    }
}

impl<G: Grammar> ScriptParser<G> {
    pub fn with_grammar(options: ParserOptions, grammar: G) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            grammar,
            cancel: Cancellation::new(),
        })
    }

    pub const fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn grammar_mut(&mut self) -> &mut G {
        &mut self.grammar
    }

    /// Handle that stops the current run from another thread or from the
    /// callback.
    pub fn cancellation(&self) -> Cancellation {
        self.cancel.clone()
    }

    /// Stop the current run at the next statement or token. Each run starts
    /// with the flag cleared.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Read `path` and parse it as a script.
    pub fn parse_script_file<F>(&mut self, path: impl AsRef<Path>, on_statement: F) -> Result<RunSummary>
    where
        F: FnMut(&StatementReport<'_>) -> ControlFlow<()>,
    {
        let path = path.as_ref();
        let script = std::fs::read(path).map_err(|source| ScriptError::ScriptFile {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(target: "mysqlscript.parse", path = %path.display(), bytes = script.len(), "read script");
        self.parse_script(&script, on_statement)
    }

    /// Parse every statement of `script`, reporting each non-ignored,
    /// non-empty one to `on_statement`.
    pub fn parse_script<F>(&mut self, script: &[u8], on_statement: F) -> Result<RunSummary>
    where
        F: FnMut(&StatementReport<'_>) -> ControlFlow<()>,
    {
        let span = tracing::debug_span!(
            target: "mysqlscript.parse",
            "parse_script",
            bytes = script.len(),
            statements = tracing::field::Empty,
            failed = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );
        let _guard = span.enter();

        self.cancel.reset();
        let (text, charset) = decode_script(script, self.options.charset)?;
        let splitter = StatementSplitter::new()
            .with_delimiter(&self.options.delimiter)?
            .with_charset(charset)
            .with_mode(self.options.split_mode())
            .with_cancellation(self.cancel.clone());
        let scan = ScanOptions {
            charset,
            ..self.options.scan_options()
        };

        let mut run = Run {
            options: &self.options,
            grammar: &mut self.grammar,
            on_statement,
            cancel: &self.cancel,
            charset,
            scan,
            text: &text,
            summary: RunSummary::default(),
            outcome: None,
            spare: None,
        };
        let split = splitter.process(text.as_bytes(), |statement, _| run.statement(statement));

        let mut summary = run.summary;
        summary.outcome = match run.outcome {
            Some(outcome) => outcome,
            None if split.cancelled => RunOutcome::Cancelled,
            None => RunOutcome::Completed,
        };
        summary.delimiter_changes = split.delimiter_changes;
        summary.final_delimiter = split.final_delimiter;

        span.record("statements", summary.statements);
        span.record("failed", summary.failed);
        span.record("outcome", tracing::field::debug(summary.outcome));
        tracing::info!(
            target: "mysqlscript.parse",
            statements = summary.statements,
            parsed = summary.parsed,
            failed = summary.failed,
            ignored = summary.ignored,
            outcome = ?summary.outcome,
            "script parsed"
        );
        Ok(summary)
    }
}

impl<G> std::fmt::Debug for ScriptParser<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptParser")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// State of one `parse_script` call.
struct Run<'s, G, F> {
    options: &'s ParserOptions,
    grammar: &'s mut G,
    on_statement: F,
    cancel: &'s Cancellation,
    charset: Charset,
    scan: ScanOptions,
    text: &'s str,
    summary: RunSummary,
    outcome: Option<RunOutcome>,
    /// Arena of the previous statement, kept for its allocation.
    spare: Option<Ast>,
}

impl<G, F> Run<'_, G, F>
where
    G: Grammar,
    F: FnMut(&StatementReport<'_>) -> ControlFlow<()>,
{
    fn statement(&mut self, statement: &Statement) -> ControlFlow<()> {
        if self.cancel.is_cancelled() {
            self.outcome = Some(RunOutcome::Cancelled);
            return ControlFlow::Break(());
        }
        let index = self.summary.statements;
        self.summary.statements += 1;

        let original = statement.text(self.text);
        let versioned = remove_versioning_comments(original, self.charset);
        if versioned.ignore_statement || !is_statement_relevant(&versioned.text, self.options) {
            tracing::trace!(target: "mysqlscript.parse", index, line = statement.line, "statement ignored");
            STATEMENTS_IGNORED.fetch_add(1, Ordering::Relaxed);
            self.summary.ignored += 1;
            return ControlFlow::Continue(());
        }

        let mut cx = ParseContext::new(versioned.text.as_bytes(), self.scan)
            .with_ast(self.spare.take().unwrap_or_default())
            .with_ast_generation(self.options.ast_generation)
            .with_cancellation(self.cancel.clone());
        let result = self.grammar.parse(&mut cx);
        if self.cancel.is_cancelled() {
            self.outcome = Some(RunOutcome::Cancelled);
            return ControlFlow::Break(());
        }
        let first = cx.first_token().cloned();
        let last = cx.last_token().cloned();
        let mut ast = cx.into_ast();

        if first.is_none() && result.is_ok() {
            self.summary.empty += 1;
            self.spare = Some(ast);
            return ControlFlow::Continue(());
        }

        let bytes = original.as_bytes();
        let origin = StatementOrigin::of(statement, self.charset);
        let begin = origin.locate(bytes, first.as_ref().map_or(0, |t| t.span.start as usize));
        let end = last.as_ref().map_or(begin, |t| {
            origin.locate(bytes, trimmed_end(bytes, t.span.start as usize, t.span.end as usize))
        });

        let error = match result {
            Ok(root) => {
                ast.set_root(Some(root));
                None
            }
            Err(err) => {
                ast.set_root(None);
                Some(self.describe(&err, original, last.as_ref(), origin))
            }
        };
        if let Some(error) = &error {
            STATEMENTS_FAILED.fetch_add(1, Ordering::Relaxed);
            self.summary.failed += 1;
            tracing::warn!(
                target: "mysqlscript.parse",
                line = error.position.line,
                column = error.position.column,
                message = %error.message,
                "statement failed"
            );
        } else {
            STATEMENTS_PARSED.fetch_add(1, Ordering::Relaxed);
            self.summary.parsed += 1;
        }

        let tree = (error.is_none() && self.options.ast_generation).then_some(&ast);
        let report = StatementReport {
            index,
            statement,
            text: original,
            tree,
            begin,
            end,
            error: error.as_ref(),
        };
        let flow = (self.on_statement)(&report);
        self.spare = Some(ast);

        if flow.is_break() {
            self.outcome = Some(RunOutcome::Stopped);
            return ControlFlow::Break(());
        }
        let ceiling = self.options.max_error_count.map(|max| max as usize);
        if ceiling.is_some_and(|max| self.summary.failed >= max) {
            tracing::debug!(target: "mysqlscript.parse", failed = self.summary.failed, "error ceiling reached");
            self.cancel.cancel();
            self.outcome = Some(RunOutcome::TooManyErrors);
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    fn describe(
        &self,
        err: &GrammarError,
        original: &str,
        last: Option<&Token>,
        origin: StatementOrigin,
    ) -> StatementError {
        let bytes = original.as_bytes();
        let (at, length) = last.map_or((0, 0), |t| {
            let start = t.span.start as usize;
            (start, token_length(bytes, start, t.span.end as usize, self.charset))
        });
        let message = match err {
            GrammarError::Syntax => {
                format!("SQL syntax error near '{}'", error_context(original, at))
            }
            GrammarError::Message(message) => message.clone(),
        };
        StatementError {
            position: origin.locate(bytes, at),
            length,
            message,
        }
    }
}
