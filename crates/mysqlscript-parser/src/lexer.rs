//! Dialect scanner.
//!
//! [`Scanner`] is a resumable state machine over one statement's bytes:
//! each [`Scanner::next_token`] call picks up at the stored cursor and state,
//! classifies one token and returns it. After `END_OF_INPUT` every further
//! call returns [`Symbol::END`].

use std::sync::atomic::{AtomicU64, Ordering};

use mysqlscript_ast::{Span, Symbol};
use mysqlscript_types::{Cancellation, Charset, SqlMode};

use crate::keywords;
use crate::token::Token;

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

static TOKENS_TOTAL: AtomicU64 = AtomicU64::new(0);
static SCANS_TOTAL: AtomicU64 = AtomicU64::new(0);
static ABORTS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Point-in-time view of the process-wide scanner counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenizeMetricsSnapshot {
    pub tokens_total: u64,
    pub scans_total: u64,
    pub aborts_total: u64,
}

pub fn tokenize_metrics_snapshot() -> TokenizeMetricsSnapshot {
    TokenizeMetricsSnapshot {
        tokens_total: TOKENS_TOTAL.load(Ordering::Relaxed),
        scans_total: SCANS_TOTAL.load(Ordering::Relaxed),
        aborts_total: ABORTS_TOTAL.load(Ordering::Relaxed),
    }
}

pub fn reset_tokenize_metrics() {
    TOKENS_TOTAL.store(0, Ordering::Relaxed);
    SCANS_TOTAL.store(0, Ordering::Relaxed);
    ABORTS_TOTAL.store(0, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Version assumed for `/*!NNNNN ... */` comments unless configured.
pub const DEFAULT_SERVER_VERSION: u32 = 50_700;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub sql_mode: SqlMode,
    pub charset: Charset,
    /// Versioned comments at or below this version are scanned as SQL.
    pub server_version: u32,
    /// Recognise `?` as `PARAM_MARKER`.
    pub param_markers: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            sql_mode: SqlMode::empty(),
            charset: Charset::Utf8,
            server_version: DEFAULT_SERVER_VERSION,
            param_markers: false,
        }
    }
}

impl ScanOptions {
    pub fn with_sql_mode(mut self, sql_mode: SqlMode) -> Self {
        self.sql_mode = sql_mode;
        self
    }
}

// ---------------------------------------------------------------------------
// Integer classification
// ---------------------------------------------------------------------------

const LONG_STR: &[u8] = b"2147483647";
const SIGNED_LONG_STR: &[u8] = b"2147483648";
const LONGLONG_STR: &[u8] = b"9223372036854775807";
const SIGNED_LONGLONG_STR: &[u8] = b"9223372036854775808";
const UNSIGNED_LONGLONG_STR: &[u8] = b"18446744073709551615";

/// Smallest integer class that holds the literal `text`, decided by digit
/// count and string comparison against the type boundaries.
pub fn classify_integer(text: &[u8]) -> Symbol {
    if text.len() < LONG_STR.len() {
        return Symbol::NUM;
    }
    let (negative, mut digits) = match text.split_first() {
        Some((b'+', rest)) => (false, rest),
        Some((b'-', rest)) => (true, rest),
        _ => (false, text),
    };
    while let Some((b'0', rest)) = digits.split_first() {
        digits = rest;
    }
    let len = digits.len();
    if len < LONG_STR.len() {
        return Symbol::NUM;
    }

    let (bound, smaller, bigger) = if negative {
        if len == LONG_STR.len() {
            (SIGNED_LONG_STR, Symbol::NUM, Symbol::LONG_NUM)
        } else if len < SIGNED_LONGLONG_STR.len() {
            return Symbol::LONG_NUM;
        } else if len > SIGNED_LONGLONG_STR.len() {
            return Symbol::DECIMAL_NUM;
        } else {
            (SIGNED_LONGLONG_STR, Symbol::LONG_NUM, Symbol::DECIMAL_NUM)
        }
    } else if len == LONG_STR.len() {
        (LONG_STR, Symbol::NUM, Symbol::LONG_NUM)
    } else if len < LONGLONG_STR.len() {
        return Symbol::LONG_NUM;
    } else if len > LONGLONG_STR.len() {
        if len > UNSIGNED_LONGLONG_STR.len() {
            return Symbol::DECIMAL_NUM;
        }
        (UNSIGNED_LONGLONG_STR, Symbol::ULONGLONG_NUM, Symbol::DECIMAL_NUM)
    } else {
        (LONGLONG_STR, Symbol::LONG_NUM, Symbol::ULONGLONG_NUM)
    };

    match digits.iter().zip(bound).find(|(a, b)| a != b) {
        Some((a, b)) if a > b => bigger,
        _ => smaller,
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    OperatorOrIdent,
    Char,
    Ident,
    IdentSep,
    IdentStart,
    IdentOrHex,
    IdentOrBin,
    IdentOrNchar,
    NumberIdent,
    Real,
    RealOrPoint,
    HexNumber,
    BinNumber,
    CmpOp,
    LongCmpOp,
    Bool,
    String,
    StringOrDelimiter,
    UserVariableDelimiter,
    Comment,
    LongComment,
    EndLongComment,
    SetVar,
    Semicolon,
    Eol,
    End,
    UserEnd,
    Hostname,
    SystemVar,
    IdentOrKeyword,
    Escape,
}

/// State entered on the first byte of a token.
const fn state_for(byte: u8) -> State {
    match byte {
        0 => State::Eol,
        b'N' | b'n' => State::IdentOrNchar,
        b'X' | b'x' => State::IdentOrHex,
        b'B' | b'b' => State::IdentOrBin,
        b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' | 0x80..=0xFF => State::Ident,
        b'0'..=b'9' => State::NumberIdent,
        b'\'' => State::String,
        b'"' => State::StringOrDelimiter,
        b'`' => State::UserVariableDelimiter,
        b'.' => State::RealOrPoint,
        b'>' | b'=' | b'!' => State::CmpOp,
        b'<' => State::LongCmpOp,
        b'&' | b'|' => State::Bool,
        b'#' => State::Comment,
        b';' => State::Semicolon,
        b':' => State::SetVar,
        b'\\' => State::Escape,
        b'/' => State::LongComment,
        b'*' => State::EndLongComment,
        b'@' => State::UserEnd,
        _ => State::Char,
    }
}

const fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

const fn is_cmp_byte(byte: u8) -> bool {
    matches!(byte, b'<' | b'>' | b'=' | b'!')
}

/// Scanner over one statement.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    src: &'a [u8],
    options: ScanOptions,
    pos: usize,
    tok_start: usize,
    line: u32,
    /// Bytes before this offset have been folded into `line`.
    line_pos: usize,
    next_state: State,
    in_comment: bool,
    cancel: Option<Cancellation>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a [u8], options: ScanOptions) -> Self {
        SCANS_TOTAL.fetch_add(1, Ordering::Relaxed);
        Self {
            src: text,
            options,
            pos: 0,
            tok_start: 0,
            line: 1,
            line_pos: 0,
            next_state: State::Start,
            in_comment: false,
            cancel: None,
        }
    }

    /// Stop with `END_OF_INPUT` at the next token once `cancel` is raised.
    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub const fn text(&self) -> &'a [u8] {
        self.src
    }

    pub const fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Byte offset of the cursor.
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Line of the most recent token start.
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Whether the last token was an identifier, literal or `)`; a following
    /// `+`/`-` is then an operator rather than a sign.
    pub const fn prev_was_operand(&self) -> bool {
        matches!(self.next_state, State::OperatorOrIdent | State::IdentSep)
    }

    fn byte_at(&self, at: usize) -> u8 {
        self.src.get(at).copied().unwrap_or(0)
    }

    fn peek(&self) -> u8 {
        self.byte_at(self.pos)
    }

    /// Offset just past the character starting at `at`.
    fn past_char(&self, at: usize) -> usize {
        let rest = self.src.get(at..).unwrap_or_default();
        at + self.options.charset.char_len(rest)
    }

    fn is_ident(&self, byte: u8) -> bool {
        byte != 0 && self.options.charset.is_ident_byte(byte)
    }

    fn slice_text(&self, from: usize, to: usize) -> String {
        String::from_utf8_lossy(&self.src[from..to]).into_owned()
    }

    /// Fold the line breaks between `line_pos` and `tok_start` into `line`.
    fn sync_line(&mut self) {
        if self.tok_start <= self.line_pos {
            return;
        }
        let window = &self.src[self.line_pos..self.tok_start];
        for idx in memchr::memchr2_iter(b'\n', b'\r', window) {
            let at = self.line_pos + idx;
            if self.src[at] == b'\n' || self.byte_at(at + 1) != b'\n' {
                self.line += 1;
            }
        }
        self.line_pos = self.tok_start;
    }

    /// End of the identifier run starting at `from`, and whether it holds
    /// non-ASCII characters.
    fn ident_run(&self, from: usize) -> (usize, bool) {
        let charset = self.options.charset;
        let mut at = from;
        let mut non_ascii = false;
        while let Some(&byte) = self.src.get(at) {
            if !self.is_ident(byte) {
                break;
            }
            if byte >= 0x80 {
                non_ascii = true;
                if charset.is_multibyte() {
                    let len = charset.mb_len(&self.src[at..]);
                    if len == 0 {
                        break;
                    }
                    at += len;
                    continue;
                }
            }
            at += 1;
        }
        (at, non_ascii)
    }

    fn digits_from(&self, from: usize) -> usize {
        let mut at = from;
        while self.byte_at(at).is_ascii_digit() {
            at += 1;
        }
        at
    }

    fn token(&mut self, symbol: Symbol, end: usize, value: Option<String>) -> Token {
        self.pos = end;
        TOKENS_TOTAL.fetch_add(1, Ordering::Relaxed);
        Token::new(
            symbol,
            Span::new(self.tok_start as u32, end as u32),
            value,
            self.line,
        )
    }

    fn word_token(&mut self, symbol: Symbol, end: usize) -> Token {
        let value = self.slice_text(self.tok_start, end);
        self.token(symbol, end, Some(value))
    }

    fn abort(&mut self, end: usize) -> Token {
        ABORTS_TOTAL.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(target: "mysqlscript.lex", offset = self.tok_start, "illegal literal");
        let end = end.min(self.src.len());
        self.token(Symbol::ABORT_SYM, end, None)
    }

    fn keyword(&self, word: &[u8], function: bool) -> Option<Symbol> {
        let symbol = keywords::lookup(word, function)?;
        let mode = self.options.sql_mode;
        Some(
            if symbol == Symbol::KW_NOT && mode.contains(SqlMode::HIGH_NOT_PRECEDENCE) {
                Symbol::NOT2_SYM
            } else if symbol == Symbol::OP_OR_OR && !mode.contains(SqlMode::PIPES_AS_CONCAT) {
                Symbol::OR2_SYM
            } else {
                symbol
            },
        )
    }

    /// Scan the next token.
    #[allow(clippy::too_many_lines)]
    pub fn next_token(&mut self) -> Token {
        if self.next_state != State::End && self.cancel.as_ref().is_some_and(Cancellation::is_cancelled)
        {
            self.next_state = State::End;
            self.tok_start = self.pos;
            return self.token(Symbol::END_OF_INPUT, self.pos, None);
        }

        let mut state = self.next_state;
        self.next_state = State::OperatorOrIdent;
        self.tok_start = self.pos;
        self.sync_line();

        loop {
            match state {
                State::Start | State::OperatorOrIdent => {
                    while self.src.get(self.pos).copied().is_some_and(is_space) {
                        self.pos += 1;
                    }
                    self.tok_start = self.pos;
                    self.sync_line();
                    if self.pos >= self.src.len() {
                        state = State::Eol;
                        continue;
                    }
                    state = state_for(self.src[self.pos]);
                    self.pos += 1;
                }

                State::Char => {
                    let c = self.byte_at(self.tok_start);
                    let after = self.byte_at(self.tok_start + 2);
                    if c == b'-'
                        && self.byte_at(self.tok_start + 1) == b'-'
                        && (after.is_ascii_whitespace() || after.is_ascii_control())
                    {
                        self.pos = self.tok_start + 2;
                        state = State::Comment;
                        continue;
                    }
                    let end = self.tok_start + 1;
                    if c != b')' {
                        self.next_state = State::Start;
                    }
                    if c == b'?' && self.options.param_markers && !self.is_ident(self.byte_at(end)) {
                        return self.word_token(Symbol::PARAM_MARKER, end);
                    }
                    return self.word_token(Symbol::from_char(c), end);
                }

                State::Escape => {
                    if self.peek() == b'N' {
                        return self.word_token(Symbol::KW_NULL, self.pos + 1);
                    }
                    state = State::Char;
                }

                State::IdentOrNchar => {
                    if self.peek() != b'\'' {
                        state = State::Ident;
                        continue;
                    }
                    let body = self.pos + 1;
                    let Some(offset) = memchr::memchr(b'\'', &self.src[body..]) else {
                        return self.abort(self.src.len());
                    };
                    let close = body + offset;
                    let value = self.slice_text(body, close);
                    return self.token(Symbol::NCHAR_STRING, close + 1, Some(value));
                }

                State::IdentOrHex | State::IdentOrBin => {
                    state = match (state, self.peek()) {
                        (State::IdentOrHex, b'\'') => State::HexNumber,
                        (State::IdentOrBin, b'\'') => State::BinNumber,
                        _ => State::Ident,
                    };
                }

                State::Ident => {
                    let (word_end, non_ascii) = self.ident_run(self.tok_start);
                    if word_end == self.tok_start {
                        // lead byte of a malformed multi-byte character
                        state = State::Char;
                        continue;
                    }
                    let mut after = word_end;
                    if self.options.sql_mode.contains(SqlMode::IGNORE_SPACE) {
                        while self.src.get(after).copied().is_some_and(is_space) {
                            after += 1;
                        }
                    }
                    let next = self.byte_at(after);
                    if after == word_end && next == b'.' && self.is_ident(self.byte_at(after + 1)) {
                        self.next_state = State::IdentSep;
                    } else if let Some(symbol) =
                        self.keyword(&self.src[self.tok_start..word_end], next == b'(')
                    {
                        self.next_state = State::Start;
                        return self.word_token(symbol, word_end);
                    }
                    let word = &self.src[self.tok_start..word_end];
                    let symbol = match word.split_first() {
                        Some((b'_', name))
                            if std::str::from_utf8(name).is_ok_and(Charset::is_known_name) =>
                        {
                            Symbol::UNDERSCORE_CHARSET
                        }
                        _ if non_ascii => Symbol::IDENT_QUOTED,
                        _ => Symbol::IDENT,
                    };
                    return self.word_token(symbol, word_end);
                }

                State::IdentSep => {
                    let dot = self.tok_start;
                    self.next_state = if self.is_ident(self.byte_at(dot + 1)) {
                        State::IdentStart
                    } else {
                        State::Start
                    };
                    return self.word_token(Symbol::from_char(b'.'), dot + 1);
                }

                State::NumberIdent => {
                    let digits_end = self.digits_from(self.pos);
                    let c = self.byte_at(digits_end);
                    if !self.is_ident(c) {
                        if c == b'.' {
                            self.pos = digits_end + 1;
                            state = State::Real;
                            continue;
                        }
                        let symbol = classify_integer(&self.src[self.tok_start..digits_end]);
                        return self.word_token(symbol, digits_end);
                    }
                    if let Some(token) = self.number_with_suffix(digits_end, c) {
                        return token;
                    }
                    state = State::IdentStart;
                }

                State::IdentStart => {
                    let (end, non_ascii) = self.ident_run(self.tok_start);
                    if end == self.tok_start {
                        self.pos = self.tok_start;
                        state = State::Start;
                        continue;
                    }
                    if self.byte_at(end) == b'.' && self.is_ident(self.byte_at(end + 1)) {
                        self.next_state = State::IdentSep;
                    }
                    let symbol = if non_ascii {
                        Symbol::IDENT_QUOTED
                    } else {
                        Symbol::IDENT
                    };
                    return self.word_token(symbol, end);
                }

                State::RealOrPoint => {
                    if self.peek().is_ascii_digit() {
                        state = State::Real;
                    } else {
                        self.pos = self.tok_start;
                        state = State::IdentSep;
                    }
                }

                State::Real => {
                    let digits_end = self.digits_from(self.pos);
                    let c = self.byte_at(digits_end);
                    if c == b'e' || c == b'E' {
                        let mut at = digits_end + 1;
                        if matches!(self.byte_at(at), b'+' | b'-') {
                            at += 1;
                        }
                        if !self.byte_at(at).is_ascii_digit() {
                            state = State::Char;
                            continue;
                        }
                        let end = self.digits_from(at);
                        return self.word_token(Symbol::FLOAT_NUM, end);
                    }
                    return self.word_token(Symbol::DECIMAL_NUM, digits_end);
                }

                State::HexNumber | State::BinNumber => {
                    let body = self.pos + 1;
                    let hex = state == State::HexNumber;
                    let mut at = body;
                    while {
                        let b = self.byte_at(at);
                        if hex {
                            b.is_ascii_hexdigit()
                        } else {
                            b == b'0' || b == b'1'
                        }
                    } {
                        at += 1;
                    }
                    let odd_digits = (at - body) % 2 == 1;
                    if self.byte_at(at) != b'\'' || (hex && odd_digits) {
                        return self.abort(self.past_char(at));
                    }
                    let value = self.slice_text(body, at);
                    let symbol = if hex { Symbol::HEX_NUM } else { Symbol::BIN_NUM };
                    return self.token(symbol, at + 1, Some(value));
                }

                State::CmpOp | State::LongCmpOp => {
                    if is_cmp_byte(self.peek()) {
                        self.pos += 1;
                        if state == State::LongCmpOp && matches!(self.peek(), b'>' | b'=' | b'!') {
                            self.pos += 1;
                        }
                    }
                    if let Some(symbol) = self.keyword(&self.src[self.tok_start..self.pos], false) {
                        self.next_state = State::Start;
                        return self.word_token(symbol, self.pos);
                    }
                    state = State::Char;
                }

                State::Bool => {
                    let c = self.byte_at(self.tok_start);
                    if self.peek() != c {
                        state = State::Char;
                        continue;
                    }
                    let end = self.pos + 1;
                    match self.keyword(&self.src[self.tok_start..end], false) {
                        Some(symbol) => {
                            self.next_state = State::Start;
                            return self.word_token(symbol, end);
                        }
                        None => state = State::Char,
                    }
                }

                State::StringOrDelimiter => {
                    state = if self.options.sql_mode.contains(SqlMode::ANSI_QUOTES) {
                        State::UserVariableDelimiter
                    } else {
                        State::String
                    };
                }

                State::String => match self.read_text(self.tok_start) {
                    Some((end, value)) => return self.token(Symbol::TEXT_STRING, end, Some(value)),
                    // unterminated: the quote becomes a one-character token
                    None => state = State::Char,
                },

                State::UserVariableDelimiter => {
                    let (end, value) = self.read_quoted_ident(self.tok_start);
                    self.next_state = State::Start;
                    return self.token(Symbol::IDENT_QUOTED, end, Some(value));
                }

                State::Comment => {
                    let mut at = self.pos;
                    while let Some(&b) = self.src.get(at) {
                        if b == b'\n' || (b == b'\r' && self.byte_at(at + 1) != b'\n') {
                            break;
                        }
                        at += 1;
                    }
                    self.pos = at;
                    state = State::Start;
                }

                State::LongComment => {
                    if self.peek() != b'*' {
                        state = State::Char;
                        continue;
                    }
                    self.pos += 1;
                    if self.peek() == b'!' {
                        self.pos += 1;
                        let digits_end = self.digits_from(self.pos);
                        let version = if digits_end > self.pos {
                            parse_version(&self.src[self.pos..digits_end])
                        } else {
                            0
                        };
                        self.pos = digits_end;
                        if version <= u64::from(self.options.server_version) {
                            self.in_comment = true;
                            state = State::Start;
                            continue;
                        }
                    }
                    self.pos = match memchr::memmem::find(&self.src[self.pos..], b"*/") {
                        Some(offset) => self.pos + offset + 2,
                        None => self.src.len(),
                    };
                    state = State::Start;
                }

                State::EndLongComment => {
                    if self.in_comment && self.peek() == b'/' {
                        self.pos += 1;
                        self.in_comment = false;
                        state = State::Start;
                    } else {
                        state = State::Char;
                    }
                }

                State::SetVar => {
                    if self.peek() != b'=' {
                        state = State::Char;
                        continue;
                    }
                    return self.word_token(Symbol::SET_VAR, self.pos + 1);
                }

                State::Semicolon => {
                    state = if self.pos < self.src.len() {
                        State::Char
                    } else {
                        State::Eol
                    };
                }

                State::Eol => {
                    if self.pos >= self.src.len() {
                        self.next_state = State::End;
                        return self.token(Symbol::END_OF_INPUT, self.pos.min(self.src.len()), None);
                    }
                    state = State::Char;
                }

                State::End => {
                    self.next_state = State::End;
                    self.tok_start = self.src.len();
                    return Token::new(
                        Symbol::END,
                        Span::new(self.src.len() as u32, self.src.len() as u32),
                        None,
                        self.line,
                    );
                }

                State::UserEnd => {
                    match state_for(self.peek()) {
                        State::String | State::UserVariableDelimiter | State::StringOrDelimiter => {}
                        State::UserEnd => self.next_state = State::SystemVar,
                        _ => self.next_state = State::Hostname,
                    }
                    return self.word_token(Symbol::from_char(b'@'), self.tok_start + 1);
                }

                State::Hostname => {
                    let mut at = self.tok_start;
                    while matches!(self.byte_at(at), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'_' | b'$')
                    {
                        at += 1;
                    }
                    return self.word_token(Symbol::LEX_HOSTNAME, at);
                }

                State::SystemVar => {
                    let end = self.tok_start + 1;
                    self.next_state = if state_for(self.byte_at(end)) == State::UserVariableDelimiter {
                        State::OperatorOrIdent
                    } else {
                        State::IdentOrKeyword
                    };
                    return self.word_token(Symbol::from_char(b'@'), end);
                }

                State::IdentOrKeyword => {
                    let (end, non_ascii) = self.ident_run(self.tok_start);
                    if self.byte_at(end) == b'.' {
                        self.next_state = State::IdentSep;
                    }
                    if end == self.tok_start {
                        self.next_state = State::OperatorOrIdent;
                        return self.abort(self.past_char(end));
                    }
                    if let Some(symbol) = self.keyword(&self.src[self.tok_start..end], false) {
                        return self.word_token(symbol, end);
                    }
                    let symbol = if non_ascii {
                        Symbol::IDENT_QUOTED
                    } else {
                        Symbol::IDENT
                    };
                    return self.word_token(symbol, end);
                }
            }
        }
    }

    /// Digits followed by an identifier byte: exponent, `0x`/`0b` literal,
    /// or `None` when the run is an identifier after all.
    fn number_with_suffix(&mut self, digits_end: usize, c: u8) -> Option<Token> {
        let lone_zero = digits_end == self.tok_start + 1 && self.src[self.tok_start] == b'0';
        match c {
            b'e' | b'E' => {
                let mut at = digits_end + 1;
                if matches!(self.byte_at(at), b'+' | b'-') {
                    at += 1;
                }
                if !self.byte_at(at).is_ascii_digit() {
                    return None;
                }
                let end = self.digits_from(at);
                Some(self.word_token(Symbol::FLOAT_NUM, end))
            }
            b'x' if lone_zero => {
                let body = digits_end + 1;
                let mut end = body;
                while self.byte_at(end).is_ascii_hexdigit() {
                    end += 1;
                }
                (end > body && !self.is_ident(self.byte_at(end)))
                    .then(|| self.word_token(Symbol::HEX_NUM, end))
            }
            b'b' if lone_zero => {
                let body = digits_end + 1;
                let mut end = body;
                while matches!(self.byte_at(end), b'0' | b'1') {
                    end += 1;
                }
                if end > body && !self.is_ident(self.byte_at(end)) {
                    let value = self.slice_text(body, end);
                    Some(self.token(Symbol::BIN_NUM, end, Some(value)))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Find the end of the string literal opening at `start` and decode it.
    /// `None` when it never closes.
    fn read_text(&self, start: usize) -> Option<(usize, String)> {
        let charset = self.options.charset;
        let escapes = !self.options.sql_mode.contains(SqlMode::NO_BACKSLASH_ESCAPES);
        let sep = self.src[start];
        let mut at = start + 1;
        while at < self.src.len() {
            let mb = charset.mb_len(&self.src[at..]);
            if mb > 0 {
                at += mb;
                continue;
            }
            let b = self.src[at];
            at += 1;
            if b == b'\\' && escapes {
                if at >= self.src.len() {
                    return None;
                }
                at += charset.char_len(&self.src[at..]);
            } else if b == sep {
                if self.byte_at(at) == sep {
                    at += 1;
                    continue;
                }
                let body = &self.src[start + 1..at - 1];
                let value = unescape(body, sep, escapes, charset);
                return Some((at, String::from_utf8_lossy(&value).into_owned()));
            }
        }
        None
    }

    /// Backtick (or ANSI double-quote) identifier opening at `start`. The
    /// returned end includes the closing quote; an unterminated name runs to
    /// end of input.
    fn read_quoted_ident(&self, start: usize) -> (usize, String) {
        let charset = self.options.charset;
        let quote = self.src[start];
        let body = start + 1;
        let mut at = body;
        let mut doubled = false;
        while at < self.src.len() {
            if self.src[at] == quote {
                if self.byte_at(at + 1) == quote {
                    doubled = true;
                    at += 2;
                    continue;
                }
                break;
            }
            at += charset.char_len(&self.src[at..]);
        }
        let raw = &self.src[body..at.min(self.src.len())];
        let value = if doubled {
            let mut out = Vec::with_capacity(raw.len());
            let mut idx = 0;
            while idx < raw.len() {
                out.push(raw[idx]);
                idx += if raw[idx] == quote { 2 } else { 1 };
            }
            String::from_utf8_lossy(&out).into_owned()
        } else {
            String::from_utf8_lossy(raw).into_owned()
        };
        let end = if at < self.src.len() { at + 1 } else { at };
        (end, value)
    }
}

fn parse_version(digits: &[u8]) -> u64 {
    digits.iter().fold(0u64, |acc, &d| {
        acc.saturating_mul(10).saturating_add(u64::from(d - b'0'))
    })
}

/// Decode the body of a string literal.
fn unescape(body: &[u8], sep: u8, escapes: bool, charset: Charset) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut at = 0;
    while at < body.len() {
        let mb = charset.mb_len(&body[at..]);
        if mb > 0 {
            out.extend_from_slice(&body[at..at + mb]);
            at += mb;
            continue;
        }
        let b = body[at];
        if escapes && b == b'\\' && at + 1 < body.len() {
            let next = body[at + 1];
            let decoded = match next {
                b'n' => Some(b'\n'),
                b't' => Some(b'\t'),
                b'r' => Some(b'\r'),
                b'b' => Some(0x08),
                b'0' => Some(0),
                b'Z' => Some(0x1A),
                _ => None,
            };
            if let Some(byte) = decoded {
                out.push(byte);
                at += 2;
                continue;
            }
            // `\_` and `\%` keep the backslash for LIKE patterns
            if next == b'_' || next == b'%' {
                out.push(b'\\');
            }
            at += 1;
            let len = charset.char_len(&body[at..]);
            out.extend_from_slice(&body[at..at + len]);
            at += len;
            continue;
        }
        if b == sep {
            out.push(sep);
            at += if body.get(at + 1) == Some(&sep) { 2 } else { 1 };
            continue;
        }
        out.push(b);
        at += 1;
    }
    out
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    /// Yields every token up to and including `END_OF_INPUT`.
    fn next(&mut self) -> Option<Token> {
        if self.next_state == State::End {
            return None;
        }
        Some(self.next_token())
    }
}

/// Scan `text` completely. The last token is `END_OF_INPUT`.
pub fn tokenize(text: &[u8], options: ScanOptions) -> Vec<Token> {
    Scanner::new(text, options).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(sql: &str) -> Vec<Token> {
        tokenize(sql.as_bytes(), ScanOptions::default())
    }

    fn scan_mode(sql: &str, mode: SqlMode) -> Vec<Token> {
        tokenize(sql.as_bytes(), ScanOptions::default().with_sql_mode(mode))
    }

    fn kinds(sql: &str) -> Vec<Symbol> {
        scan(sql).into_iter().map(|t| t.symbol).collect()
    }

    fn values(sql: &str) -> Vec<Option<String>> {
        scan(sql).into_iter().map(|t| t.value).collect()
    }

    #[test]
    fn simple_select() {
        assert_eq!(
            kinds("select a, b from t"),
            vec![
                Symbol::KW_SELECT,
                Symbol::IDENT,
                Symbol::from_char(b','),
                Symbol::IDENT,
                Symbol::KW_FROM,
                Symbol::IDENT,
                Symbol::END_OF_INPUT,
            ]
        );
    }

    #[test]
    fn end_repeats_after_end_of_input() {
        let mut scanner = Scanner::new(b"x", ScanOptions::default());
        assert_eq!(scanner.next_token().symbol, Symbol::IDENT);
        assert_eq!(scanner.next_token().symbol, Symbol::END_OF_INPUT);
        assert_eq!(scanner.next_token().symbol, Symbol::END);
        assert_eq!(scanner.next_token().symbol, Symbol::END);
        assert!(scanner.next().is_none());
    }

    #[test]
    fn spans_are_exact() {
        let sql = "select   `my``col` ,'it''s'";
        let tokens = scan(sql);
        let texts: Vec<&str> = tokens.iter().map(|t| &sql[t.span.range()]).collect();
        assert_eq!(texts, vec!["select", "`my``col`", ",", "'it''s'", ""]);
        assert_eq!(tokens[1].value.as_deref(), Some("my`col"));
        assert_eq!(tokens[3].value.as_deref(), Some("it's"));
    }

    #[test]
    fn keyword_only_before_paren_for_functions() {
        assert_eq!(kinds("count(*)")[0], Symbol::FN_COUNT);
        assert_eq!(kinds("count (*)")[0], Symbol::IDENT);
        assert_eq!(kinds("count")[0], Symbol::IDENT);
        assert_eq!(kinds("varchar(10)")[0], Symbol::KW_VARCHAR);
        let spaced = scan_mode("count (*)", SqlMode::IGNORE_SPACE);
        assert_eq!(spaced[0].symbol, Symbol::FN_COUNT);
        assert_eq!(spaced[0].span, Span::new(0, 5));
    }

    #[test]
    fn qualified_names_are_never_keywords() {
        assert_eq!(
            kinds("select.from"),
            vec![
                Symbol::IDENT,
                Symbol::from_char(b'.'),
                Symbol::IDENT,
                Symbol::END_OF_INPUT
            ]
        );
        assert_eq!(
            kinds("db.t.1e5"),
            vec![
                Symbol::IDENT,
                Symbol::from_char(b'.'),
                Symbol::IDENT,
                Symbol::from_char(b'.'),
                Symbol::IDENT,
                Symbol::END_OF_INPUT
            ]
        );
    }

    #[test]
    fn non_ascii_identifiers_are_flagged() {
        let tokens = scan("select größe from straße");
        assert_eq!(tokens[1].symbol, Symbol::IDENT_QUOTED);
        assert_eq!(tokens[1].value.as_deref(), Some("größe"));
        assert_eq!(tokens[3].symbol, Symbol::IDENT_QUOTED);
    }

    #[test]
    fn charset_introducer() {
        assert_eq!(
            kinds("_utf8'abc'"),
            vec![Symbol::UNDERSCORE_CHARSET, Symbol::TEXT_STRING, Symbol::END_OF_INPUT]
        );
        assert_eq!(kinds("_bla")[0], Symbol::IDENT);
    }

    #[test]
    fn number_classes() {
        assert_eq!(kinds("42")[0], Symbol::NUM);
        assert_eq!(kinds("2147483647")[0], Symbol::NUM);
        assert_eq!(kinds("2147483648")[0], Symbol::LONG_NUM);
        assert_eq!(kinds("9223372036854775808")[0], Symbol::ULONGLONG_NUM);
        assert_eq!(kinds("18446744073709551616")[0], Symbol::DECIMAL_NUM);
        assert_eq!(kinds("1.5")[0], Symbol::DECIMAL_NUM);
        assert_eq!(kinds(".5")[0], Symbol::DECIMAL_NUM);
        assert_eq!(kinds("1.5e10")[0], Symbol::FLOAT_NUM);
        assert_eq!(kinds("1e-3")[0], Symbol::FLOAT_NUM);
        assert_eq!(kinds("2e5")[0], Symbol::FLOAT_NUM);
        assert_eq!(kinds("123abc")[0], Symbol::IDENT);
        assert_eq!(kinds("1ex")[0], Symbol::IDENT);
    }

    #[test]
    fn integer_boundaries_by_string_compare() {
        assert_eq!(classify_integer(b"-2147483648"), Symbol::NUM);
        assert_eq!(classify_integer(b"-2147483649"), Symbol::LONG_NUM);
        assert_eq!(classify_integer(b"-9223372036854775808"), Symbol::LONG_NUM);
        assert_eq!(classify_integer(b"-9223372036854775809"), Symbol::DECIMAL_NUM);
        assert_eq!(classify_integer(b"-92233720368547758080"), Symbol::DECIMAL_NUM);
        assert_eq!(classify_integer(b"9223372036854775807"), Symbol::LONG_NUM);
        assert_eq!(classify_integer(b"18446744073709551615"), Symbol::ULONGLONG_NUM);
        assert_eq!(classify_integer(b"000000000000000000042"), Symbol::NUM);
        assert_eq!(classify_integer(b"+2147483648"), Symbol::LONG_NUM);
    }

    #[test]
    fn hex_and_bin_literals() {
        let tokens = scan("0x1F x'0aFF' 0b101 b'01' 0x 0xZZ X'abc'");
        assert_eq!(tokens[0].symbol, Symbol::HEX_NUM);
        assert_eq!(tokens[0].value.as_deref(), Some("0x1F"));
        assert_eq!(tokens[1].symbol, Symbol::HEX_NUM);
        assert_eq!(tokens[1].value.as_deref(), Some("0aFF"));
        assert_eq!(tokens[2].symbol, Symbol::BIN_NUM);
        assert_eq!(tokens[2].value.as_deref(), Some("101"));
        assert_eq!(tokens[3].symbol, Symbol::BIN_NUM);
        assert_eq!(tokens[3].value.as_deref(), Some("01"));
        assert_eq!(tokens[4].symbol, Symbol::IDENT);
        assert_eq!(tokens[5].symbol, Symbol::IDENT);
        assert_eq!(tokens[6].symbol, Symbol::ABORT_SYM);
    }

    #[test]
    fn malformed_literal_abort_ends_on_char_boundary() {
        for sql in ["x'¡", "b'0日'", "x'a€b'"] {
            let tokens = scan(sql);
            assert_eq!(tokens[0].symbol, Symbol::ABORT_SYM, "{sql}");
            for token in &tokens {
                assert!(sql.is_char_boundary(token.span.start as usize), "{sql}: {token:?}");
                assert!(sql.is_char_boundary(token.span.end as usize), "{sql}: {token:?}");
            }
        }
        assert_eq!(scan("x'¡")[0].span, Span::new(0, 4));
    }

    #[test]
    fn national_strings() {
        let tokens = scan("N'abc' nick");
        assert_eq!(tokens[0].symbol, Symbol::NCHAR_STRING);
        assert_eq!(tokens[0].value.as_deref(), Some("abc"));
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[1].symbol, Symbol::IDENT);
    }

    #[test]
    fn string_escapes() {
        let sql = r"'a\nb\tc\0\Z\_\%\q\\'";
        let tokens = scan(sql);
        assert_eq!(tokens[0].symbol, Symbol::TEXT_STRING);
        assert_eq!(
            tokens[0].value.as_deref(),
            Some("a\nb\tc\0\u{1a}\\_\\%q\\")
        );
        assert_eq!(&sql[tokens[0].span.range()], sql);
    }

    #[test]
    fn no_backslash_escapes_mode() {
        let tokens = scan_mode(r"'a\' x", SqlMode::NO_BACKSLASH_ESCAPES);
        assert_eq!(tokens[0].symbol, Symbol::TEXT_STRING);
        assert_eq!(tokens[0].value.as_deref(), Some(r"a\"));
        assert_eq!(tokens[1].symbol, Symbol::IDENT);
    }

    #[test]
    fn double_quotes_follow_ansi_mode() {
        assert_eq!(kinds("\"abc\"")[0], Symbol::TEXT_STRING);
        let ansi = scan_mode("\"a\"\"b\"", SqlMode::ANSI_QUOTES);
        assert_eq!(ansi[0].symbol, Symbol::IDENT_QUOTED);
        assert_eq!(ansi[0].value.as_deref(), Some("a\"b"));
    }

    #[test]
    fn unterminated_string_becomes_quote_token() {
        assert_eq!(
            kinds("'abc"),
            vec![Symbol::from_char(b'\''), Symbol::IDENT, Symbol::END_OF_INPUT]
        );
    }

    #[test]
    fn multibyte_string_content_is_verbatim() {
        let tokens = scan("'héllo\\é'");
        assert_eq!(tokens[0].value.as_deref(), Some("hélloé"));
    }

    #[test]
    fn operators() {
        assert_eq!(
            kinds("a <=> b <> c != d >= e << f || g && h := i"),
            vec![
                Symbol::IDENT,
                Symbol::OP_EQUAL,
                Symbol::IDENT,
                Symbol::OP_NE,
                Symbol::IDENT,
                Symbol::OP_NE,
                Symbol::IDENT,
                Symbol::OP_GE,
                Symbol::IDENT,
                Symbol::OP_SHIFT_LEFT,
                Symbol::IDENT,
                Symbol::OR2_SYM,
                Symbol::IDENT,
                Symbol::OP_AND_AND,
                Symbol::IDENT,
                Symbol::SET_VAR,
                Symbol::IDENT,
                Symbol::END_OF_INPUT,
            ]
        );
        assert_eq!(kinds("a == b")[1], Symbol::from_char(b'='));
    }

    #[test]
    fn sql_mode_token_swaps() {
        assert_eq!(scan_mode("a || b", SqlMode::PIPES_AS_CONCAT)[1].symbol, Symbol::OP_OR_OR);
        assert_eq!(kinds("not a")[0], Symbol::KW_NOT);
        assert_eq!(
            scan_mode("not a", SqlMode::HIGH_NOT_PRECEDENCE)[0].symbol,
            Symbol::NOT2_SYM
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("a -- note\nb # more\nc /* block */ d --"),
            vec![
                Symbol::IDENT,
                Symbol::IDENT,
                Symbol::IDENT,
                Symbol::IDENT,
                Symbol::END_OF_INPUT
            ]
        );
        // `--` without following space is two minus signs
        assert_eq!(
            kinds("a--b"),
            vec![
                Symbol::IDENT,
                Symbol::from_char(b'-'),
                Symbol::from_char(b'-'),
                Symbol::IDENT,
                Symbol::END_OF_INPUT
            ]
        );
        assert_eq!(kinds("a / b")[1], Symbol::from_char(b'/'));
    }

    #[test]
    fn versioned_comments_follow_server_version() {
        assert_eq!(
            kinds("/*!40101 SET x */"),
            vec![Symbol::KW_SET, Symbol::IDENT, Symbol::END_OF_INPUT]
        );
        assert_eq!(kinds("/*!99999 SET x */ y"), vec![Symbol::IDENT, Symbol::END_OF_INPUT]);
        assert_eq!(kinds("/*! SET */")[0], Symbol::KW_SET);
        let opts = ScanOptions {
            server_version: 40_000,
            ..ScanOptions::default()
        };
        let tokens = tokenize(b"/*!40101 SET */ a", opts);
        assert_eq!(tokens[0].symbol, Symbol::IDENT);
    }

    #[test]
    fn variables_and_hosts() {
        assert_eq!(
            kinds("'root'@localhost"),
            vec![
                Symbol::TEXT_STRING,
                Symbol::from_char(b'@'),
                Symbol::LEX_HOSTNAME,
                Symbol::END_OF_INPUT
            ]
        );
        assert_eq!(
            kinds("@@global.sort_buffer_size"),
            vec![
                Symbol::from_char(b'@'),
                Symbol::from_char(b'@'),
                Symbol::KW_GLOBAL,
                Symbol::from_char(b'.'),
                Symbol::IDENT,
                Symbol::END_OF_INPUT
            ]
        );
        assert_eq!(
            kinds("'u'@'h'"),
            vec![
                Symbol::TEXT_STRING,
                Symbol::from_char(b'@'),
                Symbol::TEXT_STRING,
                Symbol::END_OF_INPUT
            ]
        );
    }

    #[test]
    fn null_shortcut_and_param_markers() {
        assert_eq!(kinds("\\N")[0], Symbol::KW_NULL);
        assert_eq!(kinds("?")[0], Symbol::from_char(b'?'));
        let opts = ScanOptions {
            param_markers: true,
            ..ScanOptions::default()
        };
        assert_eq!(tokenize(b"? ", opts)[0].symbol, Symbol::PARAM_MARKER);
        assert_eq!(tokenize(b"?a", opts)[0].symbol, Symbol::from_char(b'?'));
    }

    #[test]
    fn trailing_semicolon_ends_input() {
        assert_eq!(kinds("a;"), vec![Symbol::IDENT, Symbol::END_OF_INPUT]);
        assert_eq!(
            kinds("a; b"),
            vec![
                Symbol::IDENT,
                Symbol::from_char(b';'),
                Symbol::IDENT,
                Symbol::END_OF_INPUT
            ]
        );
    }

    #[test]
    fn line_numbers_count_crlf_once() {
        let tokens = scan("a\r\nb\rc\nd\n\ne");
        let lines: Vec<u32> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4, 6, 6]);
    }

    #[test]
    fn sign_context_tracking() {
        let mut scanner = Scanner::new(b"a - 1", ScanOptions::default());
        scanner.next_token();
        assert!(scanner.prev_was_operand());
        scanner.next_token();
        assert!(!scanner.prev_was_operand());
        scanner.next_token();
        assert!(scanner.prev_was_operand());
    }

    #[test]
    fn cancellation_ends_the_stream() {
        let cancel = Cancellation::new();
        let mut scanner = Scanner::new(b"a b c", ScanOptions::default()).with_cancellation(cancel.clone());
        assert_eq!(scanner.next_token().symbol, Symbol::IDENT);
        cancel.cancel();
        assert_eq!(scanner.next_token().symbol, Symbol::END_OF_INPUT);
        assert_eq!(scanner.next_token().symbol, Symbol::END);
    }

    #[test]
    fn values_carry_source_words() {
        assert_eq!(
            values("Select 1"),
            vec![Some("Select".to_owned()), Some("1".to_owned()), None]
        );
    }

    #[test]
    fn metrics_count_tokens() {
        let before = tokenize_metrics_snapshot();
        let _ = scan("a b c");
        let after = tokenize_metrics_snapshot();
        assert!(after.tokens_total >= before.tokens_total + 4);
        assert!(after.scans_total > before.scans_total);
    }
}
