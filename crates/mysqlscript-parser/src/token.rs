use mysqlscript_ast::{Span, Symbol};

/// One scanned token. Spans are byte offsets into the statement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: Symbol,
    pub span: Span,
    /// Decoded literal: unquoted identifier, unescaped string, digits of a
    /// `x'..'` literal. Plain words and operators carry their source text.
    pub value: Option<String>,
    /// 1-based line of the first byte, relative to the statement.
    pub line: u32,
}

impl Token {
    pub const fn new(symbol: Symbol, span: Span, value: Option<String>, line: u32) -> Self {
        Self {
            symbol,
            span,
            value,
            line,
        }
    }

    /// Whether the stream has ended (`END_OF_INPUT` or the trailing `END`).
    pub fn is_end(&self) -> bool {
        self.symbol == Symbol::END_OF_INPUT || self.symbol == Symbol::END
    }

    /// Source bytes covered by the token.
    pub fn text<'a>(&self, statement: &'a [u8]) -> &'a [u8] {
        statement.get(self.span.range()).unwrap_or_default()
    }
}
