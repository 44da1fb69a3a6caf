//! Seam between the front end and a concrete grammar.
//!
//! A [`Grammar`] pulls tokens from a [`ParseContext`] and builds its tree
//! through the context's [`AstSink`] implementation. Every scanned token is
//! already a terminal node when the grammar sees it, carrying its exact byte
//! span, so the grammar only has to arrange nodes.

use thiserror::Error;

use mysqlscript_ast::{Ast, AstSink, NodeId, Symbol};
use mysqlscript_types::Cancellation;

use crate::lexer::{ScanOptions, Scanner};
use crate::token::Token;

/// Failure reported by a grammar for one statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// Plain syntax error; the front end adds the offending text.
    #[error("syntax error")]
    Syntax,
    #[error("{0}")]
    Message(String),
}

/// A token together with the terminal node recorded for it.
#[derive(Debug, Clone)]
pub struct Lexeme {
    pub token: Token,
    /// `None` for the end of input and when tree building is off.
    pub node: Option<NodeId>,
}

pub trait Grammar {
    /// Parse one statement and return the root of its tree.
    fn parse(&mut self, cx: &mut ParseContext<'_>) -> Result<NodeId, GrammarError>;
}

impl<F> Grammar for F
where
    F: FnMut(&mut ParseContext<'_>) -> Result<NodeId, GrammarError>,
{
    fn parse(&mut self, cx: &mut ParseContext<'_>) -> Result<NodeId, GrammarError> {
        self(cx)
    }
}

/// Token source and tree sink for one statement.
#[derive(Debug)]
pub struct ParseContext<'t> {
    scanner: Scanner<'t>,
    ast: Ast,
    ast_generation: bool,
    first: Option<Token>,
    last: Option<Token>,
    token_count: usize,
}

impl<'t> ParseContext<'t> {
    pub fn new(text: &'t [u8], options: ScanOptions) -> Self {
        Self {
            scanner: Scanner::new(text, options),
            ast: Ast::new(),
            ast_generation: true,
            first: None,
            last: None,
            token_count: 0,
        }
    }

    /// Reuse `ast`'s allocation for this statement.
    pub fn with_ast(mut self, mut ast: Ast) -> Self {
        ast.clear();
        self.ast = ast;
        self
    }

    pub fn with_ast_generation(mut self, enabled: bool) -> Self {
        self.ast_generation = enabled;
        self
    }

    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.scanner = self.scanner.with_cancellation(cancel);
        self
    }

    /// Scan the next token and record it as a terminal node.
    pub fn next_token(&mut self) -> Lexeme {
        let token = self.scanner.next_token();
        if token.is_end() {
            return Lexeme { token, node: None };
        }
        self.token_count += 1;
        let node = self.ast_generation.then(|| {
            let raw;
            let value = match token.value.as_deref() {
                Some(value) => value,
                None => {
                    raw = String::from_utf8_lossy(token.text(self.scanner.text())).into_owned();
                    raw.as_str()
                }
            };
            self.ast.new_terminal(
                token.symbol,
                Some(value),
                Some(token.line),
                Some(token.span.start),
                Some(token.span.end),
            )
        });
        if self.first.is_none() {
            self.first = Some(token.clone());
        }
        self.last = Some(token.clone());
        Lexeme { token, node }
    }

    pub const fn prev_was_operand(&self) -> bool {
        self.scanner.prev_was_operand()
    }

    pub const fn text(&self) -> &'t [u8] {
        self.scanner.text()
    }

    pub const fn ast_generation(&self) -> bool {
        self.ast_generation
    }

    pub const fn first_token(&self) -> Option<&Token> {
        self.first.as_ref()
    }

    /// Most recently scanned token; the error position on failure.
    pub const fn last_token(&self) -> Option<&Token> {
        self.last.as_ref()
    }

    pub const fn token_count(&self) -> usize {
        self.token_count
    }

    pub const fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn into_ast(self) -> Ast {
        self.ast
    }
}

impl AstSink for ParseContext<'_> {
    fn new_node(&mut self, symbol: Symbol) -> NodeId {
        self.ast.new_node(symbol)
    }

    fn reuse_node(&mut self, node: Option<NodeId>, symbol: Symbol) -> NodeId {
        self.ast.reuse_node(node, symbol)
    }

    fn retag(&mut self, node: Option<NodeId>, symbol: Symbol) -> Option<NodeId> {
        self.ast.retag(node, symbol)
    }

    fn append_child(&mut self, parent: Option<NodeId>, child: Option<NodeId>) {
        self.ast.append_child(parent, child);
    }

    fn merge_children(&mut self, dst: Option<NodeId>, src: Option<NodeId>) {
        self.ast.merge_children(dst, src);
    }

    fn new_terminal(
        &mut self,
        symbol: Symbol,
        value: Option<&str>,
        line: Option<u32>,
        begin: Option<u32>,
        end: Option<u32>,
    ) -> NodeId {
        self.ast.new_terminal(symbol, value, line, begin, end)
    }
}

/// Structure-free grammar: a `statement` node holding every token, with
/// parenthesised groups nested as `expr` nodes. Useful wherever token
/// positions matter but SQL structure does not.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatGrammar;

impl Grammar for FlatGrammar {
    fn parse(&mut self, cx: &mut ParseContext<'_>) -> Result<NodeId, GrammarError> {
        let open = Symbol::from_char(b'(');
        let close = Symbol::from_char(b')');
        let root = cx.new_node(Symbol::NT_STATEMENT);
        let mut groups = vec![root];
        loop {
            let Lexeme { token, node } = cx.next_token();
            if token.is_end() {
                break;
            }
            let top = groups.last().copied().unwrap_or(root);
            match token.symbol {
                Symbol::ABORT_SYM => return Err(GrammarError::Syntax),
                symbol if symbol == open => {
                    let group = cx.new_node(Symbol::NT_EXPR);
                    cx.append_child(Some(top), Some(group));
                    cx.append_child(Some(group), node);
                    groups.push(group);
                }
                symbol if symbol == close => {
                    if groups.len() == 1 {
                        return Err(GrammarError::Syntax);
                    }
                    cx.append_child(Some(top), node);
                    groups.pop();
                }
                _ => cx.append_child(Some(top), node),
            }
        }
        if groups.len() > 1 {
            return Err(GrammarError::Message(format!(
                "{} unclosed parenthesis at end of statement",
                groups.len() - 1
            )));
        }
        Ok(root)
    }
}
