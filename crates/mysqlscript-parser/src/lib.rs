//! MySQL script front end.
//!
//! Splits scripts into statements with `DELIMITER` handling, scans each
//! statement with the MySQL dialect scanner (SQL modes, versioned comments,
//! charset-aware identifiers) and hands the token stream to a grammar that
//! builds an `mysqlscript-ast` tree.

pub mod frontend;
pub mod grammar;
pub mod keywords;
pub mod lexer;
pub mod options;
pub mod position;
pub mod splitter;
pub mod token;
pub mod versioning;

pub use frontend::{
    FirstToken, ParseMetricsSnapshot, RunOutcome, RunSummary, ScriptParser, StatementError,
    StatementReport, escape_string, first_sql_token, is_statement_relevant, parse_metrics_snapshot,
    reset_parse_metrics,
};
pub use grammar::{FlatGrammar, Grammar, GrammarError, Lexeme, ParseContext};
pub use lexer::{
    DEFAULT_SERVER_VERSION, ScanOptions, Scanner, TokenizeMetricsSnapshot, classify_integer,
    reset_tokenize_metrics, tokenize, tokenize_metrics_snapshot,
};
pub use options::ParserOptions;
pub use position::{Position, StatementOrigin};
pub use splitter::{
    SplitMetricsSnapshot, SplitMode, SplitSummary, Statement, StatementSplitter,
    reset_split_metrics, split_metrics_snapshot, split_script, statement_ranges,
};
pub use token::Token;
pub use versioning::{VersionedSql, remove_versioning_comments};
