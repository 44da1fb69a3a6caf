//! Keyword lookup tables.
//!
//! Two process-wide tables are built on first use: the general keyword
//! table, consulted for every word, and the function table, consulted when a
//! word is directly followed by `(`. The function table also holds every
//! general keyword so that type names such as `varchar(10)` still resolve.

use std::collections::HashMap;
use std::sync::OnceLock;

use mysqlscript_ast::Symbol;
use mysqlscript_types::Charset;

/// Longest keyword or operator text, in bytes.
const MAX_KEYWORD_LEN: usize = 32;

/// Spellings that share a symbol with a canonical keyword.
const KEYWORD_ALIASES: &[(&str, Symbol)] = &[
    ("!=", Symbol::OP_NE),
    ("CHARACTER", Symbol::KW_CHAR),
    ("CURRENT_DATE", Symbol::FN_CURDATE),
    ("CURRENT_TIME", Symbol::FN_CURTIME),
    ("CURRENT_TIMESTAMP", Symbol::FN_NOW),
    ("DEC", Symbol::KW_DECIMAL),
    ("DISTINCTROW", Symbol::KW_DISTINCT),
    ("FIELDS", Symbol::KW_COLUMNS),
    ("FLOAT4", Symbol::KW_FLOAT),
    ("FLOAT8", Symbol::KW_DOUBLE),
    ("INT1", Symbol::KW_TINYINT),
    ("INT2", Symbol::KW_SMALLINT),
    ("INT3", Symbol::KW_MEDIUMINT),
    ("INT4", Symbol::KW_INT),
    ("INT8", Symbol::KW_BIGINT),
    ("INTEGER", Symbol::KW_INT),
    ("LOCALTIME", Symbol::FN_NOW),
    ("LOCALTIMESTAMP", Symbol::FN_NOW),
    ("MIDDLEINT", Symbol::KW_MEDIUMINT),
    ("RLIKE", Symbol::KW_REGEXP),
    ("SCHEMA", Symbol::KW_DATABASE),
    ("SCHEMAS", Symbol::KW_DATABASES),
    ("VARCHARACTER", Symbol::KW_VARCHAR),
];

/// Function spellings that share a symbol with a canonical function keyword.
const FUNCTION_ALIASES: &[(&str, Symbol)] = &[
    ("MID", Symbol::FN_SUBSTRING),
    ("SESSION_USER", Symbol::KW_USER),
    ("STDDEV", Symbol::FN_STD),
    ("STDDEV_POP", Symbol::FN_STD),
    ("SUBSTR", Symbol::FN_SUBSTRING),
    ("SYSTEM_USER", Symbol::KW_USER),
    ("VAR_POP", Symbol::FN_VARIANCE),
];

type Table = HashMap<&'static [u8], Symbol>;

fn keyword_table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = Table::new();
        for symbol in Symbol::keywords() {
            if let Some(name) = symbol.table_name() {
                table.insert(name.as_bytes(), symbol);
            }
        }
        for &(name, symbol) in KEYWORD_ALIASES {
            table.insert(name.as_bytes(), symbol);
        }
        table
    })
}

fn function_table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = keyword_table().clone();
        for symbol in Symbol::functions() {
            if let Some(name) = symbol.table_name() {
                table.insert(name.as_bytes(), symbol);
            }
        }
        for &(name, symbol) in FUNCTION_ALIASES {
            table.insert(name.as_bytes(), symbol);
        }
        table
    })
}

/// Look `word` up case-insensitively. With `function` set the function
/// table is used, otherwise the general keyword table.
pub fn lookup(word: &[u8], function: bool) -> Option<Symbol> {
    if word.is_empty() || word.len() > MAX_KEYWORD_LEN {
        return None;
    }
    let mut buf = [0u8; MAX_KEYWORD_LEN];
    let upper = &mut buf[..word.len()];
    for (dst, &byte) in upper.iter_mut().zip(word) {
        *dst = Charset::Ascii.to_upper(byte);
    }
    let table = if function {
        function_table()
    } else {
        keyword_table()
    };
    table.get(&*upper).copied()
}

/// Whether `word` is in the general keyword table.
pub fn is_keyword(word: &str) -> bool {
    lookup(word.as_bytes(), false).is_some()
}
