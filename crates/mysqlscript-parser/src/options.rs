//! Front-end configuration.

use serde::{Deserialize, Serialize};

use mysqlscript_error::{Result, ScriptError};
use mysqlscript_types::{Charset, SqlMode};

use crate::lexer::{DEFAULT_SERVER_VERSION, ScanOptions};
use crate::splitter::SplitMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserOptions {
    #[serde(with = "mysqlscript_types::sql_mode::text")]
    pub sql_mode: SqlMode,
    /// Delimiter in effect at the start of every run.
    pub delimiter: String,
    /// Drop text after the last delimiter instead of parsing it.
    pub require_trailing_delimiter: bool,
    /// Skip `SELECT`, `INSERT`, `UPDATE` and `DELETE`.
    pub ignore_dml: bool,
    /// With AST generation on, `INSERT` statements longer than this many
    /// bytes are skipped. 0 disables the limit.
    pub max_insert_statement_size: usize,
    pub process_create: bool,
    pub process_alter: bool,
    pub process_drop: bool,
    pub ast_generation: bool,
    /// Stop the run once this many statements failed.
    pub max_error_count: Option<u32>,
    pub charset: Charset,
    pub server_version: u32,
    pub param_markers: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            sql_mode: SqlMode::empty(),
            delimiter: ";".to_owned(),
            require_trailing_delimiter: false,
            ignore_dml: true,
            max_insert_statement_size: 0,
            process_create: true,
            process_alter: true,
            process_drop: true,
            ast_generation: true,
            max_error_count: None,
            charset: Charset::Utf8,
            server_version: DEFAULT_SERVER_VERSION,
            param_markers: false,
        }
    }
}

impl ParserOptions {
    /// Decode options from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json).map_err(|err| ScriptError::InvalidOptions {
            detail: err.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| ScriptError::internal(err.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.delimiter.trim().is_empty() || self.delimiter.contains(['\n', '\r']) {
            return Err(ScriptError::InvalidDelimiter {
                delimiter: self.delimiter.clone(),
            });
        }
        if self.max_error_count == Some(0) {
            return Err(ScriptError::invalid_options(
                "max_error_count must be positive; omit it for no limit",
            ));
        }
        Ok(())
    }

    pub fn with_sql_mode(mut self, sql_mode: SqlMode) -> Self {
        self.sql_mode = sql_mode;
        self
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            sql_mode: self.sql_mode,
            charset: self.charset,
            server_version: self.server_version,
            param_markers: self.param_markers,
        }
    }

    pub const fn split_mode(&self) -> SplitMode {
        if self.require_trailing_delimiter {
            SplitMode::DelimiterRequired
        } else {
            SplitMode::Normal
        }
    }
}
