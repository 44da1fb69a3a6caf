//! Server SQL-mode toggles that change how scripts are tokenized.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// The subset of `@@sql_mode` that affects lexing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SqlMode: u8 {
        /// `"` quotes identifiers instead of strings.
        const ANSI_QUOTES = 1;
        /// `NOT` binds tighter than comparison operators.
        const HIGH_NOT_PRECEDENCE = 1 << 1;
        /// `||` is string concatenation rather than logical OR.
        const PIPES_AS_CONCAT = 1 << 2;
        /// Backslash is an ordinary character inside string literals.
        const NO_BACKSLASH_ESCAPES = 1 << 3;
        /// Whitespace may separate a function name from its `(`.
        const IGNORE_SPACE = 1 << 4;
    }
}

/// Composite modes that imply ANSI behavior.
const ANSI_LIKE: &[&str] = &["ANSI", "DB2", "MSSQL", "ORACLE", "POSTGRESQL"];

impl SqlMode {
    /// Parse a comma-separated `sql_mode` value.
    ///
    /// Names are case-insensitive; names that do not affect lexing are
    /// ignored, as the server itself accepts many more modes.
    pub fn parse(text: &str) -> Self {
        let mut mode = Self::empty();
        for name in text.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let upper = name.to_ascii_uppercase();
            if ANSI_LIKE.contains(&upper.as_str()) {
                mode |= Self::ANSI_QUOTES | Self::PIPES_AS_CONCAT | Self::IGNORE_SPACE;
            } else if let Some(flag) = Self::from_name(&upper) {
                mode |= flag;
            }
        }
        mode
    }
}

impl fmt::Display for SqlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for (name, _) in self.iter_names() {
            write!(f, "{sep}{name}")?;
            sep = ",";
        }
        Ok(())
    }
}

/// Serde adapter storing a [`SqlMode`] as its comma-separated text form.
///
/// Use with `#[serde(with = "mysqlscript_types::sql_mode::text")]`.
pub mod text {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::SqlMode;

    pub fn serialize<S: Serializer>(mode: &SqlMode, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(mode)
    }

    /// Accepts either `"A,B"` or `["A", "B"]`.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        List(Vec<String>),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SqlMode, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => SqlMode::parse(&text),
            Repr::List(names) => SqlMode::parse(&names.join(",")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_individual_modes() {
        let mode = SqlMode::parse("ansi_quotes, NO_BACKSLASH_ESCAPES");
        assert_eq!(mode, SqlMode::ANSI_QUOTES | SqlMode::NO_BACKSLASH_ESCAPES);
        assert_eq!(
            SqlMode::parse("HIGH_NOT_PRECEDENCE"),
            SqlMode::HIGH_NOT_PRECEDENCE
        );
    }

    #[test]
    fn composite_modes_expand() {
        for name in ["ANSI", "db2", "MSSQL", "Oracle", "POSTGRESQL"] {
            let mode = SqlMode::parse(name);
            assert!(mode.contains(SqlMode::ANSI_QUOTES), "{name}");
            assert!(mode.contains(SqlMode::PIPES_AS_CONCAT), "{name}");
            assert!(mode.contains(SqlMode::IGNORE_SPACE), "{name}");
            assert!(!mode.contains(SqlMode::NO_BACKSLASH_ESCAPES), "{name}");
        }
    }

    #[test]
    fn unknown_modes_are_ignored() {
        assert_eq!(
            SqlMode::parse("STRICT_TRANS_TABLES,,NO_ZERO_DATE"),
            SqlMode::empty()
        );
        assert_eq!(SqlMode::parse(""), SqlMode::empty());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let mode = SqlMode::PIPES_AS_CONCAT | SqlMode::IGNORE_SPACE;
        assert_eq!(mode.to_string(), "PIPES_AS_CONCAT,IGNORE_SPACE");
        assert_eq!(SqlMode::parse(&mode.to_string()), mode);
    }

    #[test]
    fn text_adapter_in_serde() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            #[serde(with = "text")]
            mode: SqlMode,
        }
        let holder: Holder = serde_json::from_str(r#"{"mode":"ANSI"}"#).expect("valid json");
        assert!(holder.mode.contains(SqlMode::ANSI_QUOTES));
        let listed: Holder =
            serde_json::from_str(r#"{"mode":["pipes_as_concat","IGNORE_SPACE"]}"#).expect("list form");
        assert_eq!(listed.mode, SqlMode::PIPES_AS_CONCAT | SqlMode::IGNORE_SPACE);
        let json = serde_json::to_string(&Holder {
            mode: SqlMode::ANSI_QUOTES,
        })
        .expect("serializes");
        assert_eq!(json, r#"{"mode":"ANSI_QUOTES"}"#);
    }
}
