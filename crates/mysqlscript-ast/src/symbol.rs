//! Grammar symbols.
//!
//! A [`Symbol`] tags every node and token. Raw values `0..=255` are
//! single-byte character tokens (`Symbol::from_char(b'(')`); the named
//! symbols above them are generated from one table so that the constant, its
//! ordinal and its display name can never drift apart.

use std::borrow::Cow;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u16);

/// Broad classification of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A single-byte character token such as `(` or `,`.
    Char,
    /// A lexical class (`IDENT`, `NUM`, `TEXT_STRING`, ...).
    Terminal,
    /// A reserved or non-reserved word, or a keyword-table operator.
    Keyword,
    /// A word recognised only when directly followed by `(`.
    Function,
    /// A grammar production.
    NonTerminal,
    /// A raw value outside the generated table.
    Unknown,
}

macro_rules! symbol_table {
    (
        terminals { $($t:ident => $tn:literal,)* }
        keywords { $($k:ident => $kn:literal,)* }
        functions { $($f:ident => $fname:literal,)* }
        nonterminals { $($n:ident => $nn:literal,)* }
    ) => {
        #[allow(non_camel_case_types, clippy::upper_case_acronyms, dead_code)]
        #[repr(u16)]
        enum Ordinal {
            Base = 255,
            $($t,)*
            KeywordsStart,
            $($k,)*
            FunctionsStart,
            $($f,)*
            NonTerminalsStart,
            $($n,)*
            End,
        }

        #[allow(clippy::upper_case_acronyms)]
        impl Symbol {
            $(pub const $t: Self = Self(Ordinal::$t as u16);)*
            $(pub const $k: Self = Self(Ordinal::$k as u16);)*
            $(pub const $f: Self = Self(Ordinal::$f as u16);)*
            $(pub const $n: Self = Self(Ordinal::$n as u16);)*
        }

        /// Display names indexed by `raw - 256`; group markers map to "".
        const NAMES: &[&str] = &[$($tn,)* "", $($kn,)* "", $($fname,)* "", $($nn,)*];

        const KEYWORDS_START: u16 = Ordinal::KeywordsStart as u16;
        const FUNCTIONS_START: u16 = Ordinal::FunctionsStart as u16;
        const NONTERMINALS_START: u16 = Ordinal::NonTerminalsStart as u16;
        const TABLE_END: u16 = Ordinal::End as u16;
    };
}

symbol_table! {
    terminals {
        END_OF_INPUT => "END_OF_INPUT",
        ABORT_SYM => "ABORT_SYM",
        IDENT => "IDENT",
        IDENT_QUOTED => "IDENT_QUOTED",
        TEXT_STRING => "TEXT_STRING",
        NCHAR_STRING => "NCHAR_STRING",
        UNDERSCORE_CHARSET => "UNDERSCORE_CHARSET",
        NUM => "NUM",
        LONG_NUM => "LONG_NUM",
        ULONGLONG_NUM => "ULONGLONG_NUM",
        DECIMAL_NUM => "DECIMAL_NUM",
        FLOAT_NUM => "FLOAT_NUM",
        HEX_NUM => "HEX_NUM",
        BIN_NUM => "BIN_NUM",
        PARAM_MARKER => "PARAM_MARKER",
        SET_VAR => "SET_VAR",
        LEX_HOSTNAME => "LEX_HOSTNAME",
        OR2_SYM => "OR2_SYM",
        NOT2_SYM => "NOT2_SYM",
    }
    keywords {
        OP_AND_AND => "&&",
        OP_OR_OR => "||",
        OP_LT => "<",
        OP_LE => "<=",
        OP_NE => "<>",
        OP_EQ => "=",
        OP_GT => ">",
        OP_GE => ">=",
        OP_SHIFT_LEFT => "<<",
        OP_SHIFT_RIGHT => ">>",
        OP_EQUAL => "<=>",
        KW_ACCESSIBLE => "ACCESSIBLE",
        KW_ACTION => "ACTION",
        KW_ADD => "ADD",
        KW_AFTER => "AFTER",
        KW_AGAINST => "AGAINST",
        KW_AGGREGATE => "AGGREGATE",
        KW_ALGORITHM => "ALGORITHM",
        KW_ALL => "ALL",
        KW_ALTER => "ALTER",
        KW_ANALYZE => "ANALYZE",
        KW_AND => "AND",
        KW_ANY => "ANY",
        KW_AS => "AS",
        KW_ASC => "ASC",
        KW_ASCII => "ASCII",
        KW_ASENSITIVE => "ASENSITIVE",
        KW_AT => "AT",
        KW_AUTHORS => "AUTHORS",
        KW_AUTOEXTEND_SIZE => "AUTOEXTEND_SIZE",
        KW_AUTO_INCREMENT => "AUTO_INCREMENT",
        KW_AVG => "AVG",
        KW_AVG_ROW_LENGTH => "AVG_ROW_LENGTH",
        KW_BACKUP => "BACKUP",
        KW_BEFORE => "BEFORE",
        KW_BEGIN => "BEGIN",
        KW_BETWEEN => "BETWEEN",
        KW_BIGINT => "BIGINT",
        KW_BINARY => "BINARY",
        KW_BINLOG => "BINLOG",
        KW_BIT => "BIT",
        KW_BLOB => "BLOB",
        KW_BLOCK => "BLOCK",
        KW_BOOL => "BOOL",
        KW_BOOLEAN => "BOOLEAN",
        KW_BOTH => "BOTH",
        KW_BTREE => "BTREE",
        KW_BY => "BY",
        KW_BYTE => "BYTE",
        KW_CACHE => "CACHE",
        KW_CALL => "CALL",
        KW_CASCADE => "CASCADE",
        KW_CASCADED => "CASCADED",
        KW_CASE => "CASE",
        KW_CATALOG_NAME => "CATALOG_NAME",
        KW_CHAIN => "CHAIN",
        KW_CHANGE => "CHANGE",
        KW_CHANGED => "CHANGED",
        KW_CHAR => "CHAR",
        KW_CHARSET => "CHARSET",
        KW_CHECK => "CHECK",
        KW_CHECKSUM => "CHECKSUM",
        KW_CIPHER => "CIPHER",
        KW_CLASS_ORIGIN => "CLASS_ORIGIN",
        KW_CLIENT => "CLIENT",
        KW_CLOSE => "CLOSE",
        KW_COALESCE => "COALESCE",
        KW_CODE => "CODE",
        KW_COLLATE => "COLLATE",
        KW_COLLATION => "COLLATION",
        KW_COLUMN => "COLUMN",
        KW_COLUMNS => "COLUMNS",
        KW_COLUMN_NAME => "COLUMN_NAME",
        KW_COMMENT => "COMMENT",
        KW_COMMIT => "COMMIT",
        KW_COMMITTED => "COMMITTED",
        KW_COMPACT => "COMPACT",
        KW_COMPLETION => "COMPLETION",
        KW_COMPRESSED => "COMPRESSED",
        KW_CONCURRENT => "CONCURRENT",
        KW_CONDITION => "CONDITION",
        KW_CONNECTION => "CONNECTION",
        KW_CONSISTENT => "CONSISTENT",
        KW_CONSTRAINT => "CONSTRAINT",
        KW_CONSTRAINT_CATALOG => "CONSTRAINT_CATALOG",
        KW_CONSTRAINT_NAME => "CONSTRAINT_NAME",
        KW_CONSTRAINT_SCHEMA => "CONSTRAINT_SCHEMA",
        KW_CONTAINS => "CONTAINS",
        KW_CONTEXT => "CONTEXT",
        KW_CONTINUE => "CONTINUE",
        KW_CONTRIBUTORS => "CONTRIBUTORS",
        KW_CONVERT => "CONVERT",
        KW_CPU => "CPU",
        KW_CREATE => "CREATE",
        KW_CROSS => "CROSS",
        KW_CUBE => "CUBE",
        KW_CURRENT_USER => "CURRENT_USER",
        KW_CURSOR => "CURSOR",
        KW_CURSOR_NAME => "CURSOR_NAME",
        KW_DATA => "DATA",
        KW_DATABASE => "DATABASE",
        KW_DATABASES => "DATABASES",
        KW_DATAFILE => "DATAFILE",
        KW_DATE => "DATE",
        KW_DATETIME => "DATETIME",
        KW_DAY => "DAY",
        KW_DAY_HOUR => "DAY_HOUR",
        KW_DAY_MICROSECOND => "DAY_MICROSECOND",
        KW_DAY_MINUTE => "DAY_MINUTE",
        KW_DAY_SECOND => "DAY_SECOND",
        KW_DEALLOCATE => "DEALLOCATE",
        KW_DECIMAL => "DECIMAL",
        KW_DECLARE => "DECLARE",
        KW_DEFAULT => "DEFAULT",
        KW_DEFINER => "DEFINER",
        KW_DELAYED => "DELAYED",
        KW_DELAY_KEY_WRITE => "DELAY_KEY_WRITE",
        KW_DELETE => "DELETE",
        KW_DESC => "DESC",
        KW_DESCRIBE => "DESCRIBE",
        KW_DES_KEY_FILE => "DES_KEY_FILE",
        KW_DETERMINISTIC => "DETERMINISTIC",
        KW_DIRECTORY => "DIRECTORY",
        KW_DISABLE => "DISABLE",
        KW_DISCARD => "DISCARD",
        KW_DISK => "DISK",
        KW_DISTINCT => "DISTINCT",
        KW_DIV => "DIV",
        KW_DO => "DO",
        KW_DOUBLE => "DOUBLE",
        KW_DROP => "DROP",
        KW_DUAL => "DUAL",
        KW_DUMPFILE => "DUMPFILE",
        KW_DUPLICATE => "DUPLICATE",
        KW_DYNAMIC => "DYNAMIC",
        KW_EACH => "EACH",
        KW_ELSE => "ELSE",
        KW_ELSEIF => "ELSEIF",
        KW_ENABLE => "ENABLE",
        KW_ENCLOSED => "ENCLOSED",
        KW_END => "END",
        KW_ENDS => "ENDS",
        KW_ENGINE => "ENGINE",
        KW_ENGINES => "ENGINES",
        KW_ENUM => "ENUM",
        KW_ERROR => "ERROR",
        KW_ERRORS => "ERRORS",
        KW_ESCAPE => "ESCAPE",
        KW_ESCAPED => "ESCAPED",
        KW_EVENT => "EVENT",
        KW_EVENTS => "EVENTS",
        KW_EVERY => "EVERY",
        KW_EXECUTE => "EXECUTE",
        KW_EXISTS => "EXISTS",
        KW_EXIT => "EXIT",
        KW_EXPANSION => "EXPANSION",
        KW_EXPLAIN => "EXPLAIN",
        KW_EXTENDED => "EXTENDED",
        KW_EXTENT_SIZE => "EXTENT_SIZE",
        KW_FALSE => "FALSE",
        KW_FAST => "FAST",
        KW_FAULTS => "FAULTS",
        KW_FETCH => "FETCH",
        KW_FILE => "FILE",
        KW_FIRST => "FIRST",
        KW_FIXED => "FIXED",
        KW_FLOAT => "FLOAT",
        KW_FLUSH => "FLUSH",
        KW_FOR => "FOR",
        KW_FORCE => "FORCE",
        KW_FOREIGN => "FOREIGN",
        KW_FOUND => "FOUND",
        KW_FRAC_SECOND => "FRAC_SECOND",
        KW_FROM => "FROM",
        KW_FULL => "FULL",
        KW_FULLTEXT => "FULLTEXT",
        KW_FUNCTION => "FUNCTION",
        KW_GENERAL => "GENERAL",
        KW_GEOMETRY => "GEOMETRY",
        KW_GEOMETRYCOLLECTION => "GEOMETRYCOLLECTION",
        KW_GET_FORMAT => "GET_FORMAT",
        KW_GLOBAL => "GLOBAL",
        KW_GRANT => "GRANT",
        KW_GRANTS => "GRANTS",
        KW_GROUP => "GROUP",
        KW_HANDLER => "HANDLER",
        KW_HASH => "HASH",
        KW_HAVING => "HAVING",
        KW_HELP => "HELP",
        KW_HIGH_PRIORITY => "HIGH_PRIORITY",
        KW_HOST => "HOST",
        KW_HOSTS => "HOSTS",
        KW_HOUR => "HOUR",
        KW_HOUR_MICROSECOND => "HOUR_MICROSECOND",
        KW_HOUR_MINUTE => "HOUR_MINUTE",
        KW_HOUR_SECOND => "HOUR_SECOND",
        KW_IDENTIFIED => "IDENTIFIED",
        KW_IF => "IF",
        KW_IGNORE => "IGNORE",
        KW_IGNORE_SERVER_IDS => "IGNORE_SERVER_IDS",
        KW_IMPORT => "IMPORT",
        KW_IN => "IN",
        KW_INDEX => "INDEX",
        KW_INDEXES => "INDEXES",
        KW_INFILE => "INFILE",
        KW_INITIAL_SIZE => "INITIAL_SIZE",
        KW_INNER => "INNER",
        KW_INOUT => "INOUT",
        KW_INSENSITIVE => "INSENSITIVE",
        KW_INSERT => "INSERT",
        KW_INSERT_METHOD => "INSERT_METHOD",
        KW_INSTALL => "INSTALL",
        KW_INT => "INT",
        KW_INTERVAL => "INTERVAL",
        KW_INTO => "INTO",
        KW_INVOKER => "INVOKER",
        KW_IO => "IO",
        KW_IO_THREAD => "IO_THREAD",
        KW_IPC => "IPC",
        KW_IS => "IS",
        KW_ISOLATION => "ISOLATION",
        KW_ISSUER => "ISSUER",
        KW_ITERATE => "ITERATE",
        KW_JOIN => "JOIN",
        KW_KEY => "KEY",
        KW_KEYS => "KEYS",
        KW_KEY_BLOCK_SIZE => "KEY_BLOCK_SIZE",
        KW_KILL => "KILL",
        KW_LANGUAGE => "LANGUAGE",
        KW_LAST => "LAST",
        KW_LEADING => "LEADING",
        KW_LEAVE => "LEAVE",
        KW_LEAVES => "LEAVES",
        KW_LEFT => "LEFT",
        KW_LESS => "LESS",
        KW_LEVEL => "LEVEL",
        KW_LIKE => "LIKE",
        KW_LIMIT => "LIMIT",
        KW_LINEAR => "LINEAR",
        KW_LINES => "LINES",
        KW_LINESTRING => "LINESTRING",
        KW_LIST => "LIST",
        KW_LOAD => "LOAD",
        KW_LOCAL => "LOCAL",
        KW_LOCK => "LOCK",
        KW_LOCKS => "LOCKS",
        KW_LOGFILE => "LOGFILE",
        KW_LOGS => "LOGS",
        KW_LONG => "LONG",
        KW_LONGBLOB => "LONGBLOB",
        KW_LONGTEXT => "LONGTEXT",
        KW_LOOP => "LOOP",
        KW_LOW_PRIORITY => "LOW_PRIORITY",
        KW_MASTER => "MASTER",
        KW_MASTER_CONNECT_RETRY => "MASTER_CONNECT_RETRY",
        KW_MASTER_HOST => "MASTER_HOST",
        KW_MASTER_LOG_FILE => "MASTER_LOG_FILE",
        KW_MASTER_LOG_POS => "MASTER_LOG_POS",
        KW_MASTER_PASSWORD => "MASTER_PASSWORD",
        KW_MASTER_PORT => "MASTER_PORT",
        KW_MASTER_SERVER_ID => "MASTER_SERVER_ID",
        KW_MASTER_SSL => "MASTER_SSL",
        KW_MASTER_USER => "MASTER_USER",
        KW_MATCH => "MATCH",
        KW_MAXVALUE => "MAXVALUE",
        KW_MAX_CONNECTIONS_PER_HOUR => "MAX_CONNECTIONS_PER_HOUR",
        KW_MAX_QUERIES_PER_HOUR => "MAX_QUERIES_PER_HOUR",
        KW_MAX_ROWS => "MAX_ROWS",
        KW_MAX_SIZE => "MAX_SIZE",
        KW_MAX_UPDATES_PER_HOUR => "MAX_UPDATES_PER_HOUR",
        KW_MAX_USER_CONNECTIONS => "MAX_USER_CONNECTIONS",
        KW_MEDIUM => "MEDIUM",
        KW_MEDIUMBLOB => "MEDIUMBLOB",
        KW_MEDIUMINT => "MEDIUMINT",
        KW_MEDIUMTEXT => "MEDIUMTEXT",
        KW_MEMORY => "MEMORY",
        KW_MERGE => "MERGE",
        KW_MESSAGE_TEXT => "MESSAGE_TEXT",
        KW_MICROSECOND => "MICROSECOND",
        KW_MIGRATE => "MIGRATE",
        KW_MINUTE => "MINUTE",
        KW_MINUTE_MICROSECOND => "MINUTE_MICROSECOND",
        KW_MINUTE_SECOND => "MINUTE_SECOND",
        KW_MIN_ROWS => "MIN_ROWS",
        KW_MOD => "MOD",
        KW_MODE => "MODE",
        KW_MODIFIES => "MODIFIES",
        KW_MODIFY => "MODIFY",
        KW_MONTH => "MONTH",
        KW_MULTILINESTRING => "MULTILINESTRING",
        KW_MULTIPOINT => "MULTIPOINT",
        KW_MULTIPOLYGON => "MULTIPOLYGON",
        KW_MUTEX => "MUTEX",
        KW_MYSQL_ERRNO => "MYSQL_ERRNO",
        KW_NAME => "NAME",
        KW_NAMES => "NAMES",
        KW_NATIONAL => "NATIONAL",
        KW_NATURAL => "NATURAL",
        KW_NCHAR => "NCHAR",
        KW_NDBCLUSTER => "NDBCLUSTER",
        KW_NEW => "NEW",
        KW_NEXT => "NEXT",
        KW_NO => "NO",
        KW_NODEGROUP => "NODEGROUP",
        KW_NONE => "NONE",
        KW_NOT => "NOT",
        KW_NO_WAIT => "NO_WAIT",
        KW_NO_WRITE_TO_BINLOG => "NO_WRITE_TO_BINLOG",
        KW_NULL => "NULL",
        KW_NUMERIC => "NUMERIC",
        KW_NVARCHAR => "NVARCHAR",
        KW_OFFSET => "OFFSET",
        KW_OLD_PASSWORD => "OLD_PASSWORD",
        KW_ON => "ON",
        KW_ONE => "ONE",
        KW_ONE_SHOT => "ONE_SHOT",
        KW_OPEN => "OPEN",
        KW_OPTIMIZE => "OPTIMIZE",
        KW_OPTION => "OPTION",
        KW_OPTIONALLY => "OPTIONALLY",
        KW_OPTIONS => "OPTIONS",
        KW_OR => "OR",
        KW_ORDER => "ORDER",
        KW_OUT => "OUT",
        KW_OUTER => "OUTER",
        KW_OUTFILE => "OUTFILE",
        KW_OWNER => "OWNER",
        KW_PACK_KEYS => "PACK_KEYS",
        KW_PAGE => "PAGE",
        KW_PARSER => "PARSER",
        KW_PARTIAL => "PARTIAL",
        KW_PARTITION => "PARTITION",
        KW_PARTITIONING => "PARTITIONING",
        KW_PARTITIONS => "PARTITIONS",
        KW_PASSWORD => "PASSWORD",
        KW_PHASE => "PHASE",
        KW_PLUGIN => "PLUGIN",
        KW_PLUGINS => "PLUGINS",
        KW_POINT => "POINT",
        KW_POLYGON => "POLYGON",
        KW_PORT => "PORT",
        KW_PRECISION => "PRECISION",
        KW_PREPARE => "PREPARE",
        KW_PRESERVE => "PRESERVE",
        KW_PREV => "PREV",
        KW_PRIMARY => "PRIMARY",
        KW_PRIVILEGES => "PRIVILEGES",
        KW_PROCEDURE => "PROCEDURE",
        KW_PROCESS => "PROCESS",
        KW_PROCESSLIST => "PROCESSLIST",
        KW_PROFILE => "PROFILE",
        KW_PROFILES => "PROFILES",
        KW_PURGE => "PURGE",
        KW_QUARTER => "QUARTER",
        KW_QUERY => "QUERY",
        KW_QUICK => "QUICK",
        KW_RANGE => "RANGE",
        KW_READ => "READ",
        KW_READS => "READS",
        KW_READ_ONLY => "READ_ONLY",
        KW_READ_WRITE => "READ_WRITE",
        KW_REAL => "REAL",
        KW_REBUILD => "REBUILD",
        KW_RECOVER => "RECOVER",
        KW_REDOFILE => "REDOFILE",
        KW_REDO_BUFFER_SIZE => "REDO_BUFFER_SIZE",
        KW_REDUNDANT => "REDUNDANT",
        KW_REFERENCES => "REFERENCES",
        KW_REGEXP => "REGEXP",
        KW_RELAY_LOG_FILE => "RELAY_LOG_FILE",
        KW_RELAY_LOG_POS => "RELAY_LOG_POS",
        KW_RELAY_THREAD => "RELAY_THREAD",
        KW_RELEASE => "RELEASE",
        KW_RELOAD => "RELOAD",
        KW_REMOVE => "REMOVE",
        KW_RENAME => "RENAME",
        KW_REORGANIZE => "REORGANIZE",
        KW_REPAIR => "REPAIR",
        KW_REPEAT => "REPEAT",
        KW_REPEATABLE => "REPEATABLE",
        KW_REPLACE => "REPLACE",
        KW_REPLICATION => "REPLICATION",
        KW_REQUIRE => "REQUIRE",
        KW_RESET => "RESET",
        KW_RESIGNAL => "RESIGNAL",
        KW_RESTORE => "RESTORE",
        KW_RESTRICT => "RESTRICT",
        KW_RESUME => "RESUME",
        KW_RETURN => "RETURN",
        KW_RETURNS => "RETURNS",
        KW_REVOKE => "REVOKE",
        KW_RIGHT => "RIGHT",
        KW_ROLLBACK => "ROLLBACK",
        KW_ROLLUP => "ROLLUP",
        KW_ROUTINE => "ROUTINE",
        KW_ROW => "ROW",
        KW_ROWS => "ROWS",
        KW_ROW_FORMAT => "ROW_FORMAT",
        KW_RTREE => "RTREE",
        KW_SAVEPOINT => "SAVEPOINT",
        KW_SCHEDULE => "SCHEDULE",
        KW_SCHEMA_NAME => "SCHEMA_NAME",
        KW_SECOND => "SECOND",
        KW_SECOND_MICROSECOND => "SECOND_MICROSECOND",
        KW_SECURITY => "SECURITY",
        KW_SELECT => "SELECT",
        KW_SENSITIVE => "SENSITIVE",
        KW_SEPARATOR => "SEPARATOR",
        KW_SERIAL => "SERIAL",
        KW_SERIALIZABLE => "SERIALIZABLE",
        KW_SERVER => "SERVER",
        KW_SESSION => "SESSION",
        KW_SET => "SET",
        KW_SHARE => "SHARE",
        KW_SHOW => "SHOW",
        KW_SHUTDOWN => "SHUTDOWN",
        KW_SIGNAL => "SIGNAL",
        KW_SIGNED => "SIGNED",
        KW_SIMPLE => "SIMPLE",
        KW_SLAVE => "SLAVE",
        KW_SMALLINT => "SMALLINT",
        KW_SNAPSHOT => "SNAPSHOT",
        KW_SOCKET => "SOCKET",
        KW_SOME => "SOME",
        KW_SONAME => "SONAME",
        KW_SOUNDS => "SOUNDS",
        KW_SOURCE => "SOURCE",
        KW_SPATIAL => "SPATIAL",
        KW_SPECIFIC => "SPECIFIC",
        KW_SQL => "SQL",
        KW_SQLEXCEPTION => "SQLEXCEPTION",
        KW_SQLSTATE => "SQLSTATE",
        KW_SQLWARNING => "SQLWARNING",
        KW_SQL_BIG_RESULT => "SQL_BIG_RESULT",
        KW_SQL_BUFFER_RESULT => "SQL_BUFFER_RESULT",
        KW_SQL_CACHE => "SQL_CACHE",
        KW_SQL_CALC_FOUND_ROWS => "SQL_CALC_FOUND_ROWS",
        KW_SQL_NO_CACHE => "SQL_NO_CACHE",
        KW_SQL_SMALL_RESULT => "SQL_SMALL_RESULT",
        KW_SQL_THREAD => "SQL_THREAD",
        KW_SSL => "SSL",
        KW_START => "START",
        KW_STARTING => "STARTING",
        KW_STARTS => "STARTS",
        KW_STATUS => "STATUS",
        KW_STOP => "STOP",
        KW_STORAGE => "STORAGE",
        KW_STRAIGHT_JOIN => "STRAIGHT_JOIN",
        KW_STRING => "STRING",
        KW_SUBCLASS_ORIGIN => "SUBCLASS_ORIGIN",
        KW_SUBJECT => "SUBJECT",
        KW_SUBPARTITION => "SUBPARTITION",
        KW_SUBPARTITIONS => "SUBPARTITIONS",
        KW_SUPER => "SUPER",
        KW_SUSPEND => "SUSPEND",
        KW_SWAPS => "SWAPS",
        KW_SWITCHES => "SWITCHES",
        KW_TABLE => "TABLE",
        KW_TABLES => "TABLES",
        KW_TABLESPACE => "TABLESPACE",
        KW_TABLE_CHECKSUM => "TABLE_CHECKSUM",
        KW_TABLE_NAME => "TABLE_NAME",
        KW_TEMPORARY => "TEMPORARY",
        KW_TEMPTABLE => "TEMPTABLE",
        KW_TERMINATED => "TERMINATED",
        KW_TEXT => "TEXT",
        KW_THAN => "THAN",
        KW_THEN => "THEN",
        KW_TIME => "TIME",
        KW_TIMESTAMP => "TIMESTAMP",
        KW_TIMESTAMPADD => "TIMESTAMPADD",
        KW_TIMESTAMPDIFF => "TIMESTAMPDIFF",
        KW_TINYBLOB => "TINYBLOB",
        KW_TINYINT => "TINYINT",
        KW_TINYTEXT => "TINYTEXT",
        KW_TO => "TO",
        KW_TRAILING => "TRAILING",
        KW_TRANSACTION => "TRANSACTION",
        KW_TRIGGER => "TRIGGER",
        KW_TRIGGERS => "TRIGGERS",
        KW_TRUE => "TRUE",
        KW_TRUNCATE => "TRUNCATE",
        KW_TYPE => "TYPE",
        KW_TYPES => "TYPES",
        KW_UNCOMMITTED => "UNCOMMITTED",
        KW_UNDEFINED => "UNDEFINED",
        KW_UNDO => "UNDO",
        KW_UNDOFILE => "UNDOFILE",
        KW_UNDO_BUFFER_SIZE => "UNDO_BUFFER_SIZE",
        KW_UNICODE => "UNICODE",
        KW_UNINSTALL => "UNINSTALL",
        KW_UNION => "UNION",
        KW_UNIQUE => "UNIQUE",
        KW_UNKNOWN => "UNKNOWN",
        KW_UNLOCK => "UNLOCK",
        KW_UNSIGNED => "UNSIGNED",
        KW_UNTIL => "UNTIL",
        KW_UPDATE => "UPDATE",
        KW_UPGRADE => "UPGRADE",
        KW_USAGE => "USAGE",
        KW_USE => "USE",
        KW_USER => "USER",
        KW_USER_RESOURCES => "USER_RESOURCES",
        KW_USE_FRM => "USE_FRM",
        KW_USING => "USING",
        KW_UTC_DATE => "UTC_DATE",
        KW_UTC_TIME => "UTC_TIME",
        KW_UTC_TIMESTAMP => "UTC_TIMESTAMP",
        KW_VALUE => "VALUE",
        KW_VALUES => "VALUES",
        KW_VARBINARY => "VARBINARY",
        KW_VARCHAR => "VARCHAR",
        KW_VARIABLES => "VARIABLES",
        KW_VARYING => "VARYING",
        KW_VIEW => "VIEW",
        KW_WAIT => "WAIT",
        KW_WARNINGS => "WARNINGS",
        KW_WEEK => "WEEK",
        KW_WHEN => "WHEN",
        KW_WHERE => "WHERE",
        KW_WHILE => "WHILE",
        KW_WITH => "WITH",
        KW_WORK => "WORK",
        KW_WRAPPER => "WRAPPER",
        KW_WRITE => "WRITE",
        KW_X509 => "X509",
        KW_XA => "XA",
        KW_XML => "XML",
        KW_XOR => "XOR",
        KW_YEAR => "YEAR",
        KW_YEAR_MONTH => "YEAR_MONTH",
        KW_ZEROFILL => "ZEROFILL",
    }
    functions {
        FN_ADDDATE => "ADDDATE",
        FN_BIT_AND => "BIT_AND",
        FN_BIT_OR => "BIT_OR",
        FN_BIT_XOR => "BIT_XOR",
        FN_CAST => "CAST",
        FN_COUNT => "COUNT",
        FN_CURDATE => "CURDATE",
        FN_CURTIME => "CURTIME",
        FN_DATE_ADD => "DATE_ADD",
        FN_DATE_SUB => "DATE_SUB",
        FN_EXTRACT => "EXTRACT",
        FN_GROUP_CONCAT => "GROUP_CONCAT",
        FN_MAX => "MAX",
        FN_MIN => "MIN",
        FN_NOW => "NOW",
        FN_POSITION => "POSITION",
        FN_STD => "STD",
        FN_STDDEV_SAMP => "STDDEV_SAMP",
        FN_SUBDATE => "SUBDATE",
        FN_SUBSTRING => "SUBSTRING",
        FN_SUM => "SUM",
        FN_SYSDATE => "SYSDATE",
        FN_TRIM => "TRIM",
        FN_VARIANCE => "VARIANCE",
        FN_VAR_SAMP => "VAR_SAMP",
    }
    nonterminals {
        NT_QUERY => "query",
        NT_VERB_CLAUSE => "verb_clause",
        NT_STATEMENT => "statement",
        NT_CREATE => "create",
        NT_ALTER => "alter",
        NT_DROP => "drop",
        NT_RENAME => "rename",
        NT_TRUNCATE => "truncate",
        NT_SELECT => "select",
        NT_SELECT_INIT => "select_init",
        NT_SELECT_PART2 => "select_part2",
        NT_SELECT_ITEM_LIST => "select_item_list",
        NT_SELECT_ITEM => "select_item",
        NT_SELECT_FROM => "select_from",
        NT_INSERT => "insert",
        NT_REPLACE => "replace",
        NT_UPDATE => "update",
        NT_DELETE => "delete",
        NT_USE => "use",
        NT_SET => "set",
        NT_BEGIN => "begin",
        NT_COMMIT => "commit",
        NT_ROLLBACK => "rollback",
        NT_CALL => "call",
        NT_TABLE_IDENT => "table_ident",
        NT_TABLE_LIST => "table_list",
        NT_TABLE_WILD => "table_wild",
        NT_IDENT => "ident",
        NT_SIMPLE_IDENT => "simple_ident",
        NT_FIELD_IDENT => "field_ident",
        NT_OPT_IDENT => "opt_ident",
        NT_IDENT_OR_TEXT => "ident_or_text",
        NT_TEXT_STRING => "text_string",
        NT_TEXT_LITERAL => "text_literal",
        NT_LITERAL => "literal",
        NT_NUM_LITERAL => "NUM_literal",
        NT_EXPR => "expr",
        NT_SIMPLE_EXPR => "simple_expr",
        NT_WHERE_CLAUSE => "where_clause",
        NT_JOIN_TABLE => "join_table",
        NT_DEFINER => "definer",
        NT_USER => "user",
        NT_VIEW_OR_TRIGGER_OR_SP_OR_EVENT => "view_or_trigger_or_sp_or_event",
        NT_DEFINER_TAIL => "definer_tail",
        NT_NO_DEFINER_TAIL => "no_definer_tail",
        NT_VIEW_TAIL => "view_tail",
        NT_VIEW_SELECT => "view_select",
        NT_VIEW_ALGORITHM => "view_algorithm",
        NT_TRIGGER_TAIL => "trigger_tail",
        NT_SP_TAIL => "sp_tail",
        NT_SF_TAIL => "sf_tail",
        NT_EVENT_TAIL => "event_tail",
        NT_SP_NAME => "sp_name",
        NT_SP_PROC_STMT => "sp_proc_stmt",
        NT_CREATE_TABLE_OPTIONS => "create_table_options",
        NT_CREATE_TABLE_OPTION => "create_table_option",
        NT_CREATE_FIELD_LIST => "create_field_list",
        NT_FIELD_LIST => "field_list",
        NT_FIELD_LIST_ITEM => "field_list_item",
        NT_FIELD_SPEC => "field_spec",
        NT_FIELD_DEF => "field_def",
        NT_TYPE => "type",
        NT_OPT_ATTRIBUTE => "opt_attribute",
        NT_ATTRIBUTE => "attribute",
        NT_KEY_DEF => "key_def",
        NT_KEY_LIST => "key_list",
        NT_KEY_PART => "key_part",
        NT_REFERENCES => "references",
        NT_INDEX_HINT => "index_hint",
        NT_PARTITION_CLAUSE => "partition_clause",
        NT_ALTER_LIST => "alter_list",
        NT_ALTER_LIST_ITEM => "alter_list_item",
        NT_CREATE_SELECT => "create_select",
        NT_OPT_IF_NOT_EXISTS => "opt_if_not_exists",
        NT_IF_EXISTS => "if_exists",
    }
}

impl Symbol {
    /// End of the token stream after `END_OF_INPUT` has been delivered.
    pub const END: Self = Self(0);

    pub const fn from_char(byte: u8) -> Self {
        Self(byte as u16)
    }

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The byte of a single-character token.
    pub const fn as_char(self) -> Option<u8> {
        if self.0 < 256 {
            Some(self.0 as u8)
        } else {
            None
        }
    }

    pub const fn kind(self) -> SymbolKind {
        match self.0 {
            0..=255 => SymbolKind::Char,
            raw if raw < KEYWORDS_START => SymbolKind::Terminal,
            raw if raw == KEYWORDS_START || raw == FUNCTIONS_START || raw == NONTERMINALS_START => {
                SymbolKind::Unknown
            }
            raw if raw < FUNCTIONS_START => SymbolKind::Keyword,
            raw if raw < NONTERMINALS_START => SymbolKind::Function,
            raw if raw < TABLE_END => SymbolKind::NonTerminal,
            _ => SymbolKind::Unknown,
        }
    }

    pub const fn is_keyword(self) -> bool {
        matches!(self.kind(), SymbolKind::Keyword | SymbolKind::Function)
    }

    pub const fn is_nonterminal(self) -> bool {
        matches!(self.kind(), SymbolKind::NonTerminal)
    }

    /// Registered display name; `None` for character tokens and raw values
    /// outside the table.
    pub fn table_name(self) -> Option<&'static str> {
        let index = self.0.checked_sub(256)? as usize;
        NAMES.get(index).copied().filter(|name| !name.is_empty())
    }

    /// Display name. Character tokens render as the character itself.
    pub fn name(self) -> Cow<'static, str> {
        if let Some(byte) = self.as_char() {
            return Cow::Owned(char::from(byte).to_string());
        }
        match self.table_name() {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("#{}", self.0)),
        }
    }

    /// Every keyword-table symbol, in table order.
    pub fn keywords() -> impl Iterator<Item = Self> {
        (KEYWORDS_START + 1..FUNCTIONS_START).map(Self)
    }

    /// Every function-keyword symbol, in table order.
    pub fn functions() -> impl Iterator<Item = Self> {
        (FUNCTIONS_START + 1..NONTERMINALS_START).map(Self)
    }

    /// Every non-terminal symbol, in table order.
    pub fn nonterminals() -> impl Iterator<Item = Self> {
        (NONTERMINALS_START + 1..TABLE_END).map(Self)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_char() {
            Some(byte) => write!(f, "Symbol({:?})", char::from(byte)),
            None => write!(f, "Symbol({})", self.name()),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_symbols_keep_their_byte() {
        let paren = Symbol::from_char(b'(');
        assert_eq!(paren.as_char(), Some(b'('));
        assert_eq!(paren.kind(), SymbolKind::Char);
        assert_eq!(paren.name(), "(");
        assert_eq!(format!("{paren:?}"), "Symbol('(')");
    }

    #[test]
    fn groups_are_classified() {
        assert_eq!(Symbol::IDENT.kind(), SymbolKind::Terminal);
        assert_eq!(Symbol::END_OF_INPUT.kind(), SymbolKind::Terminal);
        assert_eq!(Symbol::KW_SELECT.kind(), SymbolKind::Keyword);
        assert_eq!(Symbol::OP_LE.kind(), SymbolKind::Keyword);
        assert_eq!(Symbol::FN_NOW.kind(), SymbolKind::Function);
        assert_eq!(Symbol::NT_STATEMENT.kind(), SymbolKind::NonTerminal);
        assert_eq!(Symbol::from_raw(u16::MAX).kind(), SymbolKind::Unknown);
        assert!(Symbol::FN_COUNT.is_keyword());
        assert!(!Symbol::IDENT.is_keyword());
    }

    #[test]
    fn display_names_come_from_the_table() {
        assert_eq!(Symbol::KW_SELECT.to_string(), "SELECT");
        assert_eq!(Symbol::OP_EQUAL.to_string(), "<=>");
        assert_eq!(Symbol::NT_TABLE_IDENT.to_string(), "table_ident");
        assert_eq!(Symbol::IDENT_QUOTED.to_string(), "IDENT_QUOTED");
        assert_eq!(Symbol::from_raw(60_000).to_string(), "#60000");
    }

    #[test]
    fn group_iterators_cover_every_entry() {
        assert!(Symbol::keywords().all(|s| s.kind() == SymbolKind::Keyword));
        assert!(Symbol::functions().all(|s| s.kind() == SymbolKind::Function));
        assert!(Symbol::nonterminals().all(|s| s.kind() == SymbolKind::NonTerminal));
        assert!(Symbol::keywords().any(|s| s == Symbol::KW_ZEROFILL));
        assert_eq!(Symbol::functions().count(), 25);
        for sym in Symbol::keywords().chain(Symbol::functions()) {
            assert!(sym.table_name().is_some(), "{sym:?} has no name");
        }
    }

    #[test]
    fn names_are_unique_within_keyword_groups() {
        let mut seen = std::collections::HashSet::new();
        for sym in Symbol::keywords().chain(Symbol::functions()) {
            assert!(seen.insert(sym.table_name()), "duplicate {sym}");
        }
    }
}
