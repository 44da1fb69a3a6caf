use std::ops::ControlFlow;

use mysqlscript_parser::{
    SplitMode, StatementSplitter, split_metrics_snapshot, split_script, statement_ranges,
};

const DUMP: &str = "SET @a = 1;\n\
DELIMITER $$\n\
CREATE TRIGGER t BEFORE INSERT ON x FOR EACH ROW BEGIN SET @b = 1; END$$\n\
DELIMITER ;\n\
SELECT 1;\n";

#[test]
fn test_dump_with_delimiter_blocks() {
    let statements = split_script(DUMP, ";").expect("default delimiter is valid");
    let texts: Vec<&str> = statements.iter().map(|s| s.text(DUMP)).collect();
    assert_eq!(
        texts,
        vec![
            "SET @a = 1",
            "CREATE TRIGGER t BEFORE INSERT ON x FOR EACH ROW BEGIN SET @b = 1; END",
            "SELECT 1",
        ],
        "case=dump_texts"
    );
    let delimiters: Vec<&str> = statements.iter().map(|s| s.delimiter.as_str()).collect();
    assert_eq!(delimiters, vec![";", "$$", ";"], "case=dump_delimiters");
    let lines: Vec<u32> = statements.iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![1, 3, 5], "case=dump_lines");
    assert!(
        statements.iter().all(|s| s.column == 0),
        "case=dump_columns"
    );
}

#[test]
fn test_summary_reports_delimiter_changes() {
    let mut seen = 0;
    let summary = StatementSplitter::new().process(DUMP.as_bytes(), |statement, bytes| {
        assert_eq!(bytes, statement.bytes(DUMP.as_bytes()));
        seen += 1;
        ControlFlow::Continue(())
    });
    assert_eq!(seen, 3);
    assert_eq!(summary.statements, 3, "case=summary_statements");
    assert_eq!(summary.delimiter_changes, 2, "case=summary_changes");
    assert_eq!(summary.final_delimiter, ";", "case=summary_final");
    assert!(!summary.stopped && !summary.cancelled);
}

#[test]
fn test_pragma_containing_current_delimiter_is_emitted() {
    let script = "SET @a = 1;\nDELIMITER ;;\nSET @b = 2;;\n";
    let statements = split_script(script, ";").expect("split");
    let texts: Vec<&str> = statements.iter().map(|s| s.text(script).trim()).collect();
    assert_eq!(texts, vec!["SET @a = 1", "DELIMITER ;;", "SET @b = 2"], "case=pragma_emitted");
    assert_eq!(statements[1].delimiter, ";");
    assert_eq!(statements[2].delimiter, ";;");
}

#[test]
fn test_strict_mode_drops_unterminated_tail() {
    let script = "use a; use b";
    let mut texts = Vec::new();
    StatementSplitter::new()
        .with_mode(SplitMode::DelimiterRequired)
        .process(script.as_bytes(), |statement, _| {
            texts.push(statement.text(script).to_owned());
            ControlFlow::Continue(())
        });
    assert_eq!(texts, vec!["use a"], "case=strict_tail");
}

#[test]
fn test_statement_ranges_cover_statement_text() {
    let script = "  select 1 ;\n\n  select 'a;b';";
    let ranges = statement_ranges(script, ";").expect("ranges");
    let texts: Vec<&str> = ranges
        .iter()
        .map(|&(offset, len)| &script[offset..offset + len])
        .collect();
    assert_eq!(texts, vec!["select 1 ", "select 'a;b'"], "case=ranges");
}

#[test]
fn test_custom_starting_delimiter() {
    let statements = split_script("select 1 // select 2;3 //", "//").expect("valid delimiter");
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[1].delimiter, "//");
    assert!(split_script("x", "").is_err(), "case=empty_delimiter");
}

#[test]
fn test_metrics_advance() {
    let before = split_metrics_snapshot();
    split_script("a; b; c", ";").expect("split");
    let after = split_metrics_snapshot();
    assert!(after.scripts_total > before.scripts_total);
    assert!(after.statements_total >= before.statements_total + 3);
}
