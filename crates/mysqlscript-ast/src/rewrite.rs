//! Offset-based editing of statement text.
//!
//! Node offsets always refer to the original statement. [`TextRewriter`]
//! applies edits to a copy and keeps `cut_count`, the bytes removed so far
//! minus the bytes inserted so far, so an original offset past every earlier
//! edit maps onto the edited buffer as `offset - cut_count`. Edits must
//! arrive in source order.

use std::ops::Range;

use mysqlscript_error::{Result, ScriptError};

use crate::query::NodeRef;

#[derive(Debug, Clone)]
pub struct TextRewriter<'a> {
    original: &'a str,
    buffer: String,
    cut_count: isize,
    last_end: usize,
}

impl<'a> TextRewriter<'a> {
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            buffer: original.to_owned(),
            cut_count: 0,
            last_end: 0,
        }
    }

    pub const fn original(&self) -> &'a str {
        self.original
    }

    /// The edited text so far.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Bytes removed minus bytes inserted by the edits applied so far.
    pub const fn cut_count(&self) -> isize {
        self.cut_count
    }

    /// Position in the edited buffer of an original offset that lies at or
    /// after the end of the last edit.
    pub fn translate(&self, offset: usize) -> usize {
        offset.saturating_add_signed(-self.cut_count)
    }

    /// Replace the original bytes `range` with `text`.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<()> {
        self.check(&range)?;
        let at = self.translate(range.start);
        let removed = range.end - range.start;
        self.buffer.replace_range(at..at + removed, text);
        self.cut_count += removed as isize - text.len() as isize;
        self.last_end = range.end;
        Ok(())
    }

    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        self.replace(offset..offset, text)
    }

    pub fn remove(&mut self, range: Range<usize>) -> Result<()> {
        self.replace(range, "")
    }

    /// Replace the source span of `node`. Returns `Ok(false)` without
    /// editing when the node carries no offsets.
    pub fn replace_node(&mut self, node: NodeRef<'_>, text: &str) -> Result<bool> {
        let (Some(begin), Some(end)) = (node.begin(), node.end()) else {
            return Ok(false);
        };
        self.replace(begin as usize..end as usize, text)?;
        Ok(true)
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    fn check(&self, range: &Range<usize>) -> Result<()> {
        let len = self.original.len();
        if range.start > range.end
            || range.end > len
            || !self.original.is_char_boundary(range.start)
            || !self.original.is_char_boundary(range.end)
        {
            return Err(ScriptError::RewriteRange {
                begin: range.start,
                end: range.end,
                len,
            });
        }
        if range.start < self.last_end {
            return Err(ScriptError::RewriteOutOfOrder {
                offset: range.start,
                previous_end: self.last_end,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Ast, AstSink};
    use crate::symbol::Symbol;
    use proptest::prelude::*;

    #[test]
    fn chained_edits_use_original_offsets() {
        let sql = "select * from t1 join t2";
        let mut rw = TextRewriter::new(sql);
        rw.insert(14, "db.").expect("qualify t1");
        assert_eq!(rw.cut_count(), -3);
        rw.replace(22..24, "other").expect("rename t2");
        assert_eq!(rw.as_str(), "select * from db.t1 join other");
        assert_eq!(rw.cut_count(), -6);
        assert_eq!(rw.translate(24), 30);
    }

    #[test]
    fn remove_shrinks_buffer() {
        let mut rw = TextRewriter::new("drop table if exists t");
        rw.remove(10..20).expect("drop clause");
        assert_eq!(rw.cut_count(), 10);
        assert_eq!(rw.finish(), "drop table t");
    }

    #[test]
    fn out_of_order_edit_is_rejected() {
        let mut rw = TextRewriter::new("abcdef");
        rw.replace(3..5, "X").expect("first edit");
        let err = rw.replace(1..2, "Y").expect_err("overlaps");
        assert!(matches!(
            err,
            ScriptError::RewriteOutOfOrder {
                offset: 1,
                previous_end: 5
            }
        ));
        assert_eq!(rw.as_str(), "abcXf");
    }

    #[test]
    fn bad_ranges_are_rejected() {
        let mut rw = TextRewriter::new("é=1");
        assert!(matches!(
            rw.replace(1..2, "x"),
            Err(ScriptError::RewriteRange { begin: 1, .. })
        ));
        assert!(matches!(
            rw.replace(2..9, "x"),
            Err(ScriptError::RewriteRange { len: 4, .. })
        ));
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 3..2;
        assert!(rw.replace(reversed, "x").is_err());
        assert_eq!(rw.as_str(), "é=1");
    }

    #[test]
    fn replace_node_uses_resolved_offsets() {
        let sql = "use `old`";
        let mut ast = Ast::new();
        let name = ast.new_terminal(Symbol::IDENT_QUOTED, Some("old"), Some(1), Some(4), Some(9));
        let wrapper = ast.new_node(Symbol::NT_IDENT);
        ast.append_child(Some(wrapper), Some(name));
        let empty = ast.new_node(Symbol::NT_OPT_IDENT);

        let mut rw = TextRewriter::new(sql);
        assert!(!rw.replace_node(ast.node(empty), "x").expect("no offsets"));
        assert!(rw.replace_node(ast.node(wrapper), "`new`").expect("edit"));
        assert_eq!(rw.finish(), "use `new`");
    }

    fn splice(text: &str, edits: &[(usize, usize, String)]) -> String {
        let mut out = String::new();
        let mut cursor = 0;
        for (begin, end, replacement) in edits {
            out.push_str(&text[cursor..*begin]);
            out.push_str(replacement);
            cursor = *end;
        }
        out.push_str(&text[cursor..]);
        out
    }

    proptest! {
        #[test]
        fn rewriting_matches_manual_splice(
            text in "[a-z ]{0,40}",
            cuts in prop::collection::vec((0usize..41, 0usize..6, "[A-Z]{0,5}"), 0..5),
        ) {
            let mut edits: Vec<(usize, usize, String)> = Vec::new();
            let mut floor = 0;
            let mut sorted = cuts;
            sorted.sort_by_key(|(at, _, _)| *at);
            for (at, width, replacement) in sorted {
                let begin = at.min(text.len()).max(floor);
                let end = (begin + width).min(text.len());
                edits.push((begin, end, replacement));
                floor = end;
            }

            let mut rw = TextRewriter::new(&text);
            for (begin, end, replacement) in &edits {
                rw.replace(*begin..*end, replacement).expect("ordered edit");
            }
            prop_assert_eq!(rw.finish(), splice(&text, &edits));
        }
    }
}
