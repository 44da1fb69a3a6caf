//! Parse tree for MySQL-dialect statements.
//!
//! Every node of one statement lives in an [`Ast`] arena and is addressed by
//! [`NodeId`]. Grammars build trees through the [`AstSink`] callbacks;
//! consumers read them back through [`NodeRef`] and rebuild edited source
//! text with [`TextRewriter`].

pub mod display;
pub mod node;
pub mod query;
pub mod rewrite;
pub mod symbol;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use display::{JsonNode, build_sql, dump_xml, outline, subitems_as_string, to_json};
pub use node::{Ast, AstSink, Node, NodeId, NodeShape};
pub use query::NodeRef;
pub use rewrite::TextRewriter;
pub use symbol::{Symbol, SymbolKind};

// ---------------------------------------------------------------------------
// Source spans
// ---------------------------------------------------------------------------

/// Half-open byte range `[start, end)` into statement text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const ZERO: Self = Self { start: 0, end: 0 };

    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Span covering both `self` and `other`.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    #[must_use]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// The span as a `usize` range for slicing.
    #[must_use]
    pub const fn range(self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_merge_and_len() {
        let a = Span::new(4, 9);
        let b = Span::new(2, 6);
        assert_eq!(a.merge(b), Span::new(2, 9));
        assert_eq!(a.len(), 5);
        assert!(!a.is_empty());
        assert!(Span::ZERO.is_empty());
        assert_eq!(a.range(), 4..9);
        assert_eq!(format!("{a:?}"), "4..9");
    }
}
