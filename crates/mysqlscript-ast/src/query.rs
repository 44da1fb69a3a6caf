//! Read-only navigation over a parse tree.
//!
//! Every lookup returns `Option`: absence is how optional grammar shows up,
//! so a missing child is never an error.

use std::fmt;

use crate::node::{Ast, Node, NodeId};
use crate::symbol::Symbol;

/// Borrowed cursor on one node of an [`Ast`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    ast: &'a Ast,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) const fn new(ast: &'a Ast, id: NodeId) -> Self {
        Self { ast, id }
    }

    pub const fn id(self) -> NodeId {
        self.id
    }

    pub const fn ast(self) -> &'a Ast {
        self.ast
    }

    fn node(self) -> Option<&'a Node> {
        self.ast.get(self.id)
    }

    fn wrap(self, id: NodeId) -> Self {
        Self::new(self.ast, id)
    }

    pub fn symbol(self) -> Symbol {
        self.node().map_or(Symbol::END, |n| n.symbol)
    }

    pub fn is(self, symbol: Symbol) -> bool {
        self.symbol() == symbol
    }

    pub fn is_terminal(self) -> bool {
        self.node().is_some_and(Node::is_terminal)
    }

    /// Terminal value; `None` for non-terminals.
    pub fn value(self) -> Option<&'a str> {
        self.node().and_then(Node::value)
    }

    pub fn child_ids(self) -> &'a [NodeId] {
        self.ast.children(self.id)
    }

    pub fn children(self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + ExactSizeIterator {
        let ast = self.ast;
        self.child_ids().iter().map(move |&id| NodeRef::new(ast, id))
    }

    pub fn child_count(self) -> usize {
        self.child_ids().len()
    }

    pub fn begin(self) -> Option<u32> {
        self.ast.effective_begin(self.id)
    }

    pub fn end(self) -> Option<u32> {
        self.ast.effective_end(self.id)
    }

    pub fn line(self) -> Option<u32> {
        self.ast.effective_line(self.id)
    }

    // -----------------------------------------------------------------------
    // Child lookup
    // -----------------------------------------------------------------------

    pub fn child_at(self, index: usize) -> Option<Self> {
        self.child_ids().get(index).map(|&id| self.wrap(id))
    }

    /// First child tagged `symbol`.
    ///
    /// With `start_after`, scanning starts after that child; if it is not a
    /// child of this node nothing is found.
    pub fn first_child_named(self, symbol: Symbol, start_after: Option<NodeId>) -> Option<Self> {
        let ids = self.child_ids();
        let from = match start_after {
            Some(anchor) => ids.iter().position(|&id| id == anchor)? + 1,
            None => 0,
        };
        self.scan_forward(symbol, from)
    }

    /// First child tagged `symbol` at index `position` or later.
    pub fn child_named_from(self, symbol: Symbol, position: usize) -> Option<Self> {
        self.scan_forward(symbol, position)
    }

    /// Last child tagged `symbol`, skipping `position_from_end` children at
    /// the tail first.
    pub fn last_child_named(self, symbol: Symbol, position_from_end: usize) -> Option<Self> {
        let ids = self.child_ids();
        let stop = ids.len().checked_sub(position_from_end)?;
        ids[..stop]
            .iter()
            .rev()
            .find(|&&id| self.ast.get(id).is_some_and(|n| n.symbol == symbol))
            .map(|&id| self.wrap(id))
    }

    fn scan_forward(self, symbol: Symbol, from: usize) -> Option<Self> {
        self.child_ids()
            .get(from..)?
            .iter()
            .find(|&&id| self.ast.get(id).is_some_and(|n| n.symbol == symbol))
            .map(|&id| self.wrap(id))
    }

    // -----------------------------------------------------------------------
    // Paths and sequences
    // -----------------------------------------------------------------------

    /// Follow `first_child_named` for each symbol in turn. An empty path
    /// returns this node.
    pub fn path(self, path: &[Symbol]) -> Option<Self> {
        path.iter()
            .try_fold(self, |node, &symbol| node.first_child_named(symbol, None))
    }

    /// Match `sequence` against the direct children starting at `start_at`
    /// (inclusive; the first child when `None`) with no gaps. Returns the
    /// child matching the last symbol.
    pub fn consecutive(self, sequence: &[Symbol], start_at: Option<NodeId>) -> Option<Self> {
        let ids = self.child_ids();
        let from = match start_at {
            Some(anchor) => ids.iter().position(|&id| id == anchor)?,
            None => 0,
        };
        self.match_at(sequence, from)
    }

    /// First position at or after `start_at` where `sequence` matches as a
    /// run of consecutive children. Returns the child matching the last
    /// symbol.
    pub fn find_consecutive(self, sequence: &[Symbol], start_at: Option<NodeId>) -> Option<Self> {
        let ids = self.child_ids();
        let from = match start_at {
            Some(anchor) => ids.iter().position(|&id| id == anchor)?,
            None => 0,
        };
        (from..ids.len()).find_map(|pos| self.match_at(sequence, pos))
    }

    fn match_at(self, sequence: &[Symbol], from: usize) -> Option<Self> {
        if sequence.is_empty() {
            return None;
        }
        let window = self.child_ids().get(from..from + sequence.len())?;
        let all = window
            .iter()
            .zip(sequence)
            .all(|(&id, &symbol)| self.ast.get(id).is_some_and(|n| n.symbol == symbol));
        if all { window.last().map(|&id| self.wrap(id)) } else { None }
    }

    /// First direct child matching any of `names`, trying names in order.
    pub fn search_names(self, names: &[Symbol]) -> Option<Self> {
        names
            .iter()
            .find_map(|&symbol| self.first_child_named(symbol, None))
    }

    /// First path in `paths` that resolves.
    pub fn search_paths(self, paths: &[&[Symbol]]) -> Option<Self> {
        paths.iter().find_map(|path| self.path(path))
    }

    // -----------------------------------------------------------------------
    // Leaves
    // -----------------------------------------------------------------------

    /// Leftmost leaf under this node (the node itself for a leaf).
    pub fn left_most(self) -> Self {
        let mut current = self;
        while let Some(first) = current.child_at(0) {
            current = first;
        }
        current
    }

    /// Rightmost leaf under this node.
    pub fn right_most(self) -> Self {
        let mut current = self;
        while let Some(&last) = current.child_ids().last() {
            current = current.wrap(last);
        }
        current
    }

    // -----------------------------------------------------------------------
    // Text reconstruction
    // -----------------------------------------------------------------------

    /// Exact source slice covered by this node.
    pub fn restore_text(self, text: &'a str) -> Option<&'a str> {
        let begin = self.begin()? as usize;
        let end = self.end()? as usize;
        text.get(begin..end.max(begin))
    }

    /// Exact source slice from child `first` through child `last`
    /// (inclusive). Either bound defaults to the corresponding end of the
    /// child list.
    pub fn restore_children_text(
        self,
        text: &'a str,
        first: Option<NodeId>,
        last: Option<NodeId>,
    ) -> Option<&'a str> {
        let ids = self.child_ids();
        let lo = match first {
            Some(anchor) => ids.iter().position(|&id| id == anchor)?,
            None => 0,
        };
        let hi = match last {
            Some(anchor) => ids.iter().position(|&id| id == anchor)?,
            None => ids.len().checked_sub(1)?,
        };
        if lo > hi {
            return None;
        }
        // Children may carry no offsets of their own; take the widest known.
        // An open bound also covers the node's own offsets.
        let own = self.ast.get(self.id);
        let own_begin = own.and_then(|node| node.begin).filter(|_| first.is_none());
        let own_end = own.and_then(|node| node.end).filter(|_| last.is_none());
        let begin = ids[lo..=hi]
            .iter()
            .filter_map(|&id| self.ast.effective_begin(id))
            .chain(own_begin)
            .min()? as usize;
        let end = ids[lo..=hi]
            .iter()
            .filter_map(|&id| self.ast.effective_end(id))
            .chain(own_end)
            .max()? as usize;
        text.get(begin..end.max(begin))
    }

    /// Restored text when available, otherwise the terminal value.
    pub fn text(self, text: &'a str) -> Option<&'a str> {
        self.restore_text(text).or_else(|| self.value())
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("symbol", &self.symbol())
            .field("value", &self.value())
            .finish()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.ast, other.ast) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}
