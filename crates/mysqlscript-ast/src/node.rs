//! Node arena and the builder callbacks grammars drive.

use smallvec::SmallVec;

use crate::query::NodeRef;
use crate::symbol::Symbol;

/// Handle of a node inside one [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Shape of a node, fixed when the node is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeShape {
    /// Leaf produced from one token.
    Terminal { value: Option<String> },
    /// Production node; its text is the span of its first..last child.
    NonTerminal { children: SmallVec<[NodeId; 4]> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Mutable: reductions may specialise a generic node after creation.
    pub symbol: Symbol,
    pub shape: NodeShape,
    /// Byte length of the decoded value; 0 for non-terminals.
    pub value_length: u32,
    /// 1-based source line; `None` inherits from the first child.
    pub line: Option<u32>,
    /// Byte offsets into the statement text; `None` inherits from children.
    pub begin: Option<u32>,
    pub end: Option<u32>,
}

impl Node {
    fn non_terminal(symbol: Symbol) -> Self {
        Self {
            symbol,
            shape: NodeShape::NonTerminal {
                children: SmallVec::new(),
            },
            value_length: 0,
            line: None,
            begin: None,
            end: None,
        }
    }

    fn terminal(
        symbol: Symbol,
        value: Option<&str>,
        line: Option<u32>,
        begin: Option<u32>,
        end: Option<u32>,
    ) -> Self {
        let value_length = value.map_or(0, |v| u32::try_from(v.len()).unwrap_or(u32::MAX));
        // A decoded value never shrinks the recorded end below begin + length.
        let end = match (begin, end) {
            (Some(b), Some(e)) if b.saturating_add(value_length) > e => {
                Some(b.saturating_add(value_length))
            }
            _ => end,
        };
        Self {
            symbol,
            shape: NodeShape::Terminal {
                value: value.map(str::to_owned),
            },
            value_length,
            line,
            begin,
            end,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self.shape, NodeShape::Terminal { .. })
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.shape {
            NodeShape::Terminal { .. } => &[],
            NodeShape::NonTerminal { children } => children,
        }
    }

    /// Stored terminal value; non-terminals have none.
    pub fn value(&self) -> Option<&str> {
        match &self.shape {
            NodeShape::Terminal { value } => value.as_deref(),
            NodeShape::NonTerminal { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder contract
// ---------------------------------------------------------------------------

/// Tree-construction callbacks.
///
/// Absent handles are accepted everywhere and turn the call into a no-op, so
/// grammar actions may call speculatively on optional productions.
pub trait AstSink {
    /// Create an empty non-terminal.
    fn new_node(&mut self, symbol: Symbol) -> NodeId;

    /// Re-tag `node` if present, otherwise create a new non-terminal.
    fn reuse_node(&mut self, node: Option<NodeId>, symbol: Symbol) -> NodeId;

    /// Change the symbol of `node`; returns it unchanged when absent.
    fn retag(&mut self, node: Option<NodeId>, symbol: Symbol) -> Option<NodeId>;

    fn append_child(&mut self, parent: Option<NodeId>, child: Option<NodeId>);

    /// Move every child of `src` onto the end of `dst`, leaving `src` empty.
    fn merge_children(&mut self, dst: Option<NodeId>, src: Option<NodeId>);

    fn new_terminal(
        &mut self,
        symbol: Symbol,
        value: Option<&str>,
        line: Option<u32>,
        begin: Option<u32>,
        end: Option<u32>,
    ) -> NodeId;
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Owns every node built while parsing one statement.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node; handles issued before this call become invalid.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root.filter(|id| id.index() < self.nodes.len());
    }

    /// Pin explicit source offsets on `id`; `None` keeps the current value.
    pub fn set_offsets(&mut self, id: NodeId, begin: Option<u32>, end: Option<u32>) {
        if let Some(node) = self.get_mut(id) {
            node.begin = begin.or(node.begin);
            node.end = end.or(node.end);
        }
    }

    pub fn root_ref(&self) -> Option<NodeRef<'_>> {
        self.root.map(|id| NodeRef::new(self, id))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Cursor for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this arena.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.index() < self.nodes.len(), "node {id:?} out of arena");
        NodeRef::new(self, id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], Node::children)
    }

    /// Iterate over all nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx as u32), node))
    }

    /// Begin offset, resolved through the first child when unset.
    pub fn effective_begin(&self, id: NodeId) -> Option<u32> {
        let mut current = self.get(id)?;
        loop {
            if let Some(begin) = current.begin {
                return Some(begin);
            }
            current = self.get(*current.children().first()?)?;
        }
    }

    /// End offset, resolved through the last child when unset.
    pub fn effective_end(&self, id: NodeId) -> Option<u32> {
        let mut current = self.get(id)?;
        loop {
            if let Some(end) = current.end {
                return Some(end);
            }
            current = self.get(*current.children().last()?)?;
        }
    }

    /// Source line, resolved through the first child when unset.
    pub fn effective_line(&self, id: NodeId) -> Option<u32> {
        let mut current = self.get(id)?;
        loop {
            if let Some(line) = current.line {
                return Some(line);
            }
            current = self.get(*current.children().first()?)?;
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(node);
        id
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }
}

impl AstSink for Ast {
    fn new_node(&mut self, symbol: Symbol) -> NodeId {
        self.push(Node::non_terminal(symbol))
    }

    fn reuse_node(&mut self, node: Option<NodeId>, symbol: Symbol) -> NodeId {
        match self.retag(node, symbol) {
            Some(id) => id,
            None => self.new_node(symbol),
        }
    }

    fn retag(&mut self, node: Option<NodeId>, symbol: Symbol) -> Option<NodeId> {
        let id = node?;
        let target = self.get_mut(id)?;
        target.symbol = symbol;
        Some(id)
    }

    fn append_child(&mut self, parent: Option<NodeId>, child: Option<NodeId>) {
        let (Some(parent), Some(child)) = (parent, child) else {
            return;
        };
        if parent == child || self.get(child).is_none() {
            return;
        }
        let Some(target) = self.get_mut(parent) else {
            return;
        };
        match &mut target.shape {
            NodeShape::NonTerminal { children } => children.push(child),
            NodeShape::Terminal { .. } => {
                tracing::debug!(
                    target: "mysqlscript.ast",
                    parent = parent.index(),
                    child = child.index(),
                    "ignoring child appended to terminal node"
                );
            }
        }
    }

    fn merge_children(&mut self, dst: Option<NodeId>, src: Option<NodeId>) {
        let (Some(dst), Some(src)) = (dst, src) else {
            return;
        };
        if dst == src || self.get(dst).is_none_or(Node::is_terminal) {
            return;
        }
        let moved = match self.get_mut(src).map(|node| &mut node.shape) {
            Some(NodeShape::NonTerminal { children }) => std::mem::take(children),
            _ => return,
        };
        if let Some(NodeShape::NonTerminal { children }) =
            self.get_mut(dst).map(|node| &mut node.shape)
        {
            children.extend(moved);
        }
    }

    fn new_terminal(
        &mut self,
        symbol: Symbol,
        value: Option<&str>,
        line: Option<u32>,
        begin: Option<u32>,
        end: Option<u32>,
    ) -> NodeId {
        self.push(Node::terminal(symbol, value, line, begin, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(ast: &mut Ast, text: &str, begin: u32) -> NodeId {
        let end = begin + text.len() as u32;
        ast.new_terminal(Symbol::IDENT, Some(text), Some(1), Some(begin), Some(end))
    }

    #[test]
    fn end_is_raised_to_cover_value() {
        let mut ast = Ast::new();
        let id = ast.new_terminal(Symbol::IDENT, Some("abcdef"), Some(1), Some(2), Some(4));
        assert_eq!(ast.get(id).and_then(|n| n.end), Some(8));
        assert_eq!(ast.get(id).map(|n| n.value_length), Some(6));

        let unset = ast.new_terminal(Symbol::IDENT, Some("abc"), None, Some(2), None);
        assert_eq!(ast.get(unset).and_then(|n| n.end), None);
    }

    #[test]
    fn value_length_counts_the_decoded_value() {
        let mut ast = Ast::new();
        // source text `'it''s'` decodes to `it's`
        let id = ast.new_terminal(Symbol::TEXT_STRING, Some("it's"), Some(1), Some(0), Some(7));
        assert_eq!(ast.get(id).map(|n| n.value_length), Some(4));
        assert_eq!(ast.get(id).and_then(|n| n.end), Some(7));
    }

    #[test]
    fn set_offsets_pins_non_terminals() {
        let mut ast = Ast::new();
        let star = word(&mut ast, "*", 7);
        let list = ast.new_node(Symbol::NT_SELECT_ITEM_LIST);
        ast.append_child(Some(list), Some(star));
        ast.set_offsets(list, Some(5), None);
        assert_eq!(ast.effective_begin(list), Some(5));
        assert_eq!(ast.effective_end(list), Some(8));
        ast.set_offsets(list, None, Some(9));
        assert_eq!(ast.effective_begin(list), Some(5));
        assert_eq!(ast.effective_end(list), Some(9));
    }

    #[test]
    fn offsets_inherit_from_children() {
        let mut ast = Ast::new();
        let select = word(&mut ast, "select", 0);
        let star = word(&mut ast, "*", 7);
        let inner = ast.new_node(Symbol::NT_SELECT_ITEM_LIST);
        ast.append_child(Some(inner), Some(star));
        let root = ast.new_node(Symbol::NT_SELECT);
        ast.append_child(Some(root), Some(select));
        ast.append_child(Some(root), Some(inner));

        assert_eq!(ast.effective_begin(root), Some(0));
        assert_eq!(ast.effective_end(root), Some(8));
        assert_eq!(ast.effective_line(root), Some(1));
        assert_eq!(ast.effective_begin(inner), Some(7));
    }

    #[test]
    fn empty_non_terminal_has_no_offsets() {
        let mut ast = Ast::new();
        let id = ast.new_node(Symbol::NT_EXPR);
        assert_eq!(ast.effective_begin(id), None);
        assert_eq!(ast.effective_end(id), None);
    }

    #[test]
    fn absent_handles_are_no_ops() {
        let mut ast = Ast::new();
        let root = ast.new_node(Symbol::NT_QUERY);
        ast.append_child(Some(root), None);
        ast.append_child(None, Some(root));
        ast.merge_children(None, Some(root));
        assert_eq!(ast.retag(None, Symbol::NT_EXPR), None);
        assert!(ast.children(root).is_empty());
        assert_eq!(ast.len(), 1);
    }

    #[test]
    fn terminal_shape_is_fixed() {
        let mut ast = Ast::new();
        let leaf = word(&mut ast, "a", 0);
        let other = word(&mut ast, "b", 2);
        ast.append_child(Some(leaf), Some(other));
        assert!(ast.children(leaf).is_empty());
        assert_eq!(ast.get(leaf).and_then(Node::value), Some("a"));
    }

    #[test]
    fn reuse_and_retag() {
        let mut ast = Ast::new();
        let generic = ast.new_node(Symbol::NT_IDENT);
        assert_eq!(ast.reuse_node(Some(generic), Symbol::NT_FIELD_IDENT), generic);
        assert_eq!(ast.get(generic).map(|n| n.symbol), Some(Symbol::NT_FIELD_IDENT));

        let fresh = ast.reuse_node(None, Symbol::NT_EXPR);
        assert_ne!(fresh, generic);
        assert_eq!(ast.get(fresh).map(|n| n.symbol), Some(Symbol::NT_EXPR));
    }

    #[test]
    fn merge_splices_and_empties_source() {
        let mut ast = Ast::new();
        let a = word(&mut ast, "a", 0);
        let b = word(&mut ast, "b", 2);
        let c = word(&mut ast, "c", 4);
        let dst = ast.new_node(Symbol::NT_FIELD_LIST);
        let src = ast.new_node(Symbol::NT_FIELD_LIST);
        ast.append_child(Some(dst), Some(a));
        ast.append_child(Some(src), Some(b));
        ast.append_child(Some(src), Some(c));

        ast.merge_children(Some(dst), Some(src));
        assert_eq!(ast.children(dst), &[a, b, c]);
        assert!(ast.children(src).is_empty());
    }

    #[test]
    fn set_root_rejects_foreign_ids() {
        let mut ast = Ast::new();
        let id = ast.new_node(Symbol::NT_QUERY);
        ast.set_root(Some(id));
        assert_eq!(ast.root(), Some(id));
        ast.set_root(Some(NodeId(99)));
        assert_eq!(ast.root(), None);
        ast.clear();
        assert!(ast.is_empty());
    }
}
