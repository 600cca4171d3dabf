//! Arena storage for AST nodes.
//!
//! All nodes live in one `Vec` and are addressed by `NodeId` handles. Parents
//! exclusively own their children through the handles embedded in `NodeData`;
//! the `parent` back-reference is non-owning and exists only for read-only
//! contextual queries. Re-linking goes through `set_parent`/`replace_child`
//! so the old child's parent pointer is always cleared before a new owner is
//! established and no cycle can form.

use super::node::NodeData;
use jscope_common::span::{EncodedSpan, Span, SpanTable};
use serde::Serialize;

/// Handle to a node in an [`AstArena`]. `NodeId::NONE` means "no node" and
/// is used for absent optional children (e.g. a missing `else` branch).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == NodeId::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != NodeId::NONE
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One AST node: a source span (packed, decode through
/// [`AstArena::span`]), a non-owning parent link, and the variant-specific
/// data (which owns the child handles).
#[derive(Clone, Debug, Serialize)]
pub struct Node {
    pub span: EncodedSpan,
    pub parent: NodeId,
    pub data: NodeData,
}

/// Arena of AST nodes for one parse. Node spans are stored packed; the
/// rare span too large for the inline encoding lands in the side table.
#[derive(Debug, Default)]
pub struct AstArena {
    nodes: Vec<Node>,
    spans: SpanTable,
}

impl AstArena {
    pub fn new() -> AstArena {
        AstArena::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node with no parent. The caller links children afterwards
    /// (usually via `claim_children`).
    pub fn alloc(&mut self, span: Span, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let span = self.spans.encode(span);
        self.nodes.push(Node {
            span,
            parent: NodeId::NONE,
            data,
        });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Panicking accessor for ids known to be live. Indexing with a stale or
    /// NONE id is a defect in the caller.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.spans.decode(self.node(id).span)
    }

    pub fn span_table(&self) -> &SpanTable {
        &self.spans
    }

    pub fn parent(&self, id: NodeId) -> NodeId {
        self.node(id).parent
    }

    /// The single place parent links are written. Clears the old link first
    /// and refuses to create cycles.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        if child.is_none() {
            return;
        }
        debug_assert!(
            !self.is_ancestor(child, parent),
            "set_parent would create a cycle"
        );
        self.node_mut(child).parent = parent;
    }

    /// Link every current child of `id` back to it.
    pub fn claim_children(&mut self, id: NodeId) {
        for child in self.children(id) {
            self.set_parent(child, id);
        }
    }

    /// Detach `old` and adopt `new` in its place within `parent`'s data.
    /// The old child's parent pointer is nulled before the new link is made.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if old.is_some() {
            self.node_mut(old).parent = NodeId::NONE;
        }
        self.node_mut(parent).data.replace_child_id(old, new);
        self.set_parent(new, parent);
    }

    /// Ordered list of non-null children, in the grammar's natural
    /// left-to-right order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.node(id).data.collect_children(&mut out);
        out
    }

    /// Whether `maybe_ancestor` is reachable from `id` by walking parent
    /// links (inclusive of `id` itself).
    fn is_ancestor(&self, maybe_ancestor: NodeId, mut id: NodeId) -> bool {
        let mut steps = 0usize;
        while id.is_some() {
            if id == maybe_ancestor {
                return true;
            }
            id = self.parent(id);
            steps += 1;
            if steps > self.nodes.len() {
                // A cycle already exists; report true so the assert fires.
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::ConstantValue;

    #[test]
    fn test_alloc_and_parent_links() {
        let mut arena = AstArena::new();
        let a = arena.alloc(
            Span::new(0, 1),
            NodeData::Constant {
                value: ConstantValue::Number(1.0),
            },
        );
        let block = arena.alloc(Span::new(0, 3), NodeData::Block { statements: vec![a] });
        arena.claim_children(block);

        assert_eq!(arena.parent(a), block);
        assert_eq!(arena.parent(block), NodeId::NONE);
        assert_eq!(arena.children(block), vec![a]);
    }

    #[test]
    fn test_replace_child_clears_old_parent() {
        let mut arena = AstArena::new();
        let a = arena.alloc(
            Span::new(0, 1),
            NodeData::Constant {
                value: ConstantValue::Null,
            },
        );
        let b = arena.alloc(
            Span::new(2, 1),
            NodeData::Constant {
                value: ConstantValue::Boolean(true),
            },
        );
        let block = arena.alloc(Span::new(0, 3), NodeData::Block { statements: vec![a] });
        arena.claim_children(block);

        arena.replace_child(block, a, b);
        assert_eq!(arena.parent(a), NodeId::NONE);
        assert_eq!(arena.parent(b), block);
        assert_eq!(arena.children(block), vec![b]);
    }

    #[test]
    fn test_node_spans_are_packed() {
        let mut arena = AstArena::new();
        let small = arena.alloc(Span::new(3, 5), NodeData::Empty);
        let huge = arena.alloc(Span::new(100_000, 40_000), NodeData::Empty);

        assert!(arena.node(small).span.is_inline());
        assert!(!arena.node(huge).span.is_inline());
        assert_eq!(arena.span_table().len(), 1);

        assert_eq!(arena.span(small), Span::new(3, 5));
        assert_eq!(arena.span(huge), Span::new(100_000, 40_000));
    }

    #[test]
    fn test_children_skip_none() {
        let mut arena = AstArena::new();
        let cond = arena.alloc(
            Span::new(3, 1),
            NodeData::Lookup {
                name: jscope_common::interner::Atom(1),
            },
        );
        let then_branch = arena.alloc(Span::new(6, 2), NodeData::Block { statements: vec![] });
        let if_node = arena.alloc(
            Span::new(0, 8),
            NodeData::If {
                condition: cond,
                then_branch,
                else_branch: NodeId::NONE,
            },
        );
        arena.claim_children(if_node);
        assert_eq!(arena.children(if_node), vec![cond, then_branch]);
    }
}
