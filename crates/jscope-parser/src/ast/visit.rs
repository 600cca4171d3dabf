//! Depth-first AST traversal.

use super::arena::{AstArena, NodeId};

/// Pre/post-order visitor. `enter` returning `false` skips the subtree;
/// `leave` still fires for every node whose `enter` ran.
pub trait Visitor {
    fn enter(&mut self, _arena: &AstArena, _id: NodeId) -> bool {
        true
    }

    fn leave(&mut self, _arena: &AstArena, _id: NodeId) {}
}

/// Walk the subtree rooted at `id`, children in source order.
pub fn walk<V: Visitor>(arena: &AstArena, id: NodeId, visitor: &mut V) {
    if id.is_none() {
        return;
    }
    if visitor.enter(arena, id) {
        for child in arena.children(id) {
            walk(arena, child, visitor);
        }
    }
    visitor.leave(arena, id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::{ConstantValue, NodeData};
    use jscope_common::span::Span;

    struct Collector {
        entered: Vec<NodeId>,
        left: Vec<NodeId>,
        skip: NodeId,
    }

    impl Visitor for Collector {
        fn enter(&mut self, _arena: &AstArena, id: NodeId) -> bool {
            self.entered.push(id);
            id != self.skip
        }

        fn leave(&mut self, _arena: &AstArena, id: NodeId) {
            self.left.push(id);
        }
    }

    #[test]
    fn test_walk_order_and_skip() {
        let mut arena = AstArena::new();
        let a = arena.alloc(
            Span::new(1, 1),
            NodeData::Constant {
                value: ConstantValue::Number(1.0),
            },
        );
        let inner = arena.alloc(Span::new(0, 3), NodeData::Block { statements: vec![a] });
        let b = arena.alloc(
            Span::new(4, 1),
            NodeData::Constant {
                value: ConstantValue::Number(2.0),
            },
        );
        let outer = arena.alloc(
            Span::new(0, 6),
            NodeData::Block {
                statements: vec![inner, b],
            },
        );
        arena.claim_children(inner);
        arena.claim_children(outer);

        let mut v = Collector {
            entered: Vec::new(),
            left: Vec::new(),
            skip: inner,
        };
        walk(&arena, outer, &mut v);

        // `inner` is entered but its child `a` is skipped.
        assert_eq!(v.entered, vec![outer, inner, b]);
        assert_eq!(v.left, vec![inner, b, outer]);
    }
}
