//! AST node variants and the operator model.
//!
//! `NodeData` is a closed enum: every construct the parser produces is a
//! variant here, and child handles are stored inline. Optional children use
//! `NodeId::NONE`. Matching on `NodeData` is exhaustive by construction,
//! which is what keeps the resolver honest when a new form is added.

use super::arena::NodeId;
use jscope_common::interner::Atom;
use jscope_common::span::Span;
use jscope_scanner::token::TokenKind;
use serde::Serialize;

/// Which declaration keyword introduced a `Var` statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

impl DeclKind {
    /// `let` and `const` are block-scoped; `var` hoists to the nearest
    /// variable scope.
    pub fn is_lexical(self) -> bool {
        !matches!(self, DeclKind::Var)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }
}

/// `for (x in y)` vs `for (x of y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ForInKind {
    In,
    Of,
}

/// How a function object appears in source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FunctionType {
    Declaration,
    Expression,
    Getter,
    Setter,
}

/// Object literal property form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PropertyKind {
    Initializer,
    Getter,
    Setter,
}

/// Literal constant payloads. `Missing` stands for an elided array element
/// (`[1, , 3]`) and for error placeholders.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ConstantValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Missing,
}

// ============================================================================
// Operators
// ============================================================================

/// Binary and assignment operators, ordered by family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Comma,
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    UnsignedShiftRightAssign,
    BitwiseAndAssign,
    BitwiseXorAssign,
    BitwiseOrAssign,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equals,
    NotEquals,
    StrictEquals,
    StrictNotEquals,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    In,
    InstanceOf,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl BinaryOp {
    /// Binding strength for precedence climbing. Higher binds tighter.
    pub fn precedence(self) -> u8 {
        use BinaryOp::*;
        match self {
            Comma => 1,
            Assign | AddAssign | SubtractAssign | MultiplyAssign | DivideAssign
            | RemainderAssign | ShiftLeftAssign | ShiftRightAssign | UnsignedShiftRightAssign
            | BitwiseAndAssign | BitwiseXorAssign | BitwiseOrAssign => 2,
            // Conditional `?:` sits at 3; it is handled inline by the parser.
            LogicalOr => 4,
            LogicalAnd => 5,
            BitwiseOr => 6,
            BitwiseXor => 7,
            BitwiseAnd => 8,
            Equals | NotEquals | StrictEquals | StrictNotEquals => 9,
            LessThan | GreaterThan | LessThanOrEqual | GreaterThanOrEqual | In | InstanceOf => 10,
            ShiftLeft | ShiftRight | UnsignedShiftRight => 11,
            Add | Subtract => 12,
            Multiply | Divide | Remainder => 13,
        }
    }

    pub fn is_assignment(self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            Assign
                | AddAssign
                | SubtractAssign
                | MultiplyAssign
                | DivideAssign
                | RemainderAssign
                | ShiftLeftAssign
                | ShiftRightAssign
                | UnsignedShiftRightAssign
                | BitwiseAndAssign
                | BitwiseXorAssign
                | BitwiseOrAssign
        )
    }

    pub fn is_right_associative(self) -> bool {
        self.is_assignment()
    }

    /// Map the current token to a binary operator, if it starts one.
    /// `no_in` suppresses `in` so `for (x in y)` heads parse correctly.
    pub fn from_token(kind: TokenKind, no_in: bool) -> Option<BinaryOp> {
        use BinaryOp::*;
        let op = match kind {
            TokenKind::CommaToken => Comma,
            TokenKind::EqualsToken => Assign,
            TokenKind::PlusEqualsToken => AddAssign,
            TokenKind::MinusEqualsToken => SubtractAssign,
            TokenKind::AsteriskEqualsToken => MultiplyAssign,
            TokenKind::SlashEqualsToken => DivideAssign,
            TokenKind::PercentEqualsToken => RemainderAssign,
            TokenKind::LessThanLessThanEqualsToken => ShiftLeftAssign,
            TokenKind::GreaterThanGreaterThanEqualsToken => ShiftRightAssign,
            TokenKind::GreaterThanGreaterThanGreaterThanEqualsToken => UnsignedShiftRightAssign,
            TokenKind::AmpersandEqualsToken => BitwiseAndAssign,
            TokenKind::CaretEqualsToken => BitwiseXorAssign,
            TokenKind::BarEqualsToken => BitwiseOrAssign,
            TokenKind::BarBarToken => LogicalOr,
            TokenKind::AmpersandAmpersandToken => LogicalAnd,
            TokenKind::BarToken => BitwiseOr,
            TokenKind::CaretToken => BitwiseXor,
            TokenKind::AmpersandToken => BitwiseAnd,
            TokenKind::EqualsEqualsToken => Equals,
            TokenKind::ExclamationEqualsToken => NotEquals,
            TokenKind::EqualsEqualsEqualsToken => StrictEquals,
            TokenKind::ExclamationEqualsEqualsToken => StrictNotEquals,
            TokenKind::LessThanToken => LessThan,
            TokenKind::GreaterThanToken => GreaterThan,
            TokenKind::LessThanEqualsToken => LessThanOrEqual,
            TokenKind::GreaterThanEqualsToken => GreaterThanOrEqual,
            TokenKind::InKeyword => {
                if no_in {
                    return None;
                }
                In
            }
            TokenKind::InstanceOfKeyword => InstanceOf,
            TokenKind::LessThanLessThanToken => ShiftLeft,
            TokenKind::GreaterThanGreaterThanToken => ShiftRight,
            TokenKind::GreaterThanGreaterThanGreaterThanToken => UnsignedShiftRight,
            TokenKind::PlusToken => Add,
            TokenKind::MinusToken => Subtract,
            TokenKind::AsteriskToken => Multiply,
            TokenKind::SlashToken => Divide,
            TokenKind::PercentToken => Remainder,
            _ => return None,
        };
        Some(op)
    }
}

/// Prefix and postfix unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    LogicalNot,
    BitwiseNot,
    TypeOf,
    Void,
    Delete,
    Increment,
    Decrement,
}

impl UnaryOp {
    pub fn from_prefix_token(kind: TokenKind) -> Option<UnaryOp> {
        let op = match kind {
            TokenKind::PlusToken => UnaryOp::Plus,
            TokenKind::MinusToken => UnaryOp::Minus,
            TokenKind::ExclamationToken => UnaryOp::LogicalNot,
            TokenKind::TildeToken => UnaryOp::BitwiseNot,
            TokenKind::TypeOfKeyword => UnaryOp::TypeOf,
            TokenKind::VoidKeyword => UnaryOp::Void,
            TokenKind::DeleteKeyword => UnaryOp::Delete,
            TokenKind::PlusPlusToken => UnaryOp::Increment,
            TokenKind::MinusMinusToken => UnaryOp::Decrement,
            _ => return None,
        };
        Some(op)
    }
}

// ============================================================================
// Node data
// ============================================================================

/// The data payload of an AST node. Child `NodeId`s here are the owning
/// references; `NodeId::NONE` marks an absent optional child.
#[derive(Clone, Debug, Serialize)]
pub enum NodeData {
    // --- statements ---
    Block {
        statements: Vec<NodeId>,
    },
    Var {
        decl_kind: DeclKind,
        declarations: Vec<NodeId>,
    },
    VariableDeclarator {
        name: Atom,
        name_span: Span,
        initializer: NodeId,
    },
    If {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    },
    For {
        initializer: NodeId,
        condition: NodeId,
        incrementer: NodeId,
        body: NodeId,
    },
    ForIn {
        kind: ForInKind,
        variable: NodeId,
        collection: NodeId,
        body: NodeId,
    },
    While {
        condition: NodeId,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        condition: NodeId,
    },
    Switch {
        expression: NodeId,
        cases: Vec<NodeId>,
    },
    /// `test` is NONE for the `default:` clause. `body` is always a `Block`
    /// that shares the switch's scope.
    SwitchCase {
        test: NodeId,
        body: NodeId,
    },
    Try {
        block: NodeId,
        catch_parameter: NodeId,
        catch_block: NodeId,
        finally_block: NodeId,
    },
    Throw {
        expression: NodeId,
    },
    Return {
        expression: NodeId,
    },
    /// `finally_count` is how many `finally` blocks the jump escapes.
    Break {
        label: Atom,
        finally_count: u32,
    },
    Continue {
        label: Atom,
        finally_count: u32,
    },
    Labeled {
        label: Atom,
        label_span: Span,
        statement: NodeId,
    },
    With {
        object: NodeId,
        body: NodeId,
    },
    Directive {
        value: String,
        use_strict: bool,
    },
    Empty,
    Debugger,

    // --- functions ---
    FunctionObject {
        function_type: FunctionType,
        name: Atom,
        name_span: Span,
        parameters: Vec<NodeId>,
        body: NodeId,
    },
    ParameterDeclaration {
        name: Atom,
        position: u32,
    },

    // --- expressions ---
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
        postfix: bool,
    },
    Conditional {
        condition: NodeId,
        when_true: NodeId,
        when_false: NodeId,
    },
    /// `in_brackets` means `a[b]` indexing; `is_constructor` means `new`.
    Call {
        function: NodeId,
        arguments: Vec<NodeId>,
        in_brackets: bool,
        is_constructor: bool,
    },
    /// Dotted property access `root.name`.
    Member {
        root: NodeId,
        name: Atom,
        name_span: Span,
    },
    ArrayLiteral {
        elements: Vec<NodeId>,
    },
    ObjectLiteral {
        properties: Vec<NodeId>,
    },
    ObjectLiteralProperty {
        kind: PropertyKind,
        key: NodeId,
        value: NodeId,
    },
    /// An identifier read or write, resolved later by the scope resolver.
    Lookup {
        name: Atom,
    },
    Constant {
        value: ConstantValue,
    },
    RegExpLiteral {
        pattern: String,
        flags: String,
    },
    This,
    Grouping {
        operand: NodeId,
    },
    Comma {
        expressions: Vec<NodeId>,
    },
}

impl NodeData {
    /// Short name for diagnostics and debug output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeData::Block { .. } => "Block",
            NodeData::Var { .. } => "Var",
            NodeData::VariableDeclarator { .. } => "VariableDeclarator",
            NodeData::If { .. } => "If",
            NodeData::For { .. } => "For",
            NodeData::ForIn { .. } => "ForIn",
            NodeData::While { .. } => "While",
            NodeData::DoWhile { .. } => "DoWhile",
            NodeData::Switch { .. } => "Switch",
            NodeData::SwitchCase { .. } => "SwitchCase",
            NodeData::Try { .. } => "Try",
            NodeData::Throw { .. } => "Throw",
            NodeData::Return { .. } => "Return",
            NodeData::Break { .. } => "Break",
            NodeData::Continue { .. } => "Continue",
            NodeData::Labeled { .. } => "Labeled",
            NodeData::With { .. } => "With",
            NodeData::Directive { .. } => "Directive",
            NodeData::Empty => "Empty",
            NodeData::Debugger => "Debugger",
            NodeData::FunctionObject { .. } => "FunctionObject",
            NodeData::ParameterDeclaration { .. } => "ParameterDeclaration",
            NodeData::Binary { .. } => "Binary",
            NodeData::Unary { .. } => "Unary",
            NodeData::Conditional { .. } => "Conditional",
            NodeData::Call { .. } => "Call",
            NodeData::Member { .. } => "Member",
            NodeData::ArrayLiteral { .. } => "ArrayLiteral",
            NodeData::ObjectLiteral { .. } => "ObjectLiteral",
            NodeData::ObjectLiteralProperty { .. } => "ObjectLiteralProperty",
            NodeData::Lookup { .. } => "Lookup",
            NodeData::Constant { .. } => "Constant",
            NodeData::RegExpLiteral { .. } => "RegExpLiteral",
            NodeData::This => "This",
            NodeData::Grouping { .. } => "Grouping",
            NodeData::Comma { .. } => "Comma",
        }
    }

    /// Push all non-null children in source order.
    pub(crate) fn collect_children(&self, out: &mut Vec<NodeId>) {
        fn push(out: &mut Vec<NodeId>, id: NodeId) {
            if id.is_some() {
                out.push(id);
            }
        }
        match self {
            NodeData::Block { statements } => out.extend(statements.iter().copied()),
            NodeData::Var { declarations, .. } => out.extend(declarations.iter().copied()),
            NodeData::VariableDeclarator { initializer, .. } => push(out, *initializer),
            NodeData::If {
                condition,
                then_branch,
                else_branch,
            } => {
                push(out, *condition);
                push(out, *then_branch);
                push(out, *else_branch);
            }
            NodeData::For {
                initializer,
                condition,
                incrementer,
                body,
            } => {
                push(out, *initializer);
                push(out, *condition);
                push(out, *incrementer);
                push(out, *body);
            }
            NodeData::ForIn {
                variable,
                collection,
                body,
                ..
            } => {
                push(out, *variable);
                push(out, *collection);
                push(out, *body);
            }
            NodeData::While { condition, body } => {
                push(out, *condition);
                push(out, *body);
            }
            NodeData::DoWhile { body, condition } => {
                push(out, *body);
                push(out, *condition);
            }
            NodeData::Switch { expression, cases } => {
                push(out, *expression);
                out.extend(cases.iter().copied());
            }
            NodeData::SwitchCase { test, body } => {
                push(out, *test);
                push(out, *body);
            }
            NodeData::Try {
                block,
                catch_parameter,
                catch_block,
                finally_block,
            } => {
                push(out, *block);
                push(out, *catch_parameter);
                push(out, *catch_block);
                push(out, *finally_block);
            }
            NodeData::Throw { expression } | NodeData::Return { expression } => {
                push(out, *expression)
            }
            NodeData::Break { .. } | NodeData::Continue { .. } => {}
            NodeData::Labeled { statement, .. } => push(out, *statement),
            NodeData::With { object, body } => {
                push(out, *object);
                push(out, *body);
            }
            NodeData::Directive { .. } | NodeData::Empty | NodeData::Debugger => {}
            NodeData::FunctionObject {
                parameters, body, ..
            } => {
                out.extend(parameters.iter().copied());
                push(out, *body);
            }
            NodeData::ParameterDeclaration { .. } => {}
            NodeData::Binary { left, right, .. } => {
                push(out, *left);
                push(out, *right);
            }
            NodeData::Unary { operand, .. } => push(out, *operand),
            NodeData::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                push(out, *condition);
                push(out, *when_true);
                push(out, *when_false);
            }
            NodeData::Call {
                function,
                arguments,
                ..
            } => {
                push(out, *function);
                out.extend(arguments.iter().copied());
            }
            NodeData::Member { root, .. } => push(out, *root),
            NodeData::ArrayLiteral { elements } => out.extend(elements.iter().copied()),
            NodeData::ObjectLiteral { properties } => out.extend(properties.iter().copied()),
            NodeData::ObjectLiteralProperty { key, value, .. } => {
                push(out, *key);
                push(out, *value);
            }
            NodeData::Lookup { .. }
            | NodeData::Constant { .. }
            | NodeData::RegExpLiteral { .. }
            | NodeData::This => {}
            NodeData::Grouping { operand } => push(out, *operand),
            NodeData::Comma { expressions } => out.extend(expressions.iter().copied()),
        }
    }

    /// Rewrite every occurrence of `old` among the child handles to `new`.
    pub(crate) fn replace_child_id(&mut self, old: NodeId, new: NodeId) {
        fn swap(slot: &mut NodeId, old: NodeId, new: NodeId) {
            if *slot == old {
                *slot = new;
            }
        }
        fn swap_vec(slots: &mut [NodeId], old: NodeId, new: NodeId) {
            for slot in slots {
                swap(slot, old, new);
            }
        }
        match self {
            NodeData::Block { statements } => swap_vec(statements, old, new),
            NodeData::Var { declarations, .. } => swap_vec(declarations, old, new),
            NodeData::VariableDeclarator { initializer, .. } => swap(initializer, old, new),
            NodeData::If {
                condition,
                then_branch,
                else_branch,
            } => {
                swap(condition, old, new);
                swap(then_branch, old, new);
                swap(else_branch, old, new);
            }
            NodeData::For {
                initializer,
                condition,
                incrementer,
                body,
            } => {
                swap(initializer, old, new);
                swap(condition, old, new);
                swap(incrementer, old, new);
                swap(body, old, new);
            }
            NodeData::ForIn {
                variable,
                collection,
                body,
                ..
            } => {
                swap(variable, old, new);
                swap(collection, old, new);
                swap(body, old, new);
            }
            NodeData::While { condition, body } => {
                swap(condition, old, new);
                swap(body, old, new);
            }
            NodeData::DoWhile { body, condition } => {
                swap(body, old, new);
                swap(condition, old, new);
            }
            NodeData::Switch { expression, cases } => {
                swap(expression, old, new);
                swap_vec(cases, old, new);
            }
            NodeData::SwitchCase { test, body } => {
                swap(test, old, new);
                swap(body, old, new);
            }
            NodeData::Try {
                block,
                catch_parameter,
                catch_block,
                finally_block,
            } => {
                swap(block, old, new);
                swap(catch_parameter, old, new);
                swap(catch_block, old, new);
                swap(finally_block, old, new);
            }
            NodeData::Throw { expression } | NodeData::Return { expression } => {
                swap(expression, old, new)
            }
            NodeData::Break { .. } | NodeData::Continue { .. } => {}
            NodeData::Labeled { statement, .. } => swap(statement, old, new),
            NodeData::With { object, body } => {
                swap(object, old, new);
                swap(body, old, new);
            }
            NodeData::Directive { .. } | NodeData::Empty | NodeData::Debugger => {}
            NodeData::FunctionObject {
                parameters, body, ..
            } => {
                swap_vec(parameters, old, new);
                swap(body, old, new);
            }
            NodeData::ParameterDeclaration { .. } => {}
            NodeData::Binary { left, right, .. } => {
                swap(left, old, new);
                swap(right, old, new);
            }
            NodeData::Unary { operand, .. } => swap(operand, old, new),
            NodeData::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                swap(condition, old, new);
                swap(when_true, old, new);
                swap(when_false, old, new);
            }
            NodeData::Call {
                function,
                arguments,
                ..
            } => {
                swap(function, old, new);
                swap_vec(arguments, old, new);
            }
            NodeData::Member { root, .. } => swap(root, old, new),
            NodeData::ArrayLiteral { elements } => swap_vec(elements, old, new),
            NodeData::ObjectLiteral { properties } => swap_vec(properties, old, new),
            NodeData::ObjectLiteralProperty { key, value, .. } => {
                swap(key, old, new);
                swap(value, old, new);
            }
            NodeData::Lookup { .. }
            | NodeData::Constant { .. }
            | NodeData::RegExpLiteral { .. }
            | NodeData::This => {}
            NodeData::Grouping { operand } => swap(operand, old, new),
            NodeData::Comma { expressions } => swap_vec(expressions, old, new),
        }
    }
}

/// Whether a node can legally appear on the left of an assignment or as the
/// operand of `++`/`--`. Bracket indexing counts; a grouped target is checked
/// through the parentheses.
pub fn is_valid_assignment_target(arena: &super::arena::AstArena, id: NodeId) -> bool {
    if id.is_none() {
        return false;
    }
    match &arena.node(id).data {
        NodeData::Lookup { .. } | NodeData::Member { .. } => true,
        NodeData::Call { in_brackets, .. } => *in_brackets,
        NodeData::Grouping { operand } => is_valid_assignment_target(arena, *operand),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_ordering() {
        assert!(BinaryOp::Multiply.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::Add.precedence() > BinaryOp::ShiftLeft.precedence());
        assert!(BinaryOp::LessThan.precedence() > BinaryOp::Equals.precedence());
        assert!(BinaryOp::LogicalAnd.precedence() > BinaryOp::LogicalOr.precedence());
        assert!(BinaryOp::LogicalOr.precedence() > BinaryOp::Assign.precedence());
        assert!(BinaryOp::Assign.precedence() > BinaryOp::Comma.precedence());
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert!(BinaryOp::Assign.is_right_associative());
        assert!(BinaryOp::AddAssign.is_right_associative());
        assert!(!BinaryOp::Add.is_right_associative());
        assert!(!BinaryOp::Comma.is_right_associative());
    }

    #[test]
    fn test_no_in_suppresses_in_operator() {
        assert_eq!(
            BinaryOp::from_token(TokenKind::InKeyword, false),
            Some(BinaryOp::In)
        );
        assert_eq!(BinaryOp::from_token(TokenKind::InKeyword, true), None);
        // Other operators are unaffected by the flag.
        assert_eq!(
            BinaryOp::from_token(TokenKind::PlusToken, true),
            Some(BinaryOp::Add)
        );
    }
}
