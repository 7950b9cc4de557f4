use livy_source::Span;

use crate::literal::{Literal, VectorKind};
use crate::node_id::NodeId;

/// A user-written type annotation, attached to a binding occurrence of a
/// `Name` (`spec.md` §4.2). Surface syntax for annotations is parser-specific;
/// this shape is deliberately minimal — a bare variable or a constructor
/// applied to argument annotations — since the type-variable resolver only
/// needs to tell textually identical annotations apart within a scope.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    /// A bare annotation name, e.g. `a` in `\(x: a) -> x`.
    Var(String),
    /// A type constructor applied to argument annotations, e.g. `List a`.
    Con(String, Vec<TypeAnnotation>),
}

/// A surface AST node (`spec.md` §3.1). Every variant carries the [`NodeId`]
/// minted for it at parse time and the [`Span`] of source text it covers.
#[derive(Debug, Clone)]
pub enum Expr {
    Scalar(NodeId, Span, Literal),
    /// An identifier. `annotation` is `Some` only at a binding occurrence that
    /// carried a user-written type annotation (a `Function` parameter or a
    /// `Define` target); reference occurrences always carry `None`.
    Name(NodeId, Span, String, Option<TypeAnnotation>),
    Vector(NodeId, Span, VectorKind, Vec<Expr>),
    Cond { id: NodeId, span: Span, pred: Box<Expr>, cons: Box<Expr>, else_: Box<Expr> },
    /// Single-parameter abstraction. Multi-parameter surface syntax is
    /// desugared by the parser into right-nested `Function` nodes.
    Function { id: NodeId, span: Span, param: Box<Expr>, body: Box<Expr> },
    /// Single-argument application. Multi-argument surface syntax is
    /// desugared into left-nested `FuncCall` nodes.
    FuncCall { id: NodeId, span: Span, caller: Box<Expr>, callee: Box<Expr> },
    /// Let-binding. `body` absent means a top-level (block-statement)
    /// definition whose scope extends to the end of its enclosing block.
    Define { id: NodeId, span: Span, target: Box<Expr>, value: Box<Expr>, body: Option<Box<Expr>> },
    /// Non-empty ordered sequence of expressions; the block's value is the
    /// value of its last expression.
    Block(NodeId, Span, Vec<Expr>),
}

impl Expr {
    #[must_use]
    pub const fn id(&self) -> NodeId {
        match self {
            Self::Scalar(id, ..)
            | Self::Name(id, ..)
            | Self::Vector(id, ..)
            | Self::Cond { id, .. }
            | Self::Function { id, .. }
            | Self::FuncCall { id, .. }
            | Self::Define { id, .. }
            | Self::Block(id, ..) => *id,
        }
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Scalar(_, span, _)
            | Self::Name(_, span, ..)
            | Self::Vector(_, span, ..)
            | Self::Cond { span, .. }
            | Self::Function { span, .. }
            | Self::FuncCall { span, .. }
            | Self::Define { span, .. }
            | Self::Block(_, span, _) => *span,
        }
    }
}
