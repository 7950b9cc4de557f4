use livy_source::Span;

use crate::literal::{Literal, VectorKind};

/// A primitive operation recognized by the simplifier (`spec.md` §4.5) and
/// compiled to a single `NATIVE` instruction (`spec.md` §4.8).
///
/// The numeric codes are a wire-protocol contract with the virtual machine
/// (`spec.md` §9 "Native operator codes") and are fixed here, alphabetically
/// by operator name, matching the recovered original's `OperationTypes` enum
/// and its expected instruction traces (see `SPEC_FULL.md`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeOp {
    Add,
    Div,
    Equal,
    Exp,
    Greater,
    Join,
    Less,
    Mod,
    Mul,
    Neg,
    Sub,
}

impl NativeOp {
    /// The `NATIVE` instruction's operand.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Add => 1,
            Self::Div => 2,
            Self::Equal => 3,
            Self::Exp => 4,
            Self::Greater => 5,
            Self::Join => 6,
            Self::Less => 7,
            Self::Mod => 8,
            Self::Mul => 9,
            Self::Neg => 10,
            Self::Sub => 11,
        }
    }

    /// `true` for the single unary operator, `~` (negation).
    #[must_use]
    pub const fn is_unary(self) -> bool { matches!(self, Self::Neg) }

    /// Looks up a `NativeOp` from its surface operator spelling, for the
    /// given arity. Returns `None` when `name` is not one of the fixed
    /// operator spellings or the arity does not match.
    #[must_use]
    pub fn from_operator_name(name: &str, arity: usize) -> Option<Self> {
        let op = match (name, arity) {
            ("+", 2) => Self::Add,
            ("/", 2) => Self::Div,
            ("=", 2) => Self::Equal,
            ("^", 2) => Self::Exp,
            (">", 2) => Self::Greater,
            ("<>", 2) => Self::Join,
            ("<", 2) => Self::Less,
            ("%", 2) => Self::Mod,
            ("*", 2) => Self::Mul,
            ("~", 1) => Self::Neg,
            ("-", 2) => Self::Sub,
            _ => return None,
        };
        Some(op)
    }
}

/// A lowered AST node (`spec.md` §3.1), the shape code generation consumes.
#[derive(Debug, Clone)]
pub enum LExpr {
    Scalar(Span, Literal),
    Name(Span, String),
    Vector(Span, VectorKind, Vec<LExpr>),
    Cond { span: Span, pred: Box<LExpr>, cons: Box<LExpr>, else_: Box<LExpr> },
    /// The parameter list is materialized (uncurried).
    Function { span: Span, params: Vec<String>, body: Box<LExpr> },
    /// The argument list is materialized (uncurried). Stored as a real
    /// `Vec<LExpr>` — the recovered original's `FuncCall.__init__` aliases
    /// this field to `func` by mistake; that bug is not replicated here.
    FuncCall { span: Span, func: Box<LExpr>, args: Vec<LExpr> },
    /// `right` is `None` iff `op` is unary.
    NativeOperation { span: Span, op: NativeOp, left: Box<LExpr>, right: Option<Box<LExpr>> },
    Block(Span, Vec<LExpr>),
    /// Top-level (body-less) binding.
    Define { span: Span, target: String, value: Box<LExpr> },
}


impl LExpr {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Scalar(span, _)
            | Self::Name(span, _)
            | Self::Vector(span, ..)
            | Self::Cond { span, .. }
            | Self::Function { span, .. }
            | Self::FuncCall { span, .. }
            | Self::NativeOperation { span, .. }
            | Self::Block(span, _)
            | Self::Define { span, .. } => *span,
        }
    }
}
