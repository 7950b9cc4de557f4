use livy_source::Span;
use livy_types::{Type, TypeVarId, UnifyError};
use thiserror::Error;

/// Errors the inferer can surface (`spec.md` §7: unbound name, type
/// mismatch, occurs check, redefinition conflict).
#[derive(Debug, Error, Clone)]
pub enum InferError {
    #[error("unbound name `{name}`")]
    UnboundName { name: String, span: Span },

    #[error("cannot unify `{left}` with `{right}`")]
    TypeMismatch { left: Type, right: Type, span: Span },

    #[error("occurs check failed: `{var}` occurs in `{ty}`")]
    OccursCheck { var: TypeVarId, ty: Type, span: Span },

    #[error("`{name}` redefined with an incompatible type")]
    Redefinition { name: String, span: Span },

    #[error("operator `{operator}` requires a numeric operand, found `{ty}`")]
    NonNumericOperand { operator: String, ty: Type, span: Span },
}

impl InferError {
    /// Attaches `span` to a `UnifyError` produced while solving the equation
    /// that originated at that span.
    #[must_use]
    pub fn from_unify(err: UnifyError, span: Span) -> Self {
        match err {
            UnifyError::Mismatch(left, right) => Self::TypeMismatch { left, right, span },
            UnifyError::Occurs(var, ty) => Self::OccursCheck { var, ty, span },
        }
    }
}
