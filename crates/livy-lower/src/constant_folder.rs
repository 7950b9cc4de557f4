//! Compile-time evaluation of native operations over literal operands
//! (`spec.md` §4.6).

use livy_ast::{LExpr, Literal, NativeOp};

/// Folds every `NativeOperation` in `expr` whose operands are literals after
/// their own subtrees are folded, bottom-up.
#[must_use]
pub fn fold(expr: &LExpr) -> LExpr {
    match expr {
        LExpr::Scalar(..) | LExpr::Name(..) => expr.clone(),

        LExpr::Vector(span, kind, elements) => {
            LExpr::Vector(*span, *kind, elements.iter().map(fold).collect())
        }

        LExpr::Cond { span, pred, cons, else_ } => LExpr::Cond {
            span: *span,
            pred: Box::new(fold(pred)),
            cons: Box::new(fold(cons)),
            else_: Box::new(fold(else_)),
        },

        LExpr::Function { span, params, body } => {
            LExpr::Function { span: *span, params: params.clone(), body: Box::new(fold(body)) }
        }

        LExpr::FuncCall { span, func, args } => {
            LExpr::FuncCall { span: *span, func: Box::new(fold(func)), args: args.iter().map(fold).collect() }
        }

        LExpr::NativeOperation { span, op, left, right } => {
            let left = fold(left);
            let right = right.as_ref().map(|right| fold(right));
            match evaluate(*op, &left, right.as_ref()) {
                Some(literal) => {
                    log::trace!("constant folder: folded {op:?} into a {} literal", literal.type_name());
                    LExpr::Scalar(*span, literal)
                }
                None => LExpr::NativeOperation { span: *span, op: *op, left: Box::new(left), right: right.map(Box::new) },
            }
        }

        LExpr::Block(span, elements) => LExpr::Block(*span, elements.iter().map(fold).collect()),

        LExpr::Define { span, target, value } => {
            LExpr::Define { span: *span, target: target.clone(), value: Box::new(fold(value)) }
        }
    }
}

/// Evaluates a native operation whose operands are already-folded literals.
/// Returns `None` if the operands aren't both literals, or the operation
/// can't be folded at compile time (division by zero is left to the runtime).
fn evaluate(op: NativeOp, left: &LExpr, right: Option<&LExpr>) -> Option<Literal> {
    let LExpr::Scalar(_, left) = left else { return None };

    if op.is_unary() {
        let Literal::Int(n) = left else { return None };
        return match op {
            NativeOp::Neg => Some(Literal::Int(-n)),
            _ => None,
        };
    }

    let Some(LExpr::Scalar(_, right)) = right else { return None };

    if let NativeOp::Join = op {
        let (Literal::String(l), Literal::String(r)) = (left, right) else { return None };
        return Some(Literal::String(format!("{l}{r}")));
    }

    let (Literal::Int(l), Literal::Int(r)) = (left, right) else { return None };
    match op {
        NativeOp::Add => Some(Literal::Int(l.checked_add(*r)?)),
        NativeOp::Sub => Some(Literal::Int(l.checked_sub(*r)?)),
        NativeOp::Mul => Some(Literal::Int(l.checked_mul(*r)?)),
        NativeOp::Div if *r == 0 => None,
        NativeOp::Div => Some(Literal::Int(l.checked_div(*r)?)),
        NativeOp::Mod if *r == 0 => None,
        NativeOp::Mod => Some(Literal::Int(l.checked_rem(*r)?)),
        NativeOp::Exp if *r >= 0 => Some(Literal::Int(l.checked_pow((*r).try_into().ok()?)?)),
        NativeOp::Exp => None,
        NativeOp::Equal => Some(Literal::Bool(l == r)),
        NativeOp::Less => Some(Literal::Bool(l < r)),
        NativeOp::Greater => Some(Literal::Bool(l > r)),
        NativeOp::Join | NativeOp::Neg => unreachable!("handled above"),
    }
}

#[cfg(test)]
mod tests {
    use livy_source::Span;

    use super::*;

    fn int(value: i64) -> LExpr { LExpr::Scalar(Span::new(0, 1), Literal::Int(value)) }

    fn binop(op: NativeOp, left: LExpr, right: LExpr) -> LExpr {
        LExpr::NativeOperation { span: Span::new(0, 1), op, left: Box::new(left), right: Some(Box::new(right)) }
    }

    #[test]
    fn integer_arithmetic_folds() {
        assert!(matches!(fold(&binop(NativeOp::Add, int(2), int(3))), LExpr::Scalar(_, Literal::Int(5))));
    }

    #[test]
    fn division_by_zero_is_left_for_runtime() {
        let expr = binop(NativeOp::Div, int(1), int(0));
        assert!(matches!(fold(&expr), LExpr::NativeOperation { .. }));
    }

    #[test]
    fn string_join_folds() {
        let expr = binop(
            NativeOp::Join,
            LExpr::Scalar(Span::new(0, 1), Literal::String("ab".into())),
            LExpr::Scalar(Span::new(0, 1), Literal::String("cd".into())),
        );
        assert!(matches!(fold(&expr), LExpr::Scalar(_, Literal::String(s)) if s == "abcd"));
    }

    #[test]
    fn non_literal_operand_is_left_intact() {
        let expr = binop(NativeOp::Add, int(1), LExpr::Name(Span::new(0, 1), "x".into()));
        assert!(matches!(fold(&expr), LExpr::NativeOperation { .. }));
    }
}
