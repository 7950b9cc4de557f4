//! Post-solve numeric-operand check for arithmetic, comparison, and negation
//! operators (`spec.md` §3.4).
//!
//! `scope::default_operator_types` generalizes these operators over a single
//! shared operand type variable so `1 + 2` and `1.5 + 2.5` both unify; that
//! scheme alone can't forbid the variable from resolving to `String` or
//! `Bool`, since unification has no notion of "numeric" to enforce. This pass
//! walks the fully-substituted tree and rejects exactly that case, after
//! `substitutor` has resolved every node to its concrete type.

use livy_ast::Expr;
use livy_types::Type;

use crate::error::InferError;
use crate::scope::{is_numeric_operator, UNARY_NUMERIC_OPERATORS};
use crate::type_table::TypeTable;

/// Walks `expr`, checking every arithmetic/comparison/negation application's
/// operands against `table`.
pub fn check(expr: &Expr, table: &TypeTable) -> Result<(), InferError> {
    if let Expr::FuncCall { .. } = expr {
        if let Some((name, args)) = peel_operator_call(expr) {
            if args.len() == expected_arity(name) {
                for arg in args {
                    let ty = table.type_of(arg.id());
                    if *ty != Type::int() && *ty != Type::float() {
                        return Err(InferError::NonNumericOperand {
                            operator: name.to_string(),
                            ty: ty.clone(),
                            span: arg.span(),
                        });
                    }
                }
            }
        }
    }

    match expr {
        Expr::Scalar(..) | Expr::Name(..) => Ok(()),

        Expr::Vector(_, _, _, elements) => elements.iter().try_for_each(|e| check(e, table)),

        Expr::Cond { pred, cons, else_, .. } => {
            check(pred, table)?;
            check(cons, table)?;
            check(else_, table)
        }

        Expr::Function { body, .. } => check(body, table),

        Expr::FuncCall { caller, callee, .. } => {
            check(caller, table)?;
            check(callee, table)
        }

        Expr::Define { value, body, .. } => {
            check(value, table)?;
            body.as_deref().map_or(Ok(()), |body| check(body, table))
        }

        Expr::Block(_, _, elements) => elements.iter().try_for_each(|e| check(e, table)),
    }
}

fn expected_arity(name: &str) -> usize {
    if UNARY_NUMERIC_OPERATORS.contains(&name) { 1 } else { 2 }
}

/// If `expr` is a complete application of one of the numeric operators,
/// returns its name and the operand expressions in application order.
/// Returns `None` for anything else, including a partial application (an
/// operator applied to fewer arguments than it takes).
fn peel_operator_call(expr: &Expr) -> Option<(&str, Vec<&Expr>)> {
    let mut args = Vec::new();
    let mut current = expr;
    loop {
        match current {
            Expr::FuncCall { caller, callee, .. } => {
                args.push(callee.as_ref());
                current = caller;
            }
            Expr::Name(_, _, name, _) if is_numeric_operator(name) => {
                args.reverse();
                return Some((name.as_str(), args));
            }
            _ => return None,
        }
    }
}
