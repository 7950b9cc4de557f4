//! Surface-to-lowered AST simplification (`spec.md` §4.5).

use livy_ast::{Expr, LExpr, NativeOp, VectorKind};

/// Rewrites the surface tree into its lowered form. Runs after the string
/// expander, type-variable resolver, and topological sorter, and before
/// constant folding and inlining.
#[must_use]
pub fn lower(expr: &Expr) -> LExpr {
    match expr {
        Expr::Scalar(_, span, literal) => LExpr::Scalar(*span, literal.clone()),

        Expr::Name(_, span, name, _) => LExpr::Name(*span, name.clone()),

        Expr::Vector(_, span, VectorKind::Tuple, elements) if elements.len() == 1 => {
            // `(e,)` is a grouping quirk in the surface grammar, not a
            // singleton tuple — unwrap to the element itself.
            let _ = span;
            lower(&elements[0])
        }
        Expr::Vector(_, span, kind, elements) => {
            LExpr::Vector(*span, *kind, elements.iter().map(lower).collect())
        }

        Expr::Cond { span, pred, cons, else_, .. } => LExpr::Cond {
            span: *span,
            pred: Box::new(lower(pred)),
            cons: Box::new(lower(cons)),
            else_: Box::new(lower(else_)),
        },

        Expr::Function { span, .. } => {
            let (params, body) = peel_function(expr);
            LExpr::Function { span: *span, params, body: Box::new(lower(body)) }
        }

        Expr::FuncCall { span, .. } => {
            let (func, args) = peel_calls(expr);
            if let Expr::Name(_, _, name, _) = func {
                if let Some(op) = NativeOp::from_operator_name(name, args.len()) {
                    log::trace!("simplifier: recognized `{name}` as native operation {op:?}");
                    let mut lowered_args = args.iter().map(|arg| lower(arg));
                    let left = Box::new(lowered_args.next().expect("arity matched, at least one arg"));
                    let right = lowered_args.next().map(Box::new);
                    return LExpr::NativeOperation { span: *span, op, left, right };
                }
            }
            LExpr::FuncCall {
                span: *span,
                func: Box::new(lower(func)),
                args: args.iter().map(|arg| lower(arg)).collect(),
            }
        }

        Expr::Define { span, target, value, body, .. } => {
            let Expr::Name(_, _, target_name, _) = target.as_ref() else {
                unreachable!("a Define's target is always a Name node");
            };
            let binding =
                LExpr::Define { span: *span, target: target_name.clone(), value: Box::new(lower(value)) };
            match body {
                None => binding,
                Some(body) => LExpr::Block(*span, vec![binding, lower(body)]),
            }
        }

        Expr::Block(_, span, elements) => LExpr::Block(*span, elements.iter().map(lower).collect()),
    }
}

/// Collapses a right-nested chain of single-parameter `Function`s into one
/// parameter list plus the innermost non-`Function` body.
fn peel_function(expr: &Expr) -> (Vec<String>, &Expr) {
    if let Expr::Function { param, body, .. } = expr {
        let Expr::Name(_, _, name, _) = param.as_ref() else {
            unreachable!("a Function's param is always a Name node");
        };
        let (mut rest, final_body) = peel_function(body);
        rest.insert(0, name.clone());
        (rest, final_body)
    } else {
        (Vec::new(), expr)
    }
}

/// Collapses a left-nested chain of single-argument `FuncCall`s into the
/// ultimate caller plus its materialized argument list, in application order.
fn peel_calls(expr: &Expr) -> (&Expr, Vec<&Expr>) {
    if let Expr::FuncCall { caller, callee, .. } = expr {
        let (func, mut args) = peel_calls(caller);
        args.push(callee);
        (func, args)
    } else {
        (expr, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use livy_ast::{Literal, NodeId};
    use livy_source::Span;

    use super::*;

    fn name(raw_id: u32, text: &str) -> Expr {
        Expr::Name(NodeId::new(raw_id), Span::new(0, 1), text.into(), None)
    }

    fn int(raw_id: u32, value: i64) -> Expr {
        Expr::Scalar(NodeId::new(raw_id), Span::new(0, 1), Literal::Int(value))
    }

    fn call(raw_id: u32, caller: Expr, callee: Expr) -> Expr {
        Expr::FuncCall { id: NodeId::new(raw_id), span: Span::new(0, 1), caller: Box::new(caller), callee: Box::new(callee) }
    }

    #[test]
    fn binary_operator_call_becomes_native_operation() {
        // 1 + 2
        let expr = call(2, call(1, name(0, "+"), int(10, 1)), int(11, 2));
        let LExpr::NativeOperation { op, left, right, .. } = lower(&expr) else {
            panic!("expected a NativeOperation");
        };
        assert_eq!(op, NativeOp::Add);
        assert!(matches!(*left, LExpr::Scalar(_, Literal::Int(1))));
        assert!(matches!(right.map(|r| *r), Some(LExpr::Scalar(_, Literal::Int(2)))));
    }

    #[test]
    fn unary_operator_call_becomes_native_operation() {
        // ~5
        let expr = call(1, name(0, "~"), int(10, 5));
        let LExpr::NativeOperation { op, right, .. } = lower(&expr) else {
            panic!("expected a NativeOperation");
        };
        assert_eq!(op, NativeOp::Neg);
        assert!(right.is_none());
    }

    #[test]
    fn curried_calls_to_non_operator_uncurry_into_one_call() {
        // f a b
        let expr = call(2, call(1, name(0, "f"), name(10, "a")), name(11, "b"));
        let LExpr::FuncCall { func, args, .. } = lower(&expr) else { panic!("expected a FuncCall") };
        assert!(matches!(*func, LExpr::Name(_, ref n) if n == "f"));
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn curried_functions_collapse_into_one_parameter_list() {
        // \x -> \y -> x
        let expr = Expr::Function {
            id: NodeId::new(2),
            span: Span::new(0, 1),
            param: Box::new(name(0, "x")),
            body: Box::new(Expr::Function {
                id: NodeId::new(3),
                span: Span::new(0, 1),
                param: Box::new(name(1, "y")),
                body: Box::new(name(4, "x")),
            }),
        };
        let LExpr::Function { params, .. } = lower(&expr) else { panic!("expected a Function") };
        assert_eq!(params, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn singleton_tuple_unwraps_to_its_element() {
        let expr = Expr::Vector(NodeId::new(0), Span::new(0, 1), VectorKind::Tuple, vec![int(1, 1)]);
        assert!(matches!(lower(&expr), LExpr::Scalar(_, Literal::Int(1))));
    }

    #[test]
    fn define_with_body_becomes_a_block() {
        let expr = Expr::Define {
            id: NodeId::new(0),
            span: Span::new(0, 1),
            target: Box::new(name(1, "x")),
            value: Box::new(int(2, 1)),
            body: Some(Box::new(name(3, "x"))),
        };
        let LExpr::Block(_, elements) = lower(&expr) else { panic!("expected a Block") };
        assert_eq!(elements.len(), 2);
        assert!(matches!(elements[0], LExpr::Define { .. }));
    }
}
