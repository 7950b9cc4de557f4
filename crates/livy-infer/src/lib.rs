//! Hindley-Milner type inference over the surface AST (`spec.md` §4.4).
//!
//! Four sub-passes, run in order: [`inserter`] assigns every node a fresh
//! type variable, [`equation`] walks the annotated tree generating
//! equations, [`solve`] unifies them into a single closed substitution,
//! [`substitutor`] applies it back, re-generalizing at `Define`/`Function`
//! boundaries, and `numeric_check` rejects any arithmetic/comparison/
//! negation operator whose shared operand variable settled on something
//! other than `Int`/`Float`. The result is a [`TypeTable`], not a mutated
//! tree — see `livy-ast`'s module doc for why.

mod equation;
mod error;
mod inserter;
mod numeric_check;
mod scope;
mod solve;
mod substitutor;
mod type_table;

pub use equation::Equation;
pub use error::InferError;
pub use scope::Scope;
pub use type_table::TypeTable;

use livy_ast::Expr;
use livy_types::TypeVarGen;
use log::debug;

/// Runs the full inference pipeline over `expr`, producing the typed AST's
/// type table (`spec.md` §4.4: Inserter → Equation generator → Unifier →
/// Substitutor).
pub fn infer(expr: &Expr) -> Result<TypeTable, InferError> {
    let mut gen = TypeVarGen::new();
    let mut table = TypeTable::new();

    debug!("inserter: assigning fresh type variables");
    inserter::insert_fresh_vars(expr, &mut gen, &mut table);

    debug!("equation generator: walking annotated tree");
    let mut equations = Vec::new();
    let mut scope = Scope::root();
    equation::generate(expr, &mut scope, &mut table, &mut gen, &mut equations)?;

    debug!("solving {} equations", equations.len());
    let substitution = solve::solve(&equations, &mut gen)?;

    debug!("substitutor: finalizing node types");
    substitutor::substitute(expr, &substitution, &mut table);

    debug!("numeric check: validating operator operand types");
    numeric_check::check(expr, &table)?;

    Ok(table)
}

#[cfg(test)]
mod tests {
    use livy_ast::{Literal, NodeId, VectorKind};
    use livy_source::Span;
    use livy_types::Type;

    use super::*;

    fn name(id: u32, span: (usize, usize), text: &str) -> Expr {
        Expr::Name(NodeId::new(id), Span::new(span.0, span.1), text.into(), None)
    }

    #[test]
    fn occurs_check_rejects_self_application() {
        // let x = x x
        let x_callee = name(1, (8, 9), "x");
        let x_caller = name(2, (6, 7), "x");
        let call = Expr::FuncCall {
            id: NodeId::new(3),
            span: Span::new(6, 9),
            caller: Box::new(x_caller),
            callee: Box::new(x_callee),
        };
        let target = name(0, (4, 5), "x");
        let define = Expr::Define {
            id: NodeId::new(4),
            span: Span::new(0, 9),
            target: Box::new(target),
            value: Box::new(call),
            body: None,
        };
        assert!(matches!(infer(&define), Err(InferError::OccursCheck { .. })));
    }

    #[test]
    fn let_polymorphism_gives_each_use_its_own_instantiation() {
        // let id = \x -> x in (id 1, id "a")
        let id_def = Expr::Define {
            id: NodeId::new(10),
            span: Span::new(0, 1),
            target: Box::new(name(0, (0, 1), "id")),
            value: Box::new(Expr::Function {
                id: NodeId::new(1),
                span: Span::new(0, 1),
                param: Box::new(name(2, (0, 1), "x")),
                body: Box::new(name(3, (0, 1), "x")),
            }),
            body: Some(Box::new(Expr::Vector(
                NodeId::new(20),
                Span::new(0, 1),
                VectorKind::Tuple,
                vec![
                    Expr::FuncCall {
                        id: NodeId::new(11),
                        span: Span::new(0, 1),
                        caller: Box::new(name(12, (0, 1), "id")),
                        callee: Box::new(Expr::Scalar(
                            NodeId::new(13),
                            Span::new(0, 1),
                            Literal::Int(1),
                        )),
                    },
                    Expr::FuncCall {
                        id: NodeId::new(14),
                        span: Span::new(0, 1),
                        caller: Box::new(name(15, (0, 1), "id")),
                        callee: Box::new(Expr::Scalar(
                            NodeId::new(16),
                            Span::new(0, 1),
                            Literal::String("a".into()),
                        )),
                    },
                ],
            ))),
        };
        let table = infer(&id_def).expect("this program type-checks");
        assert_eq!(table.type_of(NodeId::new(20)), &Type::tuple(vec![Type::int(), Type::string()]));
    }

    #[test]
    fn float_operands_type_check_through_an_arithmetic_operator() {
        // 1.5 + 2.5
        let left = Expr::Scalar(NodeId::new(1), Span::new(0, 3), Literal::Float(1.5));
        let right = Expr::Scalar(NodeId::new(2), Span::new(6, 9), Literal::Float(2.5));
        let plus_caller = Expr::FuncCall {
            id: NodeId::new(3),
            span: Span::new(0, 3),
            caller: Box::new(name(4, (0, 1), "+")),
            callee: Box::new(left),
        };
        let call = Expr::FuncCall {
            id: NodeId::new(5),
            span: Span::new(0, 9),
            caller: Box::new(plus_caller),
            callee: Box::new(right),
        };
        let table = infer(&call).expect("float operands unify with the generalized operator scheme");
        assert_eq!(table.type_of(NodeId::new(5)), &Type::float());
    }

    #[test]
    fn string_operand_to_an_arithmetic_operator_is_rejected() {
        // "a" + "b"
        let left = Expr::Scalar(NodeId::new(1), Span::new(0, 3), Literal::String("a".into()));
        let right = Expr::Scalar(NodeId::new(2), Span::new(6, 9), Literal::String("b".into()));
        let plus_caller = Expr::FuncCall {
            id: NodeId::new(3),
            span: Span::new(0, 3),
            caller: Box::new(name(4, (0, 1), "+")),
            callee: Box::new(left),
        };
        let call = Expr::FuncCall {
            id: NodeId::new(5),
            span: Span::new(0, 9),
            caller: Box::new(plus_caller),
            callee: Box::new(right),
        };
        assert!(matches!(infer(&call), Err(InferError::NonNumericOperand { .. })));
    }
}
