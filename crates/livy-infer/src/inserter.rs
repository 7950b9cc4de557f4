use livy_ast::{Expr, VectorKind};
use livy_types::{Type, TypeVarGen};

use crate::type_table::TypeTable;

/// Walks the surface AST and assigns every node a fresh `TypeVar` as its
/// initial type (`spec.md` §4.4.1).
pub fn insert_fresh_vars(expr: &Expr, gen: &mut TypeVarGen, table: &mut TypeTable) {
    match expr {
        Expr::Scalar(id, ..) | Expr::Name(id, ..) => table.insert(*id, gen.fresh()),

        Expr::Vector(id, _, kind, elements) => {
            for element in elements {
                insert_fresh_vars(element, gen, table);
            }
            let ty = match kind {
                VectorKind::List => Type::GenericType("List".into(), vec![gen.fresh()]),
                VectorKind::Tuple => gen.fresh(),
            };
            table.insert(*id, ty);
        }

        Expr::Cond { id, pred, cons, else_, .. } => {
            insert_fresh_vars(pred, gen, table);
            insert_fresh_vars(cons, gen, table);
            insert_fresh_vars(else_, gen, table);
            table.insert(*id, gen.fresh());
        }

        Expr::Function { id, param, body, .. } => {
            insert_fresh_vars(param, gen, table);
            insert_fresh_vars(body, gen, table);
            // Two new fresh vars, independent of param/body's own entries —
            // the equation generator later unifies this shell against the
            // actual `FuncType(param.type_, body.type_)`.
            table.insert(*id, Type::func(gen.fresh(), gen.fresh()));
        }

        Expr::FuncCall { id, caller, callee, .. } => {
            insert_fresh_vars(caller, gen, table);
            insert_fresh_vars(callee, gen, table);
            table.insert(*id, gen.fresh());
        }

        Expr::Define { id, target, value, body, .. } => {
            insert_fresh_vars(target, gen, table);
            insert_fresh_vars(value, gen, table);
            if let Some(body) = body {
                insert_fresh_vars(body, gen, table);
            }
            table.insert(*id, gen.fresh());
        }

        Expr::Block(id, _, elements) => {
            for element in elements {
                insert_fresh_vars(element, gen, table);
            }
            table.insert(*id, gen.fresh());
        }
    }
}

#[cfg(test)]
mod tests {
    use livy_ast::{Literal, NodeId};
    use livy_source::Span;

    use super::*;

    #[test]
    fn every_node_receives_a_type() {
        let expr = Expr::Scalar(NodeId::new(0), Span::new(0, 1), Literal::Int(1));
        let mut gen = TypeVarGen::new();
        let mut table = TypeTable::new();
        insert_fresh_vars(&expr, &mut gen, &mut table);
        assert!(table.get(NodeId::new(0)).is_some());
    }

    #[test]
    fn function_gets_an_independent_func_type_shell() {
        let param = Expr::Name(NodeId::new(0), Span::new(0, 1), "x".into(), None);
        let body = Expr::Name(NodeId::new(1), Span::new(5, 6), "x".into(), None);
        let func = Expr::Function {
            id: NodeId::new(2),
            span: Span::new(0, 6),
            param: Box::new(param),
            body: Box::new(body),
        };
        let mut gen = TypeVarGen::new();
        let mut table = TypeTable::new();
        insert_fresh_vars(&func, &mut gen, &mut table);
        assert!(matches!(table.get(NodeId::new(2)), Some(Type::FuncType(..))));
    }
}
