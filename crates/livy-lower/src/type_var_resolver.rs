//! Type-annotation canonicalization (`spec.md` §4.2).
//!
//! Does not perform inference: it only decides which textually identical
//! annotation names, within the same annotation scope, refer to the same
//! type variable. A new annotation scope opens at each `Function` — the
//! common rank-1 convention of scoping a signature's type variables to that
//! signature alone.

use livy_ast::{Expr, NodeId, TypeAnnotation};
use livy_types::TypeVarGen;
use rustc_hash::FxHashMap;

/// Maps each annotated `Name` occurrence to the canonical [`livy_types::TypeVarId`]
/// its annotation resolved to.
pub type AnnotationTable = FxHashMap<NodeId, livy_types::TypeVarId>;

/// Walks `expr`, assigning a fresh variable to each distinct annotation name
/// per scope and recording it for every occurrence.
#[must_use]
pub fn resolve(expr: &Expr, gen: &mut TypeVarGen) -> AnnotationTable {
    log::debug!("type-variable resolver: walking tree");
    let mut table = AnnotationTable::default();
    let mut scopes: Vec<FxHashMap<String, livy_types::TypeVarId>> = vec![FxHashMap::default()];
    walk(expr, gen, &mut scopes, &mut table);
    log::debug!("type-variable resolver: resolved {} annotation occurrences", table.len());
    table
}

fn walk(
    expr: &Expr,
    gen: &mut TypeVarGen,
    scopes: &mut Vec<FxHashMap<String, livy_types::TypeVarId>>,
    table: &mut AnnotationTable,
) {
    match expr {
        Expr::Name(id, _, _, Some(annotation)) => {
            resolve_annotation(annotation, *id, gen, scopes.last_mut().expect("root scope always present"), table);
        }
        Expr::Name(..) | Expr::Scalar(..) => {}

        Expr::Vector(_, _, _, elements) => {
            for element in elements {
                walk(element, gen, scopes, table);
            }
        }

        Expr::Cond { pred, cons, else_, .. } => {
            walk(pred, gen, scopes, table);
            walk(cons, gen, scopes, table);
            walk(else_, gen, scopes, table);
        }

        Expr::Function { param, body, .. } => {
            scopes.push(FxHashMap::default());
            walk(param, gen, scopes, table);
            walk(body, gen, scopes, table);
            scopes.pop();
        }

        Expr::FuncCall { caller, callee, .. } => {
            walk(caller, gen, scopes, table);
            walk(callee, gen, scopes, table);
        }

        Expr::Define { target, value, body, .. } => {
            walk(target, gen, scopes, table);
            walk(value, gen, scopes, table);
            if let Some(body) = body {
                walk(body, gen, scopes, table);
            }
        }

        Expr::Block(_, _, elements) => {
            for element in elements {
                walk(element, gen, scopes, table);
            }
        }
    }
}

/// Only the top-level `Var` name of an annotation introduces/looks up a
/// variable; nested `Con` arguments are walked for any `Var`s they embed.
fn resolve_annotation(
    annotation: &TypeAnnotation,
    id: NodeId,
    gen: &mut TypeVarGen,
    scope: &mut FxHashMap<String, livy_types::TypeVarId>,
    table: &mut AnnotationTable,
) {
    match annotation {
        TypeAnnotation::Var(name) => {
            let var_id = *scope.entry(name.clone()).or_insert_with(|| gen.fresh_id());
            table.insert(id, var_id);
        }
        TypeAnnotation::Con(_, args) => {
            for arg in args {
                resolve_annotation(arg, id, gen, scope, table);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use livy_source::Span;

    use super::*;

    fn annotated_name(raw_id: u32, name: &str, annotation: TypeAnnotation) -> Expr {
        Expr::Name(NodeId::new(raw_id), Span::new(0, 1), name.into(), Some(annotation))
    }

    #[test]
    fn same_name_same_scope_shares_a_variable() {
        let a = annotated_name(0, "x", TypeAnnotation::Var("a".into()));
        let b = annotated_name(1, "y", TypeAnnotation::Var("a".into()));
        let block = Expr::Block(NodeId::new(2), Span::new(0, 1), vec![a, b]);
        let mut gen = TypeVarGen::new();
        let table = resolve(&block, &mut gen);
        assert_eq!(table.get(&NodeId::new(0)), table.get(&NodeId::new(1)));
    }

    #[test]
    fn different_function_scopes_get_distinct_variables() {
        let inner_param = annotated_name(0, "x", TypeAnnotation::Var("a".into()));
        let body = Expr::Name(NodeId::new(1), Span::new(0, 1), "x".into(), None);
        let f1 = Expr::Function {
            id: NodeId::new(2),
            span: Span::new(0, 1),
            param: Box::new(inner_param),
            body: Box::new(body),
        };
        let other_param = annotated_name(3, "y", TypeAnnotation::Var("a".into()));
        let other_body = Expr::Name(NodeId::new(4), Span::new(0, 1), "y".into(), None);
        let f2 = Expr::Function {
            id: NodeId::new(5),
            span: Span::new(0, 1),
            param: Box::new(other_param),
            body: Box::new(other_body),
        };
        let block = Expr::Block(NodeId::new(6), Span::new(0, 1), vec![f1, f2]);
        let mut gen = TypeVarGen::new();
        let table = resolve(&block, &mut gen);
        assert_ne!(table.get(&NodeId::new(0)), table.get(&NodeId::new(3)));
    }
}
