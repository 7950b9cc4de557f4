use livy_ast::{Expr, VectorKind};
use livy_source::Span;
use livy_types::{generalize, instantiate, Type, TypeVarGen};

use crate::error::InferError;
use crate::scope::Scope;
use crate::type_table::TypeTable;

/// A type equation `(left, right)` the solver must unify, plus the span of
/// the expression that produced it (used to locate a unification failure).
#[derive(Debug, Clone)]
pub struct Equation {
    pub left: Type,
    pub right: Type,
    pub span: Span,
}

/// Walks the type-var-annotated tree and accumulates the flat equation list
/// (`spec.md` §4.4.2).
pub fn generate(
    expr: &Expr,
    scope: &mut Scope,
    table: &mut TypeTable,
    gen: &mut TypeVarGen,
    equations: &mut Vec<Equation>,
) -> Result<(), InferError> {
    match expr {
        Expr::Scalar(id, span, literal) => {
            equations.push(Equation {
                left: table.type_of(*id).clone(),
                right: Type::nullary(literal.type_name()),
                span: *span,
            });
        }

        Expr::Name(id, span, name, _annotation) => {
            let bound = scope
                .lookup(name)
                .cloned()
                .ok_or_else(|| InferError::UnboundName { name: name.clone(), span: *span })?;
            // Instantiate at the use site (standard Algorithm W) rather than
            // deferring to `unify`'s own instantiation: that guarantees two
            // distinct uses of a generalized binding get distinct fresh
            // variables regardless of solve order (`spec.md` testable
            // property 4, "Generalization isolation").
            let instantiated = instantiate(&bound, gen);
            equations.push(Equation { left: table.type_of(*id).clone(), right: instantiated, span: *span });
        }

        Expr::Vector(id, span, VectorKind::Tuple, elements) => {
            let mut arg_types = Vec::with_capacity(elements.len());
            for element in elements {
                generate(element, scope, table, gen, equations)?;
                arg_types.push(table.type_of(element.id()).clone());
            }
            equations.push(Equation { left: table.type_of(*id).clone(), right: Type::tuple(arg_types), span: *span });
        }

        Expr::Vector(id, span, VectorKind::List, elements) => {
            let elem_type = gen.fresh();
            for element in elements {
                generate(element, scope, table, gen, equations)?;
                equations.push(Equation {
                    left: table.type_of(element.id()).clone(),
                    right: elem_type.clone(),
                    span: element.span(),
                });
            }
            let actual = Type::GenericType("List".into(), vec![elem_type]);
            equations.push(Equation { left: table.type_of(*id).clone(), right: actual, span: *span });
        }

        Expr::Cond { id, span, pred, cons, else_ } => {
            generate(pred, scope, table, gen, equations)?;
            generate(cons, scope, table, gen, equations)?;
            generate(else_, scope, table, gen, equations)?;
            equations.push(Equation { left: table.type_of(pred.id()).clone(), right: Type::bool(), span: pred.span() });
            equations.push(Equation {
                left: table.type_of(*id).clone(),
                right: table.type_of(cons.id()).clone(),
                span: *span,
            });
            equations.push(Equation {
                left: table.type_of(*id).clone(),
                right: table.type_of(else_.id()).clone(),
                span: *span,
            });
        }

        Expr::Function { id, span, param, body } => {
            let Expr::Name(_, _, param_name, _) = param.as_ref() else {
                unreachable!("a Function's param is always a Name node");
            };
            scope.push();
            scope.insert(param_name.clone(), table.type_of(param.id()).clone());
            generate(body, scope, table, gen, equations)?;
            scope.pop();
            let actual =
                Type::func(table.type_of(param.id()).clone(), table.type_of(body.id()).clone());
            equations.push(Equation { left: table.type_of(*id).clone(), right: actual, span: *span });
        }

        Expr::FuncCall { id, span, caller, callee } => {
            generate(caller, scope, table, gen, equations)?;
            generate(callee, scope, table, gen, equations)?;
            let actual = Type::func(table.type_of(callee.id()).clone(), table.type_of(*id).clone());
            equations.push(Equation { left: table.type_of(caller.id()).clone(), right: actual, span: *span });
        }

        Expr::Block(id, span, elements) => {
            scope.push();
            let mut last_id = None;
            for element in elements {
                generate(element, scope, table, gen, equations)?;
                last_id = Some(element.id());
            }
            let last_id = last_id.expect("a Block's body is non-empty (invariant 4)");
            equations.push(Equation { left: table.type_of(*id).clone(), right: table.type_of(last_id).clone(), span: *span });
            scope.pop();
        }

        Expr::Define { id, span, target, value, body } => {
            let Expr::Name(_, _, target_name, _) = target.as_ref() else {
                unreachable!("a Define's target is always a Name node");
            };

            // Same-scope redefinition conflict is checked against whatever
            // was bound in this frame *before* this Define runs.
            let prior = scope
                .bound_in_current_frame(target_name)
                .then(|| scope.lookup(target_name).expect("just checked").clone());

            if body.is_some() {
                scope.push();
            }
            // Bind the target's own (not yet generalized) type variable
            // before visiting its value, so a self-recursive definition
            // (`let fact = \n -> ... fact ...`) resolves — per the Cyclic
            // definitions design note, the inferer inserts names with fresh
            // vars before inferring the values that may reference them, not
            // only for sorter-detected SCC groups.
            scope.insert(target_name.clone(), table.type_of(target.id()).clone());

            generate(value, scope, table, gen, equations)?;
            let generalized = generalize(table.type_of(value.id()).clone());
            table.insert(value.id(), generalized.clone());
            scope.insert(target_name.clone(), generalized.clone());

            equations.push(Equation {
                left: table.type_of(*id).clone(),
                right: generalized,
                span: *span,
            });
            equations.push(Equation {
                left: table.type_of(*id).clone(),
                right: table.type_of(target.id()).clone(),
                span: *span,
            });
            if let Some(prior) = prior {
                equations.push(Equation { left: table.type_of(target.id()).clone(), right: prior, span: *span });
            }

            if let Some(body) = body {
                generate(body, scope, table, gen, equations)?;
                scope.pop();
            }
        }
    }
    Ok(())
}
