use livy_ast::Expr;
use livy_types::{generalize, Substitution};

use crate::type_table::TypeTable;

/// Replaces every node's type with its fully applied form, re-generalizing
/// at each `Define` and `Function` so the final table reflects the settled
/// schemes (`spec.md` §4.4.5).
pub fn substitute(expr: &Expr, substitution: &Substitution, table: &mut TypeTable) {
    let finalize = |table: &mut TypeTable, id: livy_ast::NodeId, generalized: bool| {
        let applied = substitution.apply(table.type_of(id));
        let applied = if generalized { generalize(applied) } else { applied };
        table.insert(id, applied);
    };

    match expr {
        Expr::Scalar(id, ..) | Expr::Name(id, ..) => finalize(table, *id, false),

        Expr::Vector(id, _, _, elements) => {
            for element in elements {
                substitute(element, substitution, table);
            }
            finalize(table, *id, false);
        }

        Expr::Cond { id, pred, cons, else_, .. } => {
            substitute(pred, substitution, table);
            substitute(cons, substitution, table);
            substitute(else_, substitution, table);
            finalize(table, *id, false);
        }

        Expr::Function { id, param, body, .. } => {
            substitute(param, substitution, table);
            substitute(body, substitution, table);
            finalize(table, *id, true);
        }

        Expr::FuncCall { id, caller, callee, .. } => {
            substitute(caller, substitution, table);
            substitute(callee, substitution, table);
            finalize(table, *id, false);
        }

        Expr::Define { id, target, value, body, .. } => {
            substitute(target, substitution, table);
            substitute(value, substitution, table);
            if let Some(body) = body {
                substitute(body, substitution, table);
            }
            finalize(table, *id, true);
        }

        Expr::Block(id, _, elements) => {
            for element in elements {
                substitute(element, substitution, table);
            }
            finalize(table, *id, false);
        }
    }
}
