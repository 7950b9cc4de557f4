use rustc_hash::FxHashSet;

use crate::substitution::Substitution;
use crate::ty::{Type, TypeVarId};
use crate::var_gen::TypeVarGen;

/// Every `TypeVar` reachable in `ty`, except those bound by an enclosing
/// `TypeScheme` (`spec.md` §4.4.4).
#[must_use]
pub fn free_vars(ty: &Type) -> FxHashSet<TypeVarId> {
    let mut found = FxHashSet::default();
    collect_free_vars(ty, &mut found);
    found
}

fn collect_free_vars(ty: &Type, found: &mut FxHashSet<TypeVarId>) {
    match ty {
        Type::TypeVar(id) => {
            drop(found.insert(*id));
        }
        Type::GenericType(_, args) => {
            for arg in args {
                collect_free_vars(arg, found);
            }
        }
        Type::FuncType(left, right) => {
            collect_free_vars(left, found);
            collect_free_vars(right, found);
        }
        Type::TypeScheme(inner, bound) => {
            let mut inner_free = FxHashSet::default();
            collect_free_vars(inner, &mut inner_free);
            found.extend(inner_free.into_iter().filter(|v| !bound.contains(v)));
        }
    }
}

/// Wraps `ty` in a `TypeScheme` over its free variables, unless it has none
/// (`spec.md` §4.4.4). Nested schemes are flattened into one scheme over the
/// union of bound variables (invariant 2: a scheme never nests another).
#[must_use]
pub fn generalize(ty: Type) -> Type {
    let (inner, mut bound): (Type, FxHashSet<TypeVarId>) = match ty {
        Type::TypeScheme(inner, bound) => (*inner, bound.into_iter().collect()),
        other => (other, FxHashSet::default()),
    };
    bound.extend(free_vars(&inner));
    if bound.is_empty() {
        inner
    } else {
        let mut vars: Vec<TypeVarId> = bound.into_iter().collect();
        vars.sort_unstable();
        Type::TypeScheme(Box::new(inner), vars)
    }
}

/// If `ty` is a `TypeScheme`, produces a fresh variable for each bound
/// variable and substitutes; otherwise returns `ty` unchanged
/// (`spec.md` §4.4.4).
#[must_use]
pub fn instantiate(ty: &Type, gen: &mut TypeVarGen) -> Type {
    match ty {
        Type::TypeScheme(inner, bound) => {
            let sub: Substitution = bound.iter().map(|v| (*v, gen.fresh())).collect();
            sub.apply(inner)
        }
        other => other.clone(),
    }
}
