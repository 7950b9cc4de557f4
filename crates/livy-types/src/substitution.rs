use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::scheme::instantiate;
use crate::ty::{Type, TypeVarId};
use crate::var_gen::TypeVarGen;

/// A unification failure (`spec.md` §4.4.3). Carries no span: the caller
/// (the equation solver in `livy-infer`) knows which AST nodes produced the
/// two type terms and attaches that context when it turns this into a
/// user-facing diagnostic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnifyError {
    #[error("cannot unify `{0}` with `{1}`")]
    Mismatch(Type, Type),
    #[error("occurs check failed: `{0}` occurs in `{1}`")]
    Occurs(TypeVarId, Type),
}

/// A finite mapping from type-variable id to type term (`spec.md` §3.2). The
/// identity substitution is the empty map.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Substitution(FxHashMap<TypeVarId, Type>);

impl Substitution {
    #[must_use]
    pub fn empty() -> Self { Self(FxHashMap::default()) }

    #[must_use]
    pub fn singleton(id: TypeVarId, ty: Type) -> Self {
        let mut map = FxHashMap::default();
        drop(map.insert(id, ty));
        Self(map)
    }

    #[must_use]
    pub fn get(&self, id: TypeVarId) -> Option<&Type> { self.0.get(&id) }

    pub fn insert(&mut self, id: TypeVarId, ty: Type) { drop(self.0.insert(id, ty)); }

    /// Applies this substitution to `ty`, recursing into every constructor.
    /// `TypeScheme`-bound variables are never substituted (they are
    /// universally quantified, not free).
    #[must_use]
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::TypeVar(id) => self.0.get(id).map_or_else(|| ty.clone(), |t| self.apply(t)),
            Type::GenericType(base, args) => {
                Type::GenericType(base.clone(), args.iter().map(|a| self.apply(a)).collect())
            }
            Type::FuncType(left, right) => {
                Type::FuncType(Box::new(self.apply(left)), Box::new(self.apply(right)))
            }
            Type::TypeScheme(inner, bound) => {
                let pruned: Self = self
                    .0
                    .iter()
                    .filter(|(k, _)| !bound.contains(k))
                    .map(|(k, v)| (*k, v.clone()))
                    .collect();
                Type::TypeScheme(Box::new(pruned.apply(inner)), bound.clone())
            }
        }
    }

    /// Composes `self` after `other`: `self ∘ other` (`spec.md` §4.4.3). The
    /// result's domain is `dom(self) ∪ dom(other)`; a key present in both
    /// with differing values is resolved by unifying those values and
    /// folding the resulting substitution in.
    pub fn compose(&self, other: &Self, gen: &mut TypeVarGen) -> Result<Self, UnifyError> {
        let mut result = self.clone();
        for (id, ty) in &other.0 {
            let applied = self.apply(ty);
            match result.0.get(id) {
                Some(existing) if *existing != applied => {
                    let merged = unify(existing, &applied, gen)?;
                    result = merged.compose(&result, gen)?;
                }
                _ => {
                    result.0.insert(*id, applied);
                }
            }
        }
        Ok(result)
    }

    /// Closes this substitution under itself: repeatedly applies it to its
    /// own range until no range element mentions a variable still in the
    /// domain (`spec.md` §4.4.3 "Solve").
    #[must_use]
    pub fn close(&self) -> Self {
        let mut current = self.clone();
        loop {
            let next: FxHashMap<TypeVarId, Type> =
                current.0.iter().map(|(k, v)| (*k, current.apply(v))).collect();
            let next = Self(next);
            if next == current {
                return next;
            }
            current = next;
        }
    }
}

impl FromIterator<(TypeVarId, Type)> for Substitution {
    fn from_iter<T: IntoIterator<Item = (TypeVarId, Type)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn occurs(id: TypeVarId, ty: &Type) -> bool {
    match ty {
        Type::TypeVar(other) => *other == id,
        Type::GenericType(_, args) => args.iter().any(|a| occurs(id, a)),
        Type::FuncType(left, right) => occurs(id, left) || occurs(id, right),
        Type::TypeScheme(inner, bound) => !bound.contains(&id) && occurs(id, inner),
    }
}

fn bind(id: TypeVarId, ty: &Type) -> Result<Substitution, UnifyError> {
    if let Type::TypeVar(other) = ty {
        if *other == id {
            return Ok(Substitution::empty());
        }
    }
    if occurs(id, ty) {
        return Err(UnifyError::Occurs(id, ty.clone()));
    }
    Ok(Substitution::singleton(id, ty.clone()))
}

/// Unifies two type terms, producing the most general substitution making
/// them equal, or failing (`spec.md` §4.4.3). Either operand may be a
/// `TypeScheme`, in which case it is instantiated with fresh variables
/// (minted from `gen`) before the structural cases are tried.
pub fn unify(left: &Type, right: &Type, gen: &mut TypeVarGen) -> Result<Substitution, UnifyError> {
    let left = instantiate(left, gen);
    let right = instantiate(right, gen);

    match (&left, &right) {
        (Type::TypeVar(a), Type::TypeVar(b)) if a == b => Ok(Substitution::empty()),
        (Type::TypeVar(id), other) | (other, Type::TypeVar(id)) => bind(*id, other),
        (Type::GenericType(b1, a1), Type::GenericType(b2, a2)) => {
            if b1 != b2 || a1.len() != a2.len() {
                return Err(UnifyError::Mismatch(left.clone(), right.clone()));
            }
            let mut sub = Substitution::empty();
            for (x, y) in a1.iter().zip(a2.iter()) {
                let (x, y) = (sub.apply(x), sub.apply(y));
                let step = unify(&x, &y, gen)?;
                sub = step.compose(&sub, gen)?;
            }
            Ok(sub)
        }
        (Type::FuncType(l1, r1), Type::FuncType(l2, r2)) => {
            let s1 = unify(l1, l2, gen)?;
            let s2 = unify(&s1.apply(r1), &s1.apply(r2), gen)?;
            s2.compose(&s1, gen)
        }
        _ => Err(UnifyError::Mismatch(left.clone(), right.clone())),
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::{unify, Type, TypeVarGen};

    /// A small, bounded type-term generator: 3 shared variables and 2
    /// nullary constructors, recursing into `FuncType` so unification
    /// actually has to walk structure rather than stop at depth 1.
    fn arbitrary_type() -> impl Strategy<Value = Type> {
        let leaf = prop_oneof![
            (0u32..3).prop_map(|raw| Type::TypeVar(crate::ty::TypeVarId::new(raw))),
            Just(Type::int()),
            Just(Type::bool()),
        ];
        leaf.prop_recursive(4, 16, 2, |inner| {
            (inner.clone(), inner).prop_map(|(left, right)| Type::func(left, right))
        })
    }

    proptest! {
        /// Unification is sound: whenever it succeeds, the substitution it
        /// returns makes both operands equal (`spec.md` §4.4.3's
        /// defining property of a unifier).
        #[test]
        fn unify_makes_both_sides_equal_when_it_succeeds(
            left in arbitrary_type(),
            right in arbitrary_type(),
        ) {
            let mut gen = TypeVarGen::new();
            if let Ok(sub) = unify(&left, &right, &mut gen) {
                let closed = sub.close();
                prop_assert_eq!(closed.apply(&left), closed.apply(&right));
            }
        }
    }
}
