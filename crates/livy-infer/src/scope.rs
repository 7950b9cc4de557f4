use rustc_hash::FxHashMap;
use livy_types::{Type, TypeVarId};

/// A lexically nested environment mapping names to type terms
/// (`spec.md` §3.4).
///
/// Represented as an owned stack of frames rather than parent-linked borrows:
/// ownership here really is strictly nested ("each child scope borrows its
/// parent for the duration of its lifetime", `spec.md` §9), and a `Vec` of
/// frames gives that for free without fighting the borrow checker over a
/// self-referential tree of `&Scope`s.
#[derive(Debug, Clone)]
pub struct Scope {
    frames: Vec<FxHashMap<String, Type>>,
}

impl Scope {
    /// A scope with the built-in operator types pre-bound (`spec.md` §3.4).
    #[must_use]
    pub fn root() -> Self { Self { frames: vec![default_operator_types()] } }

    pub fn push(&mut self) { self.frames.push(FxHashMap::default()); }

    /// ## Panics
    ///
    /// Panics if called on the root frame (unbalanced push/pop is a bug in
    /// the caller, never a user-facing error).
    pub fn pop(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the root scope");
        drop(self.frames.pop());
    }

    /// Depth of the currently innermost frame, counted from the module scope
    /// at depth 0.
    #[must_use]
    pub fn depth(&self) -> usize { self.frames.len() - 1 }

    pub fn insert(&mut self, name: impl Into<String>, ty: Type) {
        let frame = self.frames.last_mut().expect("scope always has at least one frame");
        drop(frame.insert(name.into(), ty));
    }

    /// Looks up `name`, walking outward through enclosing frames.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// `true` if `name` is bound in the innermost frame specifically (used
    /// by `Define` to detect same-scope redefinition, `spec.md` §4.4.2).
    #[must_use]
    pub fn bound_in_current_frame(&self, name: &str) -> bool {
        self.frames.last().expect("scope always has at least one frame").contains_key(name)
    }
}

/// Arithmetic operators: one operand type, shared between both operands and
/// the result (`spec.md` §3.4).
pub(crate) const ARITHMETIC_OPERATORS: [&str; 6] = ["+", "-", "*", "/", "^", "%"];

/// Comparison operators: one operand type, shared between both operands, a
/// `Bool` result.
pub(crate) const COMPARISON_OPERATORS: [&str; 2] = ["<", ">"];

/// Unary negation: one operand type, same as the result.
pub(crate) const UNARY_NUMERIC_OPERATORS: [&str; 1] = ["~"];

/// `true` for any operator `spec.md` §3.4 restricts to numeric operands
/// (`Int` or `Float`) — everything in [`ARITHMETIC_OPERATORS`],
/// [`COMPARISON_OPERATORS`], and [`UNARY_NUMERIC_OPERATORS`].
#[must_use]
pub(crate) fn is_numeric_operator(name: &str) -> bool {
    ARITHMETIC_OPERATORS.contains(&name)
        || COMPARISON_OPERATORS.contains(&name)
        || UNARY_NUMERIC_OPERATORS.contains(&name)
}

/// This language has no type classes, so operators cannot be given a truly
/// polymorphic numeric type. `spec.md` §3.4 describes them as "generalized...
/// with appropriate class-free restriction: operators accept only numeric
/// types, and the inferer enforces this by directly unifying with
/// `Int`/`Float` where applicable". We resolve that in two parts: each
/// arithmetic/comparison/negation operator is generalized over a single
/// operand type variable the same way `=` is generalized over any type (so
/// `1 + 2` and `1.5 + 2.5` both unify), and a separate post-solve pass
/// (`numeric_check`) rejects any instantiation of that variable that isn't
/// `Int` or `Float` — ordinary unification alone can't express that
/// restriction since it would otherwise accept any shared type, `String`
/// included.
fn default_operator_types() -> FxHashMap<String, Type> {
    let mut scope = FxHashMap::default();

    for op in ARITHMETIC_OPERATORS {
        let a = TypeVarId::new(0);
        let scheme = Type::TypeScheme(
            Box::new(Type::func(Type::TypeVar(a), Type::func(Type::TypeVar(a), Type::TypeVar(a)))),
            vec![a],
        );
        drop(scope.insert(op.to_string(), scheme));
    }
    for op in COMPARISON_OPERATORS {
        let a = TypeVarId::new(0);
        let scheme = Type::TypeScheme(
            Box::new(Type::func(Type::TypeVar(a), Type::func(Type::TypeVar(a), Type::bool()))),
            vec![a],
        );
        drop(scope.insert(op.to_string(), scheme));
    }
    for op in UNARY_NUMERIC_OPERATORS {
        let a = TypeVarId::new(0);
        let scheme = Type::TypeScheme(Box::new(Type::func(Type::TypeVar(a), Type::TypeVar(a))), vec![a]);
        drop(scope.insert(op.to_string(), scheme));
    }

    drop(scope.insert(
        "<>".to_string(),
        Type::func(Type::string(), Type::func(Type::string(), Type::string())),
    ));
    let a = TypeVarId::new(0);
    drop(scope.insert(
        "=".to_string(),
        Type::TypeScheme(
            Box::new(Type::func(Type::TypeVar(a), Type::func(Type::TypeVar(a), Type::bool()))),
            vec![a],
        ),
    ));
    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward_through_frames() {
        let mut scope = Scope::root();
        scope.push();
        scope.insert("x", Type::int());
        assert_eq!(scope.lookup("x"), Some(&Type::int()));
        assert_eq!(scope.lookup("+"), Some(&default_operator_types()["+"]));
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let mut scope = Scope::root();
        scope.insert("x", Type::int());
        scope.push();
        scope.insert("x", Type::bool());
        assert_eq!(scope.lookup("x"), Some(&Type::bool()));
    }

    #[test]
    fn bound_in_current_frame_ignores_outer_bindings() {
        let mut scope = Scope::root();
        scope.insert("x", Type::int());
        scope.push();
        assert!(!scope.bound_in_current_frame("x"));
        scope.insert("x", Type::bool());
        assert!(scope.bound_in_current_frame("x"));
    }

    #[test]
    fn depth_increases_on_push() {
        let mut scope = Scope::root();
        assert_eq!(scope.depth(), 0);
        scope.push();
        assert_eq!(scope.depth(), 1);
    }
}
