use std::fmt;

/// A globally unique type-variable identifier, minted from a monotonic
/// counter (`spec.md` §3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(u32);

impl TypeVarId {
    #[must_use]
    pub const fn new(raw: u32) -> Self { Self(raw) }

    #[must_use]
    pub const fn raw(self) -> u32 { self.0 }
}

impl fmt::Display for TypeVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "t{}", self.0) }
}

/// A Hindley-Milner type term (`spec.md` §3.2).
///
/// Four variants, exactly as specified:
/// - [`Type::TypeVar`] — a yet-unresolved unification variable.
/// - [`Type::GenericType`] — a named constructor applied to argument types;
///   `List` and `Tuple` are the distinguished constructors with special
///   status in the inferer.
/// - [`Type::FuncType`] — a function type, right-associative for
///   multi-argument functions (mirroring AST currying).
/// - [`Type::TypeScheme`] — universal quantification; never nested inside
///   another `TypeScheme`, `GenericType`, or `FuncType` (invariant 2).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    TypeVar(TypeVarId),
    GenericType(String, Vec<Type>),
    FuncType(Box<Type>, Box<Type>),
    TypeScheme(Box<Type>, Vec<TypeVarId>),
}

impl Type {
    #[must_use]
    pub fn nullary(name: impl Into<String>) -> Self { Self::GenericType(name.into(), Vec::new()) }

    #[must_use]
    pub fn bool() -> Self { Self::nullary("Bool") }

    #[must_use]
    pub fn int() -> Self { Self::nullary("Int") }

    #[must_use]
    pub fn float() -> Self { Self::nullary("Float") }

    #[must_use]
    pub fn string() -> Self { Self::nullary("String") }

    #[must_use]
    pub fn unit() -> Self { Self::nullary("Unit") }

    #[must_use]
    pub fn list(elem: Self) -> Self { Self::GenericType("List".into(), vec![elem]) }

    #[must_use]
    pub fn tuple(elems: Vec<Self>) -> Self {
        if elems.is_empty() { Self::unit() } else { Self::GenericType("Tuple".into(), elems) }
    }

    #[must_use]
    pub fn func(param: Self, result: Self) -> Self {
        Self::FuncType(Box::new(param), Box::new(result))
    }

    /// `true` for the built-in nullary constructors a `Scalar` can equate
    /// with (`spec.md` §4.4.2).
    #[must_use]
    pub fn is_scalar_constructor(name: &str) -> bool {
        matches!(name, "Bool" | "Int" | "Float" | "String")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeVar(id) => write!(f, "{id}"),
            Self::GenericType(base, args) if args.is_empty() => write!(f, "{base}"),
            Self::GenericType(base, args) => {
                write!(f, "{base}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Self::FuncType(left, right) => write!(f, "({left} -> {right})"),
            Self::TypeScheme(inner, vars) => {
                write!(f, "forall")?;
                for v in vars {
                    write!(f, " {v}")?;
                }
                write!(f, ". {inner}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullary_constructors_have_no_args() {
        assert_eq!(Type::int(), Type::GenericType("Int".into(), Vec::new()));
    }

    #[test]
    fn tuple_of_no_elements_is_unit() {
        assert_eq!(Type::tuple(Vec::new()), Type::unit());
    }

    #[test]
    fn display_renders_function_types_with_arrow() {
        assert_eq!(Type::func(Type::int(), Type::bool()).to_string(), "(Int -> Bool)");
    }
}
