//! Hindley-Milner type terms, substitutions, and generalization
//! (`spec.md` §3.2, §4.4.4).
//!
//! Type terms here carry no source span: a type-mismatch error reports the
//! spans of the two AST nodes whose equation produced the failing unification
//! (tracked by the caller in `livy-infer`), not a span reconstructed from the
//! type term itself — a term can be built, substituted into, and compared
//! many times over the course of solving, and threading a span through every
//! one of those operations buys nothing a node-level span doesn't already
//! give the error reporter.

mod scheme;
mod substitution;
mod ty;
mod var_gen;

pub use scheme::{free_vars, generalize, instantiate};
pub use substitution::{unify, Substitution, UnifyError};
pub use ty::{Type, TypeVarId};
pub use var_gen::TypeVarGen;
