use livy_types::{unify, Substitution, TypeVarGen};

use crate::equation::Equation;
use crate::error::InferError;

/// Folds `unify` across the equation list in program order, composing
/// substitutions as it goes, then closes the result under itself
/// (`spec.md` §4.4.3 "Solve").
pub fn solve(equations: &[Equation], gen: &mut TypeVarGen) -> Result<Substitution, InferError> {
    let mut substitution = Substitution::empty();
    for equation in equations {
        let left = substitution.apply(&equation.left);
        let right = substitution.apply(&equation.right);
        let step =
            unify(&left, &right, gen).map_err(|err| InferError::from_unify(err, equation.span))?;
        substitution = step
            .compose(&substitution, gen)
            .map_err(|err| InferError::from_unify(err, equation.span))?;
    }
    Ok(substitution.close())
}
