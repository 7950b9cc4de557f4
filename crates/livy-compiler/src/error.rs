//! Aggregates the per-phase error types that can escape [`crate::compile`].

use thiserror::Error;

/// A failure from any phase of the pipeline that can actually fail
/// (`livy-lower`'s passes and `livy-codegen`'s generator are total — see
/// their module docs — so they contribute no variant here).
#[derive(Debug, Error, Clone)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] livy_syntax::LexError),

    #[error(transparent)]
    Parse(#[from] livy_syntax::ParseError),

    #[error(transparent)]
    Infer(#[from] livy_infer::InferError),
}
