//! The tagged early-exit value (`spec.md` §9 "Error-as-control-flow"): a
//! phase that is asked to stop returns a rendered form of its own output
//! rather than the pipeline raising and catching a sentinel exception.

/// A rendered intermediate form, produced when [`crate::CompileConfig::halt_after`]
/// names the phase that just ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    /// The token stream, after EOL inference (`--lex`).
    Tokens(String),
    /// The surface AST, before any lowering pass runs (`--ast`).
    Ast(String),
    /// The type table produced by inference (`--types`).
    Types(String),
}

impl Halt {
    /// The rendered text this halt carries, regardless of which phase
    /// produced it.
    #[must_use]
    pub fn rendered(&self) -> &str {
        match self {
            Self::Tokens(s) | Self::Ast(s) | Self::Types(s) => s,
        }
    }
}
