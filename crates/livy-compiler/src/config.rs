//! Compilation settings (`spec.md` §5, §6.1).

/// The phase to stop after, when the driver only wants an intermediate
/// form rather than assembled bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Stop right after tokenizing (`--lex`).
    Lex,
    /// Stop right after parsing, before any lowering pass runs (`--ast`).
    Ast,
    /// Stop right after type inference (`--types`).
    Types,
}

/// Everything [`crate::compile`] needs besides the source text itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileConfig {
    /// Topologically sort top-level `let` definitions before inference
    /// (`spec.md` §4.3). Order-independent programs compile either way;
    /// this only matters for definitions that reference later siblings.
    pub sort_defs: bool,
    /// Run-length compress the assembled byte layout (`spec.md` §4.9).
    pub compress: bool,
    /// Upper bound on the inliner's node-count budget (`spec.md` §4.7).
    pub expansion_level: usize,
    /// Name recorded in the header's `E:` field (`spec.md` §4.9).
    pub encoding: String,
    /// Sets the header's library-mode bit (`spec.md` §4.9).
    pub lib_mode: bool,
    /// Stop after this phase instead of running the pipeline to
    /// completion (`spec.md` §6.1's `--lex`/`--ast`/`--types` flags).
    pub halt_after: Option<Phase>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            sort_defs: false,
            compress: false,
            expansion_level: 0,
            encoding: "utf-8".to_string(),
            lib_mode: false,
            halt_after: None,
        }
    }
}
