//! Orchestrates the full Livy pipeline (`spec.md` §2 "Data flow"): source
//! text → tokens → surface AST → (string expansion, type-var resolution,
//! optional topological sort, inference) → typed AST → (simplify, fold,
//! inline) → lowered AST → instruction stream → assembled bytecode.
//!
//! [`compile`] is a pure function, not a stateful driver object — per
//! `spec.md` §9's "Error-as-control-flow" redesign note, each phase either
//! feeds the next or halts with a rendered value, rather than raising a
//! sentinel exception the way `hasdrubal/run.py`'s `_FakeMessageException`
//! does. Halting after a phase is a first-class outcome ([`Halt`]), not an
//! error: `spec.md` §6.1 lets the driver stop after lexing, parsing, or
//! inference to inspect an intermediate form.

mod config;
mod error;
mod halt;

pub use config::{CompileConfig, Phase};
pub use error::CompileError;
pub use halt::Halt;

use log::debug;

/// The result of a single [`compile`] call: either the assembled bytecode,
/// or a rendered intermediate form if `config` asked to halt early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Halted(Halt),
    Compiled(Vec<u8>),
}

/// Runs `source` through the full pipeline under `config`.
///
/// # Errors
///
/// Returns [`CompileError`] if lexing, parsing, or type inference fails.
/// Lowering and code generation are total (`livy-lower`'s five passes and
/// `livy-codegen`'s generator cannot fail) and so contribute no error
/// variant.
pub fn compile(source: &str, config: &CompileConfig) -> Result<Outcome, CompileError> {
    debug!("lexing");
    let tokens = livy_syntax::lex(source)?;
    if config.halt_after == Some(Phase::Lex) {
        return Ok(Outcome::Halted(Halt::Tokens(format!("{tokens:#?}"))));
    }

    debug!("parsing");
    let surface = livy_syntax::parse(source)?;
    if config.halt_after == Some(Phase::Ast) {
        return Ok(Outcome::Halted(Halt::Ast(format!("{surface:#?}"))));
    }

    debug!("string expansion");
    let expanded = livy_lower::expand_strings(&surface);

    debug!("type-variable resolution");
    let mut var_gen = livy_types::TypeVarGen::new();
    let _annotations = livy_lower::resolve(&expanded, &mut var_gen);

    let sorted = if config.sort_defs {
        debug!("sorting top-level definitions");
        livy_lower::sort_defines(&expanded)
    } else {
        expanded
    };

    debug!("type inference");
    let types = livy_infer::infer(&sorted)?;
    if config.halt_after == Some(Phase::Types) {
        return Ok(Outcome::Halted(Halt::Types(format!("{types:#?}"))));
    }

    debug!("simplifying");
    let lowered = livy_lower::lower(&sorted);

    debug!("constant folding");
    let folded = livy_lower::fold(&lowered);

    debug!("inline expansion (depth {})", config.expansion_level);
    let inlined = livy_lower::expand(&folded, config.expansion_level);

    debug!("generating instructions");
    let program = livy_codegen::InstructionGenerator::new().generate(&inlined);

    debug!("assembling bytecode (compress: {})", config.compress);
    let bytes = livy_codegen::assemble(&program, config.lib_mode, &config.encoding, config.compress);

    Ok(Outcome::Compiled(bytes))
}
