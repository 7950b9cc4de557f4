//! Livy CLI
//!
//! Command-line driver for the Livy compiler: reads a `.livy` file, runs it
//! through `livy-compiler`, and either prints a rendered intermediate form
//! (`--lex`/`--ast`/`--types`) or writes assembled bytecode to stdout.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use livy_compiler::{compile, CompileConfig, Outcome, Phase};

/// The Livy programming language compiler
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None, disable_help_flag = true)]
struct Args {
    /// Input file to compile
    #[clap(value_parser)]
    input: PathBuf,

    /// Stop after lexing and print the token stream
    #[clap(long)]
    lex: bool,

    /// Stop after parsing and print the surface AST
    #[clap(long)]
    ast: bool,

    /// Stop after type inference and print the type table
    #[clap(long)]
    types: bool,

    /// Topologically sort top-level definitions before inference
    #[clap(long = "sort-defs")]
    sort_defs: bool,

    /// Run-length compress the assembled byte layout
    #[clap(long)]
    compress: bool,

    /// Maximum inliner depth (0 disables inlining)
    #[clap(long = "expansion-level", default_value_t = 0)]
    expansion_level: usize,

    /// Encoding name recorded in the bytecode header
    #[clap(short = 'e', long, default_value = "utf-8")]
    encoding: String,

    /// Print help information
    #[clap(short = '?', long = "help", action = clap::ArgAction::Help)]
    help: Option<bool>,
}

impl Args {
    fn halt_after(&self) -> Option<Phase> {
        if self.lex {
            Some(Phase::Lex)
        } else if self.ast {
            Some(Phase::Ast)
        } else if self.types {
            Some(Phase::Types)
        } else {
            None
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let config = CompileConfig {
        sort_defs: args.sort_defs,
        compress: args.compress,
        expansion_level: args.expansion_level,
        encoding: args.encoding.clone(),
        lib_mode: false,
        halt_after: args.halt_after(),
    };

    match compile(&source, &config).with_context(|| format!("compiling {}", args.input.display()))? {
        Outcome::Halted(halt) => {
            println!("{}", halt.rendered());
        }
        Outcome::Compiled(bytes) => {
            std::io::stdout().write_all(&bytes).context("writing bytecode to stdout")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_required() {
        assert!(Args::try_parse_from(["livy"]).is_err());
    }

    #[test]
    fn bare_input_halts_nowhere_and_defaults_encoding_to_utf8() {
        let args = Args::try_parse_from(["livy", "program.livy"]).unwrap();
        assert_eq!(args.input, PathBuf::from("program.livy"));
        assert_eq!(args.halt_after(), None);
        assert_eq!(args.encoding, "utf-8");
        assert_eq!(args.expansion_level, 0);
    }

    #[test]
    fn lex_flag_halts_after_lexing() {
        let args = Args::try_parse_from(["livy", "--lex", "program.livy"]).unwrap();
        assert_eq!(args.halt_after(), Some(Phase::Lex));
    }

    #[test]
    fn lex_takes_precedence_when_multiple_halt_flags_are_given() {
        let args = Args::try_parse_from(["livy", "--lex", "--ast", "--types", "program.livy"]).unwrap();
        assert_eq!(args.halt_after(), Some(Phase::Lex));
    }

    #[test]
    fn short_encoding_flag_is_accepted() {
        let args = Args::try_parse_from(["livy", "-e", "iso8859-1", "program.livy"]).unwrap();
        assert_eq!(args.encoding, "iso8859-1");
    }

    #[test]
    fn expansion_level_and_compress_and_sort_defs_parse() {
        let args =
            Args::try_parse_from(["livy", "--expansion-level", "5", "--compress", "--sort-defs", "program.livy"])
                .unwrap();
        assert_eq!(args.expansion_level, 5);
        assert!(args.compress);
        assert!(args.sort_defs);
    }

    #[test]
    fn unreadable_input_file_is_reported_as_an_error() {
        let args = Args::try_parse_from(["livy", "/nonexistent/path/does-not-exist.livy"]).unwrap();
        assert!(run(&args).is_err());
    }
}
