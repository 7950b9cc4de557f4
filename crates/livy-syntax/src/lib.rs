//! Lexer and parser turning Livy source text into `livy_ast::Expr`.
//!
//! Both the lexer and the parser are explicitly out of scope for the core
//! (`spec.md` §1: "treated as external collaborators, named only by the
//! interface they provide"). This crate exists only so the rest of the
//! pipeline can be driven from literal `.livy` source, as the CLI and the
//! end-to-end test scenarios in `spec.md` §8 require.

pub mod lexer;
pub mod parser;

pub use lexer::{lex, LexError, Token, TokenKind};
pub use parser::{parse, ParseError};
