//! Source position and span tracking for the Livy compiler.
//!
//! This crate is the lowest layer of the workspace: every other crate reaches
//! through it to talk about "where in the source text" a node, token, or error
//! comes from. There is no module system and no multi-file compilation unit in
//! this language, so there is exactly one [`SourceFile`] per compilation.

pub mod types;

pub use types::{Position, SourceFile, Span};
