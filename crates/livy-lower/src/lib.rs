//! Surface-to-lowered AST passes (`spec.md` §4.1–§4.3, §4.5–§4.7).
//!
//! Each pass is a standalone, total, tree-to-tree function — none of them can
//! fail. `livy-compiler` sequences them (string expansion, then the type
//! inferer from `livy-infer`, then optionally sorting, simplification,
//! constant folding, and inlining) according to its `CompileConfig`.

mod constant_folder;
mod inline_expander;
mod simplifier;
mod string_expander;
mod topo_sort;
mod type_var_resolver;

pub use constant_folder::fold;
pub use inline_expander::expand;
pub use simplifier::lower;
pub use string_expander::{expand_string, expand_strings};
pub use topo_sort::sort_defines;
pub use type_var_resolver::{resolve, AnnotationTable};
