//! Lexical scope tracking for `(depth, slot)` name resolution (`spec.md` §4.8).
//!
//! Depth is the *absolute* nesting depth from the module scope (depth 0), not
//! a relative hop count — see `SPEC_FULL.md`'s Open Question decisions.
//! `Block` and `Function` are the only lowered constructs that push a scope
//! (`Define` with a body is already desugared into a `Block` by the
//! simplifier before codegen ever runs).

use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct Scopes {
    frames: Vec<FxHashMap<String, u32>>,
}

impl Scopes {
    #[must_use]
    pub fn root() -> Self { Self { frames: vec![FxHashMap::default()] } }

    pub fn push(&mut self) { self.frames.push(FxHashMap::default()); }

    pub fn pop(&mut self) {
        assert!(self.frames.len() > 1, "popped the module scope");
        self.frames.pop();
    }

    /// Binds `name` to the next free slot in the current (innermost) frame
    /// and returns that slot. The module scope (depth 0) reserves slot 0 —
    /// its first binding lands at slot 1 — matching the recovered
    /// `collatz_step` fixture's `STORE_NAME 1` for a single top-level
    /// definition; inner frames are unaffected and still start at slot 0.
    pub fn bind(&mut self, name: &str) -> u32 {
        let at_module_scope = self.frames.len() == 1;
        let frame = self.frames.last_mut().expect("root scope always present");
        let slot = u32::try_from(frame.len()).expect("fewer than u32::MAX bindings in one scope");
        let slot = if at_module_scope { slot + 1 } else { slot };
        frame.insert(name.to_string(), slot);
        slot
    }

    /// The absolute depth `name` is bound at, plus its slot, searching from
    /// the innermost frame outward. Returns `None` for a name with no
    /// binding — this should never happen on an already-type-checked tree.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<(u16, u32)> {
        for (depth, frame) in self.frames.iter().enumerate().rev() {
            if let Some(&slot) = frame.get(name) {
                return Some((u16::try_from(depth).expect("fewer than u16::MAX nested scopes"), slot));
            }
        }
        None
    }
}
