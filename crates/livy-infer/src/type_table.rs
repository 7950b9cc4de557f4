use livy_ast::NodeId;
use livy_types::Type;
use rustc_hash::FxHashMap;

/// The inferred type of every AST node, keyed by [`NodeId`].
///
/// This is the "separate parallel array keyed by node id" `spec.md` §9
/// recommends in place of a mutable, nullable `type_` field on each node —
/// invariant 1 ("every expression node has a non-null `type_` field") holds
/// by construction once every reachable node has an entry here.
#[derive(Debug, Default, Clone)]
pub struct TypeTable(FxHashMap<NodeId, Type>);

impl TypeTable {
    #[must_use]
    pub fn new() -> Self { Self(FxHashMap::default()) }

    pub fn insert(&mut self, id: NodeId, ty: Type) { drop(self.0.insert(id, ty)); }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Type> { self.0.get(&id) }

    /// ## Panics
    ///
    /// Panics if `id` has no recorded type — a bug in the inferer, since
    /// every node visited by the inserter must get one.
    #[must_use]
    pub fn type_of(&self, id: NodeId) -> &Type {
        self.0.get(&id).unwrap_or_else(|| panic!("no inferred type recorded for {id}"))
    }
}
