use slotmap::new_key_type;

new_key_type! {
    /// Identifier for a branch node in a [`crate::tree::TreeGraph`].
    ///
    /// Keys are generational: once a node is merged away its id is never
    /// handed out again, so ids can be compared for identity across passes.
    pub struct NodeId;

    /// Handle to a node of a [`crate::memory_scene::MemoryScene`].
    pub struct SceneKey;
}
