//! In-memory scene graph implementing [`SceneBackend`].
//!
//! Stores the hierarchy, mesh kind and transform of every scene node. It is
//! what the viewer draws from, and what tests inspect to check that the tree
//! and its scene representation stay in sync.

use crate::{
    scene::{MeshKind, NodeTransform, SceneBackend},
    types::SceneKey,
};
use glam::Vec3;
use log::warn;
use slotmap::SlotMap;

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub parent: Option<SceneKey>,
    pub children: Vec<SceneKey>,
    /// `None` until geometry is first assigned.
    pub mesh: Option<MeshKind>,
    pub transform: NodeTransform,
}

#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: SlotMap<SceneKey, SceneNode>,
    roots: Vec<SceneKey>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live scene nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: SceneKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn get(&self, key: SceneKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SceneKey, &SceneNode)> {
        self.nodes.iter()
    }

    /// Nodes created without a parent.
    pub fn roots(&self) -> &[SceneKey] {
        &self.roots
    }

    pub fn children(&self, key: SceneKey) -> &[SceneKey] {
        self.nodes
            .get(key)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Removes a node and, recursively, every node attached below it.
    fn remove_node(&mut self, key: SceneKey) {
        let Some(node) = self.nodes.remove(key) else {
            return;
        };

        for child in node.children {
            self.remove_node(child);
        }

        match node.parent {
            Some(parent) => {
                // The parent is already gone when the removal cascades from it.
                if let Some(parent) = self.nodes.get_mut(parent)
                    && let Some(pos) = parent.children.iter().position(|&c| c == key)
                {
                    parent.children.remove(pos);
                }
            }
            None => self.roots.retain(|&r| r != key),
        }
    }
}

impl SceneBackend for MemoryScene {
    type Handle = SceneKey;

    fn create_node(&mut self, parent: Option<SceneKey>) -> SceneKey {
        let parent = parent.filter(|&p| self.nodes.contains_key(p));
        let key = self.nodes.insert(SceneNode {
            parent,
            children: Vec::new(),
            mesh: None,
            transform: NodeTransform::IDENTITY,
        });

        match parent {
            Some(p) => self.nodes[p].children.push(key),
            None => self.roots.push(key),
        }
        key
    }

    fn destroy_node(&mut self, handle: SceneKey) {
        self.remove_node(handle);
    }

    fn assign_geometry(&mut self, handle: SceneKey, kind: MeshKind) {
        match self.nodes.get_mut(handle) {
            Some(node) => node.mesh = Some(kind),
            None => warn!("assign_geometry on released scene node {handle:?}"),
        }
    }

    fn set_transform(&mut self, handle: SceneKey, transform: &NodeTransform) {
        match self.nodes.get_mut(handle) {
            Some(node) => node.transform = *transform,
            None => warn!("set_transform on released scene node {handle:?}"),
        }
    }

    fn world_position(&self, handle: SceneKey) -> Vec3 {
        self.nodes
            .get(handle)
            .map_or(Vec3::ZERO, |n| n.transform.position)
    }
}
