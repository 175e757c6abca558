//! The scene collaborator a [`crate::tree::TreeGraph`] keeps in sync.
//!
//! Every branch node owns exactly one scene node. A scene node is made of
//! two parts:
//!
//! - an *anchor*, positioned at the branch's base point and rotated to face
//!   along the branch direction. Child anchors are parented to their parent's
//!   anchor in the scene hierarchy.
//! - a *visual*, the renderable mesh attached to the anchor, with its own
//!   rotation, offset and scale. Leaves and branches use different meshes and
//!   different visual transforms.

use glam::{Quat, Vec3};

/// Which mesh/material pair a scene node renders with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Leaf,
    Branch,
}

/// Full transform of one scene node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTransform {
    /// World position of the anchor (the branch's base point).
    pub position: Vec3,
    /// World rotation of the anchor, facing along the branch direction.
    pub rotation: Quat,
    /// Rotation of the visual relative to the anchor.
    pub visual_rotation: Quat,
    /// World-space offset of the visual from the anchor.
    pub visual_offset: Vec3,
    /// Scale of the visual.
    pub scale: Vec3,
}

impl NodeTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        visual_rotation: Quat::IDENTITY,
        visual_offset: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// World position of the visual's center.
    #[inline]
    pub fn visual_position(&self) -> Vec3 {
        self.position + self.visual_offset
    }

    /// World rotation of the visual.
    #[inline]
    pub fn visual_world_rotation(&self) -> Quat {
        self.rotation * self.visual_rotation
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Scene-graph operations consumed by the tree.
///
/// ### Contract
/// - [`SceneBackend::destroy_node`] is immediate and recursive: every scene
///   node attached below `handle` is destroyed with it. The tree relies on
///   this and only ever destroys the roots of released subtrees.
/// - [`SceneBackend::world_position`] returns the anchor position last set
///   through [`SceneBackend::set_transform`].
pub trait SceneBackend {
    type Handle: Copy + Eq + std::fmt::Debug;

    /// Creates an empty positionable node, optionally attached to `parent`.
    fn create_node(&mut self, parent: Option<Self::Handle>) -> Self::Handle;

    /// Destroys `handle` and all of its scene descendants.
    fn destroy_node(&mut self, handle: Self::Handle);

    /// Sets the mesh and material of the node's visual.
    fn assign_geometry(&mut self, handle: Self::Handle, kind: MeshKind);

    fn set_transform(&mut self, handle: Self::Handle, transform: &NodeTransform);

    fn world_position(&self, handle: Self::Handle) -> Vec3;
}
