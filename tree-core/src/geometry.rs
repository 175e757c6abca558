//! Derivation of a branch node's scene transform.
//!
//! A transform is a pure function of the node's base point, direction,
//! depth, length and current classification. Nothing here is cached: the
//! tree recomputes the transform whenever a node's children change.

use crate::scene::{MeshKind, NodeTransform};
use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Axis the anchor's default orientation faces along.
pub const FORWARD: Vec3 = Vec3::Z;

/// Tilt of the branch mesh about the anchor's X axis. The branch mesh is
/// modelled along +Y, this lays it onto [`FORWARD`].
pub const BRANCH_TILT: f32 = FRAC_PI_2;

/// `1 / 2^depth`.
#[inline]
pub fn depth_falloff(depth: u32) -> f32 {
    0.5_f32.powi(depth as i32)
}

/// Base point of a child: the tip of its parent segment.
#[inline]
pub fn base_point(parent_anchor: Vec3, parent_length: f32, parent_direction: Vec3) -> Vec3 {
    parent_anchor + parent_direction * parent_length
}

/// Rotation taking [`FORWARD`] onto `direction`.
#[inline]
pub fn facing(direction: Vec3) -> Quat {
    Quat::from_rotation_arc(FORWARD, direction)
}

/// Direction of a freshly grown child.
///
/// The random unit vector is added to the parent's direction and the sum is
/// renormalized. If the two cancel out, the parent's direction is kept.
#[inline]
pub fn grow_direction(parent_direction: Vec3, random: Vec3) -> Vec3 {
    (parent_direction + random).normalize_or(parent_direction)
}

/// Computes the scene transform of a node.
///
/// ### Parameters
/// - `anchor` - Base point of the node in world space.
/// - `direction` - Unit growth direction.
/// - `depth` - Generation of the node, root = 0.
/// - `length` - Segment length.
/// - `kind` - Current classification, derived from the node's children.
/// - `base_leaf_scale` - Uniform scale of a depth-0 leaf.
///
/// ### Returns
/// - Leaf: uniform scale `base_leaf_scale / 2^depth`, no visual offset.
/// - Branch: visual tilted by [`BRANCH_TILT`], scaled to
///   `(1/2^depth, length/2, 1/2^depth)` and centered on the segment.
pub fn derive_transform(
    anchor: Vec3,
    direction: Vec3,
    depth: u32,
    length: f32,
    kind: MeshKind,
    base_leaf_scale: f32,
) -> NodeTransform {
    let falloff = depth_falloff(depth);
    let rotation = facing(direction);

    match kind {
        MeshKind::Leaf => NodeTransform {
            position: anchor,
            rotation,
            visual_rotation: Quat::IDENTITY,
            visual_offset: Vec3::ZERO,
            scale: Vec3::splat(base_leaf_scale * falloff),
        },
        MeshKind::Branch => NodeTransform {
            position: anchor,
            rotation,
            visual_rotation: Quat::from_rotation_x(BRANCH_TILT),
            visual_offset: direction * (length / 2.0),
            scale: Vec3::new(falloff, length / 2.0, falloff),
        },
    }
}
