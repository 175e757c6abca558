use glam::Vec3;

/// Tunable parameters of a tree, as exposed to the host driving it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeConfig {
    /// Number of whole-tree subdivisions applied on initialization.
    /// Negative values are treated as zero.
    pub depth: i32,
    pub root_length: f32,
    pub root_direction: Vec3,
    /// Scene position of the root's base point.
    pub origin: Vec3,
    /// Uniform scale of a depth-0 leaf; halves with every generation.
    pub base_leaf_scale: f32,
    /// Seed for the direction generator, `None` for an entropy-seeded one.
    pub seed: Option<u64>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            root_length: 10.0,
            root_direction: Vec3::Y,
            origin: Vec3::ZERO,
            base_leaf_scale: 100.0,
            seed: None,
        }
    }
}
