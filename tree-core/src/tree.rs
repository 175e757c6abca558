//! Binary branch tree and its synchronization with a scene.
//!
//! A [`TreeGraph`] owns every [`BranchNode`] in an arena keyed by
//! [`NodeId`]. Each node owns one scene node of the [`SceneBackend`] the
//! graph was built with. Two whole-tree passes change the structure:
//!
//! 1. [`TreeGraph::subdivide_whole_tree_once`] - every leaf grows two
//!    children of half its length.
//! 2. [`TreeGraph::merge_whole_tree_once`] - the parent of every leaf
//!    drops its children and becomes a leaf again.
//!
//! Both passes snapshot the leaf set before mutating, so nodes created or
//! released during a pass are never visited by that same pass.

use crate::{
    config::TreeConfig,
    error::{Result, TreeError},
    geometry,
    random::DirectionSource,
    scene::{MeshKind, SceneBackend},
    types::NodeId,
};
use glam::Vec3;
use log::{debug, trace, warn};
use slotmap::SlotMap;

/// One segment of the tree.
///
/// `H` is the handle type of the scene the node is mirrored into.
#[derive(Debug, Clone)]
pub struct BranchNode<H> {
    pub depth: u32,
    /// Back reference used for base-point lookup only; `None` for the root.
    pub parent: Option<NodeId>,
    /// Both children or none.
    children: Option<[NodeId; 2]>,
    pub length: f32,
    /// Unit growth direction from this node's base point.
    pub direction: Vec3,
    pub scene: H,
}

impl<H> BranchNode<H> {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    #[inline]
    pub fn children(&self) -> Option<[NodeId; 2]> {
        self.children
    }

    #[inline]
    pub fn left_child(&self) -> Option<NodeId> {
        self.children.map(|[left, _]| left)
    }

    #[inline]
    pub fn right_child(&self) -> Option<NodeId> {
        self.children.map(|[_, right]| right)
    }

    /// Classification derived from the current children.
    #[inline]
    pub fn kind(&self) -> MeshKind {
        if self.is_leaf() {
            MeshKind::Leaf
        } else {
            MeshKind::Branch
        }
    }
}

/// A binary tree of branches mirrored into a scene.
///
/// ### Fields
/// - `nodes` - Arena of every live branch node.
/// - `root` - Root id, `None` while uninitialized or after teardown.
/// - `scene` - The scene collaborator receiving node updates.
/// - `cfg` - Parameters used by [`TreeGraph::initialize`] and for the
///   transform derivation.
#[derive(Debug)]
pub struct TreeGraph<S: SceneBackend> {
    nodes: SlotMap<NodeId, BranchNode<S::Handle>>,
    root: Option<NodeId>,
    scene: S,
    cfg: TreeConfig,
}

impl<S: SceneBackend> TreeGraph<S> {
    /// Creates an uninitialized graph over `scene`.
    pub fn new(scene: S, cfg: TreeConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            scene,
            cfg,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.cfg
    }

    /// Replaces the configuration. Existing nodes keep their transforms
    /// until the next structural change or reinitialization.
    pub fn set_config(&mut self, cfg: TreeConfig) {
        self.cfg = cfg;
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Gives the scene back without releasing any of its nodes.
    pub fn into_scene(self) -> S {
        self.scene
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&BranchNode<S::Handle>> {
        self.nodes.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &BranchNode<S::Handle>)> {
        self.nodes.iter()
    }

    /// Number of live branch nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    /// Greatest node depth, `0` for a root-only or empty tree.
    pub fn tree_depth(&self) -> u32 {
        self.nodes.values().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Builds a fresh tree from the configured depth, length and direction.
    pub fn initialize(&mut self, dirs: &mut impl DirectionSource) -> Result<()> {
        let TreeConfig {
            depth,
            root_length,
            root_direction,
            ..
        } = self.cfg;
        self.init_tree(depth, root_length, root_direction, dirs)
    }

    /// Releases the current tree and builds a new one from the config.
    ///
    /// The parameters are validated first; on error the current tree stays.
    pub fn reset(&mut self, dirs: &mut impl DirectionSource) -> Result<()> {
        debug!("resetting tree");
        self.initialize(dirs)
    }

    /// Releases every scene node and forgets the tree.
    ///
    /// Only the root's scene node is destroyed explicitly; the scene
    /// cascades the destruction to its descendants. Calling this on an
    /// uninitialized graph does nothing.
    pub fn teardown(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        if let Some(node) = self.nodes.get(root) {
            self.scene.destroy_node(node.scene);
        }
        debug!("tree torn down, released {} nodes", self.nodes.len());
        self.nodes.clear();
    }

    /// Discards any existing tree, creates a root, then subdivides the whole
    /// tree `depth` times.
    ///
    /// ### Parameters
    /// - `depth` - Number of subdivision passes; negative values mean none.
    /// - `root_length` - Length of the root segment, must be positive.
    /// - `root_direction` - Growth direction of the root, normalized here.
    /// - `dirs` - Source of the random perturbations of child directions.
    ///
    /// ### Errors
    /// [`TreeError::InvalidParameter`] if the length is not a positive
    /// finite number or the direction cannot be normalized. The existing
    /// tree is left untouched in that case.
    pub fn init_tree(
        &mut self,
        depth: i32,
        root_length: f32,
        root_direction: Vec3,
        dirs: &mut impl DirectionSource,
    ) -> Result<()> {
        if !(root_length.is_finite() && root_length > 0.0) {
            return Err(TreeError::InvalidParameter(format!(
                "root length must be positive, got {root_length}"
            )));
        }
        let Some(direction) = root_direction.try_normalize() else {
            return Err(TreeError::InvalidParameter(format!(
                "root direction cannot be normalized: {root_direction}"
            )));
        };
        if depth < 0 {
            warn!("negative tree depth {depth}, building root only");
        }

        self.teardown();
        let root = self.spawn_node(None, 0, root_length, direction);
        self.root = Some(root);

        for _ in 0..depth.max(0) {
            self.subdivide_whole_tree_once(dirs)?;
        }

        debug!(
            "tree initialized: depth {}, {} nodes",
            depth.max(0),
            self.nodes.len()
        );
        Ok(())
    }

    /// Returns the current leaves, left subtree before right subtree.
    ///
    /// Empty when the tree is uninitialized.
    pub fn find_leaf_nodes(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let Some(root) = self.root else {
            return leaves;
        };

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            match node.children {
                None => leaves.push(id),
                Some([left, right]) => {
                    // Right first so that left pops first.
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        leaves
    }

    /// Subdivides every current leaf once.
    ///
    /// ### Returns
    /// Ids of the created nodes, each leaf's left child followed by its right
    /// child, in leaf traversal order.
    pub fn subdivide_whole_tree_once(
        &mut self,
        dirs: &mut impl DirectionSource,
    ) -> Result<Vec<NodeId>> {
        let leaves = self.find_leaf_nodes();
        let mut new_ids = Vec::with_capacity(leaves.len() * 2);

        for leaf in leaves {
            let (left, right) = self.subdivide_node(leaf, dirs)?;
            new_ids.push(left);
            new_ids.push(right);
        }

        debug!("subdivided tree: {} new nodes", new_ids.len());
        Ok(new_ids)
    }

    /// Merges the parent of every current leaf once.
    ///
    /// A root-only tree has no parent to merge and is left as is. Sibling
    /// leaves share a parent; the second visit finds it already merged and
    /// does nothing.
    ///
    /// ### Returns
    /// Ids of the nodes that turned back into leaves.
    pub fn merge_whole_tree_once(&mut self) -> Result<Vec<NodeId>> {
        let leaves = self.find_leaf_nodes();
        let mut merged = Vec::with_capacity(leaves.len() / 2);

        for leaf in leaves {
            // Released by an earlier merge in this pass.
            let Some(node) = self.nodes.get(leaf) else {
                continue;
            };
            let parent = node.parent;
            if self.merge_node(parent)?
                && let Some(parent) = parent
            {
                merged.push(parent);
            }
        }

        debug!("merged tree: {} nodes became leaves", merged.len());
        Ok(merged)
    }

    /// Turns a leaf into a branch with two new leaf children.
    ///
    /// Each child gets half the parent's length and the parent's direction
    /// perturbed by its own random unit vector; the left child draws first.
    ///
    /// ### Returns
    /// `(left, right)` ids of the new children.
    ///
    /// ### Errors
    /// - [`TreeError::UnknownNode`] if `id` is not in the tree.
    /// - [`TreeError::StructuralViolation`] if the node already has children.
    pub fn subdivide_node(
        &mut self,
        id: NodeId,
        dirs: &mut impl DirectionSource,
    ) -> Result<(NodeId, NodeId)> {
        let node = self.nodes.get(id).ok_or(TreeError::UnknownNode(id))?;
        if !node.is_leaf() {
            return Err(TreeError::StructuralViolation {
                node: id,
                reason: "cannot subdivide a node that already has children",
            });
        }

        let depth = node.depth + 1;
        let length = node.length / 2.0;
        let direction = node.direction;

        let left_dir = geometry::grow_direction(direction, dirs.random_unit_vector());
        let left = self.spawn_node(Some(id), depth, length, left_dir);
        let right_dir = geometry::grow_direction(direction, dirs.random_unit_vector());
        let right = self.spawn_node(Some(id), depth, length, right_dir);

        self.nodes[id].children = Some([left, right]);
        self.refresh_node(id);
        Ok((left, right))
    }

    /// Turns a branch back into a leaf, releasing everything below it.
    ///
    /// `None` and leaves are accepted and left unchanged.
    ///
    /// ### Returns
    /// `true` if the node changed from branch to leaf.
    ///
    /// ### Errors
    /// [`TreeError::UnknownNode`] if `node` is not in the tree.
    pub fn merge_node(&mut self, node: Option<NodeId>) -> Result<bool> {
        let Some(id) = node else {
            return Ok(false);
        };
        let Some(children) = self
            .nodes
            .get_mut(id)
            .ok_or(TreeError::UnknownNode(id))?
            .children
            .take()
        else {
            return Ok(false);
        };

        for child in children {
            if let Some(child_node) = self.nodes.get(child) {
                self.scene.destroy_node(child_node.scene);
            }
            let released = self.drop_subtree(child);
            trace!("released {released} nodes under {child:?}");
        }

        self.refresh_node(id);
        Ok(true)
    }

    /// Inserts a node, materializes its scene node and computes its
    /// transform.
    fn spawn_node(
        &mut self,
        parent: Option<NodeId>,
        depth: u32,
        length: f32,
        direction: Vec3,
    ) -> NodeId {
        let parent_handle = parent.and_then(|p| self.nodes.get(p)).map(|p| p.scene);
        let handle = self.scene.create_node(parent_handle);

        let id = self.nodes.insert(BranchNode {
            depth,
            parent,
            children: None,
            length,
            direction,
            scene: handle,
        });
        self.refresh_node(id);

        trace!("spawned {id:?} at depth {depth}, length {length}, direction {direction}");
        id
    }

    /// Reassigns geometry and transform of a node from its current state.
    fn refresh_node(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };

        let anchor = match node.parent.and_then(|p| self.nodes.get(p)) {
            Some(parent) => geometry::base_point(
                self.scene.world_position(parent.scene),
                parent.length,
                parent.direction,
            ),
            None => self.cfg.origin,
        };

        let kind = node.kind();
        let handle = node.scene;
        let transform = geometry::derive_transform(
            anchor,
            node.direction,
            node.depth,
            node.length,
            kind,
            self.cfg.base_leaf_scale,
        );

        self.scene.assign_geometry(handle, kind);
        self.scene.set_transform(handle, &transform);
    }

    /// Removes `id` and all of its descendants from the arena. Scene nodes
    /// are not touched.
    ///
    /// ### Returns
    /// Number of removed nodes.
    fn drop_subtree(&mut self, id: NodeId) -> usize {
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(id) {
                removed += 1;
                if let Some(children) = node.children {
                    stack.extend(children);
                }
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        memory_scene::MemoryScene,
        random::{RngDirections, SequenceDirections},
        types::SceneKey,
    };
    use std::collections::HashSet;

    const EPS: f32 = 1e-5;

    fn graph() -> TreeGraph<MemoryScene> {
        TreeGraph::new(MemoryScene::new(), TreeConfig::default())
    }

    fn grown(depth: i32, seed: u64) -> TreeGraph<MemoryScene> {
        let mut tree = graph();
        tree.init_tree(depth, 10.0, Vec3::Y, &mut RngDirections::seeded(seed))
            .unwrap();
        tree
    }

    /// Checks the structural invariants over every node.
    fn assert_well_formed(tree: &TreeGraph<MemoryScene>) {
        for (id, node) in tree.iter() {
            assert_eq!(node.left_child().is_some(), node.right_child().is_some());

            if let Some(children) = node.children() {
                for child in children {
                    let c = tree.node(child).expect("child must be live");
                    assert_eq!(c.parent, Some(id));
                    assert_eq!(c.depth, node.depth + 1);
                    assert_eq!(c.length, node.length / 2.0);
                    assert!((c.direction.length() - 1.0).abs() < EPS);
                }
            }

            // Scene mirrors the tree: one live scene node per branch node,
            // parented like the branch node and classified from its children.
            let scene_node = tree.scene().get(node.scene).expect("scene node must be live");
            assert_eq!(scene_node.mesh, Some(node.kind()));
            let expected_parent: Option<SceneKey> =
                node.parent.map(|p| tree.node(p).unwrap().scene);
            assert_eq!(scene_node.parent, expected_parent);
        }
        assert_eq!(tree.scene().len(), tree.len());
    }

    #[test]
    fn find_leaf_nodes_on_uninitialized_tree_is_empty() {
        let tree = graph();
        assert!(tree.find_leaf_nodes().is_empty());
        assert!(!tree.is_initialized());
    }

    #[test]
    fn operations_on_uninitialized_tree_are_noops() {
        let mut tree = graph();
        let mut dirs = RngDirections::seeded(0);

        assert!(tree.subdivide_whole_tree_once(&mut dirs).unwrap().is_empty());
        assert!(tree.merge_whole_tree_once().unwrap().is_empty());
        tree.teardown();

        assert!(tree.is_empty());
        assert!(tree.scene().is_empty());
    }

    #[test]
    fn depth_zero_builds_single_leaf_root() {
        let tree = grown(0, 1);

        assert_eq!(tree.len(), 1);
        let root = tree.root().unwrap();
        assert_eq!(tree.find_leaf_nodes(), vec![root]);

        let node = tree.node(root).unwrap();
        assert!(node.is_leaf());
        assert_eq!(node.depth, 0);
        assert_eq!(node.length, 10.0);
        assert_eq!(node.direction, Vec3::Y);

        let scene_node = tree.scene().get(node.scene).unwrap();
        assert_eq!(scene_node.mesh, Some(MeshKind::Leaf));
        assert_eq!(scene_node.transform.position, Vec3::ZERO);
        assert_eq!(scene_node.transform.scale, Vec3::splat(100.0));
    }

    #[test]
    fn depth_two_builds_seven_nodes() {
        let tree = grown(2, 2);

        assert_eq!(tree.len(), 7);
        assert_eq!(tree.scene().len(), 7);

        let count_at = |d: u32| tree.iter().filter(|(_, n)| n.depth == d).count();
        assert_eq!(count_at(0), 1);
        assert_eq!(count_at(1), 2);
        assert_eq!(count_at(2), 4);

        let leaves = tree.find_leaf_nodes();
        assert_eq!(leaves.len(), 4);
        assert!(leaves.iter().all(|&l| tree.node(l).unwrap().depth == 2));
        assert!(
            tree.iter()
                .filter(|(_, n)| n.depth < 2)
                .all(|(_, n)| n.kind() == MeshKind::Branch)
        );
        assert_eq!(tree.tree_depth(), 2);
        assert_well_formed(&tree);
    }

    #[test]
    fn leaf_count_doubles_with_each_depth() {
        for depth in 0..=6 {
            let tree = grown(depth, depth as u64);
            let leaves = tree.find_leaf_nodes();

            assert_eq!(leaves.len(), 1 << depth, "depth {depth}");
            assert!(
                leaves
                    .iter()
                    .all(|&l| tree.node(l).unwrap().depth == depth as u32)
            );
            assert_eq!(tree.len(), (1 << (depth + 1)) - 1);
            assert_well_formed(&tree);
        }
    }

    #[test]
    fn negative_depth_builds_root_only() {
        let tree = grown(-3, 0);
        assert_eq!(tree.len(), 1);
        assert!(tree.node(tree.root().unwrap()).unwrap().is_leaf());
    }

    #[test]
    fn leaves_are_listed_left_subtree_first() {
        let mut tree = graph();
        let mut dirs = RngDirections::seeded(5);
        tree.init_tree(1, 10.0, Vec3::Y, &mut dirs).unwrap();

        let root = tree.root().unwrap();
        let [left, right] = tree.node(root).unwrap().children().unwrap();
        let (ll, lr) = tree.subdivide_node(left, &mut dirs).unwrap();

        assert_eq!(tree.find_leaf_nodes(), vec![ll, lr, right]);
    }

    #[test]
    fn subdivide_then_merge_restores_leaf_set() {
        for depth in 0..=4 {
            let mut tree = grown(depth, 100 + depth as u64);
            let before = tree.find_leaf_nodes();

            let created = tree
                .subdivide_whole_tree_once(&mut RngDirections::seeded(9))
                .unwrap();
            assert_eq!(created.len(), before.len() * 2);

            let merged = tree.merge_whole_tree_once().unwrap();
            assert_eq!(merged, before);
            assert_eq!(tree.find_leaf_nodes(), before);
            assert!(created.iter().all(|&id| tree.node(id).is_none()));
            assert_well_formed(&tree);
        }
    }

    #[test]
    fn merge_on_root_only_tree_is_noop() {
        let mut tree = grown(0, 0);
        let root = tree.root().unwrap();

        let merged = tree.merge_whole_tree_once().unwrap();

        assert!(merged.is_empty());
        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.scene().len(), 1);
    }

    #[test]
    fn shared_parent_is_merged_once() {
        let mut tree = grown(1, 4);
        let root = tree.root().unwrap();

        let merged = tree.merge_whole_tree_once().unwrap();

        assert_eq!(merged, vec![root]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.scene().len(), 1);
        let node = tree.node(root).unwrap();
        assert!(node.is_leaf());
        assert_eq!(tree.scene().get(node.scene).unwrap().mesh, Some(MeshKind::Leaf));
    }

    #[test]
    fn merging_down_to_root_then_regrowing() {
        let mut tree = grown(3, 8);
        for _ in 0..3 {
            tree.merge_whole_tree_once().unwrap();
            assert_well_formed(&tree);
        }
        assert_eq!(tree.len(), 1);

        tree.subdivide_whole_tree_once(&mut RngDirections::seeded(1))
            .unwrap();
        assert_eq!(tree.find_leaf_nodes().len(), 2);
        assert_well_formed(&tree);
    }

    #[test]
    fn subdividing_twice_is_a_structural_violation() {
        let mut tree = grown(0, 0);
        let root = tree.root().unwrap();
        let mut dirs = RngDirections::seeded(0);

        tree.subdivide_node(root, &mut dirs).unwrap();
        let err = tree.subdivide_node(root, &mut dirs).unwrap_err();

        assert!(matches!(err, TreeError::StructuralViolation { node, .. } if node == root));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn merge_node_accepts_none_and_leaves() {
        let mut tree = grown(1, 0);
        let leaf = tree.find_leaf_nodes()[0];

        assert!(!tree.merge_node(None).unwrap());
        assert!(!tree.merge_node(Some(leaf)).unwrap());
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn released_ids_are_unknown() {
        let mut tree = grown(1, 0);
        let leaf = tree.find_leaf_nodes()[0];
        tree.merge_whole_tree_once().unwrap();

        assert_eq!(
            tree.merge_node(Some(leaf)),
            Err(TreeError::UnknownNode(leaf))
        );
        assert_eq!(
            tree.subdivide_node(leaf, &mut SequenceDirections::default()),
            Err(TreeError::UnknownNode(leaf))
        );
    }

    #[test]
    fn merging_inner_node_releases_whole_subtree() {
        let mut tree = grown(3, 12);
        let root = tree.root().unwrap();

        assert!(tree.merge_node(Some(root)).unwrap());

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.scene().len(), 1);
        assert_eq!(tree.find_leaf_nodes(), vec![root]);
    }

    #[test]
    fn child_directions_follow_direction_sequence() {
        let mut tree = graph();
        let mut dirs = SequenceDirections::new(vec![Vec3::X, Vec3::NEG_X]);
        tree.init_tree(1, 10.0, Vec3::Y, &mut dirs).unwrap();

        let root = tree.root().unwrap();
        let [left, right] = tree.node(root).unwrap().children().unwrap();

        let l = tree.node(left).unwrap().direction;
        let r = tree.node(right).unwrap().direction;
        assert!(l.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0).normalize(), EPS));
        assert!(r.abs_diff_eq(Vec3::new(-1.0, 1.0, 0.0).normalize(), EPS));
    }

    #[test]
    fn same_seed_reproduces_tree() {
        let a = grown(4, 77);
        let b = grown(4, 77);

        let dirs = |t: &TreeGraph<MemoryScene>| -> Vec<Vec3> {
            t.find_leaf_nodes()
                .into_iter()
                .map(|id| t.node(id).unwrap().direction)
                .collect()
        };
        assert_eq!(dirs(&a), dirs(&b));
    }

    #[test]
    fn child_anchor_sits_at_parent_tip() {
        let mut tree = graph();
        tree.set_config(TreeConfig {
            origin: Vec3::new(1.0, 0.0, -2.0),
            ..TreeConfig::default()
        });
        tree.init_tree(2, 8.0, Vec3::Y, &mut RngDirections::seeded(21))
            .unwrap();

        let root = tree.root().unwrap();
        let root_scene = tree.node(root).unwrap().scene;
        assert_eq!(tree.scene().world_position(root_scene), Vec3::new(1.0, 0.0, -2.0));

        for (_, node) in tree.iter() {
            let Some(parent) = node.parent.and_then(|p| tree.node(p)) else {
                continue;
            };
            let expected = tree.scene().world_position(parent.scene) + parent.direction * parent.length;
            let actual = tree.scene().world_position(node.scene);
            assert!(actual.abs_diff_eq(expected, EPS), "{actual} != {expected}");
        }
    }

    #[test]
    fn subdivide_and_merge_swap_geometry_style() {
        let mut tree = grown(0, 0);
        let root = tree.root().unwrap();
        let handle = tree.node(root).unwrap().scene;

        tree.subdivide_node(root, &mut RngDirections::seeded(0)).unwrap();
        let branch = tree.scene().get(handle).unwrap();
        assert_eq!(branch.mesh, Some(MeshKind::Branch));
        assert_eq!(branch.transform.scale, Vec3::new(1.0, 5.0, 1.0));
        assert!(branch.transform.visual_offset.abs_diff_eq(Vec3::new(0.0, 5.0, 0.0), EPS));

        tree.merge_node(Some(root)).unwrap();
        let leaf = tree.scene().get(handle).unwrap();
        assert_eq!(leaf.mesh, Some(MeshKind::Leaf));
        assert_eq!(leaf.transform.scale, Vec3::splat(100.0));
        assert_eq!(leaf.transform.visual_offset, Vec3::ZERO);
    }

    #[test]
    fn init_tree_discards_previous_tree() {
        let mut tree = grown(3, 0);
        let old_root = tree.root().unwrap();
        let old_ids: HashSet<NodeId> = tree.iter().map(|(id, _)| id).collect();

        tree.init_tree(1, 4.0, Vec3::X, &mut RngDirections::seeded(1))
            .unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.scene().len(), 3);
        assert!(tree.node(old_root).is_none());
        assert!(tree.iter().all(|(id, _)| !old_ids.contains(&id)));
        assert_eq!(tree.node(tree.root().unwrap()).unwrap().direction, Vec3::X);
    }

    #[test]
    fn invalid_parameters_leave_tree_untouched() {
        let mut tree = grown(2, 0);
        let mut dirs = RngDirections::seeded(0);

        for length in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = tree.init_tree(1, length, Vec3::Y, &mut dirs).unwrap_err();
            assert!(matches!(err, TreeError::InvalidParameter(_)));
        }
        let err = tree.init_tree(1, 1.0, Vec3::ZERO, &mut dirs).unwrap_err();
        assert!(matches!(err, TreeError::InvalidParameter(_)));

        assert_eq!(tree.len(), 7);
        assert_well_formed(&tree);
    }

    #[test]
    fn root_direction_is_normalized() {
        let mut tree = graph();
        tree.init_tree(0, 1.0, Vec3::new(0.0, 3.0, 0.0), &mut RngDirections::seeded(0))
            .unwrap();
        assert_eq!(tree.node(tree.root().unwrap()).unwrap().direction, Vec3::Y);
    }

    #[test]
    fn teardown_releases_every_scene_node() {
        let mut tree = grown(4, 3);
        assert_eq!(tree.scene().len(), 31);

        tree.teardown();
        assert!(tree.is_empty());
        assert!(tree.scene().is_empty());
        assert!(tree.root().is_none());
        assert!(tree.find_leaf_nodes().is_empty());

        tree.teardown();
        assert!(tree.scene().is_empty());
    }

    #[test]
    fn reset_rebuilds_from_config() {
        let mut tree = graph();
        tree.set_config(TreeConfig {
            depth: 3,
            root_length: 16.0,
            ..TreeConfig::default()
        });
        let mut dirs = RngDirections::seeded(6);

        tree.initialize(&mut dirs).unwrap();
        tree.merge_whole_tree_once().unwrap();
        assert_eq!(tree.find_leaf_nodes().len(), 4);

        tree.reset(&mut dirs).unwrap();
        assert_eq!(tree.find_leaf_nodes().len(), 8);
        assert_eq!(tree.node(tree.root().unwrap()).unwrap().length, 16.0);
        assert_eq!(tree.scene().len(), 15);
    }

    #[test]
    fn reset_with_invalid_config_keeps_tree() {
        let mut tree = grown(2, 0);
        tree.set_config(TreeConfig {
            root_direction: Vec3::ZERO,
            ..TreeConfig::default()
        });

        assert!(tree.reset(&mut RngDirections::seeded(0)).is_err());
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.scene().len(), 7);
    }
}
