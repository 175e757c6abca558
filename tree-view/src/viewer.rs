//! Interactive viewer for the procedural branch tree built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`TreeGraph`] mirrored into
//! a [`MemoryScene`] and implements [`eframe::App`] to drive and draw it.
//! The viewer plays the host role: it decides when the tree is initialized,
//! grown, pruned, reset or torn down.

use eframe::App;
use glam::{Quat, Vec3};
use log::error;
use rand::rngs::StdRng;
use tree_core::{
    config::TreeConfig,
    error::TreeError,
    memory_scene::MemoryScene,
    random::RngDirections,
    scene::MeshKind,
    tree::TreeGraph,
    types::NodeId,
};

/// Radius of the leaf mesh in world units at unit scale.
const LEAF_MESH_RADIUS: f32 = 0.02;

/// Stroke width in pixels of a depth-0 branch.
const BRANCH_WIDTH_PX: f32 = 6.0;

/// Main application state for the interactive viewer.
///
/// ### Fields
/// - `tree` - The tree and its in-memory scene.
/// - `cfg` - Parameters edited in the side panel, applied on reset.
/// - `dirs` - Random direction source used for growth.
///
/// - `yaw`, `pitch` - Orbit angles of the orthographic camera (radians).
/// - `zoom` - Pixels per world unit.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `last_new_ids` - Nodes created by the last subdivision (highlighted).
/// - `last_error` - Message of the last failed tree operation, if any.
pub struct Viewer {
    tree: TreeGraph<MemoryScene>,
    cfg: TreeConfig,
    dirs: RngDirections<StdRng>,

    yaw: f32,
    pitch: f32,
    zoom: f32,
    pan: egui::Vec2,

    last_new_ids: Vec<NodeId>,
    last_error: Option<String>,
}

impl Viewer {
    /// Creates a viewer with a tree built from [`TreeConfig::default`].
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Creates a viewer and initializes its tree from `cfg`.
    pub fn with_config(cfg: TreeConfig) -> Self {
        let mut viewer = Self {
            tree: TreeGraph::new(MemoryScene::new(), cfg),
            cfg,
            dirs: RngDirections::from_seed_option(cfg.seed),
            yaw: 0.0,
            pitch: 0.0,
            zoom: 20.0,
            pan: egui::vec2(0.0, 120.0),
            last_new_ids: Vec::with_capacity(32),
            last_error: None,
        };
        let result = viewer.tree.initialize(&mut viewer.dirs);
        viewer.report(result);
        viewer
    }

    /// Records the outcome of a tree operation.
    fn report<T>(&mut self, result: Result<T, TreeError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(err) => {
                error!("tree operation failed: {err}");
                self.last_error = Some(err.to_string());
                None
            }
        }
    }

    /// Rebuilds the tree from the edited configuration.
    ///
    /// The direction source is reseeded so that a fixed seed always yields
    /// the same tree.
    fn reset(&mut self) {
        self.tree.set_config(self.cfg);
        self.dirs = RngDirections::from_seed_option(self.cfg.seed);
        let result = self.tree.reset(&mut self.dirs);
        self.report(result);
        self.last_new_ids.clear();
    }

    /// Releases the tree and all its scene nodes.
    fn clear(&mut self) {
        self.tree.teardown();
        self.last_new_ids.clear();
    }

    fn subdivide_once(&mut self) {
        let result = self.tree.subdivide_whole_tree_once(&mut self.dirs);
        self.last_new_ids = self.report(result).unwrap_or_default();
    }

    fn merge_once(&mut self) {
        let result = self.tree.merge_whole_tree_once();
        self.report(result);
        self.last_new_ids.clear();
    }

    /// Orbit rotation applied to world positions before projection.
    fn view_rotation(&self) -> Quat {
        Quat::from_rotation_x(self.pitch) * Quat::from_rotation_y(self.yaw)
    }

    /// Projects a world-space position onto the screen.
    ///
    /// The position is rotated by the orbit angles and then projected
    /// orthographically onto the view plane, scaled by `zoom`, offset by
    /// `pan` and centered inside `rect`. Positive world y goes up.
    fn world_to_screen(&self, p: Vec3, rect: egui::Rect) -> egui::Pos2 {
        let v = self.view_rotation() * p;
        let center = rect.center();
        egui::pos2(
            center.x + v.x * self.zoom + self.pan.x,
            center.y - v.y * self.zoom + self.pan.y,
        )
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (tree operations, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("Subdivide").clicked() {
                    self.subdivide_once();
                }

                if ui.button("Merge").clicked() {
                    self.merge_once();
                }

                if ui.button("Clear").clicked() {
                    self.clear();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 1.0..=200.0).text("Zoom"));

                if let Some(err) = &self.last_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }
            });
        });
    }

    /// Builds the bottom status bar (node, leaf and scene counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("scene nodes = {}", self.tree.scene().len()));
                ui.separator();
                ui.label(format!("depth = {}", self.tree.tree_depth()));
                ui.label(format!("leaves = {}", self.tree.find_leaf_nodes().len()));
                ui.label(format!("nodes = {}", self.tree.len()));
            });
        });
    }

    /// Builds the right-hand configuration panel for tree parameters.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Structure");
                ui.horizontal(|ui| {
                    ui.label("depth:");
                    ui.add(egui::DragValue::new(&mut self.cfg.depth).range(0..=12));
                });
                Self::labeled_drag_f32(
                    ui,
                    "root_length:",
                    &mut self.cfg.root_length,
                    0.1..=100.0,
                    0.1,
                );

                ui.separator();
                ui.label("Root direction");
                Self::labeled_drag_f32(ui, "x:", &mut self.cfg.root_direction.x, -1.0..=1.0, 0.05);
                Self::labeled_drag_f32(ui, "y:", &mut self.cfg.root_direction.y, -1.0..=1.0, 0.05);
                Self::labeled_drag_f32(ui, "z:", &mut self.cfg.root_direction.z, -1.0..=1.0, 0.05);

                ui.separator();
                ui.label("Geometry");
                Self::labeled_drag_f32(
                    ui,
                    "base_leaf_scale:",
                    &mut self.cfg.base_leaf_scale,
                    0.0..=1000.0,
                    1.0,
                );

                ui.separator();
                ui.label("Randomness");
                let mut fixed = self.cfg.seed.is_some();
                if ui.checkbox(&mut fixed, "fixed seed").changed() {
                    self.cfg.seed = fixed.then_some(0);
                }
                if let Some(seed) = &mut self.cfg.seed {
                    ui.horizontal(|ui| {
                        ui.label("seed:");
                        ui.add(egui::DragValue::new(seed));
                    });
                }

                ui.separator();
                if ui.button("Apply (reset tree)").clicked() {
                    self.reset();
                }
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = TreeConfig::default();
                }
            });
    }

    /// Builds the central panel where the scene is drawn and orbited.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Orbit with the primary button, pan with the secondary one.
            if response.dragged_by(egui::PointerButton::Primary) {
                let delta = response.drag_delta();
                self.yaw += delta.x * 0.01;
                self.pitch = (self.pitch + delta.y * 0.01).clamp(-1.5, 1.5);
            }
            if response.dragged_by(egui::PointerButton::Secondary) {
                self.pan += response.drag_delta();
            }

            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(1.0, 200.0);
            }

            let highlighted: Vec<_> = self
                .last_new_ids
                .iter()
                .filter_map(|&id| self.tree.node(id).map(|n| n.scene))
                .collect();

            // Branches first so leaves are drawn on top.
            for (_, node) in self.tree.scene().iter() {
                if node.mesh != Some(MeshKind::Branch) {
                    continue;
                }
                let t = &node.transform;
                let a = self.world_to_screen(t.position, rect);
                let b = self.world_to_screen(t.position + t.visual_offset * 2.0, rect);
                let width = (t.scale.x * BRANCH_WIDTH_PX).max(1.0);
                painter.line_segment([a, b], egui::Stroke::new(width, egui::Color32::from_rgb(139, 94, 60)));
            }

            for (key, node) in self.tree.scene().iter() {
                if node.mesh != Some(MeshKind::Leaf) {
                    continue;
                }
                let t = &node.transform;
                let p = self.world_to_screen(t.visual_position(), rect);
                let r = (t.scale.x * LEAF_MESH_RADIUS * self.zoom).max(2.0);

                let color = if highlighted.contains(&key) {
                    egui::Color32::RED
                } else {
                    egui::Color32::LIGHT_GREEN
                };
                painter.circle_filled(p, r, color);
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
