//! Core library for a procedurally subdivided binary branch tree.
//!
//! Main components:
//! - [`tree`] - branch nodes, the [`TreeGraph`](tree::TreeGraph) orchestrator,
//!   subdivision and merging.
//! - [`geometry`] - derivation of a node's scene transform.
//! - [`scene`] - the scene collaborator trait and transform types.
//! - [`memory_scene`] - an in-memory scene graph implementing the trait.
//! - [`random`] - random unit direction sources.
//! - [`config`] - tunable parameters of a tree.
//! - [`error`] - error type for contract violations.
//! - [`types`] - shared ids.

pub mod config;
pub mod error;
pub mod geometry;
pub mod memory_scene;
pub mod random;
pub mod scene;
pub mod tree;
pub mod types;
