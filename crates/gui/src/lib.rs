// Library crate: the load and selection workflow, testable without a window.
// GUI-specific modules (app, ui, viewport rendering) remain in the binary crate.

pub mod assets;
pub mod command;
pub mod error;
pub mod fixtures;
pub mod harness;
pub mod highlight;
pub mod loaders;
pub mod orchestrator;
pub mod state;
pub mod tasks;
pub mod transform;

/// Geometry helpers shared with the loaders (Ray, Aabb, picking, node matrices).
/// The camera and the painter stay in the binary crate.
pub mod viewport {
    pub mod mesh;
    pub mod picking;
}
