//! Layered layout for lineage graphs.

mod engine;
mod layering;
mod placement;
mod types;

pub use engine::LayoutEngine;
pub use layering::{assign_layers, Adjacency};
pub use types::{Layout, LayoutNode};
