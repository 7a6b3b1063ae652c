// Tree layout and PDF export for roadmap diagrams

#![deny(clippy::all)]

// Internal modules (implementation details)
mod color;
mod coordinate_system;
mod text;
mod utils;

// Public modules (user-facing API)
pub mod error;
pub mod export;
pub mod graph;
pub mod layout;
pub mod render;
pub mod types;

// Host bindings
#[cfg(feature = "napi")]
pub mod napi_interface;
#[cfg(feature = "wasm")]
pub mod wasm;

// ===== Essential Public API =====
/// Whole pipeline: forest, layout and PDF in one call
pub use export::{export_roadmap, export_roadmap_json, layout_roadmap, ExportedDocument};

/// Input/output types
pub use types::{
    GraphEdge, GraphNode, LayoutConfig, NodeKind, Point, PositionMap, RoadmapDocument,
};

pub use error::{ExportError, Result};

// ===== Pipeline stages =====
pub use graph::{build_forest, Forest, RoadmapGraph, TreeNode};
pub use layout::layout;
pub use render::render;

// ===== Utility functions =====
pub use coordinate_system::{layout_bounds, Bounds};
pub use utils::{export_file_name, sanitize_file_stem};
