//! Graph override
//!
//! - [`model`] builds the folder-aware graph
//! - [`patch`] tracks which graph views display it

pub mod model;
pub mod patch;

pub use model::{Graph, GraphModelBuilder, GraphNode, NodeColor, NodeColorFilter, NodeKind, RenderOptions};
pub use patch::{GraphDataSink, GraphPatchController, GraphSource, GraphView, PatchState, ViewId};
