pub mod descriptor;
pub mod graph;
pub mod layout;

pub use descriptor::{
    CallEdgeDescriptor, ExtractOptions, Extraction, FunctionDescriptor, GroupChild, GroupDescriptor,
};
pub use graph::{Graph, NodeId, PositionedEdge, PositionedGroup, PositionedNode};
pub use layout::{apply_force_directed_layout, LayoutParams, LayoutReport};
