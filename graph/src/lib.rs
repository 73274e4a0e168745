pub mod core;
pub mod git_backend;

pub use core::{BranchGraph, EdgeType, GraphEdge, GraphNode, GraphStats};
pub use git_backend::GraphBuilder;
