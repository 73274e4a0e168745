pub mod node;
pub mod edge;
pub mod dag;

pub use node::GraphNode;
pub use edge::{EdgeType, GraphEdge};
pub use dag::{BranchGraph, GraphStats};
