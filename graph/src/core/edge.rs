use serde::{Deserialize, Serialize};

/// A parent to child relation, both ends as short hashes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Parent commit; may name a commit that is not a node
    pub parent: String,
    /// Child commit
    pub child: String,
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Regular parent-child relationship
    Regular,
    /// Edge into a merge commit
    Merge,
}

impl GraphEdge {
    pub fn new(parent: String, child: String) -> Self {
        Self {
            parent,
            child,
            edge_type: EdgeType::Regular,
        }
    }

    pub fn merge(parent: String, child: String) -> Self {
        Self {
            parent,
            child,
            edge_type: EdgeType::Merge,
        }
    }
}
