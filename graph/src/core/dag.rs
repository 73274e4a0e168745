use super::{edge::GraphEdge, node::GraphNode};
use gitstats_core::commit::short_hash;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Commit graph across all local branches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchGraph {
    /// Unique commits, most recent first
    pub nodes: Vec<GraphNode>,
    /// One edge per parent of every node, dangling parents included
    pub edges: Vec<GraphEdge>,
    /// Branches whose traversal succeeded
    pub branches: Vec<String>,
}

impl BranchGraph {
    /// Assemble the graph, ordering nodes by commit time (newest first) and
    /// deriving the edge list from each node's parents
    pub fn from_nodes(mut nodes: Vec<GraphNode>, branches: Vec<String>) -> Self {
        nodes.sort_by(|a, b| {
            b.commit
                .timestamp
                .cmp(&a.commit.timestamp)
                .then_with(|| a.commit.full_hash.cmp(&b.commit.full_hash))
        });

        let mut edges = Vec::new();
        for node in &nodes {
            for parent in &node.commit.parent_hashes {
                let parent = short_hash(parent);
                let child = node.id().to_string();
                edges.push(if node.is_merge {
                    GraphEdge::merge(parent, child)
                } else {
                    GraphEdge::new(parent, child)
                });
            }
        }

        Self {
            nodes,
            edges,
            branches,
        }
    }

    /// Look up a node by short hash
    pub fn node(&self, short_hash: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id() == short_hash)
    }

    /// Get children of a commit
    pub fn children(&self, short_hash: &str) -> Vec<&GraphNode> {
        self.edges
            .iter()
            .filter(|e| e.parent == short_hash)
            .filter_map(|e| self.node(&e.child))
            .collect()
    }

    /// Get parents of a commit that are present as nodes
    pub fn parents(&self, short_hash: &str) -> Vec<&GraphNode> {
        self.edges
            .iter()
            .filter(|e| e.child == short_hash)
            .filter_map(|e| self.node(&e.parent))
            .collect()
    }

    /// Get all root commits (no parents)
    pub fn roots(&self) -> Vec<&GraphNode> {
        self.nodes.iter().filter(|n| n.is_root()).collect()
    }

    /// Edges whose parent fell outside every traversal
    pub fn dangling_edges(&self) -> Vec<&GraphEdge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.parent.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_commits: self.nodes.len(),
            total_edges: self.edges.len(),
            merge_commits: self.nodes.iter().filter(|n| n.is_merge).count(),
            root_commits: self.roots().len(),
            shared_commits: self.nodes.iter().filter(|n| n.is_shared()).count(),
            dangling_edges: self.dangling_edges().len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_commits: usize,
    pub total_edges: usize,
    pub merge_commits: usize,
    pub root_commits: usize,
    pub shared_commits: usize,
    pub dangling_edges: usize,
}
