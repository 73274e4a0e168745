use crate::core::{BranchGraph, GraphNode};
use git2::{Oid, Repository};
use gitstats_core::{BranchOps, CommitWalker, WalkOptions, DEFAULT_MESSAGE_WIDTH};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Builds the commit graph of all local branches, each walked up to a cap
pub struct GraphBuilder<'repo> {
    repo: &'repo Repository,
    branch_cap: usize,
    message_width: usize,
}

impl<'repo> GraphBuilder<'repo> {
    pub fn new(repo: &'repo Repository, branch_cap: usize) -> Self {
        Self {
            repo,
            branch_cap,
            message_width: DEFAULT_MESSAGE_WIDTH,
        }
    }

    pub fn message_width(mut self, width: usize) -> Self {
        self.message_width = width;
        self
    }

    /// Walk every local branch and merge the results.
    ///
    /// A commit reached from several tips becomes a single node tagged with
    /// all of those branches. A branch that cannot be walked is left out and
    /// the rest of the graph is still built.
    pub fn build(&self) -> BranchGraph {
        let tips = match BranchOps::new(self.repo).local_tips() {
            Ok(tips) => tips,
            Err(e) => {
                warn!(error = %e, "cannot enumerate branches");
                return BranchGraph::default();
            }
        };

        let walker = CommitWalker::new(self.repo);
        let mut reached: HashMap<Oid, BTreeSet<String>> = HashMap::new();
        let mut branches = Vec::with_capacity(tips.len());

        for tip in tips {
            let opts = WalkOptions::new(tip.target.to_string()).limit(self.branch_cap);
            match walker.commit_ids(&opts) {
                Ok(ids) => {
                    for oid in ids {
                        reached.entry(oid).or_default().insert(tip.name.clone());
                    }
                    branches.push(tip.name);
                }
                Err(e) => warn!(branch = %tip.name, error = %e, "skipping branch"),
            }
        }

        let nodes: Vec<GraphNode> = reached
            .into_iter()
            .filter_map(|(oid, tags)| match walker.record(oid) {
                Ok(record) => Some(GraphNode::new(record.summarized(self.message_width), tags)),
                Err(e) => {
                    warn!(commit = %oid, error = %e, "skipping commit");
                    None
                }
            })
            .collect();

        branches.sort();
        debug!(nodes = nodes.len(), branches = branches.len(), "built branch graph");
        BranchGraph::from_nodes(nodes, branches)
    }
}
