use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::handle::{NodeId, MAX_NODE_ID};

/// What to do with the pruned regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Reinsert paths and threads with duplicated internal nodes
    Unfold,
    /// Reinsert the embedded-path edges with the original node ids
    Restore,
}

/// Configuration for one unfolding run
#[derive(Debug, Clone)]
pub struct UnfoldConfig {
    /// GFA with the original graph, its paths (P lines) and haplotypes (W lines)
    pub original: PathBuf,
    /// GFA with the pruned graph
    pub pruned: PathBuf,
    /// Output GFA; stdout when absent
    pub output: Option<PathBuf>,
    pub mode: RunMode,
    /// Continue from a previously written node mapping
    pub read_mapping: Option<PathBuf>,
    pub write_mapping: Option<PathBuf>,
    /// First duplicate id; derived from the inputs when absent
    pub next_node: Option<NodeId>,
    /// Check that every path and thread survives
    pub verify: bool,
    /// Worker threads for verification (0 = rayon default)
    pub threads: usize,
}

impl UnfoldConfig {
    pub fn new(original: PathBuf, pruned: PathBuf) -> Self {
        UnfoldConfig {
            original,
            pruned,
            output: None,
            mode: RunMode::Unfold,
            read_mapping: None,
            write_mapping: None,
            next_node: None,
            verify: false,
            threads: 0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.mode == RunMode::Restore
            && (self.read_mapping.is_some() || self.write_mapping.is_some() || self.next_node.is_some())
        {
            bail!("Node mapping options only apply when unfolding, not when restoring paths");
        }
        if self.read_mapping.is_some() && self.next_node.is_some() {
            bail!("--next-node conflicts with --read-mapping; the mapping file sets the next node");
        }
        if self.next_node == Some(0) {
            bail!("Node id 0 is reserved and cannot be used as the next node");
        }
        if self.next_node.is_some_and(|next| next > MAX_NODE_ID) {
            bail!("Next node must not exceed {}", MAX_NODE_ID);
        }
        Ok(())
    }

    /// First duplicate id given the largest id of the original and the pruned
    /// graph
    pub fn resolve_next_node(&self, max_id: NodeId) -> Result<NodeId> {
        match self.next_node {
            Some(next) if next <= max_id => bail!(
                "Next node {} must be larger than every existing node id (max {})",
                next,
                max_id
            ),
            Some(next) => Ok(next),
            None => Ok(max_id + 1),
        }
    }
}
