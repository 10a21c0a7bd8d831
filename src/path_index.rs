//! Embedded paths of the original graph.

use std::collections::HashMap;

use crate::handle::{Handle, NodeId};

/// Read access to the original graph: node sequences and its embedded paths.
///
/// Path ranks are `0..path_count()`.
pub trait PathIndex: Sync {
    fn path_count(&self) -> usize;

    fn path(&self, rank: usize) -> &[Handle];

    fn path_name(&self, rank: usize) -> &str;

    /// Offsets at which `node` occurs on path `rank`, ascending
    fn occurrences(&self, node: NodeId, rank: usize) -> Vec<usize>;

    /// Sequence of an original node
    fn sequence(&self, node: NodeId) -> Option<&[u8]>;
}

#[derive(Debug, Clone)]
struct NamedPath {
    name: String,
    steps: Vec<Handle>,
}

/// In-memory `PathIndex` with a per-node occurrence table
#[derive(Debug, Clone, Default)]
pub struct IndexedPaths {
    sequences: HashMap<NodeId, Vec<u8>>,
    paths: Vec<NamedPath>,
    /// node -> (rank, offset) pairs in insertion order
    occurrences: HashMap<NodeId, Vec<(usize, usize)>>,
}

impl IndexedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sequence(&mut self, node: NodeId, sequence: Vec<u8>) {
        self.sequences.insert(node, sequence);
    }

    /// Append a path and return its rank
    pub fn add_path(&mut self, name: &str, steps: Vec<Handle>) -> usize {
        let rank = self.paths.len();
        for (offset, step) in steps.iter().enumerate() {
            self.occurrences
                .entry(step.id())
                .or_default()
                .push((rank, offset));
        }
        self.paths.push(NamedPath {
            name: name.to_string(),
            steps,
        });
        rank
    }

    pub fn node_count(&self) -> usize {
        self.sequences.len()
    }

    pub fn max_node_id(&self) -> Option<NodeId> {
        self.sequences.keys().max().copied()
    }
}

impl PathIndex for IndexedPaths {
    fn path_count(&self) -> usize {
        self.paths.len()
    }

    fn path(&self, rank: usize) -> &[Handle] {
        &self.paths[rank].steps
    }

    fn path_name(&self, rank: usize) -> &str {
        &self.paths[rank].name
    }

    fn occurrences(&self, node: NodeId, rank: usize) -> Vec<usize> {
        self.occurrences
            .get(&node)
            .map(|visits| {
                visits
                    .iter()
                    .filter(|&&(r, _)| r == rank)
                    .map(|&(_, offset)| offset)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn sequence(&self, node: NodeId) -> Option<&[u8]> {
        self.sequences.get(&node).map(|s| s.as_slice())
    }
}
