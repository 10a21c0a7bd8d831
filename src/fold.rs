//! Folding of border-to-border walks into a duplicated subgraph.
//!
//! Each walk is split in half. The front half is threaded through a trie of
//! prefixes rooted at its first node, the back half through a trie of
//! reversed suffixes rooted at its last node, and a single crossing edge joins
//! the two chains. Walks sharing a prefix (or suffix) share the duplicated
//! nodes for it, while walks that differ anywhere in the middle stay apart.

use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeSet;

use crate::complement::node_sequence;
use crate::graph::{Graph, Node};
use crate::handle::{Edge, Handle, NodeId, Walk};
use crate::node_mapping::NodeMapping;
use crate::path_index::PathIndex;

/// Number of leading positions (including the first node) that belong to the
/// prefix side of a walk of length `len`. The middle node of an odd-length
/// walk is on the prefix side.
pub fn prefix_boundary(len: usize) -> usize {
    (len + 1) / 2
}

/// Per-component folding state
pub struct ComponentFolder<'m> {
    border: BTreeSet<NodeId>,
    mapping: &'m mut NodeMapping,
    /// (chain handle, original next handle) -> duplicate of next
    prefixes: IndexMap<(Handle, Handle), Handle>,
    /// (original previous handle, chain handle) -> duplicate of previous
    suffixes: IndexMap<(Handle, Handle), Handle>,
    crossing_edges: IndexSet<(Handle, Handle)>,
}

impl<'m> ComponentFolder<'m> {
    pub fn new(border: BTreeSet<NodeId>, mapping: &'m mut NodeMapping) -> Self {
        ComponentFolder {
            border,
            mapping,
            prefixes: IndexMap::new(),
            suffixes: IndexMap::new(),
            crossing_edges: IndexSet::new(),
        }
    }

    pub fn is_border(&self, node: NodeId) -> bool {
        self.border.contains(&node)
    }

    pub fn mapping(&self) -> &NodeMapping {
        &*self.mapping
    }

    pub fn prefix(&self, chain: Handle, next: Handle) -> Option<Handle> {
        self.prefixes.get(&(chain, next)).copied()
    }

    pub fn suffix(&self, prev: Handle, chain: Handle) -> Option<Handle> {
        self.suffixes.get(&(prev, chain)).copied()
    }

    pub fn crossing_edges(&self) -> impl Iterator<Item = (Handle, Handle)> + '_ {
        self.crossing_edges.iter().copied()
    }

    /// Fold a walk into the tries. Walks shorter than two nodes are ignored.
    pub fn insert_walk(&mut self, walk: Walk) {
        if walk.len() < 2 {
            return;
        }
        let walk = walk.canonical_form();
        let len = walk.len();
        let half = prefix_boundary(len);

        let mut from = walk[0];
        for i in 1..half {
            from = intern(&mut self.prefixes, self.mapping, (from, walk[i]), walk[i]);
        }

        let mut to = walk[len - 1];
        for i in (half..len - 1).rev() {
            to = intern(&mut self.suffixes, self.mapping, (walk[i], to), walk[i]);
        }

        self.crossing_edges.insert((from, to));
    }

    /// Materialize the tries and crossing edges into `unfolded`.
    ///
    /// Returns the number of distinct crossing edges, i.e. the number of
    /// haplotype paths the component contributes.
    pub fn emit<P: PathIndex>(self, paths: &P, unfolded: &mut Graph) -> usize {
        let mapping = &*self.mapping;
        for (&(from, _), &to) in &self.prefixes {
            add_edge(unfolded, paths, mapping, from, to);
        }
        for (&(_, to), &from) in &self.suffixes {
            add_edge(unfolded, paths, mapping, from, to);
        }
        for &(from, to) in &self.crossing_edges {
            add_edge(unfolded, paths, mapping, from, to);
        }
        self.crossing_edges.len()
    }
}

fn intern(
    trie: &mut IndexMap<(Handle, Handle), Handle>,
    mapping: &mut NodeMapping,
    key: (Handle, Handle),
    original: Handle,
) -> Handle {
    *trie
        .entry(key)
        .or_insert_with(|| original.with_id(mapping.insert(original.id())))
}

fn add_edge<P: PathIndex>(
    unfolded: &mut Graph,
    paths: &P,
    mapping: &NodeMapping,
    from: Handle,
    to: Handle,
) {
    for id in [from.id(), to.id()] {
        if !unfolded.has_node(id) {
            // Missing content was already reported when the complement was built
            unfolded.add_node(Node::new(id, node_sequence(paths, mapping.resolve(id))));
        }
    }
    unfolded.add_edge(Edge::new(from, to));
}
