//! In-memory bidirected sequence graph.
//!
//! Nodes, edges and adjacency lists live in ordered collections so that every
//! traversal (and therefore every duplicate id handed out while unfolding) is
//! reproducible across runs.

use std::collections::{BTreeMap, BTreeSet};

use crate::handle::{Edge, Handle, NodeId};
use crate::union_find::UnionFind;

/// A graph node containing a DNA sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub sequence: Vec<u8>,
}

impl Node {
    pub fn new(id: NodeId, sequence: Vec<u8>) -> Self {
        Node { id, sequence }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeSet<Edge>,
    adjacency: BTreeMap<NodeId, BTreeSet<Edge>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Insert a node. An existing node with the same id is left untouched.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.entry(node.id).or_insert(node);
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn has_edge(&self, edge: Edge) -> bool {
        self.edges.contains(&edge)
    }

    /// Insert an edge; returns false if it was already present
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if !self.edges.insert(edge) {
            return false;
        }
        self.adjacency
            .entry(edge.from().id())
            .or_default()
            .insert(edge);
        self.adjacency.entry(edge.to().id()).or_default().insert(edge);
        true
    }

    pub fn remove_edge(&mut self, edge: Edge) -> bool {
        if !self.edges.remove(&edge) {
            return false;
        }
        for id in [edge.from().id(), edge.to().id()] {
            if let Some(incident) = self.adjacency.get_mut(&id) {
                incident.remove(&edge);
                if incident.is_empty() {
                    self.adjacency.remove(&id);
                }
            }
        }
        true
    }

    /// Edges incident to the node, in canonical edge order
    pub fn edges_of(&self, id: NodeId) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|incident| incident.iter().copied())
    }

    /// Handles reachable in one step when leaving `handle`
    pub fn follow_edges(&self, handle: Handle) -> impl Iterator<Item = Handle> + '_ {
        self.edges_of(handle.id())
            .filter_map(move |edge| edge.follow(handle))
    }

    /// Nodes in ascending id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edges in canonical order
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn max_node_id(&self) -> Option<NodeId> {
        self.nodes.keys().next_back().copied()
    }

    /// Add every node and edge of `other` that is not already present
    pub fn extend(&mut self, other: &Graph) {
        for node in other.nodes() {
            if !self.has_node(node.id) {
                self.add_node(node.clone());
            }
        }
        for edge in other.edges() {
            self.add_edge(edge);
        }
    }

    /// Split the graph into its connected components.
    ///
    /// Components are returned in ascending order of their smallest node id.
    pub fn disjoint_subgraphs(&self) -> Vec<Graph> {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        let index_of: BTreeMap<NodeId, usize> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let mut uf = UnionFind::new(ids.len());
        for edge in &self.edges {
            if let (Some(&a), Some(&b)) = (
                index_of.get(&edge.from().id()),
                index_of.get(&edge.to().id()),
            ) {
                uf.union(a, b);
            }
        }

        uf.get_sets()
            .into_iter()
            .map(|members| {
                let mut component = Graph::new();
                for &i in &members {
                    component.add_node(self.nodes[&ids[i]].clone());
                }
                for &i in &members {
                    for edge in self.edges_of(ids[i]) {
                        component.add_edge(edge);
                    }
                }
                component
            })
            .collect()
    }
}
