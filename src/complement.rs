//! Complement graph: edges supported by the evidence but missing from the
//! pruned graph, split into connected components.

use log::{info, warn};

use crate::graph::{Graph, Node};
use crate::handle::{Edge, NodeId, ENDMARKER};
use crate::path_index::PathIndex;
use crate::thread_index::ThreadIndex;

/// Sequence of `id`, empty if the path index does not know the node
pub(crate) fn node_sequence<P: PathIndex>(paths: &P, id: NodeId) -> Vec<u8> {
    paths.sequence(id).map(<[u8]>::to_vec).unwrap_or_default()
}

/// Node with the original sequence of `id`, or an empty one if the path index
/// does not know the node. Callers add each node once, so this warns once.
pub(crate) fn original_node<P: PathIndex>(paths: &P, id: NodeId) -> Node {
    match paths.sequence(id) {
        Some(sequence) => Node::new(id, sequence.to_vec()),
        None => {
            warn!("Node {} is missing from the path index; using an empty sequence", id);
            Node::new(id, Vec::new())
        }
    }
}

fn add_missing_edge<P: PathIndex>(
    complement: &mut Graph,
    retained: &Graph,
    paths: &P,
    edge: Edge,
) {
    if retained.has_edge(edge) {
        return;
    }
    for id in [edge.from().id(), edge.to().id()] {
        if !complement.has_node(id) {
            complement.add_node(original_node(paths, id));
        }
    }
    complement.add_edge(edge);
}

/// Build the complement of `retained` with respect to the embedded paths and
/// the haplotype threads, and return its connected components.
///
/// Components are ordered by their smallest node id.
pub fn complement_components<P, T>(retained: &Graph, paths: &P, threads: &T) -> Vec<Graph>
where
    P: PathIndex,
    T: ThreadIndex,
{
    let mut complement = Graph::new();

    for rank in 0..paths.path_count() {
        for step in paths.path(rank).windows(2) {
            add_missing_edge(&mut complement, retained, paths, Edge::new(step[0], step[1]));
        }
    }

    for comp in 1..threads.effective_size() {
        let node = threads.to_node(comp);
        for next in threads.edges(node) {
            if next == ENDMARKER {
                continue;
            }
            add_missing_edge(&mut complement, retained, paths, Edge::new(node, next));
        }
    }

    let components = complement.disjoint_subgraphs();
    info!(
        "Complement graph: {} nodes, {} edges in {} components",
        complement.node_count(),
        complement.edge_count(),
        components.len()
    );
    components
}
