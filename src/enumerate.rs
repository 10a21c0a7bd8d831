//! Border detection and enumeration of the evidence walks crossing a
//! component of the complement graph.
//!
//! A border-to-border walk either connects two border nodes without visiting
//! another border node in between, or starts at a border node and continues
//! as far as the evidence supports without reaching one.

use std::collections::BTreeSet;

use crate::fold::ComponentFolder;
use crate::graph::Graph;
use crate::handle::{Edge, Handle, NodeId, Walk};
use crate::path_index::PathIndex;
use crate::thread_index::{SearchState, ThreadIndex};

/// Component nodes that are still present in the pruned graph
pub fn border_nodes(component: &Graph, retained: &Graph) -> BTreeSet<NodeId> {
    component
        .nodes()
        .map(|node| node.id)
        .filter(|&id| retained.has_node(id))
        .collect()
}

/// Fold every embedded-path walk that leaves border node `from` through the
/// component, in either direction.
pub fn generate_paths<P: PathIndex>(
    component: &Graph,
    paths: &P,
    from: NodeId,
    folder: &mut ComponentFolder,
) {
    for rank in 0..paths.path_count() {
        let path = paths.path(rank);
        for occurrence in paths.occurrences(from, rank) {
            let forward = path[occurrence + 1..].iter().copied();
            let walk = extend_walk(component, folder, path[occurrence], forward);
            folder.insert_walk(walk);

            let backward = path[..occurrence].iter().rev().map(Handle::flip);
            let walk = extend_walk(component, folder, path[occurrence].flip(), backward);
            folder.insert_walk(walk);
        }
    }
}

/// Follow `steps` from `start` while the component has the connecting edges,
/// stopping after the first border node.
fn extend_walk<I>(component: &Graph, folder: &ComponentFolder, start: Handle, steps: I) -> Walk
where
    I: Iterator<Item = Handle>,
{
    let mut walk = Walk::new(vec![start]);
    let mut prev = start;
    for curr in steps {
        if !component.has_edge(Edge::new(prev, curr)) {
            break;
        }
        walk.push(curr);
        if folder.is_border(curr.id()) {
            break;
        }
        prev = curr;
    }
    walk
}

/// Fold every haplotype walk that leaves border node `from` through the
/// component, in either orientation.
///
/// Uses an explicit stack of search states; a state ends when it reaches
/// another border node or when no edge of the component extends it.
pub fn generate_threads<T: ThreadIndex>(
    component: &Graph,
    threads: &T,
    from: NodeId,
    folder: &mut ComponentFolder,
) {
    let mut states: Vec<(T::State, Walk)> = Vec::new();
    for start in [Handle::forward(from), Handle::reverse(from)] {
        if let Some(state) = threads.find(start) {
            states.push((state, Walk::new(vec![start])));
        }
    }

    while let Some((state, walk)) = states.pop() {
        let node = state.node();
        if walk.len() >= 2 && folder.is_border(node.id()) {
            folder.insert_walk(walk);
            continue;
        }

        let mut extended = false;
        for next in component.follow_edges(node) {
            if let Some(next_state) = threads.extend(&state, next) {
                let mut next_walk = walk.clone();
                next_walk.push(next);
                states.push((next_state, next_walk));
                extended = true;
            }
        }

        if !extended {
            folder.insert_walk(walk);
        }
    }
}
