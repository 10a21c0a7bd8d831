//! Post-hoc check that every embedded path and haplotype thread can still be
//! spelled in the unfolded graph, through original nodes or their duplicates.

use std::collections::HashMap;

use log::debug;
use rayon::prelude::*;

use crate::graph::Graph;
use crate::handle::{Edge, Handle, NodeId};
use crate::node_mapping::NodeMapping;
use crate::path_index::PathIndex;
use crate::thread_index::ThreadIndex;

/// Original id -> candidate ids in the graph (the duplicates, plus the
/// original itself when the graph still has it), sorted and deduplicated.
///
/// Originals without duplicates are absent and stand for themselves.
pub fn duplicate_table(mapping: &NodeMapping, graph: &Graph) -> HashMap<NodeId, Vec<NodeId>> {
    let mut table: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for (duplicate, original) in mapping.duplicates() {
        let candidates = table.entry(original).or_default();
        candidates.push(duplicate);
        if graph.has_node(original) {
            candidates.push(original);
        }
    }
    for candidates in table.values_mut() {
        candidates.sort_unstable();
        candidates.dedup();
    }
    table
}

/// Branching point of the search: the candidates chosen for the node at
/// `offset` and for the one after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathBranch {
    offset: usize,
    curr: usize,
    next: usize,
}

impl PathBranch {
    fn advance(&mut self) {
        self.offset += 1;
        self.curr = self.next;
        self.next = 0;
    }
}

/// Candidate `choice` for the original node and the total number of
/// candidates (0 when the node was never duplicated).
fn candidate(table: &HashMap<NodeId, Vec<NodeId>>, id: NodeId, choice: usize) -> (NodeId, usize) {
    match table.get(&id) {
        Some(candidates) => (candidates[choice], candidates.len()),
        None => (id, 0),
    }
}

/// Depth-first search for a spelling of `walk` in `graph`.
///
/// Pending branches are discarded whenever the next node has at most one
/// candidate, since every spelling must pass through it.
pub fn verify_walk(walk: &[Handle], graph: &Graph, table: &HashMap<NodeId, Vec<NodeId>>) -> bool {
    if walk.len() < 2 {
        return true;
    }

    let mut branches = vec![PathBranch {
        offset: 0,
        curr: 0,
        next: 0,
    }];
    while let Some(mut branch) = branches.pop() {
        let step = walk[branch.offset];
        let (id, mut curr_candidates) = candidate(table, step.id(), branch.curr);
        let mut curr = step.with_id(id);

        while branch.offset + 1 < walk.len() {
            let step = walk[branch.offset + 1];
            let (id, next_candidates) = candidate(table, step.id(), branch.next);
            if branch.next + 1 < next_candidates {
                branches.push(PathBranch {
                    next: branch.next + 1,
                    ..branch
                });
            } else if branch.curr + 1 < curr_candidates {
                branches.push(PathBranch {
                    offset: branch.offset,
                    curr: branch.curr + 1,
                    next: 0,
                });
            }

            let next = step.with_id(id);
            if !graph.has_edge(Edge::new(curr, next)) {
                break;
            }
            if next_candidates <= 1 {
                branches.clear();
            }
            curr = next;
            curr_candidates = next_candidates;
            branch.advance();
        }

        if branch.offset + 1 >= walk.len() {
            return true;
        }
    }

    false
}

/// Check every embedded path and every thread sequence against `graph` and
/// return the number that cannot be spelled.
pub fn verify_paths<P, T>(paths: &P, threads: &T, mapping: &NodeMapping, graph: &Graph) -> usize
where
    P: PathIndex,
    T: ThreadIndex,
{
    let table = duplicate_table(mapping, graph);
    let path_count = paths.path_count();
    let total = path_count + threads.sequence_count();

    (0..total)
        .into_par_iter()
        .filter(|&i| {
            if i < path_count {
                let ok = verify_walk(paths.path(i), graph, &table);
                if !ok {
                    debug!("Path {} cannot be spelled in the unfolded graph", paths.path_name(i));
                }
                !ok
            } else {
                let sequence = i - path_count;
                let ok = verify_walk(&threads.extract(sequence), graph, &table);
                if !ok {
                    debug!("Thread sequence {} cannot be spelled in the unfolded graph", sequence);
                }
                !ok
            }
        })
        .count()
}
