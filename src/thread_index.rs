//! Haplotype threads and the search interface used to enumerate them.
//!
//! The interface follows the GBWT: a search state stands for every thread
//! occurrence matching the pattern searched so far, and is extended one
//! oriented node at a time. Threads are indexed in both orientations, so a
//! thread inserted once is visible as two sequences.

use std::collections::HashMap;

use crate::handle::{Handle, Walk, ENDMARKER};

/// A non-empty set of thread occurrences ending at `node()`
pub trait SearchState: Clone {
    fn node(&self) -> Handle;
}

pub trait ThreadIndex: Sync {
    type State: SearchState;

    /// All occurrences of `node`, or `None` if no thread visits it
    fn find(&self, node: Handle) -> Option<Self::State>;

    /// Occurrences of `state` that continue to `node`
    fn extend(&self, state: &Self::State, node: Handle) -> Option<Self::State>;

    /// Distinct successors of `node` over all threads; `ENDMARKER` marks
    /// threads ending at `node`
    fn edges(&self, node: Handle) -> Vec<Handle>;

    /// Size of the compressed alphabet. Symbol 0 is the endmarker.
    fn effective_size(&self) -> usize;

    /// Node for compressed symbol `comp`
    fn to_node(&self, comp: usize) -> Handle;

    /// Total number of sequences, counting both orientations of every thread
    fn sequence_count(&self) -> usize;

    fn extract(&self, sequence: usize) -> Vec<Handle>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadState {
    node: Handle,
    /// (sequence, offset) occurrences of `node`
    visits: Vec<(usize, usize)>,
}

impl SearchState for ThreadState {
    fn node(&self) -> Handle {
        self.node
    }
}

/// In-memory thread index
#[derive(Debug, Clone, Default)]
pub struct HaplotypeIndex {
    sequences: Vec<Vec<Handle>>,
    visits: HashMap<Handle, Vec<(usize, usize)>>,
    /// Sorted distinct handles; `to_node(comp)` is `alphabet[comp - 1]`
    alphabet: Vec<Handle>,
}

impl HaplotypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a thread and its reverse complement. Empty threads are ignored.
    pub fn insert(&mut self, thread: &[Handle]) {
        if thread.is_empty() {
            return;
        }
        let forward = thread.to_vec();
        let reverse = Walk::new(forward.clone()).reverse_complement();
        for sequence in [forward, reverse.handles().to_vec()] {
            let id = self.sequences.len();
            for (offset, &node) in sequence.iter().enumerate() {
                self.visits.entry(node).or_default().push((id, offset));
                if let Err(pos) = self.alphabet.binary_search(&node) {
                    self.alphabet.insert(pos, node);
                }
            }
            self.sequences.push(sequence);
        }
    }

    /// Number of inserted threads
    pub fn thread_count(&self) -> usize {
        self.sequences.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    fn successor(&self, sequence: usize, offset: usize) -> Handle {
        self.sequences[sequence]
            .get(offset + 1)
            .copied()
            .unwrap_or(ENDMARKER)
    }
}

impl ThreadIndex for HaplotypeIndex {
    type State = ThreadState;

    fn find(&self, node: Handle) -> Option<ThreadState> {
        let visits = self.visits.get(&node)?;
        Some(ThreadState {
            node,
            visits: visits.clone(),
        })
    }

    fn extend(&self, state: &ThreadState, node: Handle) -> Option<ThreadState> {
        let visits: Vec<(usize, usize)> = state
            .visits
            .iter()
            .filter(|&&(sequence, offset)| self.successor(sequence, offset) == node)
            .map(|&(sequence, offset)| (sequence, offset + 1))
            .collect();
        if visits.is_empty() || node == ENDMARKER {
            return None;
        }
        Some(ThreadState { node, visits })
    }

    fn edges(&self, node: Handle) -> Vec<Handle> {
        let mut successors: Vec<Handle> = self
            .visits
            .get(&node)
            .map(|visits| {
                visits
                    .iter()
                    .map(|&(sequence, offset)| self.successor(sequence, offset))
                    .collect()
            })
            .unwrap_or_default();
        successors.sort();
        successors.dedup();
        successors
    }

    fn effective_size(&self) -> usize {
        self.alphabet.len() + 1
    }

    fn to_node(&self, comp: usize) -> Handle {
        if comp == 0 {
            return ENDMARKER;
        }
        self.alphabet[comp - 1]
    }

    fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    fn extract(&self, sequence: usize) -> Vec<Handle> {
        self.sequences[sequence].clone()
    }
}
