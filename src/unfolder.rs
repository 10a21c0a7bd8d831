//! Phase unfolding: reinsert the evidence-supported paths that pruning removed
//! from a graph, duplicating internal nodes so that distinct paths do not
//! merge inside the removed regions.

use anyhow::Result;
use log::{debug, info};
use std::path::Path;

use crate::complement::{complement_components, original_node};
use crate::enumerate::{border_nodes, generate_paths, generate_threads};
use crate::fold::ComponentFolder;
use crate::graph::Graph;
use crate::handle::{Edge, NodeId};
use crate::node_mapping::NodeMapping;
use crate::path_index::PathIndex;
use crate::thread_index::ThreadIndex;
use crate::verify;

/// Summary of one `unfold` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnfoldStats {
    pub components: usize,
    pub complement_nodes: usize,
    pub complement_edges: usize,
    pub unfolded_nodes: usize,
    pub unfolded_edges: usize,
    /// Distinct crossing edges over all components
    pub haplotype_paths: usize,
}

pub struct PhaseUnfolder<'a, P, T> {
    paths: &'a P,
    threads: &'a T,
    mapping: NodeMapping,
}

impl<'a, P, T> PhaseUnfolder<'a, P, T>
where
    P: PathIndex,
    T: ThreadIndex,
{
    /// `next_node` must exceed every node id in the original graph
    pub fn new(paths: &'a P, threads: &'a T, next_node: NodeId) -> Self {
        PhaseUnfolder {
            paths,
            threads,
            mapping: NodeMapping::new(next_node),
        }
    }

    /// Unfold the pruned regions of `graph`.
    ///
    /// Nodes already in `graph` keep their ids; every reinserted internal node
    /// gets a fresh duplicate id recorded in the mapping.
    pub fn unfold(&mut self, graph: &mut Graph) -> UnfoldStats {
        let paths = self.paths;
        let threads = self.threads;
        let components = complement_components(graph, paths, threads);

        let mut stats = UnfoldStats {
            components: components.len(),
            complement_nodes: components.iter().map(Graph::node_count).sum(),
            complement_edges: components.iter().map(Graph::edge_count).sum(),
            ..UnfoldStats::default()
        };

        let mut unfolded = Graph::new();
        for (index, component) in components.iter().enumerate() {
            let border = border_nodes(component, graph);
            let starts: Vec<NodeId> = border.iter().copied().collect();
            let mut folder = ComponentFolder::new(border, &mut self.mapping);
            for &start in &starts {
                generate_paths(component, paths, start, &mut folder);
                generate_threads(component, threads, start, &mut folder);
            }
            let haplotype_paths = folder.emit(paths, &mut unfolded);
            debug!(
                "Component {}: {} nodes, {} border nodes, {} haplotype paths",
                index,
                component.node_count(),
                starts.len(),
                haplotype_paths
            );
            stats.haplotype_paths += haplotype_paths;
        }

        stats.unfolded_nodes = unfolded.node_count();
        stats.unfolded_edges = unfolded.edge_count();
        info!(
            "Unfolded graph: {} nodes, {} edges on {} paths",
            stats.unfolded_nodes, stats.unfolded_edges, stats.haplotype_paths
        );

        graph.extend(&unfolded);
        stats
    }

    /// Add the embedded-path edges missing from `graph` using the original
    /// node ids. Returns the number of edges added.
    pub fn restore_paths(&self, graph: &mut Graph) -> usize {
        let mut restored = 0;
        for rank in 0..self.paths.path_count() {
            for step in self.paths.path(rank).windows(2) {
                let edge = Edge::new(step[0], step[1]);
                if graph.has_edge(edge) {
                    continue;
                }
                for id in [edge.from().id(), edge.to().id()] {
                    if !graph.has_node(id) {
                        graph.add_node(original_node(self.paths, id));
                    }
                }
                graph.add_edge(edge);
                restored += 1;
            }
        }
        info!(
            "Restored graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        restored
    }

    /// Number of embedded paths and thread sequences that cannot be spelled
    /// in `graph`
    pub fn verify_paths(&self, graph: &Graph) -> usize {
        verify::verify_paths(self.paths, self.threads, &self.mapping, graph)
    }

    pub fn write_mapping<Q: AsRef<Path>>(&self, path: Q) -> Result<()> {
        self.mapping.save(path)
    }

    /// Replace the current mapping with one read from a file. On error the
    /// current mapping is kept.
    pub fn read_mapping<Q: AsRef<Path>>(&mut self, path: Q) -> Result<()> {
        let path = path.as_ref();
        self.mapping.load(path)?;
        info!(
            "Loaded {} duplicates from {}; next node {}",
            self.mapping.len(),
            path.display(),
            self.mapping.next_node()
        );
        Ok(())
    }

    /// Original id of `node`
    pub fn get_mapping(&self, node: NodeId) -> NodeId {
        self.mapping.resolve(node)
    }

    pub fn mapping(&self) -> &NodeMapping {
        &self.mapping
    }
}
