//! End-to-end run: read both graphs, unfold or restore, verify, write.

use anyhow::{bail, Result};
use log::{info, warn};
use std::io::{self, BufWriter, Write};

use crate::config::{RunMode, UnfoldConfig};
use crate::gfa::{read_gfa, write_gfa, write_gfa_file};
use crate::graph::Graph;
use crate::path_index::PathIndex;
use crate::unfolder::{PhaseUnfolder, UnfoldStats};

/// Outcome of `run`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Set in unfold mode
    pub stats: Option<UnfoldStats>,
    /// Edges added in restore mode
    pub restored_edges: Option<usize>,
    /// Paths and thread sequences that failed verification, when requested
    pub verify_failures: Option<usize>,
    pub nodes: usize,
    pub edges: usize,
}

/// Run the whole pipeline and return the resulting graph with its summary
pub fn unfold_graph(config: &UnfoldConfig) -> Result<(Graph, RunSummary)> {
    config.validate()?;

    let original = read_gfa(&config.original)?;
    let pruned = read_gfa(&config.pruned)?;
    if original.paths.path_count() == 0 && original.haplotypes.is_empty() {
        warn!(
            "{} has no paths or walks; nothing will be reinserted",
            config.original.display()
        );
    }

    let max_id = original
        .max_node_id()
        .max(pruned.max_node_id())
        .unwrap_or(0);
    let next_node = config.resolve_next_node(max_id)?;

    let mut graph = pruned.graph;
    let mut unfolder = PhaseUnfolder::new(&original.paths, &original.haplotypes, next_node);
    let mut summary = RunSummary::default();

    match config.mode {
        RunMode::Unfold => {
            if let Some(path) = &config.read_mapping {
                unfolder.read_mapping(path)?;
                if unfolder.mapping().first_node() <= max_id {
                    bail!(
                        "Mapping {} starts at node {}, which overlaps the graph ids (max {})",
                        path.display(),
                        unfolder.mapping().first_node(),
                        max_id
                    );
                }
            }
            summary.stats = Some(unfolder.unfold(&mut graph));
            if let Some(path) = &config.write_mapping {
                unfolder.write_mapping(path)?;
                info!(
                    "Wrote {} duplicates to {}",
                    unfolder.mapping().len(),
                    path.display()
                );
            }
        }
        RunMode::Restore => {
            summary.restored_edges = Some(unfolder.restore_paths(&mut graph));
        }
    }

    if config.verify {
        let failures = unfolder.verify_paths(&graph);
        if failures > 0 {
            warn!("{} paths or threads could not be verified", failures);
        } else {
            info!("All paths and threads verified");
        }
        summary.verify_failures = Some(failures);
    }

    summary.nodes = graph.node_count();
    summary.edges = graph.edge_count();
    Ok((graph, summary))
}

/// Run the pipeline and write the graph to the configured output
pub fn run(config: &UnfoldConfig) -> Result<RunSummary> {
    let (graph, summary) = unfold_graph(config)?;
    match &config.output {
        Some(path) => write_gfa_file(&graph, path)?,
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_gfa(&graph, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(summary)
}
