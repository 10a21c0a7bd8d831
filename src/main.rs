use anyhow::{bail, Result};
use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};
use std::env;
use std::path::PathBuf;

use hapunfold::config::{RunMode, UnfoldConfig};
use hapunfold::handle::NodeId;
use hapunfold::pipeline;

/// hapunfold - Reinsert pruned haplotype paths into a pangenome graph
///
/// Regions removed from the pruned graph are rebuilt from the paths (P lines)
/// and walks (W lines) of the original graph, duplicating nodes so that
/// distinct haplotypes stay apart.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Original graph with paths and walks (GFA, optionally gzipped)
    #[clap(short = 'g', long = "graph", value_name = "GFA")]
    original: PathBuf,

    /// Pruned graph (GFA, optionally gzipped)
    #[clap(short = 'p', long = "pruned", value_name = "GFA")]
    pruned: PathBuf,

    /// Output GFA (stdout if not specified)
    #[clap(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Restore the edges of embedded paths instead of unfolding
    #[clap(short = 'r', long = "restore-paths")]
    restore_paths: bool,

    /// Continue numbering duplicates from this node mapping
    #[clap(short = 'a', long = "read-mapping", value_name = "FILE")]
    read_mapping: Option<PathBuf>,

    /// Write the node mapping to this file
    #[clap(short = 'm', long = "write-mapping", value_name = "FILE")]
    write_mapping: Option<PathBuf>,

    /// First id for duplicated nodes (default: largest node id + 1)
    #[clap(short = 'n', long = "next-node")]
    next_node: Option<NodeId>,

    /// Verify that every path and walk is still present
    #[clap(short = 'v', long = "verify")]
    verify: bool,

    /// Number of threads for verification (0 = all cores)
    #[clap(short = 't', long = "threads", default_value = "0")]
    threads: usize,

    /// Quiet mode (warnings and errors only)
    #[clap(long = "quiet")]
    quiet: bool,
}

impl Args {
    fn to_config(&self) -> UnfoldConfig {
        UnfoldConfig {
            original: self.original.clone(),
            pruned: self.pruned.clone(),
            output: self.output.clone(),
            mode: if self.restore_paths {
                RunMode::Restore
            } else {
                RunMode::Unfold
            },
            read_mapping: self.read_mapping.clone(),
            write_mapping: self.write_mapping.clone(),
            next_node: self.next_node,
            verify: self.verify,
            threads: self.threads,
        }
    }
}

fn init_logging(quiet: bool) {
    let mut builder = Builder::new();
    builder.filter_level(if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    });
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet);

    let config = args.to_config();
    config.validate()?;

    if config.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build_global()?;
    }

    let summary = pipeline::run(&config)?;
    info!(
        "Output graph: {} nodes, {} edges",
        summary.nodes, summary.edges
    );

    if let Some(failures) = summary.verify_failures {
        if failures > 0 {
            bail!("Verification failed for {} paths or threads", failures);
        }
    }
    Ok(())
}
