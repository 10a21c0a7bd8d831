//! GFA 1.0 input and output.
//!
//! Segments must have positive numeric names. `P` lines become embedded paths
//! and `W` lines become haplotype threads; other record types are skipped.

use anyhow::{anyhow, bail, Context, Result};
use flate2::read::MultiGzDecoder;
use log::info;
use nom::{
    branch::alt,
    character::complete::{char, u64 as decimal},
    combinator::{all_consuming, map, value, verify},
    multi::{many1, separated_list1},
    sequence::pair,
    IResult,
};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::graph::{Graph, Node};
use crate::handle::{Edge, Handle, NodeId, MAX_NODE_ID};
use crate::path_index::{IndexedPaths, PathIndex};
use crate::thread_index::HaplotypeIndex;

/// Graph, embedded paths and haplotype threads read from one GFA file
#[derive(Debug, Default)]
pub struct GfaGraph {
    pub graph: Graph,
    pub paths: IndexedPaths,
    pub haplotypes: HaplotypeIndex,
}

impl GfaGraph {
    pub fn max_node_id(&self) -> Option<NodeId> {
        self.graph.max_node_id()
    }
}

/// Open a file and auto-detect gzip compression, returning a boxed BufRead
pub fn open_gfa_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut buffered = BufReader::new(file);
    let is_gzipped = {
        let peek = buffered.fill_buf()?;
        peek.len() >= 2 && peek[0] == 0x1f && peek[1] == 0x8b
    };

    if is_gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(buffered))))
    } else {
        Ok(Box::new(buffered))
    }
}

pub fn read_gfa<P: AsRef<Path>>(path: P) -> Result<GfaGraph> {
    let path = path.as_ref();
    let reader = open_gfa_input(path)?;
    let gfa = parse_gfa(reader).with_context(|| format!("Failed to read GFA {}", path.display()))?;
    info!(
        "Loaded {}: {} segments, {} links, {} paths, {} haplotypes",
        path.display(),
        gfa.graph.node_count(),
        gfa.graph.edge_count(),
        gfa.paths.path_count(),
        gfa.haplotypes.thread_count()
    );
    Ok(gfa)
}

pub fn parse_gfa<R: BufRead>(reader: R) -> Result<GfaGraph> {
    let mut gfa = GfaGraph::default();
    // First line on which each path or walk step segment appears
    let mut step_lines: BTreeMap<NodeId, usize> = BTreeMap::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
        let steps = parse_record(&line, &mut gfa)
            .with_context(|| format!("Invalid record on line {}", index + 1))?;
        for handle in steps {
            step_lines.entry(handle.id()).or_insert(index + 1);
        }
    }

    for edge in gfa.graph.edges() {
        for id in [edge.from().id(), edge.to().id()] {
            if !gfa.graph.has_node(id) {
                bail!("Link {} refers to unknown segment {}", edge, id);
            }
        }
    }
    for (&id, &line) in &step_lines {
        if !gfa.graph.has_node(id) {
            bail!("Path or walk on line {} refers to unknown segment {}", line, id);
        }
    }
    Ok(gfa)
}

/// Apply one record to `gfa`, returning the steps of a `P` or `W` line
fn parse_record(line: &str, gfa: &mut GfaGraph) -> Result<Vec<Handle>> {
    let fields: Vec<&str> = line.trim_end().split('\t').collect();
    match fields[0] {
        "S" => {
            if fields.len() < 3 {
                bail!("S line has fewer than 3 fields");
            }
            let id = parse_segment_id(fields[1])?;
            let sequence = match fields[2] {
                "*" => Vec::new(),
                seq => seq.as_bytes().to_vec(),
            };
            gfa.paths.add_sequence(id, sequence.clone());
            gfa.graph.add_node(Node::new(id, sequence));
        }
        "L" => {
            if fields.len() < 5 {
                bail!("L line has fewer than 5 fields");
            }
            let from = Handle::new(parse_segment_id(fields[1])?, parse_orientation(fields[2])?);
            let to = Handle::new(parse_segment_id(fields[3])?, parse_orientation(fields[4])?);
            gfa.graph.add_edge(Edge::new(from, to));
        }
        "P" => {
            if fields.len() < 3 {
                bail!("P line has fewer than 3 fields");
            }
            let steps = parse_path_steps(fields[2])?;
            gfa.paths.add_path(fields[1], steps.clone());
            return Ok(steps);
        }
        "W" => {
            if fields.len() < 7 {
                bail!("W line has fewer than 7 fields");
            }
            let steps = parse_walk_steps(fields[6])?;
            gfa.haplotypes.insert(&steps);
            return Ok(steps);
        }
        _ => {}
    }
    Ok(Vec::new())
}

fn segment_id(input: &str) -> IResult<&str, NodeId> {
    verify(decimal, |id: &u64| (1..=MAX_NODE_ID).contains(id))(input)
}

fn path_step(input: &str) -> IResult<&str, Handle> {
    let orientation = alt((value(false, char('+')), value(true, char('-'))));
    map(pair(segment_id, orientation), |(id, is_reverse)| {
        Handle::new(id, is_reverse)
    })(input)
}

fn walk_step(input: &str) -> IResult<&str, Handle> {
    let orientation = alt((value(false, char('>')), value(true, char('<'))));
    map(pair(orientation, segment_id), |(is_reverse, id)| {
        Handle::new(id, is_reverse)
    })(input)
}

fn parse_segment_id(field: &str) -> Result<NodeId> {
    all_consuming(segment_id)(field)
        .map(|(_, id)| id)
        .map_err(|_| anyhow!("Segment name '{}' is not an integer in 1..={}", field, MAX_NODE_ID))
}

fn parse_orientation(field: &str) -> Result<bool> {
    match field {
        "+" => Ok(false),
        "-" => Ok(true),
        _ => bail!("Invalid orientation '{}'", field),
    }
}

/// Parse a `P` line step list such as `1+,2-,3+`
pub fn parse_path_steps(input: &str) -> Result<Vec<Handle>> {
    all_consuming(separated_list1(char(','), path_step))(input)
        .map(|(_, steps)| steps)
        .map_err(|e| anyhow!("Invalid path steps '{}': {}", input, e))
}

/// Parse a `W` line walk such as `>1<2>3`
pub fn parse_walk_steps(input: &str) -> Result<Vec<Handle>> {
    all_consuming(many1(walk_step))(input)
        .map(|(_, steps)| steps)
        .map_err(|e| anyhow!("Invalid walk '{}': {}", input, e))
}

/// Write segments in ascending id order and links in canonical edge order
pub fn write_gfa<W: Write>(graph: &Graph, writer: &mut W) -> Result<()> {
    writeln!(writer, "H\tVN:Z:1.0")?;
    for node in graph.nodes() {
        if node.sequence.is_empty() {
            writeln!(writer, "S\t{}\t*", node.id)?;
        } else {
            writeln!(writer, "S\t{}\t{}", node.id, String::from_utf8_lossy(&node.sequence))?;
        }
    }
    for edge in graph.edges() {
        writeln!(
            writer,
            "L\t{}\t{}\t{}\t{}\t0M",
            edge.from().id(),
            edge.from().orientation_char(),
            edge.to().id(),
            edge.to().orientation_char()
        )?;
    }
    Ok(())
}

pub fn write_gfa_file<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_gfa(graph, &mut writer)
        .and_then(|_| writer.flush().map_err(Into::into))
        .with_context(|| format!("Failed to write GFA {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread_index::ThreadIndex;
    use std::io::Cursor;

    const SMALL: &str = "H\tVN:Z:1.0\n\
S\t1\tAC\n\
S\t2\tG\n\
S\t3\t*\n\
L\t1\t+\t2\t-\t0M\n\
L\t2\t-\t3\t+\t0M\n\
P\tref\t1+,2-,3+\t*\n\
W\tHG01\t1\tchr1\t0\t3\t>1<2>3\n\
C\t1\t+\t2\t+\t0\t1M\n";

    #[test]
    fn test_parse_small_graph() {
        let gfa = parse_gfa(Cursor::new(SMALL)).unwrap();
        assert_eq!(gfa.graph.node_count(), 3);
        assert_eq!(gfa.graph.edge_count(), 2);
        assert!(gfa.graph.has_edge(Edge::new(Handle::forward(2), Handle::reverse(1))));
        assert_eq!(gfa.graph.get_node(3).unwrap().sequence, Vec::<u8>::new());
        assert_eq!(gfa.max_node_id(), Some(3));

        assert_eq!(gfa.paths.path_count(), 1);
        assert_eq!(gfa.paths.path_name(0), "ref");
        assert_eq!(
            gfa.paths.path(0),
            &[Handle::forward(1), Handle::reverse(2), Handle::forward(3)]
        );
        assert_eq!(gfa.paths.sequence(1), Some(&b"AC"[..]));

        assert_eq!(gfa.haplotypes.thread_count(), 1);
        assert_eq!(gfa.haplotypes.extract(0), gfa.paths.path(0).to_vec());
    }

    #[test]
    fn test_step_parsers() {
        assert_eq!(
            parse_path_steps("12+,3-").unwrap(),
            vec![Handle::forward(12), Handle::reverse(3)]
        );
        assert_eq!(
            parse_walk_steps("<7>8").unwrap(),
            vec![Handle::reverse(7), Handle::forward(8)]
        );
        assert!(parse_path_steps("").is_err());
        assert!(parse_path_steps("1+,").is_err());
        assert!(parse_path_steps("1*").is_err());
        assert!(parse_path_steps("0+").is_err());
        assert!(parse_path_steps("9223372036854775807+").is_ok());
        assert!(parse_path_steps("9223372036854775808+").is_err());
        assert!(parse_walk_steps(">9223372036854775809").is_err());
        assert!(parse_walk_steps(">1>").is_err());
        assert!(parse_walk_steps("1+").is_err());
    }

    #[test]
    fn test_errors_name_the_line() {
        let input = "S\t1\tA\nS\tchr2\tC\n";
        let err = parse_gfa(Cursor::new(input)).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));

        let input = "S\t1\tA\nL\t1\t+\t2\t+\t0M\n";
        let err = parse_gfa(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("unknown segment 2"));

        // Too large for a handle; must not alias segment 1
        let input = "S\t1\tA\nS\t9223372036854775809\tC\nL\t9223372036854775809\t+\t1\t+\t0M\n";
        let err = parse_gfa(Cursor::new(input)).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_steps_must_name_segments() {
        let input = "S\t1\tA\nS\t2\tC\nP\tref\t1+,2+,5+\t*\nW\tHG01\t1\tchr1\t0\t3\t>1>7\nS\t5\tG\n";
        let err = parse_gfa(Cursor::new(input)).unwrap_err();
        assert_eq!(err.to_string(), "Path or walk on line 4 refers to unknown segment 7");

        // Segments may follow the paths that use them
        let input = "P\tref\t1+,2+\t*\nS\t1\tA\nS\t2\tC\n";
        let gfa = parse_gfa(Cursor::new(input)).unwrap();
        assert_eq!(gfa.paths.path_count(), 1);
    }

    #[test]
    fn test_write_gfa() {
        let gfa = parse_gfa(Cursor::new(SMALL)).unwrap();
        let mut out = Vec::new();
        write_gfa(&gfa.graph, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "H\tVN:Z:1.0\n\
S\t1\tAC\n\
S\t2\tG\n\
S\t3\t*\n\
L\t1\t+\t2\t-\t0M\n\
L\t2\t-\t3\t+\t0M\n"
        );
    }
}
