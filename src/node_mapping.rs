//! Registry of duplicated node ids.
//!
//! Duplicates are allocated from a contiguous range `[first_node, next_node)`
//! and each one remembers the original node it stands in for. Identifiers
//! outside the range are not duplicates and map to themselves.
//!
//! On disk the mapping is a header of two little-endian `u64` values
//! (`first_node`, `next_node`) followed by one little-endian `u64` original id
//! per duplicate, in allocation order.

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::handle::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMapping {
    first_node: NodeId,
    /// Original id of duplicate `first_node + i`
    originals: Vec<NodeId>,
}

impl NodeMapping {
    /// Empty mapping whose first duplicate will be `first_node`
    pub fn new(first_node: NodeId) -> Self {
        NodeMapping {
            first_node,
            originals: Vec::new(),
        }
    }

    pub fn first_node(&self) -> NodeId {
        self.first_node
    }

    /// The id the next call to `insert` will return
    pub fn next_node(&self) -> NodeId {
        self.first_node + self.originals.len() as NodeId
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Allocate a new duplicate of `original`.
    ///
    /// Every call allocates; callers check their own tables before inserting.
    pub fn insert(&mut self, original: NodeId) -> NodeId {
        let duplicate = self.next_node();
        self.originals.push(original);
        duplicate
    }

    /// Original id of `node`; identity for ids that are not duplicates
    pub fn resolve(&self, node: NodeId) -> NodeId {
        if node < self.first_node {
            return node;
        }
        self.originals
            .get((node - self.first_node) as usize)
            .copied()
            .unwrap_or(node)
    }

    /// `(duplicate, original)` pairs in allocation order
    pub fn duplicates(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.originals
            .iter()
            .enumerate()
            .map(move |(i, &original)| (self.first_node + i as NodeId, original))
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u64::<LittleEndian>(self.first_node)?;
        writer.write_u64::<LittleEndian>(self.next_node())?;
        for &original in &self.originals {
            writer.write_u64::<LittleEndian>(original)?;
        }
        Ok(())
    }

    /// Replace this mapping with one read from `reader`.
    ///
    /// The mapping is only replaced after the whole input has been read and
    /// validated.
    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let first_node = reader
            .read_u64::<LittleEndian>()
            .context("Failed to read mapping header")?;
        let next_node = reader
            .read_u64::<LittleEndian>()
            .context("Failed to read mapping header")?;
        if next_node < first_node {
            bail!(
                "Invalid mapping range: next node {} is below first node {}",
                next_node,
                first_node
            );
        }
        let count = usize::try_from(next_node - first_node)
            .context("Mapping range does not fit in memory")?;

        let mut originals = Vec::new();
        for i in 0..count {
            let original = reader.read_u64::<LittleEndian>().with_context(|| {
                format!("Mapping truncated after {} of {} records", i, count)
            })?;
            if original >= first_node {
                bail!(
                    "Duplicate {} maps to {}, which is not an original node id",
                    first_node + i as NodeId,
                    original
                );
            }
            originals.push(original);
        }

        self.first_node = first_node;
        self.originals = originals;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create mapping file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
            .and_then(|_| writer.flush().map_err(Into::into))
            .with_context(|| format!("Failed to write mapping file: {}", path.display()))
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open mapping file: {}", path.display()))?;
        let mut reader = BufReader::new(file);
        self.read_from(&mut reader)
            .with_context(|| format!("Failed to load mapping file: {}", path.display()))
    }
}
