use std::cmp::Ordering;
use std::fmt;

/// Node identifier. Identifier `0` is reserved for the end-of-thread marker.
pub type NodeId = u64;

/// Largest identifier a handle can carry next to its orientation bit.
pub const MAX_NODE_ID: NodeId = (1 << 63) - 1;

/// A handle represents an oriented reference to a node in the graph.
/// The least significant bit (LSB) indicates orientation:
/// - 0 = forward strand
/// - 1 = reverse strand
/// The remaining bits store the node ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Handle(u64);

/// Marks the end of a haplotype thread in thread index transitions.
pub const ENDMARKER: Handle = Handle(0);

impl Handle {
    /// Create a new handle with the given node ID and orientation
    pub fn new(node_id: NodeId, is_reverse: bool) -> Self {
        debug_assert!(node_id <= MAX_NODE_ID, "node id {} does not fit in a handle", node_id);
        Handle((node_id << 1) | is_reverse as u64)
    }

    /// Create a forward handle for the given node ID
    pub fn forward(node_id: NodeId) -> Self {
        Self::new(node_id, false)
    }

    /// Create a reverse handle for the given node ID
    pub fn reverse(node_id: NodeId) -> Self {
        Self::new(node_id, true)
    }

    /// Get the node ID from this handle
    pub fn id(&self) -> NodeId {
        self.0 >> 1
    }

    /// Check if this handle is in reverse orientation
    pub fn is_reverse(&self) -> bool {
        (self.0 & 1) == 1
    }

    /// Get the orientation sign as a char ('+' or '-')
    pub fn orientation_char(&self) -> char {
        if self.is_reverse() {
            '-'
        } else {
            '+'
        }
    }

    /// Flip the orientation of this handle
    pub fn flip(&self) -> Self {
        Handle(self.0 ^ 1)
    }

    /// Same orientation, different node.
    pub fn with_id(&self, node_id: NodeId) -> Self {
        Self::new(node_id, self.is_reverse())
    }
}

// Handles order as (id, is_reverse) pairs with forward before reverse.
impl Ord for Handle {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.id(), self.is_reverse()).cmp(&(other.id(), other.is_reverse()))
    }
}

impl PartialOrd for Handle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.id(), self.orientation_char())
    }
}

/// An edge in the bidirected graph.
///
/// `Edge::new(a, b)` and `Edge::new(b.flip(), a.flip())` describe the same
/// connection; both construct the same canonical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    from: Handle,
    to: Handle,
}

impl Edge {
    /// Create the canonical edge for the traversal `from -> to`
    pub fn new(from: Handle, to: Handle) -> Self {
        let forward = Edge { from, to };
        let reverse = Edge {
            from: to.flip(),
            to: from.flip(),
        };
        forward.min(reverse)
    }

    pub fn from(&self) -> Handle {
        self.from
    }

    pub fn to(&self) -> Handle {
        self.to
    }

    /// Where the edge leads when entered through `handle`, if it starts there.
    pub fn follow(&self, handle: Handle) -> Option<Handle> {
        if self.from == handle {
            Some(self.to)
        } else if self.to == handle.flip() {
            Some(self.from.flip())
        } else {
            None
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// An oriented walk through the graph.
///
/// Walks compare lexicographically by their handles, so a walk and its
/// reverse complement have a well-defined canonical representative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Walk(Vec<Handle>);

impl Walk {
    pub fn new(handles: Vec<Handle>) -> Self {
        Walk(handles)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, handle: Handle) {
        self.0.push(handle);
    }

    pub fn handles(&self) -> &[Handle] {
        &self.0
    }

    /// Traverse the walk end-to-start with every strand flipped
    pub fn reverse_complement(&self) -> Walk {
        Walk(self.0.iter().rev().map(Handle::flip).collect())
    }

    /// The smaller of the walk and its reverse complement
    pub fn canonical_form(self) -> Walk {
        let reverse = self.reverse_complement();
        self.min(reverse)
    }
}

impl From<Vec<Handle>> for Walk {
    fn from(handles: Vec<Handle>) -> Self {
        Walk(handles)
    }
}

impl std::ops::Index<usize> for Walk {
    type Output = Handle;

    fn index(&self, index: usize) -> &Handle {
        &self.0[index]
    }
}
