//! Huffman code construction.
//!
//! [`CodeBuilder::build`] runs the classic greedy merge over a min-heap and
//! returns both the [`CodeTree`] and the derived [`CodeMapping`].
//!
//! # Determinism
//!
//! Nodes live in an arena and are addressed by their creation index. Leaves
//! are created in ascending symbol order and internal nodes after them, so
//! the heap key `(frequency, node id)` breaks every tie the same way and the
//! same frequency table always yields the same codes.
//!
//! # Edge Cases
//!
//! - No symbols: empty tree, empty mapping.
//! - One distinct symbol: the root is a leaf and the symbol is assigned the
//!   one-bit code `0`, so every present symbol still costs at least one bit.

use crate::error::{HuffmanError, Result};
use crate::frequency::{FrequencyTable, SYMBOLS};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

/// Longest codeword a [`Codeword`] can hold.
pub const MAX_CODE_LEN: usize = 64;

/// A variable-length bit code, stored right-aligned in a `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Codeword {
    bits: u64,
    len: u8,
}

impl Codeword {
    /// Build a codeword from the low `len` bits of `bits`.
    ///
    /// Returns `None` if `len` is 0 or greater than [`MAX_CODE_LEN`].
    pub fn new(bits: u64, len: u8) -> Option<Self> {
        if len == 0 || len as usize > MAX_CODE_LEN {
            return None;
        }
        let mask = if len == 64 { u64::MAX } else { (1u64 << len) - 1 };
        Some(Self {
            bits: bits & mask,
            len,
        })
    }

    /// Code bits, right-aligned (first emitted bit is the most significant).
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Number of bits.
    pub fn len(&self) -> u8 {
        self.len
    }

    /// Whether `self` is a prefix of `other` (a codeword is a prefix of itself).
    pub fn is_prefix_of(&self, other: &Codeword) -> bool {
        self.len <= other.len && (other.bits >> (other.len - self.len)) == self.bits
    }
}

impl fmt::Display for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.len).rev() {
            let bit = (self.bits >> i) & 1;
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

/// Handle of a node in a [`CodeTree`] arena.
pub type NodeId = usize;

/// A node of the prefix tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        freq: u64,
    },
    Internal {
        freq: u64,
        left: NodeId,
        right: NodeId,
    },
}

impl Node {
    pub fn freq(&self) -> u64 {
        match *self {
            Node::Leaf { freq, .. } | Node::Internal { freq, .. } => freq,
        }
    }
}

/// Arena-backed Huffman tree. Every node has exactly one parent except the root.
#[derive(Debug, Clone, Default)]
pub struct CodeTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl CodeTree {
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Total number of nodes (leaves and internal).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

/// Symbol → codeword lookup shared read-only by all encoding workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMapping {
    codes: [Option<Codeword>; SYMBOLS],
}

impl CodeMapping {
    /// A mapping with no codewords.
    pub fn empty() -> Self {
        Self {
            codes: [None; SYMBOLS],
        }
    }

    /// Codeword of `symbol`, if it has one.
    #[inline]
    pub fn get(&self, symbol: u8) -> Option<Codeword> {
        self.codes[symbol as usize]
    }

    /// Number of symbols with a codeword.
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.iter().all(Option::is_none)
    }

    /// Iterate over `(symbol, codeword)`, ascending by symbol.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Codeword)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.map(|c| (symbol as u8, c)))
    }

    /// Length of the longest codeword (0 when empty).
    pub fn max_len(&self) -> u8 {
        self.iter().map(|(_, c)| c.len()).max().unwrap_or(0)
    }

    /// Exact number of payload bits needed to encode data with `table`'s counts.
    ///
    /// Symbols without a codeword are ignored.
    pub fn encoded_bits(&self, table: &FrequencyTable) -> u64 {
        table
            .iter()
            .filter_map(|(symbol, count)| self.get(symbol).map(|c| count * c.len() as u64))
            .sum()
    }

    /// Check that no codeword is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<Codeword> = self.iter().map(|(_, c)| c).collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !a.is_prefix_of(b))
        })
    }

    /// Set the codeword of `symbol`, returning the previous one.
    pub(crate) fn insert(&mut self, symbol: u8, code: Codeword) -> Option<Codeword> {
        self.codes[symbol as usize].replace(code)
    }
}

impl Default for CodeMapping {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<(u8, Codeword)> for CodeMapping {
    /// Later entries for the same symbol replace earlier ones.
    fn from_iter<I: IntoIterator<Item = (u8, Codeword)>>(iter: I) -> Self {
        let mut mapping = Self::empty();
        for (symbol, code) in iter {
            mapping.insert(symbol, code);
        }
        mapping
    }
}

/// Greedy Huffman code builder.
pub struct CodeBuilder;

impl CodeBuilder {
    /// Build the prefix tree and codeword mapping for `table`.
    ///
    /// # Errors
    /// Returns `HuffmanError::CodeLengthTooLong` if a codeword would exceed
    /// [`MAX_CODE_LEN`] bits.
    pub fn build(table: &FrequencyTable) -> Result<(CodeTree, CodeMapping)> {
        let tree = Self::build_tree(table);
        let mapping = Self::extract_codes(&tree)?;
        Ok((tree, mapping))
    }

    /// Merge the two lightest nodes until a single root remains.
    pub fn build_tree(table: &FrequencyTable) -> CodeTree {
        let mut tree = CodeTree::default();
        let mut heap = BinaryHeap::with_capacity(table.distinct());

        for (symbol, freq) in table.iter() {
            let id = tree.push(Node::Leaf { symbol, freq });
            heap.push(Reverse((freq, id)));
        }

        while heap.len() > 1 {
            let (Some(Reverse((lf, left))), Some(Reverse((rf, right)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            let freq = lf + rf;
            let id = tree.push(Node::Internal { freq, left, right });
            heap.push(Reverse((freq, id)));
        }

        tree.root = heap.pop().map(|Reverse((_, id))| id);
        tree
    }

    /// Walk the tree depth-first: a left edge appends `0`, a right edge `1`.
    pub fn extract_codes(tree: &CodeTree) -> Result<CodeMapping> {
        let mut mapping = CodeMapping::empty();
        let Some(root) = tree.root() else {
            return Ok(mapping);
        };

        if let Node::Leaf { symbol, .. } = *tree.node(root) {
            // Lone symbol: give it a one-bit code rather than an empty one
            mapping.insert(symbol, Codeword { bits: 0, len: 1 });
            return Ok(mapping);
        }

        let mut stack: Vec<(NodeId, u64, usize)> = vec![(root, 0, 0)];
        while let Some((id, bits, len)) = stack.pop() {
            match *tree.node(id) {
                Node::Leaf { symbol, .. } => {
                    mapping.insert(
                        symbol,
                        Codeword {
                            bits,
                            len: len as u8,
                        },
                    );
                }
                Node::Internal { left, right, .. } => {
                    if len == MAX_CODE_LEN {
                        return Err(HuffmanError::CodeLengthTooLong {
                            length: len + 1,
                            max: MAX_CODE_LEN,
                        }
                        .into());
                    }
                    stack.push((right, (bits << 1) | 1, len + 1));
                    stack.push((left, bits << 1, len + 1));
                }
            }
        }

        Ok(mapping)
    }
}
