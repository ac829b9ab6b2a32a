//! Depth-driven Huffman trees.
//!
//! LArc/PMarc headers transmit only the depth of each symbol. The tree is
//! then grown one level at a time in level order: every open slot is split
//! into two children, and the symbols whose depth equals the new level take
//! the open slots in queue order. The resulting slot layout is part of the
//! format, so construction order must not change.
//!
//! Nodes live in a fixed-capacity arena indexed by slot number. Slot 0 is the
//! root. Children of an internal node are always allocated after it, so every
//! walk moves to strictly larger slot numbers and terminates.

use lharc_core::bitstream::BitReader;
use lharc_core::error::Result;
use lharc_core::source::ByteSource;
use std::collections::VecDeque;

/// Maximum number of open slots tracked during construction of PMarc
/// trees.
///
/// Entries pushed past this limit are dropped. Well-formed pm2 headers never
/// get close.
pub const QUEUE_CAPACITY: usize = 32;

/// One slot of the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// Terminal node carrying a decoded symbol.
    Leaf(u16),
    /// Branch; bit 0 selects `left`, bit 1 selects `right`.
    Internal {
        /// Slot of the 0-branch child.
        left: usize,
        /// Slot of the 1-branch child (always `left + 1`).
        right: usize,
    },
}

/// Which lenient paths a build had to take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// The arena ran out of slots; some levels were left partly unexpanded.
    pub capacity_exhausted: bool,
    /// Open slots were dropped because the queue was full.
    pub queue_overflowed: bool,
    /// A symbol was placed with no open slot left; it landed on the root.
    pub queue_underflowed: bool,
    /// Slots allocated, including the root.
    pub allocated: usize,
}

impl BuildReport {
    /// True if the header described a tree that fit without any leniency.
    pub fn is_clean(&self) -> bool {
        !(self.capacity_exhausted || self.queue_overflowed || self.queue_underflowed)
    }
}

/// Bounded FIFO of open slots.
struct SlotQueue {
    slots: VecDeque<usize>,
    limit: usize,
}

impl SlotQueue {
    fn new(limit: usize) -> Self {
        Self {
            slots: VecDeque::with_capacity(limit),
            limit,
        }
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn push(&mut self, slot: usize, report: &mut BuildReport) {
        if self.slots.len() >= self.limit {
            report.queue_overflowed = true;
            return;
        }
        self.slots.push_back(slot);
    }

    /// An empty queue hands out the root slot.
    fn pop(&mut self, report: &mut BuildReport) -> usize {
        match self.slots.pop_front() {
            Some(slot) => slot,
            None => {
                report.queue_underflowed = true;
                0
            }
        }
    }
}

/// A Huffman decode tree stored in a fixed-size slot arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    queue_capacity: usize,
}

impl HuffmanTree {
    /// Create a tree with `capacity` slots, every slot a leaf for symbol 0.
    ///
    /// A fresh tree therefore decodes symbol 0 without reading any bits.
    /// Construction tracks at most [`QUEUE_CAPACITY`] open slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self::with_queue_capacity(capacity, QUEUE_CAPACITY)
    }

    /// Create a tree whose construction tracks up to `queue_capacity` open
    /// slots.
    ///
    /// LHarc code trees have up to 510 leaves and need a queue as large as
    /// the arena.
    ///
    /// # Panics
    ///
    /// Panics if either capacity is zero.
    pub fn with_queue_capacity(capacity: usize, queue_capacity: usize) -> Self {
        assert!(capacity > 0, "tree capacity must be greater than 0");
        assert!(queue_capacity > 0, "queue capacity must be greater than 0");
        Self {
            nodes: vec![Node::Leaf(0); capacity],
            queue_capacity,
        }
    }

    /// Number of slots in the arena.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// The slot arena, root first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return every slot to the leaf-0 default.
    pub fn reset(&mut self) {
        self.nodes.fill(Node::Leaf(0));
    }

    /// Make the tree a single leaf at the root.
    ///
    /// Decoding then yields `symbol` without consuming any bits.
    pub fn set_single(&mut self, symbol: u16) {
        self.reset();
        self.nodes[0] = Node::Leaf(symbol);
    }

    /// Build the tree from per-symbol depths (0 = symbol unused).
    ///
    /// Never writes outside the arena. Malformed depth tables produce a
    /// degraded tree; the returned report says which limits were hit.
    pub fn build(&mut self, lengths: &[u8]) -> BuildReport {
        self.reset();

        let capacity = self.nodes.len();
        let mut report = BuildReport {
            allocated: 1,
            ..BuildReport::default()
        };
        let mut queue = SlotQueue::new(self.queue_capacity);
        queue.push(0, &mut report);

        let mut depth = 0u8;
        loop {
            // Split every open slot; the open slots move one level down.
            let pending = queue.len();
            for _ in 0..pending {
                if report.allocated + 1 >= capacity {
                    report.capacity_exhausted = true;
                    break;
                }
                let left = report.allocated;
                report.allocated += 2;

                let slot = queue.pop(&mut report);
                self.nodes[slot] = Node::Internal {
                    left,
                    right: left + 1,
                };
                queue.push(left, &mut report);
                queue.push(left + 1, &mut report);
            }
            depth += 1;

            let mut deeper = false;
            for (symbol, &len) in lengths.iter().enumerate() {
                if len == depth {
                    let slot = queue.pop(&mut report);
                    self.nodes[slot] = Node::Leaf(symbol as u16);
                } else if len > depth {
                    deeper = true;
                }
            }

            if !deeper {
                break;
            }
        }

        log::trace!(
            "built tree: {} symbols, {} of {} slots, depth {}",
            lengths.iter().filter(|&&len| len != 0).count(),
            report.allocated,
            capacity,
            depth
        );
        if !report.is_clean() {
            log::warn!("malformed tree header, built degraded tree: {:?}", report);
        }

        report
    }

    /// Walk from the root to a leaf, one bit per branch.
    ///
    /// Fails with the reader's end-of-stream error if input runs out
    /// mid-walk.
    pub fn decode<S: ByteSource>(&self, reader: &mut BitReader<S>) -> Result<u16> {
        let mut node = self.nodes[0];
        loop {
            match node {
                Node::Leaf(symbol) => return Ok(symbol),
                Node::Internal { left, right } => {
                    let next = if reader.read_bit()? { right } else { left };
                    node = self.nodes[next];
                }
            }
        }
    }
}
