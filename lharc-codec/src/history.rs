//! Move-to-front byte history used by PMarc literals.
//!
//! PMarc does not transmit literal bytes directly. A literal code names how
//! far back in the list of recently used byte values the wanted byte sits,
//! and every byte that is output moves to the front of that list.
//!
//! The list is circular and doubly linked over all 256 byte values, so both
//! "k-th most recent" and "k-th least recent" are short walks.

/// A link pair for one byte value.
#[derive(Debug, Clone, Copy, Default)]
struct Link {
    /// Next older entry.
    older: u8,
    /// Next newer entry (from the head this wraps to the oldest).
    newer: u8,
}

/// Circular move-to-front list of byte values.
#[derive(Debug, Clone)]
pub struct ByteHistory {
    links: [Link; 256],
    head: u8,
}

impl Default for ByteHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteHistory {
    /// Create the list in PMarc's initial order.
    ///
    /// From the head: 0x20..=0x7f, 0x00..=0x1f, 0xa0..=0xdf, 0x80..=0x9f,
    /// 0xe0..=0xff.
    pub fn new() -> Self {
        let mut links = [Link::default(); 256];
        for (i, link) in links.iter_mut().enumerate() {
            let i = i as u8;
            link.older = i.wrapping_add(1);
            link.newer = i.wrapping_sub(1);
        }

        let mut history = Self { links, head: 0x20 };
        for (from, to) in [
            (0x7f, 0x00),
            (0x1f, 0xa0),
            (0xdf, 0x80),
            (0x9f, 0xe0),
            (0xff, 0x20),
        ] {
            history.link(from, to);
        }
        history
    }

    /// Make `older` follow `newer` in the list.
    fn link(&mut self, newer: u8, older: u8) {
        self.links[usize::from(newer)].older = older;
        self.links[usize::from(older)].newer = newer;
    }

    /// The most recently used byte.
    pub fn head(&self) -> u8 {
        self.head
    }

    /// The byte `count` steps back from the head (0 = the head itself).
    pub fn find(&self, count: u8) -> u8 {
        let mut node = self.head;
        if count < 128 {
            for _ in 0..count {
                node = self.links[usize::from(node)].older;
            }
        } else {
            for _ in 0..(256 - usize::from(count)) {
                node = self.links[usize::from(node)].newer;
            }
        }
        node
    }

    /// Position of `byte` counting back from the head.
    pub fn position(&self, byte: u8) -> u8 {
        let mut node = self.head;
        let mut count = 0u8;
        while node != byte {
            node = self.links[usize::from(node)].older;
            count = count.wrapping_add(1);
        }
        count
    }

    /// Move `byte` to the head of the list.
    pub fn touch(&mut self, byte: u8) {
        if self.head == byte {
            return;
        }

        let Link { older, newer } = self.links[usize::from(byte)];
        self.link(newer, older);

        let oldest = self.links[usize::from(self.head)].newer;
        self.link(byte, self.head);
        self.link(oldest, byte);
        self.head = byte;
    }
}
