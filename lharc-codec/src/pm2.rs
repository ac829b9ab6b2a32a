//! PMarc `-pm2-` decoder.
//!
//! PMarc is an LHA variant common on MSX machines. A pm2 stream carries two
//! depth-coded Huffman trees:
//!
//! - the **code tree** (up to 29 symbols): codes 0-7 select a literal via the
//!   move-to-front [`ByteHistory`], codes 8-28 are copies of 2-512 bytes;
//! - the **offset tree** (5-8 symbols): the high bits of a copy distance.
//!
//! The trees are re-sent on a schedule keyed to the number of bytes output,
//! widening the offset alphabet as more history becomes reachable:
//!
//! | State   | Rebuild reads                                   | Next    | Countdown |
//! |---------|-------------------------------------------------|---------|-----------|
//! | Unbuilt | code tree, 5-entry offset tree                  | Build1  | 1024      |
//! | Build1  | 6-entry offset tree                             | Build2  | 1024      |
//! | Build2  | 7-entry offset tree                             | Build3  | 2048      |
//! | Build3  | flag; code tree if set; 8-entry offset tree     | Steady  | 4096      |
//! | Steady  | flag; code tree and 8-entry offset tree if set  | Steady  | 4096      |
//!
//! The countdown is checked before each symbol is decoded. Bytes a copy emits
//! after the countdown reached zero are charged to the next period, which
//! consumes bits in exactly the order an immediate mid-copy rebuild would.

use crate::config::DecoderConfig;
use crate::history::ByteHistory;
use crate::tree::{BuildReport, HuffmanTree};
use lharc_core::bitstream::BitReader;
use lharc_core::error::{LharcError, Result};
use lharc_core::ringbuffer::{RingBuffer, sizes};
use lharc_core::source::ByteSource;
use lharc_core::traits::Decoder;

/// Size of the history ring buffer.
pub const RING_BUFFER_SIZE: usize = sizes::PM2;

/// Longest copy, and so the most one `produce` call can emit.
pub const MAX_OUTPUT: usize = 512;

/// Byte the ring buffer starts out filled with.
const RING_FILL: u8 = b' ';

/// Slots in the code tree arena (2 * 32 + 1).
const CODE_TREE_SLOTS: usize = 65;

/// Slots in the offset tree arena (2 * 8 + 1).
const OFFSET_TREE_SLOTS: usize = 17;

/// The 5-bit symbol count allows at most 31 code-tree symbols.
const MAX_CODES: usize = 31;

/// Offset-tree symbols in the widest stage.
const MAX_OFFSET_CODES: usize = 8;

/// Code-tree symbols below this value are literals.
const LITERAL_CODES: u16 = 8;

/// Copy codes below this (relative to the first copy code) encode the
/// length directly.
const SHORT_COPY_CODES: u16 = 15;

/// Highest code-tree symbol with a meaning.
const MAX_CODE: u16 = 28;

/// A value range encoded as a base plus raw extra bits.
#[derive(Debug, Clone, Copy)]
struct VariableRange {
    base: u16,
    bits: u8,
}

/// History positions selected by literal codes 0-7.
const BYTE_RANGES: [VariableRange; 8] = [
    VariableRange { base: 0, bits: 3 },
    VariableRange { base: 8, bits: 3 },
    VariableRange { base: 16, bits: 4 },
    VariableRange { base: 32, bits: 5 },
    VariableRange { base: 64, bits: 5 },
    VariableRange { base: 96, bits: 5 },
    VariableRange { base: 128, bits: 6 },
    VariableRange { base: 192, bits: 6 },
];

/// Copy lengths selected by codes 23-28.
const COPY_RANGES: [VariableRange; 6] = [
    VariableRange { base: 17, bits: 3 },
    VariableRange { base: 25, bits: 3 },
    VariableRange { base: 33, bits: 5 },
    VariableRange { base: 65, bits: 6 },
    VariableRange { base: 129, bits: 7 },
    VariableRange { base: 257, bits: 8 },
];

/// Position in the tree rebuild schedule.
///
/// The state names the rebuild that runs when the countdown next reaches
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildState {
    /// Start of stream; no trees read yet.
    Unbuilt,
    /// Next rebuild after 1 KiB of output.
    Build1,
    /// Next rebuild after 2 KiB of output.
    Build2,
    /// Next rebuild after 4 KiB of output.
    Build3,
    /// Rebuilds at 8 KiB and every 4 KiB after that.
    Steady,
}

impl RebuildState {
    /// Number of offset-tree entries this state's rebuild reads.
    pub fn offset_entries(self) -> usize {
        match self {
            Self::Unbuilt => 5,
            Self::Build1 => 6,
            Self::Build2 => 7,
            Self::Build3 | Self::Steady => MAX_OFFSET_CODES,
        }
    }

    /// State after this rebuild, and bytes until the one after it.
    pub fn next(self) -> (Self, usize) {
        match self {
            Self::Unbuilt => (Self::Build1, 1024),
            Self::Build1 => (Self::Build2, 1024),
            Self::Build2 => (Self::Build3, 2048),
            Self::Build3 => (Self::Steady, 4096),
            Self::Steady => (Self::Steady, 4096),
        }
    }
}

/// Decode session for one `-pm2-` stream.
#[derive(Debug)]
pub struct Pm2Decoder<S: ByteSource> {
    reader: BitReader<S>,
    config: DecoderConfig,
    state: RebuildState,
    /// Bytes left until the next rebuild.
    rebuild_remaining: usize,
    /// Bytes emitted since the countdown reached zero.
    rebuild_overrun: usize,
    ring: RingBuffer,
    history: ByteHistory,
    code_tree: HuffmanTree,
    offset_tree: HuffmanTree,
    /// Whether the current code tree can produce codes that read an offset.
    need_offset_tree: bool,
    bytes_produced: u64,
}

impl<S: ByteSource> Pm2Decoder<S> {
    /// Create a decoder with the default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, DecoderConfig::default())
    }

    /// Create a decoder with an explicit configuration.
    pub fn with_config(source: S, config: DecoderConfig) -> Self {
        Self {
            reader: BitReader::with_chunk_size(source, config.input_chunk),
            config,
            state: RebuildState::Unbuilt,
            rebuild_remaining: 0,
            rebuild_overrun: 0,
            ring: RingBuffer::new(RING_BUFFER_SIZE, RING_FILL),
            history: ByteHistory::new(),
            code_tree: HuffmanTree::new(CODE_TREE_SLOTS),
            offset_tree: HuffmanTree::new(OFFSET_TREE_SLOTS),
            need_offset_tree: false,
            bytes_produced: 0,
        }
    }

    /// Current position in the rebuild schedule.
    ///
    /// The state advances lazily: when the countdown reaches zero it stays
    /// put until the next [`Decoder::produce`] call, which reads the tree
    /// headers before decoding its symbol. Use [`rebuild_due`] to tell the
    /// two apart.
    ///
    /// [`rebuild_due`]: Self::rebuild_due
    pub fn rebuild_state(&self) -> RebuildState {
        self.state
    }

    /// True if the next `produce` call starts by reading tree headers.
    ///
    /// Holds for a fresh session and whenever the countdown has run out.
    pub fn rebuild_due(&self) -> bool {
        self.rebuild_remaining == 0
    }

    /// Bytes left before the next rebuild runs.
    pub fn rebuild_remaining(&self) -> usize {
        self.rebuild_remaining
    }

    /// Total bits consumed from the source.
    pub fn bits_read(&self) -> u64 {
        self.reader.bits_read()
    }

    fn check_tree(&self, report: BuildReport, which: &str) -> Result<()> {
        if self.config.strict_trees && !report.is_clean() {
            return Err(LharcError::corrupted(
                self.bytes_produced,
                format!("malformed {} tree header: {:?}", which, report),
            ));
        }
        Ok(())
    }

    /// Read the code-tree header and rebuild the code tree.
    fn read_code_tree(&mut self) -> Result<()> {
        let num_codes = usize::from(self.reader.read_bits(5)?);
        let min_code_length = self.reader.read_bits(3)? as u8;

        self.need_offset_tree = num_codes >= 10 && !(num_codes == 29 && min_code_length == 0);

        if min_code_length == 0 {
            if num_codes == 0 {
                return Err(LharcError::corrupted(
                    self.bytes_produced,
                    "code tree declares no symbols",
                ));
            }
            self.code_tree.set_single((num_codes - 1) as u16);
            return Ok(());
        }

        let length_bits = self.reader.read_bits(3)? as u8;
        let mut lengths = [0u8; MAX_CODES];
        for length in lengths.iter_mut().take(num_codes) {
            // 0 marks an unused code; otherwise an offset from the minimum.
            let value = self.reader.read_bits(length_bits)? as u8;
            *length = if value == 0 {
                0
            } else {
                min_code_length + value - 1
            };
        }

        let report = self.code_tree.build(&lengths[..num_codes]);
        self.check_tree(report, "code")
    }

    /// Read `num_offsets` 3-bit depths and rebuild the offset tree.
    ///
    /// Nothing is read while the code tree has no offset-bearing codes.
    fn read_offset_tree(&mut self, num_offsets: usize) -> Result<()> {
        if !self.need_offset_tree {
            return Ok(());
        }

        let mut lengths = [0u8; MAX_OFFSET_CODES];
        let mut used = 0;
        let mut last_used = 0u16;
        for (offset, length) in lengths.iter_mut().take(num_offsets).enumerate() {
            *length = self.reader.read_bits(3)? as u8;
            if *length != 0 {
                used += 1;
                last_used = offset as u16;
            }
        }

        if used == 1 {
            self.offset_tree.set_single(last_used);
            return Ok(());
        }

        let report = self.offset_tree.build(&lengths[..num_offsets]);
        self.check_tree(report, "offset")
    }

    /// Run the rebuild due in the current state and advance the schedule.
    fn rebuild(&mut self) -> Result<()> {
        let state = self.state;
        match state {
            RebuildState::Unbuilt => {
                self.read_code_tree()?;
                self.read_offset_tree(state.offset_entries())?;
            }
            RebuildState::Build1 | RebuildState::Build2 => {
                self.read_offset_tree(state.offset_entries())?;
            }
            RebuildState::Build3 => {
                if self.reader.read_bit()? {
                    self.read_code_tree()?;
                }
                self.read_offset_tree(state.offset_entries())?;
            }
            RebuildState::Steady => {
                if self.reader.read_bit()? {
                    self.read_code_tree()?;
                    self.read_offset_tree(state.offset_entries())?;
                }
            }
        }

        let (next, period) = state.next();
        log::debug!(
            "pm2 rebuild {:?} -> {:?} after {} bytes",
            state,
            next,
            self.bytes_produced
        );
        self.state = next;
        self.rebuild_remaining = period.saturating_sub(self.rebuild_overrun);
        self.rebuild_overrun = 0;
        Ok(())
    }

    /// Output one byte: record it in both histories and count it down.
    fn emit(&mut self, byte: u8, out: &mut Vec<u8>) {
        self.ring.push(byte);
        self.history.touch(byte);
        out.push(byte);
        self.bytes_produced += 1;

        if self.rebuild_remaining == 0 {
            self.rebuild_overrun += 1;
        } else {
            self.rebuild_remaining -= 1;
        }
    }

    fn read_range(&mut self, range: VariableRange) -> Result<u16> {
        Ok(range.base + self.reader.read_bits(range.bits)?)
    }

    fn decode_literal(&mut self, code: u16, out: &mut Vec<u8>) -> Result<()> {
        let position = self.read_range(BYTE_RANGES[usize::from(code)])?;
        let byte = self.history.find(position as u8);
        self.emit(byte, out);
        Ok(())
    }

    /// Decode the distance for a copy that uses the offset tree.
    fn read_offset(&mut self) -> Result<usize> {
        let code = self.offset_tree.decode(&mut self.reader)?;
        let high = if code <= 1 {
            usize::from(code)
        } else {
            let extra = (code - 1) as u8;
            (1 << extra) | usize::from(self.reader.read_bits(extra)?)
        };
        Ok((high << 6) | usize::from(self.reader.read_bits(6)?))
    }

    fn decode_copy(&mut self, copy_code: u16, out: &mut Vec<u8>) -> Result<()> {
        let length = if copy_code < SHORT_COPY_CODES {
            usize::from(copy_code) + 2
        } else {
            let range = COPY_RANGES[usize::from(copy_code - SHORT_COPY_CODES)];
            usize::from(self.read_range(range)?)
        };

        // Two-byte copies reach back at most 256 bytes and skip the tree.
        let offset = if copy_code == 0 {
            usize::from(self.reader.read_bits(8)?)
        } else {
            self.read_offset()?
        };

        let distance = offset + 1;
        for _ in 0..length {
            let byte = self.ring.read_at(distance);
            self.emit(byte, out);
        }
        Ok(())
    }
}

impl<S: ByteSource> Decoder for Pm2Decoder<S> {
    fn max_output(&self) -> usize {
        MAX_OUTPUT
    }

    fn produce(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        if self.state == RebuildState::Unbuilt {
            // The first bit of every pm2 stream is padding.
            self.reader.read_bit()?;
        }
        if self.rebuild_remaining == 0 {
            self.rebuild()?;
        }

        let start = out.len();
        let code = self.code_tree.decode(&mut self.reader)?;
        match code {
            0..LITERAL_CODES => self.decode_literal(code, out)?,
            LITERAL_CODES..=MAX_CODE => self.decode_copy(code - LITERAL_CODES, out)?,
            _ => {
                return Err(LharcError::corrupted(
                    self.bytes_produced,
                    format!("invalid pm2 code {}", code),
                ));
            }
        }

        Ok(out.len() - start)
    }

    fn bytes_produced(&self) -> u64 {
        self.bytes_produced
    }
}
