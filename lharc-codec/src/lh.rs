//! LHarc `-lh4-` to `-lh7-` decoders.
//!
//! The four methods share one bit layout and differ only in history size.
//! A stream is a run of blocks. Each block header carries a symbol count and
//! three depth-coded trees, read in this order:
//!
//! - the **temporary tree** (up to 19 symbols), used only to read the code
//!   tree depths;
//! - the **code tree** (up to 510 symbols): codes 0-255 are literals,
//!   256-509 are copies of 3-256 bytes;
//! - the **offset tree**: the bit length of a copy distance.
//!
//! Code-tree depths are run-length coded through the temporary tree: symbols
//! 0-2 stand for runs of unused codes and symbol `n >= 3` for depth `n - 2`.
//! Any tree header may instead name a single symbol, which then decodes
//! without consuming bits.

use crate::config::DecoderConfig;
use crate::methods::LhaMethod;
use crate::tree::{BuildReport, HuffmanTree};
use lharc_core::bitstream::BitReader;
use lharc_core::error::{LharcError, Result};
use lharc_core::ringbuffer::RingBuffer;
use lharc_core::source::ByteSource;
use lharc_core::traits::Decoder;

/// Longest copy, and so the most one `produce` call can emit.
pub const MAX_OUTPUT: usize = 256;

/// Byte the history starts out filled with.
const RING_FILL: u8 = b' ';

/// Symbols in the temporary tree.
const NUM_TEMP_CODES: usize = 19;

/// Symbols in the code tree: 256 literals plus copy lengths 3-256.
const NUM_CODES: usize = 510;

/// Offset-tree symbols for the widest history (lh7).
const MAX_OFFSET_CODES: usize = 17;

/// Code-tree symbols below this value are literals.
const LITERAL_CODES: u16 = 256;

/// Shortest copy.
const MIN_MATCH: usize = 3;

/// Deepest code any tree may assign.
const MAX_DEPTH: u16 = 16;

/// A 2-bit count of skipped temporary-tree entries follows this many depths.
const TEMP_SKIP_POSITION: usize = 3;

const TEMP_TREE_SLOTS: usize = 2 * NUM_TEMP_CODES + 1;
const CODE_TREE_SLOTS: usize = 2 * NUM_CODES + 1;
const OFFSET_TREE_SLOTS: usize = 2 * MAX_OFFSET_CODES + 1;

/// Offset-tree symbol count and width of its header field.
fn offset_layout(method: LhaMethod) -> Option<(usize, u8)> {
    match method {
        LhaMethod::Lh4 => Some((13, 4)),
        LhaMethod::Lh5 => Some((14, 4)),
        LhaMethod::Lh6 => Some((16, 5)),
        LhaMethod::Lh7 => Some((17, 5)),
        _ => None,
    }
}

fn wide_tree(slots: usize) -> HuffmanTree {
    HuffmanTree::with_queue_capacity(slots, slots)
}

/// Decode session for one `-lh4-`..`-lh7-` stream.
#[derive(Debug)]
pub struct LhDecoder<S: ByteSource> {
    reader: BitReader<S>,
    config: DecoderConfig,
    method: LhaMethod,
    ring: RingBuffer,
    temp_tree: HuffmanTree,
    code_tree: HuffmanTree,
    offset_tree: HuffmanTree,
    num_offsets: usize,
    offset_count_bits: u8,
    /// Symbols left in the current block.
    block_remaining: usize,
    blocks_read: u64,
    bytes_produced: u64,
}

impl<S: ByteSource> LhDecoder<S> {
    /// Create a decoder with the default configuration.
    pub fn new(method: LhaMethod, source: S) -> Result<Self> {
        Self::with_config(method, source, DecoderConfig::default())
    }

    /// Create a decoder with an explicit configuration.
    ///
    /// Fails with [`LharcError::InvalidParameter`] unless `method` is one of
    /// lh4 to lh7.
    pub fn with_config(method: LhaMethod, source: S, config: DecoderConfig) -> Result<Self> {
        let Some((num_offsets, offset_count_bits)) = offset_layout(method) else {
            return Err(LharcError::invalid_parameter(format!(
                "{} is not a static-Huffman lh method",
                method
            )));
        };

        Ok(Self {
            reader: BitReader::with_chunk_size(source, config.input_chunk),
            config,
            method,
            ring: RingBuffer::new(method.history_size(), RING_FILL),
            temp_tree: wide_tree(TEMP_TREE_SLOTS),
            code_tree: wide_tree(CODE_TREE_SLOTS),
            offset_tree: wide_tree(OFFSET_TREE_SLOTS),
            num_offsets,
            offset_count_bits,
            block_remaining: 0,
            blocks_read: 0,
            bytes_produced: 0,
        })
    }

    /// The method this session decodes.
    pub fn method(&self) -> LhaMethod {
        self.method
    }

    /// Block headers read so far.
    pub fn blocks_read(&self) -> u64 {
        self.blocks_read
    }

    /// Symbols left in the current block.
    pub fn block_remaining(&self) -> usize {
        self.block_remaining
    }

    /// Total bits consumed from the source.
    pub fn bits_read(&self) -> u64 {
        self.reader.bits_read()
    }

    fn corrupted(&self, message: impl Into<String>) -> LharcError {
        LharcError::corrupted(self.bytes_produced, message)
    }

    fn check_tree(&self, report: BuildReport, which: &str) -> Result<()> {
        if self.config.strict_trees && !report.is_clean() {
            return Err(self.corrupted(format!("malformed {} tree header: {:?}", which, report)));
        }
        Ok(())
    }

    /// A 3-bit depth; 7 is extended by a run of 1 bits.
    fn read_depth(&mut self) -> Result<u8> {
        let mut depth = self.reader.read_bits(3)?;
        if depth == 7 {
            while self.reader.read_bit()? {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(self.corrupted("tree depth exceeds 16"));
                }
            }
        }
        Ok(depth as u8)
    }

    fn read_temp_tree(&mut self) -> Result<()> {
        let count = usize::from(self.reader.read_bits(5)?);
        if count == 0 {
            let symbol = self.reader.read_bits(5)?;
            self.temp_tree.set_single(symbol);
            return Ok(());
        }
        if count > NUM_TEMP_CODES {
            return Err(self.corrupted(format!("temporary tree declares {} symbols", count)));
        }

        let mut depths = [0u8; NUM_TEMP_CODES];
        let mut i = 0;
        while i < count {
            depths[i] = self.read_depth()?;
            i += 1;
            if i == TEMP_SKIP_POSITION {
                i += usize::from(self.reader.read_bits(2)?);
            }
        }

        let report = self.temp_tree.build(&depths[..count]);
        self.check_tree(report, "temporary")
    }

    fn read_code_tree(&mut self) -> Result<()> {
        let count = usize::from(self.reader.read_bits(9)?);
        if count == 0 {
            let symbol = self.reader.read_bits(9)?;
            self.code_tree.set_single(symbol);
            return Ok(());
        }
        if count > NUM_CODES {
            return Err(self.corrupted(format!("code tree declares {} symbols", count)));
        }

        let mut depths = [0u8; NUM_CODES];
        let mut i = 0;
        while i < count {
            let run = match self.temp_tree.decode(&mut self.reader)? {
                0 => 1,
                1 => usize::from(self.reader.read_bits(4)?) + 3,
                2 => usize::from(self.reader.read_bits(9)?) + 20,
                symbol => {
                    let depth = symbol - 2;
                    if depth > MAX_DEPTH {
                        return Err(self.corrupted(format!("code depth {}", depth)));
                    }
                    depths[i] = depth as u8;
                    i += 1;
                    continue;
                }
            };
            // Runs of unused codes are clipped at the declared count.
            i = (i + run).min(count);
        }

        let report = self.code_tree.build(&depths[..count]);
        self.check_tree(report, "code")
    }

    fn read_offset_tree(&mut self) -> Result<()> {
        let count = usize::from(self.reader.read_bits(self.offset_count_bits)?);
        if count == 0 {
            let symbol = self.reader.read_bits(self.offset_count_bits)?;
            self.offset_tree.set_single(symbol);
            return Ok(());
        }
        if count > self.num_offsets {
            return Err(self.corrupted(format!("offset tree declares {} symbols", count)));
        }

        let mut depths = [0u8; MAX_OFFSET_CODES];
        for depth in depths.iter_mut().take(count) {
            *depth = self.read_depth()?;
        }

        let report = self.offset_tree.build(&depths[..count]);
        self.check_tree(report, "offset")
    }

    /// Read a block header: symbol count and the three trees.
    fn start_block(&mut self) -> Result<()> {
        let symbols = usize::from(self.reader.read_bits(16)?);
        self.read_temp_tree()?;
        self.read_code_tree()?;
        self.read_offset_tree()?;

        self.block_remaining = symbols;
        self.blocks_read += 1;
        log::debug!(
            "{} block {}: {} symbols after {} bytes",
            self.method,
            self.blocks_read,
            symbols,
            self.bytes_produced
        );
        Ok(())
    }

    fn emit(&mut self, byte: u8, out: &mut Vec<u8>) {
        self.ring.push(byte);
        out.push(byte);
        self.bytes_produced += 1;
    }

    /// Decode a copy offset (distance minus one).
    fn read_offset(&mut self) -> Result<usize> {
        let code = self.offset_tree.decode(&mut self.reader)?;
        if usize::from(code) >= self.num_offsets {
            return Err(self.corrupted(format!("invalid {} offset code {}", self.method, code)));
        }
        if code <= 1 {
            return Ok(usize::from(code));
        }
        let extra = (code - 1) as u8;
        Ok((1 << extra) | usize::from(self.reader.read_bits(extra)?))
    }
}

impl<S: ByteSource> Decoder for LhDecoder<S> {
    fn max_output(&self) -> usize {
        MAX_OUTPUT
    }

    fn produce(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        // Empty blocks carry trees but no symbols.
        while self.block_remaining == 0 {
            self.start_block()?;
        }

        let code = self.code_tree.decode(&mut self.reader)?;
        self.block_remaining -= 1;

        if code < LITERAL_CODES {
            self.emit(code as u8, out);
            return Ok(1);
        }
        if usize::from(code) >= NUM_CODES {
            return Err(self.corrupted(format!("invalid {} code {}", self.method, code)));
        }

        let length = usize::from(code - LITERAL_CODES) + MIN_MATCH;
        let distance = self.read_offset()? + 1;
        for _ in 0..length {
            let byte = self.ring.read_at(distance);
            self.emit(byte, out);
        }
        Ok(length)
    }

    fn bytes_produced(&self) -> u64 {
        self.bytes_produced
    }
}
