//! Stream builders shared by the integration tests and benchmarks.

#![allow(dead_code)]

use lharc_codec::{ByteHistory, LhaMethod};
use lharc_core::BitWriter;

// ============================================================================
// PMarc -pm2-
// ============================================================================

/// (base, extra bits) for literal codes 0-7.
const BYTE_RANGES: [(usize, u8); 8] = [
    (0, 3),
    (8, 3),
    (16, 4),
    (32, 5),
    (64, 5),
    (96, 5),
    (128, 6),
    (192, 6),
];

/// (base, extra bits) for copy codes 23-28.
const COPY_RANGES: [(usize, u8); 6] = [(17, 3), (25, 3), (33, 5), (65, 6), (129, 7), (257, 8)];

/// Offset-tree entries sent by the n-th rebuild (the last repeats).
const OFFSET_ENTRIES: [usize; 5] = [5, 6, 7, 8, 8];

/// Bytes until the following rebuild, after the n-th rebuild.
const PERIODS: [usize; 5] = [1024, 1024, 2048, 4096, 4096];

/// Code-tree symbols with a meaning.
pub const PM2_CODES: usize = 29;

/// Every code-tree symbol sits at this depth.
const CODE_BITS: u8 = 5;

/// Longest pm2 copy.
pub const PM2_MAX_COPY: usize = 512;

/// Furthest copy the smallest offset tree can reach.
const PM2_REACH: usize = 1024;

/// Shape of the offset trees a [`Pm2Builder`] sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetTree {
    /// Every entry at depth 3: symbol `h` is sent as `h` in 3 bits.
    Flat,
    /// Only entry `h` is used, so the decoder reads no bits for it.
    Single(usize),
}

/// Builds `-pm2-` streams from literal and copy tokens.
///
/// The code tree puts all of its symbols at depth 5, so symbol `i` is sent
/// as `i` in 5 bits. The first tree declares all 29 symbols.
pub struct Pm2Builder {
    writer: BitWriter,
    history: ByteHistory,
    output: Vec<u8>,
    rebuilds: usize,
    remaining: usize,
    overrun: usize,
    resend_trees: bool,
    resend_codes: usize,
    offset_tree: OffsetTree,
    /// Symbols declared by the code tree in force.
    code_symbols: usize,
}

impl Pm2Builder {
    pub fn new() -> Self {
        Self {
            writer: BitWriter::new(),
            history: ByteHistory::new(),
            output: Vec::new(),
            rebuilds: 0,
            remaining: 0,
            overrun: 0,
            resend_trees: false,
            resend_codes: PM2_CODES,
            offset_tree: OffsetTree::Flat,
            code_symbols: 0,
        }
    }

    /// Set the flag bit on later rebuilds and re-send identical trees.
    pub fn resend_trees(mut self, resend: bool) -> Self {
        self.resend_trees = resend;
        self
    }

    /// Re-send the code tree on later rebuilds, declaring `codes` symbols.
    ///
    /// Below 10 symbols the tree has no offset-bearing codes and the offset
    /// tree is left out of the stream.
    pub fn resend_with_codes(mut self, codes: usize) -> Self {
        assert!((1..=PM2_CODES).contains(&codes));
        self.resend_trees = true;
        self.resend_codes = codes;
        self
    }

    pub fn offset_tree(mut self, shape: OffsetTree) -> Self {
        self.offset_tree = shape;
        self
    }

    /// Bytes the stream decodes to so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.writer.bits_written()
    }

    fn needs_offset_tree(&self) -> bool {
        self.code_symbols >= 10
    }

    fn write_code_tree(&mut self, codes: usize) {
        self.writer.write_bits(codes as u32, 5);
        self.writer.write_bits(u32::from(CODE_BITS), 3);
        self.writer.write_bits(1, 3);
        for _ in 0..codes {
            self.writer.write_bits(1, 1);
        }
        self.code_symbols = codes;
    }

    fn write_offset_tree(&mut self, entries: usize) {
        if !self.needs_offset_tree() {
            return;
        }
        match self.offset_tree {
            OffsetTree::Flat => {
                for _ in 0..entries {
                    self.writer.write_bits(3, 3);
                }
            }
            OffsetTree::Single(used) => {
                assert!(used < entries, "offset symbol {} not sent yet", used);
                for entry in 0..entries {
                    self.writer.write_bits(if entry == used { 3 } else { 0 }, 3);
                }
            }
        }
    }

    fn offset_entries(&self) -> usize {
        OFFSET_ENTRIES[(self.rebuilds - 1).min(4)]
    }

    fn before_token(&mut self) {
        if self.rebuilds == 0 {
            self.writer.write_bit(false);
        }
        if self.remaining != 0 {
            return;
        }

        let stage = self.rebuilds.min(4);
        match stage {
            0 => {
                self.write_code_tree(PM2_CODES);
                self.write_offset_tree(OFFSET_ENTRIES[0]);
            }
            1 | 2 => self.write_offset_tree(OFFSET_ENTRIES[stage]),
            3 => {
                self.writer.write_bit(self.resend_trees);
                if self.resend_trees {
                    self.write_code_tree(self.resend_codes);
                }
                self.write_offset_tree(OFFSET_ENTRIES[3]);
            }
            _ => {
                self.writer.write_bit(self.resend_trees);
                if self.resend_trees {
                    self.write_code_tree(self.resend_codes);
                    self.write_offset_tree(OFFSET_ENTRIES[4]);
                }
            }
        }

        self.remaining = PERIODS[stage] - self.overrun;
        self.overrun = 0;
        self.rebuilds += 1;
    }

    fn record(&mut self, byte: u8) {
        self.history.touch(byte);
        self.output.push(byte);
        if self.remaining == 0 {
            self.overrun += 1;
        } else {
            self.remaining -= 1;
        }
    }

    fn write_code(&mut self, code: usize) {
        assert!(
            code < self.code_symbols,
            "code {} not in a {}-symbol tree",
            code,
            self.code_symbols
        );
        self.writer.write_bits(code as u32, CODE_BITS);
    }

    pub fn literal(&mut self, byte: u8) {
        self.before_token();

        let position = usize::from(self.history.position(byte));
        let code = BYTE_RANGES
            .iter()
            .rposition(|&(base, _)| base <= position)
            .unwrap();
        let (base, bits) = BYTE_RANGES[code];
        self.write_code(code);
        self.writer.write_bits((position - base) as u32, bits);

        self.record(byte);
    }

    fn write_offset(&mut self, offset: usize) {
        let high = offset >> 6;
        let symbol = if high <= 1 {
            high
        } else {
            (usize::BITS - high.leading_zeros()) as usize
        };

        match self.offset_tree {
            OffsetTree::Flat => {
                assert!(
                    symbol < self.offset_entries(),
                    "offset {} not reachable yet",
                    offset
                );
                self.writer.write_bits(symbol as u32, 3);
            }
            OffsetTree::Single(used) => {
                assert_eq!(symbol, used, "offset {} needs offset symbol {}", offset, symbol);
            }
        }
        if symbol > 1 {
            let extra = (symbol - 1) as u8;
            self.writer.write_bits((high - (1 << extra)) as u32, extra);
        }
        self.writer.write_bits((offset & 0x3f) as u32, 6);
    }

    /// Emit a copy of 2-512 bytes from `distance` bytes back.
    pub fn copy(&mut self, distance: usize, length: usize) {
        assert!((1..=8192).contains(&distance));
        assert!((2..=PM2_MAX_COPY).contains(&length));
        self.before_token();

        if length <= 16 {
            self.write_code(length + 6);
        } else {
            let range = COPY_RANGES
                .iter()
                .rposition(|&(base, _)| base <= length)
                .unwrap();
            let (base, bits) = COPY_RANGES[range];
            self.write_code(23 + range);
            self.writer.write_bits((length - base) as u32, bits);
        }

        let offset = distance - 1;
        if length == 2 {
            assert!(offset < 256, "length-2 copies reach back 256 bytes");
            self.writer.write_bits(offset as u32, 8);
        } else {
            self.write_offset(offset);
        }

        for _ in 0..length {
            let byte = if distance <= self.output.len() {
                self.output[self.output.len() - distance]
            } else {
                b' '
            };
            self.record(byte);
        }
    }

    /// The compressed stream and the bytes it decodes to.
    pub fn finish(self) -> (Vec<u8>, Vec<u8>) {
        (self.writer.finish(), self.output)
    }
}

/// Longest match for `data[pos..]` within `reach` bytes back, as
/// `(distance, length)`. Matches may overlap the bytes being matched.
fn longest_match(data: &[u8], pos: usize, reach: usize, max_len: usize) -> (usize, usize) {
    let max_len = max_len.min(data.len() - pos);
    let mut best = (0, 0);
    for distance in 1..=reach.min(pos) {
        let len = (0..max_len)
            .take_while(|&i| data[pos + i - distance] == data[pos + i])
            .count();
        if len > best.1 {
            best = (distance, len);
            if len == max_len {
                break;
            }
        }
    }
    best
}

/// Greedy encoder: the longest match within 1024 bytes, literals otherwise.
pub fn encode_pm2(data: &[u8]) -> Vec<u8> {
    let mut builder = Pm2Builder::new();
    let mut pos = 0;

    while pos < data.len() {
        let (distance, length) = longest_match(data, pos, PM2_REACH, PM2_MAX_COPY);
        if length >= 3 || (length == 2 && distance <= 256) {
            builder.copy(distance, length);
            pos += length;
        } else {
            builder.literal(data[pos]);
            pos += 1;
        }
    }

    let (stream, decoded) = builder.finish();
    debug_assert_eq!(decoded, data);
    stream
}

// ============================================================================
// LHarc -lh4- .. -lh7-
// ============================================================================

const LH_CODES: usize = 510;
const LH_TEMP_CODES: usize = 19;
const LH_MIN_MATCH: usize = 3;
pub const LH_MAX_COPY: usize = 256;

#[derive(Debug, Clone, Copy)]
enum LhToken {
    Literal(u8),
    Copy { length: usize, offset: usize },
}

/// Depths for a tree over the `used` symbols with every code within one
/// level of the others. Fewer than two used symbols leave every depth 0.
fn flat_depths(used: &[bool]) -> Vec<u8> {
    let mut depths = vec![0u8; used.len()];
    let count = used.iter().filter(|&&u| u).count();
    if count < 2 {
        return depths;
    }

    let depth = (usize::BITS - (count - 1).leading_zeros()) as u8;
    let shallow = (1usize << depth) - count;
    let symbols = used.iter().enumerate().filter(|(_, u)| **u).map(|(s, _)| s);
    for (rank, symbol) in symbols.enumerate() {
        depths[symbol] = if rank < shallow { depth - 1 } else { depth };
    }
    depths
}

/// Canonical codes: shorter codes first, symbol order within a depth.
fn canonical_codes(depths: &[u8]) -> Vec<u32> {
    let mut codes = vec![0u32; depths.len()];
    let mut code = 0u32;
    for depth in 1..=16u8 {
        for (symbol, _) in depths.iter().enumerate().filter(|(_, d)| **d == depth) {
            codes[symbol] = code;
            code += 1;
        }
        code <<= 1;
    }
    codes
}

/// A tree as the encoder sends it.
struct LhTree {
    depths: Vec<u8>,
    codes: Vec<u32>,
    /// The only used symbol, when the header names a single symbol.
    single: Option<u16>,
}

impl LhTree {
    fn new(used: &[bool]) -> Self {
        let depths = flat_depths(used);
        let codes = canonical_codes(&depths);
        let single = if depths.iter().all(|&d| d == 0) {
            Some(used.iter().position(|&u| u).unwrap_or(0) as u16)
        } else {
            None
        };
        Self {
            depths,
            codes,
            single,
        }
    }

    /// Declared symbol count: one past the last used symbol.
    fn count(&self) -> usize {
        self.depths.iter().rposition(|&d| d != 0).map_or(0, |i| i + 1)
    }

    fn write(&self, writer: &mut BitWriter, symbol: usize) {
        let depth = self.depths[symbol];
        if depth > 0 {
            writer.write_bits(self.codes[symbol], depth);
        } else {
            assert_eq!(self.single, Some(symbol as u16), "symbol {} not in tree", symbol);
        }
    }
}

fn write_depth(writer: &mut BitWriter, depth: u8) {
    if depth < 7 {
        writer.write_bits(u32::from(depth), 3);
        return;
    }
    writer.write_bits(7, 3);
    for _ in 7..depth {
        writer.write_bit(true);
    }
    writer.write_bit(false);
}

fn offset_symbol(offset: usize) -> usize {
    if offset <= 1 {
        offset
    } else {
        (usize::BITS - offset.leading_zeros()) as usize
    }
}

/// Builds `-lh4-`..`-lh7-` streams from literal and copy tokens.
///
/// Tokens are collected per block. Each block gets trees over just the
/// symbols it uses, so unused-code runs, skipped temporary-tree entries and
/// single-symbol headers all show up in ordinary streams.
pub struct LhBuilder {
    writer: BitWriter,
    output: Vec<u8>,
    history_size: usize,
    num_offsets: usize,
    offset_count_bits: u8,
    block: Vec<LhToken>,
    block_limit: usize,
}

impl LhBuilder {
    pub fn new(method: LhaMethod) -> Self {
        let history_size = method.history_size();
        assert!(
            matches!(
                method,
                LhaMethod::Lh4 | LhaMethod::Lh5 | LhaMethod::Lh6 | LhaMethod::Lh7
            ),
            "{} is not an lh method",
            method
        );
        let num_offsets = history_size.trailing_zeros() as usize + 1;
        Self {
            writer: BitWriter::new(),
            output: Vec::new(),
            history_size,
            num_offsets,
            offset_count_bits: if num_offsets < 16 { 4 } else { 5 },
            block: Vec::new(),
            block_limit: usize::from(u16::MAX),
        }
    }

    /// Close a block after this many tokens.
    pub fn block_tokens(mut self, limit: usize) -> Self {
        assert!((1..=usize::from(u16::MAX)).contains(&limit));
        self.block_limit = limit;
        self
    }

    fn push(&mut self, token: LhToken) {
        self.block.push(token);
        if self.block.len() == self.block_limit {
            self.end_block();
        }
    }

    pub fn literal(&mut self, byte: u8) {
        self.output.push(byte);
        self.push(LhToken::Literal(byte));
    }

    /// Emit a copy of 3-256 bytes from `distance` bytes back.
    pub fn copy(&mut self, distance: usize, length: usize) {
        assert!((1..=self.history_size).contains(&distance));
        assert!((LH_MIN_MATCH..=LH_MAX_COPY).contains(&length));

        for _ in 0..length {
            let byte = if distance <= self.output.len() {
                self.output[self.output.len() - distance]
            } else {
                b' '
            };
            self.output.push(byte);
        }
        self.push(LhToken::Copy {
            length,
            offset: distance - 1,
        });
    }

    /// Write the buffered tokens as one block.
    pub fn end_block(&mut self) {
        if self.block.is_empty() {
            return;
        }
        let tokens = std::mem::take(&mut self.block);

        let mut code_used = vec![false; LH_CODES];
        let mut offset_used = vec![false; self.num_offsets];
        for token in &tokens {
            match *token {
                LhToken::Literal(byte) => code_used[usize::from(byte)] = true,
                LhToken::Copy { length, offset } => {
                    code_used[256 + length - LH_MIN_MATCH] = true;
                    offset_used[offset_symbol(offset)] = true;
                }
            }
        }
        let code_tree = LhTree::new(&code_used);
        let offset_tree = LhTree::new(&offset_used);

        self.writer.write_bits(tokens.len() as u32, 16);
        self.write_code_tree(&code_tree);
        self.write_offset_tree(&offset_tree);

        for token in tokens {
            match token {
                LhToken::Literal(byte) => code_tree.write(&mut self.writer, usize::from(byte)),
                LhToken::Copy { length, offset } => {
                    code_tree.write(&mut self.writer, 256 + length - LH_MIN_MATCH);
                    let symbol = offset_symbol(offset);
                    offset_tree.write(&mut self.writer, symbol);
                    if symbol > 1 {
                        let extra = (symbol - 1) as u8;
                        self.writer
                            .write_bits((offset - (1 << extra)) as u32, extra);
                    }
                }
            }
        }
    }

    /// Temporary tree, then the code-tree depths coded through it.
    fn write_code_tree(&mut self, tree: &LhTree) {
        if let Some(symbol) = tree.single {
            self.writer.write_bits(0, 5);
            self.writer.write_bits(0, 5);
            self.writer.write_bits(0, 9);
            self.writer.write_bits(u32::from(symbol), 9);
            return;
        }

        // (temporary symbol, extra value, extra bits)
        let count = tree.count();
        let mut items = Vec::new();
        let mut i = 0;
        while i < count {
            let depth = tree.depths[i];
            if depth != 0 {
                items.push((usize::from(depth) + 2, 0, 0));
                i += 1;
                continue;
            }
            let run = tree.depths[i..count].iter().take_while(|&&d| d == 0).count();
            let taken = match run {
                1 | 2 => {
                    items.push((0, 0, 0));
                    1
                }
                3..=19 => {
                    let taken = run.min(18);
                    items.push((1, taken - 3, 4));
                    taken
                }
                _ => {
                    let taken = run.min(531);
                    items.push((2, taken - 20, 9));
                    taken
                }
            };
            i += taken;
        }

        let mut temp_used = vec![false; LH_TEMP_CODES];
        for &(symbol, _, _) in &items {
            temp_used[symbol] = true;
        }
        let temp_tree = LhTree::new(&temp_used);
        self.write_temp_tree(&temp_tree);

        self.writer.write_bits(count as u32, 9);
        for (symbol, extra, bits) in items {
            temp_tree.write(&mut self.writer, symbol);
            self.writer.write_bits(extra as u32, bits);
        }
    }

    fn write_temp_tree(&mut self, tree: &LhTree) {
        if let Some(symbol) = tree.single {
            self.writer.write_bits(0, 5);
            self.writer.write_bits(u32::from(symbol), 5);
            return;
        }

        let count = tree.count();
        self.writer.write_bits(count as u32, 5);
        let mut i = 0;
        while i < count {
            write_depth(&mut self.writer, tree.depths[i]);
            i += 1;
            if i == 3 {
                let skip = tree.depths[3..count]
                    .iter()
                    .take(3)
                    .take_while(|&&d| d == 0)
                    .count();
                self.writer.write_bits(skip as u32, 2);
                i += skip;
            }
        }
    }

    fn write_offset_tree(&mut self, tree: &LhTree) {
        let bits = self.offset_count_bits;
        if let Some(symbol) = tree.single {
            self.writer.write_bits(0, bits);
            self.writer.write_bits(u32::from(symbol), bits);
            return;
        }

        let count = tree.count();
        self.writer.write_bits(count as u32, bits);
        for &depth in &tree.depths[..count] {
            write_depth(&mut self.writer, depth);
        }
    }

    /// Bytes the stream decodes to so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// The compressed stream and the bytes it decodes to.
    pub fn finish(mut self) -> (Vec<u8>, Vec<u8>) {
        self.end_block();
        (self.writer.finish(), self.output)
    }
}

/// Greedy lh encoder: the longest match within 4 KB (or the history, if
/// smaller), literals otherwise.
pub fn encode_lh(method: LhaMethod, data: &[u8]) -> Vec<u8> {
    let mut builder = LhBuilder::new(method);
    let reach = method.history_size().min(4096);
    let mut pos = 0;

    while pos < data.len() {
        let (distance, length) = longest_match(data, pos, reach, LH_MAX_COPY);
        if length >= LH_MIN_MATCH {
            builder.copy(distance, length);
            pos += length;
        } else {
            builder.literal(data[pos]);
            pos += 1;
        }
    }

    let (stream, decoded) = builder.finish();
    debug_assert_eq!(decoded, data);
    stream
}

// ============================================================================
// Shared
// ============================================================================

/// Deterministic pseudo-random text over a small alphabet.
pub fn sample_text(len: usize, seed: u32) -> Vec<u8> {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz ABCDEF.,\n\x00\xff\x80";
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            ALPHABET[(state >> 16) as usize % ALPHABET.len()]
        })
        .collect()
}

/// Compressed stream for the LArc `-lzs-` method: literals only.
pub fn encode_lzs_literals(data: &[u8]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    for &byte in data {
        writer.write_bit(true);
        writer.write_bits(u32::from(byte), 8);
    }
    writer.finish()
}
