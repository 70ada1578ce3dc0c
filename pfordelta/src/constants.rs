// Doing bit packing math with u32 throughout keeps header/payload words
// uniform with the on-disk format, which is itself a stream of 32-bit words.
pub type Bitlen = u32;

/// Candidate bit widths OPT-PForDelta searches over, in search order.
/// Treated as configuration data, not code (spec design note).
pub const CANDIDATE_WIDTHS: [Bitlen; 17] = [
  0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 16, 20, 32,
];

/// Default block size for PForDelta/OPT-PForDelta blocks.
pub const DEFAULT_BLOCK_SIZE: usize = 128;

pub const SIMPLE16_SELECTOR_BITS: u32 = 4;
pub const SIMPLE16_NUM_SELECTORS: usize = 16;

// container file format
pub const MAGIC: u32 = 0x50_46_44_31; // ascii "PFD1"
pub const VMAJOR: u32 = 1;
pub const VMINOR: u32 = 0;

/// ContainerHeader size, in 32-bit words: magic, vmajor, vminor, rs_num,
/// rs_pos, rs_len (2 words), rs_lenmax (2 words).
pub const HEADERSZ: usize = 9;

/// Per-TOCEntry size, in 32-bit words: num, first_doc, cmp_offset (2 words).
pub const EACH_HEADER_TOC_SZ: usize = 4;

/// Lists of length `<= SKIP` are skipped by the container writer.
pub const DEFAULT_SKIP: u32 = 1;

/// Lists of length `>= MAX_LEN` are skipped by the container writer. The
/// source leaves this "some large bound"; we pick a size that keeps the
/// two preallocated scratch buffers (§5) a modest handful of megabytes by
/// default rather than the hundreds the source's `MAXLEN` implies.
pub const DEFAULT_MAX_LEN: u32 = 1 << 20;

/// Checkpoint the TOC/cmp files every this many lists.
pub const DEFAULT_CHECKPOINT_INTVL: u64 = 1_000_000;

/// `ceil(log2(n + 1))`, i.e. the number of bits needed to represent any
/// value in `0..=n`. Returns 0 for `n == 0`.
pub const fn bits_to_encode(n: usize) -> Bitlen {
  (usize::BITS - n.leading_zeros()) as Bitlen
}
