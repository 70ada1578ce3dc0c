//! Configuration for the container writer. Mirrors `ChunkConfig` in spirit:
//! a plain data struct with a `Default` impl and `with_*` builder methods,
//! not a builder type of its own.

use crate::codec::CodecId;
use crate::constants::{
  DEFAULT_BLOCK_SIZE, DEFAULT_CHECKPOINT_INTVL, DEFAULT_MAX_LEN, DEFAULT_SKIP,
};

/// All configuration available to [`crate::container::writer::encode_container`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct EncodeConfig {
  /// Which codec encodes each list's gaps (or raw values, for codecs that
  /// bypass the gap transform).
  pub codec_id: CodecId,
  /// Block size passed to the codec's block-structured codecs (default
  /// 128, per the source's `BlockSize`).
  pub block_size: usize,
  /// Lists with `n <= skip` are read and discarded, never encoded
  /// (default 1: singleton and empty lists are never worth encoding).
  pub skip: u32,
  /// Lists with `n >= max_len` are read and discarded, never encoded.
  pub max_len: u32,
  /// Rewrite the header after this many lists have been durably appended.
  pub checkpoint_interval: u64,
}

impl Default for EncodeConfig {
  fn default() -> Self {
    EncodeConfig {
      codec_id: CodecId::OptPForDelta,
      block_size: DEFAULT_BLOCK_SIZE,
      skip: DEFAULT_SKIP,
      max_len: DEFAULT_MAX_LEN,
      checkpoint_interval: DEFAULT_CHECKPOINT_INTVL,
    }
  }
}

impl EncodeConfig {
  pub fn with_codec_id(mut self, codec_id: CodecId) -> Self {
    self.codec_id = codec_id;
    self
  }

  pub fn with_block_size(mut self, block_size: usize) -> Self {
    self.block_size = block_size;
    self
  }

  pub fn with_skip(mut self, skip: u32) -> Self {
    self.skip = skip;
    self
  }

  pub fn with_max_len(mut self, max_len: u32) -> Self {
    self.max_len = max_len;
    self
  }

  pub fn with_checkpoint_interval(mut self, checkpoint_interval: u64) -> Self {
    self.checkpoint_interval = checkpoint_interval;
    self
  }
}
