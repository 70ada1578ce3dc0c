//! OPT-PForDelta (component D): per-block search for the bit width `b`
//! that minimizes encoded size, driving the PForDelta block codec (C).

use crate::bits;
use crate::codec::pfordelta::BlockCodec;
use crate::constants::{Bitlen, CANDIDATE_WIDTHS, DEFAULT_BLOCK_SIZE};
use crate::errors::PfdResult;

/// Chooses the bit width minimizing `cost(b) = ceil(N*b/32) +
/// simple16_cost(exceptions(b))` over `CANDIDATE_WIDTHS`.
///
/// Tie-break: strict improvement only (`<`, not `<=`), so the *smaller*
/// `b` wins on equal cost. The source uses `<=`, which lets a later (and
/// strictly larger, since the search is exhaustive) candidate win ties —
/// including `b = 32` beating a smaller width at equal cost. That looks
/// unintentional (a smaller `b` is always at least as fast to decode), so
/// this reimplementation deviates; see DESIGN.md.
fn find_best_b(codec: &mut BlockCodec, values: &[u32]) -> Bitlen {
  let n = values.len();
  let mut best_b = *CANDIDATE_WIDTHS.last().unwrap(); // 32
  let mut best_cost = n;

  for &b in &CANDIDATE_WIDTHS[..CANDIDATE_WIDTHS.len() - 1] {
    if let Some(cost) = codec.cost(values, b) {
      if cost < best_cost {
        best_cost = cost;
        best_b = b;
      }
    }
  }

  best_b
}

pub struct OptPForDelta {
  codec: BlockCodec,
  block_size: usize,
}

impl OptPForDelta {
  pub fn new(block_size: usize) -> PfdResult<Self> {
    Ok(OptPForDelta {
      codec: BlockCodec::new(block_size)?,
      block_size,
    })
  }

  fn num_blocks(&self, len: usize) -> usize {
    bits::ceil_div(len, self.block_size)
  }

  /// Encodes `input` (already gap-transformed) into `out`, returning the
  /// number of words written. The first output word is the block count;
  /// blocks follow back to back, each sized exactly to its (possibly
  /// short, for the last block) length — no padding.
  pub fn encode_array(&mut self, input: &[u32], out: &mut [u32]) -> PfdResult<usize> {
    let num_blocks = self.num_blocks(input.len());
    if out.is_empty() {
      return Err(crate::errors::PfdError::buffer_too_small(
        "no room for block count",
      ));
    }
    out[0] = num_blocks as u32;
    let mut words = 1;

    for block in input.chunks(self.block_size) {
      let b = find_best_b(&mut self.codec, block);
      let written = self.codec.encode_block(block, b, &mut out[words..])?;
      words += written;
    }

    Ok(words)
  }

  /// Decodes `n_output_values` values from `input` into `out`.
  pub fn decode_array(&mut self, input: &[u32], out: &mut [u32], n_output_values: usize) -> PfdResult<()> {
    if n_output_values == 0 {
      return Ok(());
    }
    if input.is_empty() {
      return Err(crate::errors::PfdError::insufficient_data(
        "missing block count word",
      ));
    }
    let num_blocks = input[0] as usize;
    let mut in_idx = 1;
    let mut out_idx = 0;

    for _ in 0..num_blocks {
      let remaining = n_output_values - out_idx;
      let block_len = remaining.min(self.block_size);
      let consumed =
        self
          .codec
          .decode_block(&input[in_idx..], block_len, &mut out[out_idx..out_idx + block_len])?;
      in_idx += consumed;
      out_idx += block_len;
    }

    if out_idx != n_output_values {
      return Err(crate::errors::PfdError::corruption(
        "block count did not cover all requested values",
      ));
    }

    Ok(())
  }
}

impl Default for OptPForDelta {
  fn default() -> Self {
    Self::new(DEFAULT_BLOCK_SIZE).expect("default block size is always valid")
  }
}
