//! PForDelta (component C): bit-pack a fixed-size block at a caller-chosen
//! width `b`, spilling values that don't fit into an exception sideband
//! encoded with Simple16.

use crate::bitio::{BitReader, BitWriter};
use crate::bits;
use crate::codec::simple16;
use crate::constants::Bitlen;
use crate::errors::{ErrorKind, PfdError, PfdResult};

/// Header bit widths for a given block size, and the block codec built
/// around them. Hoisted per spec's design note §9: the four scratch
/// arrays `tryB` needs are owned by the instance and reused block to
/// block, never allocated in the search's inner loop.
#[derive(Debug)]
pub struct BlockCodec {
  block_size: usize,
  bits_b: Bitlen,
  bits_nexc: Bitlen,
  bits_pos: Bitlen,
  // scratch, sized to `block_size`, reused across `encode_block` calls
  scratch_positions: Vec<u32>,
  scratch_deltas: Vec<u32>,
  scratch_values: Vec<u32>,
  scratch_exceptions: Vec<u32>,
}

const BITS_B: Bitlen = 6; // candidates top out at 32, fits in 6 bits

impl BlockCodec {
  pub fn new(block_size: usize) -> PfdResult<Self> {
    if block_size == 0 {
      return Err(PfdError::invalid_argument("block size must be positive"));
    }
    let bits_nexc = crate::constants::bits_to_encode(block_size);
    let bits_pos = crate::constants::bits_to_encode(block_size - 1);
    if BITS_B + bits_nexc + bits_pos > 32 {
      return Err(PfdError::invalid_argument(format!(
        "block size {} needs a header wider than one 32-bit word",
        block_size,
      )));
    }
    Ok(BlockCodec {
      block_size,
      bits_b: BITS_B,
      bits_nexc,
      bits_pos,
      scratch_positions: Vec::with_capacity(block_size),
      scratch_deltas: Vec::with_capacity(block_size),
      scratch_values: Vec::with_capacity(block_size),
      scratch_exceptions: Vec::with_capacity(2 * block_size),
    })
  }

  pub fn block_size(&self) -> usize {
    self.block_size
  }

  /// The encoded size in words a block of `len` values at width `b` would
  /// take, including the exception sideband, without writing anything.
  /// Returns `None` if width `b` is infeasible (some exception value needs
  /// more bits than Simple16 can represent).
  pub fn cost(&mut self, values: &[u32], b: Bitlen) -> Option<usize> {
    if b >= 32 {
      return Some(values.len());
    }
    self.collect_exceptions(values, b);
    let payload_words = bits::ceil_div(values.len() * b as usize, 32);
    if self.scratch_exceptions.is_empty() {
      return Some(payload_words);
    }
    match simple16::cost(&self.scratch_exceptions) {
      Ok(sideband_words) => Some(payload_words + sideband_words),
      Err(_) => None,
    }
  }

  /// Fills `scratch_positions`/`scratch_values` (raw, untransformed) with
  /// the indices/high-bits of values that don't fit in `b` bits, then
  /// builds the transformed `scratch_exceptions` stream Simple16 will see:
  /// position deltas (index 0 untouched, others `gap - 1`) followed by
  /// `value - 1`.
  fn collect_exceptions(&mut self, values: &[u32], b: Bitlen) {
    self.scratch_positions.clear();
    self.scratch_values.clear();
    let threshold = if b >= 32 { u64::MAX } else { 1u64 << b };
    for (i, &v) in values.iter().enumerate() {
      if (v as u64) >= threshold {
        self.scratch_positions.push(i as u32);
        self.scratch_values.push((v >> b).wrapping_sub(1));
      }
    }

    self.scratch_deltas.clear();
    self
      .scratch_deltas
      .extend_from_slice(&self.scratch_positions);
    for i in (1..self.scratch_deltas.len()).rev() {
      self.scratch_deltas[i] -= self.scratch_deltas[i - 1];
    }
    // the position transform: first stays absolute, the rest are gaps
    // minus one (spec §4.2/§9).
    for i in (1..self.scratch_deltas.len()).rev() {
      self.scratch_deltas[i] -= 1;
    }

    self.scratch_exceptions.clear();
    self
      .scratch_exceptions
      .extend_from_slice(&self.scratch_deltas);
    self.scratch_exceptions.extend_from_slice(&self.scratch_values);
  }

  /// Encodes exactly `values.len()` values (`<= block_size`) at width `b`
  /// into `out`, returning the number of words written. `values.len()`
  /// itself is not stored — the outer framing (OPT-PForDelta/container)
  /// always knows it out of band.
  pub fn encode_block(&mut self, values: &[u32], b: Bitlen, out: &mut [u32]) -> PfdResult<usize> {
    if values.len() > self.block_size {
      return Err(PfdError::invalid_argument(format!(
        "block of {} values exceeds configured block size {}",
        values.len(),
        self.block_size,
      )));
    }
    if b >= 32 {
      self.scratch_positions.clear();
    } else {
      self.collect_exceptions(values, b);
    }
    let num_exceptions = self.scratch_positions.len();
    let first_exception_position = self.scratch_positions.first().copied().unwrap_or(0);

    if out.is_empty() {
      return Err(PfdError::buffer_too_small("no room for block header"));
    }
    out[0] = 0;
    let mut header_writer = BitWriter::from(&mut out[..1]);
    header_writer.write_bits(b, self.bits_b)?;
    header_writer.write_bits(num_exceptions as u32, self.bits_nexc)?;
    header_writer.write_bits(first_exception_position, self.bits_pos)?;

    let payload_words = bits::ceil_div(values.len() * b as usize, 32);
    if 1 + payload_words > out.len() {
      return Err(PfdError::buffer_too_small("block payload does not fit"));
    }
    for w in out[1..1 + payload_words].iter_mut() {
      *w = 0;
    }
    {
      let mut writer = BitWriter::from(&mut out[1..1 + payload_words]);
      for &v in values {
        writer.write_bits(v, b)?;
      }
    }

    let mut words = 1 + payload_words;
    if num_exceptions > 0 {
      let mut sideband = Vec::new();
      simple16::encode(&self.scratch_exceptions, &mut sideband)?;
      if words + sideband.len() > out.len() {
        return Err(PfdError::buffer_too_small("exception sideband does not fit"));
      }
      out[words..words + sideband.len()].copy_from_slice(&sideband);
      words += sideband.len();
    }

    Ok(words)
  }

  /// Decodes exactly `n` values (`<= block_size`) from `input` into `out`,
  /// returning the number of input words consumed.
  pub fn decode_block(&mut self, input: &[u32], n: usize, out: &mut [u32]) -> PfdResult<usize> {
    if input.is_empty() {
      return Err(PfdError::insufficient_data("missing block header"));
    }
    let mut header_reader = BitReader::from(&input[..1]);
    let b = header_reader.read_bits(self.bits_b)?;
    let num_exceptions = header_reader.read_bits(self.bits_nexc)? as usize;
    let first_exception_position = header_reader.read_bits(self.bits_pos)?;

    let payload_words = bits::ceil_div(n * b as usize, 32);
    if 1 + payload_words > input.len() {
      return Err(PfdError::insufficient_data("truncated block payload"));
    }
    if out.len() < n {
      return Err(PfdError::buffer_too_small("decode destination too small"));
    }
    {
      let mut reader = BitReader::from(&input[1..1 + payload_words]);
      for slot in out[..n].iter_mut() {
        *slot = reader.read_bits(b)?;
      }
    }

    let mut words = 1 + payload_words;
    if num_exceptions > 0 {
      let (stream, consumed) = simple16::decode(&input[words..], 2 * num_exceptions)?;
      words += consumed;

      // stream is [position deltas (0..num_exceptions)] ++ [values - 1 (0..num_exceptions)]
      let mut pos = first_exception_position;
      for i in 0..num_exceptions {
        if i > 0 {
          pos = pos
            .checked_add(stream[i])
            .and_then(|p| p.checked_add(1))
            .ok_or_else(|| PfdError::corruption("exception position overflow"))?;
        }
        if pos as usize >= n {
          return Err(PfdError::corruption("exception position out of range"));
        }
        let value_minus_one = stream[num_exceptions + i];
        out[pos as usize] |= (value_minus_one.wrapping_add(1)) << b;
      }
    }

    Ok(words)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_round_trip_no_exceptions() {
    let mut codec = BlockCodec::new(128).unwrap();
    let values: Vec<u32> = vec![0; 128];
    let mut buf = vec![0u32; 256];
    let words = codec.encode_block(&values, 0, &mut buf).unwrap();
    assert_eq!(words, 1); // header only, no payload, no exceptions

    let mut out = vec![0u32; 128];
    let consumed = codec.decode_block(&buf, 128, &mut out).unwrap();
    assert_eq!(consumed, words);
    assert_eq!(out, values);
  }

  #[test]
  fn test_round_trip_one_outlier() {
    let mut codec = BlockCodec::new(128).unwrap();
    let mut values = vec![0u32; 128];
    values[50] = 999_995;
    let b = 4; // deliberately narrow so the outlier becomes an exception
    let mut buf = vec![0u32; 256];
    let words = codec.encode_block(&values, b, &mut buf).unwrap();

    let mut out = vec![0u32; 128];
    let consumed = codec.decode_block(&buf, 128, &mut out).unwrap();
    assert_eq!(consumed, words);
    assert_eq!(out, values);
  }

  #[test]
  fn test_round_trip_multiple_exceptions_and_short_block() {
    let mut codec = BlockCodec::new(128).unwrap();
    let mut values: Vec<u32> = (0..40).collect();
    values[0] = 5_000;
    values[10] = 70_000;
    values[39] = 1 << 20;
    let b = 5;
    let mut buf = vec![0u32; 256];
    let words = codec.encode_block(&values, b, &mut buf).unwrap();

    let mut out = vec![0u32; 40];
    let consumed = codec.decode_block(&buf, 40, &mut out).unwrap();
    assert_eq!(consumed, words);
    assert_eq!(out, values);
  }

  #[test]
  fn test_full_width_has_no_exceptions() {
    let mut codec = BlockCodec::new(8).unwrap();
    let values = vec![u32::MAX, 0, 123, u32::MAX / 2, 9, 8, 7, 6];
    let mut buf = vec![0u32; 32];
    let words = codec.encode_block(&values, 32, &mut buf).unwrap();
    assert_eq!(words, 1 + 8); // header + one word per value, no sideband

    let mut out = vec![0u32; 8];
    codec.decode_block(&buf, 8, &mut out).unwrap();
    assert_eq!(out, values);
  }
}
