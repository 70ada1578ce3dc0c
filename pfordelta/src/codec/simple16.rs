//! Simple16 (component B): a variable-width packing scheme that chooses,
//! per 32-bit word, one of 16 `(count, bits)` layouts describing how many
//! integers of what width the word carries.
//!
//! This reimplementation uses the same-width-per-word variant of the
//! scheme (closer to the classic Simple9 table, extended to 16 rows for
//! finer bit-width resolution) rather than the historical Simple16's
//! occasional mixed-width rows; see DESIGN.md for why. `OPT-PForDelta`'s
//! search treats any value that doesn't fit this table's largest single
//! code (28 bits) as making that candidate width infeasible, so the
//! limitation never surfaces as a round-trip failure (§4.2).

use crate::bits;
use crate::constants::{SIMPLE16_NUM_SELECTORS, SIMPLE16_SELECTOR_BITS};
use crate::errors::{ErrorKind, PfdError, PfdResult};

/// `(count, bits)` per selector, selector value == index into this table.
const ROWS: [(u32, u32); SIMPLE16_NUM_SELECTORS] = [
  (28, 1),
  (14, 2),
  (9, 3),
  (7, 4),
  (5, 5),
  (4, 6),
  (4, 7),
  (3, 8),
  (3, 9),
  (2, 10),
  (2, 12),
  (2, 14),
  (1, 16),
  (1, 18),
  (1, 21),
  (1, 28),
];

fn fits(v: u32, bits: u32) -> bool {
  bits >= 32 || v < (1u32 << bits)
}

/// Picks the selector that packs the most leading values of `xs[idx..]`,
/// preferring fewer bits on ties (rows are tried in ascending-bits order
/// and only replaced on strict improvement).
fn best_row(xs: &[u32]) -> PfdResult<(usize, usize)> {
  let mut best: Option<(usize, usize)> = None; // (selector, take)
  for (selector, &(count, bits)) in ROWS.iter().enumerate() {
    let limit = (count as usize).min(xs.len());
    let take = xs[..limit].iter().take_while(|&&v| fits(v, bits)).count();
    if take == limit && best.map_or(true, |(_, best_take)| take > best_take) {
      best = Some((selector, take));
    }
  }
  best.ok_or_else(|| {
    PfdError::new(
      ErrorKind::BufferTooSmall,
      format!(
        "value {} needs more than {} bits; simple16 cannot represent it",
        xs[0],
        ROWS.last().unwrap().1
      ),
    )
  })
}

fn pack_word(selector: usize, take: usize, bits: u32, xs: &[u32]) -> u32 {
  let mut payload = 0u32;
  for (k, &v) in xs.iter().take(take).enumerate() {
    payload |= v << (k as u32 * bits);
  }
  (selector as u32) | (payload << SIMPLE16_SELECTOR_BITS)
}

/// Appends the Simple16 encoding of `xs` to `out`. Errors if some value
/// needs more than 28 bits (the largest single code this table supports).
pub fn encode(xs: &[u32], out: &mut Vec<u32>) -> PfdResult<()> {
  let mut idx = 0;
  while idx < xs.len() {
    let (selector, take) = best_row(&xs[idx..])?;
    let bits = ROWS[selector].1;
    out.push(pack_word(selector, take, bits, &xs[idx..idx + take]));
    idx += take;
  }
  Ok(())
}

/// The number of 32-bit words `encode(xs, _)` would produce, without
/// materializing them. By construction this equals `encode(xs).len()`.
pub fn cost(xs: &[u32]) -> PfdResult<usize> {
  let mut idx = 0;
  let mut words = 0;
  while idx < xs.len() {
    let (_selector, take) = best_row(&xs[idx..])?;
    words += 1;
    idx += take;
  }
  Ok(words)
}

/// Decodes exactly `n_values` integers from `words`, returning them plus
/// the count of words consumed.
pub fn decode(words: &[u32], n_values: usize) -> PfdResult<(Vec<u32>, usize)> {
  let mut out = Vec::with_capacity(n_values);
  let mut word_idx = 0;
  while out.len() < n_values {
    if word_idx >= words.len() {
      return Err(PfdError::new(
        ErrorKind::InsufficientData,
        "ran out of words decoding a simple16 stream",
      ));
    }
    let word = words[word_idx];
    word_idx += 1;
    let selector = (word & ((1 << SIMPLE16_SELECTOR_BITS) - 1)) as usize;
    if selector >= SIMPLE16_NUM_SELECTORS {
      return Err(PfdError::corruption("invalid simple16 selector"));
    }
    let (count, row_bits) = ROWS[selector];
    let payload = word >> SIMPLE16_SELECTOR_BITS;
    let take = (count as usize).min(n_values - out.len());
    for k in 0..take {
      out.push(bits::lowest_bits(payload >> (k as u32 * row_bits), row_bits));
    }
  }
  Ok((out, word_idx))
}
