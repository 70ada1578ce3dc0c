use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A strictly ascending `u32` list of length `n`, values below `2^30`
/// (spec's round-trip property range), built by accumulating random gaps.
pub fn ascending_list(seed: u64, n: usize) -> Vec<u32> {
  let mut rng = StdRng::seed_from_u64(seed);
  let mut out = Vec::with_capacity(n);
  let mut cur: u32 = rng.gen_range(0..1_000);
  for _ in 0..n {
    out.push(cur);
    cur += rng.gen_range(1..5_000);
  }
  out
}
