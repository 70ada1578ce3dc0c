//! Component E: a closed, statically-dispatched codec table keyed by the
//! stable small integer the source calls `encID` (0–13).

pub mod opt_pfordelta;
pub mod pfordelta;
pub mod simple16;

use crate::constants::DEFAULT_BLOCK_SIZE;
use crate::errors::{ErrorKind, PfdError, PfdResult};
use opt_pfordelta::OptPForDelta;
use pfordelta::BlockCodec;
use std::cell::RefCell;

/// Stable external identity of a codec, matching the source's `encID`.
/// IDs 6 and 7 are fully implemented (the featured family); the rest are
/// closed-but-unimplemented placeholders for the non-featured codecs this
/// spec treats as black boxes (§1, §4.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CodecId {
  Gamma = 0,
  Delta = 1,
  VariableByte = 2,
  BinaryInterpolative = 3,
  Simple9 = 4,
  Simple16 = 5,
  PForDelta = 6,
  OptPForDelta = 7,
  VSEncodingBlocks = 8,
  VseR = 9,
  VSEncodingRest = 10,
  VSEncodingBlocksHybrid = 11,
  VSEncodingSimpleV1 = 12,
  VSEncodingSimpleV2 = 13,
}

impl CodecId {
  pub fn from_u8(id: u8) -> PfdResult<Self> {
    use CodecId::*;
    Ok(match id {
      0 => Gamma,
      1 => Delta,
      2 => VariableByte,
      3 => BinaryInterpolative,
      4 => Simple9,
      5 => Simple16,
      6 => PForDelta,
      7 => OptPForDelta,
      8 => VSEncodingBlocks,
      9 => VseR,
      10 => VSEncodingRest,
      11 => VSEncodingBlocksHybrid,
      12 => VSEncodingSimpleV1,
      13 => VSEncodingSimpleV2,
      other => {
        return Err(PfdError::invalid_argument(format!(
          "encID {} out of range [0, 14)",
          other
        )))
      }
    })
  }

  /// Stable, lowercase, hyphenated name for each codec, for CLI use
  /// alongside the numeric id.
  pub fn name(&self) -> &'static str {
    use CodecId::*;
    match self {
      Gamma => "gamma",
      Delta => "delta",
      VariableByte => "variable-byte",
      BinaryInterpolative => "binary-interpolative",
      Simple9 => "simple9",
      Simple16 => "simple16",
      PForDelta => "pfordelta",
      OptPForDelta => "opt-pfordelta",
      VSEncodingBlocks => "vsencoding-blocks",
      VseR => "vse-r",
      VSEncodingRest => "vsencoding-rest",
      VSEncodingBlocksHybrid => "vsencoding-blocks-hybrid",
      VSEncodingSimpleV1 => "vsencoding-simple-v1",
      VSEncodingSimpleV2 => "vsencoding-simple-v2",
    }
  }

  /// Parses either a numeric id (`"7"`) or a [`CodecId::name`] (e.g.
  /// `"opt-pfordelta"`), case-insensitively.
  pub fn from_name_or_id(s: &str) -> PfdResult<Self> {
    if let Ok(id) = s.parse::<u8>() {
      return Self::from_u8(id);
    }
    let lower = s.to_lowercase();
    (0u8..14)
      .map(|id| Self::from_u8(id).unwrap())
      .find(|codec_id| codec_id.name() == lower)
      .ok_or_else(|| PfdError::invalid_argument(format!("unknown codec '{}'", s)))
  }

  /// All 14 codec identities, in `encID` order.
  pub fn all() -> [CodecId; 14] {
    use CodecId::*;
    [
      Gamma,
      Delta,
      VariableByte,
      BinaryInterpolative,
      Simple9,
      Simple16,
      PForDelta,
      OptPForDelta,
      VSEncodingBlocks,
      VseR,
      VSEncodingRest,
      VSEncodingBlocksHybrid,
      VSEncodingSimpleV1,
      VSEncodingSimpleV2,
    ]
  }

  pub fn extension(&self) -> &'static str {
    use CodecId::*;
    match self {
      Gamma => ".gamma",
      Delta => ".delta",
      VariableByte => ".vb",
      BinaryInterpolative => ".bic",
      Simple9 => ".s9",
      Simple16 => ".s16",
      PForDelta => ".pfd",
      OptPForDelta => ".opt",
      VSEncodingBlocks => ".vse",
      VseR => ".vser",
      VSEncodingRest => ".vsrest",
      VSEncodingBlocksHybrid => ".vsehyb",
      VSEncodingSimpleV1 => ".vs1",
      VSEncodingSimpleV2 => ".vs2",
    }
  }

  /// True for the codecs this crate actually implements (§1: everything
  /// else is an out-of-scope external collaborator).
  pub fn is_implemented(&self) -> bool {
    matches!(self, CodecId::PForDelta | CodecId::OptPForDelta)
  }

  /// `BinaryInterpolative` is the one codec the container bypasses the
  /// gap transform for, storing raw ascending values instead (§4.3).
  pub fn bypasses_gap_transform(&self) -> bool {
    matches!(self, CodecId::BinaryInterpolative)
  }
}

/// Uniform `encode`/`decode` entry point every codec exposes (§4.1).
/// `encode_array`/`decode_array` take plain slices so a caller-owned
/// scratch buffer can be reused call to call, matching the "no allocation
/// in the hot path" resource policy (§5).
pub trait Codec {
  fn id(&self) -> CodecId;
  fn encode_array(&self, input: &[u32], out: &mut [u32]) -> PfdResult<usize>;
  fn decode_array(&self, input: &[u32], out: &mut [u32], n_output_values: usize) -> PfdResult<()>;
}

struct Placeholder(CodecId);

impl Codec for Placeholder {
  fn id(&self) -> CodecId {
    self.0
  }

  fn encode_array(&self, _input: &[u32], _out: &mut [u32]) -> PfdResult<usize> {
    Err(PfdError::new(
      ErrorKind::InvalidArgument,
      format!(
        "codec {:?} is an out-of-scope external collaborator and is not implemented",
        self.0
      ),
    ))
  }

  fn decode_array(&self, _input: &[u32], _out: &mut [u32], _n: usize) -> PfdResult<()> {
    Err(PfdError::new(
      ErrorKind::InvalidArgument,
      format!(
        "codec {:?} is an out-of-scope external collaborator and is not implemented",
        self.0
      ),
    ))
  }
}

/// Thin `Codec` adapter over the (stateful, scratch-reusing) PForDelta
/// block codec with a fixed width chosen by the caller ahead of time is
/// not exposed at this layer — `PForDelta` as a dispatch entry always
/// chooses `b` greedily as "smallest width with zero exceptions", which
/// is what the source's plain (non-optimized) PForDelta encoder does.
struct PlainPForDelta {
  inner: RefCell<BlockCodec>,
}

impl Codec for PlainPForDelta {
  fn id(&self) -> CodecId {
    CodecId::PForDelta
  }

  fn encode_array(&self, input: &[u32], out: &mut [u32]) -> PfdResult<usize> {
    let mut codec = self.inner.borrow_mut();
    let block_size = codec.block_size();
    let num_blocks = crate::bits::ceil_div(input.len(), block_size);
    if out.is_empty() {
      return Err(PfdError::buffer_too_small("no room for block count"));
    }
    out[0] = num_blocks as u32;
    let mut words = 1;
    for block in input.chunks(block_size) {
      let b = smallest_exact_width(block);
      words += codec.encode_block(block, b, &mut out[words..])?;
    }
    Ok(words)
  }

  fn decode_array(&self, input: &[u32], out: &mut [u32], n_output_values: usize) -> PfdResult<()> {
    if n_output_values == 0 {
      return Ok(());
    }
    let mut codec = self.inner.borrow_mut();
    let block_size = codec.block_size();
    let num_blocks = input[0] as usize;
    let mut in_idx = 1;
    let mut out_idx = 0;
    for _ in 0..num_blocks {
      let block_len = (n_output_values - out_idx).min(block_size);
      in_idx += codec.decode_block(&input[in_idx..], block_len, &mut out[out_idx..out_idx + block_len])?;
      out_idx += block_len;
    }
    Ok(())
  }
}

/// Smallest candidate width that represents every value in `block`
/// without exceptions (plain PForDelta does not search for an optimum,
/// it just avoids unnecessary exceptions).
fn smallest_exact_width(block: &[u32]) -> u32 {
  let max = block.iter().copied().max().unwrap_or(0);
  for &w in &crate::constants::CANDIDATE_WIDTHS {
    if w >= 32 || max < (1u32 << w) {
      return w;
    }
  }
  32
}

struct OptPForDeltaCodec {
  inner: RefCell<OptPForDelta>,
}

impl Codec for OptPForDeltaCodec {
  fn id(&self) -> CodecId {
    CodecId::OptPForDelta
  }

  fn encode_array(&self, input: &[u32], out: &mut [u32]) -> PfdResult<usize> {
    self.inner.borrow_mut().encode_array(input, out)
  }

  fn decode_array(&self, input: &[u32], out: &mut [u32], n_output_values: usize) -> PfdResult<()> {
    self.inner.borrow_mut().decode_array(input, out, n_output_values)
  }
}

/// Looks up the codec implementation for `id`, sized to `block_size`.
/// Mirrors the source's function-pointer table (design note §9): the tag
/// (`CodecId`) is what gets serialized, via the file extension; the
/// behavior is resolved here, statically.
pub fn dispatch(id: CodecId, block_size: usize) -> PfdResult<Box<dyn Codec>> {
  match id {
    CodecId::PForDelta => Ok(Box::new(PlainPForDelta {
      inner: RefCell::new(BlockCodec::new(block_size)?),
    })),
    CodecId::OptPForDelta => Ok(Box::new(OptPForDeltaCodec {
      inner: RefCell::new(OptPForDelta::new(block_size)?),
    })),
    other => Ok(Box::new(Placeholder(other))),
  }
}

pub fn dispatch_default(id: CodecId) -> PfdResult<Box<dyn Codec>> {
  dispatch(id, DEFAULT_BLOCK_SIZE)
}
