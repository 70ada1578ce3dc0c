//! The TOC file's fixed-size prefix (§3 `ContainerHeader`). Exclusively
//! owned and mutated by the container writer; read-only for the reader.

use crate::constants::{HEADERSZ, MAGIC, VMAJOR, VMINOR};
use crate::errors::{PfdError, PfdResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerHeader {
  pub vmajor: u32,
  pub vminor: u32,
  pub resume_num: u32,
  pub resume_pos: u32,
  pub resume_len: u64,
  pub resume_lenmax: u64,
}

impl Default for ContainerHeader {
  fn default() -> Self {
    ContainerHeader {
      vmajor: VMAJOR,
      vminor: VMINOR,
      resume_num: 0,
      resume_pos: 0,
      resume_len: 0,
      resume_lenmax: u64::MAX,
    }
  }
}

fn split_u64(x: u64) -> (u32, u32) {
  ((x & 0xFFFF_FFFF) as u32, (x >> 32) as u32)
}

fn join_u64(lo: u32, hi: u32) -> u64 {
  (lo as u64) | ((hi as u64) << 32)
}

impl ContainerHeader {
  /// Serializes the header into a single `HEADERSZ`-word buffer, so the
  /// caller can write it with one `write_all` + one `flush`/`sync_all`
  /// (spec §9's fix for the source's torn, multi-`fwrite` header).
  pub fn to_words(self) -> [u32; HEADERSZ] {
    let (len_lo, len_hi) = split_u64(self.resume_len);
    let (lenmax_lo, lenmax_hi) = split_u64(self.resume_lenmax);
    [
      MAGIC,
      self.vmajor,
      self.vminor,
      self.resume_num,
      self.resume_pos,
      len_lo,
      len_hi,
      lenmax_lo,
      lenmax_hi,
    ]
  }

  /// Parses a header, rejecting a magic/version mismatch
  /// (`ErrorKind::HeaderInvalid`).
  pub fn from_words(words: &[u32]) -> PfdResult<Self> {
    if words.len() < HEADERSZ {
      return Err(PfdError::header_invalid(format!(
        "TOC header needs {} words, found {}",
        HEADERSZ,
        words.len(),
      )));
    }
    if words[0] != MAGIC {
      return Err(PfdError::header_invalid(format!(
        "bad magic: expected {:#x}, found {:#x}",
        MAGIC, words[0],
      )));
    }
    let (vmajor, vminor) = (words[1], words[2]);
    if vmajor != VMAJOR {
      return Err(PfdError::header_invalid(format!(
        "incompatible major version: expected {}, found {}",
        VMAJOR, vmajor,
      )));
    }
    Ok(ContainerHeader {
      vmajor,
      vminor,
      resume_num: words[3],
      resume_pos: words[4],
      resume_len: join_u64(words[5], words[6]),
      resume_lenmax: join_u64(words[7], words[8]),
    })
  }
}
