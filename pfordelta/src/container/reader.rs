//! Component H: the container reader (spec §4.5).
//!
//! Unlike the writer, the reader has no resumability concerns: it opens the
//! TOC, validates the header, and streams entries back one list at a time.

use std::io::{Read, Seek, SeekFrom};

use crate::codec::Codec;
use crate::constants::HEADERSZ;
use crate::errors::{PfdError, PfdResult};
use crate::gap;

use super::header::ContainerHeader;
use super::toc::TocEntry;

/// Reads the header and the full list of TOC entries into memory. A TOC
/// entry is 16 bytes; even a container of millions of lists keeps this
/// well under a hundred megabytes, so loading it eagerly (rather than
/// threading a peek-ahead cursor through `next_list`) keeps the reader
/// simple.
pub fn read_toc<T: Read>(toc: &mut T) -> PfdResult<(ContainerHeader, Vec<TocEntry>)> {
  let mut header_words = [0u32; HEADERSZ];
  read_words_exact(toc, &mut header_words)?;
  let header = ContainerHeader::from_words(&header_words)?;

  let mut entries = Vec::new();
  loop {
    let mut words = [0u32; 4];
    match try_read_words(toc, &mut words)? {
      0 => break,
      4 => entries.push(TocEntry::from_words(&words)?),
      n => {
        return Err(PfdError::corruption(format!(
          "TOC file ends mid-entry ({} of 4 words present)",
          n
        )))
      }
    }
  }
  Ok((header, entries))
}

/// Decodes the single list described by `entry`. `next_offset` is the
/// following entry's `cmp_offset` (in words), if any; without one, the
/// list's encoded payload is assumed to run to the end of `cmp`.
pub fn decode_list<C: Read + Seek>(
  cmp: &mut C,
  codec: &dyn Codec,
  entry: TocEntry,
  next_offset: Option<u64>,
) -> PfdResult<Vec<u32>> {
  let bypasses_gap = codec.id().bypasses_gap_transform();
  let n_values = if bypasses_gap {
    entry.num as usize
  } else {
    (entry.num as usize).saturating_sub(1)
  };

  let end_offset = match next_offset {
    Some(next) => next,
    None => {
      let len_bytes = cmp.seek(SeekFrom::End(0))?;
      len_bytes / 4
    }
  };
  if end_offset < entry.cmp_offset {
    return Err(PfdError::corruption(
      "TOC entries are not monotonically non-decreasing",
    ));
  }
  let span = (end_offset - entry.cmp_offset) as usize;

  cmp.seek(SeekFrom::Start(entry.cmp_offset * 4))?;
  let mut encoded = vec![0u32; span];
  read_words_exact(cmp, &mut encoded)?;

  if bypasses_gap {
    let mut out = vec![0u32; n_values];
    codec.decode_array(&encoded, &mut out, n_values)?;
    Ok(out)
  } else {
    let mut gaps = vec![0u32; n_values];
    codec.decode_array(&encoded, &mut gaps, n_values)?;
    Ok(gap::gap_decode(entry.first_doc, &gaps))
  }
}

/// Convenience wrapper: reads the whole TOC then decodes every list in
/// order. Fine for the CLI and for tests; a caller streaming a huge
/// container list-by-list should use [`read_toc`] and [`decode_list`]
/// directly instead of holding every decoded list in memory at once.
pub fn decode_container<T: Read, C: Read + Seek>(
  toc: &mut T,
  cmp: &mut C,
  codec: &dyn Codec,
) -> PfdResult<(ContainerHeader, Vec<Vec<u32>>)> {
  let (header, entries) = read_toc(toc)?;
  let mut lists = Vec::with_capacity(entries.len());
  for (i, &entry) in entries.iter().enumerate() {
    let next_offset = entries.get(i + 1).map(|e| e.cmp_offset);
    lists.push(decode_list(cmp, codec, entry, next_offset)?);
  }
  Ok((header, lists))
}

fn try_read_words<R: Read>(r: &mut R, words: &mut [u32]) -> PfdResult<usize> {
  let mut buf = vec![0u8; words.len() * 4];
  let mut filled = 0;
  while filled < buf.len() {
    let n = r.read(&mut buf[filled..])?;
    if n == 0 {
      break;
    }
    filled += n;
  }
  if filled % 4 != 0 {
    return Err(PfdError::corruption("word stream ends mid-word"));
  }
  let n_words = filled / 4;
  for (i, word) in words.iter_mut().enumerate().take(n_words) {
    *word = u32::from_le_bytes(buf[i * 4..i * 4 + 4].try_into().unwrap());
  }
  Ok(n_words)
}

fn read_words_exact<R: Read>(r: &mut R, words: &mut [u32]) -> PfdResult<()> {
  let n = try_read_words(r, words)?;
  if n != words.len() {
    return Err(PfdError::insufficient_data(format!(
      "expected {} words, found {}",
      words.len(),
      n
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::codec::{self, CodecId};
  use crate::config::EncodeConfig;
  use crate::container::writer::encode_container;
  use std::io::Cursor;

  fn encode_words(records: &[(u32, &[u32])]) -> Vec<u8> {
    let mut buf = Vec::new();
    for &(n, values) in records {
      buf.extend_from_slice(&n.to_le_bytes());
      for &v in values {
        buf.extend_from_slice(&v.to_le_bytes());
      }
    }
    buf
  }

  #[test]
  fn test_round_trip_through_container() {
    let list_a = [10u32, 20, 30, 45];
    let list_b: Vec<u32> = (0..300).map(|i| (i * 3) as u32).collect();
    let raw = encode_words(&[
      (list_a.len() as u32, &list_a),
      (list_b.len() as u32, &list_b[..]),
    ]);

    let mut input = Cursor::new(raw);
    let mut cmp = Cursor::new(Vec::new());
    let mut toc = Cursor::new(Vec::new());
    let config = EncodeConfig::default().with_codec_id(CodecId::OptPForDelta);
    encode_container(&mut input, &mut cmp, &mut toc, &config, false, 0, |_| {}).unwrap();

    toc.seek(SeekFrom::Start(0)).unwrap();
    cmp.seek(SeekFrom::Start(0)).unwrap();
    let codec = codec::dispatch_default(CodecId::OptPForDelta).unwrap();
    let (header, lists) = decode_container(&mut toc, &mut cmp, codec.as_ref()).unwrap();

    assert_eq!(header.resume_num, 2);
    assert_eq!(lists, vec![list_a.to_vec(), list_b]);
  }

  #[test]
  fn test_empty_container_decodes_to_no_lists() {
    let mut toc = Cursor::new(ContainerHeader::default().to_words().iter().flat_map(|w| w.to_le_bytes()).collect::<Vec<u8>>());
    let mut cmp = Cursor::new(Vec::new());
    let codec = codec::dispatch_default(CodecId::OptPForDelta).unwrap();
    let (_, lists) = decode_container(&mut toc, &mut cmp, codec.as_ref()).unwrap();
    assert!(lists.is_empty());
  }
}
