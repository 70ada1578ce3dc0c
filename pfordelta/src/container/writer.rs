//! Component G: the resumable container builder (spec §4.4).
//!
//! Operates on already-open `Read`/`Write`/`Seek` handles rather than file
//! paths; opening the input/cmp/TOC files is the CLI's job (§1 lists
//! "file opening/mmap glue" as an out-of-scope external collaborator).

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::codec::{self, CodecId};
use crate::config::EncodeConfig;
use crate::constants::{EACH_HEADER_TOC_SZ, HEADERSZ};
use crate::errors::{PfdError, PfdResult};
use crate::gap::{self, OrderingViolation};
use crate::progress::BuildProgress;

use super::header::ContainerHeader;
use super::toc::TocEntry;

/// Marks handles that can be made durable against process/OS crash. Plain
/// files sync to disk; in-memory buffers (used in tests) have nothing to
/// sync and are always already "durable".
pub trait Durable {
  fn sync_durable(&self) -> io::Result<()>;
}

impl Durable for std::fs::File {
  fn sync_durable(&self) -> io::Result<()> {
    self.sync_all()
  }
}

impl Durable for io::Cursor<Vec<u8>> {
  fn sync_durable(&self) -> io::Result<()> {
    Ok(())
  }
}

/// Reads one little-endian `u32` word. Returns `Ok(None)` only on a clean,
/// zero-byte end of stream; a short read past that point is corruption.
fn try_read_word<R: Read>(r: &mut R) -> io::Result<Option<u32>> {
  let mut buf = [0u8; 4];
  let mut filled = 0;
  while filled < 4 {
    let n = r.read(&mut buf[filled..])?;
    if n == 0 {
      return if filled == 0 {
        Ok(None)
      } else {
        Err(io::Error::new(
          io::ErrorKind::UnexpectedEof,
          "input truncated mid-word",
        ))
      };
    }
    filled += n;
  }
  Ok(Some(u32::from_le_bytes(buf)))
}

fn read_word<R: Read>(r: &mut R) -> PfdResult<u32> {
  try_read_word(r)?.ok_or_else(|| {
    PfdError::insufficient_data("expected a word, found end of input")
  })
}

fn write_words<W: Write>(w: &mut W, words: &[u32]) -> io::Result<()> {
  for &word in words {
    w.write_all(&word.to_le_bytes())?;
  }
  Ok(())
}

fn words_to_bytes(words: usize) -> u64 {
  (words as u64) * 4
}

/// Seeks `toc` back to its logical word offset `pos_words` and writes the
/// header in one `write_all` (the source's bug this crate's design fixes,
/// per spec §9, was writing the header fields with several separate
/// `fwrite`s that a crash could interleave with other I/O).
fn write_header<T: Write + Seek + Durable>(
  toc: &mut T,
  header: ContainerHeader,
) -> PfdResult<()> {
  let cursor = toc.stream_position()?;
  toc.seek(SeekFrom::Start(0))?;
  write_words(toc, &header.to_words())?;
  toc.flush()?;
  toc.sync_durable()?;
  toc.seek(SeekFrom::Start(cursor))?;
  Ok(())
}

struct ResumeState {
  resume_num: u64,
  resume_pos: u64,
  resume_len: u64,
}

/// Attempts to resume from an existing TOC/cmp pair. Any problem with the
/// existing header or file lengths is treated as "cannot resume", not a
/// fatal error: the writer falls back to starting fresh (spec §4.4).
fn try_resume<C: Seek, T: Read + Seek>(
  cmp: &mut C,
  toc: &mut T,
) -> Option<ResumeState> {
  toc.seek(SeekFrom::Start(0)).ok()?;
  let mut header_words = [0u32; HEADERSZ];
  for word in header_words.iter_mut() {
    *word = try_read_word(toc).ok()??;
  }
  let header = ContainerHeader::from_words(&header_words).ok()?;

  let cmp_len = cmp.seek(SeekFrom::End(0)).ok()?;
  let toc_len = toc.seek(SeekFrom::End(0)).ok()?;
  let expected_toc_len =
    words_to_bytes(HEADERSZ) + (header.resume_num as u64) * words_to_bytes(EACH_HEADER_TOC_SZ);
  if cmp_len < words_to_bytes(header.resume_pos as usize) || toc_len < expected_toc_len {
    return None;
  }

  Some(ResumeState {
    resume_num: header.resume_num as u64,
    resume_pos: header.resume_pos as u64,
    resume_len: header.resume_len,
  })
}

/// Runs the per-list encode pipeline over `input`, appending to `cmp` and
/// `toc`. `on_violation` is called once per `OrderingViolation` observed
/// (the source prints these to stderr; this is the non-fatal, observable
/// replacement, per spec §9). `total_words_hint` feeds `BuildProgress`;
/// pass 0 if the total input size is unknown ahead of time.
pub fn encode_container<R, C, T>(
  input: &mut R,
  cmp: &mut C,
  toc: &mut T,
  config: &EncodeConfig,
  resume: bool,
  total_words_hint: u64,
  mut on_violation: impl FnMut(&OrderingViolation),
) -> PfdResult<BuildProgress>
where
  R: Read,
  C: Write + Seek + Durable,
  T: Read + Write + Seek + Durable,
{
  encode_container_with_progress(
    input,
    cmp,
    toc,
    config,
    resume,
    total_words_hint,
    &mut on_violation,
    |_| {},
  )
}

/// As [`encode_container`], but also calls `on_progress` after every list
/// seen (decoded or skipped), mirroring the source's per-iteration
/// progress display. Split out so callers that don't need a live progress
/// indicator (tests, the plain library API) don't pay for the extra
/// closure parameter.
pub fn encode_container_with_progress<R, C, T>(
  input: &mut R,
  cmp: &mut C,
  toc: &mut T,
  config: &EncodeConfig,
  resume: bool,
  total_words_hint: u64,
  mut on_violation: impl FnMut(&OrderingViolation),
  mut on_progress: impl FnMut(&BuildProgress),
) -> PfdResult<BuildProgress>
where
  R: Read,
  C: Write + Seek + Durable,
  T: Read + Write + Seek + Durable,
{
  let codec = codec::dispatch(config.codec_id, config.block_size)?;
  let scratch_cap = 2 * (config.max_len as usize) + 64;
  let mut list_buf: Vec<u32> = Vec::with_capacity(config.max_len as usize);
  let mut gap_buf: Vec<u32> = Vec::with_capacity(config.max_len as usize);
  let mut cmp_scratch: Vec<u32> = vec![0; scratch_cap];

  let mut progress = BuildProgress {
    words_total: total_words_hint,
    ..BuildProgress::default()
  };

  let resume_state = if resume {
    try_resume(cmp, toc)
  } else {
    None
  };

  let mut cmp_pos_words = match resume_state {
    Some(state) => {
      cmp.seek(SeekFrom::Start(words_to_bytes(state.resume_pos as usize)))?;
      let toc_pos =
        words_to_bytes(HEADERSZ) + state.resume_num * words_to_bytes(EACH_HEADER_TOC_SZ);
      toc.seek(SeekFrom::Start(toc_pos))?;
      skip_words(input, state.resume_len)?;
      progress.words_read = state.resume_len;
      progress.lists_seen = state.resume_num;
      state.resume_pos
    }
    None => {
      cmp.seek(SeekFrom::Start(0))?;
      toc.seek(SeekFrom::Start(words_to_bytes(HEADERSZ)))?;
      write_header(toc, ContainerHeader::default())?;
      0u64
    }
  };

  loop {
    let n = match try_read_word(input)? {
      None => break,
      Some(n) => n,
    };
    progress.words_read += 1;

    list_buf.clear();
    for _ in 0..n {
      list_buf.push(read_word(input)?);
    }
    progress.words_read += n as u64;
    progress.lists_seen += 1;
    on_progress(&progress);

    if n <= config.skip || n >= config.max_len {
      continue;
    }

    let first = list_buf[0];
    let csize = if config.codec_id.bypasses_gap_transform() {
      codec.encode_array(&list_buf, &mut cmp_scratch)?
    } else {
      gap_buf.clear();
      let (gaps, violations) = gap::gap_encode(&list_buf);
      gap_buf.extend_from_slice(&gaps);
      for violation in &violations {
        on_violation(violation);
      }
      progress.violations += violations.len() as u64;
      codec.encode_array(&gap_buf, &mut cmp_scratch)?
    };

    write_words(cmp, &cmp_scratch[..csize])?;
    let entry = TocEntry {
      num: n,
      first_doc: first,
      cmp_offset: cmp_pos_words,
    };
    write_words(toc, &entry.to_words())?;
    cmp_pos_words += csize as u64;
    progress.lists_encoded += 1;

    if config.checkpoint_interval > 0 && progress.lists_seen % config.checkpoint_interval == 0 {
      checkpoint(cmp, toc, cmp_pos_words, progress.lists_seen, progress.words_read)?;
    }
  }

  checkpoint(cmp, toc, cmp_pos_words, progress.lists_seen, progress.words_read)?;
  Ok(progress)
}

fn skip_words<R: Read>(r: &mut R, count: u64) -> PfdResult<()> {
  let mut remaining = count;
  let mut buf = [0u8; 4096];
  while remaining > 0 {
    let words_this_chunk = remaining.min((buf.len() / 4) as u64) as usize;
    let bytes = words_this_chunk * 4;
    r.read_exact(&mut buf[..bytes])?;
    remaining -= words_this_chunk as u64;
  }
  Ok(())
}

fn checkpoint<C: Write + Seek + Durable, T: Write + Seek + Durable>(
  cmp: &mut C,
  toc: &mut T,
  cmp_pos_words: u64,
  lists_seen: u64,
  words_read: u64,
) -> PfdResult<()> {
  cmp.flush()?;
  cmp.sync_durable()?;
  let header = ContainerHeader {
    resume_num: lists_seen.min(u32::MAX as u64) as u32,
    resume_pos: cmp_pos_words.min(u32::MAX as u64) as u32,
    resume_len: words_read,
    ..ContainerHeader::default()
  };
  write_header(toc, header)?;
  toc.flush()?;
  toc.sync_durable()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::codec::CodecId;
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
  fn test_empty_input_produces_header_only_toc() {
    let mut input = Cursor::new(Vec::new());
    let mut cmp = Cursor::new(Vec::new());
    let mut toc = Cursor::new(Vec::new());
    let config = EncodeConfig::default();
    let progress = encode_container(
      &mut input, &mut cmp, &mut toc, &config, false, 0, |_| {},
    )
    .unwrap();
    assert_eq!(progress.lists_seen, 0);
    assert!(cmp.get_ref().is_empty());
    assert_eq!(toc.get_ref().len(), HEADERSZ * 4);
  }

  #[test]
  fn test_skips_short_and_long_lists() {
    let raw = encode_words(&[(1, &[7]), (0, &[])]);
    let mut input = Cursor::new(raw);
    let mut cmp = Cursor::new(Vec::new());
    let mut toc = Cursor::new(Vec::new());
    let config = EncodeConfig::default();
    let progress = encode_container(
      &mut input, &mut cmp, &mut toc, &config, false, 0, |_| {},
    )
    .unwrap();
    assert_eq!(progress.lists_seen, 2);
    assert_eq!(progress.lists_encoded, 0);
    assert!(cmp.get_ref().is_empty());
  }

  #[test]
  fn test_encodes_one_list_and_toc_has_one_entry() {
    let list = [10u32, 20, 30, 45];
    let raw = encode_words(&[(list.len() as u32, &list)]);
    let mut input = Cursor::new(raw);
    let mut cmp = Cursor::new(Vec::new());
    let mut toc = Cursor::new(Vec::new());
    let config = EncodeConfig::default().with_codec_id(CodecId::OptPForDelta);
    let progress = encode_container(
      &mut input, &mut cmp, &mut toc, &config, false, 0, |_| {},
    )
    .unwrap();
    assert_eq!(progress.lists_encoded, 1);
    assert!(!cmp.get_ref().is_empty());
    assert_eq!(toc.get_ref().len(), (HEADERSZ + EACH_HEADER_TOC_SZ) * 4);
  }

  #[test]
  fn test_resume_picks_up_where_it_left_off() {
    let list_a = [1u32, 2, 3, 4, 5];
    let list_b = [100u32, 200, 300];
    let raw = encode_words(&[
      (list_a.len() as u32, &list_a),
      (list_b.len() as u32, &list_b),
    ]);

    let mut cmp = Cursor::new(Vec::new());
    let mut toc = Cursor::new(Vec::new());
    let config = EncodeConfig::default();

    {
      let first_pass_len = raw.len() - (list_b.len() + 1) * 4;
      let mut input = Cursor::new(raw[..first_pass_len].to_vec());
      let progress = encode_container(
        &mut input, &mut cmp, &mut toc, &config, false, 0, |_| {},
      )
      .unwrap();
      assert_eq!(progress.lists_encoded, 1);
    }

    let mut full_input = Cursor::new(raw);
    let progress = encode_container(
      &mut full_input,
      &mut cmp,
      &mut toc,
      &config,
      true,
      0,
      |_| {},
    )
    .unwrap();
    assert_eq!(progress.lists_encoded, 1);
    assert_eq!(toc.get_ref().len(), (HEADERSZ + 2 * EACH_HEADER_TOC_SZ) * 4);
  }

  #[test]
  fn test_ordering_violation_is_observable() {
    let list = [10u32, 5, 20];
    let raw = encode_words(&[(list.len() as u32, &list)]);
    let mut input = Cursor::new(raw);
    let mut cmp = Cursor::new(Vec::new());
    let mut toc = Cursor::new(Vec::new());
    let config = EncodeConfig::default();
    let mut seen = Vec::new();
    let progress = encode_container(&mut input, &mut cmp, &mut toc, &config, false, 0, |v| {
      seen.push(*v)
    })
    .unwrap();
    assert_eq!(progress.violations, 1);
    assert_eq!(seen.len(), 1);
  }
}
