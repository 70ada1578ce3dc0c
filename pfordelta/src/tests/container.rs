use std::io::{Cursor, Seek, SeekFrom};

use crate::codec::{self, CodecId};
use crate::config::EncodeConfig;
use crate::container::{decode_container, encode_container};

use super::utils::ascending_list;

fn encode_input_records(records: &[Vec<u32>]) -> Vec<u8> {
  let mut buf = Vec::new();
  for list in records {
    buf.extend_from_slice(&(list.len() as u32).to_le_bytes());
    for &v in list {
      buf.extend_from_slice(&v.to_le_bytes());
    }
  }
  buf
}

#[test]
fn empty_input_produces_header_only_container() {
  let mut input = Cursor::new(Vec::new());
  let mut cmp = Cursor::new(Vec::new());
  let mut toc = Cursor::new(Vec::new());
  let config = EncodeConfig::default();
  let progress =
    encode_container(&mut input, &mut cmp, &mut toc, &config, false, 0, |_| {}).unwrap();
  assert_eq!(progress.lists_seen, 0);
  assert!(cmp.get_ref().is_empty());

  toc.seek(SeekFrom::Start(0)).unwrap();
  cmp.seek(SeekFrom::Start(0)).unwrap();
  let codec = codec::dispatch_default(config.codec_id).unwrap();
  let (_, lists) = decode_container(&mut toc, &mut cmp, codec.as_ref()).unwrap();
  assert!(lists.is_empty());
}

#[test]
fn container_round_trips_many_lists() {
  let lists: Vec<Vec<u32>> = (0..25).map(|i| ascending_list(i, 10 + i as usize * 7)).collect();
  let raw = encode_input_records(&lists);

  let mut input = Cursor::new(raw);
  let mut cmp = Cursor::new(Vec::new());
  let mut toc = Cursor::new(Vec::new());
  let config = EncodeConfig::default().with_codec_id(CodecId::OptPForDelta);
  encode_container(&mut input, &mut cmp, &mut toc, &config, false, 0, |_| {}).unwrap();

  toc.seek(SeekFrom::Start(0)).unwrap();
  cmp.seek(SeekFrom::Start(0)).unwrap();
  let codec = codec::dispatch_default(config.codec_id).unwrap();
  let (_, decoded) = decode_container(&mut toc, &mut cmp, codec.as_ref()).unwrap();
  assert_eq!(decoded, lists);
}

#[test]
fn toc_cmp_offsets_are_monotone_non_decreasing() {
  let lists: Vec<Vec<u32>> = (0..15).map(|i| ascending_list(i + 100, 5 + i as usize * 3)).collect();
  let raw = encode_input_records(&lists);

  let mut input = Cursor::new(raw);
  let mut cmp = Cursor::new(Vec::new());
  let mut toc = Cursor::new(Vec::new());
  let config = EncodeConfig::default();
  encode_container(&mut input, &mut cmp, &mut toc, &config, false, 0, |_| {}).unwrap();

  toc.seek(SeekFrom::Start(0)).unwrap();
  let (_, entries) = crate::container::read_toc(&mut toc).unwrap();
  assert_eq!(entries.len(), lists.len());
  for pair in entries.windows(2) {
    assert!(pair[1].cmp_offset >= pair[0].cmp_offset);
  }
}

#[test]
fn resuming_after_a_simulated_crash_matches_one_shot_encoding() {
  let lists: Vec<Vec<u32>> = (0..40).map(|i| ascending_list(i + 500, 8 + i as usize * 2)).collect();
  let raw = encode_input_records(&lists);
  let config = EncodeConfig::default().with_checkpoint_interval(10);

  // One-shot reference run.
  let mut one_shot_cmp = Cursor::new(Vec::new());
  let mut one_shot_toc = Cursor::new(Vec::new());
  {
    let mut input = Cursor::new(raw.clone());
    encode_container(
      &mut input,
      &mut one_shot_cmp,
      &mut one_shot_toc,
      &config,
      false,
      0,
      |_| {},
    )
    .unwrap();
  }

  // Simulated crash: encode only the first half, "restart", then resume.
  let midpoint_bytes = encode_input_records(&lists[..20]).len();
  let mut cmp = Cursor::new(Vec::new());
  let mut toc = Cursor::new(Vec::new());
  {
    let mut input = Cursor::new(raw[..midpoint_bytes].to_vec());
    encode_container(&mut input, &mut cmp, &mut toc, &config, false, 0, |_| {}).unwrap();
  }

  let mut input = Cursor::new(raw);
  encode_container(&mut input, &mut cmp, &mut toc, &config, true, 0, |_| {}).unwrap();

  assert_eq!(cmp.get_ref(), one_shot_cmp.get_ref());
  assert_eq!(toc.get_ref(), one_shot_toc.get_ref());
}
