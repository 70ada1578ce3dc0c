//! Concrete scenarios.

use crate::codec::{self, CodecId};
use crate::gap;

fn round_trip(codec_id: CodecId, values: &[u32]) -> Vec<u32> {
  let codec = codec::dispatch_default(codec_id).unwrap();
  let mut buf = vec![0u32; 2 * values.len() + 64];
  let words = codec.encode_array(values, &mut buf).unwrap();
  let mut out = vec![0u32; values.len()];
  codec
    .decode_array(&buf[..words], &mut out, values.len())
    .unwrap();
  out
}

#[test]
fn scenario_single_element_list_with_pfordelta() {
  let list = [10u32, 20, 30];
  let (gaps, violations) = gap::gap_encode(&list);
  assert!(violations.is_empty());
  assert_eq!(gaps, vec![9, 9]);

  let decoded_gaps = round_trip(CodecId::PForDelta, &gaps);
  assert_eq!(gap::gap_decode(list[0], &decoded_gaps), list);
}

#[test]
fn scenario_identity_list_with_opt_pfordelta() {
  let list: Vec<u32> = (0..128).collect();
  let (gaps, _) = gap::gap_encode(&list);
  assert!(gaps.iter().all(|&g| g == 0));

  let decoded_gaps = round_trip(CodecId::OptPForDelta, &gaps);
  assert_eq!(gap::gap_decode(list[0], &decoded_gaps), list);
}

#[test]
fn scenario_one_outlier_with_opt_pfordelta() {
  let list = [1u32, 2, 3, 4, 1_000_000];
  let (gaps, _) = gap::gap_encode(&list);
  assert_eq!(gaps, vec![0, 0, 0, 999_995]);

  let decoded_gaps = round_trip(CodecId::OptPForDelta, &gaps);
  assert_eq!(gap::gap_decode(list[0], &decoded_gaps), list);
}

#[test]
fn scenario_non_ascending_input_warns_but_round_trips() {
  let list = [5u32, 3];
  let (gaps, violations) = gap::gap_encode(&list);
  assert_eq!(violations.len(), 1);

  let decoded_gaps = round_trip(CodecId::PForDelta, &gaps);
  assert_eq!(gap::gap_decode(list[0], &decoded_gaps), list);
}
