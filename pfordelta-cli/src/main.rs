use anyhow::Result;
use clap::Parser;

use crate::opt::{Opt, OptWrapper};

mod decode;
mod encode;
mod list_codecs;
mod opt;
mod parse;

fn main() -> Result<()> {
  let opt = OptWrapper::parse().opt;
  match opt {
    Opt::Encode(encode_opt) => encode::encode(encode_opt),
    Opt::Decode(decode_opt) => decode::decode(decode_opt),
    Opt::ListCodecs => list_codecs::list_codecs(),
  }
}
