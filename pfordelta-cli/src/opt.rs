use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[command(about = "encode and decode posting-list containers with PForDelta-family codecs")]
pub struct OptWrapper {
  #[command(subcommand)]
  pub opt: Opt,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Opt {
  /// Build a compressed container from a raw list-of-lists file.
  Encode(EncodeOpt),
  /// Reconstruct the original lists from a compressed container.
  Decode(DecodeOpt),
  /// Print the codec id/name table and exit.
  ListCodecs,
}

#[derive(Clone, Debug, Parser)]
pub struct EncodeOpt {
  /// Raw input file: records of `(n: u32, v_0, ..., v_{n-1})`, little-endian.
  pub infile: PathBuf,

  /// Codec to encode with, by numeric id (0-13) or name (e.g. "opt-pfordelta").
  #[arg(long, short = 'c', default_value = "opt-pfordelta")]
  pub codec: String,

  /// Block size for the block-structured codecs.
  #[arg(long, default_value_t = 128)]
  pub block_size: usize,

  /// Lists of length `<= skip` are read but not encoded.
  #[arg(long, default_value_t = 1)]
  pub skip: u32,

  /// Lists of length `>= max-len` are read but not encoded.
  #[arg(long, default_value_t = 1 << 20)]
  pub max_len: u32,

  /// Rewrite the header after this many lists have been durably appended.
  #[arg(long, default_value_t = 1_000_000)]
  pub checkpoint_interval: u64,

  /// Show a progress indicator while encoding.
  #[arg(short = 'p')]
  pub progress: bool,

  /// Try to resume from an existing, possibly interrupted, container.
  #[arg(short = 'r')]
  pub resume: bool,
}

#[derive(Clone, Debug, Parser)]
pub struct DecodeOpt {
  /// The compressed payload file; its `<infile>.toc` file must sit
  /// alongside it.
  pub cmpfile: PathBuf,

  /// Codec the container was encoded with, by numeric id or name.
  #[arg(long, short = 'c', default_value = "opt-pfordelta")]
  pub codec: String,

  /// Block size the container was encoded with.
  #[arg(long, default_value_t = 128)]
  pub block_size: usize,

  /// Where to write the reconstructed list-of-lists file (defaults to
  /// stdout).
  #[arg(long, short = 'o')]
  pub outfile: Option<PathBuf>,
}
