use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use pfordelta::container::encode_container_with_progress;
use pfordelta::EncodeConfig;

use crate::opt::EncodeOpt;
use crate::parse;

const TOC_EXT: &str = ".toc";

pub fn encode(opt: EncodeOpt) -> Result<()> {
  let codec_id = parse::codec_id(&opt.codec)?;
  if !codec_id.is_implemented() {
    anyhow::bail!(
      "codec '{}' is an out-of-scope external collaborator; this tool only implements \
       pfordelta and opt-pfordelta",
      opt.codec
    );
  }

  let cmp_path = PathBuf::from(format!(
    "{}{}",
    opt.infile.display(),
    codec_id.extension()
  ));
  let toc_path = PathBuf::from(format!("{}{}", cmp_path.display(), TOC_EXT));

  let input_len_words = std::fs::metadata(&opt.infile)
    .with_context(|| format!("reading metadata for {}", opt.infile.display()))?
    .len()
    / 4;

  let mut input = BufReader::new(
    File::open(&opt.infile).with_context(|| format!("opening {}", opt.infile.display()))?,
  );
  let mut cmp = open_rw(&cmp_path, opt.resume)?;
  let mut toc = open_rw(&toc_path, opt.resume)?;

  let config = EncodeConfig::default()
    .with_codec_id(codec_id)
    .with_block_size(opt.block_size)
    .with_skip(opt.skip)
    .with_max_len(opt.max_len)
    .with_checkpoint_interval(opt.checkpoint_interval);

  let bar = opt.progress.then(|| {
    let bar = ProgressBar::new(input_len_words.max(1));
    bar.set_style(
      ProgressStyle::default_bar()
        .template("{bar:40} {percent}% eta {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
  });

  let mut n_violations = 0u64;
  let progress = encode_container_with_progress(
    &mut input,
    &mut cmp,
    &mut toc,
    &config,
    opt.resume,
    input_len_words,
    |violation| {
      n_violations += 1;
      eprintln!(
        "list ordering exception: value at index {} ({}) is not greater than its predecessor ({})",
        violation.index, violation.cur, violation.prev,
      );
    },
    |build_progress| {
      if let Some(bar) = &bar {
        bar.set_position(build_progress.words_read);
      }
    },
  )?;

  if let Some(bar) = bar {
    bar.finish_and_clear();
  }

  eprintln!(
    "encoded {} of {} lists seen ({} skipped, {} ordering exceptions) into {}",
    progress.lists_encoded,
    progress.lists_seen,
    progress.lists_seen - progress.lists_encoded,
    n_violations,
    cmp_path.display(),
  );
  Ok(())
}

fn open_rw(path: &Path, resume: bool) -> Result<File> {
  let mut options = OpenOptions::new();
  options.read(true).write(true).create(true);
  if !resume {
    options.truncate(true);
  }
  options
    .open(path)
    .with_context(|| format!("opening {}", path.display()))
}
