use std::fs::File;
use std::io::{stdout, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use pfordelta::container::decode_container;
use pfordelta::dispatch;

use crate::opt::DecodeOpt;
use crate::parse;

const TOC_EXT: &str = ".toc";

pub fn decode(opt: DecodeOpt) -> Result<()> {
  let codec_id = parse::codec_id(&opt.codec)?;
  let toc_path = PathBuf::from(format!("{}{}", opt.cmpfile.display(), TOC_EXT));

  let mut cmp = BufReader::new(
    File::open(&opt.cmpfile).with_context(|| format!("opening {}", opt.cmpfile.display()))?,
  );
  let mut toc = BufReader::new(
    File::open(&toc_path).with_context(|| format!("opening {}", toc_path.display()))?,
  );

  let codec = dispatch(codec_id, opt.block_size)?;
  let (header, lists) = decode_container(&mut toc, &mut cmp, codec.as_ref())
    .with_context(|| format!("decoding {}", opt.cmpfile.display()))?;

  let mut out: Box<dyn Write> = match &opt.outfile {
    Some(path) => Box::new(BufWriter::new(
      File::create(path).with_context(|| format!("creating {}", path.display()))?,
    )),
    None => Box::new(BufWriter::new(stdout())),
  };
  for list in &lists {
    out.write_all(&(list.len() as u32).to_le_bytes())?;
    for &v in list {
      out.write_all(&v.to_le_bytes())?;
    }
  }
  out.flush()?;

  eprintln!(
    "decoded {} lists from {} (resume_num at last checkpoint: {})",
    lists.len(),
    opt.cmpfile.display(),
    header.resume_num,
  );
  Ok(())
}
