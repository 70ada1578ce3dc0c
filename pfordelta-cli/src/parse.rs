use anyhow::{anyhow, Result};
use pfordelta::CodecId;

pub fn codec_id(s: &str) -> Result<CodecId> {
  CodecId::from_name_or_id(s).map_err(|e| anyhow!("{}", e))
}
