use anyhow::Result;
use pfordelta::CodecId;

pub fn list_codecs() -> Result<()> {
  println!("{:>3}  {:<26}{:<10}{}", "id", "name", "ext", "implemented");
  for codec_id in CodecId::all() {
    println!(
      "{:>3}  {:<26}{:<10}{}",
      codec_id as u8,
      codec_id.name(),
      codec_id.extension(),
      codec_id.is_implemented(),
    );
  }
  Ok(())
}
