use crate::error::Result;
use crate::types::synthesis::SampleBuffer;
use std::path::Path;

/// Writes mono 16 bit PCM.
pub fn samples(sample_rate: u32, samples: &[i16], filename: &Path) -> Result<()> {
  let spec = hound::WavSpec {
    channels: 1,
    sample_rate,
    bits_per_sample: 16,
    sample_format: hound::SampleFormat::Int,
  };
  let mut writer = hound::WavWriter::create(filename, spec)?;
  for &sample in samples {
    writer.write_sample(sample)?;
  }
  writer.finalize()?;
  Ok(())
}

/// Reads back a file written by [`samples`].
pub fn read_samples(filename: &Path) -> Result<(hound::WavSpec, SampleBuffer)> {
  let mut reader = hound::WavReader::open(filename)?;
  let spec = reader.spec();
  let buffer = reader.samples::<i16>().collect::<std::result::Result<SampleBuffer, hound::Error>>()?;
  Ok((spec, buffer))
}
