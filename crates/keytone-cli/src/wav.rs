//! WAV output for rendered audio.

use hound::{SampleFormat, WavWriter};
use std::path::Path;

/// Write interleaved f32 samples as a 32-bit float WAV file.
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    channels: u16,
    sample_rate: u32,
) -> hound::Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}
