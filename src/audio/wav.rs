use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::NamedTempFile;

use crate::audio::decoder::DecodedAudio;

/// Bit depth of premastered output.
pub const OUTPUT_BITS_PER_SAMPLE: u16 = 24;

/// Write `audio` as 24-bit integer PCM WAV.
///
/// The file is written to a temporary file in the destination directory and moved into place
/// once complete, so an interrupted run never leaves a truncated file at `path`.
pub fn write_wav(path: &Path, audio: &DecodedAudio) -> Result<()> {
    ensure!(audio.channels > 0, "cannot write audio with zero channels");
    let channels = u16::try_from(audio.channels).context("too many channels for WAV")?;

    let spec = WavSpec {
        channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: OUTPUT_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create a temporary file in {}", dir.display()))?;

    {
        let mut writer = WavWriter::new(BufWriter::new(tmp.as_file_mut()), spec)
            .context("failed to start WAV output")?;

        let full_scale = ((1i32 << (OUTPUT_BITS_PER_SAMPLE - 1)) - 1) as f32;
        for &sample in &audio.samples {
            let pcm = (sample.clamp(-1.0, 1.0) * full_scale).round() as i32;
            writer.write_sample(pcm)?;
        }
        writer.finalize().context("failed to finish WAV output")?;
    }

    tmp.persist(path)
        .with_context(|| format!("failed to move output into place at {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;

    #[test]
    fn writes_readable_24_bit_wav() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.wav");
        let audio = DecodedAudio {
            samples: vec![0.0, 1.0, -1.0, 0.5],
            channels: 2,
            sample_rate: 48_000,
        };

        write_wav(&path, &audio)?;

        let mut reader = WavReader::open(&path)?;
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 48_000);
        assert_eq!(spec.bits_per_sample, 24);

        let samples: Vec<i32> = reader.samples::<i32>().collect::<Result<_, _>>()?;
        assert_eq!(samples, vec![0, 8_388_607, -8_388_607, 4_194_304]);
        Ok(())
    }
}
