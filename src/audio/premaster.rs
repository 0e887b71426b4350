//! Premastering: trim the silence around a track and normalize its peak level.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::Serialize;
use tracing::info;

use crate::Result;
use crate::audio::decoder::{DecodedAudio, decode_file};
use crate::audio::trim::{TrimPolicy, find_trim_bounds, normalize_peak};
use crate::audio::wav::write_wav;

/// Suffix added to the input's stem to name the premastered file.
pub const PREMASTER_SUFFIX: &str = "__premaster";

/// Leading activity threshold before the user's subtrahend is applied.
const LEADING_THRESHOLD: f32 = 7.0;

/// Options that control how a track is premastered.
///
/// This is library-level configuration; the CLI maps its flags onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct PremasterOpts {
    /// Where the track starts. Quick, short pad so the first transient is kept tight.
    pub leading: TrimPolicy,

    /// Where the track ends. Lower threshold and a long pad let the ending ring out.
    pub trailing: TrimPolicy,

    /// Peak level after normalization.
    pub target_peak_dbfs: f32,
}

impl PremasterOpts {
    /// Defaults with the leading threshold lowered by `threshold_subtrahend` dB.
    ///
    /// Raising the subtrahend makes quiet intros count as the start of the track.
    pub fn with_threshold_subtrahend(threshold_subtrahend: i32) -> Self {
        let mut opts = Self::default();
        opts.leading.activity_threshold = LEADING_THRESHOLD - threshold_subtrahend as f32;
        opts
    }
}

impl Default for PremasterOpts {
    fn default() -> Self {
        Self {
            leading: TrimPolicy {
                activity_threshold: LEADING_THRESHOLD,
                min_activity_ms: 500,
                max_gap_ms: 250,
                pad_ms: 200,
            },
            trailing: TrimPolicy {
                activity_threshold: 3.0,
                min_activity_ms: 500,
                max_gap_ms: 250,
                pad_ms: 2_000,
            },
            target_peak_dbfs: -0.2,
        }
    }
}

/// What premastering did to one track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremasterReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sample_rate: u32,
    pub channels: usize,
    pub input_frames: usize,
    pub output_frames: usize,
    pub leading_trimmed_frames: usize,
    pub trailing_trimmed_frames: usize,
    pub gain_db: f32,
}

/// `<dir>/<stem>__premaster.wav` next to `input`.
pub fn premaster_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{PREMASTER_SUFFIX}.wav"))
}

/// Decode `input`, trim its leading and trailing silence, normalize it, and write it to
/// `output` as WAV (the extension is forced to `.wav`).
pub fn premaster_single_track(
    input: &Path,
    output: &Path,
    opts: &PremasterOpts,
) -> Result<PremasterReport> {
    let output = output.with_extension("wav");
    let audio = decode_file(input)?;
    let input_frames = audio.frames();

    let bounds = find_trim_bounds(
        &audio.samples,
        audio.channels,
        audio.sample_rate,
        &opts.leading,
        &opts.trailing,
    )
    .ok_or_else(|| anyhow!("no audio activity detected in {}", input.display()))?;

    let mut trimmed = DecodedAudio {
        samples: audio.samples[bounds.start * audio.channels..bounds.end * audio.channels].to_vec(),
        channels: audio.channels,
        sample_rate: audio.sample_rate,
    };
    let gain_db = normalize_peak(&mut trimmed.samples, opts.target_peak_dbfs);

    write_wav(&output, &trimmed)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let report = PremasterReport {
        input: input.to_path_buf(),
        output,
        sample_rate: trimmed.sample_rate,
        channels: trimmed.channels,
        input_frames,
        output_frames: trimmed.frames(),
        leading_trimmed_frames: bounds.start,
        trailing_trimmed_frames: input_frames - bounds.end,
        gain_db,
    };

    info!(
        input = %report.input.display(),
        output = %report.output.display(),
        gain_db = report.gain_db,
        "track premastered"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_sits_next_to_input() {
        assert_eq!(
            premaster_output_path(Path::new("/music/take 3.flac")),
            PathBuf::from("/music/take 3__premaster.wav")
        );
    }

    #[test]
    fn subtrahend_lowers_only_the_leading_threshold() {
        let opts = PremasterOpts::with_threshold_subtrahend(2);
        assert_eq!(opts.leading.activity_threshold, 5.0);
        assert_eq!(opts.trailing, PremasterOpts::default().trailing);
    }
}
