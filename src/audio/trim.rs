//! Silence trimming and peak normalization.
//!
//! Activity detection works on 10 ms windows. A window is "active" when its RMS level is at
//! least `ACTIVITY_FLOOR_DBFS + activity_threshold`. Activity starts at the first active window
//! that begins a run lasting `min_activity_ms`, where quiet gaps up to `max_gap_ms` do not break
//! the run. The same scan runs backwards from the end to find where activity stops.

/// Width of one level window.
pub const LEVEL_WINDOW_MS: u32 = 10;

/// The level `activity_threshold` is measured up from.
pub const ACTIVITY_FLOOR_DBFS: f32 = -60.0;

/// Knobs for finding one edge of the audible part of a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimPolicy {
    /// dB above `ACTIVITY_FLOOR_DBFS` a window must reach to count as active.
    pub activity_threshold: f32,

    /// Minimum length of a run of activity.
    pub min_activity_ms: u32,

    /// Longest quiet stretch tolerated inside a run.
    pub max_gap_ms: u32,

    /// Audio kept outside the detected edge.
    pub pad_ms: u32,
}

impl TrimPolicy {
    pub fn threshold_dbfs(&self) -> f32 {
        ACTIVITY_FLOOR_DBFS + self.activity_threshold
    }
}

/// Where the audible part of a track starts and ends, in frames (`end` exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimBounds {
    pub start: usize,
    pub end: usize,
}

/// Find the frames to keep. `None` when no activity satisfies the policies.
pub fn find_trim_bounds(
    samples: &[f32],
    channels: usize,
    sample_rate: u32,
    leading: &TrimPolicy,
    trailing: &TrimPolicy,
) -> Option<TrimBounds> {
    if channels == 0 || sample_rate == 0 {
        return None;
    }

    let frames = samples.len() / channels;
    let window_frames = ms_to_frames(LEVEL_WINDOW_MS, sample_rate).max(1);
    let levels = window_levels_dbfs(samples, channels, window_frames);

    let first = find_activity(
        &levels,
        leading.threshold_dbfs(),
        ms_to_windows(leading.min_activity_ms),
        ms_to_windows(leading.max_gap_ms),
    )?;

    let reversed: Vec<f32> = levels.iter().rev().copied().collect();
    let last_from_end = find_activity(
        &reversed,
        trailing.threshold_dbfs(),
        ms_to_windows(trailing.min_activity_ms),
        ms_to_windows(trailing.max_gap_ms),
    )?;
    let last = levels.len() - 1 - last_from_end;

    let start = (first * window_frames).saturating_sub(ms_to_frames(leading.pad_ms, sample_rate));
    let end = ((last + 1) * window_frames + ms_to_frames(trailing.pad_ms, sample_rate)).min(frames);

    (start < end).then_some(TrimBounds { start, end })
}

/// RMS level of each window of `window_frames` frames, in dBFS. The last window may be short.
pub fn window_levels_dbfs(samples: &[f32], channels: usize, window_frames: usize) -> Vec<f32> {
    samples
        .chunks(window_frames * channels)
        .map(|window| {
            let energy: f32 = window.iter().map(|s| s * s).sum();
            let rms = (energy / window.len() as f32).sqrt();
            amplitude_to_db(rms)
        })
        .collect()
}

/// Index of the first window that starts a qualifying run of activity.
pub fn find_activity(
    levels: &[f32],
    threshold_dbfs: f32,
    min_active_windows: usize,
    max_gap_windows: usize,
) -> Option<usize> {
    let mut i = 0;
    while i < levels.len() {
        if levels[i] < threshold_dbfs {
            i += 1;
            continue;
        }

        let start = i;
        let mut last_active = i;
        let mut j = i;
        loop {
            if last_active + 1 - start >= min_active_windows {
                return Some(start);
            }
            j += 1;
            if j >= levels.len() {
                break;
            }
            if levels[j] >= threshold_dbfs {
                last_active = j;
            } else if j - last_active > max_gap_windows {
                break;
            }
        }

        i = last_active + 1;
    }
    None
}

/// Scale `samples` so the loudest one sits at `target_dbfs`. Returns the gain applied, in dB.
///
/// Digital silence is left alone (gain 0 dB).
pub fn normalize_peak(samples: &mut [f32], target_dbfs: f32) -> f32 {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak <= f32::EPSILON {
        return 0.0;
    }

    let gain = db_to_amplitude(target_dbfs) / peak;
    for s in samples.iter_mut() {
        *s *= gain;
    }
    amplitude_to_db(gain)
}

pub fn db_to_amplitude(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

pub fn amplitude_to_db(amplitude: f32) -> f32 {
    20.0 * amplitude.max(1e-10).log10()
}

fn ms_to_frames(ms: u32, sample_rate: u32) -> usize {
    (u64::from(ms) * u64::from(sample_rate) / 1000) as usize
}

fn ms_to_windows(ms: u32) -> usize {
    ms.div_ceil(LEVEL_WINDOW_MS) as usize
}
