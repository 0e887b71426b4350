//! Decode a media file into interleaved `f32` PCM with Symphonia.
//!
//! Unlike a streaming pipeline we keep every channel and the source sample rate: premastering
//! must hand back the same layout it was given. The whole track is held in memory.
//!
//! Responsibilities:
//! - probe the container and select the first decodable audio track
//! - decode packets, skipping corrupt frames
//! - collect decoded buffers into one interleaved buffer

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, Track};
use symphonia::core::io::{MediaSource, MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// A fully decoded track.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }
}

/// Decode the whole file at `path`. The extension is used as a probe hint.
pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let hint = path.extension().and_then(|ext| ext.to_str());

    decode_source(Box::new(file), hint)
        .with_context(|| format!("failed to decode {}", path.display()))
}

fn decode_source(source: Box<dyn MediaSource>, hint_extension: Option<&str>) -> Result<DecodedAudio> {
    let (mut format, track) = probe_and_pick_track(source, hint_extension)?;
    let mut decoder = make_decoder(&track)?;
    let mut collector = PcmCollector::default();

    while let Some(packet) = next_packet(&mut format)? {
        // Ignore packets from other tracks.
        if packet.track_id() != track.id {
            continue;
        }
        decode_packet_and_then(&mut decoder, &packet, |decoded| collector.push(&decoded))?;
    }

    collector.finish()
}

/// Probe the container and pick the first track that has a codec and a known sample rate.
fn probe_and_pick_track(
    source: Box<dyn MediaSource>,
    hint_extension: Option<&str>,
) -> Result<(Box<dyn FormatReader>, Track)> {
    let mss_opts = MediaSourceStreamOptions {
        // Symphonia expects a power-of-two buffer > 32KiB for good probing behavior.
        buffer_len: 256 * 1024,
    };
    let mss = MediaSourceStream::new(source, mss_opts);

    let mut hint = Hint::new();
    if let Some(ext) = hint_extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| anyhow!(e))
        .context("failed to probe media")?;

    let format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .cloned()
        .ok_or_else(|| anyhow!("no audio track found"))?;

    Ok((format, track))
}

fn make_decoder(track: &Track) -> Result<Box<dyn Decoder>> {
    symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| anyhow!(e))
        .context("failed to create decoder for audio track")
}

/// `Ok(None)` at end of stream. Symphonia reports EOF as an IO error.
fn next_packet(format: &mut Box<dyn FormatReader>) -> Result<Option<Packet>> {
    match format.next_packet() {
        Ok(packet) => Ok(Some(packet)),
        Err(SymphoniaError::IoError(_)) => Ok(None),
        Err(e) => Err(anyhow!(e)).context("failed reading packet"),
    }
}

/// Decode one packet and hand the buffer to `on_decoded`.
///
/// Corrupt frames are skipped; anything other than a decode or IO error is fatal.
fn decode_packet_and_then(
    decoder: &mut Box<dyn Decoder>,
    packet: &Packet,
    mut on_decoded: impl FnMut(AudioBufferRef<'_>) -> Result<()>,
) -> Result<bool> {
    match decoder.decode(packet) {
        Ok(buf) => {
            on_decoded(buf)?;
            Ok(true)
        }
        Err(SymphoniaError::DecodeError(_)) => Ok(false),
        Err(SymphoniaError::IoError(_)) => Ok(false),
        Err(e) => Err(anyhow!(e)).context("decoder failure"),
    }
}

/// Accumulates decoded buffers into one interleaved `Vec<f32>`.
#[derive(Default)]
struct PcmCollector {
    scratch: Option<SampleBuffer<f32>>,
    samples: Vec<f32>,
    layout: Option<(u32, usize)>,
}

impl PcmCollector {
    fn push(&mut self, decoded: &AudioBufferRef<'_>) -> Result<()> {
        let spec = *decoded.spec();
        let channels = spec.channels.count();
        if channels == 0 {
            bail!("decoded audio had zero channels");
        }

        match self.layout {
            None => self.layout = Some((spec.rate, channels)),
            Some(layout) if layout != (spec.rate, channels) => {
                bail!(
                    "stream changed layout mid-track: {} Hz/{} ch -> {} Hz/{} ch",
                    layout.0,
                    layout.1,
                    spec.rate,
                    channels
                );
            }
            Some(_) => {}
        }

        // Packets may grow; resize the scratch buffer when a larger one arrives.
        let needed = decoded.capacity() * channels;
        if self.scratch.as_ref().is_none_or(|buf| buf.capacity() < needed) {
            self.scratch = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        }

        let buf = self
            .scratch
            .as_mut()
            .ok_or_else(|| anyhow!("sample buffer not initialized"))?;
        buf.copy_interleaved_ref(decoded.clone());
        self.samples.extend_from_slice(buf.samples());
        Ok(())
    }

    fn finish(self) -> Result<DecodedAudio> {
        let Some((sample_rate, channels)) = self.layout else {
            bail!("stream contained no decodable audio");
        };

        Ok(DecodedAudio {
            samples: self.samples,
            channels,
            sample_rate,
        })
    }
}
