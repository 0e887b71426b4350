//! Audio processing for premastering.
//!
//! - `decoder` turns a media file into interleaved PCM
//! - `trim` finds the audible part of a track and normalizes levels
//! - `wav` writes the result
//! - `premaster` wires the three together

pub mod decoder;
pub mod premaster;
pub mod trim;
pub mod wav;

pub use premaster::{PremasterOpts, PremasterReport, premaster_output_path, premaster_single_track};
pub use trim::TrimPolicy;
