//! `tagwright` is a small helper for preparing audio releases.
//!
//! This crate provides:
//! - Premastering (silence trimming + peak normalization) of single tracks
//! - An interactive, navigable wizard for tagging FLAC files
//! - A keyboard-driven reorderable table for assigning track numbers
//! - Renaming files from their tags
//!
//! The interactive pieces talk to the user through small traits (`Prompter`, `KeySource`) and
//! persist through `TagBackend`, so whole sessions can be scripted in tests.

mod error;
pub use error::{Error, Result};

// Navigation engine and the wizard built on it.
pub mod sequencer;
pub mod wizard;

// Terminal and prompt collaborators.
pub mod prompt;
pub mod term;

// Tag state, persistence, and filename rules.
pub mod filename;
pub mod tags;

// Audio premastering.
pub mod audio;

// Logging configuration for binaries.
#[cfg(feature = "logging")]
pub mod logging;

pub use audio::{PremasterOpts, PremasterReport, premaster_single_track};
pub use prompt::{DialoguerPrompter, Prompter};
pub use sequencer::{NavError, Navigation, StepSequencer};
pub use tags::{LoftyBackend, TagBackend, TagField, TaggableProject};
pub use term::{CrosstermKeys, KeySource, ListKey, ReorderableList};
pub use wizard::{TagWizard, WizardStep};
