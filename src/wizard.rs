//! The interactive tagging wizard.
//!
//! A session is a fixed list of [`WizardStep`]s driven by a [`StepSequencer`]. After every step
//! that actually asked something, the user picks `next`, `previous`, or `repeat`. Steps whose
//! question is already answered report [`StepOutcome::Skipped`] and are passed over in whichever
//! direction the user was travelling.

use std::io::Write;

use tracing::{debug, info, warn};

use crate::filename::exfat_warnings;
use crate::prompt::Prompter;
use crate::sequencer::{NavError, Navigation, StepSequencer};
use crate::tags::{TagBackend, TagField, TaggableProject};
use crate::term::{KeySource, ReorderableList, TableRow};
use crate::{Error, Result};

const NAVIGATION_PROMPT: &str = "What next?";

/// One question of a tagging session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    CommonArtist,
    CommonAlbum,
    CommonYear,
    TrackOrder,
    FileArtist(usize),
    FileTitle(usize),
    Commit,
    Rename,
}

impl WizardStep {
    /// The steps of a session over `file_count` files, in the order they are asked.
    pub fn session(file_count: usize) -> Vec<WizardStep> {
        let mut steps = vec![
            WizardStep::CommonArtist,
            WizardStep::CommonAlbum,
            WizardStep::CommonYear,
            WizardStep::TrackOrder,
        ];
        for idx in 0..file_count {
            steps.push(WizardStep::FileArtist(idx));
            steps.push(WizardStep::FileTitle(idx));
        }
        steps.push(WizardStep::Commit);
        steps.push(WizardStep::Rename);
        steps
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Answered,
    /// Nothing was asked because the step's question was already settled.
    Skipped,
}

/// Which way the session is travelling when a step is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavMode {
    #[default]
    Advancing,
    /// The user asked for the previous step; skipped steps keep walking backwards.
    RepeatingFromPrevious,
}

/// A row of the track-order table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRow {
    pub file_index: usize,
    pub number: usize,
    pub filename: String,
}

impl TableRow for TrackRow {
    fn cells(&self) -> Vec<String> {
        vec![self.number.to_string(), self.filename.clone()]
    }
}

pub struct TagWizard<B, P, K, W> {
    project: TaggableProject<B>,
    prompter: P,
    keys: K,
    out: W,
}

impl<B, P, K, W> TagWizard<B, P, K, W>
where
    B: TagBackend,
    P: Prompter,
    K: KeySource,
    W: Write,
{
    pub fn new(project: TaggableProject<B>, prompter: P, keys: K, out: W) -> Self {
        Self {
            project,
            prompter,
            keys,
            out,
        }
    }

    pub fn project(&self) -> &TaggableProject<B> {
        &self.project
    }

    /// The project and the output writer, e.g. to inspect what a scripted session printed.
    pub fn into_parts(self) -> (TaggableProject<B>, W) {
        (self.project, self.out)
    }

    /// Drive the whole session until every step has been dispatched.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "Loaded {} file(s).", self.project.len())?;

        let mut seq = StepSequencer::new(WizardStep::session(self.project.len()));
        let mut mode = NavMode::Advancing;

        loop {
            let step = match seq.advance() {
                Ok(step) => *step,
                Err(NavError::Exhausted) => break,
                Err(err) => return Err(err.into()),
            };

            writeln!(self.out, "Running question {}/{}", seq.position(), seq.len())?;
            let outcome = self.dispatch(step)?;
            debug!(?step, ?outcome, ?mode, "step dispatched");

            mode = match outcome {
                StepOutcome::Skipped => walk_past_skipped(&mut seq, mode),
                StepOutcome::Answered => {
                    let nav = self.ask_navigation()?;
                    self.apply_navigation(&mut seq, nav)?
                }
            };
        }

        Ok(())
    }

    /// Run one step.
    pub fn dispatch(&mut self, step: WizardStep) -> Result<StepOutcome> {
        match step {
            WizardStep::CommonArtist => self.common_artist(),
            WizardStep::CommonAlbum => self.common_album(),
            WizardStep::CommonYear => self.common_year(),
            WizardStep::TrackOrder => self.track_order(),
            WizardStep::FileArtist(idx) => self.file_artist(idx),
            WizardStep::FileTitle(idx) => self.file_title(idx),
            WizardStep::Commit => self.commit(),
            WizardStep::Rename => self.rename(),
        }
    }

    fn ask_navigation(&mut self) -> Result<Navigation> {
        let labels = Navigation::ALL.map(Navigation::label);
        let choice = unless_interrupted(self.prompter.select(NAVIGATION_PROMPT, &labels), 0)?;
        Ok(Navigation::ALL.get(choice).copied().unwrap_or_default())
    }

    fn apply_navigation(
        &mut self,
        seq: &mut StepSequencer<WizardStep>,
        nav: Navigation,
    ) -> Result<NavMode> {
        match seq.navigate(nav) {
            Ok(()) if nav == Navigation::Previous => Ok(NavMode::RepeatingFromPrevious),
            Ok(()) => Ok(NavMode::Advancing),
            Err(NavError::OutOfRange { .. }) => {
                writeln!(self.out, "This is the first question; asking it again.")?;
                seq.queue_repeat()?;
                Ok(NavMode::Advancing)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn common_artist(&mut self) -> Result<StepOutcome> {
        let current = display_value(self.project.common_value(TagField::Artist));
        let prompt = format!(
            "Provide a common artist for all tracks (leave empty if unapplicable) [{current}]"
        );

        if let Some(artist) = unless_interrupted(self.prompter.text(&prompt), None)? {
            self.warn_filename_chars(&artist)?;
            self.project.set_common_field(TagField::Artist, artist.as_str());
            writeln!(self.out, "Set '{artist}' for all tracks.")?;
        }
        Ok(StepOutcome::Answered)
    }

    fn common_album(&mut self) -> Result<StepOutcome> {
        let current = display_value(self.project.common_value(TagField::Album));
        let prompt = format!(
            "Provide a common album for all tracks (leave empty if unapplicable) [{current}]"
        );

        if let Some(album) = unless_interrupted(self.prompter.text(&prompt), None)? {
            self.project.set_common_field(TagField::Album, album.as_str());
            writeln!(self.out, "Set '{album}' for all tracks.")?;
        }
        Ok(StepOutcome::Answered)
    }

    fn common_year(&mut self) -> Result<StepOutcome> {
        let current = self.project.common_value(TagField::Date).map(str::to_string);
        let prompt = format!(
            "When was this {} released? [{}]",
            self.project.release_type(),
            display_value(current.as_deref())
        );

        let answer = self.prompter.integer(&prompt, current.is_some());
        if let Some(year) = unless_interrupted(answer, None)? {
            self.project.set_common_field(TagField::Date, year.to_string());
            writeln!(self.out, "Set {year} as the release year.")?;
        }
        Ok(StepOutcome::Answered)
    }

    fn track_order(&mut self) -> Result<StepOutcome> {
        let title = format!(
            "{} - {}",
            display_value(self.project.common_value(TagField::Artist)),
            display_value(self.project.common_value(TagField::Album)),
        );
        let rows = self
            .project
            .files()
            .iter()
            .enumerate()
            .map(|(file_index, file)| TrackRow {
                file_index,
                number: file_index + 1,
                filename: file.filename(),
            })
            .collect();

        writeln!(
            self.out,
            "To grab a track, press space and move it with the arrow keys. Press space again to drop it."
        )?;
        writeln!(self.out, "Press Ctrl-C or Enter once the order is right.")?;

        let mut table = ReorderableList::new(
            title,
            vec!["Track number".to_string(), "File name".to_string()],
            rows,
        );
        table.interact(&mut self.keys, &mut self.out)?;

        let rows = table.into_rows();
        for (position, row) in rows.iter().enumerate() {
            let number = u32::try_from(position + 1)
                .map_err(|_| Error::msg("too many tracks to number"))?;
            self.project.set_track_number(row.file_index, number)?;
        }
        self.project.sort_by_track_number();

        info!(tracks = rows.len(), "track order set");
        Ok(StepOutcome::Answered)
    }

    fn file_artist(&mut self, idx: usize) -> Result<StepOutcome> {
        let file = self.project.file(idx)?;
        let filename = file.filename();

        if self.project.common_value(TagField::Artist).is_some() {
            writeln!(
                self.out,
                "[{filename}] Common artist has already been set, skipping."
            )?;
            return Ok(StepOutcome::Skipped);
        }

        let prompt = format!(
            "[{filename}]\t Artist name: ({})",
            display_value(file.get(TagField::Artist))
        );
        if let Some(artist) = unless_interrupted(self.prompter.text(&prompt), None)? {
            self.warn_filename_chars(&artist)?;
            writeln!(self.out, "[{filename}] Set artist to '{artist}'.")?;
            self.project.set_field(idx, TagField::Artist, artist)?;
        }
        Ok(StepOutcome::Answered)
    }

    fn file_title(&mut self, idx: usize) -> Result<StepOutcome> {
        let file = self.project.file(idx)?;
        let filename = file.filename();
        let prompt = format!(
            "[{filename}]\t Title: ({})",
            display_value(file.get(TagField::Title))
        );

        if let Some(title) = unless_interrupted(self.prompter.text(&prompt), None)? {
            self.warn_filename_chars(&title)?;
            writeln!(self.out, "[{filename}] Set title to '{title}'.")?;
            self.project.set_field(idx, TagField::Title, title)?;
        }
        Ok(StepOutcome::Answered)
    }

    fn commit(&mut self) -> Result<StepOutcome> {
        if unless_interrupted(self.prompter.confirm("Should we commit?"), false)? {
            match self.project.commit() {
                Ok(()) => writeln!(self.out, "Saved {} file(s).", self.project.len())?,
                Err(err) => {
                    warn!(error = %err, "commit failed");
                    writeln!(self.out, "Commit failed: {}", error_chain(&err))?;
                }
            }
        }
        Ok(StepOutcome::Answered)
    }

    fn rename(&mut self) -> Result<StepOutcome> {
        for idx in 0..self.project.len() {
            match self.project.formatted_filename(idx) {
                Ok(name) => writeln!(self.out, "[{idx}]: {name}")?,
                Err(err) => writeln!(self.out, "[{idx}]: cannot format filename: {err}")?,
            }
        }

        if unless_interrupted(self.prompter.confirm("Should we rename?"), false)? {
            match self.project.rename_files() {
                Ok(paths) => writeln!(self.out, "Renamed {} file(s).", paths.len())?,
                Err(err) => {
                    warn!(error = %err, "rename failed");
                    writeln!(self.out, "Rename failed: {}", error_chain(&err))?;
                }
            }
        }
        Ok(StepOutcome::Answered)
    }

    fn warn_filename_chars(&mut self, value: &str) -> Result<()> {
        for warning in exfat_warnings(value) {
            warn!("{warning}");
            writeln!(self.out, "Warning: {warning}")?;
        }
        Ok(())
    }
}

/// Decide how to continue after a skipped step.
///
/// While travelling backwards we keep stepping back so a run of skipped steps is walked
/// transparently. If there is nothing further back we start advancing again.
fn walk_past_skipped(seq: &mut StepSequencer<WizardStep>, mode: NavMode) -> NavMode {
    match mode {
        NavMode::Advancing => NavMode::Advancing,
        NavMode::RepeatingFromPrevious => match seq.queue_previous() {
            Ok(()) => NavMode::RepeatingFromPrevious,
            Err(_) => NavMode::Advancing,
        },
    }
}

/// A Ctrl-C at a prompt ends that prompt only; the step continues with `fallback`.
fn unless_interrupted<T>(answer: Result<T>, fallback: T) -> Result<T> {
    match answer {
        Err(err) if err.is_interrupted() => {
            debug!("prompt interrupted");
            Ok(fallback)
        }
        answer => answer,
    }
}

fn display_value(value: Option<&str>) -> &str {
    value.unwrap_or("?")
}

fn error_chain(err: &Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
