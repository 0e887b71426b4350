use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};

use tagwright::audio::{PremasterOpts, premaster_output_path, premaster_single_track};
use tagwright::logging;
use tagwright::prompt::DialoguerPrompter;
use tagwright::tags::{LoftyBackend, TaggableProject};
use tagwright::term::{CrosstermKeys, ReorderableList};
use tagwright::wizard::TagWizard;

#[derive(Parser, Debug)]
#[command(name = "tagwright")]
#[command(about = "Premaster tracks, tag FLAC files, and rename them from their tags")]
struct Params {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Trim leading/trailing silence and normalize each input track.
    #[command(name = "premaster_single_track")]
    PremasterSingleTrack {
        /// Audio files to premaster. Output is written next to each input.
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Lower the leading activity threshold by this many dB.
        #[arg(long = "sub", default_value_t = 0, allow_negative_numbers = true)]
        sub: i32,

        /// Print a JSON report line per track.
        #[arg(long = "json", default_value_t = false)]
        json: bool,
    },

    /// Interactively tag a FLAC file or a directory of FLAC files.
    #[command(name = "tag_wizard")]
    TagWizard {
        /// A FLAC file, or a directory containing the FLAC files of one release.
        input: PathBuf,

        /// Upper bound for a single key read in the track-order table.
        #[arg(long = "key-timeout-ms", default_value_t = 100)]
        key_timeout_ms: u64,
    },

    /// Try the reorderable table on sample data.
    #[command(name = "reorder_demo")]
    ReorderDemo,
}

fn main() -> Result<()> {
    if std::env::args_os().len() <= 1 {
        Params::command().print_help()?;
        std::process::exit(1);
    }

    logging::init();
    let params = Params::parse();

    match params.command {
        Command::PremasterSingleTrack { input, sub, json } => premaster(&input, sub, json),
        Command::TagWizard {
            input,
            key_timeout_ms,
        } => tag_wizard(input, Duration::from_millis(key_timeout_ms)),
        Command::ReorderDemo => reorder_demo(),
    }
}

fn premaster(inputs: &[PathBuf], sub: i32, json: bool) -> Result<()> {
    let opts = PremasterOpts::with_threshold_subtrahend(sub);

    let bar = ProgressBar::new(inputs.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
            .context("invalid progress bar template")?,
    );

    for input in inputs {
        bar.println(format!("Processing {}...", input.display()));
        bar.set_message(input.display().to_string());

        let report = premaster_single_track(input, &premaster_output_path(input), &opts)
            .with_context(|| format!("failed to premaster {}", input.display()))?;

        if json {
            bar.println(serde_json::to_string(&report)?);
        }
        bar.inc(1);
    }

    bar.finish_and_clear();
    Ok(())
}

fn tag_wizard(input: PathBuf, key_timeout: Duration) -> Result<()> {
    println!("Input path:\t {}", input.display());

    let project = TaggableProject::open(&input, LoftyBackend)
        .with_context(|| format!("failed to load {}", input.display()))?;

    let mut wizard = TagWizard::new(
        project,
        DialoguerPrompter::new(),
        CrosstermKeys::new(key_timeout),
        io::stdout(),
    );
    wizard.run()?;
    Ok(())
}

fn reorder_demo() -> Result<()> {
    let rows: Vec<Vec<String>> = [
        ["Dec 20, 2019", "Star Wars: The Rise of Skywalker", "$952,110,690"],
        ["May 25, 2018", "Solo: A Star Wars Story", "$393,151,347"],
        ["Dec 15, 2017", "Star Wars Ep. VIII: The Last Jedi", "$1,332,539,889"],
        ["Dec 16, 2016", "Rogue One: A Star Wars Story", "$1,332,439,889"],
    ]
    .iter()
    .map(|row| row.iter().map(|cell| cell.to_string()).collect())
    .collect();

    let mut stdout = io::stdout();
    writeln!(
        stdout,
        "{}",
        "To grab a row, press space and move it with the arrow keys.".bold()
    )?;
    writeln!(stdout, "{}", "Press Ctrl-C once you're done reordering.".bold())?;

    let mut table = ReorderableList::new(
        "Star Wars Movies",
        vec![
            "Released".to_string(),
            "Title".to_string(),
            "Box Office".to_string(),
        ],
        rows,
    );
    table.interact(&mut CrosstermKeys::default(), &mut stdout)?;

    for (idx, row) in table.rows().iter().enumerate() {
        for cell in row {
            writeln!(stdout, "Row {idx}: {cell}")?;
        }
    }
    Ok(())
}
