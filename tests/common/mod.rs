#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tagwright::prompt::Prompter;
use tagwright::tags::{TagBackend, TagField, TagFields, TrackFile};
use tagwright::term::{KeySource, ListKey};
use tagwright::{Error, Result};

/// One scripted answer, in the order the wizard asks.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Text(Option<&'static str>),
    Integer(Option<i64>),
    Confirm(bool),
    Select(usize),
    /// Ctrl-C at the prompt, reported the way dialoguer does.
    Interrupt,
}

pub const NEXT: Answer = Answer::Select(0);
pub const PREVIOUS: Answer = Answer::Select(1);
pub const REPEAT: Answer = Answer::Select(2);

/// Answers prompts from a script and records every prompt it was shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    pub prompts: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<Answer> {
        self.prompts.push(prompt.to_string());
        match self.answers.pop_front() {
            Some(Answer::Interrupt) => {
                let interrupted = std::io::Error::from(std::io::ErrorKind::Interrupted);
                Err(dialoguer::Error::from(interrupted).into())
            }
            Some(answer) => Ok(answer),
            None => Err(Error::Message(format!(
                "script ran out of answers at {prompt:?}"
            ))),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.next(prompt)? {
            Answer::Text(text) => Ok(text.map(str::to_string)),
            other => Err(Error::Message(format!("expected text for {prompt:?}, got {other:?}"))),
        }
    }

    fn integer(&mut self, prompt: &str, _allow_blank: bool) -> Result<Option<i64>> {
        match self.next(prompt)? {
            Answer::Integer(value) => Ok(value),
            other => Err(Error::Message(format!("expected integer for {prompt:?}, got {other:?}"))),
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        match self.next(prompt)? {
            Answer::Confirm(yes) => Ok(yes),
            other => Err(Error::Message(format!("expected confirm for {prompt:?}, got {other:?}"))),
        }
    }

    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize> {
        match self.next(prompt)? {
            Answer::Select(idx) if idx < items.len() => Ok(idx),
            other => Err(Error::Message(format!("expected select for {prompt:?}, got {other:?}"))),
        }
    }
}

/// Replays keys, then interrupts forever once the script is used up.
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<Option<ListKey>>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = ListKey>) -> Self {
        Self {
            keys: keys.into_iter().map(Some).collect(),
        }
    }

    /// Insert a timed-out read before every key.
    pub fn with_timeouts(keys: impl IntoIterator<Item = ListKey>) -> Self {
        Self {
            keys: keys.into_iter().flat_map(|key| [None, Some(key)]).collect(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn read_key(&mut self) -> Result<Option<ListKey>> {
        Ok(self.keys.pop_front().unwrap_or(Some(ListKey::Interrupt)))
    }
}

/// Tags kept in memory, keyed by path. Writes to paths in `failing` are rejected.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    stored: Mutex<HashMap<PathBuf, TagFields>>,
    failing: HashSet<PathBuf>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    pub fn seed(self, path: impl Into<PathBuf>, fields: TagFields) -> Self {
        if let Ok(mut stored) = self.stored.lock() {
            stored.insert(path.into(), fields);
        }
        self
    }

    pub fn stored(&self, path: impl AsRef<Path>) -> Option<TagFields> {
        self.stored.lock().ok()?.get(path.as_ref()).cloned()
    }
}

impl TagBackend for MemoryBackend {
    fn read(&self, path: &Path) -> Result<TagFields> {
        Ok(self.stored(path).unwrap_or_default())
    }

    fn write(&self, path: &Path, fields: &TagFields) -> Result<()> {
        if self.failing.contains(path) {
            return Err(Error::Message("disk full".to_string()));
        }
        let mut stored = self
            .stored
            .lock()
            .map_err(|_| Error::Message("backend lock poisoned".to_string()))?;
        stored.insert(path.to_path_buf(), fields.clone());
        Ok(())
    }
}

pub fn fields(pairs: &[(TagField, &str)]) -> TagFields {
    pairs
        .iter()
        .map(|(field, value)| (*field, value.to_string()))
        .collect()
}

pub fn track(path: &str, pairs: &[(TagField, &str)]) -> TrackFile {
    TrackFile::new(path, fields(pairs))
}
