//! In-memory tag state for a tagging session.
//!
//! A [`TaggableProject`] loads the FLAC files of one release, keeps every edit in memory, and
//! only touches the disk on [`TaggableProject::commit`] and [`TaggableProject::rename_files`].

pub mod backend;
pub mod template;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;

use crate::{Error, Result};

pub use backend::{LoftyBackend, TagBackend};
pub use template::FilenameTemplate;

/// Filename template for multi-file releases.
pub const ALBUM_TEMPLATE: &str = "{tracknumber:02} {title}";

/// Filename template for single-track releases.
pub const SINGLE_TEMPLATE: &str = "{artist} - {title}";

/// The tag fields a session edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagField {
    Artist,
    Title,
    Album,
    Date,
    TrackNumber,
}

impl TagField {
    pub const ALL: [TagField; 5] = [
        TagField::Artist,
        TagField::Title,
        TagField::Album,
        TagField::Date,
        TagField::TrackNumber,
    ];

    /// The Vorbis comment key for this field.
    pub fn key(self) -> &'static str {
        match self {
            TagField::Artist => "artist",
            TagField::Title => "title",
            TagField::Album => "album",
            TagField::Date => "date",
            TagField::TrackNumber => "tracknumber",
        }
    }

    /// Case-insensitive lookup by Vorbis comment key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub type TagFields = BTreeMap<TagField, String>;

/// One audio file and its (possibly edited) tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFile {
    path: PathBuf,
    fields: TagFields,
}

impl TrackFile {
    pub fn new(path: impl Into<PathBuf>, fields: TagFields) -> Self {
        Self {
            path: path.into(),
            fields,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fields(&self) -> &TagFields {
        &self.fields
    }

    /// The final path component, for display.
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn get(&self, field: TagField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: TagField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn track_number(&self) -> Option<u32> {
        self.get(TagField::TrackNumber)?.trim().parse().ok()
    }
}

/// Whether a session tags one track or a whole release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseType {
    Single,
    Album,
}

impl ReleaseType {
    fn for_file_count(count: usize) -> Self {
        if count > 1 {
            ReleaseType::Album
        } else {
            ReleaseType::Single
        }
    }

    fn template(self) -> FilenameTemplate {
        match self {
            ReleaseType::Single => FilenameTemplate::single(),
            ReleaseType::Album => FilenameTemplate::album(),
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseType::Single => f.write_str("single"),
            ReleaseType::Album => f.write_str("album/EP"),
        }
    }
}

pub struct TaggableProject<B> {
    files: Vec<TrackFile>,
    backend: B,
    release_type: ReleaseType,
    template: FilenameTemplate,
}

impl<B: TagBackend> TaggableProject<B> {
    /// Load a single FLAC file, or every FLAC file directly inside a directory (sorted by path).
    pub fn open(input: &Path, backend: B) -> Result<Self> {
        let paths = find_flac_files(input)?;
        if paths.is_empty() {
            return Err(Error::msg(format!(
                "no FLAC files found in {}",
                input.display()
            )));
        }

        let files = paths
            .into_iter()
            .map(|path| {
                let fields = backend.read(&path)?;
                Ok(TrackFile::new(path, fields))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_files(files, backend))
    }

    /// Build a project from already-loaded files.
    pub fn from_files(files: Vec<TrackFile>, backend: B) -> Self {
        let release_type = ReleaseType::for_file_count(files.len());
        Self {
            files,
            backend,
            release_type,
            template: release_type.template(),
        }
    }

    pub fn files(&self) -> &[TrackFile] {
        &self.files
    }

    pub fn file(&self, idx: usize) -> Result<&TrackFile> {
        self.files.get(idx).ok_or(Error::NoSuchFile(idx))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn release_type(&self) -> ReleaseType {
        self.release_type
    }

    pub fn filename_template(&self) -> &FilenameTemplate {
        &self.template
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The value every file shares for `field`.
    ///
    /// `None` when any file lacks the field *or* files disagree; callers cannot tell the two
    /// apart.
    pub fn common_value(&self, field: TagField) -> Option<&str> {
        let mut values = self.files.iter().map(|file| file.get(field));
        let first = values.next()??;
        values.all(|value| value == Some(first)).then_some(first)
    }

    pub fn set_field(&mut self, idx: usize, field: TagField, value: impl Into<String>) -> Result<()> {
        let file = self.files.get_mut(idx).ok_or(Error::NoSuchFile(idx))?;
        file.set(field, value);
        Ok(())
    }

    pub fn set_common_field(&mut self, field: TagField, value: impl Into<String>) {
        let value = value.into();
        for file in &mut self.files {
            file.set(field, value.clone());
        }
    }

    pub fn set_track_number(&mut self, idx: usize, number: u32) -> Result<()> {
        self.set_field(idx, TagField::TrackNumber, number.to_string())
    }

    /// Stable sort by track number; files without a numeric track number go last.
    pub fn sort_by_track_number(&mut self) {
        self.files
            .sort_by_key(|file| file.track_number().unwrap_or(u32::MAX));
    }

    /// The filename stem the template produces for one file.
    pub fn formatted_filename(&self, idx: usize) -> Result<String> {
        self.template.render(self.file(idx)?)
    }

    /// Persist every file's in-memory tags.
    ///
    /// Stops at the first failure; files written before it are not rolled back.
    pub fn commit(&self) -> Result<()> {
        for file in &self.files {
            self.backend
                .write(file.path(), file.fields())
                .map_err(|err| Error::Persistence {
                    path: file.path.clone(),
                    source: Box::new(err),
                })?;
        }

        info!(files = self.files.len(), "tags committed");
        Ok(())
    }

    /// Rename every file after its formatted filename, keeping the extension.
    ///
    /// All names are computed before anything is moved, so a missing field leaves every file
    /// where it was. Files that move go through a temporary name first, so swapping two names
    /// within the session never overwrites either file. Returns the new paths in file order.
    pub fn rename_files(&mut self) -> Result<Vec<PathBuf>> {
        let moves = self.rename_plan()?;

        for (idx, staged, _) in &moves {
            std::fs::rename(&self.files[*idx].path, staged)?;
        }

        for (idx, staged, target) in &moves {
            std::fs::rename(staged, target)?;
            let file = &mut self.files[*idx];
            info!(from = %file.path.display(), to = %target.display(), "file renamed");
            file.path = target.clone();
        }

        Ok(self.files.iter().map(|file| file.path.clone()).collect())
    }

    /// `(file index, staging path, target path)` for every file that has to move.
    fn rename_plan(&self) -> Result<Vec<(usize, PathBuf, PathBuf)>> {
        let current: HashSet<&Path> = self.files.iter().map(|file| file.path.as_path()).collect();
        let mut seen = HashSet::new();
        let mut moves = Vec::new();

        for (idx, file) in self.files.iter().enumerate() {
            let stem = self.template.render(file)?;
            let name = match file.path.extension() {
                Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
                None => stem,
            };
            let target = file.path.with_file_name(name);

            if !seen.insert(target.clone()) {
                return Err(Error::msg(format!(
                    "more than one file would be renamed to {}",
                    target.display()
                )));
            }
            if target == file.path {
                continue;
            }
            // Session files free up their names before anything lands on them.
            if target.exists() && !current.contains(target.as_path()) {
                return Err(Error::msg(format!(
                    "refusing to overwrite existing file {}",
                    target.display()
                )));
            }

            let staged = file
                .path
                .with_file_name(format!(".tagwright-rename-{idx}.{}", file.filename()));
            if staged.exists() {
                return Err(Error::msg(format!(
                    "staging file {} is in the way",
                    staged.display()
                )));
            }
            moves.push((idx, staged, target));
        }

        Ok(moves)
    }
}

fn find_flac_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(Error::msg(format!("no such file or directory: {}", input.display())));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(input).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|err| Error::Other(Box::new(err)))?;
        let path = entry.path();
        let is_flac = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("flac"));
        if entry.file_type().is_file() && is_flac {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullBackend;

    impl TagBackend for NullBackend {
        fn read(&self, _path: &Path) -> Result<TagFields> {
            Ok(TagFields::new())
        }

        fn write(&self, _path: &Path, _fields: &TagFields) -> Result<()> {
            Ok(())
        }
    }

    fn file(name: &str, artist: Option<&str>) -> TrackFile {
        let mut fields = TagFields::new();
        if let Some(artist) = artist {
            fields.insert(TagField::Artist, artist.to_string());
        }
        TrackFile::new(name, fields)
    }

    #[test]
    fn common_value_requires_agreement() {
        let same = TaggableProject::from_files(
            vec![file("a.flac", Some("X")), file("b.flac", Some("X"))],
            NullBackend,
        );
        assert_eq!(same.common_value(TagField::Artist), Some("X"));

        let differ = TaggableProject::from_files(
            vec![file("a.flac", Some("X")), file("b.flac", Some("Y"))],
            NullBackend,
        );
        assert_eq!(differ.common_value(TagField::Artist), None);
    }

    #[test]
    fn common_value_is_none_when_any_file_lacks_the_field() {
        let project = TaggableProject::from_files(
            vec![file("a.flac", Some("X")), file("b.flac", None)],
            NullBackend,
        );
        assert_eq!(project.common_value(TagField::Artist), None);
    }

    #[test]
    fn empty_project_has_no_common_values() {
        let project = TaggableProject::from_files(Vec::new(), NullBackend);
        assert_eq!(project.common_value(TagField::Album), None);
    }

    #[test]
    fn release_type_follows_file_count() {
        let single = TaggableProject::from_files(vec![file("a.flac", None)], NullBackend);
        assert_eq!(single.release_type().to_string(), "single");
        assert_eq!(single.filename_template().source(), SINGLE_TEMPLATE);

        let album = TaggableProject::from_files(
            vec![file("a.flac", None), file("b.flac", None)],
            NullBackend,
        );
        assert_eq!(album.release_type().to_string(), "album/EP");
        assert_eq!(album.filename_template().source(), ALBUM_TEMPLATE);
    }

    #[test]
    fn sort_puts_unnumbered_files_last() -> anyhow::Result<()> {
        let mut project = TaggableProject::from_files(
            vec![file("a.flac", None), file("b.flac", None), file("c.flac", None)],
            NullBackend,
        );
        project.set_track_number(1, 2)?;
        project.set_track_number(2, 1)?;
        project.sort_by_track_number();

        let names: Vec<String> = project.files().iter().map(TrackFile::filename).collect();
        assert_eq!(names, vec!["c.flac", "b.flac", "a.flac"]);
        Ok(())
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let mut project = TaggableProject::from_files(vec![file("a.flac", None)], NullBackend);
        assert!(matches!(
            project.set_field(3, TagField::Title, "x"),
            Err(Error::NoSuchFile(3))
        ));
    }

    #[test]
    fn field_keys_round_trip_case_insensitively() {
        assert_eq!(TagField::from_key("TRACKNUMBER"), Some(TagField::TrackNumber));
        assert_eq!(TagField::from_key("genre"), None);
    }
}
