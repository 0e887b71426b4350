//! Tag persistence.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::tag::{ItemKey, Tag, TagExt};
use tracing::debug;

use crate::tags::{TagField, TagFields};
use crate::{Error, Result};

/// Reads and writes the tag fields of one file.
pub trait TagBackend {
    fn read(&self, path: &Path) -> Result<TagFields>;

    /// Replace the session's fields on disk. Fields absent from `fields` are removed.
    fn write(&self, path: &Path, fields: &TagFields) -> Result<()>;
}

impl<B: TagBackend + ?Sized> TagBackend for &B {
    fn read(&self, path: &Path) -> Result<TagFields> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, fields: &TagFields) -> Result<()> {
        (**self).write(path, fields)
    }
}

/// Tags stored in the file's primary tag (Vorbis comments for FLAC), via lofty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyBackend;

impl TagBackend for LoftyBackend {
    fn read(&self, path: &Path) -> Result<TagFields> {
        let tagged = lofty::read_from_path(path)?;

        let mut fields = TagFields::new();
        let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
            debug!(path = %path.display(), "file has no tags");
            return Ok(fields);
        };

        for field in TagField::ALL {
            if let Some(value) = tag.get_string(&item_key(field)) {
                fields.insert(field, value.to_string());
            }
        }
        Ok(fields)
    }

    fn write(&self, path: &Path, fields: &TagFields) -> Result<()> {
        let mut tagged = lofty::read_from_path(path)?;

        let tag_type = tagged.primary_tag_type();
        if tagged.tag(tag_type).is_none() {
            tagged.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged
            .tag_mut(tag_type)
            .ok_or_else(|| Error::msg(format!("cannot create a tag in {}", path.display())))?;

        for field in TagField::ALL {
            let key = item_key(field);
            match fields.get(&field) {
                Some(value) => {
                    tag.insert_text(key, value.clone());
                }
                None => tag.remove_key(&key),
            }
        }

        tag.save_to_path(path, WriteOptions::default())?;
        debug!(path = %path.display(), "tags saved");
        Ok(())
    }
}

fn item_key(field: TagField) -> ItemKey {
    match field {
        TagField::Artist => ItemKey::TrackArtist,
        TagField::Title => ItemKey::TrackTitle,
        TagField::Album => ItemKey::AlbumTitle,
        TagField::Date => ItemKey::RecordingDate,
        TagField::TrackNumber => ItemKey::TrackNumber,
    }
}
