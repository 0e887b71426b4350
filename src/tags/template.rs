//! Filename templates over tag fields.
//!
//! Placeholders are `{field}` or `{field:0N}` where `field` is a Vorbis key (`artist`, `title`,
//! `album`, `date`, `tracknumber`) and `0N` zero-pads a numeric value to `N` digits.

use std::fmt;
use std::str::FromStr;

use crate::tags::{ALBUM_TEMPLATE, SINGLE_TEMPLATE, TagField, TrackFile};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        field: TagField,
        zero_pad: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl FilenameTemplate {
    /// `{tracknumber:02} {title}`
    pub fn album() -> Self {
        Self {
            source: ALBUM_TEMPLATE.to_string(),
            segments: vec![
                Segment::Field {
                    field: TagField::TrackNumber,
                    zero_pad: Some(2),
                },
                Segment::Literal(" ".to_string()),
                Segment::Field {
                    field: TagField::Title,
                    zero_pad: None,
                },
            ],
        }
    }

    /// `{artist} - {title}`
    pub fn single() -> Self {
        Self {
            source: SINGLE_TEMPLATE.to_string(),
            segments: vec![
                Segment::Field {
                    field: TagField::Artist,
                    zero_pad: None,
                },
                Segment::Literal(" - ".to_string()),
                Segment::Field {
                    field: TagField::Title,
                    zero_pad: None,
                },
            ],
        }
    }

    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidTemplate {
            template: source.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut placeholder = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => {
                                return Err(invalid("unterminated placeholder".to_string()));
                            }
                            Some(c) => placeholder.push(c),
                        }
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_placeholder(&placeholder).map_err(invalid)?);
                }
                '}' => return Err(invalid("unmatched `}`".to_string())),
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The fields this template reads, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = TagField> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field { field, .. } => Some(*field),
            Segment::Literal(_) => None,
        })
    }

    /// Fill the template from one file's tags.
    pub fn render(&self, file: &TrackFile) -> Result<String> {
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { field, zero_pad } => {
                    let value = file.get(*field).ok_or_else(|| Error::FieldMissing {
                        field: *field,
                        path: file.path().to_path_buf(),
                    })?;

                    match zero_pad {
                        None => out.push_str(value),
                        Some(width) => {
                            let number: u64 =
                                value.trim().parse().map_err(|_| Error::NotANumber {
                                    field: *field,
                                    value: value.to_string(),
                                    path: file.path().to_path_buf(),
                                })?;
                            out.push_str(&format!("{number:0width$}"));
                        }
                    }
                }
            }
        }

        Ok(out)
    }
}

impl FromStr for FilenameTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_placeholder(placeholder: &str) -> std::result::Result<Segment, String> {
    let (key, format_spec) = match placeholder.split_once(':') {
        Some((key, spec)) => (key, Some(spec)),
        None => (placeholder, None),
    };

    let field =
        TagField::from_key(key.trim()).ok_or_else(|| format!("unknown field {key:?}"))?;

    let zero_pad = match format_spec {
        None => None,
        Some(spec) => {
            let digits = spec
                .strip_prefix('0')
                .ok_or_else(|| format!("unsupported format {spec:?}; expected `0N`"))?;
            let width = digits
                .parse::<usize>()
                .map_err(|_| format!("unsupported format {spec:?}; expected `0N`"))?;
            Some(width)
        }
    };

    Ok(Segment::Field { field, zero_pad })
}
