//! Field schema of a track and validation of inbound field maps.
//!
//! Request bodies are checked here before anything reaches the store.

use serde_json::{Map, Value};
use thiserror::Error;

use super::track::TrackPatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    SongName,
    Artist,
    Album,
    ReleaseYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            FieldKind::Text => "a string",
            FieldKind::Integer => "an integer",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    pub name: &'static str,
    pub kind: FieldKind,
    pub optional: bool,
}

pub const TRACK_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        field: Field::SongName,
        name: "song_name",
        kind: FieldKind::Text,
        optional: true,
    },
    FieldSpec {
        field: Field::Artist,
        name: "artist",
        kind: FieldKind::Text,
        optional: true,
    },
    FieldSpec {
        field: Field::Album,
        name: "album",
        kind: FieldKind::Text,
        optional: true,
    },
    FieldSpec {
        field: Field::ReleaseYear,
        name: "release_year",
        kind: FieldKind::Integer,
        optional: true,
    },
];

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("malformed JSON body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("{field}: expected {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{0}: missing required value")]
    Missing(&'static str),
}

/// Parses a raw request body. An empty body is an empty field map.
pub fn parse_body(body: &[u8]) -> Result<TrackPatch, FieldError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TrackPatch::default());
    }
    let value: Value = serde_json::from_slice(body)?;
    parse_fields(&value)
}

/// Validates a JSON object against [`TRACK_FIELDS`].
///
/// Keys present in the object end up as `Some(..)` in the patch (`Some(None)` for null),
/// absent keys stay `None`. Unknown keys are ignored.
pub fn parse_fields(value: &Value) -> Result<TrackPatch, FieldError> {
    let object = value.as_object().ok_or(FieldError::NotAnObject)?;

    for key in object.keys() {
        if !TRACK_FIELDS.iter().any(|spec| spec.name == key) {
            log::debug!("ignoring unknown track field {key}");
        }
    }

    let mut patch = TrackPatch::default();
    for spec in TRACK_FIELDS {
        let Some(value) = supplied(object, spec)? else {
            continue;
        };
        match spec.field {
            Field::SongName => patch.song_name = Some(value.map(|v| text(spec, v)).transpose()?),
            Field::Artist => patch.artist = Some(value.map(|v| text(spec, v)).transpose()?),
            Field::Album => patch.album = Some(value.map(|v| text(spec, v)).transpose()?),
            Field::ReleaseYear => {
                patch.release_year = Some(value.map(|v| integer(spec, v)).transpose()?)
            }
        }
    }
    Ok(patch)
}

/// `None` if the key is absent, `Some(None)` if it is null.
fn supplied<'a>(
    object: &'a Map<String, Value>,
    spec: &FieldSpec,
) -> Result<Option<Option<&'a Value>>, FieldError> {
    match object.get(spec.name) {
        None if spec.optional => Ok(None),
        Some(Value::Null) if spec.optional => Ok(Some(None)),
        None | Some(Value::Null) => Err(FieldError::Missing(spec.name)),
        Some(value) => Ok(Some(Some(value))),
    }
}

fn invalid(spec: &FieldSpec) -> FieldError {
    FieldError::InvalidType {
        field: spec.name,
        expected: spec.kind.expected(),
    }
}

fn text(spec: &FieldSpec, value: &Value) -> Result<String, FieldError> {
    match (spec.kind, value) {
        (FieldKind::Text, Value::String(s)) => Ok(s.clone()),
        _ => Err(invalid(spec)),
    }
}

fn integer(spec: &FieldSpec, value: &Value) -> Result<i64, FieldError> {
    match (spec.kind, value) {
        (FieldKind::Integer, Value::Number(n)) => n.as_i64().ok_or_else(|| invalid(spec)),
        // numeric strings, e.g. "1991"
        (FieldKind::Integer, Value::String(s)) => s.trim().parse().map_err(|_| invalid(spec)),
        _ => Err(invalid(spec)),
    }
}
