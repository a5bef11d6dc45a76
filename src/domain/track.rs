use super::id::TrackId;

/// Represent a stored track record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: TrackId,
    pub fields: TrackFields,
}

/// The mutable part of a track. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackFields {
    pub song_name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub release_year: Option<i64>,
}

impl TrackFields {
    pub fn new(song_name: &str, artist: &str, album: &str, release_year: i64) -> Self {
        Self {
            song_name: Some(song_name.to_string()),
            artist: Some(artist.to_string()),
            album: Some(album.to_string()),
            release_year: Some(release_year),
        }
    }
}

/// Partial update of a track.
///
/// Outer `None` means the field was not supplied and keeps its value,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackPatch {
    pub song_name: Option<Option<String>>,
    pub artist: Option<Option<String>>,
    pub album: Option<Option<String>>,
    pub release_year: Option<Option<i64>>,
}

impl TrackPatch {
    pub fn apply(self, fields: &mut TrackFields) {
        if let Some(song_name) = self.song_name {
            fields.song_name = song_name;
        }
        if let Some(artist) = self.artist {
            fields.artist = artist;
        }
        if let Some(album) = self.album {
            fields.album = album;
        }
        if let Some(release_year) = self.release_year {
            fields.release_year = release_year;
        }
    }

    /// Full-replace view: every field not supplied becomes absent.
    pub fn into_fields(self) -> TrackFields {
        TrackFields {
            song_name: self.song_name.flatten(),
            artist: self.artist.flatten(),
            album: self.album.flatten(),
            release_year: self.release_year.flatten(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_unsupplied_fields() {
        let mut fields = TrackFields::new("A", "B", "Album", 2000);

        TrackPatch {
            artist: Some(Some("C".to_string())),
            release_year: Some(None),
            ..Default::default()
        }
        .apply(&mut fields);

        assert_eq!(fields.song_name.as_deref(), Some("A"));
        assert_eq!(fields.artist.as_deref(), Some("C"));
        assert_eq!(fields.album.as_deref(), Some("Album"));
        assert_eq!(fields.release_year, None);
    }

    #[test]
    fn test_into_fields_clears_unsupplied() {
        let fields = TrackPatch {
            song_name: Some(Some("X".to_string())),
            ..Default::default()
        }
        .into_fields();

        assert_eq!(
            fields,
            TrackFields {
                song_name: Some("X".to_string()),
                ..Default::default()
            }
        );
    }
}
