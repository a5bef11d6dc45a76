use crate::{
    config,
    domain::{
        id::TrackId,
        track::{Track, TrackFields, TrackPatch},
    },
    storage::{
        db,
        error::StorageError,
        schema::{self, columns, tables},
    },
};

use anyhow::anyhow;
use columns::*;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tables::*;

/// Which branch an upsert took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    /// the requested id was absent, a new track with a fresh id was created
    Created,
    /// the existing track was overwritten
    Replaced,
}

/// Main structure that implements all storage logic
pub struct Storage {
    pub(crate) db: rusqlite::Connection,
}

impl Storage {
    /// when called, opens a data base connection
    pub fn new(db_config: &config::Database) -> Result<Self, StorageError> {
        let db: rusqlite::Connection = db::open(db_config)?;
        Ok(Self::from_existing_conn(db))
    }

    pub fn from_existing_conn(db: rusqlite::Connection) -> Self {
        Self { db }
    }

    /// Stores a new track under a freshly allocated id.
    ///
    /// The id is strictly greater than any id this database ever handed out.
    pub fn create(&mut self, fields: &TrackFields) -> Result<Track, StorageError> {
        let tx = self.db.transaction()?;
        let track = insert_track(&tx, fields)?;
        tx.commit()?;
        log::debug!("created track {}", track.id);
        Ok(track)
    }

    pub fn get(&self, id: TrackId) -> Result<Track, StorageError> {
        select_track(&self.db, id)?.ok_or(StorageError::TrackNotFound(id))
    }

    /// Overwrites all mutable fields of an existing track
    pub fn replace(
        &mut self,
        id: TrackId,
        fields: &TrackFields,
    ) -> Result<Track, StorageError> {
        let tx = self.db.transaction()?;
        if !update_track(&tx, id, fields)? {
            return Err(StorageError::TrackNotFound(id));
        }
        tx.commit()?;
        Ok(Track {
            id,
            fields: fields.clone(),
        })
    }

    /// Replaces the track if it exists, otherwise creates a new one.
    ///
    /// A created track never takes the requested id, it gets the next id from the store.
    pub fn upsert(
        &mut self,
        id: TrackId,
        fields: &TrackFields,
    ) -> Result<(Track, Upserted), StorageError> {
        let tx = self.db.transaction()?;
        let result = if update_track(&tx, id, fields)? {
            (
                Track {
                    id,
                    fields: fields.clone(),
                },
                Upserted::Replaced,
            )
        } else {
            let track = insert_track(&tx, fields)?;
            log::debug!("track {id} absent, created track {} instead", track.id);
            (track, Upserted::Created)
        };
        tx.commit()?;
        Ok(result)
    }

    /// Overwrites only the fields supplied in the patch
    pub fn patch(&mut self, id: TrackId, patch: TrackPatch) -> Result<Track, StorageError> {
        let tx = self.db.transaction()?;
        let mut track = select_track(&tx, id)?.ok_or(StorageError::TrackNotFound(id))?;
        patch.apply(&mut track.fields);
        if !update_track(&tx, id, &track.fields)? {
            return Err(StorageError::Internal(anyhow!(
                "track {id} vanished during patch"
            )));
        }
        tx.commit()?;
        Ok(track)
    }

    pub fn delete(&mut self, id: TrackId) -> Result<(), StorageError> {
        let removed = self.db.execute(
            &format!("DELETE FROM {TRACKS} WHERE {ID} = ?1"),
            params![id.value()],
        )?;
        if removed == 0 {
            return Err(StorageError::TrackNotFound(id));
        }
        log::debug!("deleted track {id}");
        Ok(())
    }

    /// All tracks in insertion order
    pub fn list(&self) -> Result<Vec<Track>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {ID}, {SONG_NAME}, {ARTIST}, {ALBUM}, {RELEASE_YEAR} FROM {TRACKS} ORDER BY {ID}"
        ))?;
        let tracks = stmt
            .query_map([], track_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tracks)
    }

    pub fn count(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .db
            .query_row(&format!("SELECT COUNT(*) FROM {TRACKS}"), [], |row| row.get(0))?;
        usize::try_from(count).map_err(|e| {
            StorageError::Internal(anyhow!(
                "Strange conversion error to usize after select count: {e}"
            ))
        })
    }

    /// Drops all tracks and restarts id allocation
    pub fn reset(&mut self) -> Result<(), StorageError> {
        schema::reset(&self.db)?;
        Ok(())
    }

    /// Creates one track per entry, in order
    pub fn seed(&mut self, tracks: &[TrackFields]) -> Result<Vec<Track>, StorageError> {
        let tx = self.db.transaction()?;
        let created = tracks
            .iter()
            .map(|fields| insert_track(&tx, fields))
            .collect::<Result<Vec<_>, _>>()?;
        tx.commit()?;
        Ok(created)
    }
}

fn track_from_row(row: &Row) -> rusqlite::Result<Track> {
    Ok(Track {
        id: TrackId(row.get(0)?),
        fields: TrackFields {
            song_name: row.get(1)?,
            artist: row.get(2)?,
            album: row.get(3)?,
            release_year: row.get(4)?,
        },
    })
}

fn select_track(conn: &Connection, id: TrackId) -> Result<Option<Track>, rusqlite::Error> {
    conn.query_row(
        &format!(
            "SELECT {ID}, {SONG_NAME}, {ARTIST}, {ALBUM}, {RELEASE_YEAR} FROM {TRACKS} WHERE {ID} = ?1"
        ),
        params![id.value()],
        track_from_row,
    )
    .optional()
}

fn insert_track(conn: &Connection, fields: &TrackFields) -> Result<Track, rusqlite::Error> {
    conn.execute(
        &format!(
            "INSERT INTO {TRACKS} ({SONG_NAME}, {ARTIST}, {ALBUM}, {RELEASE_YEAR}) VALUES (?1, ?2, ?3, ?4)"
        ),
        params![
            fields.song_name,
            fields.artist,
            fields.album,
            fields.release_year
        ],
    )?;
    Ok(Track {
        id: TrackId(conn.last_insert_rowid()),
        fields: fields.clone(),
    })
}

/// returns false if there is no track with this id
fn update_track(
    conn: &Connection,
    id: TrackId,
    fields: &TrackFields,
) -> Result<bool, rusqlite::Error> {
    let changed = conn.execute(
        &format!(
            "UPDATE {TRACKS} SET {SONG_NAME} = ?1, {ARTIST} = ?2, {ALBUM} = ?3, {RELEASE_YEAR} = ?4
             WHERE {ID} = ?5"
        ),
        params![
            fields.song_name,
            fields.artist,
            fields.album,
            fields.release_year,
            id.value()
        ],
    )?;
    Ok(changed > 0)
}
