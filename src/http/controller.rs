//! Track resource: turns requests into store operations.
//!
//! Nothing in here knows about HTTP. Each operation returns an [`Outcome`]
//! telling the transport which kind of success happened, or an [`ApiError`].

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::{
    config::UpsertPolicy,
    domain::{fields, id::TrackId, track::Track},
    http::error::ApiError,
    storage::{
        error::StorageError,
        operations::{Storage, Upserted},
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackResponse {
    pub id: TrackId,
    pub song_name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub release_year: Option<i64>,
}

impl From<Track> for TrackResponse {
    fn from(track: Track) -> Self {
        Self {
            id: track.id,
            song_name: track.fields.song_name,
            artist: track.fields.artist,
            album: track.fields.album,
            release_year: track.fields.release_year,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Track(TrackResponse),
    Tracks(Vec<TrackResponse>),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// ok with data
    Data(Payload),
    /// ok, a new track was created
    Created(TrackResponse),
    /// ok, nothing to return
    NoData,
}

#[derive(Clone)]
pub struct TrackController {
    storage: Arc<Mutex<Storage>>,
    upsert_policy: UpsertPolicy,
}

impl TrackController {
    pub fn new(storage: Arc<Mutex<Storage>>, upsert_policy: UpsertPolicy) -> Self {
        Self {
            storage,
            upsert_policy,
        }
    }

    fn storage(&self) -> Result<MutexGuard<'_, Storage>, ApiError> {
        self.storage.lock().map_err(|e| {
            ApiError::from(StorageError::Internal(anyhow::anyhow!(
                "Could not access track storage under lock: {e}"
            )))
        })
    }

    pub fn list(&self) -> Result<Outcome, ApiError> {
        let tracks = self.storage()?.list()?;
        Ok(Outcome::Data(Payload::Tracks(
            tracks.into_iter().map(TrackResponse::from).collect(),
        )))
    }

    pub fn get(&self, id: TrackId) -> Result<Outcome, ApiError> {
        let track = self.storage()?.get(id)?;
        Ok(Outcome::Data(Payload::Track(track.into())))
    }

    pub fn create(&self, body: &[u8]) -> Result<Outcome, ApiError> {
        let fields = fields::parse_body(body)?.into_fields();
        let track = self.storage()?.create(&fields)?;
        log::info!("created track {}", track.id);
        Ok(Outcome::Created(track.into()))
    }

    /// Full replace of `id`. Fields missing from the body are cleared.
    ///
    /// If `id` is absent the upsert policy decides between creating a track
    /// under a new id and failing with not found.
    pub fn upsert(&self, id: TrackId, body: &[u8]) -> Result<Outcome, ApiError> {
        let fields = fields::parse_body(body)?.into_fields();
        let mut storage = self.storage()?;

        match self.upsert_policy {
            UpsertPolicy::AssignNew => match storage.upsert(id, &fields)? {
                (track, Upserted::Created) => {
                    log::info!("track {id} absent, created track {}", track.id);
                    Ok(Outcome::Created(track.into()))
                }
                (track, Upserted::Replaced) => Ok(Outcome::Data(Payload::Track(track.into()))),
            },
            UpsertPolicy::Reject => {
                let track = storage.replace(id, &fields)?;
                Ok(Outcome::Data(Payload::Track(track.into())))
            }
        }
    }

    pub fn patch(&self, id: TrackId, body: &[u8]) -> Result<Outcome, ApiError> {
        let patch = fields::parse_body(body)?;
        let track = self.storage()?.patch(id, patch)?;
        Ok(Outcome::Data(Payload::Track(track.into())))
    }

    pub fn delete(&self, id: TrackId) -> Result<Outcome, ApiError> {
        self.storage()?.delete(id)?;
        log::info!("deleted track {id}");
        Ok(Outcome::NoData)
    }
}
