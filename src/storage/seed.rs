//! Sample tracks a freshly reset store is populated with

use crate::{
    domain::track::TrackFields,
    storage::{error::StorageError, operations::Storage},
};

pub fn sample_tracks() -> Vec<TrackFields> {
    vec![
        TrackFields::new(
            "Suck My Kiss",
            "Red Hot Chili Peppers",
            "Blood Sugar Sex Magik",
            1991,
        ),
        TrackFields::new("Strife", "Trivium", "Vengeance Falls", 2013),
        TrackFields::new(
            "Off the Abyss",
            "Lorna Shore",
            "...And I Return To Nothingness",
            2021,
        ),
        TrackFields::new("Cemetery Gates", "Pantera", "Cowboys from Hell", 1990),
        TrackFields::new("Please End Me", "Paleface Swiss", "Single track", 2023),
    ]
}

/// Seeds the store, but only if it holds no tracks
pub fn seed_if_empty(storage: &mut Storage) -> Result<usize, StorageError> {
    if storage.count()? > 0 {
        log::info!("store already holds tracks, skipping seed");
        return Ok(0);
    }
    let created = storage.seed(&sample_tracks())?;
    log::info!("seeded store with {} tracks", created.len());
    Ok(created.len())
}
