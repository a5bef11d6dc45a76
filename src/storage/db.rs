use std::path::Path;

use rusqlite::Connection;

use crate::{
    config::Database,
    storage::{error::StorageError, schema},
};

fn open_in_memory() -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open_in_memory()
}

fn open_from_file(path: &Path) -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open(path)
}

/// Opens the database described by the config and makes sure the schema exists.
///
/// With `reset_on_startup` all previous content is dropped.
pub fn open(config: &Database) -> Result<rusqlite::Connection, StorageError> {
    let db = if config.in_memory {
        open_in_memory()?
    } else {
        log::info!("opening database at {}", config.path.to_string_lossy());
        open_from_file(&config.path)?
    };
    if config.reset_on_startup {
        log::info!("resetting track database");
        schema::reset(&db)?;
    } else {
        schema::init(&db)?;
    }
    Ok(db)
}
