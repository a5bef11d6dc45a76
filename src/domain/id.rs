use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Represents the track ID.
///
/// Assigned by the store when a track is created and never reused,
/// even after the track is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub i64);

impl TrackId {
    pub fn value(self) -> i64 {
        self.0
    }
}

impl Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
