//! Zone data model.

use std::fmt;

use roi_geom::ZoneCoords;
use serde::{Deserialize, Serialize};

/// Stable, unique identifier of a zone.
///
/// Ids minted here look like `roi-3-<uuid>`, but ids loaded from the backend
/// are opaque strings and only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A named region of interest over the reference image.
///
/// Wire shape: `{ "id": string, "name": string, "coords": { "x", "y", "w", "h" } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub coords: ZoneCoords,
}

impl Zone {
    pub fn new(id: ZoneId, name: impl Into<String>, coords: ZoneCoords) -> Self {
        Self {
            id,
            name: name.into(),
            coords,
        }
    }
}

/// Mints zone ids: a per-editor counter plus a random v4 uuid.
#[derive(Debug, Default)]
pub struct ZoneIdGenerator {
    next: u64,
}

impl ZoneIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce a fresh id.
    pub fn mint(&mut self) -> ZoneId {
        self.next += 1;
        ZoneId(format!("roi-{}-{}", self.next, uuid::Uuid::new_v4().simple()))
    }
}
