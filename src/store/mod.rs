//! Transport seam between the editor session and the settings backend.
//!
//! A [`ZoneStore`] accepts requests without blocking and hands back events
//! whenever they are ready. The session never waits on the network, so pointer
//! handling keeps running while a load or save is in flight.
//!
//! Two implementations:
//! - [`QueuedZoneStore`]: requests and events are plain queues that the host
//!   drains and fills (the browser bridge does the fetches itself).
//! - `HttpZoneStore` (native only): a background thread with a blocking HTTP client.

#[cfg(not(target_arch = "wasm32"))]
mod http;
#[cfg(test)]
mod memory;
mod queued;
pub mod wire;

use serde::Serialize;

use crate::error::StoreError;
use crate::model::Zone;

#[cfg(not(target_arch = "wasm32"))]
pub use http::{HttpClient, HttpZoneStore};
#[cfg(test)]
pub use memory::MemoryBackend;
pub use queued::QueuedZoneStore;
pub use wire::ZoneSource;

/// Work for the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreRequest {
    /// Fetch the stored zones, with fallbacks
    Load,
    /// Replace the stored zones
    Save { seq: u64, zones: Vec<Zone> },
    /// Fetch a fresh reference snapshot image
    Snapshot,
}

impl StoreRequest {
    pub fn name(&self) -> &'static str {
        match self {
            StoreRequest::Load => "load",
            StoreRequest::Save { .. } => "save",
            StoreRequest::Snapshot => "snapshot",
        }
    }
}

/// Result of a [`StoreRequest`].
#[derive(Debug)]
pub enum StoreEvent {
    /// Initial zones; loading never fails, it falls back to an empty list
    Loaded { zones: Vec<Zone>, source: ZoneSource },
    /// Answer to `Save { seq, .. }`, carrying the list the backend echoed
    Saved {
        seq: u64,
        result: Result<Vec<Zone>, StoreError>,
    },
    /// Encoded snapshot image bytes
    Snapshot(Result<Vec<u8>, StoreError>),
}

/// Non-blocking access to the settings backend.
pub trait ZoneStore {
    /// Queue a request. Never blocks.
    fn submit(&mut self, request: StoreRequest);

    /// Take one finished event, oldest first.
    fn poll(&mut self) -> Option<StoreEvent>;

    /// Number of submitted requests without an event yet.
    fn pending_count(&self) -> usize;
}
