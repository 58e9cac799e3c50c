//! In-memory backend used by session tests.

use super::wire::{SettingsPayload, ZonesPayload, resolve_load};
use super::{QueuedZoneStore, StoreEvent, StoreRequest};
use crate::error::StoreError;
use crate::model::Zone;

/// Fake settings backend that answers a [`QueuedZoneStore`]'s requests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// What the zones endpoint returns; `None` simulates a missing endpoint
    pub endpoint: Option<Vec<Zone>>,
    /// What the general settings endpoint returns
    pub settings: Option<SettingsPayload>,
    /// Snapshot bytes; `None` simulates an unavailable camera
    pub snapshot: Option<Vec<u8>>,
    /// Reject every save
    pub fail_saves: bool,
    /// Number of saves accepted
    pub save_count: usize,
}

impl MemoryBackend {
    pub fn with_zones(zones: Vec<Zone>) -> Self {
        Self {
            endpoint: Some(zones),
            ..Self::default()
        }
    }

    /// Answer one request.
    pub fn respond(&mut self, request: StoreRequest) -> StoreEvent {
        match request {
            StoreRequest::Load => {
                let endpoint = self.endpoint.clone().map(ZonesPayload::new);
                let (zones, source) = resolve_load(endpoint, self.settings.clone());
                StoreEvent::Loaded { zones, source }
            }
            StoreRequest::Save { seq, zones } => {
                let result = if self.fail_saves {
                    Err(StoreError::Status {
                        status: 500,
                        url: "memory://api/settings/roi".to_string(),
                    })
                } else {
                    self.save_count += 1;
                    self.endpoint = Some(zones.clone());
                    Ok(zones)
                };
                StoreEvent::Saved { seq, result }
            }
            StoreRequest::Snapshot => StoreEvent::Snapshot(match &self.snapshot {
                Some(bytes) => Ok(bytes.clone()),
                None => Err(StoreError::Status {
                    status: 503,
                    url: "memory://api/camera/config_snapshot".to_string(),
                }),
            }),
        }
    }

    /// Answer every request queued in `store`.
    pub fn serve(&mut self, store: &mut QueuedZoneStore) -> usize {
        let requests = store.take_requests();
        let count = requests.len();
        for request in requests {
            let event = self.respond(request);
            store.push_event(event);
        }
        count
    }
}
