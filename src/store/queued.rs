//! Host-driven store: the embedding environment performs the requests.

use std::collections::VecDeque;

use super::{StoreEvent, StoreRequest, ZoneStore};

/// Store backed by two queues.
///
/// The session pushes requests into the outbox; the host takes them with
/// [`QueuedZoneStore::take_request`], performs them however it likes, and
/// reports back with [`QueuedZoneStore::push_event`].
#[derive(Debug, Default)]
pub struct QueuedZoneStore {
    outbox: VecDeque<StoreRequest>,
    inbox: VecDeque<StoreEvent>,
    /// Requests handed out but not answered yet
    outstanding: usize,
}

impl QueuedZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest request the host has not started yet.
    pub fn take_request(&mut self) -> Option<StoreRequest> {
        let request = self.outbox.pop_front()?;
        self.outstanding += 1;
        log::trace!("Host took {} request", request.name());
        Some(request)
    }

    /// Drain every queued request.
    pub fn take_requests(&mut self) -> Vec<StoreRequest> {
        std::iter::from_fn(|| self.take_request()).collect()
    }

    /// Report a finished request.
    pub fn push_event(&mut self, event: StoreEvent) {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.inbox.push_back(event);
    }

    pub fn queued_requests(&self) -> usize {
        self.outbox.len()
    }
}

impl ZoneStore for QueuedZoneStore {
    fn submit(&mut self, request: StoreRequest) {
        log::debug!("Queued {} request for host", request.name());
        self.outbox.push_back(request);
    }

    fn poll(&mut self) -> Option<StoreEvent> {
        self.inbox.pop_front()
    }

    fn pending_count(&self) -> usize {
        self.outbox.len() + self.outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ZoneSource;

    #[test]
    fn test_requests_flow_in_order() {
        let mut store = QueuedZoneStore::new();
        store.submit(StoreRequest::Load);
        store.submit(StoreRequest::Snapshot);
        assert_eq!(store.pending_count(), 2);

        assert_eq!(store.take_request(), Some(StoreRequest::Load));
        assert_eq!(store.queued_requests(), 1);
        assert_eq!(store.pending_count(), 2);

        store.push_event(StoreEvent::Loaded {
            zones: Vec::new(),
            source: ZoneSource::Empty,
        });
        assert_eq!(store.pending_count(), 1);
        assert!(matches!(store.poll(), Some(StoreEvent::Loaded { .. })));
        assert!(store.poll().is_none());

        assert_eq!(store.take_requests(), vec![StoreRequest::Snapshot]);
        assert!(store.take_request().is_none());
    }

    #[test]
    fn test_request_wire_shape() {
        let json = serde_json::to_value(StoreRequest::Save {
            seq: 3,
            zones: Vec::new(),
        })
        .unwrap();
        assert_eq!(json["kind"], "save");
        assert_eq!(json["seq"], 3);
        assert_eq!(serde_json::to_value(StoreRequest::Load).unwrap()["kind"], "load");
    }
}
