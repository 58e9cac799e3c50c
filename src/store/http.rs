//! Native HTTP store: blocking client on a background thread.

use std::collections::VecDeque;
use std::io::Read;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use web_time::SystemTime;

use super::wire::{SettingsPayload, ZoneSource, ZonesPayload, resolve_load};
use super::{StoreEvent, StoreRequest, ZoneStore};
use crate::config::EditorConfig;
use crate::constants::{MAX_SNAPSHOT_BYTES, SETTINGS_ENDPOINT, SNAPSHOT_ENDPOINT, ZONES_ENDPOINT};
use crate::error::StoreError;
use crate::model::Zone;

impl From<ureq::Error> for StoreError {
    fn from(error: ureq::Error) -> Self {
        match error {
            ureq::Error::Status(status, response) => StoreError::Status {
                status,
                url: response.get_url().to_string(),
            },
            ureq::Error::Transport(transport) => StoreError::Transport(transport.to_string()),
        }
    }
}

/// Blocking client for the settings backend.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    base_url: String,
    auth_token: Option<String>,
}

/// Read a body of at most `limit` bytes. Longer bodies are an error, not truncated.
fn read_capped(reader: impl Read, limit: u64) -> Result<Vec<u8>, StoreError> {
    let mut bytes = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > limit {
        return Err(StoreError::TooLarge { limit });
    }
    Ok(bytes)
}

impl HttpClient {
    pub fn new(config: &EditorConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout())
            .build();
        Self {
            agent,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match &self.auth_token {
            Some(token) => request.set("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let url = self.url(path);
        log::debug!("GET {}", url);
        let body = self.authorize(self.agent.get(&url)).call()?.into_string()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `GET /api/settings/roi`.
    pub fn fetch_zones(&self) -> Result<ZonesPayload, StoreError> {
        self.get_json(ZONES_ENDPOINT)
    }

    /// `GET /api/settings`.
    pub fn fetch_settings(&self) -> Result<SettingsPayload, StoreError> {
        self.get_json(SETTINGS_ENDPOINT)
    }

    /// Load the stored zones, falling back to the general settings and then to
    /// an empty list. Failures along the way are logged, never returned.
    pub fn load_zones(&self) -> (Vec<Zone>, ZoneSource) {
        let endpoint = match self.fetch_zones() {
            Ok(payload) => Some(payload),
            Err(e) => {
                log::warn!("Zones endpoint unavailable, trying settings: {}", e);
                None
            }
        };
        let settings = match endpoint {
            Some(_) => None,
            None => match self.fetch_settings() {
                Ok(settings) => Some(settings),
                Err(e) => {
                    log::warn!("Settings unavailable, starting with no zones: {}", e);
                    None
                }
            },
        };

        let (zones, source) = resolve_load(endpoint, settings);
        log::info!("Loaded {} zones from {}", zones.len(), source.name());
        (zones, source)
    }

    /// `POST /api/settings/roi`; returns the list the backend stored.
    pub fn save_zones(&self, zones: &[Zone]) -> Result<Vec<Zone>, StoreError> {
        let url = self.url(ZONES_ENDPOINT);
        log::debug!("POST {} ({} zones)", url, zones.len());
        let body = serde_json::to_value(ZonesPayload::new(zones.to_vec()))?;
        let response = self.authorize(self.agent.post(&url)).send_json(body)?;
        let echoed: ZonesPayload = serde_json::from_str(&response.into_string()?)?;
        Ok(echoed.roi_zones)
    }

    /// `GET /api/camera/config_snapshot?t=<millis>`; returns the encoded image.
    pub fn fetch_snapshot(&self) -> Result<Vec<u8>, StoreError> {
        let url = self.url(SNAPSHOT_ENDPOINT);
        // Cache buster
        let millis = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        log::debug!("GET {}?t={}", url, millis);

        let response = self
            .authorize(self.agent.get(&url))
            .query("t", &millis.to_string())
            .call()?;
        let bytes = read_capped(response.into_reader(), MAX_SNAPSHOT_BYTES)?;
        log::debug!("Snapshot fetched ({} bytes)", bytes.len());
        Ok(bytes)
    }

    /// Perform one store request synchronously.
    pub fn execute(&self, request: StoreRequest) -> StoreEvent {
        match request {
            StoreRequest::Load => {
                let (zones, source) = self.load_zones();
                StoreEvent::Loaded { zones, source }
            }
            StoreRequest::Save { seq, zones } => StoreEvent::Saved {
                seq,
                result: self.save_zones(&zones),
            },
            StoreRequest::Snapshot => StoreEvent::Snapshot(self.fetch_snapshot()),
        }
    }
}

/// Message sent to the store thread.
enum ThreadMessage {
    /// Perform a request
    Request(StoreRequest),
    /// Shutdown the thread
    Shutdown,
}

/// Runs [`HttpClient`] requests on a background thread.
///
/// Requests are handled one at a time in submission order, so save responses
/// arrive in the order the saves were issued.
pub struct HttpZoneStore {
    /// Sender for requests to the background thread
    request_tx: Sender<ThreadMessage>,
    /// Receiver for events from the background thread
    event_rx: Receiver<StoreEvent>,
    /// Handle to the background thread (for joining on drop)
    thread_handle: Option<JoinHandle<()>>,
    /// Events produced locally because the thread is gone
    failed: VecDeque<StoreEvent>,
    pending: usize,
}

impl HttpZoneStore {
    /// Spawn the store thread.
    pub fn spawn(client: HttpClient) -> Result<Self, StoreError> {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (event_tx, event_rx) = mpsc::channel::<StoreEvent>();

        let base_url = client.base_url().to_string();
        let thread_handle = thread::Builder::new()
            .name("zone-store".to_string())
            .spawn(move || {
                log::debug!("Zone store thread started");
                Self::thread_loop(&client, request_rx, event_tx);
                log::debug!("Zone store thread exiting");
            })?;

        log::info!("Zone store talking to {}", base_url);

        Ok(Self {
            request_tx,
            event_rx,
            thread_handle: Some(thread_handle),
            failed: VecDeque::new(),
            pending: 0,
        })
    }

    fn thread_loop(
        client: &HttpClient,
        request_rx: Receiver<ThreadMessage>,
        event_tx: Sender<StoreEvent>,
    ) {
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Request(request)) => {
                    let event = client.execute(request);
                    if event_tx.send(event).is_err() {
                        log::warn!("Event channel closed, store thread exiting");
                        break;
                    }
                }
                Ok(ThreadMessage::Shutdown) => {
                    log::debug!("Received shutdown signal");
                    break;
                }
                Err(_) => {
                    log::debug!("Request channel closed, store thread exiting");
                    break;
                }
            }
        }
    }

    /// Answer a request that could not reach the thread.
    fn disconnected_event(request: StoreRequest) -> StoreEvent {
        match request {
            StoreRequest::Load => StoreEvent::Loaded {
                zones: Vec::new(),
                source: ZoneSource::Empty,
            },
            StoreRequest::Save { seq, .. } => StoreEvent::Saved {
                seq,
                result: Err(StoreError::Disconnected),
            },
            StoreRequest::Snapshot => StoreEvent::Snapshot(Err(StoreError::Disconnected)),
        }
    }
}

impl ZoneStore for HttpZoneStore {
    fn submit(&mut self, request: StoreRequest) {
        let name = request.name();
        match self.request_tx.send(ThreadMessage::Request(request)) {
            Ok(()) => {
                self.pending += 1;
                log::trace!("Sent {} request to store thread", name);
            }
            Err(mpsc::SendError(message)) => {
                log::error!("Failed to send {} request: store thread gone", name);
                if let ThreadMessage::Request(request) = message {
                    self.failed.push_back(Self::disconnected_event(request));
                }
            }
        }
    }

    fn poll(&mut self) -> Option<StoreEvent> {
        if let Some(event) = self.failed.pop_front() {
            return Some(event);
        }
        match self.event_rx.try_recv() {
            Ok(event) => {
                self.pending = self.pending.saturating_sub(1);
                Some(event)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if self.pending > 0 {
                    log::warn!("Store thread disconnected with {} requests pending", self.pending);
                    self.pending = 0;
                }
                None
            }
        }
    }

    fn pending_count(&self) -> usize {
        self.pending + self.failed.len()
    }
}

impl Drop for HttpZoneStore {
    fn drop(&mut self) {
        log::debug!("Shutting down zone store thread");

        let _ = self.request_tx.send(ThreadMessage::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Zone store thread panicked: {:?}", e);
            }
        }
    }
}
