//! Keeps the backend copy of the zone list in step with the editor.
//!
//! [`ZoneSync`] decides *when* to save and *what* counts as saved. It does no
//! I/O: it hands out [`SaveRequest`]s and is told how they went via
//! [`ZoneSync::complete`].
//!
//! Every request carries a sequence number. A response is only allowed to move
//! the "last persisted" snapshot forward if no newer response has been applied
//! yet, so an old save that finishes late never overwrites newer bookkeeping.

mod auto_save;

use std::collections::BTreeMap;
use std::time::Duration;

use web_time::Instant;

use crate::config::EditorConfig;
use crate::error::StoreError;
use crate::model::Zone;

pub use auto_save::AutoSaveTimer;

/// Why a save was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOrigin {
    /// Debounced background save
    Auto,
    /// Explicit user request
    Manual,
}

impl SaveOrigin {
    pub fn name(&self) -> &'static str {
        match self {
            SaveOrigin::Auto => "auto",
            SaveOrigin::Manual => "manual",
        }
    }
}

/// A save the host should send to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub seq: u64,
    pub origin: SaveOrigin,
    pub zones: Vec<Zone>,
}

/// What a finished save meant for the persisted snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The snapshot now matches what this request sent
    Applied { origin: SaveOrigin },
    /// A newer save already landed; this response was ignored
    Stale { origin: SaveOrigin },
    /// The save failed; the snapshot is unchanged
    Failed { origin: SaveOrigin, message: String },
    /// No such request is in flight (already completed, or after teardown)
    Unknown,
}

#[derive(Debug)]
struct InFlight {
    origin: SaveOrigin,
    zones: Vec<Zone>,
}

/// Persistence bookkeeping for one editing session.
#[derive(Debug)]
pub struct ZoneSync {
    timer: AutoSaveTimer,
    /// Last list known to be stored in the backend; `None` until loaded
    persisted: Option<Vec<Zone>>,
    next_seq: u64,
    /// Highest sequence number whose success has been applied
    applied_seq: u64,
    in_flight: BTreeMap<u64, InFlight>,
    torn_down: bool,
}

impl ZoneSync {
    pub fn new(autosave_delay: Duration) -> Self {
        Self {
            timer: AutoSaveTimer::new().with_debounce_delay(autosave_delay),
            persisted: None,
            next_seq: 1,
            applied_seq: 0,
            in_flight: BTreeMap::new(),
            torn_down: false,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.autosave_delay())
    }

    /// Whether the initial load has completed.
    pub fn is_loaded(&self) -> bool {
        self.persisted.is_some()
    }

    pub fn persisted(&self) -> Option<&[Zone]> {
        self.persisted.as_deref()
    }

    /// Whether `zones` differs from the last persisted list.
    pub fn is_dirty(&self, zones: &[Zone]) -> bool {
        self.persisted.as_deref().is_some_and(|p| p != zones)
    }

    /// Whether a background save is counting down.
    pub fn is_save_scheduled(&self) -> bool {
        self.timer.is_pending()
    }

    /// Time until the scheduled background save, if one is counting down.
    pub fn time_until_save(&self, now: Instant) -> Option<Duration> {
        self.timer.remaining(now)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Record the list loaded from the backend as the persisted baseline.
    pub fn on_loaded(&mut self, zones: &[Zone]) {
        log::debug!("Persisted baseline set to {} zones", zones.len());
        self.persisted = Some(zones.to_vec());
        self.timer.cancel();
    }

    /// Notify that the editor's zone list changed.
    ///
    /// Changes before the initial load are ignored. A list equal to the
    /// persisted one cancels any pending countdown.
    pub fn zones_changed(&mut self, zones: &[Zone], now: Instant) {
        if self.torn_down {
            return;
        }
        match self.persisted.as_deref() {
            None => log::trace!("Zone change before initial load, not scheduling save"),
            Some(persisted) if persisted == zones => {
                log::trace!("Zones match persisted copy");
                self.timer.cancel();
            }
            Some(_) => self.timer.restart(now),
        }
    }

    /// Return a background save if the quiet period has elapsed.
    pub fn poll_due(&mut self, zones: &[Zone], now: Instant) -> Option<SaveRequest> {
        if self.torn_down || !self.timer.take_due(now) {
            return None;
        }
        if !self.is_dirty(zones) {
            log::debug!("Auto-save skipped, zones unchanged");
            return None;
        }
        Some(self.issue(SaveOrigin::Auto, zones))
    }

    /// Save immediately, bypassing the debounce.
    pub fn save_now(&mut self, zones: &[Zone]) -> SaveRequest {
        self.timer.cancel();
        self.issue(SaveOrigin::Manual, zones)
    }

    fn issue(&mut self, origin: SaveOrigin, zones: &[Zone]) -> SaveRequest {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight.insert(
            seq,
            InFlight {
                origin,
                zones: zones.to_vec(),
            },
        );
        log::info!("Saving {} zones ({} save #{})", zones.len(), origin.name(), seq);
        SaveRequest {
            seq,
            origin,
            zones: zones.to_vec(),
        }
    }

    /// Apply the backend's answer to request `seq`.
    ///
    /// `result` carries the list the backend echoed back on success.
    pub fn complete(&mut self, seq: u64, result: Result<Vec<Zone>, StoreError>) -> SaveOutcome {
        if self.torn_down {
            log::debug!("Ignoring save #{} response after teardown", seq);
            return SaveOutcome::Unknown;
        }
        let Some(request) = self.in_flight.remove(&seq) else {
            log::warn!("Response for unknown save #{}", seq);
            return SaveOutcome::Unknown;
        };
        let origin = request.origin;

        if seq <= self.applied_seq {
            log::debug!(
                "Ignoring stale save #{} response (already applied #{})",
                seq,
                self.applied_seq
            );
            return SaveOutcome::Stale { origin };
        }

        match result {
            Ok(echoed) => {
                if echoed != request.zones {
                    log::debug!(
                        "Backend echoed {} zones for save #{} (sent {})",
                        echoed.len(),
                        seq,
                        request.zones.len()
                    );
                }
                self.applied_seq = seq;
                self.persisted = Some(request.zones);
                log::info!("Save #{} stored", seq);
                SaveOutcome::Applied { origin }
            }
            Err(e) => {
                match origin {
                    SaveOrigin::Auto => log::warn!("Auto-save #{} failed: {}", seq, e),
                    SaveOrigin::Manual => log::error!("Save #{} failed: {}", seq, e),
                }
                SaveOutcome::Failed {
                    origin,
                    message: e.to_string(),
                }
            }
        }
    }

    /// Stop all timers; later responses are ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.timer.cancel();
        if !self.in_flight.is_empty() {
            log::debug!("Tearing down with {} saves in flight", self.in_flight.len());
        }
        self.in_flight.clear();
        self.torn_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ZoneId;
    use roi_geom::ZoneCoords;

    const DELAY: Duration = Duration::from_secs(2);

    fn zone(id: &str, x: f64) -> Zone {
        Zone::new(ZoneId::from(id), id, ZoneCoords::new(x, 0.1, 0.2, 0.2))
    }

    fn loaded(zones: &[Zone]) -> ZoneSync {
        let mut sync = ZoneSync::new(DELAY);
        sync.on_loaded(zones);
        sync
    }

    #[test]
    fn test_changes_before_load_are_ignored() {
        let start = Instant::now();
        let mut sync = ZoneSync::new(DELAY);
        sync.zones_changed(&[zone("a", 0.1)], start);
        assert!(!sync.is_save_scheduled());
        assert!(sync.poll_due(&[zone("a", 0.1)], start + DELAY * 2).is_none());
    }

    #[test]
    fn test_debounced_save_after_quiet_period() {
        let start = Instant::now();
        let mut sync = loaded(&[]);
        let zones = vec![zone("a", 0.1)];

        sync.zones_changed(&zones, start);
        assert!(sync.poll_due(&zones, start + Duration::from_secs(1)).is_none());

        let request = sync.poll_due(&zones, start + DELAY).unwrap();
        assert_eq!(request.origin, SaveOrigin::Auto);
        assert_eq!(request.zones, zones);
        assert_eq!(sync.in_flight_count(), 1);
    }

    #[test]
    fn test_burst_of_changes_produces_one_save() {
        let start = Instant::now();
        let mut sync = loaded(&[]);

        for step in 0..10u32 {
            let zones = vec![zone("a", 0.01 * f64::from(step))];
            let now = start + Duration::from_millis(200) * step;
            sync.zones_changed(&zones, now);
            assert!(sync.poll_due(&zones, now).is_none());
        }

        let last = vec![zone("a", 0.09)];
        let done = start + Duration::from_millis(1800) + DELAY;
        assert!(sync.poll_due(&last, done).is_some());
        assert!(sync.poll_due(&last, done + DELAY).is_none());
    }

    #[test]
    fn test_change_back_to_persisted_cancels_countdown() {
        let start = Instant::now();
        let original = vec![zone("a", 0.1)];
        let mut sync = loaded(&original);

        sync.zones_changed(&[zone("a", 0.3)], start);
        assert!(sync.is_save_scheduled());
        sync.zones_changed(&original, start + Duration::from_millis(500));
        assert!(!sync.is_save_scheduled());
        assert!(sync.poll_due(&original, start + DELAY * 2).is_none());
    }

    #[test]
    fn test_success_updates_snapshot() {
        let mut sync = loaded(&[]);
        let zones = vec![zone("a", 0.1)];
        let request = sync.save_now(&zones);
        assert!(sync.is_dirty(&zones));

        let outcome = sync.complete(request.seq, Ok(zones.clone()));
        assert_eq!(
            outcome,
            SaveOutcome::Applied {
                origin: SaveOrigin::Manual
            }
        );
        assert!(!sync.is_dirty(&zones));
        assert_eq!(sync.persisted(), Some(zones.as_slice()));
    }

    #[test]
    fn test_failure_leaves_snapshot_untouched() {
        let original = vec![zone("a", 0.1)];
        let mut sync = loaded(&original);
        let changed = vec![zone("a", 0.5)];
        let request = sync.save_now(&changed);

        let outcome = sync.complete(request.seq, Err(StoreError::Transport("refused".into())));
        assert!(matches!(
            outcome,
            SaveOutcome::Failed {
                origin: SaveOrigin::Manual,
                ..
            }
        ));
        assert_eq!(sync.persisted(), Some(original.as_slice()));
        assert!(sync.is_dirty(&changed));
    }

    #[test]
    fn test_out_of_order_completion_is_ignored() {
        let mut sync = loaded(&[]);
        let older = vec![zone("a", 0.1)];
        let newer = vec![zone("a", 0.4)];

        let first = sync.save_now(&older);
        let second = sync.save_now(&newer);
        assert!(second.seq > first.seq);

        assert!(matches!(
            sync.complete(second.seq, Ok(newer.clone())),
            SaveOutcome::Applied { .. }
        ));
        assert!(matches!(
            sync.complete(first.seq, Ok(older)),
            SaveOutcome::Stale { .. }
        ));
        assert_eq!(sync.persisted(), Some(newer.as_slice()));
    }

    #[test]
    fn test_manual_save_cancels_countdown() {
        let start = Instant::now();
        let mut sync = loaded(&[]);
        let zones = vec![zone("a", 0.1)];
        sync.zones_changed(&zones, start);

        let request = sync.save_now(&zones);
        assert!(!sync.is_save_scheduled());
        sync.complete(request.seq, Ok(zones.clone()));
        assert!(sync.poll_due(&zones, start + DELAY * 3).is_none());
    }

    #[test]
    fn test_repeated_identical_saves_are_idempotent() {
        let mut sync = loaded(&[]);
        let zones = vec![zone("a", 0.1), zone("b", 0.5)];

        for _ in 0..2 {
            let request = sync.save_now(&zones);
            assert_eq!(request.zones, zones);
            sync.complete(request.seq, Ok(request.zones.clone()));
        }
        assert_eq!(sync.persisted(), Some(zones.as_slice()));
    }

    #[test]
    fn test_teardown_drops_timer_and_responses() {
        let start = Instant::now();
        let mut sync = loaded(&[]);
        let zones = vec![zone("a", 0.1)];
        sync.zones_changed(&zones, start);
        let request = sync.save_now(&zones);
        sync.zones_changed(&[zone("a", 0.2)], start);

        sync.teardown();
        assert!(!sync.is_save_scheduled());
        assert_eq!(sync.complete(request.seq, Ok(zones)), SaveOutcome::Unknown);
        assert!(sync.poll_due(&[], start + DELAY * 5).is_none());
    }

    #[test]
    fn test_unknown_sequence() {
        let mut sync = loaded(&[]);
        assert_eq!(sync.complete(42, Ok(Vec::new())), SaveOutcome::Unknown);
    }
}
