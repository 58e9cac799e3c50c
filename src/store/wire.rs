//! JSON payloads exchanged with the settings backend.

use roi_geom::ZoneCoords;
use serde::{Deserialize, Serialize};

use crate::constants::{LEGACY_ZONE_ID, LEGACY_ZONE_NAME};
use crate::model::{Zone, ZoneId};

/// Body of `GET`/`POST /api/settings/roi`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZonesPayload {
    #[serde(default)]
    pub roi_zones: Vec<Zone>,
}

impl ZonesPayload {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { roi_zones: zones }
    }
}

/// The parts of the general settings object the editor cares about.
///
/// Unknown fields (schedules, thresholds, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SettingsPayload {
    #[serde(default)]
    pub roi_zones: Option<Vec<Zone>>,

    /// Single-ROI field from before named zones existed: `[x, y, w, h]`
    #[serde(default)]
    pub roi_coordinates: Option<[f64; 4]>,
}

/// Where the initial zone list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSource {
    /// The dedicated zones endpoint
    ZonesEndpoint,
    /// `roi_zones` embedded in the general settings
    SettingsPayload,
    /// Converted from the legacy single ROI
    LegacyCoordinates,
    /// Nothing stored yet
    Empty,
}

impl ZoneSource {
    pub fn name(&self) -> &'static str {
        match self {
            ZoneSource::ZonesEndpoint => "zones endpoint",
            ZoneSource::SettingsPayload => "settings payload",
            ZoneSource::LegacyCoordinates => "legacy coordinates",
            ZoneSource::Empty => "empty",
        }
    }
}

/// Convert the legacy `[x, y, w, h]` ROI into a zone, if it describes a usable rectangle.
pub fn legacy_zone(coords: [f64; 4]) -> Option<Zone> {
    let [x, y, w, h] = coords;
    let coords = ZoneCoords::new(x, y, w, h);
    if !coords.is_well_formed(1e-6) {
        log::warn!("Ignoring malformed legacy ROI {:?}", coords);
        return None;
    }
    Some(Zone::new(ZoneId::from(LEGACY_ZONE_ID), LEGACY_ZONE_NAME, coords))
}

/// Pick the initial zone list from whatever the backend offered.
///
/// Order: dedicated endpoint, embedded `roi_zones`, legacy single ROI, empty.
/// An endpoint that answered with an empty list still counts as an answer.
pub fn resolve_load(
    endpoint: Option<ZonesPayload>,
    settings: Option<SettingsPayload>,
) -> (Vec<Zone>, ZoneSource) {
    if let Some(payload) = endpoint {
        return (payload.roi_zones, ZoneSource::ZonesEndpoint);
    }
    let Some(settings) = settings else {
        return (Vec::new(), ZoneSource::Empty);
    };
    if let Some(zones) = settings.roi_zones {
        return (zones, ZoneSource::SettingsPayload);
    }
    match settings.roi_coordinates.and_then(legacy_zone) {
        Some(zone) => (vec![zone], ZoneSource::LegacyCoordinates),
        None => (Vec::new(), ZoneSource::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_zone() -> Zone {
        Zone::new(ZoneId::from("z1"), "Desk", ZoneCoords::new(0.1, 0.2, 0.3, 0.4))
    }

    #[test]
    fn test_zones_payload_shape() {
        let json = serde_json::to_value(ZonesPayload::new(vec![sample_zone()])).unwrap();
        assert_eq!(json["roi_zones"][0]["id"], "z1");
        assert_eq!(json["roi_zones"][0]["coords"]["h"], 0.4);
    }

    #[test]
    fn test_settings_payload_ignores_other_fields() {
        let settings: SettingsPayload = serde_json::from_str(
            r#"{ "confidence_threshold": 0.5, "blur_faces": true, "roi_coordinates": null }"#,
        )
        .unwrap();
        assert_eq!(settings, SettingsPayload::default());
    }

    #[test]
    fn test_endpoint_wins() {
        let settings = SettingsPayload {
            roi_zones: Some(vec![sample_zone(), sample_zone()]),
            roi_coordinates: None,
        };
        let (zones, source) = resolve_load(Some(ZonesPayload::default()), Some(settings));
        assert!(zones.is_empty());
        assert_eq!(source, ZoneSource::ZonesEndpoint);
    }

    #[test]
    fn test_falls_back_to_settings_then_legacy() {
        let embedded = SettingsPayload {
            roi_zones: Some(vec![sample_zone()]),
            roi_coordinates: Some([0.0, 0.0, 0.5, 0.5]),
        };
        let (zones, source) = resolve_load(None, Some(embedded));
        assert_eq!(zones, vec![sample_zone()]);
        assert_eq!(source, ZoneSource::SettingsPayload);

        let legacy: SettingsPayload =
            serde_json::from_str(r#"{ "roi_coordinates": [0.1, 0.1, 0.5, 0.25] }"#).unwrap();
        let (zones, source) = resolve_load(None, Some(legacy));
        assert_eq!(source, ZoneSource::LegacyCoordinates);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].name, "ROI 1");
        assert_eq!(zones[0].coords, ZoneCoords::new(0.1, 0.1, 0.5, 0.25));
    }

    #[test]
    fn test_nothing_available_is_empty_not_error() {
        assert_eq!(resolve_load(None, None), (Vec::new(), ZoneSource::Empty));

        let broken = SettingsPayload {
            roi_zones: None,
            roi_coordinates: Some([0.5, 0.5, 0.0, -1.0]),
        };
        assert_eq!(
            resolve_load(None, Some(broken)),
            (Vec::new(), ZoneSource::Empty)
        );
    }
}
