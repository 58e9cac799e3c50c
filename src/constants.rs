//! Global constants for the zone editor

use std::time::Duration;

/// Quiet period after the last zone edit before an autosave is sent
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(2);

/// Default backend base URL (the admin API)
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Dedicated zone list endpoint (GET and POST)
pub const ZONES_ENDPOINT: &str = "/api/settings/roi";

/// General settings endpoint, used as a load fallback
pub const SETTINGS_ENDPOINT: &str = "/api/settings";

/// Reference snapshot endpoint (JPEG from the configured camera)
pub const SNAPSHOT_ENDPOINT: &str = "/api/camera/config_snapshot";

/// Largest snapshot body accepted from the backend
pub const MAX_SNAPSHOT_BYTES: u64 = 32 * 1024 * 1024;

/// Upper bound on cells produced by one grid generation
pub const MAX_GRID_CELLS: u32 = 1024;

/// Name given to a zone converted from the legacy single-ROI setting
pub const LEGACY_ZONE_NAME: &str = "ROI 1";

/// Stable id for the zone converted from the legacy single-ROI setting
pub const LEGACY_ZONE_ID: &str = "roi-legacy";
