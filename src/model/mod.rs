//! Data models for the zone editor.

mod mode;
mod zone;

pub use mode::DrawMode;
pub use zone::{Zone, ZoneId, ZoneIdGenerator};
