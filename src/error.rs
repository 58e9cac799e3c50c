//! Error types for zone editing, persistence and snapshot handling.

use thiserror::Error;

use crate::model::ZoneId;

/// Rejected user input. None of these leave a partial zone behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// A zone name was empty or whitespace only
    #[error("Zone name must not be empty")]
    EmptyName,

    /// Grid rows or columns out of range
    #[error("Grid must have at least one row and one column (got {rows}x{cols})")]
    InvalidGridSize {
        /// Requested rows
        rows: u32,
        /// Requested columns
        cols: u32,
    },

    /// Grid would produce more cells than allowed
    #[error("Grid of {rows}x{cols} exceeds the limit of {max} zones")]
    GridTooLarge {
        /// Requested rows
        rows: u32,
        /// Requested columns
        cols: u32,
        /// Largest allowed cell count
        max: u32,
    },

    /// Grid cells would be narrower than the minimum zone size
    #[error("A {rows}x{cols} grid makes cells smaller than the minimum zone size")]
    GridCellTooSmall {
        /// Requested rows
        rows: u32,
        /// Requested columns
        cols: u32,
    },

    /// No drawn rectangle is waiting to be committed
    #[error("No drawn rectangle is waiting to be saved")]
    NoPendingShape,

    /// The waiting rectangle was drawn for the other kind of commit
    #[error("The drawn rectangle is a {found} shape, not a {expected} shape")]
    PendingKindMismatch {
        /// Kind the caller tried to commit
        expected: &'static str,
        /// Kind actually pending
        found: &'static str,
    },

    /// Operation referenced a zone that does not exist
    #[error("Zone not found: {0}")]
    ZoneNotFound(ZoneId),
}

/// Failures talking to the settings backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection, DNS, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Body was not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading a response body
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body exceeded the size cap
    #[error("Response larger than {limit} bytes")]
    TooLarge {
        /// Largest accepted body, in bytes
        limit: u64,
    },

    /// Background worker is gone
    #[error("Store worker disconnected")]
    Disconnected,

    /// Host reported a failure without further detail
    #[error("{0}")]
    Host(String),
}

/// Failures turning fetched bytes into a reference snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Backend returned no bytes
    #[error("Snapshot is empty")]
    Empty,

    /// Bytes are not a decodable image
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),
}
