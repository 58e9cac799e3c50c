//! Reference snapshot image shown behind the zone overlay.
//!
//! Exactly one snapshot is current at a time. Replacing it drops the previous
//! buffer and tearing down the slot drops the last one.

use crate::error::SnapshotError;

/// A decoded-and-validated camera snapshot.
///
/// Only the natural dimensions are read from the pixels; the encoded bytes are
/// kept for display.
#[derive(Debug)]
pub struct SnapshotImage {
    id: u64,
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl SnapshotImage {
    /// Validate `bytes` as an image and read its dimensions.
    pub fn decode(id: u64, bytes: Vec<u8>) -> Result<Self, SnapshotError> {
        if bytes.is_empty() {
            return Err(SnapshotError::Empty);
        }
        let image = image::load_from_memory(&bytes)?;
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(SnapshotError::Empty);
        }
        log::debug!("Snapshot #{} decoded: {}x{} ({} bytes)", id, width, height, bytes.len());
        Ok(Self {
            id,
            bytes,
            width,
            height,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Drop for SnapshotImage {
    fn drop(&mut self) {
        log::debug!("Released snapshot #{} ({} bytes)", self.id, self.bytes.len());
    }
}

/// Holder of the current snapshot.
#[derive(Debug, Default)]
pub struct SnapshotSlot {
    current: Option<SnapshotImage>,
    next_id: u64,
    releases: u64,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new snapshot from encoded bytes.
    ///
    /// The previous snapshot is released only once the new one decoded; on
    /// error the old one stays current.
    pub fn replace(&mut self, bytes: Vec<u8>) -> Result<&SnapshotImage, SnapshotError> {
        self.next_id += 1;
        let image = SnapshotImage::decode(self.next_id, bytes)?;
        if self.current.is_some() {
            self.releases += 1;
        }
        Ok(&*self.current.insert(image))
    }

    /// Drop the current snapshot, if any.
    pub fn release(&mut self) {
        if self.current.take().is_some() {
            self.releases += 1;
        }
    }

    pub fn current(&self) -> Option<&SnapshotImage> {
        self.current.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.current.is_some()
    }

    /// Number of snapshots released so far.
    pub fn release_count(&self) -> u64 {
        self.releases
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    /// Encode a blank PNG of the given size.
    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_reads_dimensions() {
        let image = SnapshotImage::decode(1, png(64, 48)).unwrap();
        assert_eq!((image.width(), image.height()), (64, 48));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            SnapshotImage::decode(1, Vec::new()),
            Err(SnapshotError::Empty)
        ));
        assert!(SnapshotImage::decode(2, b"<html>camera offline</html>".to_vec()).is_err());
    }

    #[test]
    fn test_replace_releases_previous() {
        let mut slot = SnapshotSlot::new();
        let first = slot.replace(png(8, 8)).unwrap().id();
        assert_eq!(slot.release_count(), 0);

        let second = slot.replace(png(16, 8)).unwrap().id();
        assert_ne!(first, second);
        assert_eq!(slot.release_count(), 1);
        assert_eq!(slot.current().map(|s| s.width()), Some(16));
    }

    #[test]
    fn test_failed_replace_keeps_current() {
        let mut slot = SnapshotSlot::new();
        slot.replace(png(8, 8)).unwrap();

        assert!(slot.replace(vec![0, 1, 2, 3]).is_err());
        assert!(slot.is_available());
        assert_eq!(slot.release_count(), 0);
    }

    #[test]
    fn test_release() {
        let mut slot = SnapshotSlot::new();
        slot.release();
        assert_eq!(slot.release_count(), 0);

        slot.replace(png(8, 8)).unwrap();
        slot.release();
        assert!(!slot.is_available());
        assert_eq!(slot.release_count(), 1);
    }
}
