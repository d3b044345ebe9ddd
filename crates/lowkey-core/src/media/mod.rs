pub mod audio;
pub mod image;
pub mod video;

use std::path::Path;

use enum_dispatch::enum_dispatch;

pub use audio::{AudioCarrier, SampleBuf};
pub use image::ImageCarrier;

use crate::error::LowkeyError;
use crate::result::Result;

/// Unit-level access shared by every carrier medium.
///
/// A unit is the smallest independently writable cell: one color channel of
/// one pixel, or one PCM sample. `depth` is always within 1..=8 and `value`
/// carries its payload in the low `depth` bits.
#[enum_dispatch]
pub trait CarrierUnits {
    /// Number of addressable units in this carrier.
    fn unit_count(&self) -> usize;

    /// The `depth` low bits of unit `idx`.
    fn read_lsbs(&self, idx: usize, depth: u8) -> u8;

    /// Overwrites the `depth` low bits of unit `idx`, keeping the result
    /// inside the unit's legal numeric range.
    fn write_lsbs(&mut self, idx: usize, depth: u8, value: u8);
}

pub trait Persist {
    fn save_as(&self, file: &Path) -> Result<()>;
}

/// Bit mask covering the `depth` low bits, `depth` within 1..=8.
pub(crate) fn lsb_mask(depth: u8) -> u8 {
    ((1u16 << depth) - 1) as u8
}

/// A carrier media loaded into memory for embedding or extraction.
#[derive(Debug)]
#[enum_dispatch(CarrierUnits)]
pub enum Carrier {
    Image(ImageCarrier),
    Audio(AudioCarrier),
}

/// What medium a path points at, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    pub fn from_path(f: &Path) -> Result<Self> {
        let ext = f
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or(LowkeyError::UnsupportedCarrier)?;

        match ext.as_str() {
            "png" | "bmp" | "jpg" | "jpeg" => Ok(MediaKind::Image),
            "wav" => Ok(MediaKind::Audio),
            "mp4" | "avi" | "mov" | "mkv" => Ok(MediaKind::Video),
            _ => Err(LowkeyError::UnsupportedCarrier),
        }
    }
}

impl Carrier {
    /// Loads an image or audio carrier from disk.
    ///
    /// Video paths are not accepted here; the first frame has to be pulled
    /// out with [`video::extract_first_frame`] and loaded as an image.
    pub fn from_file(f: &Path) -> Result<Self> {
        match MediaKind::from_path(f)? {
            MediaKind::Image => Ok(Carrier::Image(ImageCarrier::from_file(f)?)),
            MediaKind::Audio => Ok(Carrier::Audio(AudioCarrier::from_file(f)?)),
            MediaKind::Video => Err(LowkeyError::UnsupportedCarrier),
        }
    }
}

impl Persist for Carrier {
    fn save_as(&self, file: &Path) -> Result<()> {
        match self {
            Carrier::Image(i) => i.save_as(file),
            Carrier::Audio(a) => a.save_as(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_route_extensions() {
        assert_eq!(
            MediaKind::from_path("x.png".as_ref()).unwrap(),
            MediaKind::Image
        );
        assert_eq!(
            MediaKind::from_path("x.JPEG".as_ref()).unwrap(),
            MediaKind::Image
        );
        assert_eq!(
            MediaKind::from_path("x.wav".as_ref()).unwrap(),
            MediaKind::Audio
        );
        assert_eq!(
            MediaKind::from_path("x.mp4".as_ref()).unwrap(),
            MediaKind::Video
        );
    }

    #[test]
    fn should_reject_unknown_extensions() {
        for path in ["x.pdf", "x.gif", "x"] {
            match MediaKind::from_path(path.as_ref()) {
                Err(LowkeyError::UnsupportedCarrier) => {}
                other => panic!("expected UnsupportedCarrier for {path}, got {other:?}"),
            }
        }
    }
}
