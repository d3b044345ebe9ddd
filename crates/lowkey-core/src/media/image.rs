//! RGB image carrier.
//!
//! Every colour channel of every pixel is one embedding unit, walked in
//! row-major order with the three channels of a pixel kept adjacent. Unit
//! `i` therefore lands on pixel `i / 3`, channel `i % 3`.

use std::path::Path;

use image::RgbImage;
use log::error;

use crate::error::LowkeyError;
use crate::frame::Region;
use crate::media::{lsb_mask, CarrierUnits, Persist};
use crate::result::Result;

/// An image loaded into an RGB8 buffer, ready for LSB surgery.
#[derive(Debug, Clone)]
pub struct ImageCarrier {
    img: RgbImage,
}

impl ImageCarrier {
    /// Decodes the file at `f` and flattens it to RGB8.
    pub fn from_file(f: &Path) -> Result<Self> {
        let img = image::open(f)
            .map_err(|e| {
                error!("Cannot decode image {}: {e}", f.display());
                LowkeyError::InvalidImageCarrier
            })?
            .to_rgb8();

        Ok(ImageCarrier { img })
    }

    /// Wraps an already decoded buffer.
    pub fn from_image(img: RgbImage) -> Self {
        ImageCarrier { img }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.img.dimensions()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.img
    }

    /// Units eligible for body data: the channels of all pixels inside
    /// `region` (whole image when `None`), minus the first `reserved` units,
    /// in ascending unit order.
    pub fn candidate_units(&self, region: Option<Region>, reserved: usize) -> Result<Vec<usize>> {
        let (w, h) = self.img.dimensions();
        let (x1, y1, x2, y2) = match region {
            None => (0, 0, w, h),
            Some(r) => {
                let (x1, y1) = (u32::from(r.x1), u32::from(r.y1));
                let (x2, y2) = (u32::from(r.x2), u32::from(r.y2));
                if x1 >= x2 || y1 >= y2 || x2 > w || y2 > h {
                    return Err(LowkeyError::InvalidRegion);
                }
                (x1, y1, x2, y2)
            }
        };

        let mut units = Vec::with_capacity(((x2 - x1) * (y2 - y1) * 3) as usize);
        for y in y1..y2 {
            for x in x1..x2 {
                let base = 3 * (y as usize * w as usize + x as usize);
                for channel in 0..3 {
                    let idx = base + channel;
                    if idx >= reserved {
                        units.push(idx);
                    }
                }
            }
        }

        Ok(units)
    }
}

impl CarrierUnits for ImageCarrier {
    fn unit_count(&self) -> usize {
        let (w, h) = self.img.dimensions();
        w as usize * h as usize * 3
    }

    fn read_lsbs(&self, idx: usize, depth: u8) -> u8 {
        self.img.as_raw()[idx] & lsb_mask(depth)
    }

    fn write_lsbs(&mut self, idx: usize, depth: u8, value: u8) {
        let mask = lsb_mask(depth);
        let channel = &mut (*self.img)[idx];
        *channel = (*channel & !mask) | (value & mask);
    }
}

impl Persist for ImageCarrier {
    fn save_as(&self, file: &Path) -> Result<()> {
        self.img.save(file).map_err(|e| {
            error!("Cannot write image {}: {e}", file.display());
            LowkeyError::ImageEncodingError
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::HEADER_UNITS;
    use image::Rgb;

    fn numbered_image(w: u32, h: u32) -> ImageCarrier {
        ImageCarrier::from_image(RgbImage::from_fn(w, h, |x, y| {
            let base = 3 * (y * w + x);
            Rgb([base as u8, (base + 1) as u8, (base + 2) as u8])
        }))
    }

    #[test]
    fn should_map_units_onto_channels_row_major() {
        let carrier = numbered_image(5, 4);

        assert_eq!(carrier.unit_count(), 5 * 4 * 3);
        for idx in 0..carrier.unit_count() {
            assert_eq!(carrier.read_lsbs(idx, 8), idx as u8, "unit {idx}");
        }
    }

    #[test]
    fn should_patch_only_the_masked_bits() {
        let mut carrier = ImageCarrier::from_image(RgbImage::from_pixel(2, 2, Rgb([0b1111_0000; 3])));

        carrier.write_lsbs(7, 3, 0b101);

        assert_eq!(carrier.read_lsbs(7, 8), 0b1111_0101);
        assert_eq!(carrier.read_lsbs(6, 8), 0b1111_0000);
        assert_eq!(carrier.read_lsbs(8, 8), 0b1111_0000);
    }

    #[test]
    fn should_enumerate_whole_image_minus_reserved_units() {
        let carrier = numbered_image(16, 16);

        let units = carrier.candidate_units(None, HEADER_UNITS).unwrap();

        assert_eq!(units.len(), 16 * 16 * 3 - HEADER_UNITS);
        assert_eq!(units[0], HEADER_UNITS);
        assert_eq!(*units.last().unwrap(), 16 * 16 * 3 - 1);
    }

    #[test]
    fn should_confine_candidates_to_the_region() {
        let carrier = numbered_image(16, 16);

        let units = carrier
            .candidate_units(Some(Region::new(8, 8, 16, 16)), HEADER_UNITS)
            .unwrap();

        assert_eq!(units.len(), 8 * 8 * 3);
        for &idx in &units {
            let pixel = idx / 3;
            let (x, y) = (pixel % 16, pixel / 16);
            assert!(x >= 8 && y >= 8, "unit {idx} at ({x}, {y}) escapes the region");
        }
    }

    #[test]
    fn should_drop_region_units_that_overlap_the_reserved_prefix() {
        let carrier = numbered_image(16, 16);

        // Units below 168 cover pixels 0..56: rows 0..=2 plus the left half
        // of row 3. Within the 8-wide region that knocks out rows 0..=3.
        let units = carrier
            .candidate_units(Some(Region::new(0, 0, 8, 8)), HEADER_UNITS)
            .unwrap();

        assert_eq!(units.len(), 8 * 8 * 3 - 4 * 8 * 3);
        assert!(units.iter().all(|&idx| idx >= HEADER_UNITS));
    }

    #[test]
    fn should_reject_degenerate_and_out_of_bounds_regions() {
        let carrier = numbered_image(16, 16);

        for region in [
            Region::new(8, 8, 8, 16),
            Region::new(8, 8, 16, 8),
            Region::new(12, 0, 4, 16),
            Region::new(0, 0, 17, 16),
            Region::new(0, 0, 16, 17),
        ] {
            let result = carrier.candidate_units(Some(region), HEADER_UNITS);
            match result {
                Err(LowkeyError::InvalidRegion) => {}
                other => panic!("expected InvalidRegion, got {other:?}"),
            }
        }
    }
}
