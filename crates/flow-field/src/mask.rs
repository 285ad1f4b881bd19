//! Land/sea masks over the view raster.
//!
//! Two flags per pixel: the field mask (where vectors are computed, the sea
//! plus a band just outside the coastline) and the display mask (where
//! particles and overlay cells are visible, the sea minus the coastline
//! stroke). Coordinates outside the raster read as false.

use currents_common::{CurrentsError, CurrentsResult};

const FIELD: u8 = 0b01;
const DISPLAY: u8 = 0b10;

/// Immutable per-pixel field and display flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    flags: Vec<u8>,
}

impl Mask {
    /// Build from an RGBA raster: field = red > 0, display = green > 0.
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> CurrentsResult<Self> {
        if rgba.len() != width * height * 4 {
            return Err(CurrentsError::Config(format!(
                "mask raster is {} bytes, expected {}x{}x4",
                rgba.len(),
                width,
                height
            )));
        }
        let flags = rgba
            .chunks_exact(4)
            .map(|px| {
                let mut f = 0;
                if px[0] > 0 {
                    f |= FIELD;
                }
                if px[1] > 0 {
                    f |= DISPLAY;
                }
                f
            })
            .collect();
        Ok(Self {
            width,
            height,
            flags,
        })
    }

    /// Build from row-major field and display flags.
    pub fn from_flags(
        width: usize,
        height: usize,
        field: &[bool],
        display: &[bool],
    ) -> CurrentsResult<Self> {
        if field.len() != width * height || display.len() != width * height {
            return Err(CurrentsError::Config(format!(
                "mask flags do not match {}x{}",
                width, height
            )));
        }
        let flags = field
            .iter()
            .zip(display)
            .map(|(&f, &d)| (if f { FIELD } else { 0 }) | (if d { DISPLAY } else { 0 }))
            .collect();
        Ok(Self {
            width,
            height,
            flags,
        })
    }

    /// Build by evaluating `(field, display)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> (bool, bool),
    {
        let mut flags = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let (field, display) = f(x, y);
                flags.push((if field { FIELD } else { 0 }) | (if display { DISPLAY } else { 0 }));
            }
        }
        Self {
            width,
            height,
            flags,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn flag(&self, x: i32, y: i32, bit: u8) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return false;
        }
        self.flags[y * self.width + x] & bit != 0
    }

    /// True where the flow field is computed.
    #[inline]
    pub fn field_mask(&self, x: i32, y: i32) -> bool {
        self.flag(x, y, FIELD)
    }

    /// True where the flow is drawn.
    #[inline]
    pub fn display_mask(&self, x: i32, y: i32) -> bool {
        self.flag(x, y, DISPLAY)
    }

    /// Number of pixels inside the field mask.
    pub fn field_count(&self) -> usize {
        self.flags.iter().filter(|f| **f & FIELD != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_channels() {
        // red only, yellow, black, green only
        let rgba = [
            255, 0, 0, 255, 255, 255, 0, 255, 0, 0, 0, 0, 0, 10, 0, 10,
        ];
        let mask = Mask::from_rgba(2, 2, &rgba).unwrap();
        assert!(mask.field_mask(0, 0) && !mask.display_mask(0, 0));
        assert!(mask.field_mask(1, 0) && mask.display_mask(1, 0));
        assert!(!mask.field_mask(0, 1) && !mask.display_mask(0, 1));
        assert!(!mask.field_mask(1, 1) && mask.display_mask(1, 1));
    }

    #[test]
    fn test_out_of_bounds_is_false() {
        let mask = Mask::from_fn(3, 3, |_, _| (true, true));
        assert!(mask.field_mask(2, 2));
        assert!(!mask.field_mask(-1, 0));
        assert!(!mask.field_mask(0, -1));
        assert!(!mask.field_mask(3, 0));
        assert!(!mask.display_mask(0, 3));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        assert!(Mask::from_rgba(2, 2, &[0; 12]).is_err());
        assert!(Mask::from_flags(2, 2, &[true; 4], &[true; 3]).is_err());
    }

    #[test]
    fn test_field_count() {
        let mask = Mask::from_fn(4, 4, |x, _| (x < 2, false));
        assert_eq!(mask.field_count(), 8);
    }
}
