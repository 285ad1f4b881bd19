//! Colors for particles, overlays and masks.

use std::f64::consts::TAU;

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const RED: Rgba = Rgba::opaque(255, 0, 0);
    pub const YELLOW: Rgba = Rgba::opaque(255, 255, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with a fractional alpha in `[0, 1]`.
    pub fn with_alpha(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        }
    }

    pub fn paint(&self) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(self.r, self.g, self.b, self.a);
        paint.anti_alias = true;
        paint
    }
}

/// Darkest particle gray; styles step by [`GRAY_STEP`] up to white.
pub const GRAY_START: u8 = 85;
pub const GRAY_STEP: usize = 5;

/// Opaque grays from dim to white, one per intensity bucket.
pub fn particle_styles() -> Vec<Rgba> {
    (GRAY_START..=255)
        .step_by(GRAY_STEP)
        .map(|j| Rgba::opaque(j, j, j))
        .collect()
}

/// Rainbow ramp from blue (`hue = 0`) through green to purple (`hue = 1`).
pub fn rainbow(hue: f64, alpha: f64) -> Rgba {
    let rad = hue * TAU * 5.0 / 6.0 * 0.75;
    let s = rad.sin();
    let c = rad.cos();
    let channel = |v: f64| (v * 255.0).floor().clamp(0.0, 255.0) as u8;
    Rgba::with_alpha(
        channel((-c).max(0.0)),
        channel(s.max(0.0)),
        channel(c.max(0.0).max(-s)),
        alpha,
    )
}
