//! Particle animation frames.
//!
//! Each frame fades the previous frame inside the display bounds, then draws
//! one short segment per drawable particle, batched per intensity bucket so
//! every bucket is a single stroke in a single gray.

use tiny_skia::{BlendMode, Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use flow_field::ParticleSystem;
use projection::{DisplayBounds, View};

use crate::error::{RenderError, RenderResult};
use crate::png::encode_pixmap;
use crate::style::{particle_styles, Rgba};

/// Share of the previous frame that survives each fade.
pub const FADE_ALPHA: f32 = 0.97;

/// Stroke width of a particle segment, in pixels.
pub const PARTICLE_LINE_WIDTH: f32 = 1.0;

/// Persistent raster the particle trails are drawn onto.
pub struct ParticleCanvas {
    pixmap: Pixmap,
    bounds: DisplayBounds,
    styles: Vec<Rgba>,
    fade: Paint<'static>,
    stroke: Stroke,
    frames: u64,
}

impl ParticleCanvas {
    pub fn new(view: View, bounds: DisplayBounds) -> RenderResult<Self> {
        let pixmap = Pixmap::new(view.width, view.height).ok_or(RenderError::Allocation {
            width: view.width,
            height: view.height,
        })?;

        let mut fade = Paint::default();
        fade.set_color(Color::from_rgba(0.0, 0.0, 0.0, FADE_ALPHA).unwrap_or(Color::BLACK));
        fade.blend_mode = BlendMode::DestinationIn;

        let mut stroke = Stroke::default();
        stroke.width = PARTICLE_LINE_WIDTH;

        Ok(Self {
            pixmap,
            bounds,
            styles: particle_styles(),
            fade,
            stroke,
            frames: 0,
        })
    }

    /// Replace the fade factor (share of the previous frame kept).
    pub fn with_fade(mut self, alpha: f32) -> Self {
        if let Some(color) = Color::from_rgba(0.0, 0.0, 0.0, alpha.clamp(0.0, 1.0)) {
            self.fade.set_color(color);
        }
        self
    }

    /// One style per intensity bucket.
    pub fn styles(&self) -> &[Rgba] {
        &self.styles
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Dim everything inside the display bounds.
    pub fn fade(&mut self) {
        let rect = Rect::from_xywh(
            self.bounds.x as f32,
            self.bounds.y as f32,
            self.bounds.width as f32,
            self.bounds.height as f32,
        );
        if let Some(rect) = rect {
            self.pixmap
                .fill_rect(rect, &self.fade, Transform::identity(), None);
        }
    }

    /// Stroke every bucketed particle segment, then commit the moves.
    pub fn draw(&mut self, particles: &mut ParticleSystem) {
        for (i, style) in self.styles.iter().enumerate() {
            let mut pb = PathBuilder::new();
            for (from, to) in particles.segments(i) {
                pb.move_to(from[0] as f32, from[1] as f32);
                pb.line_to(to[0] as f32, to[1] as f32);
            }
            if let Some(path) = pb.finish() {
                self.pixmap
                    .stroke_path(&path, &style.paint(), &self.stroke, Transform::identity(), None);
            }
        }
        particles.commit();
    }

    /// Fade, draw and count one frame.
    pub fn render_frame(&mut self, particles: &mut ParticleSystem) {
        self.fade();
        self.draw(particles);
        self.frames += 1;
    }

    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        encode_pixmap(&self.pixmap)
    }
}
