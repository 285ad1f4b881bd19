//! Raster output for the tidal-currents viewer.
//!
//! Everything is drawn with tiny-skia onto view-sized pixmaps:
//! - Land/sea masks rasterized from the projected boundary
//! - Particle trail frames with per-frame fading
//! - Scalar overlay cells and their legend
//! - Coastline, station and user-point layers
//!
//! Pixmaps are exported through the PNG encoder in [`png`].

pub mod basemap;
pub mod canvas;
pub mod error;
pub mod mask;
pub mod overlay;
pub mod path;
pub mod png;
pub mod style;

pub use basemap::{render_basemap, render_user_points};
pub use canvas::ParticleCanvas;
pub use error::{RenderError, RenderResult};
pub use mask::render_masks;
pub use overlay::paint_overlay;
pub use path::boundary_path;
pub use png::{encode_auto, encode_pixmap, encode_rgba};
pub use style::{particle_styles, rainbow, Rgba};
