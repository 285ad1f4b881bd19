//! Flow field construction and particle simulation for tidal currents.
//!
//! Station readings for one time slice are interpolated onto every pixel of
//! the water domain, producing a [`Field`] that the particle simulator
//! samples each animation frame. Interpolation honours the coastline: a
//! station on the far side of a peninsula barely influences the query pixel.
//!
//! # Architecture
//!
//! ```text
//! TimeSlice + Projection
//!      │
//!      ▼
//! FieldBuilder (BatchTask)
//!      │
//!      ├─► IdwInterpolator::interpolate(x, y)   k nearest via R-tree
//!      │         │
//!      │         └─► ObstructionPenalty       walks the field Mask
//!      │
//!      ├─► run_cooperative()                    bursts of max_task_time
//!      │
//!      └─► Field { columns, weights }
//!               │
//!               ▼
//!          ParticleSystem::evolve()            weighted respawn + buckets
//! ```
//!
//! # Example
//!
//! ```ignore
//! use flow_field::{build_field, FieldBuilder, FieldConfig, ParticleSystem};
//!
//! let builder = FieldBuilder::new(&slices, &projection, bounds, 2.857, mask, &config)?;
//! let field = build_field(builder, &config, |p| println!("{}", p)).await?;
//!
//! let mut particles = ParticleSystem::new(&field, 14_286, 30, 8.0, 35, rng);
//! particles.evolve(&field);
//! ```

pub mod builder;
pub mod config;
pub mod field;
pub mod interpolate;
pub mod mask;
pub mod overlay;
pub mod particles;
pub mod scheduler;

pub use builder::{build_field, display_date, vector_points, FieldBuilder, MIN_VECTOR_SAMPLES};
pub use config::FieldConfig;
pub use field::{Column, Field, FieldVector, Magnitude};
pub use interpolate::{
    componentize, IdwInterpolator, NoPenalty, ObstructionPenalty, Penalty, ScalarPoint,
    ThinPlateSpline, VectorPoint,
};
pub use mask::Mask;
pub use overlay::{build_overlay, Overlay, OverlayBuilder, OverlayCell, OverlayKind, OverlayScale};
pub use particles::{binary_search, random_position, seed_position, Particle, ParticleSystem};
pub use scheduler::{run_burst, run_cooperative, BatchTask, Burst, Progress};
