//! Common types and utilities shared across the tidal-currents crates.

pub mod bbox;
pub mod boundary;
pub mod error;
pub mod station;
pub mod status;
pub mod time;

pub use bbox::BoundingBox;
pub use boundary::{Boundary, BoundaryGeometry};
pub use error::{CurrentsError, CurrentsResult};
pub use station::{Sample, Station, TimeSlice};
pub use status::{Status, StatusBoard};
pub use time::{date_key_of, local_date_key, parse_wall_clock};
