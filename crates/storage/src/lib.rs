//! Storage and time-series synchronization for tidal current data.
//!
//! Provides:
//! - A partition source over `object_store` (local files, HTTP, in-memory)
//! - The catalog (date index + station list)
//! - The in-memory time series and the synchronizer that extends it on demand

pub mod catalog;
pub mod object_store;
pub mod series;
pub mod sync;

pub use self::object_store::{ObjectStoreSource, PartitionSource, SourceConfig};
pub use catalog::{Catalog, DateIndex, PartitionRow};
pub use series::Series;
pub use sync::{Advance, LoadOutcome, Navigation, SeriesSynchronizer};
