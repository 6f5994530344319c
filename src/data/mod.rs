//! Dataset access
//!
//! - [`dataset`] - the numeric table, built-in diabetes data and CSV loading
//! - [`cache`] - memoized, never-invalidated loads
//! - [`sampling`] - seed parsing and the held-out sample draw

pub mod cache;
pub mod dataset;
pub mod sampling;

pub use cache::{CacheStats, DatasetCache};
pub use dataset::{ColumnSummary, Dataset, DatasetSource, DIABETES_ROWS};
pub use sampling::{parse_seed, SampleSplit, SAMPLE_SIZE};
