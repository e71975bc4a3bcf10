//! Target speed paths from recorded driving cycles.
//!
//! A driving cycle (speed sampled once per second) is reduced to its
//! extrema, optionally cleaned of weak braking events and gear shift dips,
//! and expanded back into a max-hold target path for energy models.

pub mod cycle_preparation;
pub mod cycle_processor;
pub mod cycle_reader;
pub mod distance;
pub mod error;
pub mod extrema;
pub mod extrema_smoother;
pub mod idle_time;
pub mod path_builder;

pub use cycle_preparation::{prepare, CycleSummary, PreparedCycle};
pub use cycle_reader::{cycle_opening, read_cycle, DrivingCycle};
pub use distance::trapezoidal_distance;
pub use error::{CycleError, Result};
pub use extrema::{extrema, extrema_standard, Extrema};
pub use extrema_smoother::{extrema_smooth, SmoothingConfig, SmoothingReport};
pub use idle_time::idle_time;
pub use path_builder::cycle_path;
