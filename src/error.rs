use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while turning a cycle file into a path.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("malformed cycle file {} (line {line}): {message}", .path.display())]
    Format {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("invalid extrema: {0}")]
    InvalidExtrema(String),

    /// Two extrema share a cumulative distance while their speeds differ.
    #[error("zero-distance segment after extremum {position} (sample {index})")]
    DegenerateSegment { position: usize, index: usize },

    #[error("braking force limit must be positive, got {0}")]
    InvalidLimit(f64),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CycleError>;
