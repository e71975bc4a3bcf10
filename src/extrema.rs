/// Extrema extraction
///
/// A speed trace is characterised by its turning points: strict local maxima
/// and minima, the first and last sample of every plateau, and the two
/// endpoints. Everything between two consecutive extrema is monotonic, which
/// is what the path builder relies on.
use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::Result;
use crate::extrema_smoother::extrema_smooth;

/// Parallel arrays of extremum values and their sample indices.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Extrema {
    pub values: Vec<f64>,
    pub indices: Vec<usize>,
}

impl Extrema {
    pub fn new(values: Vec<f64>, indices: Vec<usize>) -> Self {
        Extrema { values, indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Keep only the entries whose mask flag is set.
    pub(crate) fn retain_mask(&self, keep: &[bool]) -> Extrema {
        let mut values = Vec::with_capacity(self.len());
        let mut indices = Vec::with_capacity(self.len());

        for ((&value, &index), &kept) in self.values.iter().zip(&self.indices).zip(keep) {
            if kept {
                values.push(value);
                indices.push(index);
            }
        }

        Extrema { values, indices }
    }
}

/// Unsmoothed extrema of `speeds`.
pub fn extrema_standard(speeds: &[f64]) -> Extrema {
    let n = speeds.len();
    if n == 0 {
        return Extrema::default();
    }

    let mut indices = BTreeSet::new();
    indices.insert(0);
    indices.insert(n - 1);

    // Strict local maxima and minima
    for i in 1..n.saturating_sub(1) {
        let (prev, curr, next) = (speeds[i - 1], speeds[i], speeds[i + 1]);
        if (curr > prev && curr > next) || (curr < prev && curr < next) {
            indices.insert(i);
        }
    }

    // Plateau boundaries: first and last sample of every run of 2+ equal values
    let mut run_start = 0;
    for i in 1..=n {
        if i == n || speeds[i] != speeds[run_start] {
            if i - run_start >= 2 {
                indices.insert(run_start);
                indices.insert(i - 1);
            }
            run_start = i;
        }
    }

    let indices: Vec<usize> = indices.into_iter().collect();
    let values = indices.iter().map(|&i| speeds[i]).collect();

    Extrema { values, indices }
}

/// Extrema of `speeds`, smoothed when `limit` is a positive braking force
/// threshold and left as extracted otherwise.
pub fn extrema(speeds: &[f64], limit: f64) -> Result<Extrema> {
    if limit <= 0.0 {
        Ok(extrema_standard(speeds))
    } else {
        extrema_smooth(speeds, limit)
    }
}
