/// Cycle preparation
///
/// Turns a cycle file into everything the energy model needs: the raw
/// speed trace, its cumulative distance, its (optionally smoothed) extrema,
/// the max-hold target path built from them and the idle time.
use std::path::Path;

use serde::Serialize;

use crate::cycle_reader::{read_cycle, KMH_PER_MPS};
use crate::distance::trapezoidal_distance;
use crate::error::Result;
use crate::extrema::{extrema, Extrema};
use crate::idle_time::idle_time;
use crate::path_builder::cycle_path;

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCycle {
    /// File path without its extension
    pub name: String,
    /// Name found in the header row of the file
    pub header_name: String,
    pub distances: Vec<f64>,
    pub extrema: Extrema,
    /// Target speed, one value per second (m/s)
    pub path: Vec<f64>,
    /// Raw speed trace (m/s)
    pub cycle: Vec<f64>,
    pub idle_time: i64,
    /// Braking force limit used for the extrema, 0 when unsmoothed
    pub limit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSummary {
    pub name: String,
    pub header_name: String,
    pub samples: usize,
    pub duration_s: usize,
    pub distance_km: f64,
    pub path_distance_km: f64,
    pub max_speed_kmh: f64,
    pub mean_speed_kmh: f64,
    pub extrema_count: usize,
    pub idle_time_s: i64,
    pub smoothed: bool,
}

/// Prepare the target path of the cycle stored at `path`.
///
/// A positive `limit` smooths the extrema with that braking force threshold.
pub fn prepare(path: &Path, limit: f64) -> Result<PreparedCycle> {
    let name = path.with_extension("").to_string_lossy().into_owned();

    let cycle = read_cycle(path)?;
    let t_idle = idle_time(&cycle.speeds);

    let distances = trapezoidal_distance(&cycle.speeds);
    let ext = extrema(&cycle.speeds, limit)?;

    let target = cycle_path(&ext)?;

    Ok(PreparedCycle {
        name,
        header_name: cycle.name,
        distances,
        extrema: ext,
        path: target,
        cycle: cycle.speeds,
        idle_time: t_idle,
        limit: limit.max(0.0),
    })
}

impl PreparedCycle {
    /// `(name, distances, extrema, path, cycle, idle_time)`
    pub fn into_tuple(self) -> (String, Vec<f64>, Extrema, Vec<f64>, Vec<f64>, i64) {
        (
            self.name,
            self.distances,
            self.extrema,
            self.path,
            self.cycle,
            self.idle_time,
        )
    }

    pub fn summary(&self) -> CycleSummary {
        let samples = self.cycle.len();
        let max_speed = self.cycle.iter().cloned().fold(0.0, f64::max);
        let mean_speed = if samples > 0 {
            self.cycle.iter().sum::<f64>() / samples as f64
        } else {
            0.0
        };

        CycleSummary {
            name: self.name.clone(),
            header_name: self.header_name.clone(),
            samples,
            duration_s: samples.saturating_sub(1),
            distance_km: self.distances.last().copied().unwrap_or(0.0) / 1000.0,
            path_distance_km: trapezoidal_distance(&self.path).last().copied().unwrap_or(0.0) / 1000.0,
            max_speed_kmh: max_speed * KMH_PER_MPS,
            mean_speed_kmh: mean_speed * KMH_PER_MPS,
            extrema_count: self.extrema.len(),
            idle_time_s: self.idle_time,
            smoothed: self.limit > 0.0,
        }
    }
}
