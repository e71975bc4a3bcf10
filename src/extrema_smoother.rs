/// Extrema smoothing
///
/// Two corrections are applied on top of the raw extrema:
///
/// 1. Negligible braking: a deceleration whose kinetic-energy loss per metre
///    stays under the braking force limit is flattened to the mean speed of
///    the region, and the short excursion that produced it is dropped.
/// 2. Gear shifts: a speed dip of at most a couple of seconds between two
///    sustained accelerations is removed together with its recovery point.
///
/// Both passes mark entries in a keep mask and filter once at the end, so
/// positions never shift while a pass is running.
use serde::Serialize;

use crate::distance::trapezoidal_distance;
use crate::error::{CycleError, Result};
use crate::extrema::{extrema_standard, Extrema};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingConfig {
    /// Braking force threshold (kinetic energy per unit mass lost per metre).
    /// Decelerations weaker than this are treated as noise.
    pub braking_force_limit: f64,
    /// Longest dip, in seconds, that can still be a gear shift
    pub gear_shift_max_dip_s: usize,
    /// Acceleration phases around a gear shift must last longer than this
    pub gear_shift_min_phase_s: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        SmoothingConfig {
            braking_force_limit: 0.0,
            gear_shift_max_dip_s: 2,
            gear_shift_min_phase_s: 3,
        }
    }
}

impl SmoothingConfig {
    pub fn with_limit(braking_force_limit: f64) -> Self {
        SmoothingConfig {
            braking_force_limit,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SmoothingReport {
    pub braking_candidates: usize,
    pub braking_extrema_removed: usize,
    pub gear_changes_removed: usize,
}

impl SmoothingReport {
    pub fn extrema_removed(&self) -> usize {
        self.braking_extrema_removed + 2 * self.gear_changes_removed
    }
}

/// Smoothed extrema of `speeds` with the default gear shift heuristics.
pub fn extrema_smooth(speeds: &[f64], limit: f64) -> Result<Extrema> {
    extrema_smooth_with_config(speeds, &SmoothingConfig::with_limit(limit))
}

pub fn extrema_smooth_with_config(speeds: &[f64], config: &SmoothingConfig) -> Result<Extrema> {
    Ok(extrema_smooth_with_report(speeds, config)?.0)
}

pub fn extrema_smooth_with_report(
    speeds: &[f64],
    config: &SmoothingConfig,
) -> Result<(Extrema, SmoothingReport)> {
    let limit = config.braking_force_limit;
    if !(limit > 0.0) {
        return Err(CycleError::InvalidLimit(limit));
    }

    let standard = extrema_standard(speeds);
    let distances = trapezoidal_distance(speeds);

    let candidates = braking_candidates(&standard, &distances, limit)?;
    let (after_braking, braking_removed) = smooth_negligible_braking(speeds, &standard, &candidates);
    let (smoothed, gear_changes) = remove_gear_shifts(&after_braking, config);

    let report = SmoothingReport {
        braking_candidates: candidates.len(),
        braking_extrema_removed: braking_removed,
        gear_changes_removed: gear_changes,
    };

    if report.extrema_removed() > 0 {
        println!(
            "🔧 Extrema smoothing: {} weak braking events, {} gear shifts, {} → {} extrema",
            report.braking_candidates,
            report.gear_changes_removed,
            standard.len(),
            smoothed.len()
        );
    }

    Ok((smoothed, report))
}

/// Positions `i` whose segment to `i + 1` decelerates with a braking force
/// inside `(-limit, 0)`.
fn braking_candidates(extrema: &Extrema, distances: &[f64], limit: f64) -> Result<Vec<usize>> {
    let mut candidates = Vec::new();

    for (position, (v, idx)) in extrema
        .values
        .windows(2)
        .zip(extrema.indices.windows(2))
        .enumerate()
    {
        let energy_change = (v[1] * v[1] - v[0] * v[0]) / 2.0;
        let distance_change = distances[idx[1]] - distances[idx[0]];

        if distance_change == 0.0 {
            // Standstill between the two extrema
            if energy_change == 0.0 {
                continue;
            }
            return Err(CycleError::DegenerateSegment {
                position,
                index: idx[0],
            });
        }

        let force = energy_change / distance_change;
        if force < 0.0 && force > -limit {
            candidates.push(position);
        }
    }

    Ok(candidates)
}

/// Flatten every weak braking event to the mean speed of its region.
///
/// Candidates are handled in order against one working copy of the values,
/// so a candidate sees the overwrites of the candidates before it.
fn smooth_negligible_braking(
    speeds: &[f64],
    extrema: &Extrema,
    candidates: &[usize],
) -> (Extrema, usize) {
    let m = extrema.len();
    let indices = &extrema.indices;
    let mut values = extrema.values.clone();
    let mut keep = vec![true; m];

    for &i in candidates {
        let mut j = 1;

        // Braking into a plateau
        if i + 2 < m && values[i + 1] == values[i + 2] {
            keep[i + 1] = false;
            j += 1;
        }

        // Short excursion that recovers without reaching the starting speed
        if i + j + 1 < m && values[i] > values[i + j + 1] && values[i + 1] < values[i + j + 1] {
            keep[i + j] = false;
            j += 1;
        }

        let region = &speeds[indices[i]..indices[i + j]];
        let mean = region.iter().sum::<f64>() / region.len() as f64;

        if i > 0 && values[i] == values[i - 1] {
            values[i - 1] = mean;
        }
        values[i] = mean;
        values[i + j] = mean;
    }

    let removed = keep.iter().filter(|&&k| !k).count();
    let smoothed = Extrema::new(values, indices.clone()).retain_mask(&keep);

    (smoothed, removed)
}

/// Drop short dips sitting between two sustained accelerations, together
/// with the point where the acceleration resumes.
fn remove_gear_shifts(extrema: &Extrema, config: &SmoothingConfig) -> (Extrema, usize) {
    let m = extrema.len();
    if m < 4 {
        return (extrema.clone(), 0);
    }

    let durations: Vec<usize> = extrema.indices.windows(2).map(|w| w[1] - w[0]).collect();
    let rises: Vec<f64> = extrema.values.windows(2).map(|w| w[1] - w[0]).collect();

    let is_sustained_acceleration =
        |p: usize| rises[p] > 0.0 && durations[p] > config.gear_shift_min_phase_s;

    let mut keep = vec![true; m];
    let mut gear_changes = 0;

    for p in 1..durations.len() - 1 {
        let short_dip = rises[p] < 0.0 && durations[p] <= config.gear_shift_max_dip_s;

        if short_dip && is_sustained_acceleration(p - 1) && is_sustained_acceleration(p + 1) {
            keep[p] = false;
            keep[p + 1] = false;
            gear_changes += 1;
        }
    }

    (extrema.retain_mask(&keep), gear_changes)
}
