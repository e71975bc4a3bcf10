/// Cumulative distance of a 1 Hz speed trace using the trapezoidal rule.
///
/// The result has the same length as `speeds` and starts at 0.
pub fn trapezoidal_distance(speeds: &[f64]) -> Vec<f64> {
    if speeds.is_empty() {
        return Vec::new();
    }

    let mut distances = Vec::with_capacity(speeds.len());
    let mut distance = 0.0;
    distances.push(distance);

    for w in speeds.windows(2) {
        distance += (w[0] + w[1]) / 2.0;
        distances.push(distance);
    }

    distances
}
