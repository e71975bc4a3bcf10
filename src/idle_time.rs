/// Idle time of a cycle in seconds.
///
/// Counts samples at standstill whose successor is also at standstill, the
/// last sample being compared with the first one. Cycles usually start and
/// end at rest, so that wrap-around pair is taken back off the count. The
/// offset is applied unconditionally: a cycle without any idle pair yields -1.
pub fn idle_time(speeds: &[f64]) -> i64 {
    let n = speeds.len();
    let idle_pairs = (0..n)
        .filter(|&k| speeds[k] == 0.0 && speeds[(k + 1) % n] == 0.0)
        .count();

    idle_pairs as i64 - 1
}
