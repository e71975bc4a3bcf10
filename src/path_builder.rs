/// Path reconstruction
///
/// Expands extrema back into one value per second. Between two extrema the
/// speed is held at the higher of the two, so every segment is driven at
/// its upper bound until the next turning point.
use crate::error::{CycleError, Result};
use crate::extrema::Extrema;

pub fn cycle_path(extrema: &Extrema) -> Result<Vec<f64>> {
    validate_extrema(extrema)?;

    let (values, indices) = (&extrema.values, &extrema.indices);
    let Some(&last_index) = indices.last() else {
        return Ok(Vec::new());
    };

    let mut path = Vec::with_capacity(last_index + 1);

    for k in 0..values.len() - 1 {
        let hold = values[k].max(values[k + 1]);
        let gap = indices[k + 1] - indices[k] - 1;

        path.push(values[k]);
        path.extend(std::iter::repeat(hold).take(gap));
    }
    path.push(values[values.len() - 1]);

    Ok(path)
}

fn validate_extrema(extrema: &Extrema) -> Result<()> {
    if extrema.values.len() != extrema.indices.len() {
        return Err(CycleError::InvalidExtrema(format!(
            "{} values for {} indices",
            extrema.values.len(),
            extrema.indices.len()
        )));
    }

    if let Some(&first) = extrema.indices.first() {
        if first != 0 {
            return Err(CycleError::InvalidExtrema(format!(
                "first index must be 0, got {}",
                first
            )));
        }
    }

    if let Some(w) = extrema.indices.windows(2).find(|w| w[0] >= w[1]) {
        return Err(CycleError::InvalidExtrema(format!(
            "indices not strictly increasing ({} then {})",
            w[0], w[1]
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrema::extrema_standard;

    #[test]
    fn test_max_hold_between_extrema() {
        let ext = Extrema::new(vec![0.0, 10.0, 4.0, 4.0], vec![0, 3, 5, 7]);
        let path = cycle_path(&ext).unwrap();

        assert_eq!(path, vec![0.0, 10.0, 10.0, 10.0, 10.0, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_length_matches_cycle() {
        let speeds = vec![0.0, 0.0, 5.0, 10.0, 10.0, 10.0, 6.0, 0.0, 0.0];
        let path = cycle_path(&extrema_standard(&speeds)).unwrap();

        assert_eq!(path.len(), speeds.len());
        assert_eq!(path, vec![0.0, 0.0, 10.0, 10.0, 10.0, 10.0, 10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_flat_segment_reproduced() {
        let speeds = vec![0.0, 2.0, 4.0, 7.0, 7.0, 7.0, 7.0];
        let path = cycle_path(&extrema_standard(&speeds)).unwrap();

        assert_eq!(path.len(), speeds.len());
        assert_eq!(&path[3..], &speeds[3..]);
    }

    #[test]
    fn test_degenerate_extrema() {
        assert!(cycle_path(&Extrema::default()).unwrap().is_empty());
        assert_eq!(cycle_path(&Extrema::new(vec![3.0], vec![0])).unwrap(), vec![3.0]);
    }

    #[test]
    fn test_rejects_invalid_extrema() {
        let mismatched = Extrema::new(vec![1.0, 2.0], vec![0]);
        let unordered = Extrema::new(vec![1.0, 2.0, 3.0], vec![0, 4, 4]);
        let offset = Extrema::new(vec![1.0, 2.0], vec![2, 5]);

        for ext in [mismatched, unordered, offset] {
            assert!(matches!(cycle_path(&ext), Err(CycleError::InvalidExtrema(_))));
        }
    }
}
