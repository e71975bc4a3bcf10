/// Driving cycle reader
///
/// A cycle file is a delimited text file: the first row carries the cycle
/// name in its first field, every following row carries one speed sample in
/// km/h in its first field. Samples are one second apart.
use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{CycleError, Result};

/// km/h per m/s
pub const KMH_PER_MPS: f64 = 3.6;

#[derive(Debug, Clone, PartialEq)]
pub struct DrivingCycle {
    /// First field of the header row
    pub name: String,
    /// Speed samples in m/s, one per second
    pub speeds: Vec<f64>,
}

/// Read a comma separated cycle file.
pub fn read_cycle(path: &Path) -> Result<DrivingCycle> {
    read_cycle_with_delimiter(path, b',')
}

pub fn read_cycle_with_delimiter(path: &Path, delimiter: u8) -> Result<DrivingCycle> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(file);

    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(|e| read_error(path, e, 1))?,
        None => return Err(format_error(path, 1, "file is empty, expected a cycle name header")),
    };
    let name = header.get(0).unwrap_or_default().to_string();

    let mut speeds = Vec::new();
    for (row, record) in records.enumerate() {
        // Header is line 1
        let record = record.map_err(|e| read_error(path, e, row + 2))?;
        let line = line_of(&record).unwrap_or(row + 2);
        speeds.push(parse_speed(path, line, &record)? / KMH_PER_MPS);
    }

    Ok(DrivingCycle { name, speeds })
}

/// Speed samples of a cycle file in m/s.
pub fn cycle_opening(path: &Path) -> Result<Vec<f64>> {
    Ok(read_cycle(path)?.speeds)
}

fn parse_speed(path: &Path, line: usize, record: &StringRecord) -> Result<f64> {
    let field = match record.get(0) {
        Some(field) if !field.is_empty() => field,
        _ => return Err(format_error(path, line, "missing speed value")),
    };

    field
        .parse::<f64>()
        .map_err(|_| format_error(path, line, &format!("speed '{}' is not a number", field)))
}

fn line_of(record: &StringRecord) -> Option<usize> {
    record.position().map(|pos| pos.line() as usize)
}

/// Undecodable content is a format problem; only I/O failures stay I/O errors.
fn read_error(path: &Path, err: csv::Error, fallback_line: usize) -> CycleError {
    let line = err
        .position()
        .map(|pos| pos.line() as usize)
        .unwrap_or(fallback_line);
    let message = err.to_string();

    match err.into_kind() {
        csv::ErrorKind::Io(io_err) => CycleError::Io(io_err),
        _ => format_error(path, line, &message),
    }
}

fn format_error(path: &Path, line: usize, message: &str) -> CycleError {
    CycleError::Format {
        path: path.to_path_buf(),
        line,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_fixture(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("cycle_reader_tests");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_converts_kmh_to_mps() {
        let path = write_fixture("my_cycle.csv", "MyCycle\n36\n0\n");
        let cycle = read_cycle(&path).unwrap();

        assert_eq!(cycle.name, "MyCycle");
        assert_eq!(cycle.speeds.len(), 2);
        assert!((cycle.speeds[0] - 10.0).abs() < 1e-12);
        assert_eq!(cycle.speeds[1], 0.0);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let path = write_fixture("wide.csv", "Urban,time\n18,0\n 72 ,1\n");
        let speeds = cycle_opening(&path).unwrap();

        assert!((speeds[0] - 5.0).abs() < 1e-12);
        assert!((speeds[1] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let path = write_fixture("semicolon.csv", "WLTC;class 3\n3.6;0\n7.2;1\n");
        let cycle = read_cycle_with_delimiter(&path, b';').unwrap();

        assert_eq!(cycle.name, "WLTC");
        assert!((cycle.speeds[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_header_only_gives_empty_cycle() {
        let path = write_fixture("header_only.csv", "Empty\n");
        let cycle = read_cycle(&path).unwrap();

        assert_eq!(cycle.name, "Empty");
        assert!(cycle.speeds.is_empty());
    }

    #[test]
    fn test_empty_file_is_format_error() {
        let path = write_fixture("empty.csv", "");
        let err = read_cycle(&path).unwrap_err();

        assert!(matches!(err, CycleError::Format { line: 1, .. }));
    }

    #[test]
    fn test_non_numeric_speed_is_format_error() {
        let path = write_fixture("bad_row.csv", "Cycle\n10\nfast\n");
        match read_cycle(&path) {
            Err(CycleError::Format { line, message, .. }) => {
                assert_eq!(line, 3);
                assert!(message.contains("fast"));
            }
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_is_format_error() {
        let dir = std::env::temp_dir().join("cycle_reader_tests");
        fs::create_dir_all(&dir).unwrap();

        let data_row = dir.join("bad_bytes_row.csv");
        fs::write(&data_row, b"Cycle\n12\n\xff\xfe\n").unwrap();
        assert!(matches!(read_cycle(&data_row), Err(CycleError::Format { line: 3, .. })));

        let header = dir.join("bad_bytes_header.csv");
        fs::write(&header, b"\xff\xfeCycle\n12\n").unwrap();
        assert!(matches!(read_cycle(&header), Err(CycleError::Format { line: 1, .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("cycle_reader_tests").join("does_not_exist.csv");
        assert!(matches!(read_cycle(&path), Err(CycleError::Io(_))));
    }
}
