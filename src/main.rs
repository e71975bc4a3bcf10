use std::path::{Path, PathBuf};

use cycle_path::cycle_processor::{process_cycle_folder, write_path_csv};
use cycle_path::prepare;

const USAGE: &str = "Usage: cycle-path <CYCLE_FILE_OR_FOLDER> [--limit <BRAKING_FORCE>] [--output <FOLDER>]";

#[derive(Debug)]
struct CliArgs {
    input: PathBuf,
    limit: f64,
    output: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut input = None;
    let mut limit = 0.0;
    let mut output = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--limit" | "-l" => {
                let value = iter.next().ok_or("--limit needs a value")?;
                limit = value
                    .parse::<f64>()
                    .map_err(|_| format!("invalid braking force limit '{}'", value))?;
                if limit.is_nan() || limit < 0.0 {
                    return Err(format!("braking force limit must be >= 0, got {}", value));
                }
            }
            "--output" | "-o" => {
                let value = iter.next().ok_or("--output needs a folder")?;
                output = Some(PathBuf::from(value));
            }
            "--help" | "-h" => return Err(String::new()),
            other if other.starts_with('-') => return Err(format!("unknown option '{}'", other)),
            other => {
                if input.is_some() {
                    return Err(format!("unexpected argument '{}'", other));
                }
                input = Some(PathBuf::from(other));
            }
        }
    }

    let input = input.ok_or("missing cycle file or folder")?;
    Ok(CliArgs { input, limit, output })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("❌ {}", message);
            }
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    if cli.input.is_dir() {
        let output = cli.output.unwrap_or_else(|| cli.input.join("prepared"));
        let results = process_cycle_folder(&cli.input, &output, cli.limit)?;
        if results.iter().all(|r| !r.is_success()) && !results.is_empty() {
            eprintln!("⚠️  No cycle could be prepared");
        }
    } else {
        prepare_single_file(&cli.input, cli.output.as_deref(), cli.limit)?;
    }

    Ok(())
}

fn prepare_single_file(
    input: &Path,
    output: Option<&Path>,
    limit: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔄 Preparing: {}", input.display());

    let prepared = prepare(input, limit)?;
    let summary = prepared.summary();

    println!("\n🚗 CYCLE: {}", summary.header_name);
    println!("====================");
    println!("Samples: {} ({} s)", summary.samples, summary.duration_s);
    println!("Distance: {:.3} km (path {:.3} km)", summary.distance_km, summary.path_distance_km);
    println!("Max speed: {:.1} km/h, mean speed: {:.1} km/h", summary.max_speed_kmh, summary.mean_speed_kmh);
    println!("Extrema: {}{}", summary.extrema_count, if summary.smoothed { " (smoothed)" } else { "" });
    println!("Idle time: {} s", summary.idle_time_s);

    let folder = match output {
        Some(folder) => folder.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    std::fs::create_dir_all(&folder)?;

    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("cycle");
    let output_path = folder.join(format!("{}_path.csv", stem));
    write_path_csv(&prepared, &output_path)?;
    println!("📁 Path saved to: {}", output_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() {
        let cli = parse_args(&args(&["cycles/wltc.csv"])).unwrap();
        assert_eq!(cli.input, PathBuf::from("cycles/wltc.csv"));
        assert_eq!(cli.limit, 0.0);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_parse_limit_and_output() {
        let cli = parse_args(&args(&["cycles", "--limit", "0.25", "-o", "out"])).unwrap();
        assert_eq!(cli.limit, 0.25);
        assert_eq!(cli.output, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a.csv", "--limit"])).is_err());
        assert!(parse_args(&args(&["a.csv", "--limit", "-1"])).is_err());
        assert!(parse_args(&args(&["a.csv", "b.csv"])).is_err());
        assert!(parse_args(&args(&["a.csv", "--verbose"])).is_err());
    }
}
